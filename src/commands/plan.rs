use anyhow::Result;
use pdfbatch::{SplitJob, SplitOptions, Splitter};

pub fn run(job: &SplitJob, options: SplitOptions) -> Result<()> {
    let plan = Splitter::new(options).plan(job)?;

    println!("File: {}", job.input.display());
    println!("Pages: {}", plan.page_count);
    println!("Outputs: {}", plan.outputs.len());

    for entry in &plan.outputs {
        println!(
            "  {:04}: pages {}-{} -> {}",
            entry.sequence,
            entry.first_page,
            entry.last_page,
            entry.path.display()
        );
    }

    println!("Manifest: {}", plan.manifest_path.display());

    Ok(())
}

use anyhow::{Context, Result};
use pdfbatch::pdf::PdfDocument;
use pdfbatch::{CancelToken, SplitJob, SplitOptions, Splitter};
use tracing::warn;

pub async fn run(job: SplitJob, options: SplitOptions) -> Result<()> {
    let token = CancelToken::new();
    let splitter = Splitter::new(options).with_cancel(token.clone());

    // The split does blocking I/O; keep it off the runtime so Ctrl-C is still seen
    let mut handle = tokio::task::spawn_blocking(move || -> Result<_> {
        splitter.validate(&job)?;
        let source = PdfDocument::open(&job.input)?;

        // Only create the output directory once the input is known to be readable
        std::fs::create_dir_all(&job.output_dir).with_context(|| {
            format!("Failed to create directory: {}", job.output_dir.display())
        })?;

        Ok(splitter.run_with(&source, &job)?)
    });

    let outcome = tokio::select! {
        joined = &mut handle => joined??,
        Ok(()) = tokio::signal::ctrl_c() => {
            warn!("Interrupted, stopping after the current file");
            token.cancel();
            handle.await??
        }
    };

    for entry in &outcome.outputs {
        println!(
            "{} (pages {}-{})",
            entry.path.display(),
            entry.first_page,
            entry.last_page
        );
    }

    println!(
        "Split {} pages into {} file(s) in {}",
        outcome.page_count,
        outcome.outputs.len(),
        outcome.output_dir.display()
    );
    println!("Manifest saved to {}", outcome.manifest_path.display());

    Ok(())
}

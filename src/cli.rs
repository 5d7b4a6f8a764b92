use clap::{Args, Parser, Subcommand};
use pdfbatch::manifest::{DEFAULT_HEADER, DEFAULT_SHEET_NAME};
use pdfbatch::naming::DEFAULT_PREFIX;
use pdfbatch::{
    FailurePolicy, ManifestLayout, ManifestOptions, OverwritePolicy, SplitJob, SplitOptions,
    DEFAULT_GROUP_SIZE,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfbatch")]
#[command(about = "Split PDFs into fixed-size page groups with an XLSX manifest")]
#[command(version)]
pub struct Cli {
    /// Log progress to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server
    Mcp,

    /// Split a PDF into groups of pages and write the manifest
    #[command(alias = "burst")]
    Split {
        #[command(flatten)]
        job: JobArgs,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Fail instead of overwriting files left by an earlier run
        #[arg(long)]
        no_clobber: bool,

        /// Delete the files this run wrote if a later step fails
        #[arg(long)]
        remove_partial_on_failure: bool,
    },

    /// Show the files a split would produce, without writing anything
    Plan {
        #[command(flatten)]
        job: JobArgs,

        #[command(flatten)]
        layout: LayoutArgs,
    },
}

#[derive(Args)]
pub struct JobArgs {
    /// PDF file to split
    pub path: PathBuf,

    /// Output directory (created if missing)
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// Batch number embedded in every output name (digits only)
    #[arg(short, long, value_parser = parse_batch_id)]
    pub batch: String,

    /// Manifest file name, without the .xlsx extension
    #[arg(short, long, value_parser = parse_manifest_name)]
    pub manifest: String,
}

impl JobArgs {
    pub fn to_job(&self) -> SplitJob {
        SplitJob {
            input: self.path.clone(),
            output_dir: self.output_dir.clone(),
            batch_id: self.batch.clone(),
            manifest_name: self.manifest.clone(),
        }
    }
}

#[derive(Args)]
pub struct LayoutArgs {
    /// Pages per output file
    #[arg(short, long, default_value_t = DEFAULT_GROUP_SIZE,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub group_size: u32,

    /// Output file name prefix
    #[arg(long, default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Header cell of the manifest's path column
    #[arg(long, default_value = DEFAULT_HEADER)]
    pub header: String,

    /// Manifest worksheet name
    #[arg(long, default_value = DEFAULT_SHEET_NAME)]
    pub sheet_name: String,

    /// Add sequence and page range columns to the manifest
    #[arg(long)]
    pub detailed_manifest: bool,
}

impl LayoutArgs {
    pub fn to_options(&self) -> SplitOptions {
        SplitOptions {
            group_size: self.group_size,
            file_prefix: self.prefix.clone(),
            manifest: ManifestOptions {
                sheet_name: self.sheet_name.clone(),
                header: self.header.clone(),
                layout: if self.detailed_manifest {
                    ManifestLayout::Detailed
                } else {
                    ManifestLayout::Paths
                },
            },
            ..Default::default()
        }
    }
}

pub fn overwrite_policy(no_clobber: bool) -> OverwritePolicy {
    if no_clobber {
        OverwritePolicy::Refuse
    } else {
        OverwritePolicy::Overwrite
    }
}

pub fn failure_policy(remove_partial: bool) -> FailurePolicy {
    if remove_partial {
        FailurePolicy::RemovePartial
    } else {
        FailurePolicy::KeepPartial
    }
}

pub fn parse_batch_id(s: &str) -> Result<String, String> {
    let s = s.trim();
    if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
        Ok(s.to_string())
    } else {
        Err(format!("invalid batch number '{}': use digits only", s))
    }
}

pub fn parse_manifest_name(s: &str) -> Result<String, String> {
    let s = s.trim();
    if s.is_empty() {
        Err("manifest name must not be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

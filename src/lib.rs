//! Split a PDF into fixed-size groups of pages and record every generated file
//! in an XLSX manifest.
//!
//! ```no_run
//! use pdfbatch::{split, SplitJob};
//!
//! let outcome = split(&SplitJob {
//!     input: "lote.pdf".into(),
//!     output_dir: "saida".into(),
//!     batch_id: "123".to_string(),
//!     manifest_name: "lote_123".to_string(),
//! })?;
//! println!("{} files, manifest at {}", outcome.outputs.len(), outcome.manifest_path.display());
//! # Ok::<(), pdfbatch::SplitError>(())
//! ```

pub mod error;
pub mod manifest;
pub mod naming;
pub mod page_groups;
pub mod pdf;
pub mod split;

pub use error::{Result, SplitError};
pub use manifest::{Manifest, ManifestEntry, ManifestLayout, ManifestOptions};
pub use page_groups::PageGroup;
pub use split::{
    split, CancelToken, FailurePolicy, OverwritePolicy, PageSource, SplitJob, SplitOptions,
    SplitOutcome, SplitPlan, Splitter, DEFAULT_GROUP_SIZE,
};

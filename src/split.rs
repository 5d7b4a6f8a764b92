//! Split a paged document into fixed-size groups and record them in a manifest.
//!
//! A job reads its input once, writes one output document per group of
//! consecutive pages, and persists the manifest only after every output was
//! written. Any failure ends the job; what happens to outputs that were already
//! written is governed by [`FailurePolicy`].

use crate::error::{Result, SplitError};
use crate::manifest::{Manifest, ManifestEntry, ManifestOptions};
use crate::naming::{manifest_file_name, output_file_name, DEFAULT_PREFIX};
use crate::page_groups::{group_count, page_groups, PageGroup};
use crate::pdf::PdfDocument;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_GROUP_SIZE: u32 = 3;

/// Read side of a paged document: how many pages it has, and how to
/// serialize a run of them as a standalone document.
pub trait PageSource {
    fn page_count(&self) -> u32;

    fn extract_group(&self, group: &PageGroup) -> io::Result<Vec<u8>>;
}

/// Parameters of one split invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitJob {
    pub input: PathBuf,
    /// Must already exist
    pub output_dir: PathBuf,
    /// Embedded verbatim in every output name
    pub batch_id: String,
    /// Manifest file name without extension
    pub manifest_name: String,
}

/// What to do when an output name is already taken
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverwritePolicy {
    #[default]
    Overwrite,
    /// Fail with [`SplitError::OutputExists`] before writing anything
    Refuse,
}

/// What to do with outputs already written when a later step fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    #[default]
    KeepPartial,
    RemovePartial,
}

#[derive(Debug, Clone)]
pub struct SplitOptions {
    pub group_size: u32,
    pub file_prefix: String,
    pub manifest: ManifestOptions,
    pub overwrite: OverwritePolicy,
    pub on_failure: FailurePolicy,
}

impl Default for SplitOptions {
    fn default() -> Self {
        SplitOptions {
            group_size: DEFAULT_GROUP_SIZE,
            file_prefix: DEFAULT_PREFIX.to_string(),
            manifest: ManifestOptions::default(),
            overwrite: OverwritePolicy::default(),
            on_failure: FailurePolicy::default(),
        }
    }
}

/// Shared flag checked between group writes
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitOutcome {
    pub output_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub page_count: u32,
    pub outputs: Vec<ManifestEntry>,
}

/// The outputs a job would produce, computed without writing anything
#[derive(Debug, Clone, Serialize)]
pub struct SplitPlan {
    pub page_count: u32,
    pub manifest_path: PathBuf,
    pub outputs: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct Splitter {
    options: SplitOptions,
    cancel: Option<CancelToken>,
}

/// Split with default options: groups of three, `AP_MAPFRE` names, overwrite.
pub fn split(job: &SplitJob) -> Result<SplitOutcome> {
    Splitter::default().run(job)
}

impl Splitter {
    pub fn new(options: SplitOptions) -> Self {
        Splitter {
            options,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Split the PDF at `job.input`
    pub fn run(&self, job: &SplitJob) -> Result<SplitOutcome> {
        let group_size = self.validate(job)?;
        let source = PdfDocument::open(&job.input)?;
        self.execute(&source, job, group_size)
    }

    /// Split an already opened document
    pub fn run_with<S: PageSource>(&self, source: &S, job: &SplitJob) -> Result<SplitOutcome> {
        let group_size = self.validate(job)?;
        self.execute(source, job, group_size)
    }

    /// Open the input and report what [`Splitter::run`] would write
    pub fn plan(&self, job: &SplitJob) -> Result<SplitPlan> {
        let group_size = self.validate(job)?;
        let source = PdfDocument::open(&job.input)?;
        let page_count = PageSource::page_count(&source);
        let output_dir = std::path::absolute(&job.output_dir).map_err(|e| {
            SplitError::InvalidParameter(format!(
                "cannot resolve output directory {}: {}",
                job.output_dir.display(),
                e
            ))
        })?;

        Ok(SplitPlan {
            page_count,
            manifest_path: output_dir.join(manifest_file_name(&job.manifest_name)),
            outputs: self.planned_outputs(page_count, group_size, &output_dir, job),
        })
    }

    /// Check the options and job parameters without touching the filesystem
    pub fn validate(&self, job: &SplitJob) -> Result<NonZeroU32> {
        let group_size = NonZeroU32::new(self.options.group_size).ok_or_else(|| {
            SplitError::InvalidParameter("group size must be a positive integer".to_string())
        })?;

        if job.manifest_name.trim().is_empty() {
            return Err(SplitError::InvalidParameter(
                "manifest name must not be empty".to_string(),
            ));
        }

        self.options
            .manifest
            .validate()
            .map_err(SplitError::InvalidParameter)?;

        Ok(group_size)
    }

    fn planned_outputs(
        &self,
        page_count: u32,
        group_size: NonZeroU32,
        output_dir: &Path,
        job: &SplitJob,
    ) -> Vec<ManifestEntry> {
        page_groups(page_count, group_size)
            .map(|group| ManifestEntry {
                path: output_dir.join(output_file_name(
                    &self.options.file_prefix,
                    &job.batch_id,
                    group.sequence,
                )),
                sequence: group.sequence,
                first_page: group.first,
                last_page: group.last,
            })
            .collect()
    }

    fn execute<S: PageSource>(
        &self,
        source: &S,
        job: &SplitJob,
        group_size: NonZeroU32,
    ) -> Result<SplitOutcome> {
        let page_count = source.page_count();
        // Manifest rows carry absolute paths even when the job's directory is relative
        let output_dir = std::path::absolute(&job.output_dir).map_err(|e| SplitError::Write {
            path: job.output_dir.clone(),
            committed: 0,
            source: e,
        })?;
        let planned = self.planned_outputs(page_count, group_size, &output_dir, job);
        let manifest_path = output_dir.join(manifest_file_name(&job.manifest_name));

        info!(
            "Splitting {} ({} pages) into {} file(s) of up to {} pages in {}",
            job.input.display(),
            page_count,
            planned.len(),
            group_size,
            output_dir.display()
        );

        if self.options.overwrite == OverwritePolicy::Refuse {
            let taken = planned
                .iter()
                .map(|entry| entry.path.as_path())
                .chain(std::iter::once(manifest_path.as_path()))
                .find(|path| path.exists());
            if let Some(path) = taken {
                return Err(SplitError::OutputExists {
                    path: path.to_path_buf(),
                });
            }
        }

        let mut manifest = Manifest::new(self.options.manifest.clone());
        let mut written: Vec<PathBuf> = Vec::new();

        for (group, entry) in page_groups(page_count, group_size).zip(planned) {
            if self.is_cancelled() {
                warn!(
                    "Split cancelled after {} of {} file(s); manifest not written",
                    written.len(),
                    group_count(page_count, group_size)
                );
                return Err(SplitError::Cancelled {
                    committed: written.len(),
                });
            }

            let result = source
                .extract_group(&group)
                .and_then(|bytes| self.write_output(&entry.path, &bytes));

            if let Err(e) = result {
                if e.kind() == io::ErrorKind::AlreadyExists
                    && self.options.overwrite == OverwritePolicy::Refuse
                {
                    self.discard_partial(&written);
                    return Err(SplitError::OutputExists { path: entry.path });
                }
                let committed = self.discard_partial(&written);
                return Err(SplitError::Write {
                    path: entry.path,
                    committed,
                    source: e,
                });
            }

            debug!(
                "Wrote {} (pages {}-{})",
                entry.path.display(),
                group.first,
                group.last
            );
            written.push(entry.path.clone());
            manifest.append(entry);
        }

        if let Err(source) = manifest.save(&manifest_path) {
            self.discard_partial(&written);
            return Err(SplitError::ManifestWrite {
                path: manifest_path,
                source,
            });
        }

        info!(
            "Wrote {} file(s) and manifest {}",
            written.len(),
            manifest_path.display()
        );

        Ok(SplitOutcome {
            output_dir,
            manifest_path,
            page_count,
            outputs: manifest.into_entries(),
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }

    fn write_output(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = match self.options.overwrite {
            OverwritePolicy::Overwrite => File::create(path)?,
            OverwritePolicy::Refuse => OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)?,
        };

        if let Err(e) = file.write_all(bytes) {
            drop(file);
            // A truncated PDF is never useful, whatever the failure policy
            if let Err(remove_err) = fs::remove_file(path) {
                warn!(
                    "Failed to remove incomplete {}: {}",
                    path.display(),
                    remove_err
                );
            }
            return Err(e);
        }

        Ok(())
    }

    /// Apply the failure policy to outputs this job wrote. Returns how many
    /// of them are still on disk.
    fn discard_partial(&self, written: &[PathBuf]) -> usize {
        match self.options.on_failure {
            FailurePolicy::KeepPartial => written.len(),
            FailurePolicy::RemovePartial => {
                let mut remaining = 0;
                for path in written {
                    if let Err(e) = fs::remove_file(path) {
                        warn!("Failed to remove {}: {}", path.display(), e);
                        remaining += 1;
                    }
                }
                debug!("Removed {} partial file(s)", written.len() - remaining);
                remaining
            }
        }
    }
}

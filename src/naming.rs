//! File naming for split outputs and their manifest.
//!
//! Names are part of the compatibility surface with downstream tooling and must
//! stay bit-exact: `<prefix>_<batch>_<seq>.pdf` with the sequence zero-padded
//! to four digits, and `<base>.xlsx` for the manifest.

pub const DEFAULT_PREFIX: &str = "AP_MAPFRE";
pub const OUTPUT_EXTENSION: &str = "pdf";
pub const MANIFEST_EXTENSION: &str = "xlsx";

/// Sequences past 9999 widen the field rather than wrap, so names never collide.
pub fn output_file_name(prefix: &str, batch_id: &str, sequence: u32) -> String {
    format!("{prefix}_{batch_id}_{sequence:04}.{OUTPUT_EXTENSION}")
}

pub fn manifest_file_name(base_name: &str) -> String {
    format!("{base_name}.{MANIFEST_EXTENSION}")
}

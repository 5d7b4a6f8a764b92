use rust_xlsxwriter::{Workbook, XlsxError};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_SHEET_NAME: &str = "Detalhes Segurados";
pub const DEFAULT_HEADER: &str = "Arquivo";

const DETAILED_HEADERS: [&str; 3] = ["Sequencia", "Pagina inicial", "Pagina final"];

const MAX_SHEET_NAME_CHARS: usize = 31;
const FORBIDDEN_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Which columns the manifest carries after the output path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ManifestLayout {
    /// Only the output path
    #[default]
    Paths,
    /// Output path, sequence number and the source page range
    Detailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestOptions {
    pub sheet_name: String,
    /// Header cell of the path column
    pub header: String,
    pub layout: ManifestLayout,
}

impl Default for ManifestOptions {
    fn default() -> Self {
        ManifestOptions {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            header: DEFAULT_HEADER.to_string(),
            layout: ManifestLayout::default(),
        }
    }
}

impl ManifestOptions {
    /// Reject sheet names and headers the workbook writer would refuse, so the
    /// problem surfaces before any output is written
    pub fn validate(&self) -> Result<(), String> {
        let name = &self.sheet_name;
        if name.trim().is_empty() {
            return Err("sheet name must not be empty".to_string());
        }
        if name.chars().count() > MAX_SHEET_NAME_CHARS {
            return Err(format!(
                "sheet name '{}' is longer than {} characters",
                name, MAX_SHEET_NAME_CHARS
            ));
        }
        if let Some(c) = name.chars().find(|c| FORBIDDEN_SHEET_CHARS.contains(c)) {
            return Err(format!("sheet name '{}' must not contain '{}'", name, c));
        }
        if name.starts_with('\'') || name.ends_with('\'') {
            return Err(format!(
                "sheet name '{}' must not start or end with an apostrophe",
                name
            ));
        }
        if self.header.trim().is_empty() {
            return Err("manifest header must not be empty".to_string());
        }
        Ok(())
    }
}

/// One row of the manifest, describing one written output document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub path: PathBuf,
    pub sequence: u32,
    pub first_page: u32,
    pub last_page: u32,
}

/// Append-only sheet of output files, persisted once as XLSX
#[derive(Debug, Clone)]
pub struct Manifest {
    options: ManifestOptions,
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new(options: ManifestOptions) -> Self {
        Manifest {
            options,
            entries: Vec::new(),
        }
    }

    pub fn append(&mut self, entry: ManifestEntry) {
        self.entries.push(entry);
    }

    pub fn into_entries(self) -> Vec<ManifestEntry> {
        self.entries
    }

    /// Header row, in column order
    pub fn headers(&self) -> Vec<&str> {
        let mut headers = vec![self.options.header.as_str()];
        if self.options.layout == ManifestLayout::Detailed {
            headers.extend(DETAILED_HEADERS);
        }
        headers
    }

    /// Write the header row and every entry to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), XlsxError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.options.sheet_name)?;
        sheet.set_column_width(0, 60)?;

        for (col, header) in self.headers().into_iter().enumerate() {
            sheet.write_string(0, col as u16, header)?;
        }

        for (index, entry) in self.entries.iter().enumerate() {
            let row = index as u32 + 1;
            sheet.write_string(row, 0, entry.path.display().to_string())?;
            if self.options.layout == ManifestLayout::Detailed {
                sheet.write_number(row, 1, entry.sequence)?;
                sheet.write_number(row, 2, entry.first_page)?;
                sheet.write_number(row, 3, entry.last_page)?;
            }
        }

        workbook.save(path.as_ref())
    }
}

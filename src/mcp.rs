use anyhow::Result;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::Deserialize;
use tracing::info;

use crate::cli::{failure_policy, overwrite_policy, parse_batch_id, parse_manifest_name};
use pdfbatch::manifest::{DEFAULT_HEADER, DEFAULT_SHEET_NAME};
use pdfbatch::naming::DEFAULT_PREFIX;
use pdfbatch::{
    ManifestLayout, ManifestOptions, SplitJob, SplitOptions, Splitter, DEFAULT_GROUP_SIZE,
};

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfSplitRequest {
    #[schemars(description = "Path to the PDF file to split")]
    pub path: String,
    #[schemars(description = "Existing directory that receives the output files and manifest")]
    pub output_dir: String,
    #[schemars(description = "Batch number embedded in every output file name (digits only)")]
    pub batch_id: String,
    #[schemars(description = "Manifest file name without the .xlsx extension")]
    pub manifest_name: String,
    #[schemars(description = "Pages per output file (default: 3)")]
    #[serde(default = "default_group_size")]
    pub group_size: u32,
    #[schemars(description = "Output file name prefix (default: AP_MAPFRE)")]
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[schemars(description = "Header cell of the manifest's path column (default: Arquivo)")]
    #[serde(default = "default_header")]
    pub header: String,
    #[schemars(description = "Manifest worksheet name (default: Detalhes Segurados)")]
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    #[schemars(description = "Add sequence and page range columns to the manifest (default: false)")]
    #[serde(default)]
    pub detailed_manifest: bool,
    #[schemars(description = "Fail instead of overwriting existing output files (default: false)")]
    #[serde(default)]
    pub no_clobber: bool,
    #[schemars(description = "Delete the files this call wrote if a later step fails (default: false)")]
    #[serde(default)]
    pub remove_partial_on_failure: bool,
}

fn default_group_size() -> u32 {
    DEFAULT_GROUP_SIZE
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_header() -> String {
    DEFAULT_HEADER.to_string()
}

fn default_sheet_name() -> String {
    DEFAULT_SHEET_NAME.to_string()
}

impl PdfSplitRequest {
    fn into_job(self) -> std::result::Result<(SplitJob, SplitOptions), String> {
        let batch_id = parse_batch_id(&self.batch_id)?;
        let manifest_name = parse_manifest_name(&self.manifest_name)?;

        let job = SplitJob {
            input: self.path.into(),
            output_dir: self.output_dir.into(),
            batch_id,
            manifest_name,
        };
        let options = SplitOptions {
            group_size: self.group_size,
            file_prefix: self.prefix,
            manifest: ManifestOptions {
                sheet_name: self.sheet_name,
                header: self.header,
                layout: if self.detailed_manifest {
                    ManifestLayout::Detailed
                } else {
                    ManifestLayout::Paths
                },
            },
            overwrite: overwrite_policy(self.no_clobber),
            on_failure: failure_policy(self.remove_partial_on_failure),
        };
        Ok((job, options))
    }
}

#[derive(Debug, Clone)]
pub struct PdfServer {
    tool_router: ToolRouter<Self>,
}

impl PdfServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for PdfServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl PdfServer {
    #[tool(description = "Split a PDF into files of N consecutive pages (default 3) named <prefix>_<batch>_<0001>.pdf, and save an XLSX manifest listing every file")]
    async fn pdf_split(&self, Parameters(req): Parameters<PdfSplitRequest>) -> String {
        let (job, options) = match req.into_job() {
            Ok(v) => v,
            Err(e) => return format!("Error: {}", e),
        };

        info!("MCP split of {}", job.input.display());
        let joined = tokio::task::spawn_blocking(move || Splitter::new(options).run(&job)).await;

        match joined {
            Ok(Ok(outcome)) => {
                serde_json::to_string_pretty(&outcome).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Ok(Err(e)) => format!("Error: {}", e),
            Err(e) => format!("Error: split task failed: {}", e),
        }
    }

    #[tool(description = "List the files and manifest a pdf_split call would produce, without writing anything")]
    fn pdf_split_plan(&self, Parameters(req): Parameters<PdfSplitRequest>) -> String {
        let (job, options) = match req.into_job() {
            Ok(v) => v,
            Err(e) => return format!("Error: {}", e),
        };

        match Splitter::new(options).plan(&job) {
            Ok(plan) => {
                serde_json::to_string_pretty(&plan).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {}", e),
        }
    }
}

#[tool_handler]
impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDF batch splitting tools. Use pdf_split_plan to preview the output files for a \
                 batch, and pdf_split to write them together with the XLSX manifest."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = PdfServer::new();

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfbatch::{FailurePolicy, OverwritePolicy};

    fn request(batch_id: &str) -> PdfSplitRequest {
        serde_json::from_value(serde_json::json!({
            "path": "in.pdf",
            "output_dir": "out",
            "batch_id": batch_id,
            "manifest_name": "lote",
        }))
        .unwrap()
    }

    #[test]
    fn test_request_defaults() {
        let (job, options) = request("12").into_job().unwrap();
        assert_eq!(job.batch_id, "12");
        assert_eq!(options.group_size, 3);
        assert_eq!(options.overwrite, OverwritePolicy::Overwrite);
        assert_eq!(options.manifest.layout, ManifestLayout::Paths);
        assert_eq!(options.on_failure, FailurePolicy::KeepPartial);
        assert_eq!(options.file_prefix, "AP_MAPFRE");
        assert_eq!(options.manifest.header, "Arquivo");
        assert_eq!(options.manifest.sheet_name, "Detalhes Segurados");
    }

    #[test]
    fn test_request_carries_layout_and_policies() {
        let req: PdfSplitRequest = serde_json::from_value(serde_json::json!({
            "path": "in.pdf",
            "output_dir": "out",
            "batch_id": "7",
            "manifest_name": "files",
            "group_size": 2,
            "prefix": "LOTE",
            "header": "File",
            "sheet_name": "Files",
            "detailed_manifest": true,
            "no_clobber": true,
            "remove_partial_on_failure": true,
        }))
        .unwrap();

        let (_, options) = req.into_job().unwrap();
        assert_eq!(options.group_size, 2);
        assert_eq!(options.file_prefix, "LOTE");
        assert_eq!(options.manifest.header, "File");
        assert_eq!(options.manifest.sheet_name, "Files");
        assert_eq!(options.manifest.layout, ManifestLayout::Detailed);
        assert_eq!(options.overwrite, OverwritePolicy::Refuse);
        assert_eq!(options.on_failure, FailurePolicy::RemovePartial);
    }

    #[test]
    fn test_request_rejects_non_numeric_batch() {
        assert!(request("abc").into_job().is_err());
    }
}

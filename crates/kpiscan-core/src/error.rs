use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum KpiError {
    #[error("layout extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("failed to read page layout: {0}")]
    LayoutParse(String),

    #[error("document has no pages")]
    EmptyLayout,

    #[error("no KPI charts detected in {pages} page(s). Is this a network KPI report?")]
    NoChartsRecognized { pages: usize },

    #[error("failed to load chart catalog from {path}: {reason}")]
    CatalogLoad { path: PathBuf, reason: String },

    #[error("invalid chart catalog: {0}")]
    CatalogInvalid(String),

    #[error("chart '{0}' is not present in the extraction result")]
    UnknownChart(String),

    #[error("no subject heading found in {}", .0.display())]
    SubjectNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub mod catalog;
pub mod extract;
pub mod mask;

use kpiscan_core::catalog::builtin;
use kpiscan_core::catalog::schema::ChartCatalog;
use kpiscan_core::error::KpiError;
use kpiscan_core::extraction::json::JsonLayoutExtractor;
use kpiscan_core::extraction::pdftotext::PdftotextExtractor;
use kpiscan_core::extraction::LayoutExtractor;
use kpiscan_core::model::PageLayout;
use std::path::{Path, PathBuf};

/// Custom catalog file if given, otherwise the named preset.
pub fn resolve_catalog(file: Option<PathBuf>, preset: &str) -> Result<ChartCatalog, KpiError> {
    match file {
        Some(path) => kpiscan_core::catalog::load_catalog(&path),
        None => builtin::load_preset(preset),
    }
}

/// Backend by extension: `.json` is a serialized layout, anything else a PDF.
pub fn extractor_for(path: &Path) -> Box<dyn LayoutExtractor> {
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        Box::new(JsonLayoutExtractor::new())
    } else {
        Box::new(PdftotextExtractor::new())
    }
}

pub fn read_layout(path: &Path) -> Result<Vec<PageLayout>, KpiError> {
    let bytes = std::fs::read(path)?;
    let extractor = extractor_for(path);
    tracing::debug!(
        file = %path.display(),
        backend = extractor.backend_name(),
        "reading layout"
    );
    extractor.extract_layout(&bytes)
}

pub mod catalog;
pub mod error;
pub mod extraction;
pub mod model;
pub mod parsing;
pub mod pseudonym;
pub mod registry;
pub mod trace;

use catalog::schema::ChartCatalog;
use error::KpiError;
use extraction::LayoutExtractor;
use indexmap::{IndexMap, IndexSet};
use model::{ChartResult, PageLayout, Unit};
use parsing::region::RegionStrategy;
use parsing::{ChartAssembler, PageAssembly};
use pseudonym::MaskedEntry;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use trace::{DebugRegion, TraceWarning};

/// Caller-selected extraction behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractOptions {
    pub strategy: RegionStrategy,
}

/// Everything recovered from one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Recognized charts in catalog order.
    pub charts: IndexMap<String, ChartResult>,
    /// Distinct codes across all charts, in first-appearance order.
    pub codes: Vec<String>,
    pub debug_regions: Vec<DebugRegion>,
    pub warnings: Vec<TraceWarning>,
}

impl ExtractionResult {
    pub fn chart(&self, key: &str) -> Option<&ChartResult> {
        self.charts.get(key)
    }
}

/// A chart as exported under pseudonyms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaskedChart {
    pub key: String,
    pub label: String,
    pub unit: Unit,
    pub higher_is_better: bool,
    pub target: Option<u32>,
    pub network_avg: Option<u32>,
    pub ranking: Vec<MaskedEntry>,
}

/// Extraction result with every code except the subject's replaced by an alias.
///
/// Carries no code list and no per-row codes, so it is safe to export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaskedExtraction {
    pub subject: String,
    pub charts: IndexMap<String, MaskedChart>,
    pub warnings: Vec<TraceWarning>,
}

/// Main API entry point: reconstruct every catalogued chart from document bytes.
pub fn extract_document(
    bytes: &[u8],
    extractor: &dyn LayoutExtractor,
    catalog: &ChartCatalog,
    options: &ExtractOptions,
) -> Result<ExtractionResult, KpiError> {
    let pages = extractor.extract_layout(bytes)?;
    tracing::debug!(
        backend = extractor.backend_name(),
        pages = pages.len(),
        "layout extracted"
    );
    extract_layout(&pages, catalog, options)
}

/// Reconstruct every catalogued chart from already extracted pages.
///
/// Fails only when the document yields no chart at all; missing or partial
/// charts are reported through `debug_regions` and `warnings`.
pub fn extract_layout(
    pages: &[PageLayout],
    catalog: &ChartCatalog,
    options: &ExtractOptions,
) -> Result<ExtractionResult, KpiError> {
    if pages.is_empty() {
        return Err(KpiError::EmptyLayout);
    }

    let assembler = ChartAssembler::new(catalog, options.strategy)?;
    let assemblies: Vec<PageAssembly> = pages
        .par_iter()
        .map(|page| assembler.assemble_page(page))
        .collect();

    let mut found = IndexMap::new();
    let mut debug_regions = Vec::new();
    for assembly in assemblies {
        // First page wins if a key were ever configured twice.
        for (key, chart) in assembly.charts {
            found.entry(key).or_insert(chart);
        }
        debug_regions.extend(assembly.debug_regions);
    }

    if found.is_empty() {
        tracing::warn!(pages = pages.len(), "no charts recognized");
        return Err(KpiError::NoChartsRecognized { pages: pages.len() });
    }

    // Catalog order, independent of page order.
    let mut charts = IndexMap::new();
    for spec in &catalog.charts {
        if let Some(chart) = found.swap_remove(&spec.key) {
            charts.insert(spec.key.clone(), chart);
        }
    }

    let codes: IndexSet<String> = charts
        .values()
        .flat_map(|c| c.ranking.iter().map(|e| e.code.clone()))
        .collect();

    let warnings: Vec<TraceWarning> = debug_regions
        .iter()
        .filter(|d| charts.contains_key(&d.key))
        .filter_map(|d| trace::structural_warning(d, catalog.expected_rows))
        .collect();
    for w in &warnings {
        tracing::warn!(chart = w.chart.as_deref(), defect = %w.defect, "{}", w.message);
    }

    tracing::info!(
        catalog = %catalog.name,
        strategy = %options.strategy,
        charts = charts.len(),
        codes = codes.len(),
        warnings = warnings.len(),
        "extraction complete"
    );

    Ok(ExtractionResult {
        charts,
        codes: codes.into_iter().collect(),
        debug_regions,
        warnings,
    })
}

/// Masked ranking of one chart, with every code except `subject` replaced by an alias.
pub fn mask_chart(
    result: &ExtractionResult,
    key: &str,
    subject: &str,
    alias_prefix: &str,
) -> Result<Vec<MaskedEntry>, KpiError> {
    let chart = result
        .chart(key)
        .ok_or_else(|| KpiError::UnknownChart(key.to_string()))?;
    let map = pseudonym::build_map_with_prefix(&chart.ranking, subject, alias_prefix);
    Ok(pseudonym::mask(&chart.ranking, &map, subject))
}

/// Mask every chart of `result`. Aliases are numbered per chart.
pub fn mask_result(
    result: &ExtractionResult,
    subject: &str,
    alias_prefix: &str,
) -> MaskedExtraction {
    let charts = result
        .charts
        .iter()
        .map(|(key, chart)| {
            let map = pseudonym::build_map_with_prefix(&chart.ranking, subject, alias_prefix);
            let masked = MaskedChart {
                key: chart.key.clone(),
                label: chart.label.clone(),
                unit: chart.unit,
                higher_is_better: chart.higher_is_better,
                target: chart.target,
                network_avg: chart.network_avg,
                ranking: pseudonym::mask(&chart.ranking, &map, subject),
            };
            (key.clone(), masked)
        })
        .collect();

    MaskedExtraction {
        subject: subject.trim().to_uppercase(),
        charts,
        warnings: result.warnings.clone(),
    }
}

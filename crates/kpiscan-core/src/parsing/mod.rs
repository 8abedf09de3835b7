pub mod classify;
pub mod pairing;
pub mod region;
pub mod scalar;
pub mod subject;
pub mod values;

use crate::catalog::schema::{ChartCatalog, ChartSpec, PageGeometry};
use crate::error::KpiError;
use crate::model::{ChartResult, PageLayout};
use crate::registry::CodeRegistry;
use crate::trace::{DebugRegion, TraceStep, TraceStepType};
use classify::{ColumnBands, TokenClassifier};
use indexmap::IndexMap;
use rayon::prelude::*;
use regex::Regex;
use region::{PageTitles, RegionStrategy};
use scalar::TargetPattern;

/// Charts extracted from one page.
#[derive(Debug, Clone, Default)]
pub struct PageAssembly {
    /// Charts with at least one paired row, in catalog order.
    pub charts: IndexMap<String, ChartResult>,
    /// One entry per attempted chart, successful or not.
    pub debug_regions: Vec<DebugRegion>,
}

/// Drives region location, classification, pairing and target extraction per chart.
pub struct ChartAssembler<'a> {
    catalog: &'a ChartCatalog,
    registry: CodeRegistry,
    titles: Vec<(&'a ChartSpec, Regex)>,
    target: TargetPattern,
    strategy: RegionStrategy,
}

impl<'a> ChartAssembler<'a> {
    pub fn new(catalog: &'a ChartCatalog, strategy: RegionStrategy) -> Result<Self, KpiError> {
        let titles = catalog
            .charts
            .iter()
            .map(|chart| {
                Regex::new(&chart.title_pattern)
                    .map(|re| (chart, re))
                    .map_err(|e| {
                        KpiError::CatalogInvalid(format!(
                            "chart '{}' title_pattern: {}",
                            chart.key, e
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let target = TargetPattern::new(&catalog.target_marker)
            .map_err(|e| KpiError::CatalogInvalid(format!("target_marker: {e}")))?;

        Ok(ChartAssembler {
            catalog,
            registry: CodeRegistry::from_catalog(catalog),
            titles,
            target,
            strategy,
        })
    }

    /// Extract every chart the catalog places on `page`.
    pub fn assemble_page(&self, page: &PageLayout) -> PageAssembly {
        let Some(geometry) = self.catalog.page(page.page_number) else {
            tracing::debug!(page = page.page_number, "no charts configured for page");
            return PageAssembly::default();
        };

        let on_page: Vec<(&ChartSpec, &Regex)> = self
            .titles
            .iter()
            .filter(|(chart, _)| chart.page == page.page_number)
            .map(|(chart, re)| (*chart, re))
            .collect();

        let titles = PageTitles::find(page, geometry, on_page.iter().copied());

        let outcomes: Vec<(Option<ChartResult>, DebugRegion)> = on_page
            .par_iter()
            .map(|(chart, _)| self.assemble_chart(page, geometry, chart, &titles))
            .collect();

        let mut assembly = PageAssembly::default();
        for (result, region) in outcomes {
            if let Some(result) = result {
                assembly.charts.insert(result.key.clone(), result);
            }
            assembly.debug_regions.push(region);
        }
        assembly
    }

    fn assemble_chart(
        &self,
        page: &PageLayout,
        geometry: &PageGeometry,
        chart: &ChartSpec,
        titles: &PageTitles<'_>,
    ) -> (Option<ChartResult>, DebugRegion) {
        let mut region = DebugRegion {
            page: page.page_number,
            key: chart.key.clone(),
            rect: None,
            strategy: self.strategy,
            label_count: 0,
            value_count: 0,
            paired: 0,
            tolerance: None,
            steps: Vec::new(),
        };

        let title = titles.get(&chart.key);
        let Some(rect) = self.strategy.locate(page, geometry, chart, titles) else {
            tracing::debug!(
                page = page.page_number,
                chart = %chart.key,
                strategy = %self.strategy,
                "chart region not found, skipping"
            );
            region.steps.push(TraceStep::new(
                TraceStepType::LocateRegion,
                format!("No region located with {} geometry", self.strategy),
            ));
            return (None, region);
        };
        region.rect = Some(rect);
        region.steps.push(TraceStep::new(
            TraceStepType::LocateRegion,
            format!(
                "Located {} with {} geometry{}",
                rect,
                self.strategy,
                if title.is_some() { "" } else { " (title not found)" }
            ),
        ));

        let classifier = TokenClassifier::new(&self.registry, &self.catalog.mass);
        let bands = ColumnBands::for_chart(chart, geometry);
        let classified = classifier.classify(page, &rect, chart.unit, &bands);
        region.label_count = classified.labels.len();
        region.value_count = classified.values.len();
        region.steps.push(TraceStep::new(
            TraceStepType::Classify,
            format!(
                "{} code(s) left of {:.0}%, {} {} value(s) right of {:.0}%",
                classified.labels.len(),
                bands.label_split * 100.0,
                classified.values.len(),
                chart.unit,
                bands.value_split * 100.0
            ),
        ));

        let outcome = pairing::pair(
            &classified.labels,
            &classified.values,
            &chart.tolerances,
            self.catalog.expected_rows,
        );
        region.paired = outcome.ranking.len();
        region.tolerance = Some(outcome.tolerance);
        for attempt in &outcome.attempts {
            region.steps.push(TraceStep::new(
                TraceStepType::Pair,
                format!(
                    "Tolerance {}: {} pair(s){}",
                    attempt.tolerance,
                    attempt.paired,
                    if attempt.adopted { " (adopted)" } else { "" }
                ),
            ));
        }

        let target = scalar::extract_scalar(
            page,
            title,
            &rect,
            chart.unit,
            &self.target,
            &geometry.target_window,
        );
        region.steps.push(TraceStep::new(
            TraceStepType::ExtractTarget,
            match target {
                Some(t) => format!("Target {t}"),
                None => "No target annotation found".to_string(),
            },
        ));

        let network_avg = chart.summary_tile.and_then(|tile| {
            let value = geometry
                .summary_tiles
                .as_ref()
                .and_then(|tiles| scalar::summary_tile_value(page, tiles, tile));
            region.steps.push(TraceStep::new(
                TraceStepType::SummaryTile,
                match value {
                    Some(v) => format!("Network average {v} from tile {tile}"),
                    None => format!("No network average in tile {tile}"),
                },
            ));
            value
        });

        tracing::debug!(
            page = page.page_number,
            chart = %chart.key,
            labels = region.label_count,
            values = region.value_count,
            paired = region.paired,
            tolerance = outcome.tolerance,
            target_value = ?target,
            "chart extracted"
        );

        if outcome.ranking.is_empty() {
            return (None, region);
        }

        let result = ChartResult {
            key: chart.key.clone(),
            label: chart.label.clone(),
            unit: chart.unit,
            higher_is_better: chart.higher_is_better,
            target,
            network_avg,
            ranking: outcome.ranking,
        };
        (Some(result), region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::parse_catalog_str;
    use crate::model::{RankingEntry, Token};

    const CATALOG: &str = r#"{
        "name": "Test",
        "version": "1",
        "codes": ["AAA", "BBB", "CCC"],
        "expected_rows": 3,
        "target_marker": "FY\\d{2}\\s*Target",
        "pages": [
            { "page": 1, "columns": 2, "margin": 3, "y_top": 0.2, "y_bottom": 0.9, "title_columns": 2,
              "summary_tiles": { "y_top": 0.02, "y_bottom": 0.15, "columns": 2, "inset": 10 } }
        ],
        "charts": [
            { "key": "LEFT", "label": "Left", "page": 1, "column": 0, "title_pattern": "Left KPI", "unit": "percent", "summary_tile": 0 },
            { "key": "RIGHT", "label": "Right", "page": 1, "column": 1, "title_pattern": "Right KPI", "unit": "percent" }
        ]
    }"#;

    // Page 400 x 1000; fixed regions: LEFT x 3..197, RIGHT x 203..397, y 200..900.
    fn page() -> PageLayout {
        PageLayout {
            page_number: 1,
            width: 400.0,
            height: 1000.0,
            tokens: vec![
                Token::new("71%", 40.0, 100.0),
                Token::new("Left KPI", 20.0, 190.0),
                Token::new("FY26 Target 75%", 20.0, 200.0),
                Token::new("AAA", 10.0, 300.0),
                Token::new("90%", 150.0, 301.0),
                Token::new("BBB", 10.0, 320.0),
                Token::new("80%", 150.0, 321.0),
                Token::new("CCC", 10.0, 340.0),
                Token::new("60%", 150.0, 342.0),
            ],
        }
    }

    #[test]
    fn test_assemble_page_fixed() {
        let catalog = parse_catalog_str(CATALOG).unwrap();
        let assembler = ChartAssembler::new(&catalog, RegionStrategy::Fixed).unwrap();
        let assembly = assembler.assemble_page(&page());

        let left = &assembly.charts["LEFT"];
        assert_eq!(
            left.ranking,
            vec![
                RankingEntry::new("AAA", 90),
                RankingEntry::new("BBB", 80),
                RankingEntry::new("CCC", 60),
            ]
        );
        assert_eq!(left.target, Some(75));
        assert_eq!(left.network_avg, Some(71));

        // RIGHT has a region but nothing in it: debug only.
        assert!(!assembly.charts.contains_key("RIGHT"));
        assert_eq!(assembly.debug_regions.len(), 2);
        assert_eq!(assembly.debug_regions[1].key, "RIGHT");
        assert!(assembly.debug_regions[1].rect.is_some());
        assert_eq!(assembly.debug_regions[1].label_count, 0);
    }

    #[test]
    fn test_assemble_page_title_anchored_missing_title() {
        let catalog = parse_catalog_str(CATALOG).unwrap();
        let strategy = RegionStrategy::TitleAnchored {
            columns: region::ColumnMode::Position,
        };
        let assembler = ChartAssembler::new(&catalog, strategy).unwrap();
        let assembly = assembler.assemble_page(&page());

        assert!(assembly.charts.contains_key("LEFT"));
        let right = assembly
            .debug_regions
            .iter()
            .find(|d| d.key == "RIGHT")
            .unwrap();
        assert!(right.rect.is_none());
    }

    #[test]
    fn test_unconfigured_page_yields_nothing() {
        let catalog = parse_catalog_str(CATALOG).unwrap();
        let assembler = ChartAssembler::new(&catalog, RegionStrategy::Fixed).unwrap();
        let mut p = page();
        p.page_number = 5;
        let assembly = assembler.assemble_page(&p);
        assert!(assembly.charts.is_empty());
        assert!(assembly.debug_regions.is_empty());
    }
}

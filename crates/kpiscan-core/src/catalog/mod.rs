pub mod builtin;
pub mod schema;

use crate::error::KpiError;
use regex::Regex;
use schema::ChartCatalog;
use std::collections::HashSet;
use std::path::Path;

/// Load a chart catalog from a JSON file.
pub fn load_catalog(path: &Path) -> Result<ChartCatalog, KpiError> {
    let content = std::fs::read_to_string(path).map_err(|e| KpiError::CatalogLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_catalog(&content, path)
}

/// Parse a chart catalog from a JSON string.
pub fn parse_catalog(json: &str, source: &Path) -> Result<ChartCatalog, KpiError> {
    let catalog: ChartCatalog = serde_json::from_str(json).map_err(|e| KpiError::CatalogLoad {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

/// Parse a chart catalog from a JSON string (no file path context).
pub fn parse_catalog_str(json: &str) -> Result<ChartCatalog, KpiError> {
    let catalog: ChartCatalog = serde_json::from_str(json).map_err(KpiError::Json)?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

/// Validate that a catalog is well-formed and all its patterns compile.
pub fn validate_catalog(catalog: &ChartCatalog) -> Result<(), KpiError> {
    if catalog.codes.is_empty() {
        return Err(KpiError::CatalogInvalid("codes must not be empty".into()));
    }

    if catalog.charts.is_empty() {
        return Err(KpiError::CatalogInvalid("charts must not be empty".into()));
    }

    if catalog.expected_rows == 0 {
        return Err(KpiError::CatalogInvalid(
            "expected_rows must be at least 1".into(),
        ));
    }

    Regex::new(&catalog.target_marker).map_err(|e| {
        KpiError::CatalogInvalid(format!(
            "target_marker '{}' is not a valid regex: {}",
            catalog.target_marker, e
        ))
    })?;

    if catalog.mass.min > catalog.mass.max {
        return Err(KpiError::CatalogInvalid(format!(
            "mass range is empty ({} > {})",
            catalog.mass.min, catalog.mass.max
        )));
    }

    if catalog.mass.canonical_digits == 0
        || catalog.mass.canonical_digits >= catalog.mass.glitch_min_digits
    {
        return Err(KpiError::CatalogInvalid(
            "mass.canonical_digits must be between 1 and glitch_min_digits - 1".into(),
        ));
    }

    let mut pages = HashSet::new();
    for page in &catalog.pages {
        if page.page == 0 {
            return Err(KpiError::CatalogInvalid("pages are 1-indexed".into()));
        }
        if !pages.insert(page.page) {
            return Err(KpiError::CatalogInvalid(format!(
                "page {} is configured twice",
                page.page
            )));
        }
        if page.columns == 0 || page.title_columns == 0 {
            return Err(KpiError::CatalogInvalid(format!(
                "page {} must have at least one column",
                page.page
            )));
        }
        check_band(page.y_top, page.y_bottom, &format!("page {}", page.page))?;
        check_band(
            page.title_band[0],
            page.title_band[1],
            &format!("page {} title_band", page.page),
        )?;
        if let Some(ref tiles) = page.summary_tiles {
            if tiles.columns == 0 {
                return Err(KpiError::CatalogInvalid(format!(
                    "page {} summary_tiles must have at least one column",
                    page.page
                )));
            }
            check_band(
                tiles.y_top,
                tiles.y_bottom,
                &format!("page {} summary_tiles", page.page),
            )?;
        }
    }

    let mut keys = HashSet::new();
    for chart in &catalog.charts {
        if chart.key.is_empty() {
            return Err(KpiError::CatalogInvalid(
                "chart key must not be empty".into(),
            ));
        }

        if !keys.insert(chart.key.as_str()) {
            return Err(KpiError::CatalogInvalid(format!(
                "chart '{}' is defined twice",
                chart.key
            )));
        }

        let page = catalog.page(chart.page).ok_or_else(|| {
            KpiError::CatalogInvalid(format!(
                "chart '{}' references unknown page {}",
                chart.key, chart.page
            ))
        })?;

        if chart.column >= page.columns {
            return Err(KpiError::CatalogInvalid(format!(
                "chart '{}' column {} is outside the {} column(s) of page {}",
                chart.key, chart.column, page.columns, page.page
            )));
        }

        for (name, split) in [
            ("label_split", chart.label_split),
            ("value_split", chart.value_split),
        ] {
            if !(0.0..=1.0).contains(&split) {
                return Err(KpiError::CatalogInvalid(format!(
                    "chart '{}' {} must be within 0..1, got {}",
                    chart.key, name, split
                )));
            }
        }

        if chart.tolerances.is_empty() {
            return Err(KpiError::CatalogInvalid(format!(
                "chart '{}' has no pairing tolerances",
                chart.key
            )));
        }

        let increasing = chart.tolerances.windows(2).all(|w| w[0] < w[1]);
        if chart.tolerances[0] <= 0.0 || !increasing {
            return Err(KpiError::CatalogInvalid(format!(
                "chart '{}' tolerances must be positive and strictly increasing",
                chart.key
            )));
        }

        Regex::new(&chart.title_pattern).map_err(|e| {
            KpiError::CatalogInvalid(format!(
                "chart '{}' title_pattern is not a valid regex: {}",
                chart.key, e
            ))
        })?;

        if let Some(tile) = chart.summary_tile {
            let tiles = page.summary_tiles.as_ref().ok_or_else(|| {
                KpiError::CatalogInvalid(format!(
                    "chart '{}' uses a summary tile but page {} has none",
                    chart.key, page.page
                ))
            })?;
            if tile >= tiles.columns {
                return Err(KpiError::CatalogInvalid(format!(
                    "chart '{}' summary tile {} is outside the {} tile(s)",
                    chart.key, tile, tiles.columns
                )));
            }
        }
    }

    Ok(())
}

fn check_band(top: f32, bottom: f32, what: &str) -> Result<(), KpiError> {
    if !(0.0..=1.0).contains(&top) || !(0.0..=1.0).contains(&bottom) || top >= bottom {
        return Err(KpiError::CatalogInvalid(format!(
            "{} band {}..{} must be ordered fractions within 0..1",
            what, top, bottom
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "name": "Test",
        "version": "1.0",
        "codes": ["AAA", "BBB"],
        "expected_rows": 2,
        "target_marker": "Target",
        "pages": [
            { "page": 1, "columns": 2, "margin": 3, "y_top": 0.2, "y_bottom": 0.9, "title_columns": 2 }
        ],
        "charts": [
            { "key": "K1", "label": "K1", "page": 1, "column": 0, "title_pattern": "K1 Perf", "unit": "percent" }
        ]
    }"#;

    #[test]
    fn test_parse_valid_catalog() {
        let c = parse_catalog_str(MINIMAL).unwrap();
        assert_eq!(c.name, "Test");
        assert_eq!(c.charts.len(), 1);
        // defaults filled in
        assert_eq!(c.charts[0].tolerances, vec![14.0, 26.0]);
        assert_eq!(c.axis_ticks.len(), 5);
        assert_eq!(c.alias_prefix, "ALIAS");
        assert!(c.charts[0].higher_is_better);
        assert_eq!(c.pages[0].target_window.title_right, 320.0);
    }

    #[test]
    fn test_partial_target_window() {
        let json = MINIMAL.replace(
            r#""title_columns": 2 }"#,
            r#""title_columns": 2, "target_window": { "title_down": 40 } }"#,
        );
        let c = parse_catalog_str(&json).unwrap();
        let window = c.pages[0].target_window;
        assert_eq!(window.title_down, 40.0);
        assert_eq!(window.title_up, 14.0);
        assert_eq!(window.band_below, 90.0);
    }

    #[test]
    fn test_unknown_page_rejected() {
        let json = MINIMAL.replace(r#""page": 1, "column""#, r#""page": 3, "column""#);
        assert!(matches!(
            parse_catalog_str(&json),
            Err(KpiError::CatalogInvalid(_))
        ));
    }

    #[test]
    fn test_column_out_of_range_rejected() {
        let json = MINIMAL.replace(r#""column": 0"#, r#""column": 2"#);
        assert!(parse_catalog_str(&json).is_err());
    }

    #[test]
    fn test_invalid_title_regex_rejected() {
        let json = MINIMAL.replace("K1 Perf", "K1 (Perf");
        assert!(parse_catalog_str(&json).is_err());
    }

    #[test]
    fn test_non_increasing_tolerances_rejected() {
        let json = MINIMAL.replace(
            r#""unit": "percent" }"#,
            r#""unit": "percent", "tolerances": [20, 10] }"#,
        );
        assert!(parse_catalog_str(&json).is_err());
    }

    #[test]
    fn test_summary_tile_without_tiles_rejected() {
        let json = MINIMAL.replace(
            r#""unit": "percent" }"#,
            r#""unit": "percent", "summary_tile": 0 }"#,
        );
        assert!(parse_catalog_str(&json).is_err());
    }

    #[test]
    fn test_empty_codes_rejected() {
        let json = MINIMAL.replace(r#"["AAA", "BBB"]"#, "[]");
        assert!(parse_catalog_str(&json).is_err());
    }
}

use kpiscan_core::catalog::builtin;
use kpiscan_core::error::KpiError;
use kpiscan_core::registry::CodeRegistry;
use std::path::{Path, PathBuf};

use crate::commands::resolve_catalog;

pub fn list() -> Result<(), KpiError> {
    println!("Available chart catalogs:\n");
    for name in builtin::PRESETS {
        let catalog = builtin::load_preset(name)?;
        println!(
            "  {:<10} {} (v{}), {} chart(s), {} code(s)",
            name,
            catalog.name,
            catalog.version,
            catalog.charts.len(),
            catalog.codes.len()
        );
        if let Some(ref desc) = catalog.description {
            println!("             {}", desc);
        }
        println!();
    }
    Ok(())
}

pub fn show(preset: &str) -> Result<(), KpiError> {
    let catalog = builtin::load_preset(preset)?;

    println!("{} (version {})\n", catalog.name, catalog.version);
    if let Some(ref desc) = catalog.description {
        println!("{}\n", desc);
    }
    println!(
        "A complete chart ranks {} codes. Targets follow /{}/.\n",
        catalog.expected_rows, catalog.target_marker
    );

    for page in &catalog.pages {
        println!(
            "Page {}: {} column(s), chart band {:.0}%-{:.0}% of height, {} title column(s)",
            page.page,
            page.columns,
            page.y_top * 100.0,
            page.y_bottom * 100.0,
            page.title_columns
        );
        println!();
        println!(
            "  {:<10} {:<20} {:<6} {:<7} {:<8} {:<6} Title",
            "Key", "Label", "Column", "Unit", "Better", "Tile"
        );
        println!("  {}", "-".repeat(72));
        for chart in catalog.charts_on_page(page.page) {
            let better = if chart.higher_is_better { "higher" } else { "lower" };
            let tile = chart
                .summary_tile
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".into());
            println!(
                "  {:<10} {:<20} {:<6} {:<7} {:<8} {:<6} /{}/",
                chart.key,
                chart.label,
                chart.column,
                chart.unit.to_string(),
                better,
                tile,
                chart.title_pattern
            );
        }
        println!();
    }

    println!(
        "Mass values: {}-{} kg; digit strings of {}+ digits keep their first {}.",
        catalog.mass.min,
        catalog.mass.max,
        catalog.mass.glitch_min_digits,
        catalog.mass.canonical_digits
    );
    println!();

    Ok(())
}

pub fn codes(file: Option<PathBuf>, preset: &str) -> Result<(), KpiError> {
    let catalog = resolve_catalog(file, preset)?;
    let registry = CodeRegistry::from_catalog(&catalog);
    for code in registry.codes() {
        println!("{code}");
    }
    Ok(())
}

pub fn schema() -> Result<(), KpiError> {
    print!(
        r#"JSON Chart Catalog Schema
=========================

A catalog describes one report template: which charts it contains, where
they are drawn and which codes they rank. `kpiscan extract` reads every
chart of the catalog from each page of the report.

Top-level fields:
  name            (string, required)  Human-readable name of the template
  description     (string, optional)  What this catalog is for
  version         (string, required)  Version identifier (e.g., "FY26.1")
  codes           (array, required)   Every code a chart may rank.
                                      Tokens matching a code exactly are labels.
  axis_ticks      (array, optional)   Axis labels never read as values.
                                      Default: ["0%","25%","50%","75%","100%"]
  expected_rows   (number, required)  Rows in a complete chart. Shorter
                                      charts raise a warning.
  target_marker   (string, required)  Regex preceding a target number,
                                      e.g. "FY\\d{{2}}\\s*Target"
  subject_prefix  (string, optional)  Word in front of the subject code in a
                                      station report heading, e.g. "EZY"
  alias_prefix    (string, optional)  Prefix of masked codes. Default: "ALIAS"
  mass            (object, optional)  min, max, glitch_min_digits,
                                      canonical_digits. Default: 100, 2000, 6, 3
  pages           (array, required)   Page geometry (see below)
  charts          (array, required)   Charts (see below)

Each entry in "pages":
  page            (number, required)  1-based page number
  columns         (number, required)  Equal-width chart columns
  margin          (number, required)  Horizontal margin inside a column
  y_top, y_bottom (number, required)  Chart band, fractions of page height
  title_band      (array, optional)   [min, max] fractions where titles count
  title_columns   (number, required)  Columns used by title-anchored regions
  title_margin, title_offset, title_depth
                  (number, optional)  Title-anchored rectangle. Default: 10, 8, 560
  inset_top, inset_bottom
                  (number, optional)  Rows ignored at the region edges. Default: 10, 2
  summary_tiles   (object, optional)  y_top, y_bottom, columns, inset of the
                                      network average tiles
  target_window   (object, optional)  Search area of the target annotation:
                                      title_left, title_right, title_up,
                                      title_down around the title, band_above,
                                      band_below around the region top.
                                      Default: 60, 320, 14, 80, 60, 90

Each entry in "charts":
  key             (string, required)  Unique chart key, e.g. "OETD"
  label           (string, required)  Display label
  page, column    (number, required)  Placement for fixed geometry
  title_pattern   (string, required)  Regex matching the chart title
  unit            (string, required)  "percent" or "mass"
  label_split     (number, optional)  Labels lie left of this fraction. Default: 0.60
  value_split     (number, optional)  Values lie right of this fraction. Default: 0.48
  tolerances      (array, optional)   Pairing tolerances, strictly increasing.
                                      Default: [14, 26]
  summary_tile    (number, optional)  Tile column holding the network average
  higher_is_better (bool, optional)   Direction of the target. Default: true

Example:
{{
  "name": "Regional report",
  "version": "1",
  "codes": ["AMS", "BCN", "SEN"],
  "expected_rows": 3,
  "target_marker": "FY\\d{{2}}\\s*Target",
  "pages": [
    {{ "page": 1, "columns": 2, "margin": 3, "y_top": 0.2, "y_bottom": 0.9, "title_columns": 2 }}
  ],
  "charts": [
    {{ "key": "OTP", "label": "On time", "page": 1, "column": 0,
       "title_pattern": "(?i)On\\s+time", "unit": "percent" }}
  ]
}}
"#
    );
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), KpiError> {
    let catalog = kpiscan_core::catalog::load_catalog(file)?;

    println!("Catalog '{}' (v{}) is valid.", catalog.name, catalog.version);
    println!("  Codes: {}", catalog.codes.len());
    println!(
        "  Charts: {}",
        catalog
            .charts
            .iter()
            .map(|c| c.key.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    // Suspicious but legal
    let mut warnings = Vec::new();
    if catalog.codes.len() != catalog.expected_rows {
        warnings.push(format!(
            "{} codes configured but expected_rows is {}",
            catalog.codes.len(),
            catalog.expected_rows
        ));
    }
    for chart in &catalog.charts {
        if chart.label_split < chart.value_split {
            warnings.push(format!(
                "chart '{}': tokens between {:.0}% and {:.0}% of the column are neither labels nor values",
                chart.key,
                chart.label_split * 100.0,
                chart.value_split * 100.0
            ));
        }
        if chart.tolerances.len() < 2 {
            warnings.push(format!(
                "chart '{}' has no relaxed pairing tolerance",
                chart.key
            ));
        }
    }

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}

use kpiscan_core::model::ChartResult;
use kpiscan_core::pseudonym::{self, MaskedEntry};
use kpiscan_core::trace::DebugRegion;
use kpiscan_core::ExtractionResult;

pub struct TableOptions<'a> {
    /// Code highlighted in every ranking.
    pub subject: Option<&'a str>,
    pub mask: bool,
    pub alias_prefix: &'a str,
    pub debug: bool,
}

pub fn print(result: &ExtractionResult, opts: &TableOptions<'_>) {
    for (i, chart) in result.charts.values().enumerate() {
        if i > 0 {
            println!();
        }
        let rows = match (opts.mask, opts.subject) {
            (true, Some(subject)) => {
                let map =
                    pseudonym::build_map_with_prefix(&chart.ranking, subject, opts.alias_prefix);
                pseudonym::mask(&chart.ranking, &map, subject)
            }
            _ => pseudonym::unmasked(&chart.ranking),
        };
        print_chart(chart, &rows, opts.subject);
    }

    let missing: Vec<&str> = result
        .debug_regions
        .iter()
        .filter(|d| !result.charts.contains_key(&d.key))
        .map(|d| d.key.as_str())
        .collect();
    if !missing.is_empty() {
        println!("\n  Not recognized: {}", missing.join(", "));
    }

    if !result.warnings.is_empty() {
        println!("\nWarnings:");
        for w in &result.warnings {
            println!("  [{}] {}", w.defect, w.message);
        }
    }

    if opts.debug {
        println!("\nRegions:");
        print_regions(&result.debug_regions);
    }
}

pub fn print_masked(chart: &ChartResult, rows: &[MaskedEntry], subject: &str) {
    print_chart(chart, rows, Some(subject));
}

fn print_chart(chart: &ChartResult, rows: &[MaskedEntry], subject: Option<&str>) {
    let mut header = format!("=== {} ===", chart.label);
    let mut facts = Vec::new();
    if let Some(target) = chart.target {
        facts.push(format!("target {}", chart.format_value(target)));
    }
    if let Some(avg) = chart.network_avg {
        facts.push(format!("network {}", chart.format_value(avg)));
    }
    if !facts.is_empty() {
        header = format!("{} ({})", header, facts.join(", "));
    }
    println!("{header}\n");

    let name_width = rows.iter().map(|r| r.alias.len()).max().unwrap_or(4).max(4);
    for (i, row) in rows.iter().enumerate() {
        let marker = match subject {
            Some(s) if row.code.eq_ignore_ascii_case(s) => ">",
            _ => " ",
        };
        let verdict = match chart.meets_target(row.value) {
            Some(true) => "ok",
            Some(false) if chart.higher_is_better => "below target",
            Some(false) => "above target",
            None => "",
        };
        println!(
            " {} {:>3}  {:<width$}  {:>8}  {}",
            marker,
            i + 1,
            row.alias,
            chart.format_value(row.value),
            verdict,
            width = name_width
        );
    }
}

fn print_regions(regions: &[DebugRegion]) {
    for region in regions {
        let rect = region
            .rect
            .map(|r| r.to_string())
            .unwrap_or_else(|| "not located".into());
        let tolerance = region
            .tolerance
            .map(|t| format!("{t}"))
            .unwrap_or_else(|| "-".into());
        println!(
            "  p{} {:<10} {}  [{}] labels {} values {} paired {} tolerance {}",
            region.page,
            region.key,
            rect,
            region.strategy,
            region.label_count,
            region.value_count,
            region.paired,
            tolerance
        );
        for step in &region.steps {
            println!("      {}", step.message);
        }
    }
}

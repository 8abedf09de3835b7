use crate::model::Unit;
use serde::{Deserialize, Serialize};

/// The charts of one report template and the geometry needed to read them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartCatalog {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    /// Known subject codes, in display order.
    pub codes: Vec<String>,
    /// Axis labels that look like values but never are.
    #[serde(default = "default_axis_ticks")]
    pub axis_ticks: Vec<String>,
    /// Number of rows a complete chart shows.
    pub expected_rows: usize,
    /// Regex fragment preceding the target number, e.g. `FY\d{2}\s*Target`.
    pub target_marker: String,
    /// Operator prefix in front of a subject code in a subject's own report.
    #[serde(default)]
    pub subject_prefix: Option<String>,
    #[serde(default = "default_alias_prefix")]
    pub alias_prefix: String,
    #[serde(default)]
    pub mass: MassRules,
    pub pages: Vec<PageGeometry>,
    pub charts: Vec<ChartSpec>,
}

impl ChartCatalog {
    pub fn page(&self, page_number: usize) -> Option<&PageGeometry> {
        self.pages.iter().find(|p| p.page == page_number)
    }

    pub fn chart(&self, key: &str) -> Option<&ChartSpec> {
        self.charts.iter().find(|c| c.key == key)
    }

    pub fn charts_on_page(&self, page_number: usize) -> impl Iterator<Item = &ChartSpec> {
        self.charts.iter().filter(move |c| c.page == page_number)
    }
}

/// Fixed layout of one page of the template. Vertical values are fractions of page height.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page: usize,
    /// Number of equal-width columns the page is divided into.
    pub columns: usize,
    pub margin: f32,
    pub y_top: f32,
    pub y_bottom: f32,
    /// Band (fractions of height) in which a chart title is accepted.
    #[serde(default = "default_title_band")]
    pub title_band: [f32; 2],
    pub title_columns: usize,
    #[serde(default = "default_title_margin")]
    pub title_margin: f32,
    /// Distance from title baseline to chart top.
    #[serde(default = "default_title_offset")]
    pub title_offset: f32,
    /// Distance from title baseline to chart bottom.
    #[serde(default = "default_title_depth")]
    pub title_depth: f32,
    #[serde(default = "default_inset_top")]
    pub inset_top: f32,
    #[serde(default = "default_inset_bottom")]
    pub inset_bottom: f32,
    #[serde(default)]
    pub summary_tiles: Option<SummaryTiles>,
    #[serde(default)]
    pub target_window: TargetWindow,
}

/// Where a chart's target annotation is searched, in page points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetWindow {
    /// Extent around the title anchor point.
    pub title_left: f32,
    pub title_right: f32,
    pub title_up: f32,
    pub title_down: f32,
    /// Band straddling the region top, used without a title.
    pub band_above: f32,
    pub band_below: f32,
}

impl Default for TargetWindow {
    fn default() -> Self {
        TargetWindow {
            title_left: 60.0,
            title_right: 320.0,
            title_up: 14.0,
            title_down: 80.0,
            band_above: 60.0,
            band_below: 90.0,
        }
    }
}

/// Row of summary tiles holding the network average of each chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryTiles {
    pub y_top: f32,
    pub y_bottom: f32,
    pub columns: usize,
    pub inset: f32,
}

/// One named metric chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSpec {
    pub key: String,
    pub label: String,
    pub page: usize,
    /// Column index used by deterministic geometry.
    pub column: usize,
    pub title_pattern: String,
    pub unit: Unit,
    /// Labels must lie left of `x1 + width * label_split`.
    #[serde(default = "default_label_split")]
    pub label_split: f32,
    /// Values must lie right of `x1 + width * value_split`.
    #[serde(default = "default_value_split")]
    pub value_split: f32,
    /// Pairing tolerances, primary first, each tier wider than the last.
    #[serde(default = "default_tolerances")]
    pub tolerances: Vec<f32>,
    /// Column of the summary tile carrying this chart's network average.
    #[serde(default)]
    pub summary_tile: Option<usize>,
    #[serde(default = "default_true")]
    pub higher_is_better: bool,
}

/// Normalization of mass values rendered with duplicated digits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MassRules {
    pub min: u32,
    pub max: u32,
    /// Digit strings at least this long are treated as glitched.
    pub glitch_min_digits: usize,
    /// Number of leading digits kept from a glitched string.
    pub canonical_digits: usize,
}

impl Default for MassRules {
    fn default() -> Self {
        MassRules {
            min: 100,
            max: 2000,
            glitch_min_digits: 6,
            canonical_digits: 3,
        }
    }
}

fn default_axis_ticks() -> Vec<String> {
    ["0%", "25%", "50%", "75%", "100%"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_alias_prefix() -> String {
    "ALIAS".to_string()
}

fn default_title_band() -> [f32; 2] {
    [0.18, 0.74]
}

fn default_title_margin() -> f32 {
    10.0
}

fn default_title_offset() -> f32 {
    8.0
}

fn default_title_depth() -> f32 {
    560.0
}

fn default_inset_top() -> f32 {
    10.0
}

fn default_inset_bottom() -> f32 {
    2.0
}

fn default_label_split() -> f32 {
    0.60
}

fn default_value_split() -> f32 {
    0.48
}

fn default_tolerances() -> Vec<f32> {
    vec![14.0, 26.0]
}

fn default_true() -> bool {
    true
}

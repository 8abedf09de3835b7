//! Region Locator: maps a chart on a page to the rectangle its bars are drawn in.

use crate::catalog::schema::{ChartSpec, PageGeometry};
use crate::model::{PageLayout, Rect, Token};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a chart's rectangle is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegionStrategy {
    /// Fixed fractions of the page, keyed by the chart's configured column.
    /// Never depends on token content.
    #[default]
    Fixed,
    /// Anchored on the chart's title token; `None` when the title is missing.
    TitleAnchored { columns: ColumnMode },
}

/// How a title-anchored chart picks its column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnMode {
    /// Title x position divided by the column width.
    #[default]
    Position,
    /// Left-to-right rank of the title among all titles located on the page.
    Rank,
}

impl fmt::Display for RegionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionStrategy::Fixed => write!(f, "fixed"),
            RegionStrategy::TitleAnchored {
                columns: ColumnMode::Position,
            } => write!(f, "title"),
            RegionStrategy::TitleAnchored {
                columns: ColumnMode::Rank,
            } => write!(f, "title-rank"),
        }
    }
}

impl RegionStrategy {
    /// Locate the rectangle for `chart` on `page`.
    pub fn locate(
        &self,
        page: &PageLayout,
        geometry: &PageGeometry,
        chart: &ChartSpec,
        titles: &PageTitles<'_>,
    ) -> Option<Rect> {
        match self {
            RegionStrategy::Fixed => fixed_rect(page, geometry, chart.column),
            RegionStrategy::TitleAnchored { columns } => {
                let title = titles.get(&chart.key)?;
                let column = match columns {
                    ColumnMode::Position => position_column(page, geometry, title),
                    ColumnMode::Rank => titles.rank_of(&chart.key)?,
                };
                title_rect(page, geometry, title, column)
            }
        }
    }
}

/// Titles of the charts configured on one page, as found on that page.
#[derive(Debug, Clone, Default)]
pub struct PageTitles<'a> {
    found: Vec<(&'a str, &'a Token)>,
}

impl<'a> PageTitles<'a> {
    /// Look up every chart's title on `page`. `charts` pairs each chart with its compiled title pattern.
    pub fn find<'c, I>(page: &'a PageLayout, geometry: &PageGeometry, charts: I) -> Self
    where
        I: IntoIterator<Item = (&'a ChartSpec, &'c Regex)>,
    {
        let found = charts
            .into_iter()
            .filter_map(|(chart, pattern)| {
                find_title(page, geometry, pattern).map(|t| (chart.key.as_str(), t))
            })
            .collect();
        PageTitles { found }
    }

    pub fn get(&self, key: &str) -> Option<&'a Token> {
        self.found.iter().find(|(k, _)| *k == key).map(|(_, t)| *t)
    }

    /// Left-to-right position of `key`'s title among the located titles.
    pub fn rank_of(&self, key: &str) -> Option<usize> {
        let mut ordered: Vec<&(&str, &Token)> = self.found.iter().collect();
        ordered.sort_by(|a, b| a.1.x.total_cmp(&b.1.x).then_with(|| a.0.cmp(b.0)));
        ordered.iter().position(|(k, _)| *k == key)
    }
}

/// Topmost token matching `pattern` inside the page's title band.
///
/// The band excludes the same title repeated in footers and legends.
pub fn find_title<'a>(
    page: &'a PageLayout,
    geometry: &PageGeometry,
    pattern: &Regex,
) -> Option<&'a Token> {
    let min_y = page.height * geometry.title_band[0];
    let max_y = page.height * geometry.title_band[1];

    page.tokens
        .iter()
        .filter(|t| t.y > min_y && t.y < max_y)
        .filter(|t| pattern.is_match(&t.text))
        .min_by(|a, b| a.y.total_cmp(&b.y))
}

/// Deterministic column rectangle from page fractions.
pub fn fixed_rect(page: &PageLayout, geometry: &PageGeometry, column: usize) -> Option<Rect> {
    if column >= geometry.columns {
        return None;
    }
    let col_w = page.width / geometry.columns as f32;
    Rect::new(
        column as f32 * col_w + geometry.margin,
        page.height * geometry.y_top,
        (column + 1) as f32 * col_w - geometry.margin,
        page.height * geometry.y_bottom,
    )
    .clip_to(page.width, page.height)
}

/// Column of a title from its horizontal position.
pub fn position_column(page: &PageLayout, geometry: &PageGeometry, title: &Token) -> usize {
    let col_w = page.width / geometry.title_columns as f32;
    let idx = (title.x / col_w).floor().max(0.0) as usize;
    idx.min(geometry.title_columns - 1)
}

/// Column rectangle hanging below a title token.
pub fn title_rect(
    page: &PageLayout,
    geometry: &PageGeometry,
    title: &Token,
    column: usize,
) -> Option<Rect> {
    let columns = geometry.title_columns;
    let column = column.min(columns.saturating_sub(1));
    let col_w = page.width / columns as f32;
    let margin = geometry.title_margin;

    Rect::new(
        column as f32 * col_w + margin,
        title.y + geometry.title_offset,
        (column + 1) as f32 * col_w - margin,
        (page.height - margin).min(title.y + geometry.title_depth),
    )
    .clip_to(page.width, page.height)
}

//! Scalar Extractor: the annotated target of a chart and the network average tiles.

use crate::catalog::schema::{SummaryTiles, TargetWindow};
use crate::model::{PageLayout, Rect, Token, Unit};
use crate::parsing::values::parse_percent;
use regex::Regex;

/// Minimum vertical distance two tokens may differ by and still share a line.
const MIN_LINE_TOLERANCE: f32 = 2.0;

/// Compiled target patterns, one per unit.
#[derive(Debug, Clone)]
pub struct TargetPattern {
    percent: Regex,
    mass: Regex,
}

impl TargetPattern {
    /// Build from a marker fragment such as `FY\d{2}\s*Target`.
    pub fn new(marker: &str) -> Result<Self, regex::Error> {
        Ok(TargetPattern {
            percent: Regex::new(&format!(r"(?i){marker}\s*(\d{{1,3}})\s*%"))?,
            mass: Regex::new(&format!(r"(?i){marker}\s*(\d{{1,5}})\s*k+g"))?,
        })
    }

    /// First target number in `text` for `unit`.
    pub fn find(&self, text: &str, unit: Unit) -> Option<u32> {
        let re = match unit {
            Unit::Percent => &self.percent,
            Unit::Mass => &self.mass,
        };
        let value: u32 = re.captures(text)?.get(1)?.as_str().parse().ok()?;
        match unit {
            Unit::Percent if value > 100 => None,
            _ => Some(value),
        }
    }
}

/// Target near the chart title, falling back to the band above the region.
pub fn extract_scalar(
    page: &PageLayout,
    anchor: Option<&Token>,
    rect: &Rect,
    unit: Unit,
    pattern: &TargetPattern,
    window: &TargetWindow,
) -> Option<u32> {
    let near_title = anchor
        .and_then(|title| title_window(page, title, window))
        .and_then(|area| scan_window(page, &area, unit, pattern));

    near_title.or_else(|| {
        top_band(page, rect, window).and_then(|area| scan_window(page, &area, unit, pattern))
    })
}

fn scan_window(page: &PageLayout, window: &Rect, unit: Unit, pattern: &TargetPattern) -> Option<u32> {
    let text = reading_order_text(page.tokens_within(window));
    pattern.find(&text, unit)
}

/// Window to the right of and below a title token.
pub fn title_window(page: &PageLayout, title: &Token, window: &TargetWindow) -> Option<Rect> {
    Rect::new(
        title.x - window.title_left,
        title.y - window.title_up,
        title.x + window.title_right,
        title.y + window.title_down,
    )
    .clip_to(page.width, page.height)
}

/// Band straddling the region's top edge.
pub fn top_band(page: &PageLayout, rect: &Rect, window: &TargetWindow) -> Option<Rect> {
    Rect::new(
        rect.x1,
        rect.y1 - window.band_above,
        rect.x2,
        rect.y1 + window.band_below,
    )
    .clip_to(page.width, page.height)
}

/// Group tokens into lines: top-to-bottom, then left-to-right within a line.
pub fn group_lines<'a, I>(tokens: I) -> Vec<Vec<&'a Token>>
where
    I: IntoIterator<Item = &'a Token>,
{
    let mut sorted: Vec<&Token> = tokens.into_iter().collect();
    sorted.sort_by(|a, b| a.y.total_cmp(&b.y).then_with(|| a.x.total_cmp(&b.x)));

    let mut lines: Vec<Vec<&Token>> = Vec::new();
    for token in sorted {
        let same_line = lines
            .last_mut()
            .filter(|line| (token.y - line[0].y).abs() <= line_tolerance(line[0]));
        if let Some(line) = same_line {
            line.push(token);
        } else {
            lines.push(vec![token]);
        }
    }

    for line in &mut lines {
        line.sort_by(|a, b| a.x.total_cmp(&b.x));
    }
    lines
}

fn line_tolerance(first: &Token) -> f32 {
    (first.h * 0.5).max(MIN_LINE_TOLERANCE)
}

/// Token texts in reading order, joined by single spaces.
pub fn reading_order_text<'a, I>(tokens: I) -> String
where
    I: IntoIterator<Item = &'a Token>,
{
    group_lines(tokens)
        .iter()
        .flatten()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Network average from the summary tile in `column`: the first percent token inside it.
pub fn summary_tile_value(page: &PageLayout, tiles: &SummaryTiles, column: usize) -> Option<u32> {
    if column >= tiles.columns {
        return None;
    }
    let col_w = page.width / tiles.columns as f32;
    let rect = Rect::new(
        column as f32 * col_w + tiles.inset,
        page.height * tiles.y_top,
        (column + 1) as f32 * col_w - tiles.inset,
        page.height * tiles.y_bottom,
    )
    .clip_to(page.width, page.height)?;

    let value = page.tokens_within(&rect).find_map(|t| parse_percent(&t.text));
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(tokens: Vec<Token>) -> PageLayout {
        PageLayout {
            page_number: 1,
            width: 800.0,
            height: 1000.0,
            tokens,
        }
    }

    fn defaults() -> TargetWindow {
        TargetWindow::default()
    }

    fn pattern() -> TargetPattern {
        TargetPattern::new(r"FY\d{2}\s*Target").unwrap()
    }

    #[test]
    fn test_find_percent_target() {
        let p = pattern();
        assert_eq!(p.find("OETD KPI FY26 Target 80%", Unit::Percent), Some(80));
        assert_eq!(p.find("fy26 target 75 %", Unit::Percent), Some(75));
        assert_eq!(p.find("Target 80%", Unit::Percent), None);
        assert_eq!(p.find("FY26 Target 180%", Unit::Percent), None);
    }

    #[test]
    fn test_find_mass_target() {
        let p = pattern();
        assert_eq!(p.find("FY26 Target 300kg", Unit::Mass), Some(300));
        assert_eq!(p.find("FY26 Target 300 kg", Unit::Mass), Some(300));
        assert_eq!(p.find("FY26 Target 300%", Unit::Mass), None);
    }

    #[test]
    fn test_reading_order_groups_lines() {
        // baseline jitter on one line must not reorder words
        let tokens = vec![
            Token::new("80%", 120.0, 100.0),
            Token::new("FY26 Target", 10.0, 100.6),
            Token::new("next line", 10.0, 120.0),
        ];
        assert_eq!(reading_order_text(&tokens), "FY26 Target 80% next line");
    }

    #[test]
    fn test_scalar_near_title() {
        let title = Token::new("OETD KPI Performance", 50.0, 200.0);
        let p = page(vec![
            title.clone(),
            Token::new("FY26 Target", 60.0, 220.0),
            Token::new("80%", 140.0, 220.0),
        ]);
        let rect = Rect::new(3.0, 240.0, 197.0, 930.0);
        assert_eq!(
            extract_scalar(&p, Some(&title), &rect, Unit::Percent, &pattern(), &defaults()),
            Some(80)
        );
    }

    #[test]
    fn test_scalar_top_band_without_title() {
        let p = page(vec![
            Token::new("FY26 Target", 20.0, 215.0),
            Token::new("70%", 100.0, 215.0),
        ]);
        let rect = Rect::new(3.0, 240.0, 197.0, 930.0);
        assert_eq!(
            extract_scalar(&p, None, &rect, Unit::Percent, &pattern(), &defaults()),
            Some(70)
        );
    }

    #[test]
    fn test_scalar_falls_back_when_title_window_empty() {
        let title = Token::new("OETD KPI Performance", 500.0, 100.0);
        let p = page(vec![
            title.clone(),
            Token::new("FY26 Target 65%", 20.0, 250.0),
        ]);
        let rect = Rect::new(3.0, 240.0, 197.0, 930.0);
        assert_eq!(
            extract_scalar(&p, Some(&title), &rect, Unit::Percent, &pattern(), &defaults()),
            Some(65)
        );
    }

    #[test]
    fn test_scalar_absent_is_none() {
        let p = page(vec![Token::new("No marker here 80%", 20.0, 250.0)]);
        let rect = Rect::new(3.0, 240.0, 197.0, 930.0);
        assert_eq!(
            extract_scalar(&p, None, &rect, Unit::Percent, &pattern(), &defaults()),
            None
        );
    }

    #[test]
    fn test_narrow_title_window_misses_target() {
        let title = Token::new("OETD KPI Performance", 50.0, 200.0);
        let p = page(vec![title.clone(), Token::new("FY26 Target 80%", 60.0, 260.0)]);
        let rect = Rect::new(3.0, 600.0, 197.0, 930.0);
        let narrow = TargetWindow {
            title_down: 20.0,
            ..defaults()
        };
        assert_eq!(
            extract_scalar(&p, Some(&title), &rect, Unit::Percent, &pattern(), &defaults()),
            Some(80)
        );
        assert_eq!(
            extract_scalar(&p, Some(&title), &rect, Unit::Percent, &pattern(), &narrow),
            None
        );
    }

    #[test]
    fn test_summary_tile_value() {
        let tiles = SummaryTiles {
            y_top: 0.06,
            y_bottom: 0.30,
            columns: 4,
            inset: 10.0,
        };
        let p = page(vec![
            Token::new("OETD - Network", 20.0, 80.0),
            Token::new("58%", 40.0, 120.0),
            Token::new("63%", 240.0, 120.0),
        ]);
        assert_eq!(summary_tile_value(&p, &tiles, 0), Some(58));
        assert_eq!(summary_tile_value(&p, &tiles, 1), Some(63));
        assert_eq!(summary_tile_value(&p, &tiles, 2), None);
        assert_eq!(summary_tile_value(&p, &tiles, 9), None);
    }
}

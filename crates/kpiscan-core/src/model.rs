use serde::{Deserialize, Serialize};
use std::fmt;

/// A piece of text recovered from a page, with its top-left-origin position and size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub w: f32,
    #[serde(default)]
    pub h: f32,
}

impl Token {
    pub fn new(text: impl Into<String>, x: f32, y: f32) -> Self {
        Token {
            text: text.into(),
            x,
            y,
            w: 0.0,
            h: 0.0,
        }
    }

    pub fn with_size(mut self, w: f32, h: f32) -> Self {
        self.w = w;
        self.h = h;
        self
    }
}

/// Positioned text of a single page. Pages are 1-indexed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_number: usize,
    pub width: f32,
    pub height: f32,
    pub tokens: Vec<Token>,
}

impl PageLayout {
    /// Tokens whose anchor point lies inside `rect` (boundaries inclusive), in page order.
    pub fn tokens_within<'a>(&'a self, rect: &'a Rect) -> impl Iterator<Item = &'a Token> + 'a {
        self.tokens.iter().filter(move |t| rect.contains(t.x, t.y))
    }
}

/// A serialized document as produced by an external layout collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub pages: Vec<PageLayout>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Rect {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Rect { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    /// Shrink vertically by `top` and `bottom`; horizontal extent is kept.
    pub fn inset_vertical(&self, top: f32, bottom: f32) -> Rect {
        Rect {
            x1: self.x1,
            x2: self.x2,
            y1: self.y1 + top,
            y2: self.y2 - bottom,
        }
    }

    /// Clip to the page. Returns `None` if nothing of the rectangle is left.
    pub fn clip_to(&self, width: f32, height: f32) -> Option<Rect> {
        let clipped = Rect {
            x1: self.x1.max(0.0),
            y1: self.y1.max(0.0),
            x2: self.x2.min(width),
            y2: self.y2.min(height),
        };
        if clipped.x1 < clipped.x2 && clipped.y1 < clipped.y2 {
            Some(clipped)
        } else {
            None
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.1}, {:.1}] - [{:.1}, {:.1}]",
            self.x1, self.y1, self.x2, self.y2
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Percent,
    Mass,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Percent => write!(f, "percent"),
            Unit::Mass => write!(f, "mass"),
        }
    }
}

/// A subject code recognized on the label side of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelToken {
    pub code: String,
    pub y: f32,
}

/// A unit-normalized number recognized on the value side of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueToken {
    pub y: f32,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub code: String,
    pub value: u32,
}

impl RankingEntry {
    pub fn new(code: impl Into<String>, value: u32) -> Self {
        RankingEntry {
            code: code.into(),
            value,
        }
    }
}

/// Extracted data for one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartResult {
    pub key: String,
    pub label: String,
    pub unit: Unit,
    pub higher_is_better: bool,
    pub target: Option<u32>,
    pub network_avg: Option<u32>,
    pub ranking: Vec<RankingEntry>,
}

impl ChartResult {
    /// Whether `value` reaches the chart target. `None` when the chart has no target.
    pub fn meets_target(&self, value: u32) -> Option<bool> {
        let target = self.target?;
        Some(if self.higher_is_better {
            value >= target
        } else {
            value <= target
        })
    }

    pub fn format_value(&self, value: u32) -> String {
        match self.unit {
            Unit::Percent => format!("{value}%"),
            Unit::Mass => format!("{value} kg"),
        }
    }
}

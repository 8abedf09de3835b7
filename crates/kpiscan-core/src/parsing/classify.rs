//! Token Classifier: splits the tokens of a chart region into subject labels and values.

use crate::catalog::schema::{ChartSpec, MassRules, PageGeometry};
use crate::model::{LabelToken, PageLayout, Rect, Token, Unit, ValueToken};
use crate::parsing::values::{parse_mass, parse_percent_value};
use crate::registry::CodeRegistry;
use std::collections::HashSet;

/// Horizontal bands and vertical inset applied to a chart region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnBands {
    pub label_split: f32,
    pub value_split: f32,
    pub inset_top: f32,
    pub inset_bottom: f32,
}

impl ColumnBands {
    pub fn for_chart(chart: &ChartSpec, geometry: &PageGeometry) -> Self {
        ColumnBands {
            label_split: chart.label_split,
            value_split: chart.value_split,
            inset_top: geometry.inset_top,
            inset_bottom: geometry.inset_bottom,
        }
    }
}

/// Labels and values of one region, both ordered top-to-bottom.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classified {
    pub labels: Vec<LabelToken>,
    pub values: Vec<ValueToken>,
}

pub struct TokenClassifier<'a> {
    registry: &'a CodeRegistry,
    mass: &'a MassRules,
}

impl<'a> TokenClassifier<'a> {
    pub fn new(registry: &'a CodeRegistry, mass: &'a MassRules) -> Self {
        TokenClassifier { registry, mass }
    }

    pub fn classify(
        &self,
        page: &PageLayout,
        rect: &Rect,
        unit: Unit,
        bands: &ColumnBands,
    ) -> Classified {
        let inner = rect.inset_vertical(bands.inset_top, bands.inset_bottom);
        let label_max_x = rect.x1 + rect.width() * bands.label_split;
        let value_min_x = rect.x1 + rect.width() * bands.value_split;

        let mut inside: Vec<&Token> = page.tokens_within(&inner).collect();
        sort_top_to_bottom(&mut inside);

        let mut seen = HashSet::new();
        let labels = inside
            .iter()
            .filter(|t| t.x <= label_max_x && self.registry.is_code(&t.text))
            .filter(|t| seen.insert(t.text.as_str()))
            .map(|t| LabelToken {
                code: t.text.clone(),
                y: t.y,
            })
            .collect();

        let values = inside
            .iter()
            .filter(|t| t.x >= value_min_x)
            .filter_map(|t| {
                self.parse_value(&t.text, unit)
                    .map(|value| ValueToken { y: t.y, value })
            })
            .collect();

        Classified { labels, values }
    }

    fn parse_value(&self, text: &str, unit: Unit) -> Option<u32> {
        match unit {
            Unit::Percent => parse_percent_value(text, self.registry),
            Unit::Mass => parse_mass(text, self.mass),
        }
    }
}

/// Sort by y, then x.
pub fn sort_top_to_bottom(tokens: &mut [&Token]) {
    tokens.sort_by(|a, b| a.y.total_cmp(&b.y).then_with(|| a.x.total_cmp(&b.x)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> CodeRegistry {
        CodeRegistry::new(["SEN", "BCN", "AMS"], ["0%", "25%", "50%", "75%", "100%"])
    }

    fn bands() -> ColumnBands {
        ColumnBands {
            label_split: 0.6,
            value_split: 0.48,
            inset_top: 10.0,
            inset_bottom: 2.0,
        }
    }

    fn page(tokens: Vec<Token>) -> PageLayout {
        PageLayout {
            page_number: 1,
            width: 400.0,
            height: 1000.0,
            tokens,
        }
    }

    // Region x 0..200: labels left of 120, values right of 96.
    const RECT: Rect = Rect {
        x1: 0.0,
        y1: 100.0,
        x2: 200.0,
        y2: 500.0,
    };

    #[test]
    fn test_split_labels_and_values() {
        let p = page(vec![
            Token::new("SEN", 10.0, 150.0),
            Token::new("80%", 150.0, 151.0),
            Token::new("BCN", 10.0, 170.0),
            Token::new("70%", 150.0, 171.0),
        ]);
        let reg = registry();
        let rules = MassRules::default();
        let c = TokenClassifier::new(&reg, &rules).classify(&p, &RECT, Unit::Percent, &bands());
        assert_eq!(c.labels.len(), 2);
        assert_eq!(c.labels[0].code, "SEN");
        assert_eq!(c.values.iter().map(|v| v.value).collect::<Vec<_>>(), vec![80, 70]);
    }

    #[test]
    fn test_label_right_of_split_ignored() {
        let p = page(vec![Token::new("SEN", 150.0, 150.0)]);
        let reg = registry();
        let rules = MassRules::default();
        let c = TokenClassifier::new(&reg, &rules).classify(&p, &RECT, Unit::Percent, &bands());
        assert!(c.labels.is_empty());
    }

    #[test]
    fn test_value_left_of_split_ignored() {
        let p = page(vec![Token::new("80%", 20.0, 150.0)]);
        let reg = registry();
        let rules = MassRules::default();
        let c = TokenClassifier::new(&reg, &rules).classify(&p, &RECT, Unit::Percent, &bands());
        assert!(c.values.is_empty());
    }

    #[test]
    fn test_axis_ticks_and_inset_rows_excluded() {
        let p = page(vec![
            Token::new("50%", 150.0, 300.0),
            Token::new("100%", 180.0, 300.0),
            // title row inside the top inset
            Token::new("88%", 150.0, 105.0),
            Token::new("64%", 150.0, 200.0),
        ]);
        let reg = registry();
        let rules = MassRules::default();
        let c = TokenClassifier::new(&reg, &rules).classify(&p, &RECT, Unit::Percent, &bands());
        assert_eq!(c.values, vec![ValueToken { y: 200.0, value: 64 }]);
    }

    #[test]
    fn test_duplicate_label_keeps_topmost() {
        let p = page(vec![
            Token::new("SEN", 10.0, 300.0),
            Token::new("SEN", 10.0, 150.0),
            Token::new("sen", 10.0, 200.0),
        ]);
        let reg = registry();
        let rules = MassRules::default();
        let c = TokenClassifier::new(&reg, &rules).classify(&p, &RECT, Unit::Percent, &bands());
        assert_eq!(
            c.labels,
            vec![LabelToken {
                code: "SEN".into(),
                y: 150.0
            }]
        );
    }

    #[test]
    fn test_output_sorted_top_to_bottom() {
        let p = page(vec![
            Token::new("AMS", 10.0, 400.0),
            Token::new("40%", 150.0, 400.0),
            Token::new("SEN", 10.0, 150.0),
            Token::new("90%", 150.0, 150.0),
        ]);
        let reg = registry();
        let rules = MassRules::default();
        let c = TokenClassifier::new(&reg, &rules).classify(&p, &RECT, Unit::Percent, &bands());
        assert_eq!(c.labels[0].code, "SEN");
        assert_eq!(c.values[0].value, 90);
    }

    #[test]
    fn test_mass_values_normalized() {
        let p = page(vec![
            Token::new("220099kkgg", 150.0, 150.0),
            Token::new("310 kg", 150.0, 170.0),
            Token::new("45%", 150.0, 190.0),
        ]);
        let reg = registry();
        let rules = MassRules::default();
        let c = TokenClassifier::new(&reg, &rules).classify(&p, &RECT, Unit::Mass, &bands());
        assert_eq!(c.values.iter().map(|v| v.value).collect::<Vec<_>>(), vec![220, 310]);
    }
}

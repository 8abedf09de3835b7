use crate::catalog::schema::MassRules;
use crate::registry::CodeRegistry;
use regex::Regex;
use std::sync::LazyLock;

static PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{1,3})%$").expect("valid percent regex"));

static MASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([0-9]{2,6})(?:\s*k+g+)?$").expect("valid mass regex")
});

/// Parse a chart value token rendered as a percentage.
///
/// Handles formats like:
/// - "91%" -> Some(91)
/// - "0%" -> Some(0) (callers filter axis ticks separately)
/// - "120%" -> None (outside 0..=100)
/// - "91 %", "91" -> None
pub fn parse_percent(s: &str) -> Option<u32> {
    let caps = PERCENT.captures(s.trim())?;
    let value: u32 = caps[1].parse().ok()?;
    (value <= 100).then_some(value)
}

/// Parse a chart value token rendered as a mass.
///
/// Handles formats like:
/// - "520kg", "520 kg", "520" -> Some(520)
/// - "220099kkgg" -> Some(220): the source renders some values with every digit
///   pair and the suffix duplicated; a digit string of at least
///   `glitch_min_digits` digits is cut to its first `canonical_digits` digits
/// - values outside `min..=max` -> None
pub fn parse_mass(s: &str, rules: &MassRules) -> Option<u32> {
    let caps = MASS.captures(s.trim())?;
    let digits = &caps[1];
    let canonical = if digits.len() >= rules.glitch_min_digits {
        &digits[..rules.canonical_digits]
    } else {
        digits
    };
    let value: u32 = canonical.parse().ok()?;
    (rules.min..=rules.max).contains(&value).then_some(value)
}

/// A percentage that is a data value: parses and is not an axis tick.
pub fn parse_percent_value(s: &str, registry: &CodeRegistry) -> Option<u32> {
    if registry.is_axis_tick(s.trim()) {
        return None;
    }
    parse_percent(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_plain() {
        assert_eq!(parse_percent("91%"), Some(91));
        assert_eq!(parse_percent("  7% "), Some(7));
    }

    #[test]
    fn test_percent_bounds() {
        assert_eq!(parse_percent("100%"), Some(100));
        assert_eq!(parse_percent("101%"), None);
        assert_eq!(parse_percent("1000%"), None);
    }

    #[test]
    fn test_percent_requires_sign() {
        assert_eq!(parse_percent("91"), None);
        assert_eq!(parse_percent("91 %"), None);
        assert_eq!(parse_percent("FY26 Target 80%"), None);
    }

    #[test]
    fn test_percent_value_skips_axis_ticks() {
        let r = CodeRegistry::new(Vec::<String>::new(), ["0%", "25%", "50%", "75%", "100%"]);
        assert_eq!(parse_percent_value("50%", &r), None);
        assert_eq!(parse_percent_value("51%", &r), Some(51));
    }

    #[test]
    fn test_mass_formats() {
        let rules = MassRules::default();
        assert_eq!(parse_mass("520kg", &rules), Some(520));
        assert_eq!(parse_mass("520 kg", &rules), Some(520));
        assert_eq!(parse_mass("520 KG", &rules), Some(520));
        assert_eq!(parse_mass("1340", &rules), Some(1340));
    }

    #[test]
    fn test_mass_duplicated_digits() {
        let rules = MassRules::default();
        assert_eq!(parse_mass("220099kkgg", &rules), Some(220));
        assert_eq!(parse_mass("330077kkgg", &rules), Some(330));
    }

    #[test]
    fn test_mass_out_of_range() {
        let rules = MassRules::default();
        assert_eq!(parse_mass("99 kg", &rules), None);
        assert_eq!(parse_mass("25000", &rules), None);
    }

    #[test]
    fn test_mass_rejects_other_text() {
        let rules = MassRules::default();
        assert_eq!(parse_mass("52%", &rules), None);
        assert_eq!(parse_mass("SEN", &rules), None);
        assert_eq!(parse_mass("5", &rules), None);
    }
}

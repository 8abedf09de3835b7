use crate::model::PageLayout;
use crate::parsing::scalar::group_lines;
use crate::registry::CodeRegistry;
use regex::Regex;

/// Detect the subject of a subject-level report from a `"<prefix> <CODE>"` heading.
///
/// Lines are read in page order; the prefix and code may be one token or two
/// neighbouring tokens of the same line. Only registered codes count.
pub fn detect_subject(
    pages: &[PageLayout],
    prefix: &str,
    registry: &CodeRegistry,
) -> Option<String> {
    let re = Regex::new(&format!(r"\b{}\s+([A-Z]{{3}})\b", regex::escape(prefix))).ok()?;

    for page in pages {
        for line in group_lines(&page.tokens) {
            let text = line
                .iter()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let found = re
                .captures_iter(&text)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str())
                .find(|code| registry.is_code(code));
            if let Some(code) = found {
                tracing::debug!(page = page.page_number, code, "detected report subject");
                return Some(code.to_string());
            }
        }
    }

    None
}

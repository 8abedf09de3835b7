pub mod json;
pub mod pdftotext;

use crate::error::KpiError;
use crate::model::{PageLayout, Token};

/// Trait for layout extraction backends.
pub trait LayoutExtractor: Send + Sync {
    /// Extract positioned text tokens from document bytes, one PageLayout per page.
    fn extract_layout(&self, bytes: &[u8]) -> Result<Vec<PageLayout>, KpiError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Trim token texts, drop empty tokens and renumber pages from 1.
pub(crate) fn normalize_pages(pages: Vec<PageLayout>) -> Vec<PageLayout> {
    pages
        .into_iter()
        .enumerate()
        .map(|(i, page)| PageLayout {
            page_number: i + 1,
            tokens: page
                .tokens
                .into_iter()
                .filter_map(|t| {
                    let text = t.text.trim();
                    if text.is_empty() {
                        None
                    } else if text.len() == t.text.len() {
                        Some(t)
                    } else {
                        Some(Token {
                            text: text.to_string(),
                            ..t
                        })
                    }
                })
                .collect(),
            ..page
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pages_trims_and_renumbers() {
        let pages = vec![PageLayout {
            page_number: 7,
            width: 100.0,
            height: 100.0,
            tokens: vec![
                Token::new("  SEN ", 1.0, 2.0),
                Token::new("   ", 1.0, 3.0),
                Token::new("80%", 5.0, 2.0),
            ],
        }];
        let pages = normalize_pages(pages);
        assert_eq!(pages[0].page_number, 1);
        let texts: Vec<&str> = pages[0].tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["SEN", "80%"]);
    }
}

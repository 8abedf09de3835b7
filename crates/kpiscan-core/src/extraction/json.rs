use crate::error::KpiError;
use crate::extraction::{normalize_pages, LayoutExtractor};
use crate::model::{LayoutDocument, PageLayout};

/// Reads a serialized `LayoutDocument`, as produced by an external layout tool.
pub struct JsonLayoutExtractor;

impl JsonLayoutExtractor {
    pub fn new() -> Self {
        JsonLayoutExtractor
    }
}

impl Default for JsonLayoutExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutExtractor for JsonLayoutExtractor {
    fn extract_layout(&self, bytes: &[u8]) -> Result<Vec<PageLayout>, KpiError> {
        let doc: LayoutDocument = serde_json::from_slice(bytes)
            .map_err(|e| KpiError::LayoutParse(format!("layout JSON: {e}")))?;
        Ok(normalize_pages(doc.pages))
    }

    fn backend_name(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_layout_document() {
        let json = r#"{
            "pages": [
                { "page_number": 1, "width": 595.0, "height": 842.0,
                  "tokens": [
                    { "text": "SEN", "x": 20.0, "y": 300.0, "h": 8.0 },
                    { "text": " ", "x": 40.0, "y": 300.0, "h": 8.0 },
                    { "text": " 80% ", "x": 120.0, "y": 301.0, "w": 14.0, "h": 8.0 }
                  ] }
            ]
        }"#;
        let pages = JsonLayoutExtractor::new()
            .extract_layout(json.as_bytes())
            .unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].tokens.len(), 2);
        assert_eq!(pages[0].tokens[1].text, "80%");
        assert_eq!(pages[0].tokens[0].w, 0.0);
    }

    #[test]
    fn test_malformed_json_is_layout_error() {
        let err = JsonLayoutExtractor::new()
            .extract_layout(b"{ not json")
            .unwrap_err();
        assert!(matches!(err, KpiError::LayoutParse(_)));
    }
}

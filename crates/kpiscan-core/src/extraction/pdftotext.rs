use crate::error::KpiError;
use crate::extraction::{normalize_pages, LayoutExtractor};
use crate::model::{PageLayout, Token};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::Write;
use std::process::Command;

/// Words closer than this fraction of their height join one text run.
const RUN_GAP_FACTOR: f32 = 0.35;

/// Layout backend using `pdftotext -bbox` (from poppler-utils).
///
/// Coordinates are PDF points with a top-left origin. Each token's `y` is the
/// bottom edge of its word box, which sits close to the text baseline.
pub struct PdftotextExtractor;

impl PdftotextExtractor {
    pub fn new() -> Self {
        PdftotextExtractor
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutExtractor for PdftotextExtractor {
    fn extract_layout(&self, bytes: &[u8]) -> Result<Vec<PageLayout>, KpiError> {
        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| KpiError::Extraction(e.to_string()))?;
        tmpfile
            .write_all(bytes)
            .map_err(|e| KpiError::Extraction(e.to_string()))?;

        let output = Command::new("pdftotext")
            .arg("-bbox")
            .arg(tmpfile.path())
            .arg("-")
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    KpiError::PdftotextNotFound
                } else {
                    KpiError::Extraction(format!("pdftotext failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(KpiError::PdftotextFailed { code, stderr });
        }

        let xml = String::from_utf8_lossy(&output.stdout);
        let pages = parse_bbox_xml(&xml)?;
        tracing::debug!(
            pages = pages.len(),
            tokens = pages.iter().map(|p| p.tokens.len()).sum::<usize>(),
            "pdftotext layout extracted"
        );
        Ok(pages)
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct WordBox {
    x_min: f32,
    y_min: f32,
    x_max: f32,
    y_max: f32,
}

impl WordBox {
    fn height(&self) -> f32 {
        self.y_max - self.y_min
    }
}

/// Parse the XHTML written by `pdftotext -bbox` into pages of merged text runs.
pub(crate) fn parse_bbox_xml(xml: &str) -> Result<Vec<PageLayout>, KpiError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut pages: Vec<PageLayout> = Vec::new();
    let mut words: Vec<(String, WordBox)> = Vec::new();
    let mut current_word: Option<WordBox> = None;
    let mut current_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"page" => {
                pages.push(start_page(&e, pages.len() + 1)?);
                words.clear();
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"page" => {
                pages.push(start_page(&e, pages.len() + 1)?);
            }
            Ok(Event::Start(e)) if e.name().as_ref() == b"word" => {
                current_word = Some(word_box(&e)?);
                current_text.clear();
            }
            Ok(Event::Text(t)) if current_word.is_some() => {
                let text = t
                    .unescape()
                    .map_err(|e| KpiError::LayoutParse(format!("bbox XML text: {e}")))?;
                current_text.push_str(&text);
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"word" => {
                if let Some(bbox) = current_word.take() {
                    let text = current_text.trim();
                    if !text.is_empty() {
                        words.push((text.to_string(), bbox));
                    }
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"page" => {
                if let Some(page) = pages.last_mut() {
                    page.tokens = merge_runs(&words);
                }
                words.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(KpiError::LayoutParse(format!(
                    "bbox XML at position {}: {}",
                    reader.error_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(normalize_pages(pages))
}

fn start_page(e: &BytesStart<'_>, page_number: usize) -> Result<PageLayout, KpiError> {
    Ok(PageLayout {
        page_number,
        width: attr_f32(e, "width")?,
        height: attr_f32(e, "height")?,
        tokens: Vec::new(),
    })
}

fn word_box(e: &BytesStart<'_>) -> Result<WordBox, KpiError> {
    Ok(WordBox {
        x_min: attr_f32(e, "xMin")?,
        y_min: attr_f32(e, "yMin")?,
        x_max: attr_f32(e, "xMax")?,
        y_max: attr_f32(e, "yMax")?,
    })
}

fn attr_f32(e: &BytesStart<'_>, name: &str) -> Result<f32, KpiError> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let attr = e
        .try_get_attribute(name)
        .map_err(|err| KpiError::LayoutParse(format!("<{tag}> attribute {name}: {err}")))?
        .ok_or_else(|| KpiError::LayoutParse(format!("<{tag}> is missing attribute {name}")))?;
    let value = attr
        .unescape_value()
        .map_err(|err| KpiError::LayoutParse(format!("<{tag}> attribute {name}: {err}")))?;
    value
        .trim()
        .parse()
        .map_err(|_| KpiError::LayoutParse(format!("<{tag}> attribute {name}={value} is not a number")))
}

/// Merge neighbouring words of one line into a single token.
///
/// pdftotext emits one box per word; chart titles such as "OETD KPI Performance"
/// are only matchable as one run. Words join when they share a bottom edge and
/// the horizontal gap is below `RUN_GAP_FACTOR` times the word height.
fn merge_runs(words: &[(String, WordBox)]) -> Vec<Token> {
    let mut runs: Vec<(String, WordBox)> = Vec::new();

    for (text, bbox) in words {
        let joins = runs.last().is_some_and(|(_, run)| {
            let h = run.height().max(bbox.height());
            let gap = bbox.x_min - run.x_max;
            (bbox.y_max - run.y_max).abs() <= h * 0.5 && gap >= -h * RUN_GAP_FACTOR && gap < h * RUN_GAP_FACTOR
        });

        match runs.last_mut() {
            Some((run_text, run)) if joins => {
                run_text.push(' ');
                run_text.push_str(text);
                run.x_max = run.x_max.max(bbox.x_max);
                run.y_min = run.y_min.min(bbox.y_min);
                run.y_max = run.y_max.max(bbox.y_max);
            }
            _ => runs.push((text.clone(), *bbox)),
        }
    }

    runs.into_iter()
        .map(|(text, b)| Token::new(text, b.x_min, b.y_max).with_size(b.x_max - b.x_min, b.height()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">
<html xmlns="http://www.w3.org/1999/xhtml">
<head>
<title></title>
<meta name="Producer" content="Skia/PDF m120"/>
</head>
<body>
<doc>
  <page width="841.890000" height="595.276000">
    <word xMin="20.000000" yMin="120.000000" xMax="42.000000" yMax="130.000000">OETD</word>
    <word xMin="44.500000" yMin="120.000000" xMax="60.000000" yMax="130.000000">KPI</word>
    <word xMin="62.000000" yMin="120.000000" xMax="110.000000" yMax="130.000000">Performance</word>
    <word xMin="20.000000" yMin="200.000000" xMax="36.000000" yMax="208.000000">SEN</word>
    <word xMin="150.000000" yMin="200.000000" xMax="166.000000" yMax="208.000000">80%</word>
    <word xMin="20.000000" yMin="220.000000" xMax="40.000000" yMax="228.000000">R&amp;D</word>
  </page>
  <page width="841.890000" height="595.276000">
  </page>
</doc>
</body>
</html>"#;

    #[test]
    fn test_parse_bbox_pages() {
        let pages = parse_bbox_xml(XML).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[1].page_number, 2);
        assert!(pages[1].tokens.is_empty());
        assert!((pages[0].width - 841.89).abs() < 0.01);
    }

    #[test]
    fn test_words_merged_into_runs() {
        let pages = parse_bbox_xml(XML).unwrap();
        let texts: Vec<&str> = pages[0].tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["OETD KPI Performance", "SEN", "80%", "R&D"]);
    }

    #[test]
    fn test_token_anchor_is_bottom_left() {
        let pages = parse_bbox_xml(XML).unwrap();
        let title = &pages[0].tokens[0];
        assert_eq!(title.x, 20.0);
        assert_eq!(title.y, 130.0);
        assert_eq!(title.w, 90.0);
        assert_eq!(title.h, 10.0);
    }

    #[test]
    fn test_missing_attribute_is_layout_error() {
        let xml = r#"<doc><page width="10" height="10"><word xMin="1">X</word></page></doc>"#;
        assert!(matches!(
            parse_bbox_xml(xml),
            Err(KpiError::LayoutParse(_))
        ));
    }

    #[test]
    fn test_distant_words_stay_separate() {
        let b = |x: f32| WordBox {
            x_min: x,
            y_min: 0.0,
            x_max: x + 10.0,
            y_max: 10.0,
        };
        let words = vec![("A".to_string(), b(0.0)), ("B".to_string(), b(20.0))];
        assert_eq!(merge_runs(&words).len(), 2);
    }
}

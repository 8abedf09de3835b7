use crate::model::Rect;
use crate::parsing::region::RegionStrategy;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceSeverity {
    Critical,
    Important,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceVisibility {
    Always,
    Auto,
    OnDemand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStepType {
    LocateRegion,
    Classify,
    Pair,
    ExtractTarget,
    SummaryTile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceStep {
    pub step_type: TraceStepType,
    pub message: String,
}

impl TraceStep {
    pub fn new(step_type: TraceStepType, message: impl Into<String>) -> Self {
        TraceStep {
            step_type,
            message: message.into(),
        }
    }
}

/// Diagnostic record of one attempted chart. Never feeds back into extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugRegion {
    pub page: usize,
    pub key: String,
    /// `None` when no region could be located.
    pub rect: Option<Rect>,
    pub strategy: RegionStrategy,
    pub label_count: usize,
    pub value_count: usize,
    pub paired: usize,
    /// Tolerance of the adopted pairing pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f32>,
    pub steps: Vec<TraceStep>,
}

/// Which side a short chart is most likely broken on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectKind {
    /// Too few labels or values were recognized in the region.
    Parsing,
    /// Labels and values were all there but could not all be paired.
    Display,
}

impl fmt::Display for DefectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefectKind::Parsing => write!(f, "parsing"),
            DefectKind::Display => write!(f, "display"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceWarning {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<String>,
    pub defect: DefectKind,
    pub message: String,
    pub severity: TraceSeverity,
    pub visibility: TraceVisibility,
}

/// Warning for a chart whose row count deviates from `expected_rows`.
pub fn structural_warning(region: &DebugRegion, expected_rows: usize) -> Option<TraceWarning> {
    if region.paired == expected_rows {
        return None;
    }

    let (defect, message) =
        if region.label_count < expected_rows || region.value_count < expected_rows {
            (
                DefectKind::Parsing,
                format!(
                    "{}: {} of {} rows extracted; only {} code(s) and {} value(s) recognized in the chart region",
                    region.key, region.paired, expected_rows, region.label_count, region.value_count
                ),
            )
        } else {
            (
                DefectKind::Display,
                format!(
                    "{}: {} of {} rows extracted although {} code(s) and {} value(s) were recognized; labels and bars are misaligned",
                    region.key, region.paired, expected_rows, region.label_count, region.value_count
                ),
            )
        };

    Some(TraceWarning {
        chart: Some(region.key.clone()),
        defect,
        message,
        severity: TraceSeverity::Important,
        visibility: TraceVisibility::Always,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(labels: usize, values: usize, paired: usize) -> DebugRegion {
        DebugRegion {
            page: 1,
            key: "OETD".into(),
            rect: Some(Rect::new(0.0, 0.0, 10.0, 10.0)),
            strategy: RegionStrategy::Fixed,
            label_count: labels,
            value_count: values,
            paired,
            tolerance: Some(14.0),
            steps: vec![],
        }
    }

    #[test]
    fn test_complete_chart_has_no_warning() {
        assert!(structural_warning(&region(30, 30, 30), 30).is_none());
    }

    #[test]
    fn test_missing_labels_is_parsing_defect() {
        let w = structural_warning(&region(28, 30, 28), 30).unwrap();
        assert_eq!(w.defect, DefectKind::Parsing);
        assert!(w.message.contains("28 of 30"));
    }

    #[test]
    fn test_unpaired_rows_is_display_defect() {
        let w = structural_warning(&region(30, 31, 27), 30).unwrap();
        assert_eq!(w.defect, DefectKind::Display);
        assert_eq!(w.chart.as_deref(), Some("OETD"));
    }
}

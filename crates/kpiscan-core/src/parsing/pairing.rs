//! Pairing Engine: greedy nearest-vertical-neighbour matching of labels to values.
//!
//! Each label, top to bottom, takes the closest unused value if it lies within the
//! tolerance. There is no backtracking: an early label can claim a value that was the
//! true partner of a later one. Wider tolerance tiers are retried from scratch only
//! when the region holds exactly one full chart of labels and values but pairing came
//! up short, and a tier replaces the current best only with strictly more pairs.

use crate::model::{LabelToken, RankingEntry, ValueToken};
use serde::{Deserialize, Serialize};

/// One pass of the matcher at a fixed tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairingAttempt {
    pub tolerance: f32,
    pub paired: usize,
    pub adopted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairingOutcome {
    pub ranking: Vec<RankingEntry>,
    pub label_count: usize,
    pub value_count: usize,
    /// Tolerance of the adopted pass.
    pub tolerance: f32,
    pub attempts: Vec<PairingAttempt>,
}

/// Single greedy pass at `tolerance`.
pub fn pair_at(labels: &[LabelToken], values: &[ValueToken], tolerance: f32) -> Vec<RankingEntry> {
    let mut used = vec![false; values.len()];
    let mut ranking = Vec::new();

    for label in labels {
        let mut best: Option<(usize, f32)> = None;
        for (i, value) in values.iter().enumerate() {
            if used[i] {
                continue;
            }
            let dy = (value.y - label.y).abs();
            if best.map_or(true, |(_, best_dy)| dy < best_dy) {
                best = Some((i, dy));
            }
        }

        if let Some((i, dy)) = best {
            if dy <= tolerance {
                used[i] = true;
                ranking.push(RankingEntry {
                    code: label.code.clone(),
                    value: values[i].value,
                });
            }
        }
    }

    ranking
}

/// Pair with the primary tolerance, retrying wider tiers while a full chart is short.
///
/// `tolerances[0]` is the primary tolerance; later entries are the relaxed tiers.
pub fn pair(
    labels: &[LabelToken],
    values: &[ValueToken],
    tolerances: &[f32],
    expected_rows: usize,
) -> PairingOutcome {
    let mut outcome = PairingOutcome {
        ranking: Vec::new(),
        label_count: labels.len(),
        value_count: values.len(),
        tolerance: 0.0,
        attempts: Vec::new(),
    };

    let Some((&primary, relaxed)) = tolerances.split_first() else {
        return outcome;
    };

    outcome.ranking = pair_at(labels, values, primary);
    outcome.tolerance = primary;
    outcome.attempts.push(PairingAttempt {
        tolerance: primary,
        paired: outcome.ranking.len(),
        adopted: true,
    });

    let full_chart = labels.len() == expected_rows && values.len() == expected_rows;

    for &tolerance in relaxed {
        if !full_chart || outcome.ranking.len() >= expected_rows {
            break;
        }

        let candidate = pair_at(labels, values, tolerance);
        let adopted = candidate.len() > outcome.ranking.len();
        outcome.attempts.push(PairingAttempt {
            tolerance,
            paired: candidate.len(),
            adopted,
        });

        if adopted {
            for attempt in outcome.attempts.iter_mut() {
                attempt.adopted = attempt.tolerance == tolerance;
            }
            outcome.ranking = candidate;
            outcome.tolerance = tolerance;
        }
    }

    outcome
}

//! Per-product effect aggregation

use crate::models::CheckIn;
use serde::Serialize;

/// Average composites over every check-in recorded for a product
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectAverages {
    pub positive: f64,
    pub negative: f64,
    /// Number of check-ins averaged
    pub check_ins: usize,
}

impl EffectAverages {
    /// Ranking score: positive minus negative, never clamped
    pub fn score(&self) -> f64 {
        self.positive - self.negative
    }
}

/// Average the composites of `check_ins`.
///
/// Returns `None` when there is nothing to average, which is distinct from
/// a product whose feedback averages to zero.
pub fn average_effects<'a, I>(check_ins: I) -> Option<EffectAverages>
where
    I: IntoIterator<Item = &'a CheckIn>,
{
    let mut positive_sum = 0.0;
    let mut negative_sum = 0.0;
    let mut count = 0usize;

    for check_in in check_ins {
        positive_sum += check_in.positive_composite();
        negative_sum += check_in.negative_composite();
        count += 1;
    }

    if count == 0 {
        return None;
    }

    Some(EffectAverages {
        positive: positive_sum / count as f64,
        negative: negative_sum / count as f64,
        check_ins: count,
    })
}

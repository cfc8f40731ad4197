//! Confidence tiers derived from session counts

use serde::Serialize;
use std::fmt;

/// Sessions needed for a High tier
pub const HIGH_CONFIDENCE_SESSIONS: usize = 5;
/// Sessions needed for a Medium tier
pub const MEDIUM_CONFIDENCE_SESSIONS: usize = 2;

/// Coarse reliability label for a recommendation, ordered Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Tier for a product with `session_count` logged sessions
    pub fn from_session_count(session_count: usize) -> Self {
        if session_count >= HIGH_CONFIDENCE_SESSIONS {
            Confidence::High
        } else if session_count >= MEDIUM_CONFIDENCE_SESSIONS {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

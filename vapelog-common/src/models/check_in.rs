//! Check-in model and effect composites
//!
//! A check-in is a follow-up effect report taken some minutes after a
//! session. Each rating is optional and on a 0-10 scale.

use crate::models::{CheckInId, SessionId};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Nominal check-in points, in minutes after the session
pub const CHECKPOINT_MINUTES: [i64; 3] = [30, 60, 120];

/// Highest value on the rating scale
pub const MAX_RATING: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

/// Rated effect attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    Awake,
    Active,
    Cerebral,
    Social,
    Euphoric,
    Creative,
    Focused,
    Tired,
    Groggy,
    Anxious,
    Antisocial,
    Paranoia,
    DryMouth,
    DryEyes,
    RacingHeart,
}

impl Effect {
    pub const POSITIVE: [Effect; 7] = [
        Effect::Awake,
        Effect::Active,
        Effect::Cerebral,
        Effect::Social,
        Effect::Euphoric,
        Effect::Creative,
        Effect::Focused,
    ];

    pub const NEGATIVE: [Effect; 8] = [
        Effect::Tired,
        Effect::Groggy,
        Effect::Anxious,
        Effect::Antisocial,
        Effect::Paranoia,
        Effect::DryMouth,
        Effect::DryEyes,
        Effect::RacingHeart,
    ];

    /// Attribute name as stored and exported
    pub fn field_name(&self) -> &'static str {
        match self {
            Effect::Awake => "awake",
            Effect::Active => "active",
            Effect::Cerebral => "cerebral",
            Effect::Social => "social",
            Effect::Euphoric => "euphoric",
            Effect::Creative => "creative",
            Effect::Focused => "focused",
            Effect::Tired => "tired",
            Effect::Groggy => "groggy",
            Effect::Anxious => "anxious",
            Effect::Antisocial => "antisocial",
            Effect::Paranoia => "paranoia",
            Effect::DryMouth => "dryMouth",
            Effect::DryEyes => "dryEyes",
            Effect::RacingHeart => "racingHeart",
        }
    }

    pub fn polarity(&self) -> Polarity {
        if Effect::POSITIVE.contains(self) {
            Polarity::Positive
        } else {
            Polarity::Negative
        }
    }

    /// Every effect, positive group first
    pub fn all() -> impl Iterator<Item = Effect> {
        Effect::POSITIVE.into_iter().chain(Effect::NEGATIVE)
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

impl FromStr for Effect {
    type Err = Error;

    /// Accepts the attribute name case-insensitively, with or without
    /// separators ("dryMouth", "dry_mouth", "dry-mouth")
    fn from_str(s: &str) -> Result<Self> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        Effect::all()
            .find(|e| e.field_name().to_ascii_lowercase() == wanted)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown effect: {}", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    #[serde(default)]
    pub id: Option<CheckInId>,
    pub session_id: SessionId,
    /// Usually one of [`CHECKPOINT_MINUTES`], not enforced
    pub minutes_after: i64,
    pub timestamp: DateTime<Utc>,

    // Positive effects
    #[serde(default)]
    pub awake: Option<u8>,
    #[serde(default)]
    pub active: Option<u8>,
    #[serde(default)]
    pub cerebral: Option<u8>,
    #[serde(default)]
    pub social: Option<u8>,
    #[serde(default)]
    pub euphoric: Option<u8>,
    #[serde(default)]
    pub creative: Option<u8>,
    #[serde(default)]
    pub focused: Option<u8>,

    // Negative effects
    #[serde(default)]
    pub tired: Option<u8>,
    #[serde(default)]
    pub groggy: Option<u8>,
    #[serde(default)]
    pub anxious: Option<u8>,
    #[serde(default)]
    pub antisocial: Option<u8>,
    #[serde(default)]
    pub paranoia: Option<u8>,
    #[serde(default)]
    pub dry_mouth: Option<u8>,
    #[serde(default)]
    pub dry_eyes: Option<u8>,
    #[serde(default)]
    pub racing_heart: Option<u8>,

    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CheckIn {
    /// Create an unsaved check-in with no ratings
    pub fn new(session_id: SessionId, minutes_after: i64) -> Self {
        let now = crate::time::now();
        Self {
            id: None,
            session_id,
            minutes_after,
            timestamp: now,
            awake: None,
            active: None,
            cerebral: None,
            social: None,
            euphoric: None,
            creative: None,
            focused: None,
            tired: None,
            groggy: None,
            anxious: None,
            antisocial: None,
            paranoia: None,
            dry_mouth: None,
            dry_eyes: None,
            racing_heart: None,
            notes: None,
            created_at: now,
        }
    }

    pub fn rating(&self, effect: Effect) -> Option<u8> {
        match effect {
            Effect::Awake => self.awake,
            Effect::Active => self.active,
            Effect::Cerebral => self.cerebral,
            Effect::Social => self.social,
            Effect::Euphoric => self.euphoric,
            Effect::Creative => self.creative,
            Effect::Focused => self.focused,
            Effect::Tired => self.tired,
            Effect::Groggy => self.groggy,
            Effect::Anxious => self.anxious,
            Effect::Antisocial => self.antisocial,
            Effect::Paranoia => self.paranoia,
            Effect::DryMouth => self.dry_mouth,
            Effect::DryEyes => self.dry_eyes,
            Effect::RacingHeart => self.racing_heart,
        }
    }

    pub fn set_rating(&mut self, effect: Effect, value: Option<u8>) {
        let slot = match effect {
            Effect::Awake => &mut self.awake,
            Effect::Active => &mut self.active,
            Effect::Cerebral => &mut self.cerebral,
            Effect::Social => &mut self.social,
            Effect::Euphoric => &mut self.euphoric,
            Effect::Creative => &mut self.creative,
            Effect::Focused => &mut self.focused,
            Effect::Tired => &mut self.tired,
            Effect::Groggy => &mut self.groggy,
            Effect::Anxious => &mut self.anxious,
            Effect::Antisocial => &mut self.antisocial,
            Effect::Paranoia => &mut self.paranoia,
            Effect::DryMouth => &mut self.dry_mouth,
            Effect::DryEyes => &mut self.dry_eyes,
            Effect::RacingHeart => &mut self.racing_heart,
        };
        *slot = value;
    }

    /// Mean of the positive ratings that are set; 0 when none are
    pub fn positive_composite(&self) -> f64 {
        self.composite(&Effect::POSITIVE)
    }

    /// Mean of the negative ratings that are set; 0 when none are
    pub fn negative_composite(&self) -> f64 {
        self.composite(&Effect::NEGATIVE)
    }

    fn composite(&self, group: &[Effect]) -> f64 {
        let (sum, count) = group
            .iter()
            .filter_map(|effect| self.rating(*effect))
            .fold((0u32, 0u32), |(sum, count), value| (sum + u32::from(value), count + 1));

        if count == 0 {
            0.0
        } else {
            f64::from(sum) / f64::from(count)
        }
    }

    /// Check every set rating is within 0-10
    pub fn validate(&self) -> Result<()> {
        for effect in Effect::all() {
            if let Some(value) = self.rating(effect) {
                if value > MAX_RATING {
                    return Err(Error::InvalidInput(format!(
                        "{} rating must be between 0 and {}, got {}",
                        effect, MAX_RATING, value
                    )));
                }
            }
        }
        Ok(())
    }
}

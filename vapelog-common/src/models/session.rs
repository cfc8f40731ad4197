//! Session model - one usage event of a product

use crate::models::{ProductId, SessionId};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub id: Option<SessionId>,
    pub product_id: ProductId,
    pub date_time: DateTime<Utc>,
    #[serde(default)]
    pub dose_mg: Option<f64>,
    /// "mg", "g", "puffs", ...
    #[serde(default)]
    pub dose_units: Option<String>,

    // Context
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub with_company: bool,
    #[serde(default)]
    pub had_caffeine: bool,
    #[serde(default)]
    pub had_alcohol: bool,
    #[serde(default)]
    pub had_food: bool,
    /// 1-5
    #[serde(default)]
    pub sleep_quality: Option<u8>,

    // Pre-session state, 1-10
    #[serde(default)]
    pub pre_mood: Option<u8>,
    #[serde(default)]
    pub pre_stress: Option<u8>,

    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create an unsaved session for `product_id` at `date_time`
    pub fn new(product_id: ProductId, date_time: DateTime<Utc>) -> Self {
        let now = crate::time::now();
        Self {
            id: None,
            product_id,
            date_time: crate::time::truncate_to_storage(date_time),
            dose_mg: None,
            dose_units: None,
            location: None,
            with_company: false,
            had_caffeine: false,
            had_alcohol: false,
            had_food: false,
            sleep_quality: None,
            pre_mood: None,
            pre_stress: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check ordinal scales and dose before persisting
    pub fn validate(&self) -> Result<()> {
        check_scale("sleepQuality", self.sleep_quality, 1, 5)?;
        check_scale("preMood", self.pre_mood, 1, 10)?;
        check_scale("preStress", self.pre_stress, 1, 10)?;

        if let Some(dose) = self.dose_mg {
            if !dose.is_finite() || dose < 0.0 {
                return Err(Error::InvalidInput(format!("doseMg must be non-negative: {}", dose)));
            }
        }

        Ok(())
    }
}

fn check_scale(field: &str, value: Option<u8>, min: u8, max: u8) -> Result<()> {
    match value {
        Some(v) if v < min || v > max => Err(Error::InvalidInput(format!(
            "{} must be between {} and {}, got {}",
            field, min, max, v
        ))),
        _ => Ok(()),
    }
}

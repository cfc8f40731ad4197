//! Product model
//!
//! A consumable item with an optional cannabinoid and terpene profile.
//! Unset profile values mean "unknown", never zero.

use crate::models::{ProductId, Terpene};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Product form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Flower,
    Concentrate,
    Edible,
    Tincture,
    Topical,
    Vape,
    Other,
}

impl ProductType {
    pub const ALL: [ProductType; 7] = [
        ProductType::Flower,
        ProductType::Concentrate,
        ProductType::Edible,
        ProductType::Tincture,
        ProductType::Topical,
        ProductType::Vape,
        ProductType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Flower => "flower",
            ProductType::Concentrate => "concentrate",
            ProductType::Edible => "edible",
            ProductType::Tincture => "tincture",
            ProductType::Topical => "topical",
            ProductType::Vape => "vape",
            ProductType::Other => "other",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ProductType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidInput(format!("Unknown product type: {}", s)))
    }
}

/// How the product is consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsumptionRoute {
    Inhalation,
    Oral,
    Sublingual,
    Topical,
}

impl ConsumptionRoute {
    pub const ALL: [ConsumptionRoute; 4] = [
        ConsumptionRoute::Inhalation,
        ConsumptionRoute::Oral,
        ConsumptionRoute::Sublingual,
        ConsumptionRoute::Topical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsumptionRoute::Inhalation => "inhalation",
            ConsumptionRoute::Oral => "oral",
            ConsumptionRoute::Sublingual => "sublingual",
            ConsumptionRoute::Topical => "topical",
        }
    }
}

impl fmt::Display for ConsumptionRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsumptionRoute {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ConsumptionRoute::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidInput(format!("Unknown consumption route: {}", s)))
    }
}

/// Cannabinoids with a tracked percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cannabinoid {
    Thc,
    Cbd,
    Cbg,
    Thcv,
}

impl Cannabinoid {
    pub const ALL: [Cannabinoid; 4] = [
        Cannabinoid::Thc,
        Cannabinoid::Cbd,
        Cannabinoid::Cbg,
        Cannabinoid::Thcv,
    ];

    /// Label name ("THC", "CBD", ...)
    pub fn name(&self) -> &'static str {
        match self {
            Cannabinoid::Thc => "THC",
            Cannabinoid::Cbd => "CBD",
            Cannabinoid::Cbg => "CBG",
            Cannabinoid::Thcv => "THCV",
        }
    }
}

impl FromStr for Cannabinoid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Cannabinoid::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidInput(format!("Unknown cannabinoid: {}", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub id: Option<ProductId>,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub route: ConsumptionRoute,

    // Cannabinoids (percent)
    #[serde(default)]
    pub thc_percent: Option<f64>,
    #[serde(default)]
    pub cbd_percent: Option<f64>,
    #[serde(default)]
    pub cbg_percent: Option<f64>,
    #[serde(default)]
    pub thcv_percent: Option<f64>,

    // Terpenes (percent or mg/g, as printed on the label)
    #[serde(default)]
    pub myrcene: Option<f64>,
    #[serde(default)]
    pub limonene: Option<f64>,
    #[serde(default)]
    pub pinene: Option<f64>,
    #[serde(default)]
    pub caryophyllene: Option<f64>,
    #[serde(default)]
    pub humulene: Option<f64>,
    #[serde(default)]
    pub linalool: Option<f64>,
    #[serde(default)]
    pub terpinolene: Option<f64>,
    #[serde(default)]
    pub ocimene: Option<f64>,
    /// Free-form (usually JSON) list of terpenes outside the tracked eight
    #[serde(default)]
    pub other_terpenes: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Create an unsaved product with no profile data
    pub fn new(name: impl Into<String>, product_type: ProductType, route: ConsumptionRoute) -> Self {
        let now = crate::time::now();
        Self {
            id: None,
            name: name.into(),
            brand: None,
            product_type,
            route,
            thc_percent: None,
            cbd_percent: None,
            cbg_percent: None,
            thcv_percent: None,
            myrcene: None,
            limonene: None,
            pinene: None,
            caryophyllene: None,
            humulene: None,
            linalool: None,
            terpinolene: None,
            ocimene: None,
            other_terpenes: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn cannabinoid(&self, cannabinoid: Cannabinoid) -> Option<f64> {
        match cannabinoid {
            Cannabinoid::Thc => self.thc_percent,
            Cannabinoid::Cbd => self.cbd_percent,
            Cannabinoid::Cbg => self.cbg_percent,
            Cannabinoid::Thcv => self.thcv_percent,
        }
    }

    pub fn set_cannabinoid(&mut self, cannabinoid: Cannabinoid, value: Option<f64>) {
        let slot = match cannabinoid {
            Cannabinoid::Thc => &mut self.thc_percent,
            Cannabinoid::Cbd => &mut self.cbd_percent,
            Cannabinoid::Cbg => &mut self.cbg_percent,
            Cannabinoid::Thcv => &mut self.thcv_percent,
        };
        *slot = value;
    }

    pub fn terpene(&self, terpene: Terpene) -> Option<f64> {
        match terpene {
            Terpene::Myrcene => self.myrcene,
            Terpene::Limonene => self.limonene,
            Terpene::Pinene => self.pinene,
            Terpene::Caryophyllene => self.caryophyllene,
            Terpene::Humulene => self.humulene,
            Terpene::Linalool => self.linalool,
            Terpene::Terpinolene => self.terpinolene,
            Terpene::Ocimene => self.ocimene,
        }
    }

    pub fn set_terpene(&mut self, terpene: Terpene, value: Option<f64>) {
        let slot = match terpene {
            Terpene::Myrcene => &mut self.myrcene,
            Terpene::Limonene => &mut self.limonene,
            Terpene::Pinene => &mut self.pinene,
            Terpene::Caryophyllene => &mut self.caryophyllene,
            Terpene::Humulene => &mut self.humulene,
            Terpene::Linalool => &mut self.linalool,
            Terpene::Terpinolene => &mut self.terpinolene,
            Terpene::Ocimene => &mut self.ocimene,
        };
        *slot = value;
    }

    /// Known terpene values in fixed terpene order
    pub fn terpene_values(&self) -> impl Iterator<Item = (Terpene, f64)> + '_ {
        Terpene::ALL
            .into_iter()
            .filter_map(move |t| self.terpene(t).map(|value| (t, value)))
    }

    /// True when at least one terpene value is known (zero included)
    pub fn has_terpene_data(&self) -> bool {
        self.terpene_values().next().is_some()
    }

    /// Up to three terpenes with a positive value, strongest first.
    ///
    /// Equal concentrations keep the fixed terpene order.
    pub fn dominant_terpenes(&self) -> Vec<Terpene> {
        let mut present: Vec<(Terpene, f64)> = self
            .terpene_values()
            .filter(|(_, value)| *value > 0.0)
            .collect();

        // Stable sort preserves fixed order for ties
        present.sort_by(|a, b| b.1.total_cmp(&a.1));
        present.into_iter().take(3).map(|(t, _)| t).collect()
    }

    /// "THC: 23.5%, CBD: 0.8%" or "No cannabinoid data"
    pub fn cannabinoid_summary(&self) -> String {
        let parts: Vec<String> = Cannabinoid::ALL
            .into_iter()
            .filter_map(|c| self.cannabinoid(c).map(|v| format!("{}: {:.1}%", c.name(), v)))
            .collect();

        if parts.is_empty() {
            "No cannabinoid data".to_string()
        } else {
            parts.join(", ")
        }
    }

    /// Check field invariants before persisting
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput("Product name must not be empty".to_string()));
        }

        for cannabinoid in Cannabinoid::ALL {
            if let Some(value) = self.cannabinoid(cannabinoid) {
                if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                    return Err(Error::InvalidInput(format!(
                        "{} percentage out of range: {}",
                        cannabinoid.name(),
                        value
                    )));
                }
            }
        }

        for (terpene, value) in self.terpene_values() {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidInput(format!(
                    "{} concentration must be non-negative: {}",
                    terpene, value
                )));
            }
        }

        Ok(())
    }
}

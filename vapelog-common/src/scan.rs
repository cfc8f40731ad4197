//! Label scan parsing
//!
//! Turns the text an OCR engine read off a product label into cannabinoid
//! and terpene percentages, and a [`ScanResult`] into a product draft. The
//! OCR step itself happens outside this crate.

use crate::models::{Cannabinoid, ConsumptionRoute, Product, ProductType, Terpene};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Values read off a label, keyed by display name ("THC", "Myrcene")
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub cannabinoids: BTreeMap<String, f64>,
    pub terpenes: BTreeMap<String, f64>,
    pub raw_text: String,
}

// Shared value suffix: "23.5%", ": 23.5 %", " 23"
const VALUE: &str = r"[:\s]*(\d+\.?\d*)\s*%?";

fn pattern(prefix: &str) -> Regex {
    Regex::new(&format!("(?i){}{}", prefix, VALUE)).expect("Valid label value regex")
}

static CANNABINOID_PATTERNS: Lazy<Vec<(Cannabinoid, Regex)>> = Lazy::new(|| {
    vec![
        (Cannabinoid::Thc, pattern(r"(?:total\s+)?thc")),
        (Cannabinoid::Cbd, pattern(r"(?:total\s+)?cbd")),
        (Cannabinoid::Cbg, pattern("cbg")),
        (Cannabinoid::Thcv, pattern("thcv")),
    ]
});

static TERPENE_PATTERNS: Lazy<Vec<(Terpene, Regex)>> = Lazy::new(|| {
    Terpene::ALL
        .into_iter()
        .map(|terpene| {
            let prefix = match terpene {
                Terpene::Pinene => "(?:alpha-|beta-)?pinene".to_string(),
                Terpene::Caryophyllene => "(?:beta-)?caryophyllene".to_string(),
                other => other.name().to_lowercase(),
            };
            (terpene, pattern(&prefix))
        })
        .collect()
});

fn is_percentage(value: f64) -> bool {
    value.is_finite() && (0.0..=100.0).contains(&value)
}

fn capture_value(regex: &Regex, line: &str) -> Option<f64> {
    let captures = regex.captures(line)?;
    let value: f64 = captures.get(1)?.as_str().parse().ok()?;
    is_percentage(value).then_some(value)
}

/// Extract label values from recognized text.
///
/// Lines are scanned in order; a later match for the same name overwrites an
/// earlier one. Values outside [0, 100] are ignored.
pub fn extract_from_text(text: &str) -> ScanResult {
    let mut result = ScanResult {
        raw_text: text.to_string(),
        ..ScanResult::default()
    };

    for line in text.lines().map(str::trim) {
        for (cannabinoid, regex) in CANNABINOID_PATTERNS.iter() {
            if let Some(value) = capture_value(regex, line) {
                result.cannabinoids.insert(cannabinoid.name().to_string(), value);
            }
        }

        for (terpene, regex) in TERPENE_PATTERNS.iter() {
            if let Some(value) = capture_value(regex, line) {
                result.terpenes.insert(terpene.name().to_string(), value);
            }
        }
    }

    result
}

impl ScanResult {
    /// Build an unsaved product from the scanned values.
    ///
    /// Unknown names and values outside [0, 100] are dropped with a warning;
    /// scan input is never trusted as-is.
    pub fn into_product(
        self,
        name: impl Into<String>,
        product_type: ProductType,
        route: ConsumptionRoute,
    ) -> Product {
        let mut product = Product::new(name, product_type, route);

        for (key, value) in &self.cannabinoids {
            match key.parse::<Cannabinoid>() {
                Ok(cannabinoid) if is_percentage(*value) => {
                    product.set_cannabinoid(cannabinoid, Some(*value))
                }
                Ok(_) => warn!("Discarding out-of-range {} value from scan: {}", key, value),
                Err(_) => warn!("Discarding unknown cannabinoid from scan: {}", key),
            }
        }

        for (key, value) in &self.terpenes {
            match key.parse::<Terpene>() {
                Ok(terpene) if is_percentage(*value) => product.set_terpene(terpene, Some(*value)),
                Ok(_) => warn!("Discarding out-of-range {} value from scan: {}", key, value),
                Err(_) => warn!("Discarding unknown terpene from scan: {}", key),
            }
        }

        product
    }
}

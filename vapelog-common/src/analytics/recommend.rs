//! Product recommendations
//!
//! The pre-model heuristic: rank products by average positive minus average
//! negative composite, label each with a session-count confidence tier and a
//! short human-readable reason.

use crate::analytics::{Confidence, EffectAverages};
use crate::models::{Product, Terpene};
use serde::Serialize;

/// Number of recommendations shown when the caller does not ask for more
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 3;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecommendation {
    pub product: Product,
    pub score: f64,
    pub confidence: Confidence,
    pub reason: String,
    pub effects: EffectAverages,
}

/// Explain a recommendation.
///
/// Prefers the product's two strongest terpenes, then its THC percentage,
/// then a generic line.
pub fn generate_reason(product: &Product) -> String {
    let dominant: Vec<Terpene> = product.dominant_terpenes().into_iter().take(2).collect();

    if !dominant.is_empty() {
        let names: Vec<&str> = dominant.iter().map(Terpene::name).collect();
        format!("Based on your positive responses to {}", names.join(" and "))
    } else if let Some(thc) = product.thc_percent {
        format!("Based on {:.1}% THC matching your preferences", thc)
    } else {
        "Based on your past experiences with similar products".to_string()
    }
}

/// Sort by score, best first, and keep at most `limit`.
///
/// The sort is stable: equal scores keep their incoming order.
pub fn rank(mut recommendations: Vec<ProductRecommendation>, limit: usize) -> Vec<ProductRecommendation> {
    recommendations.sort_by(|a, b| b.score.total_cmp(&a.score));
    recommendations.truncate(limit);
    recommendations
}

//! Effect scoring, recommendations and usage-pattern analytics
//!
//! [`AnalyticsEngine`] is constructed with an injected [`EntityStore`] and
//! holds no state of its own: every call is a function of the store contents
//! at call time. "No data yet" is reported as `Ok(None)`; store failures are
//! always propagated.

pub mod confidence;
pub mod effects;
pub mod patterns;
pub mod recommend;

pub use confidence::{Confidence, HIGH_CONFIDENCE_SESSIONS, MEDIUM_CONFIDENCE_SESSIONS};
pub use effects::{average_effects, EffectAverages};
pub use patterns::{TimeOfDay, BEST_RESULTS_FOR};
pub use recommend::{ProductRecommendation, DEFAULT_RECOMMENDATION_LIMIT};

use crate::models::{Product, ProductId, Terpene};
use crate::store::EntityStore;
use crate::{Error, Result};
use chrono::{Local, TimeZone};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Sessions needed before recommendations are considered meaningful
pub const MINIMUM_SESSIONS_FOR_RECOMMENDATIONS: usize = 15;

/// Sessions still to log before recommendations unlock
pub fn sessions_until_ready(total_sessions: usize) -> usize {
    MINIMUM_SESSIONS_FOR_RECOMMENDATIONS.saturating_sub(total_sessions)
}

/// Progress toward the recommendation threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Readiness {
    pub total_sessions: usize,
    pub sessions_until_ready: usize,
    pub is_ready: bool,
    /// Fraction of the threshold reached, clamped to 1.0
    pub progress: f64,
}

impl Readiness {
    pub fn from_session_count(total_sessions: usize) -> Self {
        let progress =
            (total_sessions as f64 / MINIMUM_SESSIONS_FOR_RECOMMENDATIONS as f64).min(1.0);
        Self {
            total_sessions,
            sessions_until_ready: sessions_until_ready(total_sessions),
            is_ready: total_sessions >= MINIMUM_SESSIONS_FOR_RECOMMENDATIONS,
            progress,
        }
    }
}

/// Everything the insights screen shows
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub readiness: Readiness,
    /// Present only once [`Readiness::is_ready`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_products: Option<Vec<ProductRecommendation>>,
    pub most_common_time_of_day: Option<TimeOfDay>,
    pub favorite_terpene: Option<Terpene>,
    pub best_results_for: &'static str,
}

/// Analytics over an injected entity store
pub struct AnalyticsEngine<S: EntityStore + ?Sized> {
    store: Arc<S>,
}

impl<S: EntityStore + ?Sized> Clone for AnalyticsEngine<S> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store) }
    }
}

impl<S: EntityStore + ?Sized> AnalyticsEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Average composites over every check-in of a product.
    ///
    /// `None` when the product has no check-ins.
    pub async fn product_effects(&self, product_id: ProductId) -> Result<Option<EffectAverages>> {
        let check_ins = self.store.check_ins_for_product(product_id).await?;
        let averages = average_effects(&check_ins);
        debug!(product_id, check_ins = check_ins.len(), ?averages, "Aggregated product effects");
        Ok(averages)
    }

    /// Confidence tier from the product's session count
    pub async fn confidence(&self, product_id: ProductId) -> Result<Confidence> {
        let sessions = self.store.count_sessions_for_product(product_id).await?;
        Ok(Confidence::from_session_count(sessions))
    }

    /// Best-scoring products, at most `limit`.
    ///
    /// Products without any check-in are skipped.
    pub async fn top_products(&self, limit: usize) -> Result<Vec<ProductRecommendation>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let products = self.store.list_products().await?;
        let mut candidates = Vec::with_capacity(products.len());

        for product in products {
            let product_id = product
                .id
                .ok_or_else(|| Error::Internal(format!("Stored product '{}' has no id", product.name)))?;

            let Some(effects) = self.product_effects(product_id).await? else {
                continue;
            };
            let confidence = self.confidence(product_id).await?;
            let reason = recommend::generate_reason(&product);

            candidates.push(ProductRecommendation {
                score: effects.score(),
                confidence,
                reason,
                effects,
                product,
            });
        }

        debug!(candidates = candidates.len(), limit, "Ranking products");
        Ok(recommend::rank(candidates, limit))
    }

    /// Progress toward the recommendation threshold
    pub async fn readiness(&self) -> Result<Readiness> {
        let total = self.store.count_sessions().await?;
        Ok(Readiness::from_session_count(total))
    }

    /// Most common time-of-day window in the local timezone
    pub async fn most_common_time_of_day(&self) -> Result<Option<TimeOfDay>> {
        self.most_common_time_of_day_in(&Local).await
    }

    /// Most common time-of-day window with session hours read in `tz`
    pub async fn most_common_time_of_day_in<Tz>(&self, tz: &Tz) -> Result<Option<TimeOfDay>>
    where
        Tz: TimeZone + Sync,
    {
        let sessions = self.store.list_sessions().await?;
        Ok(patterns::most_common_time_of_day(
            sessions.iter().map(|s| &s.date_time),
            tz,
        ))
    }

    /// Terpene with the highest effect-weighted total across products
    pub async fn favorite_terpene(&self) -> Result<Option<Terpene>> {
        let products = self.store.list_products().await?;
        let mut weighted: Vec<(&Product, Option<EffectAverages>)> = Vec::with_capacity(products.len());

        for product in &products {
            if !product.has_terpene_data() {
                continue;
            }
            let effects = match product.id {
                Some(id) => self.product_effects(id).await?,
                None => None,
            };
            weighted.push((product, effects));
        }

        Ok(patterns::favorite_terpene(weighted))
    }

    /// Fixed placeholder until a real effect model exists
    pub fn best_results_for(&self) -> &'static str {
        BEST_RESULTS_FOR
    }

    /// Assemble the insights screen; top products only once ready
    pub async fn insights(&self, limit: usize) -> Result<Insights> {
        let readiness = self.readiness().await?;
        let top_products = if readiness.is_ready {
            Some(self.top_products(limit).await?)
        } else {
            None
        };

        Ok(Insights {
            readiness,
            top_products,
            most_common_time_of_day: self.most_common_time_of_day().await?,
            favorite_terpene: self.favorite_terpene().await?,
            best_results_for: self.best_results_for(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_until_ready() {
        assert_eq!(sessions_until_ready(0), 15);
        assert_eq!(sessions_until_ready(14), 1);
        assert_eq!(sessions_until_ready(15), 0);
        assert_eq!(sessions_until_ready(40), 0);
    }

    #[test]
    fn test_readiness_progress_clamped() {
        let early = Readiness::from_session_count(3);
        assert!(!early.is_ready);
        assert_eq!(early.sessions_until_ready, 12);
        assert!((early.progress - 0.2).abs() < 1e-9);

        let done = Readiness::from_session_count(30);
        assert!(done.is_ready);
        assert_eq!(done.progress, 1.0);
    }
}

//! Usage-pattern analytics

use crate::analytics::EffectAverages;
use crate::models::{Product, Terpene};
use chrono::{DateTime, TimeZone, Timelike, Utc};
use serde::Serialize;
use std::fmt;

/// Placeholder answer until a real effect model exists
pub const BEST_RESULTS_FOR: &str = "Relaxation & Sleep";

/// Weight given to a product nobody has rated yet
pub const UNRATED_PRODUCT_WEIGHT: f64 = 1.0;

/// Local time-of-day window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TimeOfDay {
    /// 00:00-06:00
    LateNight,
    /// 06:00-12:00
    Morning,
    /// 12:00-17:00
    Afternoon,
    /// 17:00-21:00
    Evening,
    /// 21:00-24:00
    Night,
}

impl TimeOfDay {
    /// Enumeration order, also the tie-break order
    pub const ALL: [TimeOfDay; 5] = [
        TimeOfDay::LateNight,
        TimeOfDay::Morning,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
    ];

    /// Bucket for an hour of the day (0-23); anything past 21 is Night
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=5 => TimeOfDay::LateNight,
            6..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TimeOfDay::LateNight => "Late Night",
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Afternoon => "Afternoon",
            TimeOfDay::Evening => "Evening",
            TimeOfDay::Night => "Night",
        }
    }

    /// Name with its clock range, e.g. "Afternoon (12-5 PM)"
    pub fn label(&self) -> &'static str {
        match self {
            TimeOfDay::LateNight => "Late Night (12-6 AM)",
            TimeOfDay::Morning => "Morning (6 AM-12 PM)",
            TimeOfDay::Afternoon => "Afternoon (12-5 PM)",
            TimeOfDay::Evening => "Evening (5-9 PM)",
            TimeOfDay::Night => "Night (9 PM-12 AM)",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Most frequent time-of-day window across `timestamps`, read in `tz`.
///
/// Ties go to the earliest window in [`TimeOfDay::ALL`] order.
pub fn most_common_time_of_day<'a, Tz, I>(timestamps: I, tz: &Tz) -> Option<TimeOfDay>
where
    Tz: TimeZone,
    I: IntoIterator<Item = &'a DateTime<Utc>>,
{
    let mut counts = [0usize; 5];
    let mut total = 0usize;

    for ts in timestamps {
        let hour = ts.with_timezone(tz).hour();
        counts[TimeOfDay::from_hour(hour) as usize] += 1;
        total += 1;
    }

    if total == 0 {
        return None;
    }

    let mut best = TimeOfDay::ALL[0];
    for bucket in TimeOfDay::ALL {
        if counts[bucket as usize] > counts[best as usize] {
            best = bucket;
        }
    }
    Some(best)
}

/// Terpene with the highest effect-weighted total across products.
///
/// Each product's terpene values are weighted by its average positive
/// composite, or [`UNRATED_PRODUCT_WEIGHT`] when it has no feedback. Ties go
/// to the earliest terpene in [`Terpene::ALL`] order. `None` when no product
/// has any terpene value.
pub fn favorite_terpene<'a, I>(products: I) -> Option<Terpene>
where
    I: IntoIterator<Item = (&'a Product, Option<EffectAverages>)>,
{
    let mut totals: [Option<f64>; 8] = [None; 8];

    for (product, effects) in products {
        let weight = effects.map_or(UNRATED_PRODUCT_WEIGHT, |e| e.positive);
        for (terpene, value) in product.terpene_values() {
            let slot = &mut totals[terpene as usize];
            *slot = Some(slot.unwrap_or(0.0) + value * weight);
        }
    }

    let mut best: Option<(Terpene, f64)> = None;
    for terpene in Terpene::ALL {
        if let Some(total) = totals[terpene as usize] {
            match best {
                Some((_, best_total)) if total <= best_total => {}
                _ => best = Some((terpene, total)),
            }
        }
    }
    best.map(|(terpene, _)| terpene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConsumptionRoute, ProductType};
    use chrono::FixedOffset;

    fn at_hour(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, 15, 0).unwrap()
    }

    fn product(name: &str) -> Product {
        Product::new(name, ProductType::Flower, ConsumptionRoute::Inhalation)
    }

    fn rated(positive: f64) -> Option<EffectAverages> {
        Some(EffectAverages { positive, negative: 0.0, check_ins: 1 })
    }

    #[test]
    fn test_hour_buckets() {
        assert_eq!(TimeOfDay::from_hour(13), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::LateNight);
        assert_eq!(TimeOfDay::from_hour(21), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::LateNight);
        assert_eq!(TimeOfDay::from_hour(6), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(20), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(23), TimeOfDay::Night);
        assert_eq!(TimeOfDay::Afternoon.name(), "Afternoon");
        assert_eq!(TimeOfDay::Afternoon.label(), "Afternoon (12-5 PM)");
    }

    #[test]
    fn test_most_common_counts_buckets_not_hours() {
        // Three distinct evening hours beat two sessions at the same morning hour
        let times = vec![at_hour(9), at_hour(9), at_hour(17), at_hour(18), at_hour(20)];
        assert_eq!(most_common_time_of_day(&times, &Utc), Some(TimeOfDay::Evening));
    }

    #[test]
    fn test_most_common_tie_goes_to_earlier_bucket() {
        let times = vec![at_hour(22), at_hour(7)];
        assert_eq!(most_common_time_of_day(&times, &Utc), Some(TimeOfDay::Morning));
    }

    #[test]
    fn test_most_common_uses_given_timezone() {
        // 13:15 UTC is 22:15 at UTC+9
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(most_common_time_of_day(&[at_hour(13)], &tz), Some(TimeOfDay::Night));
    }

    #[test]
    fn test_most_common_without_sessions() {
        assert_eq!(most_common_time_of_day(&Vec::<DateTime<Utc>>::new(), &Utc), None);
    }

    #[test]
    fn test_favorite_terpene_weighted_by_positive_composite() {
        let a = Product { limonene: Some(10.0), ..product("A") };
        let b = Product { myrcene: Some(10.0), ..product("B") };

        let favorite = favorite_terpene(vec![(&a, rated(2.0)), (&b, rated(1.0))]);
        assert_eq!(favorite, Some(Terpene::Limonene));
    }

    #[test]
    fn test_favorite_terpene_unrated_products_weigh_one() {
        let rated_low = Product { pinene: Some(10.0), ..product("Rated") };
        let unrated = Product { humulene: Some(6.0), ..product("Unrated") };

        // 10 * 0.5 = 5 < 6 * 1.0
        let favorite = favorite_terpene(vec![(&rated_low, rated(0.5)), (&unrated, None)]);
        assert_eq!(favorite, Some(Terpene::Humulene));
    }

    #[test]
    fn test_favorite_terpene_tie_and_no_data() {
        let p = Product { ocimene: Some(2.0), linalool: Some(2.0), ..product("Even") };
        assert_eq!(favorite_terpene(vec![(&p, None)]), Some(Terpene::Linalool));

        let bare = product("Bare");
        assert_eq!(favorite_terpene(vec![(&bare, rated(5.0))]), None);
        assert_eq!(favorite_terpene(Vec::new()), None);
    }
}

//! Terpene names and reference content
//!
//! The eight tracked terpenes, in the fixed order used for tie-breaking
//! everywhere a ranking over terpenes is produced.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Terpene {
    Myrcene,
    Limonene,
    Pinene,
    Caryophyllene,
    Humulene,
    Linalool,
    Terpinolene,
    Ocimene,
}

impl Terpene {
    /// All terpenes in tie-break order
    pub const ALL: [Terpene; 8] = [
        Terpene::Myrcene,
        Terpene::Limonene,
        Terpene::Pinene,
        Terpene::Caryophyllene,
        Terpene::Humulene,
        Terpene::Linalool,
        Terpene::Terpinolene,
        Terpene::Ocimene,
    ];

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Terpene::Myrcene => "Myrcene",
            Terpene::Limonene => "Limonene",
            Terpene::Pinene => "Pinene",
            Terpene::Caryophyllene => "Caryophyllene",
            Terpene::Humulene => "Humulene",
            Terpene::Linalool => "Linalool",
            Terpene::Terpinolene => "Terpinolene",
            Terpene::Ocimene => "Ocimene",
        }
    }

    /// Reference content for this terpene
    pub fn info(&self) -> &'static TerpeneInfo {
        // REFERENCE is declared in ALL order
        &REFERENCE[*self as usize]
    }
}

impl fmt::Display for Terpene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Terpene {
    type Err = Error;

    /// Case-insensitive lookup by display name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Terpene::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::InvalidInput(format!("Unknown terpene: {}", s)))
    }
}

/// Static educational entry for one terpene
#[derive(Debug, Clone, Serialize)]
pub struct TerpeneInfo {
    pub terpene: Terpene,
    pub aroma: &'static str,
    pub description: &'static str,
    pub effects: &'static [&'static str],
}

/// Immutable terpene reference table
pub static REFERENCE: [TerpeneInfo; 8] = [
    TerpeneInfo {
        terpene: Terpene::Myrcene,
        aroma: "Earthy, musky, herbal",
        description: "The most common terpene in cannabis, myrcene is known for its sedating and relaxing effects. It's also found in mangoes, lemongrass, and hops.",
        effects: &["Relaxing", "Sedating", "Pain Relief", "Anti-inflammatory"],
    },
    TerpeneInfo {
        terpene: Terpene::Limonene,
        aroma: "Citrus, lemon, orange",
        description: "A mood-elevating terpene with a bright citrus aroma. Limonene is known for its stress-relieving and uplifting properties.",
        effects: &["Uplifting", "Stress Relief", "Mood Enhancement", "Anti-anxiety"],
    },
    TerpeneInfo {
        terpene: Terpene::Pinene,
        aroma: "Pine, fresh, earthy",
        description: "Found in pine needles and rosemary, pinene is associated with alertness and memory retention. It has a fresh, forest-like aroma.",
        effects: &["Alertness", "Memory", "Focus", "Anti-inflammatory"],
    },
    TerpeneInfo {
        terpene: Terpene::Caryophyllene,
        aroma: "Spicy, peppery, woody",
        description: "Unique among terpenes, caryophyllene can bind to CB2 receptors, providing anti-inflammatory effects without psychoactivity.",
        effects: &["Anti-inflammatory", "Pain Relief", "Stress Relief", "Neuroprotective"],
    },
    TerpeneInfo {
        terpene: Terpene::Humulene,
        aroma: "Earthy, woody, hoppy",
        description: "Found in hops and coriander, humulene is known for its appetite-suppressing and anti-inflammatory properties.",
        effects: &["Appetite Suppressant", "Anti-inflammatory", "Antibacterial"],
    },
    TerpeneInfo {
        terpene: Terpene::Linalool,
        aroma: "Floral, lavender, sweet",
        description: "With a floral lavender scent, linalool is prized for its calming and anti-anxiety effects. It's also found in lavender and mint.",
        effects: &["Calming", "Anti-anxiety", "Sedating", "Pain Relief"],
    },
    TerpeneInfo {
        terpene: Terpene::Terpinolene,
        aroma: "Fresh, herbal, piney",
        description: "A complex terpene with a fresh, herbaceous aroma. Despite being found in energizing strains, it has some sedating properties.",
        effects: &["Uplifting", "Antioxidant", "Antibacterial", "Sedating"],
    },
    TerpeneInfo {
        terpene: Terpene::Ocimene,
        aroma: "Sweet, herbal, woody",
        description: "A lesser-known terpene with a sweet, herbaceous aroma. Ocimene has anti-inflammatory and antifungal properties.",
        effects: &["Anti-inflammatory", "Antifungal", "Decongestant", "Antibacterial"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_table_matches_order() {
        for (index, terpene) in Terpene::ALL.iter().enumerate() {
            assert_eq!(REFERENCE[index].terpene, *terpene);
            assert_eq!(terpene.info().terpene, *terpene);
            assert!(!terpene.info().effects.is_empty());
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!("linalool".parse::<Terpene>().unwrap(), Terpene::Linalool);
        assert_eq!(" CARYOPHYLLENE ".parse::<Terpene>().unwrap(), Terpene::Caryophyllene);
        assert!("cannabinol".parse::<Terpene>().is_err());
    }

    #[test]
    fn test_ordering_follows_declaration() {
        assert!(Terpene::Myrcene < Terpene::Limonene);
        assert!(Terpene::Terpinolene < Terpene::Ocimene);
    }
}

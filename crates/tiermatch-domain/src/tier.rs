//! Tier module - preference buckets and the rating classifier

use crate::error::DomainError;
use crate::rating::{Rating, MAX_RATING, MIN_RATING};

/// Preference bucket an item is ranked into
///
/// Tiers are ordered from most to least preferred:
/// - Tier1: clearly above my bar
/// - Tier2: above my bar, but some questions
/// - Tier3: below my bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// Clearly above my bar
    Tier1,

    /// Above my bar, but some questions
    Tier2,

    /// Below my bar
    Tier3,
}

impl Tier {
    /// All tiers, top first
    pub const ALL: [Tier; 3] = [Tier::Tier1, Tier::Tier2, Tier::Tier3];

    /// Get the tier name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Tier1 => "tier1",
            Tier::Tier2 => "tier2",
            Tier::Tier3 => "tier3",
        }
    }

    /// Numeric rank (1 = top)
    pub fn rank(&self) -> u8 {
        match self {
            Tier::Tier1 => 1,
            Tier::Tier2 => 2,
            Tier::Tier3 => 3,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Tier1 => "Clearly above my bar",
            Tier::Tier2 => "Above my bar, but some questions",
            Tier::Tier3 => "Below my bar",
        }
    }

    /// True for the two tiers above the bar
    pub fn is_above_bar(&self) -> bool {
        matches!(self, Tier::Tier1 | Tier::Tier2)
    }

    pub(crate) fn index(&self) -> usize {
        self.rank() as usize - 1
    }
}

/// Default lower bound of tier 1
pub const DEFAULT_TIER1_MIN: u8 = 6;

/// Default lower bound of tier 2
pub const DEFAULT_TIER2_MIN: u8 = 3;

/// Rating thresholds splitting the 1-7 scale into three tiers
///
/// Invariant: `1 <= tier2_min < tier1_min <= 7`, enforced by [`TierBoundaries::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TierBoundaries {
    tier1_min: u8,
    tier2_min: u8,
}

impl TierBoundaries {
    /// Create a validated boundary pair
    ///
    /// # Examples
    ///
    /// ```
    /// use tiermatch_domain::TierBoundaries;
    ///
    /// assert!(TierBoundaries::new(6, 3).is_ok());
    /// assert!(TierBoundaries::new(3, 3).is_err());
    /// ```
    pub fn new(tier1_min: u8, tier2_min: u8) -> Result<Self, DomainError> {
        let valid = MIN_RATING <= tier2_min && tier2_min < tier1_min && tier1_min <= MAX_RATING;
        if !valid {
            return Err(DomainError::InvalidBoundaries { tier1_min, tier2_min });
        }
        Ok(Self { tier1_min, tier2_min })
    }

    /// Lower bound of tier 1
    pub fn tier1_min(&self) -> u8 {
        self.tier1_min
    }

    /// Lower bound of tier 2
    pub fn tier2_min(&self) -> u8 {
        self.tier2_min
    }

    /// Same boundaries with either threshold replaced
    pub fn with(&self, tier1_min: Option<u8>, tier2_min: Option<u8>) -> Result<Self, DomainError> {
        Self::new(
            tier1_min.unwrap_or(self.tier1_min),
            tier2_min.unwrap_or(self.tier2_min),
        )
    }

    /// Inclusive rating range covered by a tier
    pub fn range(&self, tier: Tier) -> (u8, u8) {
        match tier {
            Tier::Tier1 => (self.tier1_min, MAX_RATING),
            Tier::Tier2 => (self.tier2_min, self.tier1_min - 1),
            Tier::Tier3 => (MIN_RATING, self.tier2_min - 1),
        }
    }

    /// Range rendered as `low-high`, e.g. `"6-7"`; `"-"` when the tier is empty
    pub fn range_label(&self, tier: Tier) -> String {
        let (low, high) = self.range(tier);
        if low > high {
            return "-".to_string();
        }
        format!("{}-{}", low, high)
    }
}

impl Default for TierBoundaries {
    fn default() -> Self {
        Self {
            tier1_min: DEFAULT_TIER1_MIN,
            tier2_min: DEFAULT_TIER2_MIN,
        }
    }
}

/// Map a rating to its tier under the given boundaries
pub fn classify(rating: Rating, bounds: &TierBoundaries) -> Tier {
    if rating.value() >= bounds.tier1_min {
        Tier::Tier1
    } else if rating.value() >= bounds.tier2_min {
        Tier::Tier2
    } else {
        Tier::Tier3
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn bounds_strategy() -> impl Strategy<Value = TierBoundaries> {
        (2u8..=7)
            .prop_flat_map(|t1| (Just(t1), 1u8..t1))
            .prop_map(|(t1, t2)| TierBoundaries::new(t1, t2).unwrap())
    }

    proptest! {
        /// Property: every rating lands in exactly the tier whose range contains it
        #[test]
        fn test_ranges_partition_scale(bounds in bounds_strategy()) {
            for rating in Rating::all() {
                let containing: Vec<Tier> = Tier::ALL
                    .into_iter()
                    .filter(|t| {
                        let (low, high) = bounds.range(*t);
                        (low..=high).contains(&rating.value())
                    })
                    .collect();
                prop_assert_eq!(containing, vec![classify(rating, &bounds)]);
            }
        }

        /// Property: a higher rating never lands in a lower tier
        #[test]
        fn test_classify_monotonic(bounds in bounds_strategy(), a in 1i64..=7, b in 1i64..=7) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let lo_tier = classify(Rating::new(lo).unwrap(), &bounds);
            let hi_tier = classify(Rating::new(hi).unwrap(), &bounds);
            prop_assert!(hi_tier <= lo_tier);
        }
    }
}

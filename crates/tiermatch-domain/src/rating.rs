//! Ratings on the 1-7 scale and the per-user override map

use crate::error::DomainError;
use crate::item::ItemId;
use std::collections::BTreeMap;
use std::fmt;

/// Rating used when an item has neither an override nor a baseline
pub const DEFAULT_RATING: Rating = Rating(4);

/// Lowest rating on the scale
pub const MIN_RATING: u8 = 1;

/// Highest rating on the scale
pub const MAX_RATING: u8 = 7;

/// A rating on the 1-7 scale
///
/// The constructor rejects anything off the scale, so a `Rating` handed to the
/// classifier is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rating(u8);

impl Rating {
    /// Create a rating, rejecting values outside 1-7
    ///
    /// # Examples
    ///
    /// ```
    /// use tiermatch_domain::Rating;
    ///
    /// assert_eq!(Rating::new(5).unwrap().value(), 5);
    /// assert!(Rating::new(0).is_err());
    /// assert!(Rating::new(8).is_err());
    /// ```
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if (MIN_RATING as i64..=MAX_RATING as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(DomainError::RatingOutOfRange(value))
        }
    }

    /// Interpret a raw sheet value as a baseline: in-range values only
    pub fn from_baseline(value: u8) -> Option<Self> {
        Self::new(value as i64).ok()
    }

    /// Raw value
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Every rating on the scale, ascending
    pub fn all() -> impl Iterator<Item = Rating> {
        (MIN_RATING..=MAX_RATING).map(Rating)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ratings the user set explicitly, keyed by item id
///
/// Sparse: an absent entry means "fall back to the baseline".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingOverrides {
    entries: BTreeMap<ItemId, Rating>,
}

impl RatingOverrides {
    /// Create an empty override map
    pub fn new() -> Self {
        Self::default()
    }

    /// Override for an item, if one was set
    pub fn get(&self, id: &ItemId) -> Option<Rating> {
        self.entries.get(id).copied()
    }

    /// Copy of this map with one entry replaced
    pub fn with(&self, id: ItemId, rating: Rating) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(id, rating);
        Self { entries }
    }

    /// Iterate entries in id order
    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, Rating)> {
        self.entries.iter().map(|(id, r)| (id, *r))
    }

    /// Number of overrides
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no override was set
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(ItemId, Rating)> for RatingOverrides {
    fn from_iter<T: IntoIterator<Item = (ItemId, Rating)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

//! Error types for domain operations

use thiserror::Error;

/// Errors raised by domain validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Boundary pair violates `1 <= tier2_min < tier1_min <= 7`
    #[error("Invalid tier boundaries: tier1 min {tier1_min}, tier2 min {tier2_min} (need 1 <= tier2 < tier1 <= 7)")]
    InvalidBoundaries {
        /// Requested lower bound of tier 1
        tier1_min: u8,
        /// Requested lower bound of tier 2
        tier2_min: u8,
    },

    /// Rating outside the 1-7 scale
    #[error("Rating {0} is out of range (expected 1-7)")]
    RatingOutOfRange(i64),

    /// Item id not present in the catalog
    #[error("Unknown item: {0}")]
    UnknownItem(String),
}

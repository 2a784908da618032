//! Tiermatch Domain Layer
//!
//! Core ranking logic for the co-founder matching tool. Pure computation over
//! in-memory values; storage and network live in other crates behind the
//! traits in [`traits`].
//!
//! ## Key Concepts
//!
//! - **Rating**: a 1-7 score; overrides win over sheet baselines
//! - **Tier**: one of three preference buckets split by [`TierBoundaries`]
//! - **Tier assignment**: an ordered partition of a catalog across tiers
//! - **Ranking domain**: the peers or the ideas, each ranked independently
//! - **Alignment**: how my idea ratings overlap with a peer's
//!
//! Every mutation returns a new value; nothing is edited in place.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod error;
pub mod item;
pub mod matrix;
pub mod rating;
pub mod session;
pub mod tier;
pub mod tier_set;
pub mod traits;

// Re-exports for convenience
pub use analysis::{
    alignment_percentage, AlignmentAnalyzer, AlignmentBand, CellStrength, ConflictSeverity, IdeaComparison,
    IdeaMatches, LockedIdea, LockedIdeas, MatchOutcome, MatrixRow, PeerAlignment, PeerMatch, PeerSort,
    DEFAULT_IDEA_FILTER,
};
pub use error::DomainError;
pub use item::{Catalog, Item, ItemId};
pub use matrix::{ParticipantRow, PeerRatingMatrix, MISSING_RATING};
pub use rating::{Rating, RatingOverrides, DEFAULT_RATING, MAX_RATING, MIN_RATING};
pub use session::{DomainKind, DomainState, RankingDomain, Session, SessionSetup, SessionState};
pub use tier::{classify, Tier, TierBoundaries, DEFAULT_TIER1_MIN, DEFAULT_TIER2_MIN};
pub use tier_set::{RepairReport, TierAssignment};
pub use traits::SessionStore;

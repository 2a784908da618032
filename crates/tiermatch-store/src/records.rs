//! Serialized shapes of persisted values
//!
//! Field names are camelCase to stay readable by other clients of the same
//! records. Conversions into domain values are lenient: anything malformed is
//! dropped or replaced by defaults with a warning, never a hard failure.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tiermatch_domain::{
    DomainState, ItemId, PeerRatingMatrix, Rating, RatingOverrides, SessionState, Tier, TierAssignment,
    TierBoundaries,
};
use tracing::warn;

/// Three ordered id lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct TiersRecord {
    #[serde(default)]
    pub(crate) tier1: Vec<String>,
    #[serde(default)]
    pub(crate) tier2: Vec<String>,
    #[serde(default)]
    pub(crate) tier3: Vec<String>,
}

impl From<&TierAssignment> for TiersRecord {
    fn from(assignment: &TierAssignment) -> Self {
        let ids = |tier| assignment.tier(tier).iter().map(|id| id.as_str().to_string()).collect();
        Self {
            tier1: ids(Tier::Tier1),
            tier2: ids(Tier::Tier2),
            tier3: ids(Tier::Tier3),
        }
    }
}

impl From<TiersRecord> for TierAssignment {
    fn from(record: TiersRecord) -> Self {
        let ids = |list: Vec<String>| list.into_iter().map(ItemId::from_raw).collect();
        TierAssignment::from_tiers(ids(record.tier1), ids(record.tier2), ids(record.tier3))
    }
}

/// Tier thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BoundsRecord {
    pub(crate) tier1_min: i64,
    pub(crate) tier2_min: i64,
}

impl From<&TierBoundaries> for BoundsRecord {
    fn from(bounds: &TierBoundaries) -> Self {
        Self {
            tier1_min: bounds.tier1_min() as i64,
            tier2_min: bounds.tier2_min() as i64,
        }
    }
}

impl BoundsRecord {
    /// Validated boundaries; `None` when the stored pair is invalid
    pub(crate) fn into_bounds(self) -> Option<TierBoundaries> {
        let parsed = u8::try_from(self.tier1_min)
            .ok()
            .zip(u8::try_from(self.tier2_min).ok())
            .and_then(|(t1, t2)| TierBoundaries::new(t1, t2).ok());
        if parsed.is_none() {
            warn!(
                "Ignoring invalid stored boundaries ({}, {}), using defaults",
                self.tier1_min, self.tier2_min
            );
        }
        parsed
    }
}

/// One user's persisted rankings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) cf_tiers: Option<TiersRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) idea_tiers: Option<TiersRecord>,
    #[serde(default)]
    pub(crate) cf_ratings: BTreeMap<String, i64>,
    #[serde(default)]
    pub(crate) idea_ratings: BTreeMap<String, i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) cf_bounds: Option<BoundsRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) idea_bounds: Option<BoundsRecord>,
}

impl From<&SessionState> for SessionRecord {
    fn from(state: &SessionState) -> Self {
        Self {
            cf_tiers: state.peers.assignment.as_ref().map(TiersRecord::from),
            idea_tiers: state.ideas.assignment.as_ref().map(TiersRecord::from),
            cf_ratings: ratings_record(&state.peers.overrides),
            idea_ratings: ratings_record(&state.ideas.overrides),
            cf_bounds: state.peers.bounds.as_ref().map(BoundsRecord::from),
            idea_bounds: state.ideas.bounds.as_ref().map(BoundsRecord::from),
        }
    }
}

impl From<SessionRecord> for SessionState {
    fn from(record: SessionRecord) -> Self {
        Self {
            peers: domain_state(record.cf_tiers, record.cf_ratings, record.cf_bounds),
            ideas: domain_state(record.idea_tiers, record.idea_ratings, record.idea_bounds),
        }
    }
}

fn ratings_record(overrides: &RatingOverrides) -> BTreeMap<String, i64> {
    overrides
        .iter()
        .map(|(id, rating)| (id.as_str().to_string(), rating.value() as i64))
        .collect()
}

fn domain_state(
    tiers: Option<TiersRecord>,
    ratings: BTreeMap<String, i64>,
    bounds: Option<BoundsRecord>,
) -> DomainState {
    let overrides = ratings
        .into_iter()
        .filter_map(|(id, value)| match Rating::new(value) {
            Ok(rating) => Some((ItemId::from_raw(id), rating)),
            Err(e) => {
                warn!("Dropping stored rating for {}: {}", id, e);
                None
            }
        })
        .collect();

    DomainState {
        assignment: tiers.map(TierAssignment::from),
        overrides,
        bounds: bounds.and_then(BoundsRecord::into_bounds),
    }
}

/// One participant row of a cached matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RowRecord {
    pub(crate) name: String,
    pub(crate) ratings: Vec<u8>,
}

/// Cached copy of the last fetched matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct MatrixRecord {
    pub(crate) ideas: Vec<String>,
    pub(crate) rows: Vec<RowRecord>,
}

impl From<&PeerRatingMatrix> for MatrixRecord {
    fn from(matrix: &PeerRatingMatrix) -> Self {
        Self {
            ideas: matrix.idea_columns().to_vec(),
            rows: matrix
                .rows()
                .iter()
                .map(|row| RowRecord {
                    name: row.name.clone(),
                    ratings: row.ratings.clone(),
                })
                .collect(),
        }
    }
}

impl From<MatrixRecord> for PeerRatingMatrix {
    fn from(record: MatrixRecord) -> Self {
        record
            .rows
            .into_iter()
            .fold(PeerRatingMatrix::new(record.ideas), |matrix, row| {
                matrix.with_row(row.name, row.ratings)
            })
    }
}

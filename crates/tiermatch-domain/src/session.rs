//! Session state: one user's two ranking domains plus the shared matrix
//!
//! The [`Session`] is the single owner of mutable ranking state. Every mutator
//! builds the complete next [`RankingDomain`] first and then swaps it in, so a
//! snapshot taken at any point is fully partitioned and sorted.

use crate::analysis::{AlignmentAnalyzer, LockedIdeas};
use crate::error::DomainError;
use crate::item::{Catalog, Item, ItemId};
use crate::matrix::PeerRatingMatrix;
use crate::rating::{Rating, RatingOverrides, DEFAULT_RATING};
use crate::tier::{Tier, TierBoundaries};
use crate::tier_set::TierAssignment;
use tracing::{debug, warn};

/// Which of the two rankings an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainKind {
    /// Co-founder candidates
    Peers,
    /// Project ideas
    Ideas,
}

impl DomainKind {
    /// Get the domain name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainKind::Peers => "peers",
            DomainKind::Ideas => "ideas",
        }
    }
}

/// Persistable state of one ranking domain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainState {
    /// Tier assignment; `None` when nothing was saved yet
    pub assignment: Option<TierAssignment>,
    /// Ratings the user set explicitly
    pub overrides: RatingOverrides,
    /// Tier thresholds; `None` when nothing usable was saved
    pub bounds: Option<TierBoundaries>,
}

/// Persistable state of a whole session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Co-founder ranking
    pub peers: DomainState,
    /// Idea ranking
    pub ideas: DomainState,
}

/// One ranking domain: its catalog, tiers, overrides and thresholds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingDomain {
    catalog: Catalog,
    assignment: TierAssignment,
    overrides: RatingOverrides,
    bounds: TierBoundaries,
}

impl RankingDomain {
    /// Start from baselines: no overrides, tiers computed from scratch
    pub fn fresh(catalog: Catalog, bounds: TierBoundaries) -> Self {
        Self::with_overrides(catalog, RatingOverrides::new(), bounds)
    }

    /// Restore persisted state against the current catalog
    ///
    /// A persisted assignment is repaired (unknown ids dropped, missing ids put
    /// in tier 2). Without one, tiers are computed from effective ratings.
    /// Missing thresholds fall back to `default_bounds`.
    pub fn restore(catalog: Catalog, saved: DomainState, default_bounds: TierBoundaries) -> Self {
        let DomainState {
            assignment,
            overrides,
            bounds,
        } = saved;
        let bounds = bounds.unwrap_or(default_bounds);

        match assignment {
            Some(assignment) => {
                let (assignment, report) = assignment.repaired(&catalog);
                if !report.is_clean() {
                    warn!(
                        "Repaired saved tiers: {} unknown dropped, {} duplicates dropped, {} missing added to tier2",
                        report.dropped_unknown.len(),
                        report.dropped_duplicates.len(),
                        report.added_missing.len()
                    );
                }
                Self {
                    catalog,
                    assignment,
                    overrides,
                    bounds,
                }
            }
            None => Self::with_overrides(catalog, overrides, bounds),
        }
    }

    fn with_overrides(catalog: Catalog, overrides: RatingOverrides, bounds: TierBoundaries) -> Self {
        let mut domain = Self {
            catalog,
            assignment: TierAssignment::default(),
            overrides,
            bounds,
        };
        let rated: Vec<(ItemId, Rating)> = domain
            .catalog
            .items()
            .iter()
            .map(|item| (item.id.clone(), domain.effective_rating(&item.id)))
            .collect();
        domain.assignment = TierAssignment::initialize(rated, &bounds);
        domain
    }

    /// Items of this domain
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Current tier assignment
    pub fn assignment(&self) -> &TierAssignment {
        &self.assignment
    }

    /// Explicit ratings
    pub fn overrides(&self) -> &RatingOverrides {
        &self.overrides
    }

    /// Current thresholds
    pub fn bounds(&self) -> &TierBoundaries {
        &self.bounds
    }

    /// Rating used for classification and analysis
    ///
    /// Lookup order: override, then baseline, then [`DEFAULT_RATING`].
    pub fn effective_rating(&self, id: &ItemId) -> Rating {
        self.overrides
            .get(id)
            .or_else(|| self.catalog.get(id).and_then(|item| item.baseline))
            .unwrap_or(DEFAULT_RATING)
    }

    /// Tier holding the id; tier 3 when it is in none
    pub fn tier_of(&self, id: &ItemId) -> Tier {
        self.assignment.tier_or_bottom(id)
    }

    /// Items of one tier with their effective ratings, in tier order
    pub fn tier_items(&self, tier: Tier) -> Vec<(&Item, Rating)> {
        self.assignment
            .tier(tier)
            .iter()
            .filter_map(|id| self.catalog.get(id))
            .map(|item| (item, self.effective_rating(&item.id)))
            .collect()
    }

    /// Move an item between or within tiers; ratings are untouched
    pub fn move_item(&self, id: &ItemId, target: Tier, before: Option<&ItemId>) -> Result<Self, DomainError> {
        self.require(id)?;
        Ok(Self {
            assignment: self.assignment.moved(id, target, before),
            ..self.clone()
        })
    }

    /// Record an explicit rating and reconcile the tiers around it
    pub fn set_rating(&self, id: &ItemId, rating: Rating) -> Result<Self, DomainError> {
        self.require(id)?;
        let overrides = self.overrides.with(id.clone(), rating);
        let next = Self {
            overrides,
            ..self.clone()
        };
        let assignment = self.assignment.with_rating_change(
            id,
            rating,
            |other| next.effective_rating(other),
            &self.bounds,
        );
        Ok(Self { assignment, ..next })
    }

    /// Replace the thresholds and reclassify every item
    pub fn set_boundaries(&self, bounds: TierBoundaries) -> Self {
        let assignment = self
            .assignment
            .reconciled(|id| self.effective_rating(id), &bounds);
        Self {
            assignment,
            bounds,
            ..self.clone()
        }
    }

    /// Snapshot for persistence
    pub fn state(&self) -> DomainState {
        DomainState {
            assignment: Some(self.assignment.clone()),
            overrides: self.overrides.clone(),
            bounds: Some(self.bounds),
        }
    }

    fn require(&self, id: &ItemId) -> Result<(), DomainError> {
        if self.catalog.contains(id) {
            Ok(())
        } else {
            Err(DomainError::UnknownItem(id.to_string()))
        }
    }
}

/// Inputs needed to open a session
#[derive(Debug, Clone)]
pub struct SessionSetup {
    /// Signed-in participant
    pub user: String,
    /// Shared rating matrix (live, cached, or built-in)
    pub matrix: PeerRatingMatrix,
    /// Participants to offer as peers when the matrix has at most one row
    pub roster: Vec<String>,
    /// Persisted state for this user, if any
    pub saved: Option<SessionState>,
    /// Thresholds for domains without saved state
    pub default_bounds: TierBoundaries,
    /// Ideas whose co-founder is already decided
    pub locked: LockedIdeas,
}

/// A signed-in user's ranking session
#[derive(Debug, Clone)]
pub struct Session {
    user: String,
    peers: RankingDomain,
    ideas: RankingDomain,
    matrix: PeerRatingMatrix,
    locked: LockedIdeas,
    default_bounds: TierBoundaries,
}

impl Session {
    /// Open a session: build catalogs from the matrix and restore saved state
    pub fn start(setup: SessionSetup) -> Self {
        let SessionSetup {
            user,
            matrix,
            roster,
            saved,
            default_bounds,
            locked,
        } = setup;

        let peer_catalog = peer_catalog(&matrix, &roster, &user);
        let idea_catalog = idea_catalog(&matrix, &user);
        debug!(
            "Starting session for {}: {} peers, {} ideas",
            user,
            peer_catalog.len(),
            idea_catalog.len()
        );

        let (peers, ideas) = match saved {
            Some(state) => (
                RankingDomain::restore(peer_catalog, state.peers, default_bounds),
                RankingDomain::restore(idea_catalog, state.ideas, default_bounds),
            ),
            None => (
                RankingDomain::fresh(peer_catalog, default_bounds),
                RankingDomain::fresh(idea_catalog, default_bounds),
            ),
        };

        Self {
            user,
            peers,
            ideas,
            matrix,
            locked,
            default_bounds,
        }
    }

    /// Signed-in participant
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Co-founder ranking
    pub fn peers(&self) -> &RankingDomain {
        &self.peers
    }

    /// Idea ranking
    pub fn ideas(&self) -> &RankingDomain {
        &self.ideas
    }

    /// Either ranking
    pub fn domain(&self, kind: DomainKind) -> &RankingDomain {
        match kind {
            DomainKind::Peers => &self.peers,
            DomainKind::Ideas => &self.ideas,
        }
    }

    /// Shared rating matrix
    pub fn matrix(&self) -> &PeerRatingMatrix {
        &self.matrix
    }

    /// Locked-idea table
    pub fn locked_ideas(&self) -> &LockedIdeas {
        &self.locked
    }

    /// Move an item; see [`RankingDomain::move_item`]
    pub fn move_item(
        &mut self,
        kind: DomainKind,
        id: &ItemId,
        target: Tier,
        before: Option<&ItemId>,
    ) -> Result<(), DomainError> {
        let next = self.domain(kind).move_item(id, target, before)?;
        self.replace(kind, next);
        Ok(())
    }

    /// Set a rating; see [`RankingDomain::set_rating`]
    pub fn set_rating(&mut self, kind: DomainKind, id: &ItemId, rating: Rating) -> Result<(), DomainError> {
        let next = self.domain(kind).set_rating(id, rating)?;
        self.replace(kind, next);
        Ok(())
    }

    /// Change thresholds; see [`RankingDomain::set_boundaries`]
    pub fn set_boundaries(&mut self, kind: DomainKind, bounds: TierBoundaries) {
        let next = self.domain(kind).set_boundaries(bounds);
        self.replace(kind, next);
    }

    /// Swap in a freshly fetched matrix; catalogs and tiers are kept
    pub fn replace_matrix(&mut self, matrix: PeerRatingMatrix) {
        self.matrix = matrix;
    }

    /// Discard all tiering and rating state and start over from baselines
    pub fn reset(&mut self) {
        self.peers = RankingDomain::fresh(self.peers.catalog.clone(), self.default_bounds);
        self.ideas = RankingDomain::fresh(self.ideas.catalog.clone(), self.default_bounds);
    }

    /// Snapshot for persistence
    pub fn snapshot(&self) -> SessionState {
        SessionState {
            peers: self.peers.state(),
            ideas: self.ideas.state(),
        }
    }

    /// Read-only analysis over the current state
    pub fn analyzer(&self) -> AlignmentAnalyzer<'_> {
        AlignmentAnalyzer::new(&self.matrix, &self.peers, &self.ideas, &self.locked)
    }

    fn replace(&mut self, kind: DomainKind, next: RankingDomain) {
        match kind {
            DomainKind::Peers => self.peers = next,
            DomainKind::Ideas => self.ideas = next,
        }
    }
}

/// Peers: matrix participants when the sheet has more than one row, else the roster
fn peer_catalog(matrix: &PeerRatingMatrix, roster: &[String], user: &str) -> Catalog {
    let names: Vec<&str> = if matrix.rows().len() > 1 {
        matrix.participants().collect()
    } else {
        roster.iter().map(String::as_str).collect()
    };
    let own_id = ItemId::from_name(user);
    Catalog::new(
        names
            .into_iter()
            .filter(|name| ItemId::from_name(name) != own_id)
            .map(|name| Item::new(name, None)),
    )
}

/// Ideas: matrix columns, baselined by the user's own row
///
/// The row is matched by name slug, so sheet spellings differing in case or
/// punctuation still count as the user.
fn idea_catalog(matrix: &PeerRatingMatrix, user: &str) -> Catalog {
    let own_id = ItemId::from_name(user);
    let own_row = matrix
        .rows()
        .iter()
        .find(|row| ItemId::from_name(&row.name) == own_id)
        .map(|row| row.ratings.as_slice());
    Catalog::new(matrix.idea_columns().iter().enumerate().map(|(column, name)| {
        let baseline = own_row
            .and_then(|row| row.get(column).copied())
            .and_then(Rating::from_baseline);
        Item::new(name.clone(), baseline)
    }))
}

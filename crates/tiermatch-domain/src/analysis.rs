//! Alignment analysis between the user and every peer, and per-idea matches
//!
//! Everything here is a pure projection of the session state. Nothing is
//! cached; results are recomputed on each request.

use crate::item::{Item, ItemId};
use crate::matrix::PeerRatingMatrix;
use crate::rating::Rating;
use crate::session::RankingDomain;
use crate::tier::Tier;
use std::cmp::{Ordering, Reverse};

/// Rating at or above which a side counts as enthusiastic
pub const STRONG_RATING: u8 = 5;

/// Rating at or below which a side counts as uninterested
pub const WEAK_RATING: u8 = 3;

/// Minimum peer idea rating for a peer to be listed as a match
pub const MATCH_MIN_RATING: u8 = 4;

/// Number of best joint ideas reported per peer
pub const BEST_JOINT_COUNT: usize = 3;

/// Minimum effective rating for an idea to count as a top pick
pub const TOP_IDEA_RATING: u8 = 6;

/// Default minimum "my rating" for the matches-by-idea view
pub const DEFAULT_IDEA_FILTER: u8 = 5;

/// My rating and a peer's rating for one idea
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdeaComparison {
    /// Column index in the matrix
    pub column: usize,
    /// My effective rating
    pub mine: u8,
    /// The peer's rating (0 when absent)
    pub theirs: u8,
    /// Absolute difference
    pub diff: u8,
    /// Weaker of the two ratings
    pub min: u8,
    /// Stronger of the two ratings
    pub max: u8,
}

impl IdeaComparison {
    /// Compare two ratings for the idea at `column`
    pub fn new(column: usize, mine: u8, theirs: u8) -> Self {
        Self {
            column,
            mine,
            theirs,
            diff: mine.abs_diff(theirs),
            min: mine.min(theirs),
            max: mine.max(theirs),
        }
    }

    /// Both sides rate the idea highly
    pub fn is_shared_high(&self) -> bool {
        self.mine >= STRONG_RATING && self.theirs >= STRONG_RATING
    }

    /// One side is keen and the other is not
    pub fn is_conflict(&self) -> bool {
        (self.mine >= STRONG_RATING && self.theirs <= WEAK_RATING)
            || (self.theirs >= STRONG_RATING && self.mine <= WEAK_RATING)
    }
}

/// Overlap ratio Σmin / Σmax as a rounded percentage
///
/// Returns 0 when every rating is 0.
pub fn alignment_percentage(comparisons: &[IdeaComparison]) -> u8 {
    let sum_min: u32 = comparisons.iter().map(|c| c.min as u32).sum();
    let sum_max: u32 = comparisons.iter().map(|c| c.max as u32).sum();
    if sum_max == 0 {
        return 0;
    }
    ((sum_min as f64 / sum_max as f64) * 100.0).round() as u8
}

/// Coarse reading of an alignment percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentBand {
    /// 65% and above
    High,
    /// 45% to 64%
    Medium,
    /// Below 45%
    Low,
}

impl AlignmentBand {
    /// Band for a percentage
    pub fn of(alignment: u8) -> Self {
        if alignment >= 65 {
            AlignmentBand::High
        } else if alignment >= 45 {
            AlignmentBand::Medium
        } else {
            AlignmentBand::Low
        }
    }
}

/// How worrying a peer's conflicts are given where I ranked them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictSeverity {
    /// Above-bar peer with three or more conflicts
    Severe,
    /// Top-tier peer with two conflicts
    Elevated,
    /// Nothing to flag
    None,
}

/// Alignment summary between me and one peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerAlignment {
    /// Peer id
    pub id: ItemId,
    /// Peer display name
    pub name: String,
    /// My effective rating of the peer as a co-founder
    pub rating: Rating,
    /// Tier I placed the peer in
    pub tier: Tier,
    /// Every idea, in column order
    pub comparisons: Vec<IdeaComparison>,
    /// Ideas we both rate highly, strongest mutual rating first
    pub shared: Vec<IdeaComparison>,
    /// Ideas where one of us is keen and the other is not, biggest gap first
    pub conflicts: Vec<IdeaComparison>,
    /// Overlap percentage in [0, 100]
    pub alignment: u8,
    /// Up to three ideas with the highest mutual rating
    pub best_joint: Vec<IdeaComparison>,
}

impl PeerAlignment {
    /// Summarize a set of comparisons
    pub fn summarize(id: ItemId, name: String, rating: Rating, tier: Tier, comparisons: Vec<IdeaComparison>) -> Self {
        let mut shared: Vec<IdeaComparison> = comparisons.iter().copied().filter(IdeaComparison::is_shared_high).collect();
        shared.sort_by_key(|c| Reverse(c.min));

        let mut conflicts: Vec<IdeaComparison> = comparisons.iter().copied().filter(IdeaComparison::is_conflict).collect();
        conflicts.sort_by_key(|c| Reverse(c.diff));

        let mut best_joint = comparisons.clone();
        best_joint.sort_by_key(|c| Reverse(c.min));
        best_joint.truncate(BEST_JOINT_COUNT);

        let alignment = alignment_percentage(&comparisons);

        Self {
            id,
            name,
            rating,
            tier,
            comparisons,
            shared,
            conflicts,
            alignment,
            best_joint,
        }
    }

    /// Coarse alignment reading
    pub fn band(&self) -> AlignmentBand {
        AlignmentBand::of(self.alignment)
    }

    /// Conflict severity given the peer's tier
    pub fn severity(&self) -> ConflictSeverity {
        let count = self.conflicts.len();
        if self.tier.is_above_bar() && count >= 3 {
            ConflictSeverity::Severe
        } else if self.tier == Tier::Tier1 && count >= 2 {
            ConflictSeverity::Elevated
        } else {
            ConflictSeverity::None
        }
    }
}

/// Ordering for the peer list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeerSort {
    /// Best tier first, then highest co-founder rating
    #[default]
    Tier,
    /// Highest alignment first
    Alignment,
    /// Most conflicts first, then lowest alignment
    Conflicts,
    /// Highest co-founder rating first
    Rating,
}

impl PeerSort {
    /// Stable in-place sort
    pub fn apply(&self, peers: &mut [PeerAlignment]) {
        match self {
            PeerSort::Tier => peers.sort_by(|a, b| a.tier.cmp(&b.tier).then(b.rating.cmp(&a.rating))),
            PeerSort::Alignment => peers.sort_by_key(|p| Reverse(p.alignment)),
            PeerSort::Conflicts => peers.sort_by(|a, b| {
                b.conflicts
                    .len()
                    .cmp(&a.conflicts.len())
                    .then(a.alignment.cmp(&b.alignment))
            }),
            PeerSort::Rating => peers.sort_by_key(|p| Reverse(p.rating)),
        }
    }
}

/// An idea whose co-founder is already decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedIdea {
    /// Idea display name
    pub idea: String,
    /// Participant who owns the idea
    pub owner: String,
    /// Explanation shown with the match
    pub note: String,
}

/// Table of locked ideas
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockedIdeas {
    entries: Vec<LockedIdea>,
}

impl LockedIdeas {
    /// Build the table; ideas are matched by slug
    pub fn new(entries: Vec<LockedIdea>) -> Self {
        Self { entries }
    }

    /// Lock entry for an idea name, if any
    pub fn get(&self, idea: &str) -> Option<&LockedIdea> {
        let wanted = ItemId::from_name(idea);
        self.entries.iter().find(|e| ItemId::from_name(&e.idea) == wanted)
    }
}

/// A peer listed against an idea
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerMatch {
    /// Peer id
    pub id: ItemId,
    /// Peer display name
    pub name: String,
    /// My effective rating of the peer
    pub peer_rating: Rating,
    /// Their rating of the idea (0 when absent)
    pub idea_rating: u8,
    /// Tier I placed the peer in
    pub tier: Tier,
}

/// Result of matching peers to one idea
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The idea already has an owner; ratings are not consulted
    Locked {
        /// Owner's name as configured
        owner: String,
        /// Explanation
        note: String,
        /// Owner as a peer, when they are in my peer list
        peer: Option<PeerMatch>,
    },
    /// Regular rating-driven matching
    Open {
        /// Above-bar peers keen on the idea, best first
        candidates: Vec<PeerMatch>,
        /// Candidates that are top-tier and clear the idea tier-1 threshold
        perfect: Vec<ItemId>,
    },
}

/// Matches for one idea
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeaMatches {
    /// Idea display name
    pub idea: String,
    /// Column index in the matrix
    pub column: usize,
    /// My effective rating of the idea
    pub my_rating: u8,
    /// Locked owner or open candidate list
    pub outcome: MatchOutcome,
}

impl IdeaMatches {
    /// Listed peers, whichever variant applies
    pub fn matches(&self) -> Vec<&PeerMatch> {
        match &self.outcome {
            MatchOutcome::Locked { peer, .. } => peer.iter().collect(),
            MatchOutcome::Open { candidates, .. } => candidates.iter().collect(),
        }
    }

    /// True when the peer is a perfect match (never for locked ideas)
    pub fn is_perfect(&self, id: &ItemId) -> bool {
        match &self.outcome {
            MatchOutcome::Locked { .. } => false,
            MatchOutcome::Open { perfect, .. } => perfect.contains(id),
        }
    }

    /// True for locked ideas
    pub fn is_locked(&self) -> bool {
        matches!(self.outcome, MatchOutcome::Locked { .. })
    }
}

/// How strongly both sides like an idea, for the matrix view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStrength {
    /// Both 6 or more
    Strong,
    /// Both 5 or more
    Shared,
    /// Both 4 or more
    Mild,
    /// Anything else
    None,
}

impl CellStrength {
    /// Strength for a pair of ratings
    pub fn of(mine: u8, theirs: u8) -> Self {
        match mine.min(theirs) {
            6.. => CellStrength::Strong,
            5 => CellStrength::Shared,
            4 => CellStrength::Mild,
            _ => CellStrength::None,
        }
    }
}

/// One row of the idea matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixRow {
    /// Peer id
    pub id: ItemId,
    /// Peer display name
    pub name: String,
    /// Tier I placed the peer in
    pub tier: Tier,
    /// My effective rating of the peer
    pub rating: Rating,
    /// `(their rating, strength)` per idea column
    pub cells: Vec<(u8, CellStrength)>,
}

/// Read-only analysis over a session's rankings and the shared matrix
pub struct AlignmentAnalyzer<'a> {
    matrix: &'a PeerRatingMatrix,
    peers: &'a RankingDomain,
    ideas: &'a RankingDomain,
    locked: &'a LockedIdeas,
    my_ratings: Vec<u8>,
}

impl<'a> AlignmentAnalyzer<'a> {
    /// Prepare an analyzer; my rating per idea column is resolved once here
    pub fn new(
        matrix: &'a PeerRatingMatrix,
        peers: &'a RankingDomain,
        ideas: &'a RankingDomain,
        locked: &'a LockedIdeas,
    ) -> Self {
        let my_ratings = matrix
            .idea_columns()
            .iter()
            .map(|name| ideas.effective_rating(&ItemId::from_name(name)).value())
            .collect();
        Self {
            matrix,
            peers,
            ideas,
            locked,
            my_ratings,
        }
    }

    /// My effective rating per idea column
    pub fn my_ratings(&self) -> &[u8] {
        &self.my_ratings
    }

    /// Compare my ratings with one participant's row
    pub fn compare(&self, participant: &str) -> Vec<IdeaComparison> {
        self.my_ratings
            .iter()
            .enumerate()
            .map(|(column, mine)| IdeaComparison::new(column, *mine, self.matrix.rating(participant, column)))
            .collect()
    }

    /// Alignment with every peer, in catalog order
    pub fn peer_alignments(&self) -> Vec<PeerAlignment> {
        self.peers
            .catalog()
            .items()
            .iter()
            .map(|peer| self.align_with(peer))
            .collect()
    }

    /// Sorted and optionally tier-filtered peer list
    pub fn peer_report(&self, sort: PeerSort, tier: Option<Tier>) -> Vec<PeerAlignment> {
        let mut peers: Vec<PeerAlignment> = self
            .peer_alignments()
            .into_iter()
            .filter(|p| tier.is_none_or(|t| p.tier == t))
            .collect();
        sort.apply(&mut peers);
        peers
    }

    fn align_with(&self, peer: &Item) -> PeerAlignment {
        PeerAlignment::summarize(
            peer.id.clone(),
            peer.name.clone(),
            self.peers.effective_rating(&peer.id),
            self.peers.tier_of(&peer.id),
            self.compare(&peer.name),
        )
    }

    fn peer_match(&self, peer: &Item, column: usize) -> PeerMatch {
        PeerMatch {
            id: peer.id.clone(),
            name: peer.name.clone(),
            peer_rating: self.peers.effective_rating(&peer.id),
            idea_rating: self.matrix.rating(&peer.name, column),
            tier: self.peers.tier_of(&peer.id),
        }
    }

    /// Matches for every idea I rate at least `min_my_rating`, my favourites first
    pub fn idea_matches(&self, min_my_rating: u8) -> Vec<IdeaMatches> {
        let mut ideas: Vec<IdeaMatches> = self
            .matrix
            .idea_columns()
            .iter()
            .enumerate()
            .map(|(column, idea)| self.match_idea(column, idea))
            .filter(|m| m.my_rating >= min_my_rating)
            .collect();
        ideas.sort_by_key(|m| Reverse(m.my_rating));
        ideas
    }

    fn match_idea(&self, column: usize, idea: &str) -> IdeaMatches {
        let outcome = match self.locked.get(idea) {
            Some(lock) => {
                let owner_id = ItemId::from_name(&lock.owner);
                MatchOutcome::Locked {
                    owner: lock.owner.clone(),
                    note: lock.note.clone(),
                    peer: self
                        .peers
                        .catalog()
                        .get(&owner_id)
                        .map(|peer| self.peer_match(peer, column)),
                }
            }
            None => {
                let mut candidates: Vec<PeerMatch> = self
                    .peers
                    .catalog()
                    .items()
                    .iter()
                    .map(|peer| self.peer_match(peer, column))
                    .filter(|m| m.idea_rating >= MATCH_MIN_RATING && m.tier.is_above_bar())
                    .collect();
                candidates.sort_by(by_rating_then_idea);

                let threshold = self.ideas.bounds().tier1_min();
                let perfect = candidates
                    .iter()
                    .filter(|m| m.tier == Tier::Tier1 && m.idea_rating >= threshold)
                    .map(|m| m.id.clone())
                    .collect();
                MatchOutcome::Open { candidates, perfect }
            }
        };

        IdeaMatches {
            idea: idea.to_string(),
            column,
            my_rating: self.my_ratings.get(column).copied().unwrap_or_default(),
            outcome,
        }
    }

    /// My ideas rated 6 or more, highest first
    pub fn top_ideas(&self) -> Vec<(&'a Item, Rating)> {
        let mut top: Vec<(&'a Item, Rating)> = self
            .ideas
            .catalog()
            .items()
            .iter()
            .map(|item| (item, self.ideas.effective_rating(&item.id)))
            .filter(|(_, rating)| rating.value() >= TOP_IDEA_RATING)
            .collect();
        top.sort_by_key(|(_, rating)| Reverse(*rating));
        top
    }

    /// Peer × idea grid, best tier first then highest co-founder rating
    pub fn matrix_rows(&self) -> Vec<MatrixRow> {
        let mut rows: Vec<MatrixRow> = self
            .peers
            .catalog()
            .items()
            .iter()
            .map(|peer| MatrixRow {
                id: peer.id.clone(),
                name: peer.name.clone(),
                tier: self.peers.tier_of(&peer.id),
                rating: self.peers.effective_rating(&peer.id),
                cells: self
                    .my_ratings
                    .iter()
                    .enumerate()
                    .map(|(column, mine)| {
                        let theirs = self.matrix.rating(&peer.name, column);
                        (theirs, CellStrength::of(*mine, theirs))
                    })
                    .collect(),
            })
            .collect();
        rows.sort_by(|a, b| a.tier.cmp(&b.tier).then(b.rating.cmp(&a.rating)));
        rows
    }
}

fn by_rating_then_idea(a: &PeerMatch, b: &PeerMatch) -> Ordering {
    b.peer_rating
        .cmp(&a.peer_rating)
        .then(b.idea_rating.cmp(&a.idea_rating))
}

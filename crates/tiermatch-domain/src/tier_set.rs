//! Tier assignment and its reconciliation rules
//!
//! A [`TierAssignment`] is an ordered partition of one domain's item ids into
//! three tiers. Every operation here returns a new assignment and leaves the
//! receiver untouched, so a reader holding the previous value never sees a
//! half-applied edit.
//!
//! Order inside a tier is meaningful: it is the user's curated order after a
//! move, and descending effective rating after any rating-driven change.
//! All re-sorts are stable, so ties keep their prior relative order.

use crate::item::{Catalog, ItemId};
use crate::rating::Rating;
use crate::tier::{classify, Tier, TierBoundaries};
use std::cmp::Reverse;
use std::collections::HashSet;

/// Ordered partition of item ids into three tiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierAssignment {
    tiers: [Vec<ItemId>; 3],
}

/// What [`TierAssignment::repaired`] had to change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Ids that are not in the catalog and were dropped
    pub dropped_unknown: Vec<ItemId>,
    /// Repeated occurrences that were removed (first occurrence kept)
    pub dropped_duplicates: Vec<ItemId>,
    /// Catalog ids that were missing and got appended to tier 2
    pub added_missing: Vec<ItemId>,
}

impl RepairReport {
    /// True when the assignment needed no repair
    pub fn is_clean(&self) -> bool {
        self.dropped_unknown.is_empty()
            && self.dropped_duplicates.is_empty()
            && self.added_missing.is_empty()
    }
}

impl TierAssignment {
    /// Build from raw sequences without checking anything
    ///
    /// Used when reading persisted state; run [`TierAssignment::repaired`]
    /// before relying on the partition invariant.
    pub fn from_tiers(tier1: Vec<ItemId>, tier2: Vec<ItemId>, tier3: Vec<ItemId>) -> Self {
        Self {
            tiers: [tier1, tier2, tier3],
        }
    }

    /// Classify every item and sort each tier by descending rating
    ///
    /// Ties keep the input order.
    pub fn initialize<I>(rated: I, bounds: &TierBoundaries) -> Self
    where
        I: IntoIterator<Item = (ItemId, Rating)>,
    {
        let mut buckets: [Vec<(ItemId, Rating)>; 3] = Default::default();
        for (id, rating) in rated {
            buckets[classify(rating, bounds).index()].push((id, rating));
        }

        let tiers = buckets.map(|mut bucket| {
            bucket.sort_by_key(|(_, rating)| Reverse(*rating));
            bucket.into_iter().map(|(id, _)| id).collect()
        });
        Self { tiers }
    }

    /// Ids in one tier, in order
    pub fn tier(&self, tier: Tier) -> &[ItemId] {
        &self.tiers[tier.index()]
    }

    /// Tier currently holding an id
    pub fn tier_of(&self, id: &ItemId) -> Option<Tier> {
        Tier::ALL.into_iter().find(|t| self.tier(*t).contains(id))
    }

    /// Tier holding an id, or tier 3 when the id is nowhere
    pub fn tier_or_bottom(&self, id: &ItemId) -> Tier {
        self.tier_of(id).unwrap_or(Tier::Tier3)
    }

    /// True when any tier holds the id
    pub fn contains(&self, id: &ItemId) -> bool {
        self.tier_of(id).is_some()
    }

    /// All ids, tier 1 first, preserving order inside each tier
    pub fn ids(&self) -> impl Iterator<Item = &ItemId> {
        self.tiers.iter().flatten()
    }

    /// Total number of ids across tiers
    pub fn len(&self) -> usize {
        self.tiers.iter().map(Vec::len).sum()
    }

    /// True when every tier is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move an id into `target`, before `before` when that id is present there
    ///
    /// The id is first removed from wherever it sits (or treated as coming from
    /// nowhere), then inserted. Ratings are not involved.
    pub fn moved(&self, id: &ItemId, target: Tier, before: Option<&ItemId>) -> Self {
        let mut tiers = self.without(id);
        let dest = &mut tiers[target.index()];
        let position = before.and_then(|b| dest.iter().position(|x| x == b));
        match position {
            Some(idx) => dest.insert(idx, id.clone()),
            None => dest.push(id.clone()),
        }
        Self { tiers }
    }

    /// React to a new rating for `id`
    ///
    /// When `new_rating` classifies into a different tier than the one holding
    /// `id`, the id is appended to that tier. Then all three tiers are re-sorted
    /// by descending rating, using `new_rating` for `id` and `rating_of` for
    /// everything else.
    pub fn with_rating_change<F>(
        &self,
        id: &ItemId,
        new_rating: Rating,
        rating_of: F,
        bounds: &TierBoundaries,
    ) -> Self
    where
        F: Fn(&ItemId) -> Rating,
    {
        let target = classify(new_rating, bounds);
        let relocated = if self.tier_of(id) == Some(target) {
            self.clone()
        } else {
            self.moved(id, target, None)
        };

        let lookup = |x: &ItemId| if x == id { new_rating } else { rating_of(x) };
        relocated.sorted_by(lookup)
    }

    /// Reclassify every present id from scratch under `bounds`
    ///
    /// Tier membership is discarded; ids are visited tier 1 first so the
    /// previous order is the tiebreak. Applying this twice with the same
    /// inputs returns the same assignment.
    pub fn reconciled<F>(&self, rating_of: F, bounds: &TierBoundaries) -> Self
    where
        F: Fn(&ItemId) -> Rating,
    {
        Self::initialize(self.ids().map(|id| (id.clone(), rating_of(id))), bounds)
    }

    /// Bring a persisted assignment back in line with the current catalog
    ///
    /// Unknown ids are dropped, repeats removed, and catalog ids that are
    /// missing are appended to tier 2 in catalog order.
    pub fn repaired(&self, catalog: &Catalog) -> (Self, RepairReport) {
        let mut report = RepairReport::default();
        let mut seen: HashSet<ItemId> = HashSet::new();
        let mut tiers: [Vec<ItemId>; 3] = Default::default();

        for tier in Tier::ALL {
            for id in self.tier(tier) {
                if !catalog.contains(id) {
                    report.dropped_unknown.push(id.clone());
                } else if !seen.insert(id.clone()) {
                    report.dropped_duplicates.push(id.clone());
                } else {
                    tiers[tier.index()].push(id.clone());
                }
            }
        }

        for item in catalog.items() {
            if !seen.contains(&item.id) {
                tiers[Tier::Tier2.index()].push(item.id.clone());
                report.added_missing.push(item.id.clone());
            }
        }

        (Self { tiers }, report)
    }

    /// True when the tiers hold every catalog id exactly once and nothing else
    pub fn is_partition_of(&self, catalog: &Catalog) -> bool {
        let mut seen = HashSet::new();
        for id in self.ids() {
            if !catalog.contains(id) || !seen.insert(id) {
                return false;
            }
        }
        seen.len() == catalog.len()
    }

    fn without(&self, id: &ItemId) -> [Vec<ItemId>; 3] {
        self.tiers
            .clone()
            .map(|tier| tier.into_iter().filter(|x| x != id).collect())
    }

    fn sorted_by<F>(&self, rating_of: F) -> Self
    where
        F: Fn(&ItemId) -> Rating,
    {
        let tiers = self.tiers.clone().map(|mut tier| {
            tier.sort_by_key(|id| Reverse(rating_of(id)));
            tier
        });
        Self { tiers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;
    use std::collections::HashMap;

    fn id(s: &str) -> ItemId {
        ItemId::from_raw(s)
    }

    fn r(v: i64) -> Rating {
        Rating::new(v).unwrap()
    }

    fn ids(list: &[ItemId]) -> Vec<&str> {
        list.iter().map(|i| i.as_str()).collect()
    }

    fn ratings(pairs: &[(&str, i64)]) -> HashMap<ItemId, Rating> {
        pairs.iter().map(|(k, v)| (id(k), r(*v))).collect()
    }

    #[test]
    fn test_initialize_sorts_with_stable_ties() {
        let bounds = TierBoundaries::new(6, 3).unwrap();
        let assignment = TierAssignment::initialize(
            vec![
                (id("a"), r(6)),
                (id("b"), r(7)),
                (id("c"), r(6)),
                (id("d"), r(4)),
                (id("e"), r(1)),
            ],
            &bounds,
        );

        assert_eq!(ids(assignment.tier(Tier::Tier1)), vec!["b", "a", "c"]);
        assert_eq!(ids(assignment.tier(Tier::Tier2)), vec!["d"]);
        assert_eq!(ids(assignment.tier(Tier::Tier3)), vec!["e"]);
    }

    #[test]
    fn test_move_before_target() {
        let assignment = TierAssignment::from_tiers(
            vec![id("w"), id("y")],
            vec![id("z")],
            vec![id("x"), id("v")],
        );

        let moved = assignment.moved(&id("x"), Tier::Tier1, Some(&id("y")));

        assert_eq!(ids(moved.tier(Tier::Tier1)), vec!["w", "x", "y"]);
        assert_eq!(ids(moved.tier(Tier::Tier2)), vec!["z"]);
        assert_eq!(ids(moved.tier(Tier::Tier3)), vec!["v"]);
        // Original is untouched
        assert_eq!(ids(assignment.tier(Tier::Tier3)), vec!["x", "v"]);
    }

    #[test]
    fn test_move_appends_when_anchor_missing() {
        let assignment = TierAssignment::from_tiers(vec![id("a")], vec![id("b")], vec![]);

        let moved = assignment.moved(&id("b"), Tier::Tier1, Some(&id("nope")));
        assert_eq!(ids(moved.tier(Tier::Tier1)), vec!["a", "b"]);

        let onto_self = assignment.moved(&id("a"), Tier::Tier1, Some(&id("a")));
        assert_eq!(ids(onto_self.tier(Tier::Tier1)), vec!["a"]);
    }

    #[test]
    fn test_move_of_absent_id_inserts_once() {
        let assignment = TierAssignment::from_tiers(vec![id("a")], vec![], vec![]);
        let moved = assignment.moved(&id("new"), Tier::Tier3, None);
        assert_eq!(moved.len(), 2);
        assert_eq!(moved.tier_of(&id("new")), Some(Tier::Tier3));
    }

    #[test]
    fn test_rating_change_relocates_and_resorts() {
        let bounds = TierBoundaries::new(6, 3).unwrap();
        let assignment = TierAssignment::from_tiers(
            vec![id("p"), id("q")],
            vec![id("x"), id("m")],
            vec![],
        );
        let current = ratings(&[("p", 7), ("q", 6), ("x", 5), ("m", 4)]);

        let next = assignment.with_rating_change(&id("x"), r(7), |i| current[i], &bounds);

        // x is appended then sorted among equal ratings after p
        assert_eq!(ids(next.tier(Tier::Tier1)), vec!["p", "x", "q"]);
        assert_eq!(ids(next.tier(Tier::Tier2)), vec!["m"]);
    }

    #[test]
    fn test_rating_change_within_tier_resorts_only() {
        let bounds = TierBoundaries::new(6, 3).unwrap();
        let assignment = TierAssignment::from_tiers(vec![], vec![id("a"), id("b")], vec![]);
        let current = ratings(&[("a", 5), ("b", 3)]);

        let next = assignment.with_rating_change(&id("b"), r(5), |i| current[i], &bounds);
        assert_eq!(ids(next.tier(Tier::Tier2)), vec!["a", "b"]);

        let next = assignment.with_rating_change(&id("a"), r(3), |i| current[i], &bounds);
        assert_eq!(ids(next.tier(Tier::Tier2)), vec!["a", "b"]);
    }

    #[test]
    fn test_rating_change_keeps_manual_order_elsewhere_when_ratings_agree() {
        let bounds = TierBoundaries::new(6, 3).unwrap();
        // Manually dragged: c before d despite equal ratings
        let assignment = TierAssignment::from_tiers(vec![], vec![id("c"), id("d")], vec![id("e")]);
        let current = ratings(&[("c", 4), ("d", 4), ("e", 1)]);

        let next = assignment.with_rating_change(&id("e"), r(2), |i| current[i], &bounds);
        assert_eq!(ids(next.tier(Tier::Tier2)), vec!["c", "d"]);
        assert_eq!(ids(next.tier(Tier::Tier3)), vec!["e"]);
    }

    #[test]
    fn test_reconcile_moves_everything_under_new_bounds() {
        let assignment = TierAssignment::from_tiers(
            vec![id("a")],
            vec![id("b"), id("c")],
            vec![id("d")],
        );
        let current = ratings(&[("a", 6), ("b", 5), ("c", 4), ("d", 2)]);
        let bounds = TierBoundaries::new(5, 2).unwrap();

        let next = assignment.reconciled(|i| current[i], &bounds);

        assert_eq!(ids(next.tier(Tier::Tier1)), vec!["a", "b"]);
        assert_eq!(ids(next.tier(Tier::Tier2)), vec!["c", "d"]);
        assert!(next.tier(Tier::Tier3).is_empty());
        assert_eq!(next.reconciled(|i| current[i], &bounds), next);
    }

    #[test]
    fn test_repair() {
        let catalog = crate::item::Catalog::new([
            Item::new("a", None),
            Item::new("b", None),
            Item::new("c", None),
        ]);
        let assignment = TierAssignment::from_tiers(
            vec![id("a"), id("ghost")],
            vec![],
            vec![id("b"), id("a")],
        );

        let (fixed, report) = assignment.repaired(&catalog);

        assert!(fixed.is_partition_of(&catalog));
        assert_eq!(ids(fixed.tier(Tier::Tier1)), vec!["a"]);
        assert_eq!(ids(fixed.tier(Tier::Tier2)), vec!["c"]);
        assert_eq!(ids(fixed.tier(Tier::Tier3)), vec!["b"]);
        assert_eq!(ids(&report.dropped_unknown), vec!["ghost"]);
        assert_eq!(ids(&report.dropped_duplicates), vec!["a"]);
        assert_eq!(ids(&report.added_missing), vec!["c"]);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_tier_or_bottom_degrades_gracefully() {
        let assignment = TierAssignment::default();
        assert_eq!(assignment.tier_or_bottom(&id("anyone")), Tier::Tier3);
    }
}

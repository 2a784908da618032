//! Integration tests for tiermatch-store
//!
//! These tests exercise the full save/load cycle through the SessionStore trait.

use tiermatch_domain::traits::SessionStore;
use tiermatch_domain::{
    DomainState, ItemId, PeerRatingMatrix, Rating, SessionState, Tier, TierAssignment, TierBoundaries,
};
use tiermatch_store::{session_key, SqliteStore, StoreError, IDENTITY_KEY, SHEET_CACHE_KEY};

fn id(s: &str) -> ItemId {
    ItemId::from_raw(s)
}

fn sample_state() -> SessionState {
    SessionState {
        peers: DomainState {
            assignment: Some(TierAssignment::from_tiers(
                vec![id("kate"), id("paul")],
                vec![id("andy")],
                vec![],
            )),
            overrides: [(id("kate"), Rating::new(7).unwrap())].into_iter().collect(),
            bounds: Some(TierBoundaries::new(5, 2).unwrap()),
        },
        ideas: DomainState {
            assignment: Some(TierAssignment::from_tiers(vec![], vec![id("wash")], vec![id("keel-bone")])),
            overrides: Default::default(),
            bounds: Some(TierBoundaries::default()),
        },
    }
}

#[test]
fn test_store_initialization() {
    let store = SqliteStore::new(":memory:");
    assert!(store.is_ok(), "Store should initialize successfully");
}

#[test]
fn test_missing_session_is_none() {
    let store = SqliteStore::new(":memory:").unwrap();
    assert!(store.load_session("Kate").unwrap().is_none());
    assert!(store.load_identity().unwrap().is_none());
    assert!(store.load_cached_matrix().unwrap().is_none());
}

#[test]
fn test_save_and_load_session() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let state = sample_state();

    store.save_session("Kate", &state).unwrap();
    let loaded = store.load_session("Kate").unwrap().expect("saved state");

    assert_eq!(loaded, state);
    assert_eq!(loaded.peers.assignment.unwrap().tier(Tier::Tier1), &[id("kate"), id("paul")]);
}

#[test]
fn test_session_key_is_case_insensitive() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    store.save_session("KATE", &sample_state()).unwrap();

    assert!(store.load_session("kate").unwrap().is_some());
    assert!(store.get_raw(&session_key("Kate")).unwrap().is_some());
    assert!(store.get_raw("ce-matching-KATE").unwrap().is_none());
}

#[test]
fn test_save_replaces_previous_state() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    store.save_session("Kate", &sample_state()).unwrap();
    store.save_session("Kate", &SessionState::default()).unwrap();

    let loaded = store.load_session("Kate").unwrap().unwrap();
    assert!(loaded.peers.overrides.is_empty());
    assert!(loaded.peers.assignment.is_none());
}

#[test]
fn test_clear_session() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    store.save_session("Kate", &sample_state()).unwrap();
    store.save_session("Paul", &sample_state()).unwrap();

    store.clear_session("Kate").unwrap();
    assert!(store.load_session("Kate").unwrap().is_none());
    assert!(store.load_session("Paul").unwrap().is_some());

    // Clearing twice is fine
    store.clear_session("Kate").unwrap();
}

#[test]
fn test_identity_roundtrip() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    store.save_identity("Kate").unwrap();
    assert_eq!(store.load_identity().unwrap().as_deref(), Some("Kate"));

    store.save_identity("Paul").unwrap();
    assert_eq!(store.load_identity().unwrap().as_deref(), Some("Paul"));

    assert!(store.save_identity("  ").is_err());
}

#[test]
fn test_cached_matrix_roundtrip() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let matrix = PeerRatingMatrix::new(vec!["WASH".into(), "Keel Bone".into()])
        .with_row("Kate", vec![4, 1])
        .with_row("Paul", vec![3, 7]);

    store.save_cached_matrix(&matrix).unwrap();
    assert_eq!(store.load_cached_matrix().unwrap(), Some(matrix));
}

#[test]
fn test_legacy_json_is_accepted() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    store
        .put_raw(
            &session_key("Kate"),
            r#"{
                "cfTiers": {"tier1": ["paul"], "tier2": [], "tier3": ["andy"]},
                "cfRatings": {"paul": 6},
                "cfBounds": {"tier1Min": 6, "tier2Min": 3}
            }"#,
        )
        .unwrap();

    let loaded = store.load_session("Kate").unwrap().unwrap();
    assert_eq!(loaded.peers.assignment.unwrap().tier(Tier::Tier3), &[id("andy")]);
    assert_eq!(loaded.peers.overrides.get(&id("paul")).map(|r| r.value()), Some(6));
    assert!(loaded.ideas.assignment.is_none());
    assert_eq!(loaded.peers.bounds, Some(TierBoundaries::default()));
    assert_eq!(loaded.ideas.bounds, None);
}

#[test]
fn test_corrupt_value_is_serialization_error() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    store.put_raw(&session_key("Kate"), "{not json").unwrap();
    store.put_raw(IDENTITY_KEY, "42").unwrap();
    store.put_raw(SHEET_CACHE_KEY, "[]").unwrap();

    assert!(matches!(store.load_session("Kate"), Err(StoreError::Serialization(_))));
    assert!(matches!(store.load_identity(), Err(StoreError::Serialization(_))));
    assert!(matches!(store.load_cached_matrix(), Err(StoreError::Serialization(_))));
}

#[test]
fn test_file_backed_store_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.db");

    {
        let mut store = SqliteStore::new(&path).unwrap();
        store.save_identity("Kate").unwrap();
        store.save_session("Kate", &sample_state()).unwrap();
    }

    let store = SqliteStore::new(&path).unwrap();
    assert_eq!(store.load_identity().unwrap().as_deref(), Some("Kate"));
    assert_eq!(store.load_session("Kate").unwrap(), Some(sample_state()));
}

//! Application state: the store, the sheet and the signed-in session
//!
//! Commands talk to [`App`] only. It resolves user input to item ids, applies
//! the edit to the session, and hands the resulting snapshot to the saver.

use crate::config::Config;
use crate::error::{CliError, Result};
use crate::saver::DebouncedSaver;
use std::fs;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tiermatch_domain::traits::SessionStore;
use tiermatch_domain::{
    DomainError, DomainKind, ItemId, PeerRatingMatrix, Rating, Session, SessionSetup, Tier, TierBoundaries,
};
use tiermatch_sheet::{cohort, load_matrix, MatrixStatus, SheetClient};
use tiermatch_store::SqliteStore;
use tracing::{info, warn};

/// Everything a command needs
pub struct App {
    config: Config,
    store: Arc<Mutex<SqliteStore>>,
    client: Option<SheetClient>,
    matrix: PeerRatingMatrix,
    status: MatrixStatus,
    session: Option<Session>,
    saver: DebouncedSaver,
}

impl App {
    /// Open the store, load the matrix and restore the identity
    ///
    /// `user` wins over the remembered identity. A remembered identity that no
    /// longer matches anyone is ignored with a warning.
    pub async fn open(config: Config, user: Option<String>) -> Result<Self> {
        let path = config.storage_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let store = SqliteStore::new(&path)?;
        info!("Opened state database at {}", path.display());

        let client = if config.is_offline() {
            None
        } else {
            Some(
                SheetClient::with_timeout(config.sheet.url.clone(), Duration::from_secs(config.sheet.timeout_secs))?
                    .with_max_retries(config.sheet.max_retries),
            )
        };

        let mut app = Self::with_store(config, store, client);
        app.load_matrix().await;

        match user {
            Some(name) => {
                app.select_identity(&name)?;
            }
            None => {
                let remembered = app.lock_store().load_identity().unwrap_or_else(|e| {
                    warn!("Could not read saved identity: {}", e);
                    None
                });
                if let Some(name) = remembered {
                    if let Err(e) = app.select_identity(&name) {
                        warn!("Ignoring saved identity {}: {}", name, e);
                    }
                }
            }
        }
        Ok(app)
    }

    /// Assemble an app around an open store, using the built-in matrix until
    /// [`App::load_matrix`] runs
    ///
    /// Must be called inside a tokio runtime.
    pub fn with_store(config: Config, store: SqliteStore, client: Option<SheetClient>) -> Self {
        let store = Arc::new(Mutex::new(store));
        let saver = DebouncedSaver::spawn(
            store.clone(),
            Duration::from_millis(config.settings.save_debounce_ms),
        );
        Self {
            config,
            store,
            client,
            matrix: cohort::fallback_matrix(),
            status: MatrixStatus::BuiltIn,
            session: None,
            saver,
        }
    }

    /// Fetch the sheet, falling back to the cached or built-in matrix
    ///
    /// A successful fetch is cached for the next offline start. The session,
    /// if any, switches to the new matrix; its catalogs and tiers stay as they are.
    pub async fn load_matrix(&mut self) -> MatrixStatus {
        let cached = self.lock_store().load_cached_matrix().unwrap_or_else(|e| {
            warn!("Could not read cached sheet: {}", e);
            None
        });
        let (matrix, status) = load_matrix(self.client.as_ref(), cached).await;

        if status == MatrixStatus::Live {
            if let Err(e) = self.lock_store().save_cached_matrix(&matrix) {
                warn!("Could not cache sheet: {}", e);
            }
        }
        if let Some(session) = self.session.as_mut() {
            session.replace_matrix(matrix.clone());
        }
        self.matrix = matrix;
        self.status = status;
        status
    }

    /// Where the current matrix came from
    pub fn status(&self) -> MatrixStatus {
        self.status
    }

    /// Current matrix
    pub fn matrix(&self) -> &PeerRatingMatrix {
        &self.matrix
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Names that may be chosen as identity: roster first, then sheet-only names
    pub fn candidates(&self) -> Vec<String> {
        let mut names = cohort::roster();
        for name in self.matrix.participants() {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    /// Signed-in participant, if any
    pub fn identity(&self) -> Option<&str> {
        self.session.as_ref().map(Session::user)
    }

    /// Sign in as `name` and restore their saved rankings
    ///
    /// Any pending save for the previous identity is written first.
    pub async fn switch_identity(&mut self, name: &str) -> Result<&str> {
        self.saver.flush().await;
        self.select_identity(name)
    }

    fn select_identity(&mut self, name: &str) -> Result<&str> {
        let wanted = ItemId::from_name(name);
        let user = self
            .candidates()
            .into_iter()
            .find(|candidate| ItemId::from_name(candidate) == wanted)
            .ok_or_else(|| CliError::InvalidInput(format!("'{}' is not a participant", name)))?;

        let default_bounds = self.config.default_bounds()?;
        let saved = {
            let mut store = self.lock_store();
            store.save_identity(&user)?;
            store.load_session(&user).unwrap_or_else(|e| {
                warn!("Saved state for {} is unreadable, starting fresh: {}", user, e);
                None
            })
        };

        let session = Session::start(SessionSetup {
            user,
            matrix: self.matrix.clone(),
            roster: cohort::roster(),
            saved,
            default_bounds,
            locked: self.config.locked(),
        });
        info!("Signed in as {}", session.user());
        Ok(self.session.insert(session).user())
    }

    /// The signed-in session
    pub fn session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(CliError::NoIdentity)
    }

    fn session_mut(&mut self) -> Result<&mut Session> {
        self.session.as_mut().ok_or(CliError::NoIdentity)
    }

    /// Resolve an id or display name within one domain
    pub fn resolve(&self, kind: DomainKind, reference: &str) -> Result<ItemId> {
        self.session()?
            .domain(kind)
            .catalog()
            .resolve(reference)
            .cloned()
            .ok_or_else(|| DomainError::UnknownItem(reference.to_string()).into())
    }

    /// Move an item, optionally in front of another one
    pub fn move_item(&mut self, kind: DomainKind, item: &str, target: Tier, before: Option<&str>) -> Result<ItemId> {
        let id = self.resolve(kind, item)?;
        let before = before.map(|b| self.resolve(kind, b)).transpose()?;
        self.session_mut()?.move_item(kind, &id, target, before.as_ref())?;
        self.persist();
        Ok(id)
    }

    /// Set an explicit rating
    pub fn set_rating(&mut self, kind: DomainKind, item: &str, value: i64) -> Result<(ItemId, Tier)> {
        let id = self.resolve(kind, item)?;
        let rating = Rating::new(value)?;
        let session = self.session_mut()?;
        session.set_rating(kind, &id, rating)?;
        let tier = session.domain(kind).tier_of(&id);
        self.persist();
        Ok((id, tier))
    }

    /// Change one or both thresholds; the unchanged one is kept
    pub fn set_boundaries(&mut self, kind: DomainKind, tier1: Option<u8>, tier2: Option<u8>) -> Result<TierBoundaries> {
        let bounds = self.session()?.domain(kind).bounds().with(tier1, tier2)?;
        self.session_mut()?.set_boundaries(kind, bounds);
        self.persist();
        Ok(bounds)
    }

    /// Forget every tier and rating of the signed-in user
    pub async fn reset(&mut self) -> Result<()> {
        let session = self.session.as_mut().ok_or(CliError::NoIdentity)?;
        session.reset();
        let user = session.user().to_string();
        // Pending snapshot must not land after the delete
        self.saver.discard();
        self.saver.flush().await;
        self.lock_store().clear_session(&user)?;
        info!("Reset rankings for {}", user);
        Ok(())
    }

    /// Write pending edits and stop the saver
    pub async fn close(self) {
        self.saver.shutdown().await;
    }

    fn persist(&self) {
        if let Some(session) = &self.session {
            self.saver.schedule(session.user(), session.snapshot());
        }
    }

    fn lock_store(&self) -> MutexGuard<'_, SqliteStore> {
        match self.store.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn app() -> App {
        let mut config = Config::default();
        config.sheet.url = String::new();
        config.settings.save_debounce_ms = 10;
        let store = SqliteStore::new(":memory:").unwrap();
        let mut app = App::with_store(config, store, None);
        app.load_matrix().await;
        app
    }

    #[tokio::test]
    async fn test_offline_start_uses_builtin_matrix() {
        let app = app().await;
        assert_eq!(app.status(), MatrixStatus::BuiltIn);
        assert!(app.identity().is_none());
        assert!(matches!(app.session(), Err(CliError::NoIdentity)));
    }

    #[tokio::test]
    async fn test_identity_is_matched_by_slug() {
        let mut app = app().await;
        assert_eq!(app.switch_identity("kate").await.unwrap(), "Kate");
        assert!(app.switch_identity("Nobody").await.is_err());
        // Failed switch keeps the previous identity
        assert_eq!(app.identity(), Some("Kate"));

        let peers = app.session().unwrap().peers().catalog();
        assert!(!peers.contains(&ItemId::from_raw("kate")));
        assert_eq!(peers.len(), cohort::ROSTER.len() - 1);
    }

    #[tokio::test]
    async fn test_edits_resolve_names_and_persist() {
        let mut app = app().await;
        app.switch_identity("Kate").await.unwrap();

        let (id, tier) = app.set_rating(DomainKind::Peers, "Paul", 7).unwrap();
        assert_eq!(id, ItemId::from_raw("paul"));
        assert_eq!(tier, Tier::Tier1);

        app.move_item(DomainKind::Ideas, "Keel Bone", Tier::Tier1, Some("air-pollution"))
            .unwrap();
        let ideas = app.session().unwrap().ideas();
        assert_eq!(ideas.assignment().tier(Tier::Tier1)[0], ItemId::from_raw("keel-bone"));

        assert!(app.set_rating(DomainKind::Peers, "Paul", 9).is_err());
        assert!(app.move_item(DomainKind::Peers, "Ghost", Tier::Tier1, None).is_err());

        let store = app.store.clone();
        app.close().await;
        let saved = store.lock().unwrap().load_session("kate").unwrap().unwrap();
        assert_eq!(saved.peers.overrides.get(&ItemId::from_raw("paul")).map(|r| r.value()), Some(7));
    }

    #[tokio::test]
    async fn test_boundaries_keep_other_threshold() {
        let mut app = app().await;
        app.switch_identity("Kate").await.unwrap();

        let bounds = app.set_boundaries(DomainKind::Ideas, Some(5), None).unwrap();
        assert_eq!((bounds.tier1_min(), bounds.tier2_min()), (5, 3));
        assert!(app.set_boundaries(DomainKind::Ideas, None, Some(5)).is_err());
    }

    #[tokio::test]
    async fn test_reset_clears_saved_state() {
        let mut app = app().await;
        app.switch_identity("Kate").await.unwrap();
        app.set_rating(DomainKind::Peers, "Paul", 1).unwrap();
        app.saver.flush().await;

        app.reset().await.unwrap();

        assert!(app.session().unwrap().peers().overrides().is_empty());
        assert!(app.lock_store().load_session("Kate").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_saved_state_restored_on_switch() {
        let mut app = app().await;
        app.switch_identity("Kate").await.unwrap();
        app.set_rating(DomainKind::Peers, "Paul", 1).unwrap();

        app.switch_identity("Paul").await.unwrap();
        app.switch_identity("Kate").await.unwrap();

        let peers = app.session().unwrap().peers();
        assert_eq!(peers.tier_of(&ItemId::from_raw("paul")), Tier::Tier3);
    }

    #[tokio::test]
    async fn test_unusable_saved_bounds_use_configured_defaults() {
        let mut app = app().await;
        app.config.defaults.tier1_min = 5;
        app.config.defaults.tier2_min = 2;
        app.lock_store()
            .put_raw(
                &tiermatch_store::session_key("Kate"),
                r#"{"cfRatings": {"paul": 5}, "ideaBounds": {"tier1Min": 3, "tier2Min": 5}}"#,
            )
            .unwrap();

        app.switch_identity("Kate").await.unwrap();

        let session = app.session().unwrap();
        let expected = TierBoundaries::new(5, 2).unwrap();
        assert_eq!(session.peers().bounds(), &expected);
        assert_eq!(session.ideas().bounds(), &expected);
        assert_eq!(session.peers().tier_of(&ItemId::from_raw("paul")), Tier::Tier1);
    }
}

//! Background writer that batches session saves
//!
//! Edits arrive in bursts; only the last snapshot of a burst is written, once
//! no new edit has arrived for the configured quiet period.

use std::sync::{Arc, Mutex};
use tiermatch_domain::traits::SessionStore;
use tiermatch_domain::SessionState;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

enum SaveMessage {
    Save { user: String, state: SessionState },
    Discard,
    Flush(oneshot::Sender<()>),
}

/// Debounced saver running on its own task
///
/// # Examples
///
/// ```no_run
/// use std::sync::{Arc, Mutex};
/// use tiermatch_cli::saver::DebouncedSaver;
/// use tiermatch_store::SqliteStore;
/// use tokio::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = Arc::new(Mutex::new(SqliteStore::new(":memory:")?));
///     let saver = DebouncedSaver::spawn(store, Duration::from_millis(500));
///     saver.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct DebouncedSaver {
    tx: mpsc::UnboundedSender<SaveMessage>,
    handle: JoinHandle<()>,
}

impl DebouncedSaver {
    /// Start the writer task
    pub fn spawn<S>(store: Arc<Mutex<S>>, quiet_period: Duration) -> Self
    where
        S: SessionStore + Send + 'static,
        S::Error: std::fmt::Display,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(store, quiet_period, rx));
        Self { tx, handle }
    }

    /// Queue a snapshot; replaces any snapshot still waiting
    pub fn schedule(&self, user: &str, state: SessionState) {
        let message = SaveMessage::Save {
            user: user.to_string(),
            state,
        };
        if self.tx.send(message).is_err() {
            tracing::warn!("Saver stopped, edit for {} not persisted", user);
        }
    }

    /// Drop the pending snapshot without writing it
    pub fn discard(&self) {
        self.tx.send(SaveMessage::Discard).ok();
    }

    /// Write the pending snapshot now and wait for it
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(SaveMessage::Flush(ack)).is_ok() {
            done.await.ok();
        }
    }

    /// Flush and stop the writer task
    pub async fn shutdown(self) {
        let Self { tx, handle } = self;
        drop(tx);
        if let Err(e) = handle.await {
            tracing::error!("Saver task failed: {}", e);
        }
    }
}

async fn run<S>(store: Arc<Mutex<S>>, quiet_period: Duration, mut rx: mpsc::UnboundedReceiver<SaveMessage>)
where
    S: SessionStore,
    S::Error: std::fmt::Display,
{
    let mut pending: Option<(String, SessionState)> = None;

    loop {
        let message = if pending.is_some() {
            tokio::select! {
                message = rx.recv() => message,
                _ = sleep(quiet_period) => {
                    write(&store, pending.take());
                    continue;
                }
            }
        } else {
            rx.recv().await
        };

        match message {
            Some(SaveMessage::Save { user, state }) => pending = Some((user, state)),
            Some(SaveMessage::Discard) => pending = None,
            Some(SaveMessage::Flush(ack)) => {
                write(&store, pending.take());
                ack.send(()).ok();
            }
            None => {
                write(&store, pending.take());
                break;
            }
        }
    }
}

fn write<S>(store: &Mutex<S>, pending: Option<(String, SessionState)>)
where
    S: SessionStore,
    S::Error: std::fmt::Display,
{
    let Some((user, state)) = pending else {
        return;
    };
    let mut store = match store.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    match store.save_session(&user, &state) {
        Ok(()) => tracing::debug!("Saved session for {}", user),
        Err(e) => tracing::error!("Failed to save session for {}: {}", user, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiermatch_domain::{ItemId, Rating, RatingOverrides};
    use tiermatch_store::SqliteStore;

    fn state_with(rating: i64) -> SessionState {
        let mut state = SessionState::default();
        state.peers.overrides = RatingOverrides::new().with(ItemId::from_raw("kate"), Rating::new(rating).unwrap());
        state
    }

    fn saved_rating(store: &Arc<Mutex<SqliteStore>>) -> Option<u8> {
        store
            .lock()
            .unwrap()
            .load_session("Alisha")
            .unwrap()
            .and_then(|s| s.peers.overrides.get(&ItemId::from_raw("kate")))
            .map(|r| r.value())
    }

    fn store() -> Arc<Mutex<SqliteStore>> {
        Arc::new(Mutex::new(SqliteStore::new(":memory:").unwrap()))
    }

    #[tokio::test]
    async fn test_burst_writes_last_snapshot_after_quiet_period() {
        let store = store();
        let saver = DebouncedSaver::spawn(store.clone(), Duration::from_millis(50));

        saver.schedule("Alisha", state_with(3));
        saver.schedule("Alisha", state_with(5));
        saver.schedule("Alisha", state_with(7));
        assert_eq!(saved_rating(&store), None);

        sleep(Duration::from_millis(200)).await;
        assert_eq!(saved_rating(&store), Some(7));

        saver.shutdown().await;
    }

    #[tokio::test]
    async fn test_flush_writes_immediately() {
        let store = store();
        let saver = DebouncedSaver::spawn(store.clone(), Duration::from_secs(60));

        saver.schedule("Alisha", state_with(6));
        saver.flush().await;
        assert_eq!(saved_rating(&store), Some(6));

        saver.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_writes_pending() {
        let store = store();
        let saver = DebouncedSaver::spawn(store.clone(), Duration::from_secs(60));

        saver.schedule("Alisha", state_with(2));
        saver.shutdown().await;
        assert_eq!(saved_rating(&store), Some(2));
    }

    #[tokio::test]
    async fn test_discard_drops_pending() {
        let store = store();
        let saver = DebouncedSaver::spawn(store.clone(), Duration::from_secs(60));

        saver.schedule("Alisha", state_with(2));
        saver.discard();
        saver.shutdown().await;
        assert_eq!(saved_rating(&store), None);
    }
}

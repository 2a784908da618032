//! Trait definitions for external interactions
//!
//! The domain never touches storage directly. Infrastructure crates implement
//! these traits and the application layer wires them in.

use crate::matrix::PeerRatingMatrix;
use crate::session::SessionState;

/// Durable key-value persistence for per-user ranking state
///
/// Implemented by the infrastructure layer (tiermatch-store). Saved state is
/// keyed by the lowercased user name, so `"Kate"` and `"kate"` share a record.
pub trait SessionStore {
    /// Error type for store operations
    type Error;

    /// Load a user's saved state, `None` when nothing was saved yet
    fn load_session(&self, user: &str) -> Result<Option<SessionState>, Self::Error>;

    /// Replace a user's saved state
    fn save_session(&mut self, user: &str, state: &SessionState) -> Result<(), Self::Error>;

    /// Delete a user's saved state; deleting nothing is not an error
    fn clear_session(&mut self, user: &str) -> Result<(), Self::Error>;

    /// Last signed-in user, if any
    fn load_identity(&self) -> Result<Option<String>, Self::Error>;

    /// Remember the signed-in user
    fn save_identity(&mut self, user: &str) -> Result<(), Self::Error>;

    /// Last successfully fetched matrix
    fn load_cached_matrix(&self) -> Result<Option<PeerRatingMatrix>, Self::Error>;

    /// Cache a freshly fetched matrix for offline use
    fn save_cached_matrix(&mut self, matrix: &PeerRatingMatrix) -> Result<(), Self::Error>;
}

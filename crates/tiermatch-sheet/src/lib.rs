//! Tiermatch Sheet Layer
//!
//! Supplies the shared rating matrix: fetched live from the published sheet,
//! else the last cached copy, else the snapshot compiled into the binary.
//!
//! # Modules
//!
//! - [`client`]: HTTP fetch with retries
//! - [`csv`]: CSV parsing and header matching
//! - [`cohort`]: built-in ideas, roster, fallback matrix and locked ideas
//!
//! # Examples
//!
//! ```
//! use tiermatch_sheet::{csv::parse_sheet, cohort};
//!
//! let matrix = parse_sheet("Name,WASH\nKate,4\n", &cohort::idea_columns()).unwrap();
//! assert_eq!(matrix.rating("Kate", 9), 4);
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod cohort;
pub mod csv;

use std::fmt;
use thiserror::Error;
use tiermatch_domain::PeerRatingMatrix;
use tracing::{info, warn};

pub use client::SheetClient;

/// Errors that can occur while obtaining the sheet
#[derive(Error, Debug)]
pub enum SheetError {
    /// Network or transport error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Server answered with a non-success status
    #[error("HTTP {0}")]
    Http(u16),

    /// The sheet parsed to zero participants
    #[error("Empty or unparseable sheet")]
    EmptySheet,

    /// Body could not be read
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Where the matrix in use came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixStatus {
    /// Fetched from the sheet just now
    Live,
    /// Last successful fetch, read from the store
    Cached,
    /// Snapshot compiled into the binary
    BuiltIn,
}

impl MatrixStatus {
    /// True when the data did not come from the sheet just now
    pub fn is_fallback(&self) -> bool {
        !matches!(self, MatrixStatus::Live)
    }
}

impl fmt::Display for MatrixStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixStatus::Live => write!(f, "live sheet"),
            MatrixStatus::Cached => write!(f, "cached sheet (offline)"),
            MatrixStatus::BuiltIn => write!(f, "built-in data (offline)"),
        }
    }
}

/// Pick the matrix to use from a fetch result and an optional cached copy
///
/// Falls back live → cached → built-in. Never fails.
pub fn resolve_matrix(
    fetched: Result<PeerRatingMatrix, SheetError>,
    cached: Option<PeerRatingMatrix>,
) -> (PeerRatingMatrix, MatrixStatus) {
    match fetched {
        Ok(matrix) => {
            info!("Loaded {} participants from the sheet", matrix.rows().len());
            (matrix, MatrixStatus::Live)
        }
        Err(e) => match cached.filter(|m| !m.is_empty()) {
            Some(matrix) => {
                warn!("Sheet fetch failed ({}), using cached copy", e);
                (matrix, MatrixStatus::Cached)
            }
            None => {
                warn!("Sheet fetch failed ({}), using built-in data", e);
                (cohort::fallback_matrix(), MatrixStatus::BuiltIn)
            }
        },
    }
}

/// Fetch the sheet and apply [`resolve_matrix`]
///
/// Without a client (offline mode) the fetch counts as failed.
pub async fn load_matrix(
    client: Option<&SheetClient>,
    cached: Option<PeerRatingMatrix>,
) -> (PeerRatingMatrix, MatrixStatus) {
    let fetched = match client {
        Some(client) => client.fetch_matrix(&cohort::idea_columns()).await,
        None => Err(SheetError::Communication("offline".to_string())),
    };
    resolve_matrix(fetched, cached)
}

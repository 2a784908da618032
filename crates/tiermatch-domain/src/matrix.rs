//! Shared rating matrix: every participant's rating of every idea

/// Rating assumed when a participant or an idea column is absent
pub const MISSING_RATING: u8 = 0;

/// One participant's row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRow {
    /// Display name as it appears in the source
    pub name: String,
    /// One rating per idea column, in column order
    pub ratings: Vec<u8>,
}

/// Participant × idea ratings, in canonical idea column order
///
/// Rows keep the order they were read in. Read-only from the engine's point
/// of view; a refresh replaces the whole value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerRatingMatrix {
    idea_columns: Vec<String>,
    rows: Vec<ParticipantRow>,
}

impl PeerRatingMatrix {
    /// Create a matrix with no participants
    pub fn new(idea_columns: Vec<String>) -> Self {
        Self {
            idea_columns,
            rows: Vec::new(),
        }
    }

    /// Add or replace a participant's row
    ///
    /// Short rows are padded with [`MISSING_RATING`], long rows truncated.
    pub fn insert(&mut self, name: impl Into<String>, mut ratings: Vec<u8>) {
        let name = name.into();
        ratings.resize(self.idea_columns.len(), MISSING_RATING);
        match self.rows.iter_mut().find(|row| row.name == name) {
            Some(row) => row.ratings = ratings,
            None => self.rows.push(ParticipantRow { name, ratings }),
        }
    }

    /// Builder-style [`PeerRatingMatrix::insert`]
    pub fn with_row(mut self, name: impl Into<String>, ratings: Vec<u8>) -> Self {
        self.insert(name, ratings);
        self
    }

    /// Idea names, in column order
    pub fn idea_columns(&self) -> &[String] {
        &self.idea_columns
    }

    /// Participant rows, in source order
    pub fn rows(&self) -> &[ParticipantRow] {
        &self.rows
    }

    /// Participant names, in source order
    pub fn participants(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row.name.as_str())
    }

    /// A participant's row, if present
    pub fn row(&self, name: &str) -> Option<&[u8]> {
        self.rows
            .iter()
            .find(|row| row.name == name)
            .map(|row| row.ratings.as_slice())
    }

    /// A participant's rating for the idea at `column`
    ///
    /// Falls back to [`MISSING_RATING`] when the participant or the column is
    /// absent; absence is read as disinterest.
    pub fn rating(&self, name: &str, column: usize) -> u8 {
        self.row(name)
            .and_then(|ratings| ratings.get(column).copied())
            .unwrap_or(MISSING_RATING)
    }

    /// True when no participant rows are present
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

//! Built-in cohort data
//!
//! Used when neither the live sheet nor a cached copy is available, and as the
//! canonical idea column order for parsing.

use tiermatch_domain::{LockedIdea, LockedIdeas, PeerRatingMatrix};

/// Published CSV export of the shared rating sheet
pub const SHEET_CSV_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vRCOJW4YY9aEODWW64_Yrspq8kBsClgkXyqPrnDfzITR_I8hmEYdrBQ3IFoUTV1_IyZNWLRWo0cG0lZ/pub?output=csv";

/// Canonical idea names, in column order
pub const IDEA_NAMES: [&str; 11] = [
    "Air Pollution",
    "Alt Protein Scale-up",
    "Brick Kilns",
    "Cage Free",
    "Diff Learning",
    "Keel Bone",
    "Mass Comms",
    "Salt Advocacy",
    "Supermarket 60:40",
    "WASH",
    "Safe Start",
];

/// Everyone in the cohort, offered as peers when the sheet has no useful rows
pub const ROSTER: [&str; 19] = [
    "Alisha", "Andy", "Anju", "Carlos", "Conor", "Dexter", "Elisa", "Emelie", "Grant", "Jacco", "Jamila",
    "Joseph", "Kate", "Lodewijk", "Paul", "Romain", "Samuel", "Steph", "Veevek",
];

const FALLBACK_RATINGS: [(&str, [u8; 11]); 19] = [
    ("Alisha", [7, 5, 5, 5, 4, 3, 3, 4, 4, 3, 3]),
    ("Andy", [5, 5, 5, 1, 2, 1, 2, 2, 2, 5, 5]),
    ("Anju", [4, 2, 3, 3, 1, 2, 1, 5, 4, 6, 7]),
    ("Carlos", [3, 7, 1, 4, 2, 5, 2, 2, 7, 2, 2]),
    ("Conor", [5, 7, 1, 6, 2, 7, 4, 2, 7, 2, 1]),
    ("Dexter", [7, 7, 5, 1, 7, 1, 1, 2, 7, 4, 5]),
    ("Elisa", [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 7]),
    ("Emelie", [7, 5, 3, 3, 7, 3, 5, 3, 3, 4, 4]),
    ("Grant", [7, 1, 2, 1, 7, 1, 2, 2, 1, 2, 7]),
    ("Jacco", [7, 3, 2, 1, 7, 6, 6, 2, 3, 4, 4]),
    ("Jamila", [1, 1, 1, 4, 7, 1, 4, 7, 1, 1, 4]),
    ("Joseph", [3, 2, 3, 6, 5, 6, 5, 5, 3, 5, 3]),
    ("Kate", [7, 5, 6, 1, 5, 1, 4, 2, 5, 4, 3]),
    ("Lodewijk", [5, 5, 1, 7, 1, 5, 1, 6, 3, 3, 3]),
    ("Paul", [6, 4, 2, 6, 5, 7, 5, 1, 5, 3, 3]),
    ("Romain", [5, 5, 3, 1, 2, 1, 4, 3, 7, 3, 2]),
    ("Samuel", [2, 7, 2, 6, 2, 7, 2, 2, 5, 2, 2]),
    ("Steph", [7, 3, 5, 1, 4, 1, 2, 2, 5, 5, 7]),
    ("Veevek", [3, 7, 3, 5, 4, 6, 4, 1, 7, 3, 3]),
];

/// Canonical idea names as owned strings
pub fn idea_columns() -> Vec<String> {
    IDEA_NAMES.iter().map(|name| name.to_string()).collect()
}

/// Roster as owned strings
pub fn roster() -> Vec<String> {
    ROSTER.iter().map(|name| name.to_string()).collect()
}

/// Matrix snapshot shipped with the binary
pub fn fallback_matrix() -> PeerRatingMatrix {
    FALLBACK_RATINGS
        .iter()
        .fold(PeerRatingMatrix::new(idea_columns()), |matrix, (name, ratings)| {
            matrix.with_row(*name, ratings.to_vec())
        })
}

/// Ideas that already have their founder
pub fn default_locked_ideas() -> Vec<LockedIdea> {
    vec![LockedIdea {
        idea: "Safe Start".to_string(),
        owner: "Elisa".to_string(),
        note: "Elisa is founding this idea. She is the only co-founder match.".to_string(),
    }]
}

/// [`default_locked_ideas`] as a lookup table
pub fn locked_ideas() -> LockedIdeas {
    LockedIdeas::new(default_locked_ideas())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_matrix_covers_roster() {
        let matrix = fallback_matrix();
        assert_eq!(matrix.idea_columns().len(), IDEA_NAMES.len());
        assert_eq!(matrix.participants().collect::<Vec<_>>(), ROSTER.to_vec());
        assert_eq!(matrix.rating("Elisa", 10), 7);
        assert_eq!(matrix.rating("Kate", 2), 6);
    }

    #[test]
    fn test_default_lock() {
        let locked = locked_ideas();
        let safe_start = locked.get("safe start").unwrap();
        assert_eq!(safe_start.owner, "Elisa");
        assert!(locked.get("WASH").is_none());
    }
}

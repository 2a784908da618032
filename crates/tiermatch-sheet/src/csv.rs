//! CSV export parsing
//!
//! The sheet is a participant × idea grid: the first header cell is ignored,
//! the rest are idea names; each following line is a participant name and
//! their ratings. Columns may come in any order and with slightly different
//! spelling, so headers are matched to canonical names after normalization.

use crate::SheetError;
use tiermatch_domain::{PeerRatingMatrix, MAX_RATING, MISSING_RATING};

/// Split one CSV line into trimmed fields
///
/// Commas inside double quotes do not split; `""` inside quotes is a literal
/// quote.
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match (in_quotes, ch) {
            (true, '"') if chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            (true, '"') => in_quotes = false,
            (false, '"') => in_quotes = true,
            (false, ',') => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            (_, c) => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Lowercase and drop everything that is not a letter or digit
///
/// # Examples
///
/// ```
/// use tiermatch_sheet::csv::normalize_header;
///
/// assert_eq!(normalize_header("Supermarket 60:40"), "supermarket6040");
/// ```
pub fn normalize_header(header: &str) -> String {
    header
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Strip a trailing parenthetical such as `" (own org)"`
pub fn clean_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.ends_with(')') {
        if let Some(open) = trimmed.find('(') {
            return trimmed[..open].trim().to_string();
        }
    }
    trimmed.to_string()
}

/// Leading integer of a cell, clamped to the rating range; 0 when there is none
pub fn parse_cell(cell: &str) -> u8 {
    let s = cell.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 || negative {
        return MISSING_RATING;
    }
    // Anything longer than a few digits is far above the scale anyway
    digits[..end]
        .parse::<u32>()
        .map(|n| n.min(MAX_RATING as u32) as u8)
        .unwrap_or(MAX_RATING)
}

/// Parse a CSV export into a matrix ordered by `canonical` idea names
///
/// Sheet columns that match no canonical idea are ignored; canonical ideas
/// missing from the sheet read as 0 for everyone.
pub fn parse_sheet(text: &str, canonical: &[String]) -> Result<PeerRatingMatrix, SheetError> {
    let lines: Vec<&str> = text.split('\n').filter(|l| !l.trim().is_empty()).collect();
    let Some((header, body)) = lines.split_first() else {
        return Err(SheetError::EmptySheet);
    };
    if body.is_empty() {
        return Err(SheetError::EmptySheet);
    }

    let canonical_normed: Vec<String> = canonical.iter().map(|n| normalize_header(n)).collect();
    // For each canonical idea, the sheet column holding it (first match wins)
    let sheet_columns: Vec<String> = split_line(header).into_iter().skip(1).map(|h| normalize_header(&h)).collect();
    let column_of: Vec<Option<usize>> = canonical_normed
        .iter()
        .map(|wanted| sheet_columns.iter().position(|col| col == wanted))
        .collect();

    let mut matrix = PeerRatingMatrix::new(canonical.to_vec());
    for line in body {
        let cells = split_line(line);
        let name = cells.first().map(|c| clean_name(c)).unwrap_or_default();
        if name.is_empty() {
            continue;
        }
        let values: Vec<u8> = cells.iter().skip(1).map(|c| parse_cell(c)).collect();
        let ratings = column_of
            .iter()
            .map(|col| {
                col.and_then(|i| values.get(i).copied())
                    .unwrap_or(MISSING_RATING)
            })
            .collect();
        matrix.insert(name, ratings);
    }

    if matrix.is_empty() {
        return Err(SheetError::EmptySheet);
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical() -> Vec<String> {
        vec!["Air Pollution".into(), "Supermarket 60:40".into(), "WASH".into()]
    }

    #[test]
    fn test_split_line_quotes() {
        assert_eq!(split_line(r#"a, "b,c" ,"say ""hi""""#), vec!["a", "b,c", r#"say "hi""#]);
        assert_eq!(split_line(""), vec![""]);
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("Kate (own org)"), "Kate");
        assert_eq!(clean_name("  Paul "), "Paul");
        assert_eq!(clean_name("(x)"), "");
    }

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell("5"), 5);
        assert_eq!(parse_cell(" 6 stars"), 6);
        assert_eq!(parse_cell("n/a"), 0);
        assert_eq!(parse_cell(""), 0);
        assert_eq!(parse_cell("12"), 7);
        assert_eq!(parse_cell("-3"), 0);
    }

    #[test]
    fn test_reordered_and_renamed_headers() {
        let text = "Name,wash,Supermarket 60-40,Unknown Idea\nKate (own org),4,6,9\nPaul,1,,2\n";
        let matrix = parse_sheet(text, &canonical()).unwrap();

        assert_eq!(matrix.idea_columns(), canonical().as_slice());
        // Air Pollution is missing from the sheet
        assert_eq!(matrix.row("Kate"), Some(&[0, 6, 4][..]));
        assert_eq!(matrix.row("Paul"), Some(&[0, 0, 1][..]));
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let text = "Name,Air Pollution\r\n\r\nKate,7\r\n,5\r\n";
        let matrix = parse_sheet(text, &canonical()).unwrap();
        assert_eq!(matrix.participants().collect::<Vec<_>>(), vec!["Kate"]);
        assert_eq!(matrix.rating("Kate", 0), 7);
    }

    #[test]
    fn test_empty_sheets() {
        assert!(matches!(parse_sheet("", &canonical()), Err(SheetError::EmptySheet)));
        assert!(matches!(parse_sheet("Name,WASH\n", &canonical()), Err(SheetError::EmptySheet)));
        assert!(matches!(parse_sheet("Name,WASH\n,3\n", &canonical()), Err(SheetError::EmptySheet)));
    }
}

//! Column helpers for whitespace-aligned text tables.

use regex::Regex;
use std::sync::LazyLock;

/// Two or more consecutive whitespace characters separate columns; a single
/// space belongs to the cell (multi-word labels).
static COLUMN_GAP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

/// A rule line made only of ASCII hyphens or box-drawing horizontals.
static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[─\-]+$").unwrap());

/// Split a line into its non-empty cells.
pub fn split_columns(line: &str) -> Vec<&str> {
    COLUMN_GAP_RE
        .split(line)
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .collect()
}

pub fn is_separator(line: &str) -> bool {
    SEPARATOR_RE.is_match(line)
}

/// Non-empty, trimmed lines in input order.
pub fn meaningful_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// Join cells with the minimal column gap understood by [`split_columns`].
pub fn join_columns<'a>(cells: impl IntoIterator<Item = &'a str>) -> String {
    cells
        .into_iter()
        .filter(|cell| !cell.is_empty())
        .collect::<Vec<_>>()
        .join("  ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_keeps_single_spaces_inside_cells() {
        assert_eq!(
            split_columns("Frontend                   S3 + CloudFront                        $50"),
            vec!["Frontend", "S3 + CloudFront", "$50"]
        );
        assert_eq!(split_columns("Per user  $4.06"), vec!["Per user", "$4.06"]);
        assert_eq!(split_columns("lonely cell"), vec!["lonely cell"]);
    }

    #[test]
    fn tabs_count_as_column_gaps() {
        assert_eq!(split_columns("API\t\tLambda"), vec!["API", "Lambda"]);
        assert_eq!(split_columns("API \tLambda"), vec!["API", "Lambda"]);
    }

    #[test]
    fn separators_accept_ascii_and_box_drawing_dashes() {
        assert!(is_separator("-----"));
        assert!(is_separator("──────────"));
        assert!(is_separator("-─-─"));
        assert!(!is_separator("--- x ---"));
        assert!(!is_separator(""));
    }

    #[test]
    fn meaningful_lines_trims_and_skips_blanks() {
        let lines: Vec<&str> = meaningful_lines("  a  \r\n\n   \n b\n").collect();
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn join_skips_empty_cells() {
        assert_eq!(join_columns(["Frontend", "", "$50"]), "Frontend  $50");
    }
}

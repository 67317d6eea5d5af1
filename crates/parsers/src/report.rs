//! Parser for the whitespace-aligned cost breakdown reports attached to
//! catalog items.
//!
//! A report looks like:
//!
//! ```text
//! 1,000 Users
//! ─────────────────────────────────────────────
//! Service        Configuration          Cost
//! Frontend       S3 + CloudFront        $50
//! Database       RDS db.t3.medium       $120
//! TOTAL                                 $170
//! Per user                              $0.17
//! ```
//!
//! Parsing is a single forward pass over non-empty lines and never fails:
//! anything that does not fit the dialect is dropped line by line.

use crate::common::{is_separator, join_columns, meaningful_lines, split_columns};
use costscope_core::report::{ParsedReport, ReportRow, Section, SummaryRow};

/// A line containing this marker opens a new section.
pub const SECTION_MARKER: &str = "Users";

/// Tokens that together identify the column header line.
pub const HEADER_TOKENS: [&str; 3] = ["Service", "Configuration", "Cost"];

/// Line prefixes that mark summary rows.
pub const SUMMARY_PREFIXES: [&str; 3] = ["TOTAL", "Per user", "Per call"];

const RENDERED_HEADER: &str = "Service  Configuration  Monthly Cost";

/// How a single trimmed line is interpreted, independent of parser state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    SectionTitle,
    Separator,
    Header,
    Summary(SummaryRow),
    Row(ReportRow),
    /// Not enough column boundaries to mean anything.
    Unrecognized,
}

/// Classify one trimmed line. Checks run in a fixed priority order: a title
/// wins over a separator, which wins over a header, and so on.
pub fn classify_line(line: &str) -> LineKind {
    if line.contains(SECTION_MARKER) {
        return LineKind::SectionTitle;
    }
    if is_separator(line) {
        return LineKind::Separator;
    }
    if HEADER_TOKENS.iter().all(|token| line.contains(token)) {
        return LineKind::Header;
    }

    let cells = split_columns(line);
    if SUMMARY_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) {
        return match cells.as_slice() {
            [label, .., value] => LineKind::Summary(SummaryRow::new(*label, *value)),
            _ => LineKind::Unrecognized,
        };
    }

    match cells.as_slice() {
        [service, cost] => LineKind::Row(ReportRow::new(*service, "", *cost)),
        [service, middle @ .., cost] if !middle.is_empty() => {
            LineKind::Row(ReportRow::new(*service, middle.join(" "), *cost))
        }
        _ => LineKind::Unrecognized,
    }
}

/// Parse a breakdown report into sections.
pub fn parse_report(text: &str) -> ParsedReport {
    let mut sections = Vec::new();
    let mut current: Option<Section> = None;

    for line in meaningful_lines(text) {
        let kind = classify_line(line);
        if kind == LineKind::SectionTitle {
            sections.extend(current.take());
            current = Some(Section::new(line));
            continue;
        }

        let Some(section) = current.as_mut() else {
            if !matches!(kind, LineKind::Separator | LineKind::Header) {
                tracing::trace!("Dropping report line before first section: {line}");
            }
            continue;
        };

        match kind {
            LineKind::Summary(row) => section.summary_rows.push(row),
            LineKind::Row(row) => section.rows.push(row),
            LineKind::Unrecognized => {
                tracing::trace!("Dropping report line without column boundaries: {line}");
            }
            LineKind::SectionTitle | LineKind::Separator | LineKind::Header => {}
        }
    }

    sections.extend(current);
    ParsedReport { sections }
}

/// Serialize a report back into the dialect [`parse_report`] reads.
///
/// For well-formed reports (no cell contains a column gap, the section marker
/// appears only in titles, and no row label starts with a summary prefix),
/// `parse_report(&render_report(r)) == r`.
pub fn render_report(report: &ParsedReport) -> String {
    let mut out = String::new();
    for (idx, section) in report.sections.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(&section.title);
        out.push('\n');
        out.push_str(&"─".repeat(section.title.chars().count().max(3)));
        out.push('\n');
        out.push_str(RENDERED_HEADER);
        out.push('\n');
        for row in &section.rows {
            out.push_str(&join_columns([
                row.service.as_str(),
                row.configuration.as_str(),
                row.cost.as_str(),
            ]));
            out.push('\n');
        }
        for total in &section.summary_rows {
            out.push_str(&join_columns([total.label.as_str(), total.value.as_str()]));
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_TIER_REPORT: &str = "
100 Users
──────────────────────────────────────────────────────────────────────
Service                    Configuration                          Cost
Frontend                   S3 + CloudFront                        $50
Backend API                Lambda  (1M req)   + API Gateway       $120
Database                   RDS db.t3.micro                        $15
TOTAL                                                              $185
Per user                                                           $1.85

1,000 Users
----------------------------------------------------------------------
Service                    Configuration                          Cost
Database                   RDS db.t3.medium                       $60
Support                                                            $25
TOTAL                                                              $4,062
Per user                                                           $4.06
";

    #[test]
    fn empty_input_has_no_sections() {
        assert!(parse_report("").is_empty());
        assert!(parse_report("\n\n   \n").is_empty());
    }

    #[test]
    fn parses_sections_rows_and_summaries() {
        let report = parse_report(TWO_TIER_REPORT);
        assert_eq!(report.sections.len(), 2);

        let first = &report.sections[0];
        assert_eq!(first.title, "100 Users");
        assert_eq!(
            first.rows,
            vec![
                ReportRow::new("Frontend", "S3 + CloudFront", "$50"),
                ReportRow::new("Backend API", "Lambda (1M req) + API Gateway", "$120"),
                ReportRow::new("Database", "RDS db.t3.micro", "$15"),
            ]
        );
        assert_eq!(
            first.summary_rows,
            vec![
                SummaryRow::new("TOTAL", "$185"),
                SummaryRow::new("Per user", "$1.85"),
            ]
        );

        let second = &report.sections[1];
        assert_eq!(second.title, "1,000 Users");
        assert_eq!(second.rows[1], ReportRow::new("Support", "", "$25"));
        assert_eq!(
            second.summary_rows,
            vec![
                SummaryRow::new("TOTAL", "$4,062"),
                SummaryRow::new("Per user", "$4.06"),
            ]
        );
    }

    #[test]
    fn lines_before_first_section_are_dropped() {
        let report = parse_report(
            "Intro  $10\nTOTAL  $10\n─────\n10,000 Users\nCompute  EC2  $900\n",
        );
        assert_eq!(report.sections.len(), 1);
        assert_eq!(
            report.sections[0].rows,
            vec![ReportRow::new("Compute", "EC2", "$900")]
        );
        assert!(report.sections[0].summary_rows.is_empty());
    }

    #[test]
    fn single_column_lines_are_dropped() {
        let report = parse_report("100 Users\nJust a sentence with single spaces\nCDN  $5\n");
        assert_eq!(report.sections[0].rows, vec![ReportRow::new("CDN", "", "$5")]);
    }

    #[test]
    fn summary_keeps_first_and_last_cells() {
        let report = parse_report("100 Users\nPer call   ignored   also ignored   $0.60\nTOTAL\n");
        assert_eq!(
            report.sections[0].summary_rows,
            vec![SummaryRow::new("Per call", "$0.60")]
        );
        assert!(report.sections[0].rows.is_empty());
    }

    #[test]
    fn section_marker_wins_over_other_rules() {
        let report = parse_report("Service  Configuration  Cost for 100 Users\nX  $1\n");
        assert_eq!(report.sections.len(), 1);
        assert_eq!(
            report.sections[0].title,
            "Service  Configuration  Cost for 100 Users"
        );
        assert_eq!(report.sections[0].rows.len(), 1);
    }

    #[test]
    fn section_without_rows_is_still_emitted() {
        let report = parse_report("100 Users\n1,000 Users\nA  $1\n");
        assert_eq!(report.sections.len(), 2);
        assert!(report.sections[0].rows.is_empty());
        assert_eq!(report.sections[1].rows.len(), 1);
    }

    #[test]
    fn classify_line_covers_every_kind() {
        assert_eq!(classify_line("10,000 Users"), LineKind::SectionTitle);
        assert_eq!(classify_line("----"), LineKind::Separator);
        assert_eq!(
            classify_line("Service   Configuration   Monthly Cost"),
            LineKind::Header
        );
        assert_eq!(
            classify_line("TOTAL                $4,062"),
            LineKind::Summary(SummaryRow::new("TOTAL", "$4,062"))
        );
        assert_eq!(
            classify_line("Frontend                   S3 + CloudFront                        $50"),
            LineKind::Row(ReportRow::new("Frontend", "S3 + CloudFront", "$50"))
        );
        assert_eq!(classify_line("orphan"), LineKind::Unrecognized);
        assert_eq!(classify_line("TOTAL $5"), LineKind::Unrecognized);
    }

    #[test]
    fn render_then_parse_is_stable() {
        let report = parse_report(TWO_TIER_REPORT);
        let rendered = render_report(&report);
        assert_eq!(parse_report(&rendered), report);
        assert_eq!(render_report(&parse_report(&rendered)), rendered);
    }
}

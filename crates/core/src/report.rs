use serde::{Deserialize, Serialize};

/// A cost report split into per-tier sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReport {
    pub sections: Vec<Section>,
}

impl ParsedReport {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.sections.iter().map(|s| s.rows.len()).sum()
    }
}

/// One titled table of a report, usually one scale tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    #[serde(default)]
    pub rows: Vec<ReportRow>,
    #[serde(default, rename = "totals")]
    pub summary_rows: Vec<SummaryRow>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
            summary_rows: Vec::new(),
        }
    }
}

/// A table row: service label, free-form configuration detail, and the
/// amount exactly as written in the report (e.g. `"$1,200"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub service: String,
    #[serde(default)]
    pub configuration: String,
    pub cost: String,
}

impl ReportRow {
    pub fn new(
        service: impl Into<String>,
        configuration: impl Into<String>,
        cost: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            configuration: configuration.into(),
            cost: cost.into(),
        }
    }
}

/// A trailing summary line such as `TOTAL` or `Per user`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub label: String,
    pub value: String,
}

impl SummaryRow {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

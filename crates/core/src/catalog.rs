use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Population size at which a line-item is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleTier {
    /// 100 users
    Small,
    /// 1,000 users
    Medium,
    /// 10,000 users
    Large,
}

impl ScaleTier {
    pub const ALL: [ScaleTier; 3] = [ScaleTier::Small, ScaleTier::Medium, ScaleTier::Large];

    pub fn label(self) -> &'static str {
        match self {
            Self::Small => "100 Users",
            Self::Medium => "1,000 Users",
            Self::Large => "10,000 Users",
        }
    }
}

/// Monthly cost of an item at each scale tier. `None` means "no data",
/// which renders differently from zero but sums as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TierCosts {
    #[serde(rename = "cost100", default)]
    pub small: Option<f64>,
    #[serde(rename = "cost1000", default)]
    pub medium: Option<f64>,
    #[serde(rename = "cost10000", default)]
    pub large: Option<f64>,
}

impl TierCosts {
    pub fn get(&self, tier: ScaleTier) -> Option<f64> {
        match tier {
            ScaleTier::Small => self.small,
            ScaleTier::Medium => self.medium,
            ScaleTier::Large => self.large,
        }
    }

    /// Amount used for summation: absent and non-finite values count as zero.
    pub fn summable(&self, tier: ScaleTier) -> f64 {
        self.get(tier).filter(|v| v.is_finite()).unwrap_or(0.0)
    }
}

/// Long-form explanation attached to an item; `breakdown` is the free-text
/// cost report consumed by the report parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemDetails {
    #[serde(default)]
    pub why: String,
    #[serde(default)]
    pub how: String,
    #[serde(rename = "where", default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<String>,
}

/// One row of the cost catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostItem {
    pub id: String,
    #[serde(default)]
    pub app: String,
    #[serde(flatten)]
    pub costs: TierCosts,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ItemDetails>,
}

impl CostItem {
    pub fn new(id: impl Into<String>, costs: TierCosts) -> Self {
        Self {
            id: id.into(),
            app: String::new(),
            costs,
            notes: String::new(),
            details: None,
        }
    }

    /// First line of the display label.
    pub fn title(&self) -> &str {
        self.app.lines().next().unwrap_or_default()
    }

    /// First line of the notes, if any.
    pub fn headline_note(&self) -> Option<&str> {
        self.notes.lines().next().filter(|line| !line.trim().is_empty())
    }

    pub fn report_blob(&self) -> Option<&str> {
        self.details.as_ref().and_then(|d| d.breakdown.as_deref())
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("item at position {0} has an empty id")]
    EmptyId(usize),
    #[error("duplicate item id: {0}")]
    DuplicateId(String),
    #[error("item {id} has a negative {tier:?} amount: {amount}")]
    NegativeAmount {
        id: String,
        tier: ScaleTier,
        amount: f64,
    },
}

/// Ordered, validated sequence of cost items. Order is fixed by the data
/// source and never changes after construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    items: Vec<CostItem>,
}

impl Catalog {
    pub fn new(items: Vec<CostItem>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            if item.id.trim().is_empty() {
                return Err(CatalogError::EmptyId(idx));
            }
            if !seen.insert(item.id.as_str()) {
                return Err(CatalogError::DuplicateId(item.id.clone()));
            }
            for tier in ScaleTier::ALL {
                if let Some(amount) = item.costs.get(tier).filter(|v| *v < 0.0) {
                    return Err(CatalogError::NegativeAmount {
                        id: item.id.clone(),
                        tier,
                        amount,
                    });
                }
            }
        }
        Ok(Self { items })
    }

    /// Parse a JSON array of items.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let items: Vec<CostItem> = serde_json::from_str(json)?;
        Self::new(items)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn items(&self) -> &[CostItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&CostItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

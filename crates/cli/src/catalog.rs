use anyhow::{Context, Result};
use costscope_core::Catalog;
use std::path::Path;

/// Catalog bundled with the binary.
const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

pub fn builtin_catalog() -> Result<Catalog> {
    Catalog::from_json(BUILTIN_CATALOG).context("Built-in catalog is invalid")
}

/// Load the catalog at `path`, or the built-in one.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(path) => {
            let catalog = Catalog::from_path(path)
                .with_context(|| format!("Failed to load catalog from {}", path.display()))?;
            tracing::debug!(items = catalog.len(), "Loaded catalog from {}", path.display());
            Ok(catalog)
        }
        None => builtin_catalog(),
    }
}

//! Ingredient catalog and shopping-list category table.
//!
//! Both are immutable configuration: the built-in copy is embedded from
//! `catalog.toml` at compile time, and an alternative can be loaded from a
//! file at startup. Components receive a `&Catalog` (usually behind an
//! `Arc`) rather than reaching for a global, so tests can pass their own.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::model::Ingredient;

/// Name of the catch-all shopping category. Always listed last.
pub const OTHER_CATEGORY: &str = "Other";

static CATALOG_TOML: &str = include_str!("catalog.toml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("default bucket {0:?} is not defined")]
    UnknownDefaultBucket(String),

    #[error("duplicate bucket for slot {0:?}")]
    DuplicateBucket(String),

    #[error("duplicate category {0:?}")]
    DuplicateCategory(String),

    #[error("category {0:?} is reserved for unmatched items")]
    ReservedCategory(String),
}

/// One slot's ingredient list, in preference order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Bucket {
    pub slot: String,
    pub items: Vec<Ingredient>,
}

/// A shopping-list category and the lowercase keywords that select it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Catalog {
    /// Bucket used when a slot label has no bucket of its own.
    pub default_bucket: String,
    pub buckets: Vec<Bucket>,
    /// Priority order: the first category with a matching keyword wins.
    #[serde(default)]
    pub categories: Vec<CategoryRule>,
}

impl Catalog {
    /// The catalog embedded in the binary.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed. The file ships with the
    /// crate and is covered by a unit test, so a built binary has a valid
    /// copy.
    pub fn builtin() -> Self {
        Self::from_toml_str(CATALOG_TOML).expect("embedded catalog.toml is invalid")
    }

    /// Parse and check a catalog.
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = toml::from_str(content)?;
        catalog.check()?;
        Ok(catalog)
    }

    /// Load a catalog file from disk.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Items for `slot`, or the default bucket's items when the slot has none.
    pub fn bucket(&self, slot: &str) -> &[Ingredient] {
        self.buckets
            .iter()
            .find(|b| b.slot == slot)
            .or_else(|| self.buckets.iter().find(|b| b.slot == self.default_bucket))
            .map_or(&[], |b| b.items.as_slice())
    }

    fn check(&self) -> Result<(), CatalogError> {
        let mut slots = HashSet::new();
        for bucket in &self.buckets {
            if !slots.insert(bucket.slot.as_str()) {
                return Err(CatalogError::DuplicateBucket(bucket.slot.clone()));
            }
        }
        if !slots.contains(self.default_bucket.as_str()) {
            return Err(CatalogError::UnknownDefaultBucket(
                self.default_bucket.clone(),
            ));
        }

        let mut names = HashSet::new();
        for rule in &self.categories {
            if rule.name.eq_ignore_ascii_case(OTHER_CATEGORY) {
                return Err(CatalogError::ReservedCategory(rule.name.clone()));
            }
            if !names.insert(rule.name.as_str()) {
                return Err(CatalogError::DuplicateCategory(rule.name.clone()));
            }
        }
        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_parses() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.default_bucket, "Lunch");
        assert_eq!(catalog.buckets.len(), 5);
        let names: Vec<&str> = catalog.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Protein", "Vegetables", "Carbs", "Dairy", "Pantry"]);
    }

    #[test]
    fn bucket_falls_back_to_default() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.bucket("Dinner")[0].name, "Salmon");
        assert_eq!(catalog.bucket("Second Breakfast"), catalog.bucket("Lunch"));
    }

    #[test]
    fn rejects_unknown_default_bucket() {
        let err = Catalog::from_toml_str(
            r#"
default_bucket = "Brunch"

[[buckets]]
slot = "Lunch"
items = []
"#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownDefaultBucket(ref s) if s == "Brunch"));
    }

    #[test]
    fn rejects_reserved_and_duplicate_categories() {
        let reserved = Catalog::from_toml_str(
            r#"
default_bucket = "Lunch"
buckets = [{ slot = "Lunch", items = [] }]
categories = [{ name = "Other", keywords = ["x"] }]
"#,
        )
        .unwrap_err();
        assert!(matches!(reserved, CatalogError::ReservedCategory(_)));

        let duplicate = Catalog::from_toml_str(
            r#"
default_bucket = "Lunch"
buckets = [{ slot = "Lunch", items = [] }]
categories = [
    { name = "Protein", keywords = ["egg"] },
    { name = "Protein", keywords = ["tofu"] },
]
"#,
        )
        .unwrap_err();
        assert!(matches!(duplicate, CatalogError::DuplicateCategory(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(
            &path,
            r#"
default_bucket = "Any"
buckets = [{ slot = "Any", items = [{ name = "Oats", amount = "50g" }] }]
"#,
        )
        .unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.bucket("Breakfast")[0].name, "Oats");
        assert!(catalog.categories.is_empty());

        let missing = Catalog::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, CatalogError::Io { .. }));
    }
}

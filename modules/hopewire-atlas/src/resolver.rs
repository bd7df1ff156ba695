//! Geographic/category resolver.
//!
//! Maps the codes and names reported by an analysis result onto the persisted
//! taxonomy, creating missing nodes on first reference. Location creation is
//! root-first so a leaf is never committed without its ancestor chain.
//! Creation goes through conditional inserts; concurrent "already exists"
//! races are benign and treated as success.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use hopewire_common::{AnalysisResult, Category, Location};

use crate::m49;

#[async_trait]
pub trait LocationStore: Send + Sync {
    async fn get(&self, code: u32) -> Result<Option<Location>>;

    /// Conditional insert. Ok(true) = inserted, Ok(false) = already existed
    /// (including a lost race, which counts as success).
    async fn create_if_absent(&self, location: &Location) -> Result<bool>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Find-or-create by exact name. Returns the category id either way.
    async fn ensure(&self, category: &Category) -> Result<i32>;
}

/// Confirmed taxonomy links for one analysis result.
#[derive(Debug, Default, PartialEq)]
pub struct Resolution {
    /// Every reported code, in report order — including raw codes the store
    /// and the bundled table both miss ("code present, name absent" is a
    /// valid, displayable state).
    pub location_codes: Vec<u32>,
    /// Subset of `location_codes` with no resolvable name.
    pub unresolved_codes: Vec<u32>,
    pub category_ids: Vec<i32>,
}

pub struct Resolver {
    locations: Arc<dyn LocationStore>,
    categories: Arc<dyn CategoryStore>,
}

impl Resolver {
    pub fn new(locations: Arc<dyn LocationStore>, categories: Arc<dyn CategoryStore>) -> Self {
        Self {
            locations,
            categories,
        }
    }

    pub async fn resolve(&self, result: &AnalysisResult) -> Result<Resolution> {
        let mut resolution = Resolution::default();

        let mut seen_codes = HashSet::new();
        for &code in &result.geo_codes {
            if !seen_codes.insert(code) {
                continue;
            }
            resolution.location_codes.push(code);
            if !self.ensure_location(code).await? {
                warn!(code, "Geographic code unknown to store and M49 table");
                resolution.unresolved_codes.push(code);
            }
        }

        let mut seen_names = HashSet::new();
        for name in &result.categories {
            if !seen_names.insert(name.as_str()) {
                continue;
            }
            let id = self
                .categories
                .ensure(&Category::with_defaults(name))
                .await?;
            resolution.category_ids.push(id);
        }

        Ok(resolution)
    }

    /// Make sure `code` and its full ancestor chain exist.
    /// Returns false when the code cannot be named (raw-link case).
    async fn ensure_location(&self, code: u32) -> Result<bool> {
        if self.locations.get(code).await?.is_some() {
            return Ok(true);
        }

        let Some(chain) = m49::ancestry(code) else {
            return Ok(false);
        };

        // Root first, so the parent invariant holds at every step.
        for entry in chain {
            let created = self
                .locations
                .create_if_absent(&entry.to_location())
                .await?;
            if created {
                debug!(code = entry.code, name = entry.name, "Created location node");
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryCategoryStore, MemoryLocationStore};
    use chrono::Utc;
    use hopewire_common::{EmotionScores, Sentiment, WORLD_CODE};

    fn result_with(geo_codes: Vec<u32>, categories: Vec<&str>) -> AnalysisResult {
        AnalysisResult {
            sentiment: Sentiment::Positive,
            confidence: 0.9,
            emotions: EmotionScores::default(),
            categories: categories.into_iter().map(String::from).collect(),
            geo_codes,
            hopefulness: 0.8,
            config_id: "baseline".to_string(),
            analyzed_at: Utc::now(),
        }
    }

    fn resolver(
        locations: Arc<MemoryLocationStore>,
        categories: Arc<MemoryCategoryStore>,
    ) -> Resolver {
        Resolver::new(locations, categories)
    }

    #[tokio::test]
    async fn country_code_creates_full_ancestor_chain() {
        let locations = Arc::new(MemoryLocationStore::new());
        let categories = Arc::new(MemoryCategoryStore::new());
        let resolution = resolver(locations.clone(), categories)
            .resolve(&result_with(vec![704], vec![]))
            .await
            .unwrap();

        assert_eq!(resolution.location_codes, vec![704]);
        assert!(resolution.unresolved_codes.is_empty());

        // 704 → 35 → 142 → 1, every link present.
        for code in [704, 35, 142, WORLD_CODE] {
            assert!(locations.contains(code), "missing node {code}");
        }
        let leaf = locations.get_sync(704).unwrap();
        assert_eq!(leaf.parent_code, Some(35));
        assert_eq!(locations.get_sync(35).unwrap().parent_code, Some(142));
        assert_eq!(locations.get_sync(142).unwrap().parent_code, Some(WORLD_CODE));
        assert_eq!(locations.get_sync(WORLD_CODE).unwrap().parent_code, None);
    }

    #[tokio::test]
    async fn repeated_resolution_creates_no_duplicate_rows() {
        let locations = Arc::new(MemoryLocationStore::new());
        let categories = Arc::new(MemoryCategoryStore::new());
        let resolver = resolver(locations.clone(), categories.clone());

        resolver
            .resolve(&result_with(vec![704], vec!["health"]))
            .await
            .unwrap();
        resolver
            .resolve(&result_with(vec![704], vec!["health"]))
            .await
            .unwrap();

        assert_eq!(locations.row_count(), 4, "704 + 35 + 142 + world, once each");
        assert_eq!(categories.row_count(), 1);
    }

    #[tokio::test]
    async fn unknown_code_is_kept_raw_with_no_name() {
        let locations = Arc::new(MemoryLocationStore::new());
        let categories = Arc::new(MemoryCategoryStore::new());
        let resolution = resolver(locations.clone(), categories)
            .resolve(&result_with(vec![9999, 392], vec![]))
            .await
            .unwrap();

        // Raw code still linked, in report order.
        assert_eq!(resolution.location_codes, vec![9999, 392]);
        assert_eq!(resolution.unresolved_codes, vec![9999]);
        assert!(!locations.contains(9999));
        assert!(locations.contains(392));
    }

    #[tokio::test]
    async fn categories_are_created_once_with_default_presentation() {
        let locations = Arc::new(MemoryLocationStore::new());
        let categories = Arc::new(MemoryCategoryStore::new());
        let resolver = resolver(locations, categories.clone());

        let first = resolver
            .resolve(&result_with(vec![], vec!["health", "community", "health"]))
            .await
            .unwrap();

        assert_eq!(first.category_ids.len(), 2, "in-result duplicates collapse");
        let stored = categories.get_by_name("health").unwrap();
        assert_eq!(stored.emoji, Category::with_defaults("health").emoji);

        let second = resolver
            .resolve(&result_with(vec![], vec!["health"]))
            .await
            .unwrap();
        assert_eq!(second.category_ids[0], first.category_ids[0], "stable id");
    }

    #[tokio::test]
    async fn known_codes_already_in_store_are_not_recreated() {
        let locations = Arc::new(MemoryLocationStore::new());
        let categories = Arc::new(MemoryCategoryStore::new());
        // Pre-seed the chain.
        for code in [WORLD_CODE, 142, 35, 704] {
            locations.seed(crate::m49::m49_entry(code).unwrap().to_location());
        }
        let inserts_before = locations.insert_attempts();

        resolver(locations.clone(), categories)
            .resolve(&result_with(vec![704], vec![]))
            .await
            .unwrap();

        // Found via get(); no conditional inserts issued at all.
        assert_eq!(locations.insert_attempts(), inserts_before);
    }
}

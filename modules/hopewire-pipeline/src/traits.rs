// Trait abstractions for pipeline store dependencies.
//
// ArticleReader — the read queries the dedup filter and response builder need.
// ArticleWriter — the one batch-write entrypoint.
//
// Both are implemented for PgStore here and mocked in testing.rs, so the
// whole pipeline runs in tests with no network and no database.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use hopewire_atlas::Resolution;
use hopewire_common::{AnalysisResult, Article};
use hopewire_store::PgStore;

#[async_trait]
pub trait ArticleReader: Send + Sync {
    /// Exact canonical-URL dedup probe against the store.
    async fn url_exists(&self, url: &str) -> Result<bool>;

    /// Titles stored within the last `window_days`, for similarity dedup.
    async fn recent_titles(&self, window_days: i64) -> Result<Vec<String>>;

    /// Display names for geographic codes. Unknown codes are absent.
    async fn location_names_by_code(&self, codes: &[u32]) -> Result<HashMap<u32, String>>;
}

#[async_trait]
pub trait ArticleWriter: Send + Sync {
    /// One logical write: article row + taxonomy links + canonical scalars.
    /// Ok(None) means another writer won the URL race (counted as duplicate).
    async fn persist(
        &self,
        article: &Article,
        canonical: Option<&AnalysisResult>,
        resolution: Option<&Resolution>,
    ) -> Result<Option<Uuid>>;
}

#[async_trait]
impl ArticleReader for PgStore {
    async fn url_exists(&self, url: &str) -> Result<bool> {
        Ok(PgStore::url_exists(self, url).await?)
    }

    async fn recent_titles(&self, window_days: i64) -> Result<Vec<String>> {
        Ok(PgStore::recent_titles(self, window_days).await?)
    }

    async fn location_names_by_code(&self, codes: &[u32]) -> Result<HashMap<u32, String>> {
        Ok(PgStore::location_names_by_code(self, codes).await?)
    }
}

#[async_trait]
impl ArticleWriter for PgStore {
    async fn persist(
        &self,
        article: &Article,
        canonical: Option<&AnalysisResult>,
        resolution: Option<&Resolution>,
    ) -> Result<Option<Uuid>> {
        Ok(PgStore::persist_article(self, article, canonical, resolution).await?)
    }
}

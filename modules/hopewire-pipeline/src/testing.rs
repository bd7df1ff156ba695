// Test doubles for the pipeline's store seams.
//
// MockArticleReader answers the dedup probes from in-memory sets.
// MemoryWriter records every persist call and can fail selected URLs.
// MemorySink collects research-log entries instead of posting them.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use uuid::Uuid;

use hopewire_atlas::Resolution;
use hopewire_common::{AnalysisResult, Article};
use hopewire_store::{LogEntry, ResearchSink};

use crate::traits::{ArticleReader, ArticleWriter};

#[derive(Default)]
pub struct MockArticleReader {
    stored_urls: Mutex<HashSet<String>>,
    recent_titles: Mutex<Vec<String>>,
    location_names: Mutex<HashMap<u32, String>>,
}

impl MockArticleReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stored_url(self, url: &str) -> Self {
        self.add_stored_url(url);
        self
    }

    pub fn with_recent_title(self, title: &str) -> Self {
        self.recent_titles.lock().unwrap().push(title.to_string());
        self
    }

    pub fn with_location_name(self, code: u32, name: &str) -> Self {
        self.location_names
            .lock()
            .unwrap()
            .insert(code, name.to_string());
        self
    }

    pub fn add_stored_url(&self, url: &str) {
        self.stored_urls.lock().unwrap().insert(url.to_string());
    }
}

#[async_trait]
impl ArticleReader for MockArticleReader {
    async fn url_exists(&self, url: &str) -> Result<bool> {
        Ok(self.stored_urls.lock().unwrap().contains(url))
    }

    async fn recent_titles(&self, _window_days: i64) -> Result<Vec<String>> {
        Ok(self.recent_titles.lock().unwrap().clone())
    }

    async fn location_names_by_code(&self, codes: &[u32]) -> Result<HashMap<u32, String>> {
        let names = self.location_names.lock().unwrap();
        Ok(codes
            .iter()
            .filter_map(|code| names.get(code).map(|n| (*code, n.clone())))
            .collect())
    }
}

/// One recorded persist call.
#[derive(Debug, Clone)]
pub struct PersistRecord {
    pub url: String,
    pub canonical: Option<AnalysisResult>,
    pub location_codes: Vec<u32>,
    pub category_ids: Vec<i32>,
}

#[derive(Default)]
pub struct MemoryWriter {
    records: Mutex<Vec<PersistRecord>>,
    failing_urls: Mutex<HashSet<String>>,
    duplicate_urls: Mutex<HashSet<String>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `persist` error for this URL.
    pub fn fail_url(&self, url: &str) {
        self.failing_urls.lock().unwrap().insert(url.to_string());
    }

    /// Make `persist` report a lost URL race (Ok(None)) for this URL.
    pub fn duplicate_url(&self, url: &str) {
        self.duplicate_urls.lock().unwrap().insert(url.to_string());
    }

    pub fn persist_calls(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Successful persists, in call order.
    pub fn records(&self) -> Vec<PersistRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArticleWriter for MemoryWriter {
    async fn persist(
        &self,
        article: &Article,
        canonical: Option<&AnalysisResult>,
        resolution: Option<&Resolution>,
    ) -> Result<Option<Uuid>> {
        if self.failing_urls.lock().unwrap().contains(&article.url) {
            return Err(anyhow!("injected write failure for {}", article.url));
        }
        if self.duplicate_urls.lock().unwrap().contains(&article.url) {
            return Ok(None);
        }
        self.records.lock().unwrap().push(PersistRecord {
            url: article.url.clone(),
            canonical: canonical.cloned(),
            location_codes: resolution.map(|r| r.location_codes.clone()).unwrap_or_default(),
            category_ids: resolution.map(|r| r.category_ids.clone()).unwrap_or_default(),
        });
        Ok(Some(Uuid::new_v4()))
    }
}

#[derive(Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResearchSink for MemorySink {
    async fn append(&self, entries: &[LogEntry]) -> usize {
        self.entries.lock().unwrap().extend_from_slice(entries);
        entries.len()
    }
}

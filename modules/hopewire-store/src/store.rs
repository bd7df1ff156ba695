// Postgres persistence for articles and the taxonomy graph.
//
// One PgPool is built at startup and reused for every query; a batch write
// never opens more than one connection at a time, so writes stay serialized
// and lock contention stays low. Taxonomy creation uses conditional inserts
// (ON CONFLICT DO NOTHING) so concurrent first-references are benign races.

use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use hopewire_atlas::{CategoryStore, LocationStore, Resolution};
use hopewire_common::{AnalysisResult, Article, Category, GeoLevel, Location};

use crate::error::Result;

pub struct PgStore {
    pool: PgPool,
}

/// A row from the articles table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredArticle {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub api_source: String,
    pub content: Option<String>,
    pub sentiment: Option<String>,
    pub sentiment_confidence: Option<f32>,
    pub hopefulness: Option<f32>,
    pub emotions: Option<serde_json::Value>,
    pub analyzed: bool,
    pub created_at: DateTime<Utc>,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the embedded SQL migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Exact canonical-URL dedup probe.
    pub async fn url_exists(&self, url: &str) -> Result<bool> {
        let found: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM articles WHERE url = $1)")
                .bind(url)
                .fetch_one(&self.pool)
                .await?;
        Ok(found)
    }

    /// Titles of articles stored within the last `window_days`.
    /// The bounded window keeps the similarity scan cheap.
    pub async fn recent_titles(&self, window_days: i64) -> Result<Vec<String>> {
        let cutoff = Utc::now() - Duration::days(window_days);
        let titles: Vec<String> =
            sqlx::query_scalar("SELECT title FROM articles WHERE created_at >= $1")
                .bind(cutoff)
                .fetch_all(&self.pool)
                .await?;
        Ok(titles)
    }

    /// One logical write: the article row with its canonical analysis scalars,
    /// plus category and location links, in a single transaction.
    ///
    /// Returns None when another writer won the URL race — the caller counts
    /// that as a duplicate, not a failure.
    pub async fn persist_article(
        &self,
        article: &Article,
        canonical: Option<&AnalysisResult>,
        resolution: Option<&Resolution>,
    ) -> Result<Option<Uuid>> {
        let emotions = canonical
            .map(|r| serde_json::to_value(r.emotions).context("Failed to encode emotions"))
            .transpose()?;

        let mut tx = self.pool.begin().await?;

        let id: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO articles
                (title, description, url, author, published_at, api_source, content,
                 sentiment, sentiment_confidence, hopefulness, emotions, analyzed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (url) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(&article.title)
        .bind(&article.description)
        .bind(&article.url)
        .bind(&article.author)
        .bind(article.published_at)
        .bind(&article.api_source)
        .bind(&article.content)
        .bind(canonical.map(|r| r.sentiment.to_string()))
        .bind(canonical.map(|r| r.confidence))
        .bind(canonical.map(|r| r.hopefulness))
        .bind(emotions)
        .bind(canonical.is_some())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(id) = id else {
            tx.rollback().await?;
            return Ok(None);
        };

        if let Some(resolution) = resolution {
            for category_id in &resolution.category_ids {
                sqlx::query(
                    r#"
                    INSERT INTO article_categories (article_id, category_id)
                    VALUES ($1, $2)
                    ON CONFLICT DO NOTHING
                    "#,
                )
                .bind(id)
                .bind(category_id)
                .execute(&mut *tx)
                .await?;
            }

            for code in &resolution.location_codes {
                sqlx::query(
                    r#"
                    INSERT INTO article_locations (article_id, location_code)
                    VALUES ($1, $2)
                    ON CONFLICT DO NOTHING
                    "#,
                )
                .bind(id)
                .bind(*code as i64)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(Some(id))
    }

    /// Display-name lookup for geographic codes. Codes without a row are
    /// simply absent from the map ("code present, name absent").
    pub async fn location_names_by_code(&self, codes: &[u32]) -> Result<HashMap<u32, String>> {
        if codes.is_empty() {
            return Ok(HashMap::new());
        }
        let codes: Vec<i64> = codes.iter().map(|&c| c as i64).collect();
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT code, name FROM locations WHERE code = ANY($1)")
                .bind(&codes)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(c, n)| (c as u32, n)).collect())
    }
}

#[async_trait]
impl LocationStore for PgStore {
    async fn get(&self, code: u32) -> anyhow::Result<Option<Location>> {
        let row: Option<(i64, String, String, Option<i64>, Option<String>, Vec<String>)> =
            sqlx::query_as(
                "SELECT code, name, level, parent_code, emoji, aliases FROM locations WHERE code = $1",
            )
            .bind(code as i64)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(code, name, level, parent_code, emoji, aliases)| Location {
            code: code as u32,
            name,
            level: parse_level(&level),
            parent_code: parent_code.map(|p| p as u32),
            emoji,
            aliases,
        }))
    }

    async fn create_if_absent(&self, location: &Location) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO locations (code, name, level, parent_code, emoji, aliases)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(location.code as i64)
        .bind(&location.name)
        .bind(location.level.to_string())
        .bind(location.parent_code.map(|p| p as i64))
        .bind(&location.emoji)
        .bind(&location.aliases)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CategoryStore for PgStore {
    async fn ensure(&self, category: &Category) -> anyhow::Result<i32> {
        // Conditional insert, then read back: safe under concurrent
        // first-reference either way.
        sqlx::query(
            r#"
            INSERT INTO categories (name, emoji, color)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(&category.name)
        .bind(&category.emoji)
        .bind(&category.color)
        .execute(&self.pool)
        .await?;

        let id: i32 = sqlx::query_scalar("SELECT id FROM categories WHERE name = $1")
            .bind(&category.name)
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }
}

fn parse_level(raw: &str) -> GeoLevel {
    match raw {
        "world" => GeoLevel::World,
        "continent" => GeoLevel::Continent,
        "region" => GeoLevel::Region,
        _ => GeoLevel::Country,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_round_trips_through_text() {
        for level in [
            GeoLevel::World,
            GeoLevel::Continent,
            GeoLevel::Region,
            GeoLevel::Country,
        ] {
            assert_eq!(parse_level(&level.to_string()), level);
        }
    }
}

// Currents API adapter — third-priority provider.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use hopewire_common::Article;

use crate::traits::{FetchParams, NewsProvider, ProviderError};

#[derive(Debug, serde::Deserialize)]
struct CurrentsResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    news: Vec<CurrentsArticle>,
}

#[derive(Debug, serde::Deserialize)]
struct CurrentsArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    author: Option<String>,
    /// Currents formats timestamps as "2026-08-01 12:30:00 +0000".
    #[serde(default)]
    published: Option<String>,
}

pub struct CurrentsProvider {
    api_key: String,
    client: reqwest::Client,
}

impl CurrentsProvider {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    async fn request(&self, params: &FetchParams) -> Result<CurrentsResponse, ProviderError> {
        let resp = self
            .client
            .get("https://api.currentsapi.services/v1/search")
            .query(&[
                ("keywords", params.query()),
                ("language", params.language()),
                ("page_size", &params.clamped_page_size().to_string()),
            ])
            .header("Authorization", &self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        match resp.status().as_u16() {
            401 | 403 => return Err(ProviderError::Auth("Currents rejected the API key".into())),
            429 => return Err(ProviderError::RateLimited),
            _ => {}
        }

        let data: CurrentsResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::BadResponse(e.to_string()))?;

        if data.status != "ok" {
            return Err(ProviderError::BadResponse(format!(
                "Currents status: {}",
                data.status
            )));
        }

        Ok(data)
    }
}

fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M:%S %z")
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[async_trait]
impl NewsProvider for CurrentsProvider {
    fn id(&self) -> &'static str {
        "currents"
    }

    fn priority(&self) -> u8 {
        2
    }

    async fn fetch(&self, params: &FetchParams) -> Result<Vec<Article>, ProviderError> {
        let data = self.request(params).await?;

        let articles: Vec<Article> = data
            .news
            .into_iter()
            .filter(|a| !a.url.is_empty())
            .filter_map(|a| {
                let title = a.title?;
                Some(Article {
                    title,
                    description: a.description.clone(),
                    url: a.url,
                    author: a.author,
                    published_at: a.published.as_deref().and_then(parse_published),
                    api_source: "currents".to_string(),
                    // Currents has no separate content field; the description
                    // doubles as the snippet.
                    content: a.description,
                })
            })
            .collect();

        info!(count = articles.len(), "Currents fetch complete");
        Ok(articles)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let mut params = FetchParams::default();
        params.page_size = 1;
        self.request(&params).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currents_timestamp_format_parses() {
        let dt = parse_published("2026-08-01 12:30:00 +0000").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-08-01T12:30:00+00:00");
    }

    #[test]
    fn malformed_timestamp_is_dropped_not_fatal() {
        assert!(parse_published("yesterday").is_none());
    }
}

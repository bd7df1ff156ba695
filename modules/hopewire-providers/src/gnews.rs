// GNews adapter — second-priority provider.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use hopewire_common::Article;

use crate::traits::{FetchParams, NewsProvider, ProviderError};

#[derive(Debug, serde::Deserialize)]
struct GnewsResponse {
    #[serde(default)]
    articles: Vec<GnewsArticle>,
    #[serde(default)]
    errors: Option<serde_json::Value>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct GnewsArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    source: Option<GnewsSource>,
}

#[derive(Debug, serde::Deserialize)]
struct GnewsSource {
    #[serde(default)]
    name: Option<String>,
}

pub struct GnewsProvider {
    api_key: String,
    client: reqwest::Client,
}

impl GnewsProvider {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    async fn request(&self, params: &FetchParams) -> Result<GnewsResponse, ProviderError> {
        let resp = self
            .client
            .get("https://gnews.io/api/v4/search")
            .query(&[
                ("q", params.query()),
                ("lang", params.language()),
                ("max", &params.clamped_page_size().to_string()),
                ("apikey", &self.api_key),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        match resp.status().as_u16() {
            401 | 403 => return Err(ProviderError::Auth("GNews rejected the API key".into())),
            429 => return Err(ProviderError::RateLimited),
            _ => {}
        }

        let data: GnewsResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::BadResponse(e.to_string()))?;

        if let Some(errors) = &data.errors {
            return Err(ProviderError::BadResponse(errors.to_string()));
        }

        Ok(data)
    }
}

#[async_trait]
impl NewsProvider for GnewsProvider {
    fn id(&self) -> &'static str {
        "gnews"
    }

    fn priority(&self) -> u8 {
        1
    }

    async fn fetch(&self, params: &FetchParams) -> Result<Vec<Article>, ProviderError> {
        let data = self.request(params).await?;

        let articles: Vec<Article> = data
            .articles
            .into_iter()
            .filter(|a| !a.url.is_empty())
            .filter_map(|a| {
                let title = a.title?;
                Some(Article {
                    title,
                    description: a.description,
                    url: a.url,
                    // GNews reports the outlet, not an individual author.
                    author: a.source.and_then(|s| s.name),
                    published_at: a.published_at,
                    api_source: "gnews".to_string(),
                    content: a.content,
                })
            })
            .collect();

        info!(count = articles.len(), "GNews fetch complete");
        Ok(articles)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let mut params = FetchParams::default();
        params.page_size = 1;
        self.request(&params).await.map(|_| ())
    }
}

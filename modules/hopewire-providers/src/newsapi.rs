// NewsAPI.org adapter — highest-priority provider.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use hopewire_common::Article;

use crate::traits::{FetchParams, NewsProvider, ProviderError};

#[derive(Debug, serde::Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    content: Option<String>,
}

pub struct NewsApiProvider {
    api_key: String,
    client: reqwest::Client,
}

impl NewsApiProvider {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    async fn request(&self, params: &FetchParams) -> Result<NewsApiResponse, ProviderError> {
        let resp = self
            .client
            .get("https://newsapi.org/v2/everything")
            .query(&[
                ("q", params.query()),
                ("language", params.language()),
                ("sortBy", "publishedAt"),
                ("pageSize", &params.clamped_page_size().to_string()),
            ])
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        match resp.status().as_u16() {
            401 => return Err(ProviderError::Auth("NewsAPI rejected the API key".into())),
            429 => return Err(ProviderError::RateLimited),
            _ => {}
        }

        let data: NewsApiResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::BadResponse(e.to_string()))?;

        if data.status == "error" {
            let message = data.message.unwrap_or_default();
            return match data.code.as_deref() {
                Some("apiKeyInvalid") | Some("apiKeyExhausted") => Err(ProviderError::Auth(message)),
                Some("rateLimited") => Err(ProviderError::RateLimited),
                _ => Err(ProviderError::BadResponse(message)),
            };
        }

        Ok(data)
    }
}

#[async_trait]
impl NewsProvider for NewsApiProvider {
    fn id(&self) -> &'static str {
        "newsapi"
    }

    fn priority(&self) -> u8 {
        0
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
                    author: a.author,
                    published_at: a.published_at,
                    api_source: "newsapi".to_string(),
                    content: a.content,
                })
            })
            .collect();

        info!(count = articles.len(), "NewsAPI fetch complete");
        Ok(articles)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let mut params = FetchParams::default();
        params.page_size = 1;
        self.request(&params).await.map(|_| ())
    }
}

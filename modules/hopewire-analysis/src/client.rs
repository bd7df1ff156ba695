// Anthropic messages API client with forced tool-use structured output.
// One request scores one chunk of articles under one analysis configuration.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use hopewire_common::{AnalysisResult, Article, EmotionScores, Sentiment};

use crate::configs::AnalysisConfig;
use crate::orchestrator::Analyzer;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_SNIPPET_CHARS: usize = 1_500;

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<WireMessage>,
    system: String,
    temperature: f32,
    tools: Vec<ToolDefinitionWire>,
    tool_choice: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ToolDefinitionWire {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse { input: serde_json::Value },
}

// =============================================================================
// Structured output
// =============================================================================

/// What the model returns for one article.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScoredArticle {
    /// Echo of the article's canonical URL, used to match results back.
    pub url: String,
    /// "positive", "neutral", or "negative"
    pub sentiment: String,
    pub confidence: f32,
    pub hope: f32,
    pub joy: f32,
    pub gratitude: f32,
    pub awe: f32,
    pub compassion: f32,
    pub relief: f32,
    /// 1-3 short topical tags
    #[serde(default)]
    pub categories: Vec<String>,
    /// UN M49 numeric codes for locations the story is about
    #[serde(default)]
    pub geo_codes: Vec<u32>,
    pub hopefulness: f32,
}

/// The full batch response from the model.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BatchAnalysisResponse {
    #[serde(default)]
    pub results: Vec<ScoredArticle>,
}

// =============================================================================
// Analyzer
// =============================================================================

pub struct ClaudeAnalyzer {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
}

impl ClaudeAnalyzer {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: ANTHROPIC_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn extract(&self, config: &AnalysisConfig, user_prompt: String) -> Result<BatchAnalysisResponse> {
        let tool_name = "structured_response";
        let schema = serde_json::to_value(schemars::schema_for!(BatchAnalysisResponse))
            .context("Failed to build analysis schema")?;

        let request = ChatRequest {
            model: config.model.to_string(),
            max_tokens: 8192,
            messages: vec![WireMessage {
                role: "user",
                content: user_prompt,
            }],
            system: config.system_prompt.to_string(),
            temperature: config.temperature,
            tools: vec![ToolDefinitionWire {
                name: tool_name.to_string(),
                description: "Report one scored entry per input article.".to_string(),
                input_schema: schema,
            }],
            tool_choice: serde_json::json!({ "type": "tool", "name": tool_name }),
        };

        let url = format!("{}/messages", self.base_url);
        debug!(model = %request.model, config = config.id, "Claude analysis request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await
            .context("Claude API request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Claude API error ({status}): {error_text}"));
        }

        let response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse Claude response")?;

        for block in response.content {
            if let ContentBlock::ToolUse { input } = block {
                return serde_json::from_value(input)
                    .context("Failed to deserialize structured analysis");
            }
        }

        Err(anyhow!("No structured output in Claude response"))
    }
}

/// Render one chunk of articles into the user prompt.
fn batch_prompt(articles: &[Article]) -> String {
    let mut prompt = String::from("Score every article below.\n");
    for (i, article) in articles.iter().enumerate() {
        let mut snippet = article
            .content
            .as_deref()
            .or(article.description.as_deref())
            .unwrap_or("")
            .to_string();
        if snippet.len() > MAX_SNIPPET_CHARS {
            let mut end = MAX_SNIPPET_CHARS;
            while !snippet.is_char_boundary(end) {
                end -= 1;
            }
            snippet.truncate(end);
        }
        prompt.push_str(&format!(
            "\n## Article {n}\nurl: {url}\ntitle: {title}\ncontent: {snippet}\n",
            n = i + 1,
            url = article.url,
            title = article.title,
        ));
    }
    prompt
}

/// Convert a wire entry into the domain result, clamping scores into bounds.
fn into_result(scored: ScoredArticle, config_id: &str) -> (String, AnalysisResult) {
    let sentiment = match scored.sentiment.as_str() {
        "positive" => Sentiment::Positive,
        "negative" => Sentiment::Negative,
        _ => Sentiment::Neutral,
    };

    let emotions = EmotionScores {
        hope: scored.hope,
        joy: scored.joy,
        gratitude: scored.gratitude,
        awe: scored.awe,
        compassion: scored.compassion,
        relief: scored.relief,
    }
    .clamped();

    let result = AnalysisResult {
        sentiment,
        confidence: scored.confidence.clamp(0.0, 1.0),
        emotions,
        categories: scored
            .categories
            .into_iter()
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect(),
        geo_codes: scored.geo_codes,
        hopefulness: scored.hopefulness.clamp(0.0, 1.0),
        config_id: config_id.to_string(),
        analyzed_at: Utc::now(),
    };

    (scored.url, result)
}

#[async_trait]
impl Analyzer for ClaudeAnalyzer {
    async fn analyze_batch(
        &self,
        articles: &[Article],
        config: &AnalysisConfig,
    ) -> Result<Vec<(String, AnalysisResult)>> {
        if articles.is_empty() {
            return Ok(Vec::new());
        }

        let response = self.extract(config, batch_prompt(articles)).await?;

        if response.results.len() != articles.len() {
            warn!(
                expected = articles.len(),
                returned = response.results.len(),
                config = config.id,
                "Model returned a partial batch"
            );
        }

        Ok(response
            .results
            .into_iter()
            .map(|scored| into_result(scored, config.id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(url: &str) -> ScoredArticle {
        ScoredArticle {
            url: url.to_string(),
            sentiment: "positive".to_string(),
            confidence: 1.3,
            hope: 0.9,
            joy: 0.4,
            gratitude: 0.2,
            awe: 0.1,
            compassion: 0.3,
            relief: -0.5,
            categories: vec![" Health ".to_string(), "".to_string()],
            geo_codes: vec![704],
            hopefulness: 1.7,
        }
    }

    #[test]
    fn wire_scores_are_clamped_and_normalized() {
        let (url, result) = into_result(scored("https://a.example/1"), "baseline");
        assert_eq!(url, "https://a.example/1");
        assert_eq!(result.sentiment, Sentiment::Positive);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.hopefulness, 1.0);
        assert_eq!(result.emotions.relief, 0.0);
        assert_eq!(result.categories, vec!["health"]);
        assert_eq!(result.geo_codes, vec![704]);
        assert_eq!(result.config_id, "baseline");
    }

    #[test]
    fn unknown_sentiment_defaults_to_neutral() {
        let mut entry = scored("https://a.example/2");
        entry.sentiment = "mixed".to_string();
        let (_, result) = into_result(entry, "baseline");
        assert_eq!(result.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn batch_prompt_lists_every_article_url() {
        let articles = vec![
            Article {
                title: "A".into(),
                description: None,
                url: "https://a.example/1".into(),
                author: None,
                published_at: None,
                api_source: "newsapi".into(),
                content: Some("x".repeat(5_000)),
            },
            Article {
                title: "B".into(),
                description: Some("short".into()),
                url: "https://a.example/2".into(),
                author: None,
                published_at: None,
                api_source: "gnews".into(),
                content: None,
            },
        ];
        let prompt = batch_prompt(&articles);
        assert!(prompt.contains("https://a.example/1"));
        assert!(prompt.contains("https://a.example/2"));
        // Long content is truncated into the prompt, not dropped.
        assert!(prompt.len() < 4_000);
    }
}

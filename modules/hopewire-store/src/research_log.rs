// Append-only research log: one row per (article, configuration), every
// configuration's full result, for comparative study across prompt variants.
//
// This sink is best-effort by contract: a failed append is logged and never
// propagated, and it never rolls back the relational write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use hopewire_common::{AnalysisResult, Article};

/// One research-log row.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub url: String,
    pub title: String,
    pub api_source: String,
    pub config_id: String,
    pub sentiment: String,
    pub confidence: f32,
    pub hope: f32,
    pub joy: f32,
    pub gratitude: f32,
    pub awe: f32,
    pub compassion: f32,
    pub relief: f32,
    pub categories: String,
    pub geo_codes: String,
    pub hopefulness: f32,
    pub analyzed_at: DateTime<Utc>,
}

impl LogEntry {
    pub fn from_result(article: &Article, result: &AnalysisResult) -> Self {
        Self {
            url: article.url.clone(),
            title: article.title.clone(),
            api_source: article.api_source.clone(),
            config_id: result.config_id.clone(),
            sentiment: result.sentiment.to_string(),
            confidence: result.confidence,
            hope: result.emotions.hope,
            joy: result.emotions.joy,
            gratitude: result.emotions.gratitude,
            awe: result.emotions.awe,
            compassion: result.emotions.compassion,
            relief: result.emotions.relief,
            categories: result.categories.join(","),
            geo_codes: result
                .geo_codes
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(","),
            hopefulness: result.hopefulness,
            analyzed_at: result.analyzed_at,
        }
    }

    fn to_row(&self) -> Vec<serde_json::Value> {
        use serde_json::json;
        vec![
            json!(self.analyzed_at.to_rfc3339()),
            json!(self.config_id),
            json!(self.url),
            json!(self.title),
            json!(self.api_source),
            json!(self.sentiment),
            json!(self.confidence),
            json!(self.hope),
            json!(self.joy),
            json!(self.gratitude),
            json!(self.awe),
            json!(self.compassion),
            json!(self.relief),
            json!(self.hopefulness),
            json!(self.categories),
            json!(self.geo_codes),
        ]
    }
}

#[async_trait]
pub trait ResearchSink: Send + Sync {
    /// Append entries, returning how many rows actually landed.
    /// Failures are logged, never propagated.
    async fn append(&self, entries: &[LogEntry]) -> usize;
}

/// Google Sheets appender.
pub struct SheetsSink {
    spreadsheet_id: String,
    api_token: String,
    client: reqwest::Client,
}

impl SheetsSink {
    pub fn new(spreadsheet_id: &str, api_token: &str) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.to_string(),
            api_token: api_token.to_string(),
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

#[async_trait]
impl ResearchSink for SheetsSink {
    async fn append(&self, entries: &[LogEntry]) -> usize {
        if entries.is_empty() {
            return 0;
        }

        let values: Vec<Vec<serde_json::Value>> = entries.iter().map(LogEntry::to_row).collect();
        let url = format!(
            "https://sheets.googleapis.com/v4/spreadsheets/{}/values/A1:append?valueInputOption=RAW",
            self.spreadsheet_id
        );

        let result = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&serde_json::json!({ "values": values }))
            .send()
            .await
            .and_then(|r| r.error_for_status());

        match result {
            Ok(_) => {
                debug!(rows = entries.len(), "Research log append ok");
                entries.len()
            }
            Err(e) => {
                // Independent sink: a failed append never rolls back the
                // relational write.
                warn!(rows = entries.len(), error = %e, "Research log append failed");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hopewire_common::{EmotionScores, Sentiment};

    #[test]
    fn log_entry_captures_full_result() {
        let article = Article {
            title: "Wetlands restored".to_string(),
            description: None,
            url: "https://news.example/wetlands".to_string(),
            author: None,
            published_at: None,
            api_source: "gnews".to_string(),
            content: None,
        };
        let result = AnalysisResult {
            sentiment: Sentiment::Positive,
            confidence: 0.8,
            emotions: EmotionScores {
                hope: 0.9,
                ..Default::default()
            },
            categories: vec!["environment".to_string(), "community".to_string()],
            geo_codes: vec![704, 1],
            hopefulness: 0.85,
            config_id: "strict".to_string(),
            analyzed_at: Utc::now(),
        };

        let entry = LogEntry::from_result(&article, &result);
        assert_eq!(entry.config_id, "strict");
        assert_eq!(entry.categories, "environment,community");
        assert_eq!(entry.geo_codes, "704,1");

        let row = entry.to_row();
        assert_eq!(row.len(), 16);
    }
}

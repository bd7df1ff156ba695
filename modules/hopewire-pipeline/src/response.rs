//! Serialized view of a completed aggregation cycle.
//!
//! The response carries the articles that survived dedup, each annotated with
//! its primary analysis (when one was produced) and the resolved names of any
//! geographic codes the model reported. Unresolvable codes are still listed
//! with a null name rather than dropped.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use hopewire_common::{AnalysisResult, Article, EmotionScores, Sentiment};
use hopewire_providers::SourceFailure;

#[derive(Debug, Serialize)]
pub struct AggregateResponse {
    pub total_articles: usize,
    pub sources_used: Vec<String>,
    pub sources_failed: Vec<FailureView>,
    pub articles: Vec<ArticleView>,
}

#[derive(Debug, Serialize)]
pub struct FailureView {
    pub provider: String,
    pub reason: String,
}

impl From<&SourceFailure> for FailureView {
    fn from(failure: &SourceFailure) -> Self {
        Self {
            provider: failure.provider.clone(),
            reason: failure.reason.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArticleView {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    pub api_source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisView>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisView {
    pub config_id: String,
    pub sentiment: Sentiment,
    pub confidence: f32,
    pub emotions: EmotionScores,
    pub hopefulness: f32,
    pub categories: Vec<String>,
    pub locations: Vec<LocationView>,
}

#[derive(Debug, Serialize)]
pub struct LocationView {
    pub code: u32,
    pub name: Option<String>,
}

impl AggregateResponse {
    pub fn build(
        articles: &[Article],
        results: &HashMap<String, Vec<AnalysisResult>>,
        primary_config: &str,
        location_names: &HashMap<u32, String>,
        sources_used: &[String],
        sources_failed: &[SourceFailure],
    ) -> Self {
        let views = articles
            .iter()
            .map(|article| {
                let analysis = results
                    .get(&article.url)
                    .and_then(|per_config| {
                        per_config.iter().find(|r| r.config_id == primary_config)
                    })
                    .map(|result| AnalysisView::build(result, location_names));
                ArticleView {
                    title: article.title.clone(),
                    description: article.description.clone(),
                    url: article.url.clone(),
                    author: article.author.clone(),
                    published_at: article.published_at,
                    api_source: article.api_source.clone(),
                    analysis,
                }
            })
            .collect::<Vec<_>>();

        Self {
            total_articles: views.len(),
            sources_used: sources_used.to_vec(),
            sources_failed: sources_failed.iter().map(FailureView::from).collect(),
            articles: views,
        }
    }
}

impl AnalysisView {
    fn build(result: &AnalysisResult, location_names: &HashMap<u32, String>) -> Self {
        let locations = result
            .geo_codes
            .iter()
            .map(|&code| LocationView {
                code,
                name: location_names.get(&code).cloned(),
            })
            .collect();
        Self {
            config_id: result.config_id.clone(),
            sentiment: result.sentiment,
            confidence: result.confidence,
            emotions: result.emotions,
            hopefulness: result.hopefulness,
            categories: result.categories.clone(),
            locations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hopewire_providers::testing::article_from;

    fn sample_result(config_id: &str, codes: Vec<u32>) -> AnalysisResult {
        AnalysisResult {
            sentiment: Sentiment::Positive,
            confidence: 0.9,
            emotions: EmotionScores {
                hope: 0.8,
                joy: 0.5,
                gratitude: 0.2,
                awe: 0.1,
                compassion: 0.3,
                relief: 0.4,
            },
            categories: vec!["health".to_string()],
            geo_codes: codes,
            hopefulness: 0.85,
            config_id: config_id.to_string(),
            analyzed_at: Utc::now(),
        }
    }

    #[test]
    fn primary_config_analysis_is_attached() {
        let article = article_from("newsapi", "Vaccine rollout succeeds", "https://news.example/a");
        let mut results = HashMap::new();
        results.insert(
            article.url.clone(),
            vec![sample_result("strict", vec![]), sample_result("baseline", vec![704])],
        );
        let mut names = HashMap::new();
        names.insert(704u32, "Viet Nam".to_string());

        let response = AggregateResponse::build(
            std::slice::from_ref(&article),
            &results,
            "baseline",
            &names,
            &["newsapi".to_string()],
            &[],
        );

        assert_eq!(response.total_articles, 1);
        let analysis = response.articles[0].analysis.as_ref().unwrap();
        assert_eq!(analysis.config_id, "baseline");
        assert_eq!(analysis.locations[0].name.as_deref(), Some("Viet Nam"));
    }

    #[test]
    fn unresolved_codes_keep_null_names() {
        let article = article_from("gnews", "Village wins award", "https://news.example/b");
        let mut results = HashMap::new();
        results.insert(article.url.clone(), vec![sample_result("baseline", vec![99999])]);

        let response = AggregateResponse::build(
            std::slice::from_ref(&article),
            &results,
            "baseline",
            &HashMap::new(),
            &[],
            &[],
        );

        let analysis = response.articles[0].analysis.as_ref().unwrap();
        assert_eq!(analysis.locations[0].code, 99999);
        assert!(analysis.locations[0].name.is_none());
    }

    #[test]
    fn unanalyzed_articles_serialize_without_analysis() {
        let article = article_from("currents", "Story left unanalyzed", "https://news.example/c");
        let response = AggregateResponse::build(
            std::slice::from_ref(&article),
            &HashMap::new(),
            "baseline",
            &HashMap::new(),
            &["currents".to_string()],
            &[],
        );

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["articles"][0].get("analysis").is_none());
        assert_eq!(json["total_articles"], 1);
    }
}

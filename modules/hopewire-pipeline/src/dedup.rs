//! Persistence dedup filter — drops articles the store has already seen,
//! before any AI spend.
//!
//! Two probes per candidate: exact canonical-URL match, then title similarity
//! against articles from a bounded recent window (scan cost stays proportional
//! to the window, not the table).

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use hopewire_common::{
    normalize_title, title_similarity, Article, TITLE_SIMILARITY_THRESHOLD,
};

use crate::traits::ArticleReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateReason {
    UrlMatch,
    TitleSimilarity,
}

impl std::fmt::Display for DuplicateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DuplicateReason::UrlMatch => write!(f, "url-match"),
            DuplicateReason::TitleSimilarity => write!(f, "title-similarity"),
        }
    }
}

#[derive(Debug, Default)]
pub struct FilterOutcome {
    /// Candidates the store has not seen, in input order.
    pub fresh: Vec<Article>,
    /// Dropped candidates with their reason codes.
    pub duplicates: Vec<(Article, DuplicateReason)>,
}

pub struct DedupFilter {
    reader: Arc<dyn ArticleReader>,
    window_days: i64,
}

impl DedupFilter {
    pub fn new(reader: Arc<dyn ArticleReader>, window_days: i64) -> Self {
        Self {
            reader,
            window_days,
        }
    }

    pub async fn filter(&self, articles: Vec<Article>) -> Result<FilterOutcome> {
        let recent: Vec<String> = self
            .reader
            .recent_titles(self.window_days)
            .await?
            .iter()
            .map(|t| normalize_title(t))
            .collect();

        let mut outcome = FilterOutcome::default();
        for article in articles {
            if self.reader.url_exists(&article.url).await? {
                debug!(url = article.url, "Duplicate by canonical URL");
                outcome.duplicates.push((article, DuplicateReason::UrlMatch));
                continue;
            }

            let title = normalize_title(&article.title);
            let similar = recent
                .iter()
                .any(|t| title_similarity(t, &title) >= TITLE_SIMILARITY_THRESHOLD);
            if similar {
                debug!(url = article.url, "Duplicate by title similarity");
                outcome
                    .duplicates
                    .push((article, DuplicateReason::TitleSimilarity));
                continue;
            }

            outcome.fresh.push(article);
        }

        if !outcome.duplicates.is_empty() {
            info!(
                fresh = outcome.fresh.len(),
                duplicates = outcome.duplicates.len(),
                window_days = self.window_days,
                "Persistence dedup complete"
            );
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockArticleReader;
    use hopewire_providers::testing::article_from;

    #[tokio::test]
    async fn stored_url_is_flagged_and_dropped() {
        let reader = Arc::new(
            MockArticleReader::new().with_stored_url("https://news.example/seen"),
        );
        let filter = DedupFilter::new(reader, 30);

        let outcome = filter
            .filter(vec![
                article_from("newsapi", "Already seen story", "https://news.example/seen"),
                article_from("newsapi", "Brand new story about solar", "https://news.example/new"),
            ])
            .await
            .unwrap();

        assert_eq!(outcome.fresh.len(), 1);
        assert_eq!(outcome.fresh[0].url, "https://news.example/new");
        assert_eq!(outcome.duplicates.len(), 1);
        assert_eq!(outcome.duplicates[0].1, DuplicateReason::UrlMatch);
    }

    #[tokio::test]
    async fn similar_recent_title_is_flagged() {
        let reader = Arc::new(
            MockArticleReader::new().with_recent_title("Scientists cure rare disease in trial"),
        );
        let filter = DedupFilter::new(reader, 30);

        let outcome = filter
            .filter(vec![article_from(
                "gnews",
                "Scientists cure a rare disease in trial",
                "https://news.example/retold",
            )])
            .await
            .unwrap();

        assert!(outcome.fresh.is_empty());
        assert_eq!(outcome.duplicates[0].1, DuplicateReason::TitleSimilarity);
    }

    #[tokio::test]
    async fn dissimilar_titles_pass_through() {
        let reader = Arc::new(
            MockArticleReader::new().with_recent_title("City opens new bike lanes downtown"),
        );
        let filter = DedupFilter::new(reader, 30);

        let outcome = filter
            .filter(vec![article_from(
                "currents",
                "Volunteers plant ten thousand trees",
                "https://news.example/trees",
            )])
            .await
            .unwrap();

        assert_eq!(outcome.fresh.len(), 1);
        assert!(outcome.duplicates.is_empty());
    }

    #[test]
    fn reason_codes_render_for_summaries() {
        assert_eq!(DuplicateReason::UrlMatch.to_string(), "url-match");
        assert_eq!(
            DuplicateReason::TitleSimilarity.to_string(),
            "title-similarity"
        );
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Articles ---

/// One real-world news item, normalized from whichever provider returned it.
/// Immutable once persisted; analysis/category/location relations are additive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub description: Option<String>,
    /// Canonical URL — the cross-provider and cross-cycle dedup key.
    pub url: String,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    /// Identifier of the provider whose copy was retained.
    pub api_source: String,
    /// Raw content snippet as delivered by the provider.
    pub content: Option<String>,
}

// --- Analysis ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Neutral => write!(f, "neutral"),
            Sentiment::Negative => write!(f, "negative"),
        }
    }
}

/// Fixed set of emotion scores, each bounded to [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionScores {
    pub hope: f32,
    pub joy: f32,
    pub gratitude: f32,
    pub awe: f32,
    pub compassion: f32,
    pub relief: f32,
}

impl EmotionScores {
    /// Clamp every score into [0, 1]. Model output occasionally drifts out of range.
    pub fn clamped(self) -> Self {
        Self {
            hope: self.hope.clamp(0.0, 1.0),
            joy: self.joy.clamp(0.0, 1.0),
            gratitude: self.gratitude.clamp(0.0, 1.0),
            awe: self.awe.clamp(0.0, 1.0),
            compassion: self.compassion.clamp(0.0, 1.0),
            relief: self.relief.clamp(0.0, 1.0),
        }
    }
}

/// Output of one (article, configuration) pair. Ephemeral until the resolver
/// and writer turn it into persisted rows and links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub sentiment: Sentiment,
    pub confidence: f32,
    pub emotions: EmotionScores,
    pub categories: Vec<String>,
    /// UN M49 geographic codes reported by the model.
    pub geo_codes: Vec<u32>,
    pub hopefulness: f32,
    /// Which analysis configuration produced this result.
    pub config_id: String,
    pub analyzed_at: DateTime<Utc>,
}

// --- Taxonomy ---

/// A named topical tag with presentation metadata. Keyed by name,
/// auto-created on first reference, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub emoji: String,
    pub color: String,
}

impl Category {
    /// Default presentation for a category created on first reference.
    pub fn with_defaults(name: &str) -> Self {
        Self {
            name: name.to_string(),
            emoji: "🏷️".to_string(),
            color: "#9ca3af".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoLevel {
    World,
    Continent,
    Region,
    Country,
}

impl std::fmt::Display for GeoLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoLevel::World => write!(f, "world"),
            GeoLevel::Continent => write!(f, "continent"),
            GeoLevel::Region => write!(f, "region"),
            GeoLevel::Country => write!(f, "country"),
        }
    }
}

/// The UN M49 root code ("World"). Every non-root parent chain terminates here.
pub const WORLD_CODE: u32 = 1;

/// A node in the coded geographic hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    /// Standardized numeric code (UN M49).
    pub code: u32,
    pub name: String,
    pub level: GeoLevel,
    pub parent_code: Option<u32>,
    pub emoji: Option<String>,
    pub aliases: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emotion_scores_clamp_into_bounds() {
        let scores = EmotionScores {
            hope: 1.4,
            joy: -0.2,
            gratitude: 0.5,
            awe: 0.0,
            compassion: 1.0,
            relief: 2.0,
        }
        .clamped();
        assert_eq!(scores.hope, 1.0);
        assert_eq!(scores.joy, 0.0);
        assert_eq!(scores.gratitude, 0.5);
        assert_eq!(scores.relief, 1.0);
    }

    #[test]
    fn sentiment_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Sentiment::Positive).unwrap(),
            "\"positive\""
        );
        assert_eq!(Sentiment::Negative.to_string(), "negative");
    }
}

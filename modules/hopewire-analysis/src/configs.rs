/// One named variant of AI analysis parameters. Variants run in parallel so
/// their outputs can be compared in the research log; the first active config
/// is canonical and its scalar fields are promoted onto the article row.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub id: &'static str,
    pub model: &'static str,
    pub system_prompt: &'static str,
    pub temperature: f32,
    pub enabled: bool,
}

const BASELINE_PROMPT: &str = r#"You are a news sentiment and hopefulness analyst.

For EVERY article in the input, produce one scored entry:

- sentiment: "positive", "neutral", or "negative" — the overall emotional valence.
- confidence: 0.0-1.0 — how certain you are about the sentiment label.
- Emotion scores, each 0.0-1.0: hope, joy, gratitude, awe, compassion, relief.
- hopefulness: 0.0-1.0 — how much this story would make a reader feel the world
  is improving. Concrete progress (cures, recoveries, restored ecosystems,
  communities helping each other) scores high; vague optimism scores low.
- categories: 1-3 short topical tags (e.g. "health", "environment", "science",
  "community", "education", "technology").
- geo_codes: UN M49 numeric codes for locations the story is about. Use country
  codes when a country is identifiable, region or continent codes when only a
  broader area is, 1 (World) for genuinely global stories. Empty if no location.

Echo each article's url unchanged so results can be matched back.
Score every article independently. Never skip an article."#;

const STRICT_PROMPT: &str = r#"You are a conservative news hopefulness analyst.

Score EVERY article in the input. Same output fields as a standard scoring run
(sentiment, confidence, emotion scores, hopefulness, categories, geo_codes,
echoed url), but apply strict standards:

- hopefulness above 0.7 requires verified, concrete, already-realized progress.
  Announcements, pledges, and projections cap at 0.5.
- sentiment "positive" requires the main subject of the story to be positive,
  not a silver lining inside bad news.
- confidence reflects evidence in the text, not your prior about the topic.
- categories and geo_codes follow the same conventions as a standard run.

Never skip an article."#;

/// The configurations this build ships. Declaration order matters: the first
/// enabled entry is the primary configuration.
pub fn default_configs() -> Vec<AnalysisConfig> {
    vec![
        AnalysisConfig {
            id: "baseline",
            model: "claude-haiku-4-5-20251001",
            system_prompt: BASELINE_PROMPT,
            temperature: 0.0,
            enabled: true,
        },
        AnalysisConfig {
            id: "strict",
            model: "claude-haiku-4-5-20251001",
            system_prompt: STRICT_PROMPT,
            temperature: 0.0,
            enabled: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_default_config_is_enabled() {
        let configs = default_configs();
        assert!(configs[0].enabled, "primary config must be active");
        assert_eq!(configs[0].id, "baseline");
    }
}

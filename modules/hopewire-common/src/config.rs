use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Postgres
    pub database_url: String,

    // AI analysis
    pub anthropic_api_key: String,

    // Providers — a missing key disables that provider rather than failing startup.
    pub newsapi_key: Option<String>,
    pub gnews_api_key: Option<String>,
    pub currents_api_key: Option<String>,

    // Research log (Google Sheets). Absent = research log disabled.
    pub sheets_spreadsheet_id: Option<String>,
    pub sheets_api_token: Option<String>,

    // Rate ceilings for the AI service.
    pub ai_requests_per_minute: u32,
    pub ai_requests_per_day: u64,

    // Scheduling
    pub fetch_interval_minutes: u64,

    // Persistence dedup scan window.
    pub dedup_window_days: i64,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            anthropic_api_key: required_env("ANTHROPIC_API_KEY"),
            newsapi_key: env::var("NEWSAPI_KEY").ok(),
            gnews_api_key: env::var("GNEWS_API_KEY").ok(),
            currents_api_key: env::var("CURRENTS_API_KEY").ok(),
            sheets_spreadsheet_id: env::var("SHEETS_SPREADSHEET_ID").ok(),
            sheets_api_token: env::var("SHEETS_API_TOKEN").ok(),
            ai_requests_per_minute: parsed_env("AI_REQUESTS_PER_MINUTE", 10),
            ai_requests_per_day: parsed_env("AI_REQUESTS_PER_DAY", 1500),
            fetch_interval_minutes: parsed_env("FETCH_INTERVAL_MINUTES", 180),
            dedup_window_days: parsed_env("DEDUP_WINDOW_DAYS", 30),
        }
    }

    /// Log the active configuration without leaking secrets.
    pub fn log_redacted(&self) {
        tracing::info!(
            newsapi = self.newsapi_key.is_some(),
            gnews = self.gnews_api_key.is_some(),
            currents = self.currents_api_key.is_some(),
            research_log = self.research_log_enabled(),
            rpm = self.ai_requests_per_minute,
            rpd = self.ai_requests_per_day,
            fetch_interval_minutes = self.fetch_interval_minutes,
            dedup_window_days = self.dedup_window_days,
            "Configuration loaded"
        );
    }

    pub fn research_log_enabled(&self) -> bool {
        self.sheets_spreadsheet_id.is_some() && self.sheets_api_token.is_some()
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn parsed_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(v) => v
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a number")),
        Err(_) => default,
    }
}

use thiserror::Error;

/// Pipeline-level error taxonomy. Per-item failures (one provider, one
/// article, one sink write) are collected into run summaries instead of
/// surfacing here; these variants cover the run-level failure modes.
#[derive(Error, Debug)]
pub enum HopewireError {
    #[error("Provider failure: {0}")]
    Provider(String),

    #[error("Analysis failure: {0}")]
    Analysis(String),

    #[error("Geographic resolution gap: code {0} has no known name")]
    GeographicResolutionGap(u32),

    #[error("Storage failure: {0}")]
    Storage(String),

    #[error("Research log sink failure: {0}")]
    Sink(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No usable provider: all configured sources failed")]
    AllProvidersFailed,

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

use thiserror::Error;

/// Request-level failure kinds shared by every crate.
///
/// Crate-local errors (`DbError`, `LlmError`, `AnalyticsError`) convert into
/// one of these so the web layer can pick a status code without knowing
/// where the failure came from. Skippable data problems never reach this
/// type; they are counted and logged by the aggregator instead.
#[derive(Debug, Error)]
pub enum EpidashError {
    /// The caller sent something we cannot act on.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A contract between components was broken (malformed row batch,
    /// unknown variable key at the normaliser).
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// The survey store refused or could not be reached.
    #[error("Data store unavailable: {0}")]
    Unavailable(String),

    /// The language model failed or answered with something unusable.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, EpidashError>;

use thiserror::Error;
use wayfind_providers::ProviderError;

/// Errors that can escape a `resolve` call.
///
/// Adapter failures never appear here; they are collected as strings in
/// `LocationSearchResult::errors`.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The caller's overall budget elapsed before the search finished.
    #[error("location search exceeded its {budget_ms} ms budget")]
    CallerTimeout { budget_ms: u64 },

    #[error("location search was cancelled")]
    Cancelled,

    #[error("invalid search options: {0}")]
    InvalidOptions(String),

    /// Engine construction failed (HTTP client or adapter base URL).
    #[error("provider setup failed: {0}")]
    Setup(#[from] ProviderError),
}

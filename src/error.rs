/// Errors raised while reading history or computing insights.
///
/// Record-level variants carry the commit hash, the field and the raw value so
/// the caller can locate the offending row. `main` converts to `anyhow::Error`.
#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error("malformed {field} on commit {hash}: {raw:?} (expected YYYY-MM-DD HH:MM:SS ±HHMM)")]
    MalformedTimestamp {
        hash: String,
        field: &'static str,
        raw: String,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("git error: {0}")]
    Git(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

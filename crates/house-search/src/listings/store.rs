/// Narrow key-value capability the scoring core depends on.
///
/// Implementations must be safe to share across threads; the batch jobs
/// themselves are sequential.
pub trait ListingStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// All keys starting with `prefix`, sorted ascending.
    fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

/// Error enumeration for store access and record decoding.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store backend error: {0}")]
    Backend(#[from] rusqlite::Error),
    #[error("malformed value at '{key}': {reason}")]
    Malformed { key: String, reason: String },
    #[error("failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn malformed(key: &str, reason: impl ToString) -> Self {
        Self::Malformed {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

use thiserror::Error;

/// Errors that abort a whole toggle run. Per-service failures never surface
/// here; they end up in the report.
#[derive(Error, Debug)]
pub enum ToggleError {
    #[error("{0}")]
    Validation(String),

    #[error("Cluster not found: {0}")]
    NotFound(String),

    #[error("upstream API error: {0:#}")]
    Api(#[from] anyhow::Error),
}

impl ToggleError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(cluster: impl Into<String>) -> Self {
        Self::NotFound(cluster.into())
    }
}

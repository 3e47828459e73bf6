use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with anything other than `200 OK`.
    #[error("{operation} failed: {status} {status_text}")]
    Status {
        operation: &'static str,
        status: u16,
        status_text: String,
    },

    #[error("{operation}: invalid JSON body: {source}")]
    Parse {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// The eagerly fetched lesson counts could not be loaded.
    #[error("lesson counts unavailable: {0}")]
    LessonCounts(#[source] Arc<Error>),
}

impl Error {
    /// HTTP status code, if the error came from a non-200 response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::LessonCounts(inner) => inner.status(),
            _ => None,
        }
    }
}

use std::time::Duration;

use crate::platform::UpstreamError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no request is tracked for post {0}")]
    NotFound(String),

    #[error("\"{0}\" is not a language I know")]
    LanguageUnrecognized(String),

    #[error("stored record for post {id} is malformed: {source}")]
    MalformedRecord {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("site unavailable: {0}")]
    UpstreamUnavailable(#[from] UpstreamError),

    #[error("record for post {0} was changed by someone else")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("gave up after {0:?}")]
    Timeout(Duration),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Errors after which the current cycle can't meaningfully go on.
    #[must_use]
    pub fn is_fatal_for_cycle(&self) -> bool {
        matches!(self, Error::Database(_) | Error::UpstreamUnavailable(_))
    }
}

use thiserror::Error;

/// Errors shared by every crate in the digest pipeline.
///
/// Variants carry rendered messages rather than source errors so that one
/// build outcome can be cloned out to every request waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Upstream returned no stories")]
    EmptyResult,

    #[error("Summarization failed for story {story_id}: {reason}")]
    SummarizationFailed { story_id: u64, reason: String },

    #[error("Digest build failed: {0}")]
    DigestBuildFailed(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn summarization(story_id: u64, reason: impl Into<String>) -> Self {
        Error::SummarizationFailed {
            story_id,
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

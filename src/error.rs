use thiserror::Error;

/// Failures raised while talking to the game or chat APIs.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Torn answers errors with HTTP 200 and an `error` object in the body.
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("chat rejected message: {0}")]
    Chat(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type WatchResult<T> = Result<T, WatchError>;

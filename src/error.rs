//! Error types for the persona pipeline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid Reddit profile URL: {0}")]
    InvalidUrl(String),

    #[error("Reddit rejected the API credentials: {0}")]
    Auth(String),

    #[error("no such Reddit user: u/{0}")]
    NotFound(String),

    #[error("u/{0} has no posts or comments to analyze")]
    EmptyInput(String),

    #[error("Gemini API error: {0}")]
    Upstream(String),

    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

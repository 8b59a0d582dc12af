use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("network error when accessing data service: {0}")]
    Network(#[from] reqwest::Error),
    /// Non 2xx answer, `message` is what the service reported
    #[error("{message}")]
    Service { status: u16, message: String },
    #[error("failed to decode data service response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid data service url: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

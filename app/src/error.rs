use config_env::ConfigFetchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Data(#[from] data_client::Error),
    #[error("{0}")]
    Config(#[from] ConfigFetchError),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("sign in required")]
    LoginRequired,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

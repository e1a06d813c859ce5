use thiserror::Error;

#[derive(Error, Debug)]
pub enum SousChefError {
    #[error("No orders loaded: at least one order is required before analysis")]
    EmptyOrderStore,

    #[error("All model endpoints failed for base URL {base_url}")]
    AllEndpointsFailed { base_url: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SousChefError>;

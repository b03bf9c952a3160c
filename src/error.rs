use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ProvisionError {
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("configuration error: {0}")]
    Figment(#[from] figment::Error),

    #[error("cannot read private key file {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("API error {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("{endpoint} response did not include an id")]
    MissingId { endpoint: &'static str },

    #[error("warehouse '{name}' is not available to the integration; available: {}", available.join(", "))]
    WarehouseNotFound { name: String, available: Vec<String> },
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RackerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, RackerError>;

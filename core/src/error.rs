use thiserror::Error;

#[derive(Error, Debug)]
pub enum RadarError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Entity '{id}' not found in the current generation")]
    UnknownEntity { id: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type RadarResult<T> = Result<T, RadarError>;

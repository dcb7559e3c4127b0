use crate::TargetId;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ZoomError {
    #[error("Element has no parent node; it cannot be wrapped")]
    Detached,

    #[error("No document is available")]
    NoDocument,

    #[error("DOM operation failed: {0}")]
    Dom(String),

    #[error("Invalid zoom options: {0}")]
    InvalidConfig(String),

    #[error("Image failed to load: {0}")]
    ImageLoad(String),

    #[error("Element is already bound as target {0}")]
    AlreadyBound(TargetId),

    #[error("Element is not bound")]
    NotBound,
}

impl From<serde_json::Error> for ZoomError {
    fn from(err: serde_json::Error) -> Self {
        ZoomError::InvalidConfig(err.to_string())
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("store backend error: {0}")]
    Backend(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("upload request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("upload response missing field: {0}")]
    MissingField(String),
}

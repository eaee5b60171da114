use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Passage file {file} is not valid JSON: {source}")]
    Parse {
        file: String,
        source: serde_json::Error,
    },

    #[error("Passage file {0} is not valid UTF-8")]
    Encoding(String),

    #[error("Duplicate passage id: {0}")]
    DuplicateId(String),

    #[error("No passage with id {0}")]
    NotFound(String),

    #[error("The passage catalog is empty")]
    Empty,
}

pub type StoreResult<T> = Result<T, StoreError>;
pub type CatalogResult<T> = Result<T, CatalogError>;

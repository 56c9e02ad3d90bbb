use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Unsupported file type: {0} (expected .csv, .xlsx or .xls)")]
    UnsupportedExtension(String),

    #[error("Failed to decode workbook: {0}")]
    Decode(String),

    #[error("Failed to write export: {0}")]
    Encode(String),

    #[error("Blob not found: {url}")]
    BlobNotFound { url: String },

    #[error("Store lock poisoned")]
    Poisoned,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

use thiserror::Error;

/// Errors that can occur during sheet operations
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Unsupported file extension: {0} (expected xlsx, xlsm or xls)")]
    UnsupportedExtension(String),

    #[error("Failed to decode workbook: {0}")]
    Decode(String),

    #[error("Row index out of bounds: {index} (sheet has {count} rows)")]
    RowIndexOutOfBounds { index: usize, count: usize },

    #[error("Column not found: {name}")]
    ColumnNotFound { name: String },

    #[error("Serialize error: {0}")]
    Serialize(String),
}

pub type Result<T> = std::result::Result<T, SheetError>;

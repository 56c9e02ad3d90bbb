use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("No workbook is active")]
    NoActiveWorkbook,

    #[error("Workbook not found: {id}")]
    WorkbookNotFound { id: String },

    #[error("Sheet not found: {name}")]
    SheetNotFound { name: String },

    #[error("Sheet already exists: {name}")]
    SheetAlreadyExists { name: String },

    #[error(transparent)]
    Sheet(#[from] fieldbook_sheet::SheetError),

    #[error("Persistence error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LibraryError>;

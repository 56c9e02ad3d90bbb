use thiserror::Error;

pub type Result<T> = std::result::Result<T, FormattingError>;

#[derive(Error, Debug)]
pub enum FormattingError {
    #[error("failed to read workbook for style extraction: {0}")]
    Read(String),
}

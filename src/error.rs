//! Error handling for the CV screener

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScreenerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("DOCX extraction error: {0}")]
    DocxExtraction(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Reasoning service error (status {status}): {message}")]
    ReasoningService { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Reasoning service returned empty content")]
    EmptyResponse,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No valid CV documents found in the uploaded files")]
    NoValidDocuments,

    #[error("Could not score any candidates")]
    NoCandidatesScored,

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),

    #[error("Market-rate lookup error: {0}")]
    MarketRate(String),
}

pub type Result<T> = std::result::Result<T, ScreenerError>;

impl From<zip::result::ZipError> for ScreenerError {
    fn from(err: zip::result::ZipError) -> Self {
        ScreenerError::Archive(err.to_string())
    }
}

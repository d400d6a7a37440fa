//! Input processing module
//! Handles file detection, archive expansion and text extraction

pub mod file_detector;
pub mod manager;
pub mod text_extractor;

pub use manager::{ExtractedDocument, InputManager, UploadedBlob};

//! File type detection

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Doc,
    Docx,
    Text,
    Zip,
    Unknown,
}

impl FileType {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => FileType::Pdf,
            "doc" => FileType::Doc,
            "docx" => FileType::Docx,
            "txt" => FileType::Text,
            "zip" => FileType::Zip,
            _ => FileType::Unknown,
        }
    }

    /// Detect from a blob or archive-entry name.
    pub fn from_name(name: &str) -> Self {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(FileType::Unknown)
    }

    /// A CV document that yields text directly (archives excluded).
    pub fn is_document(self) -> bool {
        matches!(self, FileType::Pdf | FileType::Doc | FileType::Docx | FileType::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_is_case_insensitive() {
        assert_eq!(FileType::from_name("CV.PDF"), FileType::Pdf);
        assert_eq!(FileType::from_name("jane.Docx"), FileType::Docx);
        assert_eq!(FileType::from_name("batch.ZIP"), FileType::Zip);
        assert_eq!(FileType::from_name("old.doc"), FileType::Doc);
    }

    #[test]
    fn test_unsupported_names() {
        assert_eq!(FileType::from_name("notes.md"), FileType::Unknown);
        assert_eq!(FileType::from_name("README"), FileType::Unknown);
        assert!(!FileType::Zip.is_document());
        assert!(FileType::Text.is_document());
    }
}

//! Input manager: turns uploaded blobs (and archives of them) into document text

use crate::error::{Result, ScreenerError};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{DocxExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
use log::{debug, info, warn};
use std::io::{Cursor, Read};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

/// A named byte blob as uploaded by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedBlob {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedBlob {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Raw text of one supported document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub name: String,
    pub text: String,
}

pub struct InputManager {
    pdf: PdfExtractor,
    docx: DocxExtractor,
    text: PlainTextExtractor,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            pdf: PdfExtractor,
            docx: DocxExtractor::new(),
            text: PlainTextExtractor,
        }
    }

    /// Read files from disk as blobs. Directories contribute their files, sorted by name.
    pub async fn read_paths(&self, paths: &[PathBuf]) -> Result<Vec<UploadedBlob>> {
        let mut blobs = Vec::new();

        for path in paths {
            if !path.exists() {
                return Err(ScreenerError::InvalidInput(format!(
                    "File does not exist: {}",
                    path.display()
                )));
            }

            if path.is_dir() {
                let mut entries = tokio::fs::read_dir(path).await?;
                let mut files = Vec::new();
                while let Some(entry) = entries.next_entry().await? {
                    if entry.file_type().await?.is_file() {
                        files.push(entry.path());
                    }
                }
                files.sort();
                info!("Reading {} file(s) from {}", files.len(), path.display());
                for file in files {
                    blobs.push(Self::read_blob(&file).await?);
                }
            } else {
                blobs.push(Self::read_blob(path).await?);
            }
        }

        Ok(blobs)
    }

    async fn read_blob(path: &Path) -> Result<UploadedBlob> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(UploadedBlob::new(name, bytes))
    }

    /// Extract every supported document, preserving upload order.
    ///
    /// Archives expand one level in listing order; nested archives, unsupported
    /// names and unreadable documents are skipped. An empty result means no
    /// candidates, not an error.
    pub fn extract_all(&self, blobs: &[UploadedBlob]) -> Vec<ExtractedDocument> {
        info!("Processing {} uploaded file(s)", blobs.len());
        let mut documents = Vec::new();

        for blob in blobs {
            match FileType::from_name(&blob.name) {
                FileType::Zip => {
                    if let Err(e) = self.expand_archive(&blob.name, &blob.bytes, &mut documents) {
                        warn!("Skipping archive {}: {}", blob.name, e);
                    }
                }
                FileType::Unknown => {
                    debug!("Skipping unsupported file: {}", blob.name);
                }
                file_type => {
                    if let Some(document) = self.extract_named(&blob.name, file_type, &blob.bytes) {
                        documents.push(document);
                    }
                }
            }
        }

        info!("Total processed: {} document(s)", documents.len());
        documents
    }

    fn expand_archive(
        &self,
        archive_name: &str,
        bytes: &[u8],
        documents: &mut Vec<ExtractedDocument>,
    ) -> Result<()> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        debug!("Archive {} lists {} entries", archive_name, archive.len());

        for index in 0..archive.len() {
            let mut entry = match archive.by_index(index) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Could not open entry {} in {}: {}", index, archive_name, e);
                    continue;
                }
            };
            if entry.is_dir() {
                continue;
            }

            let entry_name = entry.name().to_string();
            let display_name = Path::new(&entry_name)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| entry_name.clone());

            let file_type = FileType::from_name(&entry_name);
            if file_type == FileType::Zip {
                debug!("Not descending into nested archive {} in {}", entry_name, archive_name);
                continue;
            }
            if !file_type.is_document() {
                debug!("Skipping {} in {}", entry_name, archive_name);
                continue;
            }

            let mut entry_bytes = Vec::new();
            if let Err(e) = entry.read_to_end(&mut entry_bytes) {
                warn!("Could not read {} from {}: {}", entry_name, archive_name, e);
                continue;
            }

            if let Some(document) = self.extract_named(&display_name, file_type, &entry_bytes) {
                documents.push(document);
            }
        }

        Ok(())
    }

    fn extract_named(&self, name: &str, file_type: FileType, bytes: &[u8]) -> Option<ExtractedDocument> {
        guarded_extraction(name, || self.extract_document(file_type, bytes))
    }

    /// Route bytes to the extractor for their type.
    pub fn extract_document(&self, file_type: FileType, bytes: &[u8]) -> Result<String> {
        match file_type {
            FileType::Pdf => self.pdf.extract(bytes),
            // Many .doc uploads are OOXML; legacy binary .doc fails here and is skipped.
            FileType::Docx | FileType::Doc => self.docx.extract(bytes),
            FileType::Text => self.text.extract(bytes),
            FileType::Zip | FileType::Unknown => Err(ScreenerError::UnsupportedFormat(format!(
                "{:?} is not a document type",
                file_type
            ))),
        }
    }
}

/// Run one document's extraction; an error or a parser panic skips only that document.
fn guarded_extraction<F>(name: &str, extract: F) -> Option<ExtractedDocument>
where
    F: FnOnce() -> Result<String>,
{
    match panic::catch_unwind(AssertUnwindSafe(extract)) {
        Ok(Ok(text)) => {
            info!("Extracted {}: {} characters", name, text.chars().count());
            Some(ExtractedDocument {
                name: name.to_string(),
                text,
            })
        }
        Ok(Err(e)) => {
            warn!("Skipping unreadable document {}: {}", name, e);
            None
        }
        Err(_) => {
            warn!("Skipping unreadable document {}: parser panicked", name);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn zip_of(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_unsupported_blobs_are_skipped() {
        let manager = InputManager::new();
        let blobs = vec![
            UploadedBlob::new("photo.png", vec![0x89, 0x50]),
            UploadedBlob::new("jane.TXT", "Jane Doe"),
        ];

        let docs = manager.extract_all(&blobs);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "jane.TXT");
        assert_eq!(docs[0].text, "Jane Doe");
    }

    #[test]
    fn test_archive_contents_follow_archive_position() {
        let manager = InputManager::new();
        let archive = zip_of(&[
            ("cvs/b.txt", &b"Bob"[..]),
            ("cvs/readme.md", &b"ignore me"[..]),
            ("cvs/a.txt", &b"Alice"[..]),
        ]);
        let blobs = vec![
            UploadedBlob::new("first.txt", "First"),
            UploadedBlob::new("batch.zip", archive),
            UploadedBlob::new("last.txt", "Last"),
        ];

        let names: Vec<String> = manager.extract_all(&blobs).into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["first.txt", "b.txt", "a.txt", "last.txt"]);
    }

    #[test]
    fn test_nested_archives_are_not_expanded() {
        let manager = InputManager::new();
        let inner = zip_of(&[("inner.txt", &b"hidden"[..])]);
        let outer = zip_of(&[("inner.zip", &inner[..]), ("top.txt", &b"visible"[..])]);

        let docs = manager.extract_all(&[UploadedBlob::new("outer.zip", outer)]);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "top.txt");
    }

    #[test]
    fn test_corrupt_archive_and_unreadable_docx_yield_nothing() {
        let manager = InputManager::new();
        let blobs = vec![
            UploadedBlob::new("broken.zip", b"PK not really".to_vec()),
            UploadedBlob::new("legacy.doc", b"\xd0\xcf\x11\xe0".to_vec()),
        ];

        assert!(manager.extract_all(&blobs).is_empty());
    }

    #[test]
    fn test_locked_entry_does_not_hide_later_entries() {
        use zip::unstable::write::FileOptionsExt;

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file("a.txt", SimpleFileOptions::default()).unwrap();
        writer.write_all(b"Alice").unwrap();
        writer
            .start_file(
                "locked.txt",
                SimpleFileOptions::default().with_deprecated_encryption(b"secret"),
            )
            .unwrap();
        writer.write_all(b"Hidden").unwrap();
        writer.start_file("c.txt", SimpleFileOptions::default()).unwrap();
        writer.write_all(b"Carol").unwrap();
        let archive = writer.finish().unwrap().into_inner();

        let docs = InputManager::new().extract_all(&[UploadedBlob::new("batch.zip", archive)]);
        let names: Vec<&str> = docs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "c.txt"]);
        assert_eq!(docs[1].text, "Carol");
    }

    #[test]
    fn test_extractor_panic_skips_only_that_document() {
        let crashed = guarded_extraction("broken.pdf", || panic!("malformed xref"));
        assert!(crashed.is_none());

        let failed = guarded_extraction("bad.docx", || {
            Err(ScreenerError::DocxExtraction("missing body".to_string()))
        });
        assert!(failed.is_none());

        let ok = guarded_extraction("ok.txt", || Ok("Jane".to_string())).unwrap();
        assert_eq!(ok.name, "ok.txt");
        assert_eq!(ok.text, "Jane");
    }

    #[tokio::test]
    async fn test_read_paths_expands_directories_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "B").unwrap();
        std::fs::write(dir.path().join("a.txt"), "A").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let manager = InputManager::new();
        let blobs = manager.read_paths(&[dir.path().to_path_buf()]).await.unwrap();

        let names: Vec<&str> = blobs.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[tokio::test]
    async fn test_read_paths_missing_file_is_invalid_input() {
        let manager = InputManager::new();
        let result = manager.read_paths(&[PathBuf::from("does/not/exist.pdf")]).await;
        assert!(matches!(result, Err(ScreenerError::InvalidInput(_))));
    }
}

//! Text extraction from in-memory document bytes

use crate::error::{Result, ScreenerError};
use log::debug;
use regex::{Captures, Regex};
use std::io::{Cursor, Read};

pub trait TextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

/// Page-ordered PDF text: lopdf per page, pdf-extract for whatever lopdf cannot read.
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let document = match lopdf::Document::load_mem(bytes) {
            Ok(document) => document,
            Err(e) => {
                debug!("lopdf could not load PDF ({}), falling back to pdf-extract", e);
                return Self::extract_whole(bytes);
            }
        };

        let text = Self::extract_pages(&document);
        if text.trim().is_empty() {
            // Fonts lopdf cannot decode; pdf-extract may still get text out.
            if let Ok(whole) = Self::extract_whole(bytes) {
                if !whole.trim().is_empty() {
                    return Ok(whole);
                }
            }
        }
        Ok(text)
    }
}

impl PdfExtractor {
    /// Pages without extractable text contribute an empty string.
    fn extract_pages(document: &lopdf::Document) -> String {
        document
            .get_pages()
            .keys()
            .map(|&page_number| {
                document.extract_text(&[page_number]).unwrap_or_else(|e| {
                    debug!("No text on page {}: {}", page_number, e);
                    String::new()
                })
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn extract_whole(bytes: &[u8]) -> Result<String> {
        // pdf-extract panics on some malformed inputs
        match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(ScreenerError::PdfExtraction(e.to_string())),
            Err(_) => Err(ScreenerError::PdfExtraction(
                "PDF parser panicked on malformed input".to_string(),
            )),
        }
    }
}

/// Office Open XML (.docx) body text.
pub struct DocxExtractor {
    tab_stops: Regex,
    paragraph_end: Regex,
    line_break: Regex,
    tab: Regex,
    tag: Regex,
    entity: Regex,
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxExtractor {
    pub fn new() -> Self {
        Self {
            tab_stops: Regex::new(r"(?s)<w:tabs>.*?</w:tabs>").expect("Invalid tab stops regex"),
            paragraph_end: Regex::new(r"</w:p>").expect("Invalid paragraph regex"),
            line_break: Regex::new(r"<w:(?:br|cr)\b[^>]*/>").expect("Invalid line break regex"),
            tab: Regex::new(r"<w:tab\b[^>]*/>").expect("Invalid tab regex"),
            tag: Regex::new(r"<[^>]*>").expect("Invalid tag regex"),
            entity: Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos);")
                .expect("Invalid entity regex"),
        }
    }

    fn xml_to_text(&self, xml: &str) -> String {
        let text = self.tab_stops.replace_all(xml, "");
        let text = self.paragraph_end.replace_all(&text, "\n");
        let text = self.line_break.replace_all(&text, "\n");
        let text = self.tab.replace_all(&text, "\t");
        let text = self.tag.replace_all(&text, "");

        self.entity
            .replace_all(&text, |caps: &Captures| decode_entity(&caps[1]))
            .trim_end()
            .to_string()
    }
}

fn decode_entity(entity: &str) -> String {
    let code_point = if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        None
    };

    if let Some(code_point) = code_point {
        return char::from_u32(code_point)
            .map(String::from)
            .unwrap_or_else(|| char::REPLACEMENT_CHARACTER.to_string());
    }

    match entity {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        _ => "'",
    }
    .to_string()
}

impl TextExtractor for DocxExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
            ScreenerError::DocxExtraction(format!("not an Office Open XML package: {}", e))
        })?;

        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .map_err(|e| ScreenerError::DocxExtraction(format!("missing word/document.xml: {}", e)))?
            .read_to_string(&mut xml)?;

        Ok(self.xml_to_text(&xml))
    }
}

/// UTF-8 text; undecodable bytes become U+FFFD instead of failing.
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let text = String::from_utf8_lossy(bytes);
        Ok(text.strip_prefix('\u{feff}').unwrap_or(&text).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn docx_bytes(document_xml: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("[Content_Types].xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<Types/>").unwrap();
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_docx_paragraphs_and_entities() {
        let xml = r#"<w:document><w:body>
<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>Jane Doe</w:t></w:r></w:p>
<w:p><w:r><w:t>R&amp;D Engineer</w:t><w:tab/><w:t>2021</w:t></w:r></w:p>
<w:p><w:r><w:t>Line one</w:t><w:br/><w:t>&#233;t&#xE9;</w:t></w:r></w:p>
</w:body></w:document>"#;

        let text = DocxExtractor::new().extract(&docx_bytes(xml)).unwrap();

        assert!(text.contains("Jane Doe\n"));
        assert!(text.contains("R&D Engineer\t2021"));
        assert!(text.contains("Line one\nété"));
        assert!(!text.contains('<'));
    }

    #[test]
    fn test_docx_rejects_non_zip_bytes() {
        let err = DocxExtractor::new().extract(b"\xd0\xcf\x11\xe0legacy").unwrap_err();
        assert!(matches!(err, ScreenerError::DocxExtraction(_)));
    }

    #[test]
    fn test_plain_text_is_lossy_and_drops_bom() {
        let bytes = b"\xef\xbb\xbfJane \xff Doe";
        let text = PlainTextExtractor.extract(bytes).unwrap();
        assert_eq!(text, "Jane \u{fffd} Doe");
    }

    /// One page per entry; `None` is a page with no text operators.
    fn pdf_bytes(pages: &[Option<&str>]) -> Vec<u8> {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Document, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for page in pages {
            let operations = match page {
                Some(line) => vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*line)]),
                    Operation::new("ET", vec![]),
                ],
                None => vec![],
            };
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => kids.len() as i64,
                "Kids" => kids,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_blank_pdf_pages_keep_their_place() {
        let bytes = pdf_bytes(&[None, Some("Hello"), None, Some("World")]);
        let text = PdfExtractor.extract(&bytes).unwrap();

        assert_eq!(text, "\nHello\n\n\nWorld\n");
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "Hello");
        assert_eq!(lines[4], "World");
    }

    #[test]
    fn test_garbage_pdf_is_an_error() {
        let result = PdfExtractor.extract(b"definitely not a pdf");
        assert!(matches!(result, Err(ScreenerError::PdfExtraction(_))));
    }
}

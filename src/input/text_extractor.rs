//! Text extraction from resume file formats

use crate::error::{JobAppError, Result};
use regex::Regex;
use std::io::{Cursor, Read};

/// Produces plain text from the raw bytes of a document.
pub trait TextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String>;

    fn name(&self) -> &'static str;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        // pdf-extract panics on some malformed font tables
        let outcome = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));

        let text = match outcome {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                return Err(JobAppError::Extraction(format!("Failed to read PDF: {}", e)));
            }
            Err(_) => {
                return Err(JobAppError::Extraction(
                    "PDF parser aborted on malformed content".to_string(),
                ));
            }
        };

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(JobAppError::Extraction(
                "PDF contains no selectable text (scanned or image-only?)".to_string(),
            ));
        }
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "pdf"
    }
}

/// Reads the body text out of `word/document.xml` inside a DOCX container.
pub struct DocxExtractor {
    ignored_regex: Regex,
    break_regex: Regex,
    tab_regex: Regex,
    tag_regex: Regex,
    blank_lines_regex: Regex,
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxExtractor {
    pub fn new() -> Self {
        Self {
            ignored_regex: Regex::new(r"(?s)<w:tabs>.*?</w:tabs>|<w:instrText[^>]*>.*?</w:instrText>")
                .expect("Invalid ignored-element regex"),
            break_regex: Regex::new(r"<w:(?:br|cr)\b[^>]*/>|</w:p>")
                .expect("Invalid break regex"),
            tab_regex: Regex::new(r"<w:tab\b[^>]*/>").expect("Invalid tab regex"),
            tag_regex: Regex::new(r"<[^>]*>").expect("Invalid tag regex"),
            blank_lines_regex: Regex::new(r"\n{3,}").expect("Invalid blank line regex"),
        }
    }

    fn xml_to_text(&self, xml: &str) -> String {
        let text = self.ignored_regex.replace_all(xml, "");
        let text = self.break_regex.replace_all(&text, "\n");
        let text = self.tab_regex.replace_all(&text, "\t");
        let text = self.tag_regex.replace_all(&text, "");

        let decoded = text
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&#39;", "'")
            .replace("&amp;", "&");

        let lines: Vec<&str> = decoded.lines().map(|line| line.trim_end()).collect();
        self.blank_lines_regex
            .replace_all(&lines.join("\n"), "\n\n")
            .trim()
            .to_string()
    }
}

impl TextExtractor for DocxExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        let mut document = archive.by_name("word/document.xml").map_err(|_| {
            JobAppError::Extraction("DOCX container has no word/document.xml".to_string())
        })?;

        let mut xml = String::new();
        document.read_to_string(&mut xml).map_err(|e| {
            JobAppError::Extraction(format!("Failed to read DOCX body: {}", e))
        })?;

        let text = self.xml_to_text(&xml);
        if text.is_empty() {
            return Err(JobAppError::Extraction("DOCX document contains no text".to_string()));
        }
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "docx"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docx_xml_to_text() {
        let xml = r#"<w:document><w:body>
<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>Jane Doe</w:t></w:r></w:p>
<w:p><w:r><w:t xml:space="preserve">Rust </w:t></w:r><w:r><w:t>&amp; Go</w:t><w:tab/><w:t>2021</w:t></w:r></w:p>
</w:body></w:document>"#;

        let text = DocxExtractor::new().xml_to_text(xml);

        assert!(text.starts_with("Jane Doe"));
        assert!(text.contains("Rust & Go\t2021"));
        assert!(!text.contains("<w:"));
    }

    #[test]
    fn test_pdf_rejects_non_pdf_bytes() {
        let png_header = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];
        let err = PdfExtractor.extract(&png_header).unwrap_err();
        assert!(matches!(err, JobAppError::Extraction(_)));
    }

    #[test]
    fn test_docx_rejects_non_zip_bytes() {
        let err = DocxExtractor::new().extract(b"plain text, not a zip").unwrap_err();
        assert!(matches!(err, JobAppError::Extraction(_)));
    }
}

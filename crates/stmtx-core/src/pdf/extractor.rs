//! PDF text extraction using lopdf and pdf-extract.

use std::panic::{self, AssertUnwindSafe};

use lopdf::Document;
use tracing::{debug, warn};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// PDF text extractor.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    try_empty_password: bool,
}

/// Text from a single PDF page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfPage {
    /// Page number (1-indexed).
    pub number: u32,
    /// Extracted text from this page.
    pub text: String,
}

impl PdfPage {
    /// Page text split into lines. Empty for pages without text.
    pub fn lines(&self) -> Vec<String> {
        self.text.lines().map(str::to_string).collect()
    }
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            try_empty_password: true,
        }
    }

    /// Whether to try an empty password on encrypted documents.
    pub fn with_empty_password(mut self, enabled: bool) -> Self {
        self.try_empty_password = enabled;
        self
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))
    }

    /// Per-page text through pdf-extract. A panic inside the library is
    /// turned into an error.
    fn extract_pages_pdf_extract(&self) -> Result<Vec<String>> {
        let raw_data = &self.raw_data;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(raw_data)
        }));

        match outcome {
            Ok(Ok(texts)) => Ok(texts),
            Ok(Err(e)) => Err(PdfError::TextExtraction(e.to_string())),
            Err(payload) => Err(PdfError::TextExtraction(panic_message(&*payload))),
        }
    }

    /// Per-page text through lopdf, used when pdf-extract gives up.
    fn extract_pages_lopdf(&self) -> Result<Vec<PdfPage>> {
        let doc = self.document()?;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            doc.get_pages()
                .keys()
                .map(|&number| {
                    let text = doc.extract_text(&[number]).unwrap_or_else(|e| {
                        debug!("No text on page {}: {}", number, e);
                        String::new()
                    });
                    PdfPage { number, text }
                })
                .collect::<Vec<_>>()
        }));

        outcome.map_err(|payload| PdfError::TextExtraction(panic_message(&*payload)))
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if !self.try_empty_password || doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // Save decrypted document to raw_data for pdf_extract
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_pages(&self) -> Result<Vec<PdfPage>> {
        self.document()?;
        match self.extract_pages_pdf_extract() {
            Ok(texts) => Ok(texts
                .into_iter()
                .zip(1u32..)
                .map(|(text, number)| PdfPage { number, text })
                .collect()),
            Err(e) => {
                warn!("pdf-extract failed ({}), falling back to lopdf text extraction", e);
                self.extract_pages_lopdf()
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("text extraction panicked: {}", message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// One-page PDF whose font names an encoding no extractor knows.
    fn unknown_encoding_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "BogusEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal("Saldo z przeniesienia 1,00")]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut data = Vec::new();
        doc.save_to(&mut data).unwrap();
        data
    }

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
        assert!(matches!(extractor.extract_pages(), Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_load_rejects_garbage() {
        let mut extractor = PdfExtractor::new();
        assert!(matches!(
            extractor.load(b"this is not a pdf"),
            Err(PdfError::Parse(_))
        ));
    }

    #[test]
    fn test_unknown_encoding_does_not_panic() {
        let mut extractor = PdfExtractor::new();
        extractor.load(&unknown_encoding_pdf()).unwrap();
        assert_eq!(extractor.page_count(), 1);

        match extractor.extract_pages() {
            Ok(pages) => assert_eq!(pages.len(), 1),
            Err(e) => assert!(matches!(e, PdfError::TextExtraction(_))),
        }
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(&"boom"), "text extraction panicked: boom");
        assert_eq!(
            panic_message(&String::from("unexpected encoding")),
            "text extraction panicked: unexpected encoding"
        );
        assert_eq!(panic_message(&42u8), "text extraction panicked: unknown panic");
    }

    #[test]
    fn test_page_lines() {
        let page = PdfPage {
            number: 1,
            text: "Saldo z przeniesienia 5 000,00\n\nStrona 1".to_string(),
        };
        assert_eq!(page.lines(), vec!["Saldo z przeniesienia 5 000,00", "", "Strona 1"]);
        assert!(PdfPage { number: 2, text: String::new() }.lines().is_empty());
    }
}

use lopdf::Document;

use super::{BackendError, BackendResult, PdfBackend, PdfText};

/// Dedicated PDF fallback built on `lopdf`.
///
/// Walks the page tree, so the page count it reports is real.
pub struct LopdfBackend;

impl LopdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LopdfBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfBackend for LopdfBackend {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn extract(&self, bytes: &[u8]) -> BackendResult<PdfText> {
        let doc = Document::load_mem(bytes).map_err(|e| BackendError::parse("pdf", e))?;

        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        tracing::debug!(pages = page_numbers.len(), "PDF page tree loaded");

        let mut pages = Vec::with_capacity(page_numbers.len());
        for number in &page_numbers {
            match doc.extract_text(&[*number]) {
                Ok(text) => pages.push(text),
                Err(e) => {
                    // One unreadable page should not sink the rest of the document.
                    tracing::warn!(page = number, error = %e, "Skipping page without extractable text");
                }
            }
        }

        if !page_numbers.is_empty() && pages.is_empty() {
            return Err(BackendError::parse("pdf", "no page yielded text"));
        }

        Ok(PdfText {
            text: pages.join("\n"),
            page_count: page_numbers.len() as u32,
        })
    }
}

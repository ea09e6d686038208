//! Extraction dispatcher.
//!
//! Every upload gets one attempt on the generic backend and, if that fails,
//! exactly one format-specific fallback. Attempts never overlap.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{DocumentMetadata, ExtractionResult, UploadedDocument};
use crate::services::backends::{
    BackendError, BackendResult, DocumentBackend, DocxRawTextBackend, LopdfBackend,
    OfficeBackend, PdfBackend, WordBackend,
};
use crate::services::media_type::{self, ResolvedType, TypeSource};
use crate::services::normalizer;

/// Characters assumed per page when estimating a PDF page count.
const HEURISTIC_CHARS_PER_PAGE: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractorOptions {
    /// Run each parser attempt on the tokio blocking pool instead of inline.
    pub parse_on_blocking_pool: bool,
    /// Upper bound for a single decompressed entry of an office archive.
    pub max_archive_entry_bytes: u64,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            parse_on_blocking_pool: true,
            max_archive_entry_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Terminal extraction failures. Primary failures never surface on their own.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Unsupported file type: {file_type} (file: {file_name})")]
    UnsupportedType {
        file_type: String,
        file_name: String,
        primary: String,
    },

    #[error("Failed to parse document with any available method")]
    AllMethodsFailed {
        file_type: String,
        file_name: String,
        primary: String,
        fallback: String,
    },
}

impl ExtractionError {
    /// Both attempts' failure messages, for a human to diagnose.
    pub fn details(&self) -> String {
        match self {
            ExtractionError::UnsupportedType {
                file_type, primary, ..
            } => format!(
                "Primary error: {}. Fallback error: Unsupported file type: {}",
                primary, file_type
            ),
            ExtractionError::AllMethodsFailed {
                primary, fallback, ..
            } => format!("Primary error: {}. Fallback error: {}", primary, fallback),
        }
    }

    pub fn file_type(&self) -> &str {
        match self {
            ExtractionError::UnsupportedType { file_type, .. }
            | ExtractionError::AllMethodsFailed { file_type, .. } => file_type,
        }
    }

    pub fn file_name(&self) -> &str {
        match self {
            ExtractionError::UnsupportedType { file_name, .. }
            | ExtractionError::AllMethodsFailed { file_name, .. } => file_name,
        }
    }
}

/// Strategy used once the generic backend has failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackStrategy {
    Pdf,
    Word,
    PlainText,
    LastResort,
}

impl FallbackStrategy {
    pub fn for_type(resolved: &ResolvedType) -> Self {
        match resolved.mime.as_str() {
            media_type::MIME_PDF => FallbackStrategy::Pdf,
            media_type::MIME_DOC | media_type::MIME_DOCX => FallbackStrategy::Word,
            // A text/plain guess made for an unknown extension gets no free pass.
            media_type::MIME_TEXT | media_type::MIME_RTF
                if resolved.source != TypeSource::Default =>
            {
                FallbackStrategy::PlainText
            }
            _ => FallbackStrategy::LastResort,
        }
    }
}

/// Raw text plus whatever page count the winning attempt produced.
#[derive(Debug)]
struct Extracted {
    text: String,
    page_count: Option<u32>,
}

enum FallbackFailure {
    Unsupported,
    Backend(BackendError),
}

pub struct DocumentExtractor {
    options: ExtractorOptions,
    primary: Arc<dyn DocumentBackend>,
    pdf: Arc<dyn PdfBackend>,
    word: Arc<dyn WordBackend>,
}

impl DocumentExtractor {
    /// Extractor wired to the bundled backends.
    pub fn new(options: ExtractorOptions) -> Self {
        Self::with_backends(
            options,
            Arc::new(OfficeBackend::new(options.max_archive_entry_bytes)),
            Arc::new(LopdfBackend::new()),
            Arc::new(DocxRawTextBackend::new()),
        )
    }

    pub fn with_backends(
        options: ExtractorOptions,
        primary: Arc<dyn DocumentBackend>,
        pdf: Arc<dyn PdfBackend>,
        word: Arc<dyn WordBackend>,
    ) -> Self {
        Self {
            options,
            primary,
            pdf,
            word,
        }
    }

    pub fn options(&self) -> ExtractorOptions {
        self.options
    }

    /// Names of the primary, PDF and Word backends, in that order.
    pub fn backend_names(&self) -> [&'static str; 3] {
        [self.primary.name(), self.pdf.name(), self.word.name()]
    }

    pub async fn extract(&self, doc: UploadedDocument) -> Result<ExtractionResult, ExtractionError> {
        let start = Instant::now();
        let resolved = ResolvedType::resolve(&doc.declared_type, &doc.name);

        info!(
            file_name = %doc.name,
            file_type = %resolved.mime,
            type_source = ?resolved.source,
            size = doc.size(),
            "Starting document extraction"
        );

        let extracted = match self.run_primary(&doc, &resolved).await {
            Ok(extracted) => extracted,
            Err(primary_err) => {
                warn!(
                    backend = self.primary.name(),
                    error = %primary_err,
                    "Primary extraction failed, trying fallback"
                );
                self.run_fallback(&doc, &resolved, primary_err).await?
            }
        };

        let normalized = normalizer::normalize(&extracted.text);

        info!(
            file_name = %doc.name,
            original_length = extracted.text.len(),
            cleaned_length = normalized.content.len(),
            line_count = normalized.lines.len(),
            page_count = ?extracted.page_count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Document extraction completed"
        );

        Ok(ExtractionResult {
            content: normalized.content,
            lines: normalized.lines,
            metadata: DocumentMetadata::new(doc.name, resolved.display_name())
                .with_page_count(extracted.page_count),
        })
    }

    async fn run_primary(
        &self,
        doc: &UploadedDocument,
        resolved: &ResolvedType,
    ) -> BackendResult<Extracted> {
        let backend = Arc::clone(&self.primary);
        let content = doc.content.clone();
        let output = self.attempt(move || backend.parse(&content)).await?;

        let text = output.into_text();
        debug!(text_length = text.len(), "Primary backend produced text");

        let page_count = resolved
            .is(media_type::MIME_PDF)
            .then(|| estimate_page_count(&text));

        Ok(Extracted { text, page_count })
    }

    async fn run_fallback(
        &self,
        doc: &UploadedDocument,
        resolved: &ResolvedType,
        primary_err: BackendError,
    ) -> Result<Extracted, ExtractionError> {
        let strategy = FallbackStrategy::for_type(resolved);
        debug!(strategy = ?strategy, file_type = %resolved.mime, "Selected fallback strategy");

        match self.fallback(strategy, &doc.content).await {
            Ok(extracted) => {
                info!(strategy = ?strategy, "Fallback extraction succeeded");
                Ok(extracted)
            }
            Err(failure) => {
                let err = match failure {
                    FallbackFailure::Unsupported => ExtractionError::UnsupportedType {
                        file_type: resolved.mime.clone(),
                        file_name: doc.name.clone(),
                        primary: primary_err.to_string(),
                    },
                    FallbackFailure::Backend(fallback_err) => ExtractionError::AllMethodsFailed {
                        file_type: resolved.mime.clone(),
                        file_name: doc.name.clone(),
                        primary: primary_err.to_string(),
                        fallback: fallback_err.to_string(),
                    },
                };
                warn!(
                    file_name = %doc.name,
                    file_type = %resolved.mime,
                    details = %err.details(),
                    "All parsing methods failed"
                );
                Err(err)
            }
        }
    }

    async fn fallback(
        &self,
        strategy: FallbackStrategy,
        content: &Bytes,
    ) -> Result<Extracted, FallbackFailure> {
        match strategy {
            FallbackStrategy::Pdf => {
                let backend = Arc::clone(&self.pdf);
                let content = content.clone();
                let pdf = self
                    .attempt(move || backend.extract(&content))
                    .await
                    .map_err(FallbackFailure::Backend)?;
                Ok(Extracted {
                    text: pdf.text,
                    page_count: (pdf.page_count > 0).then_some(pdf.page_count),
                })
            }
            FallbackStrategy::Word => {
                let backend = Arc::clone(&self.word);
                let content = content.clone();
                let text = self
                    .attempt(move || backend.extract_raw_text(&content))
                    .await
                    .map_err(FallbackFailure::Backend)?;
                Ok(Extracted {
                    text,
                    page_count: None,
                })
            }
            FallbackStrategy::PlainText => Ok(Extracted {
                text: decode_utf8(content),
                page_count: None,
            }),
            FallbackStrategy::LastResort => {
                let text = decode_utf8(content);
                if text.trim().is_empty() {
                    return Err(FallbackFailure::Unsupported);
                }
                Ok(Extracted {
                    text,
                    page_count: None,
                })
            }
        }
    }

    /// Runs one parser attempt, on the blocking pool when so configured.
    ///
    /// A panic inside the attempt is reported as a failed attempt.
    async fn attempt<T, F>(&self, f: F) -> BackendResult<T>
    where
        F: FnOnce() -> BackendResult<T> + Send + 'static,
        T: Send + 'static,
    {
        if self.options.parse_on_blocking_pool {
            tokio::task::spawn_blocking(f)
                .await
                .map_err(|e| BackendError::aborted(e.to_string()))?
        } else {
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(f))
                .map_err(|_| BackendError::aborted("parser panicked"))?
        }
    }
}

/// Rough page estimate for PDFs read by the generic backend. Never below one.
pub fn estimate_page_count(text: &str) -> u32 {
    let chars = text.chars().count();
    chars.div_ceil(HEURISTIC_CHARS_PER_PAGE).max(1) as u32
}

/// Lossy UTF-8 decode with a leading byte-order mark removed.
pub fn decode_utf8(bytes: &[u8]) -> String {
    let (text, _) = encoding_rs::UTF_8.decode_with_bom_removal(bytes);
    text.into_owned()
}

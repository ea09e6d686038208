//! Parsing backends used by the extractor.
//!
//! The generic [`DocumentBackend`] is always tried first. [`PdfBackend`] and
//! [`WordBackend`] are dedicated fallbacks consulted only when it fails.

pub mod office;
pub mod pdf;
pub mod rtf;
pub mod word;

use serde_json::Value;
use thiserror::Error;

pub use office::OfficeBackend;
pub use pdf::LopdfBackend;
pub use word::DocxRawTextBackend;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("unrecognized document format")]
    UnrecognizedFormat,

    #[error("{format} parsing failed: {message}")]
    Parse { format: &'static str, message: String },

    #[error("archive entry {name} exceeds {limit} bytes")]
    EntryTooLarge { name: String, limit: u64 },

    #[error("unsupported {format} document: {message}")]
    Unsupported { format: &'static str, message: String },

    #[error("extraction task aborted: {message}")]
    Aborted { message: String },
}

impl BackendError {
    pub fn parse(format: &'static str, err: impl std::fmt::Display) -> Self {
        BackendError::Parse {
            format,
            message: err.to_string(),
        }
    }

    pub fn unsupported(format: &'static str, message: impl Into<String>) -> Self {
        BackendError::Unsupported {
            format,
            message: message.into(),
        }
    }

    pub fn aborted(message: impl Into<String>) -> Self {
        BackendError::Aborted {
            message: message.into(),
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// What the generic backend hands back before it is reduced to a string.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendOutput {
    Text(String),
    Structured(Value),
}

impl BackendOutput {
    /// Reduces any output shape to text. Never fails.
    ///
    /// Structured output yields its `data` field when that is set (a string
    /// as-is, anything else as JSON), and its own JSON rendering otherwise.
    pub fn into_text(self) -> String {
        match self {
            BackendOutput::Text(text) => text,
            BackendOutput::Structured(Value::String(text)) => text,
            BackendOutput::Structured(value) => match value.get("data") {
                Some(Value::String(data)) if !data.is_empty() => data.clone(),
                Some(data) if is_set(data) => data.to_string(),
                _ => value.to_string(),
            },
        }
    }
}

/// Empty strings, zero, `false` and `null` count as unset.
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text recovered by a dedicated PDF backend, with its real page count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfText {
    pub text: String,
    pub page_count: u32,
}

/// Multi-format backend that sniffs the container from the bytes.
pub trait DocumentBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn parse(&self, bytes: &[u8]) -> BackendResult<BackendOutput>;
}

pub trait PdfBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, bytes: &[u8]) -> BackendResult<PdfText>;
}

pub trait WordBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract_raw_text(&self, bytes: &[u8]) -> BackendResult<String>;
}

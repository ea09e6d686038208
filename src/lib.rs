//! Manuscript Extractor
//!
//! Turns uploaded manuscripts (PDF, Word, spreadsheets, presentations,
//! OpenDocument, RTF, plain text) into normalized text and line arrays for
//! the review UI.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use handlers::{create_router, AppState};
pub use models::{DocumentMetadata, ExtractionResult, UploadedDocument};
pub use services::{DocumentExtractor, ExtractionError, ExtractorOptions};

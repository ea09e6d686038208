pub mod backends;
pub mod extractor;
pub mod media_type;
pub mod normalizer;

pub use extractor::{DocumentExtractor, ExtractionError, ExtractorOptions, FallbackStrategy};
pub use media_type::{ResolvedType, TypeSource};
pub use normalizer::NormalizedText;

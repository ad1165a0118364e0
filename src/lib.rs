//! Best-guess title extraction for PDF documents.
//!
//! Titles come from the document metadata when present, then from a scored
//! pick over the first page's text layer, then from OCR of the rendered first
//! page.

pub mod backend;
pub mod error;
pub mod heuristic;
pub mod model;
pub mod util;
pub mod waterfall;

use std::path::Path;

pub use error::TitleError;
pub use heuristic::TitleScorer;
pub use model::{OcrMode, TitleMatch, TitleSource};
pub use waterfall::{ExtractorConfig, PopplerExtractor, TitleExtractor};

/// Extracts a title with the poppler/tesseract backends and default settings.
pub fn extract_title(path: impl AsRef<Path>) -> Result<Option<String>, TitleError> {
    let path = path.as_ref();
    let extractor = PopplerExtractor::with_poppler(ExtractorConfig::default())
        .map_err(|err| TitleError::processing(path, err))?;
    extractor.extract_title(path)
}

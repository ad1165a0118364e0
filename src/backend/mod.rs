//! Capability interfaces for the document parser, page rasterizer and OCR
//! engine, plus the default adapters backed by poppler-utils and tesseract.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::error::TitleError;

pub mod poppler;
pub mod tesseract;
pub mod tools;

pub use poppler::{PdftoppmRasterizer, PopplerDocument, PopplerParser};
pub use tesseract::TesseractOcr;

pub trait DocumentParser {
    type Document: PdfDocument;

    /// Opens `path`; a missing file must map to [`TitleError::NotFound`].
    fn open(&self, path: &Path) -> Result<Self::Document, TitleError>;
}

pub trait PdfDocument {
    fn metadata_title(&self) -> Option<&str>;

    fn page_count(&self) -> usize;

    /// Plain text of a 1-based page.
    fn page_text(&self, page_number: usize) -> Result<String>;
}

pub trait PageRasterizer {
    /// Renders the inclusive 1-based range `first_page..=last_page`.
    fn rasterize(
        &self,
        pdf_path: &Path,
        first_page: usize,
        last_page: usize,
        dpi: u32,
    ) -> Result<Vec<RenderedPage>>;
}

pub trait OcrEngine {
    fn recognize(&self, page: &RenderedPage) -> Result<String>;
}

/// An image of one rendered page.
///
/// Scratch images are removed from disk when the value is dropped.
#[derive(Debug)]
pub struct RenderedPage {
    page_number: usize,
    dpi: u32,
    path: PathBuf,
    scratch: bool,
}

impl RenderedPage {
    pub fn scratch(page_number: usize, dpi: u32, path: PathBuf) -> Self {
        Self {
            page_number,
            dpi,
            path,
            scratch: true,
        }
    }

    pub fn existing(page_number: usize, dpi: u32, path: PathBuf) -> Self {
        Self {
            page_number,
            dpi,
            path,
            scratch: false,
        }
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RenderedPage {
    fn drop(&mut self) {
        if self.scratch {
            let _ = fs::remove_file(&self.path);
        }
    }
}

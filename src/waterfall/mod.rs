//! Metadata, then text layer, then OCR; the first tier that yields a title
//! wins.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::backend::{
    DocumentParser, OcrEngine, PageRasterizer, PdfDocument, PdftoppmRasterizer, PopplerParser,
    TesseractOcr,
};
use crate::backend::tesseract::DEFAULT_OCR_LANG;
use crate::error::TitleError;
use crate::heuristic::{TitleScorer, select_title};
use crate::model::{OcrMode, TitleMatch, TitleSource};

#[cfg(test)]
mod tests;

pub const DEFAULT_OCR_DPI: u32 = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    pub dpi: u32,
    pub ocr_mode: OcrMode,
    pub ocr_lang: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_OCR_DPI,
            ocr_mode: OcrMode::Auto,
            ocr_lang: DEFAULT_OCR_LANG.to_string(),
        }
    }
}

pub type PopplerExtractor = TitleExtractor<PopplerParser, PdftoppmRasterizer, TesseractOcr>;

impl PopplerExtractor {
    /// Extractor backed by `pdfinfo`, `pdftotext`, `pdftoppm` and `tesseract`.
    pub fn with_poppler(config: ExtractorConfig) -> Result<Self> {
        let ocr = TesseractOcr::new(config.ocr_lang.clone());
        Ok(Self::new(PopplerParser::new(), PdftoppmRasterizer::new(), ocr)?.with_config(config))
    }
}

pub struct TitleExtractor<P, R, O> {
    parser: P,
    rasterizer: R,
    ocr: O,
    scorer: TitleScorer,
    config: ExtractorConfig,
}

impl<P, R, O> TitleExtractor<P, R, O>
where
    P: DocumentParser,
    R: PageRasterizer,
    O: OcrEngine,
{
    pub fn new(parser: P, rasterizer: R, ocr: O) -> Result<Self> {
        Ok(Self {
            parser,
            rasterizer,
            ocr,
            scorer: TitleScorer::new()?,
            config: ExtractorConfig::default(),
        })
    }

    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn extract_title(&self, path: &Path) -> Result<Option<String>, TitleError> {
        Ok(self.extract(path)?.map(|found| found.title))
    }

    pub fn extract(&self, path: &Path) -> Result<Option<TitleMatch>, TitleError> {
        let document = self.parser.open(path)?;

        if let Some(title) = metadata_title(&document) {
            return Ok(Some(found(path, title, TitleSource::Metadata)));
        }

        let text_title = self
            .text_layer_title(&document)
            .map_err(|err| TitleError::processing(path, err))?;
        drop(document);

        if let Some(title) = text_title {
            return Ok(Some(found(path, title, TitleSource::TextLayer)));
        }

        if let Some(title) = self.ocr_title(path) {
            return Ok(Some(found(path, title, TitleSource::Ocr)));
        }

        info!(path = %path.display(), "no title found");
        Ok(None)
    }

    fn text_layer_title(&self, document: &P::Document) -> Result<Option<String>> {
        if document.page_count() == 0 {
            debug!("document has no pages; skipping text layer");
            return Ok(None);
        }

        let text = document
            .page_text(1)
            .context("failed to extract text from first page")?;
        if text.trim().is_empty() {
            debug!("first page has no text layer");
            return Ok(None);
        }

        Ok(self.pick_title(&text, TitleSource::TextLayer))
    }

    fn ocr_title(&self, path: &Path) -> Option<String> {
        if self.config.ocr_mode == OcrMode::Off {
            debug!("OCR disabled; skipping OCR tier");
            return None;
        }

        match self.recognize_first_page(path) {
            Ok(title) => title,
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %format!("{err:#}"),
                    "OCR tier failed; continuing without it"
                );
                None
            }
        }
    }

    fn recognize_first_page(&self, path: &Path) -> Result<Option<String>> {
        let pages = self
            .rasterizer
            .rasterize(path, 1, 1, self.config.dpi)
            .context("failed to rasterize first page")?;
        let Some(page) = pages.first() else {
            debug!("rasterizer produced no image");
            return Ok(None);
        };

        let text = self
            .ocr
            .recognize(page)
            .context("failed to recognize first page")?;
        if text.trim().is_empty() {
            debug!("OCR produced no text");
            return Ok(None);
        }

        Ok(self.pick_title(&text, TitleSource::Ocr))
    }

    fn pick_title(&self, text: &str, tier: TitleSource) -> Option<String> {
        let ranked = self.scorer.rank(Some(text));
        for candidate in &ranked {
            debug!(
                tier = tier.as_str(),
                index = candidate.index,
                score = candidate.score,
                line = %candidate.line,
                "scored candidate"
            );
        }
        select_title(&ranked)
    }
}

fn metadata_title<D: PdfDocument>(document: &D) -> Option<String> {
    document
        .metadata_title()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(ToOwned::to_owned)
}

fn found(path: &Path, title: String, source: TitleSource) -> TitleMatch {
    info!(path = %path.display(), tier = source.as_str(), title = %title, "title found");
    TitleMatch { title, source }
}

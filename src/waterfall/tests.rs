use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{anyhow, bail};

use super::*;
use crate::backend::RenderedPage;

#[derive(Clone)]
enum Opened {
    Missing,
    Corrupt,
    Document {
        title: Option<String>,
        pages: Vec<String>,
        text_fails: bool,
    },
}

#[derive(Clone, Default)]
struct Calls {
    page_text: Rc<Cell<usize>>,
    rasterize: Rc<RefCell<Vec<(PathBuf, usize, usize, u32)>>>,
    recognize: Rc<Cell<usize>>,
}

struct FakeParser {
    opened: Opened,
    calls: Calls,
}

struct FakeDocument {
    title: Option<String>,
    pages: Vec<String>,
    text_fails: bool,
    calls: Calls,
}

impl DocumentParser for FakeParser {
    type Document = FakeDocument;

    fn open(&self, path: &Path) -> Result<FakeDocument, TitleError> {
        match &self.opened {
            Opened::Missing => Err(TitleError::not_found(path)),
            Opened::Corrupt => Err(TitleError::processing(
                path,
                anyhow!("startxref not found"),
            )),
            Opened::Document {
                title,
                pages,
                text_fails,
            } => Ok(FakeDocument {
                title: title.clone(),
                pages: pages.clone(),
                text_fails: *text_fails,
                calls: self.calls.clone(),
            }),
        }
    }
}

impl PdfDocument for FakeDocument {
    fn metadata_title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, page_number: usize) -> Result<String> {
        self.calls.page_text.set(self.calls.page_text.get() + 1);
        if self.text_fails {
            bail!("content stream is malformed");
        }
        Ok(self.pages[page_number - 1].clone())
    }
}

struct FakeRasterizer {
    fails: bool,
    calls: Calls,
}

impl PageRasterizer for FakeRasterizer {
    fn rasterize(
        &self,
        pdf_path: &Path,
        first_page: usize,
        last_page: usize,
        dpi: u32,
    ) -> Result<Vec<RenderedPage>> {
        self.calls
            .rasterize
            .borrow_mut()
            .push((pdf_path.to_path_buf(), first_page, last_page, dpi));
        if self.fails {
            bail!("pdftoppm: command not found");
        }
        Ok(vec![RenderedPage::existing(
            first_page,
            dpi,
            PathBuf::from("page-1.png"),
        )])
    }
}

struct FakeOcr {
    text: Option<String>,
    calls: Calls,
}

impl OcrEngine for FakeOcr {
    fn recognize(&self, _page: &RenderedPage) -> Result<String> {
        self.calls.recognize.set(self.calls.recognize.get() + 1);
        self.text
            .clone()
            .ok_or_else(|| anyhow!("tesseract is not installed"))
    }
}

struct Harness {
    opened: Opened,
    raster_fails: bool,
    ocr_text: Option<String>,
    config: ExtractorConfig,
}

impl Harness {
    fn document(title: Option<&str>, pages: &[&str]) -> Self {
        Self {
            opened: Opened::Document {
                title: title.map(ToOwned::to_owned),
                pages: pages.iter().map(|page| page.to_string()).collect(),
                text_fails: false,
            },
            raster_fails: false,
            ocr_text: Some(String::new()),
            config: ExtractorConfig::default(),
        }
    }

    fn opened(opened: Opened) -> Self {
        Self {
            opened,
            ..Self::document(None, &[])
        }
    }

    fn ocr_text(mut self, text: Option<&str>) -> Self {
        self.ocr_text = text.map(ToOwned::to_owned);
        self
    }

    fn raster_fails(mut self) -> Self {
        self.raster_fails = true;
        self
    }

    fn config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    fn run(self) -> (Result<Option<TitleMatch>, TitleError>, Calls) {
        let calls = Calls::default();
        let extractor = TitleExtractor::new(
            FakeParser {
                opened: self.opened,
                calls: calls.clone(),
            },
            FakeRasterizer {
                fails: self.raster_fails,
                calls: calls.clone(),
            },
            FakeOcr {
                text: self.ocr_text,
                calls: calls.clone(),
            },
        )
        .expect("extractor builds")
        .with_config(self.config);

        (extractor.extract(Path::new("doc.pdf")), calls)
    }
}

fn title_of(result: &Result<Option<TitleMatch>, TitleError>) -> Option<(&str, TitleSource)> {
    result
        .as_ref()
        .expect("extraction succeeds")
        .as_ref()
        .map(|found| (found.title.as_str(), found.source))
}

#[test]
fn metadata_title_is_trimmed_and_wins_without_reading_pages() {
    let (result, calls) = Harness::document(
        Some("  Title With Spaces  "),
        &["Digital Text Title\n\nBody content here..."],
    )
    .ocr_text(Some("OCR Extracted Title"))
    .run();

    assert_eq!(
        title_of(&result),
        Some(("Title With Spaces", TitleSource::Metadata))
    );
    assert_eq!(calls.page_text.get(), 0);
    assert!(calls.rasterize.borrow().is_empty());
    assert_eq!(calls.recognize.get(), 0);
}

#[test]
fn blank_metadata_title_falls_through_to_text_layer() {
    let (result, calls) = Harness::document(
        Some(" \t "),
        &["Digital Text Title\n\nBody content here..."],
    )
    .run();

    assert_eq!(
        title_of(&result),
        Some(("Digital Text Title", TitleSource::TextLayer))
    );
    assert_eq!(calls.page_text.get(), 1);
}

#[test]
fn text_layer_title_skips_ocr() {
    let (result, calls) =
        Harness::document(None, &["Digital Text Title\n\nBody content here...", "Page two"])
            .ocr_text(Some("OCR Extracted Title"))
            .run();

    assert_eq!(
        title_of(&result),
        Some(("Digital Text Title", TitleSource::TextLayer))
    );
    assert!(calls.rasterize.borrow().is_empty());
    assert_eq!(calls.recognize.get(), 0);
}

#[test]
fn empty_text_layer_uses_ocr_of_first_page_at_300_dpi() {
    let (result, calls) = Harness::document(None, &["  \n "])
        .ocr_text(Some("OCR Extracted Title\n\nOCR body text..."))
        .run();

    assert_eq!(
        title_of(&result),
        Some(("OCR Extracted Title", TitleSource::Ocr))
    );
    assert_eq!(
        calls.rasterize.borrow().as_slice(),
        &[(PathBuf::from("doc.pdf"), 1, 1, 300)]
    );
    assert_eq!(calls.recognize.get(), 1);
}

#[test]
fn rasterizer_failure_is_absorbed() {
    let (result, calls) = Harness::document(None, &[""]).raster_fails().run();

    assert_eq!(title_of(&result), None);
    assert_eq!(calls.rasterize.borrow().len(), 1);
    assert_eq!(calls.recognize.get(), 0);
}

#[test]
fn ocr_engine_failure_is_absorbed() {
    let (result, calls) = Harness::document(None, &[""]).ocr_text(None).run();

    assert_eq!(title_of(&result), None);
    assert_eq!(calls.recognize.get(), 1);
}

#[test]
fn blank_ocr_output_is_no_title() {
    let (result, _) = Harness::document(None, &[""]).ocr_text(Some(" \n\n ")).run();
    assert_eq!(title_of(&result), None);
}

#[test]
fn document_without_pages_goes_straight_to_ocr() {
    let (result, calls) = Harness::document(None, &[])
        .ocr_text(Some("Scanned Cover Page"))
        .run();

    assert_eq!(
        title_of(&result),
        Some(("Scanned Cover Page", TitleSource::Ocr))
    );
    assert_eq!(calls.page_text.get(), 0);
}

#[test]
fn unusable_text_layer_falls_back_to_ocr() {
    let body = "w".repeat(240);
    let (result, _) = Harness::document(None, &[body.as_str()])
        .ocr_text(Some("Recovered Title"))
        .run();

    assert_eq!(title_of(&result), Some(("Recovered Title", TitleSource::Ocr)));
}

#[test]
fn ocr_mode_off_skips_rasterization() {
    let config = ExtractorConfig {
        ocr_mode: OcrMode::Off,
        ..ExtractorConfig::default()
    };
    let (result, calls) = Harness::document(None, &[""])
        .ocr_text(Some("OCR Extracted Title"))
        .config(config)
        .run();

    assert_eq!(title_of(&result), None);
    assert!(calls.rasterize.borrow().is_empty());
}

#[test]
fn configured_dpi_reaches_rasterizer() {
    let config = ExtractorConfig {
        dpi: 150,
        ..ExtractorConfig::default()
    };
    let (_, calls) = Harness::document(None, &[""]).config(config).run();

    assert_eq!(calls.rasterize.borrow()[0].3, 150);
}

#[test]
fn missing_document_is_not_found() {
    let (result, calls) = Harness::opened(Opened::Missing).run();

    let err = result.expect_err("missing file fails");
    assert!(err.is_not_found());
    assert!(calls.rasterize.borrow().is_empty());
}

#[test]
fn corrupt_document_is_processing_error_with_cause() {
    let (result, _) = Harness::opened(Opened::Corrupt).run();

    let err = result.expect_err("corrupt file fails");
    assert!(matches!(err, TitleError::Processing { .. }));
    assert!(err.to_string().contains("startxref not found"));
}

#[test]
fn page_text_failure_is_processing_error() {
    let (result, calls) = Harness::opened(Opened::Document {
        title: None,
        pages: vec!["Some Title".to_string()],
        text_fails: true,
    })
    .run();

    let err = result.expect_err("text extraction fails");
    assert!(!err.is_not_found());
    assert!(err.to_string().contains("content stream is malformed"));
    assert!(calls.rasterize.borrow().is_empty());
}

#[test]
fn extract_title_returns_only_the_string() {
    let calls = Calls::default();
    let extractor = TitleExtractor::new(
        FakeParser {
            opened: Opened::Document {
                title: Some("Quarterly Report".to_string()),
                pages: vec![],
                text_fails: false,
            },
            calls: calls.clone(),
        },
        FakeRasterizer {
            fails: false,
            calls: calls.clone(),
        },
        FakeOcr {
            text: None,
            calls,
        },
    )
    .expect("extractor builds");

    assert_eq!(
        extractor
            .extract_title(Path::new("report.pdf"))
            .expect("extraction succeeds")
            .as_deref(),
        Some("Quarterly Report")
    );
    assert_eq!(extractor.config(), &ExtractorConfig::default());
}

use std::process::Command;

use anyhow::{Context, Result, bail};

use super::{OcrEngine, RenderedPage};

pub const DEFAULT_OCR_LANG: &str = "eng";

/// Runs the `tesseract` CLI and reads recognized text from stdout.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    lang: String,
}

impl TesseractOcr {
    pub fn new(lang: impl Into<String>) -> Self {
        Self { lang: lang.into() }
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new(DEFAULT_OCR_LANG)
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, page: &RenderedPage) -> Result<String> {
        let output = Command::new("tesseract")
            .arg(page.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .output()
            .with_context(|| format!("failed to execute tesseract for {}", page.path().display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "tesseract returned non-zero exit status for page {}: {}",
                page.page_number(),
                stderr.trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).replace('\u{0000}', ""))
    }
}

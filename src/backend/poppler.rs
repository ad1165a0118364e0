use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::debug;

use super::{DocumentParser, PageRasterizer, PdfDocument, RenderedPage};
use crate::error::TitleError;

/// Reads metadata with `pdfinfo` and page text with `pdftotext`.
#[derive(Debug, Clone, Default)]
pub struct PopplerParser;

impl PopplerParser {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Clone)]
pub struct PopplerDocument {
    path: PathBuf,
    info: PdfInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfInfo {
    pub title: Option<String>,
    pub page_count: usize,
}

impl DocumentParser for PopplerParser {
    type Document = PopplerDocument;

    fn open(&self, path: &Path) -> Result<PopplerDocument, TitleError> {
        match fs::metadata(path) {
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(TitleError::not_found(path));
            }
            Err(err) => {
                return Err(TitleError::processing(
                    path,
                    anyhow::Error::new(err).context("failed to stat PDF"),
                ));
            }
        }

        let info = read_pdfinfo(path).map_err(|err| TitleError::processing(path, err))?;
        debug!(
            path = %path.display(),
            pages = info.page_count,
            has_title = info.title.is_some(),
            "opened PDF"
        );

        Ok(PopplerDocument {
            path: path.to_path_buf(),
            info,
        })
    }
}

impl PdfDocument for PopplerDocument {
    fn metadata_title(&self) -> Option<&str> {
        self.info.title.as_deref()
    }

    fn page_count(&self) -> usize {
        self.info.page_count
    }

    fn page_text(&self, page_number: usize) -> Result<String> {
        extract_page_with_pdftotext(&self.path, page_number)
    }
}

fn read_pdfinfo(pdf_path: &Path) -> Result<PdfInfo> {
    let output = Command::new("pdfinfo")
        .arg("-enc")
        .arg("UTF-8")
        .arg(pdf_path)
        .output()
        .with_context(|| format!("failed to execute pdfinfo for {}", pdf_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdfinfo returned non-zero exit status for {}: {}",
            pdf_path.display(),
            stderr.trim()
        );
    }

    parse_pdfinfo(&String::from_utf8_lossy(&output.stdout))
        .with_context(|| format!("unexpected pdfinfo output for {}", pdf_path.display()))
}

pub fn parse_pdfinfo(raw: &str) -> Result<PdfInfo> {
    let mut title = None;
    let mut page_count = None;

    for line in raw.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match key.trim() {
            "Title" if title.is_none() && !value.is_empty() => {
                title = Some(value.to_string());
            }
            "Pages" => {
                let pages = value
                    .parse::<usize>()
                    .with_context(|| format!("invalid page count in pdfinfo output: {value}"))?;
                page_count = Some(pages);
            }
            _ => {}
        }
    }

    let Some(page_count) = page_count else {
        bail!("pdfinfo output did not contain a 'Pages:' line");
    };

    Ok(PdfInfo { title, page_count })
}

fn extract_page_with_pdftotext(pdf_path: &Path, page_number: usize) -> Result<String> {
    let output = Command::new("pdftotext")
        .arg("-enc")
        .arg("UTF-8")
        .arg("-f")
        .arg(page_number.to_string())
        .arg("-l")
        .arg(page_number.to_string())
        .arg(pdf_path)
        .arg("-")
        .output()
        .with_context(|| format!("failed to execute pdftotext for {}", pdf_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdftotext returned non-zero exit status for {} page {}: {}",
            pdf_path.display(),
            page_number,
            stderr.trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .replace(['\u{0000}', '\u{000C}'], ""))
}

/// Renders pages to PNG with `pdftoppm`, one invocation per page.
#[derive(Debug, Clone, Default)]
pub struct PdftoppmRasterizer;

impl PdftoppmRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl PageRasterizer for PdftoppmRasterizer {
    fn rasterize(
        &self,
        pdf_path: &Path,
        first_page: usize,
        last_page: usize,
        dpi: u32,
    ) -> Result<Vec<RenderedPage>> {
        if first_page == 0 || last_page < first_page {
            bail!("invalid page range {first_page}..={last_page}");
        }

        let mut pages = Vec::with_capacity(last_page - first_page + 1);
        for page_number in first_page..=last_page {
            pages.push(render_page(pdf_path, page_number, dpi)?);
        }
        Ok(pages)
    }
}

fn render_page(pdf_path: &Path, page_number: usize, dpi: u32) -> Result<RenderedPage> {
    let output_root = scratch_output_root(pdf_path, page_number);
    let png_path = PathBuf::from(format!("{}.png", output_root.display()));

    let output = Command::new("pdftoppm")
        .arg("-f")
        .arg(page_number.to_string())
        .arg("-l")
        .arg(page_number.to_string())
        .arg("-r")
        .arg(dpi.to_string())
        .arg("-singlefile")
        .arg("-png")
        .arg(pdf_path)
        .arg(&output_root)
        .output()
        .with_context(|| format!("failed to execute pdftoppm for {}", pdf_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdftoppm returned non-zero exit status for {} page {}: {}",
            pdf_path.display(),
            page_number,
            stderr.trim()
        );
    }

    if !png_path.exists() {
        bail!(
            "pdftoppm did not produce expected image for {} page {}",
            pdf_path.display(),
            page_number
        );
    }

    debug!(page = page_number, dpi, image = %png_path.display(), "rendered page");
    Ok(RenderedPage::scratch(page_number, dpi, png_path))
}

fn scratch_output_root(pdf_path: &Path, page_number: usize) -> PathBuf {
    let pdf_stem = pdf_path
        .file_stem()
        .and_then(|value| value.to_str())
        .unwrap_or("pdf");
    let safe_stem = pdf_stem
        .chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() {
                character
            } else {
                '_'
            }
        })
        .collect::<String>();

    let stamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    std::env::temp_dir().join(format!(
        "pdftitle_page_{}_{}_{}_{}",
        safe_stem,
        std::process::id(),
        page_number,
        stamp
    ))
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use pdftitle::OcrMode;
use pdftitle::backend::tesseract::DEFAULT_OCR_LANG;
use pdftitle::waterfall::{DEFAULT_OCR_DPI, ExtractorConfig};

#[derive(Parser, Debug)]
#[command(
    name = "pdftitle",
    version,
    about = "Extract a best-guess title from PDF documents"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the title of one or more PDFs
    Extract(ExtractArgs),
    /// Extract titles for every PDF in a directory into a JSON manifest
    Inventory(InventoryArgs),
    /// Report which external tools are installed
    Tools,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractionArgs {
    /// Rendering DPI for the OCR tier
    #[arg(long, default_value_t = DEFAULT_OCR_DPI)]
    pub dpi: u32,

    #[arg(long, value_enum, default_value_t = OcrMode::Auto)]
    pub ocr_mode: OcrMode,

    #[arg(long, default_value = DEFAULT_OCR_LANG)]
    pub ocr_lang: String,
}

impl ExtractionArgs {
    pub fn to_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            dpi: self.dpi,
            ocr_mode: self.ocr_mode,
            ocr_lang: self.ocr_lang.clone(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Print one JSON object per input instead of plain text
    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[command(flatten)]
    pub extraction: ExtractionArgs,
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    pub source_dir: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    #[command(flatten)]
    pub extraction: ExtractionArgs,
}

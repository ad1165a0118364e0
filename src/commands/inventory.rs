use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use pdftitle::backend::{DocumentParser, OcrEngine, PageRasterizer};
use pdftitle::model::{TitleEntry, TitleManifest};
use pdftitle::util::{now_utc_string, sha256_file, write_json_pretty};
use pdftitle::{PopplerExtractor, TitleExtractor};

use crate::cli::InventoryArgs;

const MANIFEST_FILENAME: &str = "pdf_titles.json";

pub fn run(args: InventoryArgs) -> Result<()> {
    let extractor = PopplerExtractor::with_poppler(args.extraction.to_config())?;
    let manifest = build_manifest(&args.source_dir, &extractor)?;

    if args.dry_run {
        info!(
            pdf_count = manifest.pdf_count,
            titled = manifest.titled_count,
            source = %manifest.source_directory,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args
        .manifest_path
        .unwrap_or_else(|| args.source_dir.join(MANIFEST_FILENAME));

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote title manifest");
    info!(
        pdf_count = manifest.pdf_count,
        titled = manifest.titled_count,
        "inventory completed"
    );

    Ok(())
}

pub fn build_manifest<P, R, O>(
    source_dir: &Path,
    extractor: &TitleExtractor<P, R, O>,
) -> Result<TitleManifest>
where
    P: DocumentParser,
    R: PageRasterizer,
    O: OcrEngine,
{
    let mut pdf_paths = discover_pdfs(source_dir)?;
    pdf_paths.sort();

    if pdf_paths.is_empty() {
        bail!("no PDFs found in {}", source_dir.display());
    }

    let mut pdfs = Vec::with_capacity(pdf_paths.len());
    for path in pdf_paths {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(ToOwned::to_owned)
            .with_context(|| format!("invalid UTF-8 filename: {}", path.display()))?;
        let sha256 = sha256_file(&path)?;

        let entry = match extractor.extract(&path) {
            Ok(found) => TitleEntry {
                filename,
                sha256,
                title: found.as_ref().map(|found| found.title.clone()),
                source: found.map(|found| found.source),
                error: None,
            },
            Err(err) => {
                warn!(path = %path.display(), error = %err, "title extraction failed");
                TitleEntry {
                    filename,
                    sha256,
                    title: None,
                    source: None,
                    error: Some(err.to_string()),
                }
            }
        };
        pdfs.push(entry);
    }

    Ok(TitleManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        source_directory: source_dir.display().to_string(),
        ocr_mode: extractor.config().ocr_mode,
        pdf_count: pdfs.len(),
        titled_count: pdfs.iter().filter(|entry| entry.title.is_some()).count(),
        pdfs,
    })
}

fn discover_pdfs(source_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pdfs = Vec::new();

    let entries = fs::read_dir(source_dir)
        .with_context(|| format!("failed to read {}", source_dir.display()))?;

    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", source_dir.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);

        if is_pdf {
            pdfs.push(path);
        }
    }

    Ok(pdfs)
}

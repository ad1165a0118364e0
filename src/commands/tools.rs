use anyhow::Result;
use tracing::{info, warn};

use pdftitle::backend::tools::{OCR_TOOLS, REQUIRED_TOOLS, collect_tool_versions};

pub fn run() -> Result<()> {
    let versions = collect_tool_versions();

    let reported = [
        ("pdfinfo", &versions.pdfinfo),
        ("pdftotext", &versions.pdftotext),
        ("pdftoppm", &versions.pdftoppm),
        ("tesseract", &versions.tesseract),
    ];

    for (program, version) in reported {
        match version {
            Some(version) => info!(tool = program, version = %version, "tool available"),
            None => warn!(tool = program, "tool missing"),
        }
    }

    let missing = |tools: &[&str]| {
        tools
            .iter()
            .filter(|tool| {
                reported
                    .iter()
                    .any(|(program, version)| program == *tool && version.is_none())
            })
            .count()
    };

    if missing(&REQUIRED_TOOLS) > 0 {
        warn!("pdfinfo/pdftotext are required; extraction will fail for every document");
    }
    if missing(&OCR_TOOLS) > 0 {
        warn!("pdftoppm/tesseract unavailable; the OCR tier will find nothing");
    }

    Ok(())
}

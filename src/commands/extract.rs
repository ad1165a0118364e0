use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{error, info};

use pdftitle::{PopplerExtractor, TitleError, TitleMatch, TitleSource};

use crate::cli::ExtractArgs;

#[derive(Debug, Serialize)]
struct ExtractOutput<'a> {
    path: String,
    title: Option<&'a str>,
    source: Option<TitleSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn run(args: ExtractArgs) -> Result<()> {
    let config = args.extraction.to_config();
    info!(
        inputs = args.inputs.len(),
        dpi = config.dpi,
        ocr_mode = config.ocr_mode.as_str(),
        "starting title extraction"
    );

    let extractor = PopplerExtractor::with_poppler(config)?;
    let show_path = args.inputs.len() > 1;
    let mut failed = 0_usize;

    for input in &args.inputs {
        let result = extractor.extract(input);
        if let Err(err) = &result {
            error!(path = %input.display(), error = %err, "extraction failed");
            failed += 1;
        }

        if args.json {
            println!("{}", render_json(input, &result)?);
        } else if show_path {
            println!("{}: {}", input.display(), render_plain(&result));
        } else {
            println!("{}", render_plain(&result));
        }
    }

    if failed > 0 {
        bail!("{} of {} file(s) failed", failed, args.inputs.len());
    }

    Ok(())
}

fn render_plain(result: &Result<Option<TitleMatch>, TitleError>) -> String {
    match result {
        Ok(Some(found)) => format!("Title: {}", found.title),
        Ok(None) => "No title found".to_string(),
        Err(TitleError::NotFound { path }) => format!("File '{}' not found", path.display()),
        Err(err) => format!("Error: {err}"),
    }
}

fn render_json(input: &Path, result: &Result<Option<TitleMatch>, TitleError>) -> Result<String> {
    let found = result.as_ref().ok().and_then(Option::as_ref);
    let output = ExtractOutput {
        path: input.display().to_string(),
        title: found.map(|found| found.title.as_str()),
        source: found.map(|found| found.source),
        error: result.as_ref().err().map(ToString::to_string),
    };

    serde_json::to_string(&output)
        .with_context(|| format!("failed to serialize result for {}", input.display()))
}

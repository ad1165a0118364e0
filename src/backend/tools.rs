use std::process::Command;

use crate::model::ToolVersions;

pub const REQUIRED_TOOLS: [&str; 2] = ["pdfinfo", "pdftotext"];
pub const OCR_TOOLS: [&str; 2] = ["pdftoppm", "tesseract"];

pub fn collect_tool_versions() -> ToolVersions {
    ToolVersions {
        pdfinfo: command_version_optional("pdfinfo", &["-v"]),
        pdftotext: command_version_optional("pdftotext", &["-v"]),
        pdftoppm: command_version_optional("pdftoppm", &["-v"]),
        tesseract: command_version_optional("tesseract", &["--version"]),
    }
}

pub fn command_version_optional(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    first_version_line(&stdout, &stderr)
}

// poppler prints its version banner on stderr, tesseract on stdout.
fn first_version_line(stdout: &str, stderr: &str) -> Option<String> {
    let source = if stdout.trim().is_empty() {
        stderr.trim()
    } else {
        stdout.trim()
    };

    source
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
}

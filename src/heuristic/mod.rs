//! Line-scoring heuristic that picks a title out of unstructured page text.
//!
//! Works on any text block (text layer or OCR output) and never touches the
//! document itself.

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;


/// Only the top of the page is considered.
pub const MAX_CANDIDATE_LINES: usize = 10;
/// Lines this long or longer are body text.
pub const MAX_TITLE_CHARS: usize = 200;
/// A best score above this is trusted outright.
pub const CONFIDENCE_THRESHOLD: i32 = 3;

const SPECIAL_CHARACTERS: &str = "!@#$%^&*()[]{}|\\<>";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredLine {
    pub index: usize,
    pub line: String,
    pub score: i32,
}

#[derive(Debug, Clone)]
pub struct TitleScorer {
    date_pattern: Regex,
    metadata_prefix: Regex,
}

impl TitleScorer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            date_pattern: Regex::new(r"\d{4}[-/]\d{2}[-/]\d{2}")
                .context("failed to compile date pattern regex")?,
            metadata_prefix: Regex::new(r"(?i)^(?:page|vol|volume|author|date)")
                .context("failed to compile metadata keyword regex")?,
        })
    }

    /// Returns the most title-like line of `text`.
    ///
    /// Falls back to the first candidate when nothing clears
    /// [`CONFIDENCE_THRESHOLD`], so any text with a usable line yields a value.
    pub fn score_text(&self, text: Option<&str>) -> Option<String> {
        select_title(&self.rank(text))
    }

    /// Scores every surviving candidate, in page order.
    pub fn rank(&self, text: Option<&str>) -> Vec<ScoredLine> {
        let Some(text) = text else {
            return Vec::new();
        };

        let lines = candidate_lines(text);
        let count = lines.len();

        lines
            .into_iter()
            .enumerate()
            .map(|(index, line)| ScoredLine {
                index,
                line: line.to_string(),
                score: self.score_line(line, index, count),
            })
            .collect()
    }

    pub fn score_line(&self, line: &str, idx: usize, n: usize) -> i32 {
        let char_count = line.chars().count();
        let mut score = (n.saturating_sub(idx) as i32) * 2;

        if (10..=100).contains(&char_count) {
            score += 3;
        } else if char_count < 10 {
            score -= 2;
        }

        if is_title_case(line) || is_upper_case(line) {
            score += 4;
        }

        if self.date_pattern.is_match(line) {
            score -= 3;
        }
        if self.metadata_prefix.is_match(line) {
            score -= 3;
        }

        if char_count > 0 {
            let dense = line
                .chars()
                .filter(|character| character.is_alphanumeric() || character.is_whitespace())
                .count();
            if dense as f64 / char_count as f64 > 0.8 {
                score += 2;
            }
        }

        let special = line
            .chars()
            .filter(|character| SPECIAL_CHARACTERS.contains(*character))
            .count();
        if special > 3 {
            score -= 2;
        }

        score
    }
}

/// Picks from lines already ranked by [`TitleScorer::rank`]; ties keep the
/// earliest line.
pub fn select_title(ranked: &[ScoredLine]) -> Option<String> {
    let first = ranked.first()?;

    let mut best = first;
    for scored in &ranked[1..] {
        if scored.score > best.score {
            best = scored;
        }
    }

    if best.score > CONFIDENCE_THRESHOLD {
        Some(best.line.clone())
    } else {
        Some(first.line.clone())
    }
}

/// Trimmed, non-empty lines from the top of `text`, minus anything too long
/// to be a title.
pub fn candidate_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_CANDIDATE_LINES)
        .filter(|line| line.chars().count() < MAX_TITLE_CHARS)
        .collect()
}

/// Every cased run starts with an upper-case letter and continues in lower
/// case; requires at least one cased character.
pub fn is_title_case(line: &str) -> bool {
    let mut cased = false;
    let mut previous_cased = false;

    for character in line.chars() {
        if character.is_uppercase() {
            if previous_cased {
                return false;
            }
            previous_cased = true;
            cased = true;
        } else if character.is_lowercase() {
            if !previous_cased {
                return false;
            }
            previous_cased = true;
            cased = true;
        } else {
            previous_cased = false;
        }
    }

    cased
}

pub fn is_upper_case(line: &str) -> bool {
    let mut cased = false;
    for character in line.chars() {
        if character.is_lowercase() {
            return false;
        }
        if character.is_uppercase() {
            cased = true;
        }
    }
    cased
}

//! Match-failure diagnostics: whitespace-visualized renderings of patterns
//! and near-miss buffer regions, and persistable failed-match records for
//! offline reproduction.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Render whitespace as distinct glyphs so indentation mismatches are visible
/// in error output: spaces as `·`, tabs as `→`.
pub fn visualize_whitespace(line: &str) -> String {
    line.replace(' ', "·").replace('\t', "→")
}

/// Number and visualize a block of lines. `first_line` is the 0-based index
/// of the first line, displayed 1-based.
pub fn render_lines(lines: &[String], first_line: usize) -> String {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:4} | {}", first_line + i + 1, visualize_whitespace(line)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The buffer region most similar to the attempted pattern, rendered for a
/// "not found" error. Similarity is normalized Levenshtein over stripped
/// lines, so the excerpt points at the near miss rather than an arbitrary
/// spot. `base` is the 0-based buffer index of `buffer[0]`, so excerpts from
/// a sub-region keep document line numbers.
pub fn nearest_miss(buffer: &[String], pattern: &[String], base: usize) -> String {
    let plen = pattern.len();
    if plen == 0 || buffer.is_empty() {
        return String::from("(empty)");
    }
    let window_len = plen.min(buffer.len());
    let target = stripped_text(pattern);

    let mut best_start = 0;
    let mut best_score = f64::MIN;
    for start in 0..=buffer.len() - window_len {
        let window = &buffer[start..start + window_len];
        let score = strsim::normalized_levenshtein(&stripped_text(window), &target);
        if score > best_score {
            best_score = score;
            best_start = start;
        }
    }

    render_lines(&buffer[best_start..best_start + window_len], base + best_start)
}

fn stripped_text(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| line.trim())
        .collect::<Vec<_>>()
        .join("\n")
}

/// A failed match serialized for later offline reproduction: the target path,
/// the attempted pattern, and the full buffer text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedMatchRecord {
    pub target: PathBuf,
    pub pattern: String,
    pub buffer: String,
}

impl FailedMatchRecord {
    pub fn new(target: impl Into<PathBuf>, pattern: &[String], buffer: &[String]) -> Self {
        Self {
            target: target.into(),
            pattern: pattern.join("\n"),
            buffer: buffer.join("\n"),
        }
    }

    /// Write this record as pretty JSON into `dir`, returning the file path.
    /// Opt-in; the engine never writes records implicitly.
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let path = dir.join(format!("failed_match_{stamp}.json"));
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&path, json)?;
        Ok(path)
    }
}

//! In-memory line buffer: the substrate every other component reads and writes.
//!
//! A [`LineBuffer`] holds one document as an ordered sequence of lines with no
//! embedded terminators. The 0-based index is the sole position identity.
//! Mutation happens only through full-line-range splices; there are no
//! partial-line edits at this layer.

use std::fs;
use std::io;
use std::ops::Range;
use std::path::Path;

/// Ordered, mutable sequence of document lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineBuffer {
    lines: Vec<String>,
}

impl LineBuffer {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Split text into lines, dropping terminators. A trailing newline does
    /// not produce a phantom empty line.
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Read a file to completion and release the handle before returning.
    pub fn read_from(path: &Path) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_text(&text))
    }

    /// Render back to text. Non-empty buffers get a trailing newline so the
    /// committed file stays newline-terminated.
    pub fn to_text(&self) -> String {
        if self.lines.is_empty() {
            String::new()
        } else {
            let mut text = self.lines.join("\n");
            text.push('\n');
            text
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Replace `range` with `replacement`, returning the removed lines.
    ///
    /// This is the only mutation primitive; every edit variant reduces to one
    /// or more splices.
    pub fn splice(&mut self, range: Range<usize>, replacement: Vec<String>) -> Vec<String> {
        debug_assert!(range.start <= range.end && range.end <= self.lines.len());
        self.lines.splice(range, replacement).collect()
    }

    /// Append lines at the end of the buffer.
    pub fn extend(&mut self, lines: Vec<String>) {
        self.lines.extend(lines);
    }
}

//! Indentation measurement, nesting-shape classification, and the
//! indentation transposer that reanchors replacement content at the matched
//! position's depth.

/// Width of a line's leading whitespace, counted in characters (a tab counts
/// as one).
pub fn indent_width(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}

/// A line is blank when it contains nothing but whitespace.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Declared indentation of a block: the leading-whitespace width of its first
/// non-blank line, or 0 for an all-blank block.
pub fn declared_indent(lines: &[String]) -> usize {
    lines
        .iter()
        .find(|line| !is_blank(line))
        .map(|line| indent_width(line))
        .unwrap_or(0)
}

/// Indentation change between two consecutive lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentStep {
    Increase,
    Decrease,
    Unchanged,
}

/// Classify the indentation delta of every consecutive line pair.
///
/// Two blocks with equal shapes have the same relative nesting topology even
/// when the absolute indentation has been rescaled.
pub fn indent_shape(lines: &[String]) -> Vec<IndentStep> {
    lines
        .windows(2)
        .map(|pair| {
            let prev = indent_width(&pair[0]);
            let curr = indent_width(&pair[1]);
            match curr.cmp(&prev) {
                std::cmp::Ordering::Greater => IndentStep::Increase,
                std::cmp::Ordering::Less => IndentStep::Decrease,
                std::cmp::Ordering::Equal => IndentStep::Unchanged,
            }
        })
        .collect()
}

/// Shift every non-blank line's indentation by `shift`, clamping at column 0.
/// Blank lines come out empty regardless of shift. Shifted indentation is
/// emitted as spaces.
pub fn transpose(lines: &[String], shift: isize) -> Vec<String> {
    lines
        .iter()
        .map(|line| {
            if is_blank(line) {
                String::new()
            } else {
                let width = indent_width(line) as isize + shift;
                let width = width.max(0) as usize;
                format!("{}{}", " ".repeat(width), line.trim_start())
            }
        })
        .collect()
}

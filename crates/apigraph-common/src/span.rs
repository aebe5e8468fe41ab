//! Byte-offset spans and line lookup.

use serde::{Deserialize, Serialize};

/// A half-open byte range `[start, end)` into a source file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(self) -> bool {
        self.end <= self.start
    }

    /// Slice of `source` covered by this span, or `""` when out of range.
    pub fn text(self, source: &str) -> &str {
        let start = self.start as usize;
        let end = self.end as usize;
        if start <= end && end <= source.len() && source.is_char_boundary(start) && source.is_char_boundary(end) {
            &source[start..end]
        } else {
            ""
        }
    }
}

/// Line start table for converting byte offsets to 1-based line/column pairs.
#[derive(Clone, Debug)]
pub struct LineMap {
    line_starts: Vec<u32>,
}

impl LineMap {
    pub fn build(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (idx, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(idx as u32 + 1);
            }
        }
        LineMap { line_starts }
    }

    /// 1-based `(line, column)` of `offset`.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        (line as u32 + 1, offset - self.line_starts[line] + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_text_is_bounds_checked() {
        let source = "type A = string;";
        assert_eq!(Span::new(5, 6).text(source), "A");
        assert_eq!(Span::new(5, 100).text(source), "");
        assert_eq!(Span::new(0, 4).to(Span::new(9, 15)), Span::new(0, 15));
    }

    #[test]
    fn line_map_reports_one_based_positions() {
        let map = LineMap::build("a\nbc\n\nd");
        assert_eq!(map.line_col(0), (1, 1));
        assert_eq!(map.line_col(3), (2, 2));
        assert_eq!(map.line_col(5), (3, 1));
        assert_eq!(map.line_col(6), (4, 1));
    }
}

//! Comment ranges and JSDoc extraction
//!
//! Comments are not part of the AST. The scanner records every comment it
//! skips as a [`CommentRange`]; the parser then asks for the JSDoc comment in
//! a declaration's leading trivia to attach documentation.

use serde::{Deserialize, Serialize};

/// A range representing a comment in the source text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRange {
    /// Start position (byte offset)
    pub pos: u32,
    /// End position (byte offset)
    pub end: u32,
    /// Whether this is a multi-line comment
    pub is_multi_line: bool,
    /// Whether this comment has a trailing newline
    pub has_trailing_new_line: bool,
}

impl CommentRange {
    /// Create a new comment range.
    pub fn new(pos: u32, end: u32, is_multi_line: bool, has_trailing_new_line: bool) -> Self {
        CommentRange {
            pos,
            end,
            is_multi_line,
            has_trailing_new_line,
        }
    }

    /// Get the comment text from source.
    pub fn get_text<'a>(&self, source: &'a str) -> &'a str {
        let start = self.pos as usize;
        let end = self.end as usize;
        if end <= source.len() && start < end {
            &source[start..end]
        } else {
            ""
        }
    }
}

/// Check if a comment is a JSDoc comment (`/** ... */`, but not `/**/`).
pub fn is_jsdoc_comment(comment: &CommentRange, source: &str) -> bool {
    let text = comment.get_text(source);
    comment.is_multi_line && text.starts_with("/**") && !text.starts_with("/***") && text != "/**/"
}

/// Extract the content of a JSDoc comment (without the delimiters).
pub fn get_jsdoc_content(comment: &CommentRange, source: &str) -> String {
    let text = comment.get_text(source);
    if text.starts_with("/**") && text.ends_with("*/") && text.len() >= 5 {
        let inner = &text[3..text.len() - 2];
        // Remove leading * from each line
        inner
            .lines()
            .map(|line| {
                let trimmed = line.trim_start();
                match trimmed.strip_prefix('*') {
                    Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
                    None => trimmed,
                }
                .trim_end()
            })
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    } else {
        text.to_string()
    }
}

/// The JSDoc comment closest to `pos` within the trivia `[trivia_start, pos)`.
///
/// `comments` must be sorted by position, which is how the scanner records them.
pub fn leading_jsdoc<'c>(
    comments: &'c [CommentRange],
    trivia_start: u32,
    pos: u32,
    source: &str,
) -> Option<&'c CommentRange> {
    let idx = comments.partition_point(|c| c.end <= pos);
    comments[..idx]
        .iter()
        .rev()
        .take_while(|c| c.pos >= trivia_start)
        .find(|c| is_jsdoc_comment(c, source))
}

/// Leading documentation of a whole file.
///
/// The first comment of the file counts when it is a JSDoc comment that is
/// either tagged `@packageDocumentation`/`@module`, separated from the first
/// statement by a blank line, or followed by no statement at all.
pub fn file_jsdoc(comments: &[CommentRange], first_statement: Option<u32>, source: &str) -> Option<String> {
    let first = comments.first()?;
    if !source[..first.pos as usize].trim().is_empty() || !is_jsdoc_comment(first, source) {
        return None;
    }
    let content = get_jsdoc_content(first, source);
    let tagged = content.contains("@packageDocumentation") || content.contains("@module");
    let detached = match first_statement {
        None => true,
        Some(stmt_pos) => {
            let next = comments
                .get(1)
                .map(|c| c.pos.min(stmt_pos))
                .unwrap_or(stmt_pos);
            let gap = source.get(first.end as usize..next as usize).unwrap_or("");
            gap.matches('\n').count() >= 2
        }
    };
    if !(tagged || detached) {
        return None;
    }
    let cleaned = content
        .lines()
        .filter(|line| {
            let line = line.trim();
            line != "@packageDocumentation" && !line.starts_with("@module")
        })
        .collect::<Vec<_>>()
        .join("\n");
    Some(cleaned.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range_of(source: &str, needle: &str) -> CommentRange {
        let pos = source.find(needle).unwrap() as u32;
        CommentRange::new(pos, pos + needle.len() as u32, needle.starts_with("/*"), false)
    }

    #[test]
    fn jsdoc_content_strips_stars_and_delimiters() {
        let source = "/**\n * Adds numbers.\n *\n * @param a first\n */";
        let comment = range_of(source, source);
        assert!(is_jsdoc_comment(&comment, source));
        assert_eq!(get_jsdoc_content(&comment, source), "Adds numbers.\n\n@param a first");
    }

    #[test]
    fn plain_block_comments_are_not_jsdoc() {
        let source = "/* nope */ /**/ /*** banner ***/";
        assert!(!is_jsdoc_comment(&range_of(source, "/* nope */"), source));
        assert!(!is_jsdoc_comment(&range_of(source, "/**/"), source));
        assert!(!is_jsdoc_comment(&range_of(source, "/*** banner ***/"), source));
    }

    #[test]
    fn leading_jsdoc_picks_the_closest_comment_in_trivia() {
        let source = "/** one */\n/** two */\nexport type A = 1;";
        let comments = vec![range_of(source, "/** one */"), range_of(source, "/** two */")];
        let pos = source.find("export").unwrap() as u32;
        let found = leading_jsdoc(&comments, 0, pos, source).unwrap();
        assert_eq!(get_jsdoc_content(found, source), "two");
        let after_first = comments[0].end + 1;
        assert!(leading_jsdoc(&comments, pos, pos, source).is_none());
        assert!(leading_jsdoc(&comments, after_first, pos, source).is_some());
    }

    #[test]
    fn file_doc_requires_detachment_or_tag() {
        let attached = "/** Declares A. */\nexport type A = 1;";
        let comments = vec![range_of(attached, "/** Declares A. */")];
        assert_eq!(file_jsdoc(&comments, Some(19), attached), None);

        let detached = "/** The package. */\n\nexport type A = 1;";
        let comments = vec![range_of(detached, "/** The package. */")];
        assert_eq!(
            file_jsdoc(&comments, Some(21), detached).as_deref(),
            Some("The package.")
        );

        let tagged = "/**\n * Tagged.\n * @packageDocumentation\n */\nexport type A = 1;";
        let comments = vec![range_of(tagged, &tagged[..tagged.find("*/").unwrap() + 2])];
        let stmt = tagged.find("export").unwrap() as u32;
        assert_eq!(file_jsdoc(&comments, Some(stmt), tagged).as_deref(), Some("Tagged."));
    }
}

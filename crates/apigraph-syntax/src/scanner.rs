//! Scanner - tokenizer for the declaration surface of TypeScript sources.
//!
//! Words are always scanned as [`SyntaxKind::Identifier`]; TypeScript's
//! keywords are almost all contextual in declaration position, so the parser
//! checks the token text instead of carrying a keyword kind per word.
//!
//! `>` is never combined with a following `>` or `=`, which keeps nested type
//! argument lists (`A<B<C>>`) free of rescanning.

use apigraph_common::comments::CommentRange;
use apigraph_common::diagnostics::diagnostic_codes;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    EndOfFileToken,
    Unknown,
    Identifier,
    PrivateIdentifier,
    StringLiteral,
    NumericLiteral,
    BigIntLiteral,
    TemplateLiteral,
    OpenBraceToken,
    CloseBraceToken,
    OpenParenToken,
    CloseParenToken,
    OpenBracketToken,
    CloseBracketToken,
    DotToken,
    DotDotDotToken,
    SemicolonToken,
    CommaToken,
    LessThanToken,
    GreaterThanToken,
    EqualsToken,
    EqualsGreaterThanToken,
    QuestionToken,
    QuestionDotToken,
    ColonToken,
    BarToken,
    AmpersandToken,
    AsteriskToken,
    PlusToken,
    MinusToken,
    ExclamationToken,
    AtToken,
    SlashToken,
    /// Any other operator (`==`, `&&`, `+=`, `??`, ...). Only ever skipped.
    OperatorToken,
}

impl SyntaxKind {
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            SyntaxKind::StringLiteral
                | SyntaxKind::NumericLiteral
                | SyntaxKind::BigIntLiteral
                | SyntaxKind::TemplateLiteral
        )
    }
}

/// Text for a punctuation token, `None` for tokens that carry their own text.
pub fn punctuation_to_text(kind: SyntaxKind) -> Option<&'static str> {
    Some(match kind {
        SyntaxKind::OpenBraceToken => "{",
        SyntaxKind::CloseBraceToken => "}",
        SyntaxKind::OpenParenToken => "(",
        SyntaxKind::CloseParenToken => ")",
        SyntaxKind::OpenBracketToken => "[",
        SyntaxKind::CloseBracketToken => "]",
        SyntaxKind::DotToken => ".",
        SyntaxKind::DotDotDotToken => "...",
        SyntaxKind::SemicolonToken => ";",
        SyntaxKind::CommaToken => ",",
        SyntaxKind::LessThanToken => "<",
        SyntaxKind::GreaterThanToken => ">",
        SyntaxKind::EqualsToken => "=",
        SyntaxKind::EqualsGreaterThanToken => "=>",
        SyntaxKind::QuestionToken => "?",
        SyntaxKind::QuestionDotToken => "?.",
        SyntaxKind::ColonToken => ":",
        SyntaxKind::BarToken => "|",
        SyntaxKind::AmpersandToken => "&",
        SyntaxKind::AsteriskToken => "*",
        SyntaxKind::PlusToken => "+",
        SyntaxKind::MinusToken => "-",
        SyntaxKind::ExclamationToken => "!",
        SyntaxKind::AtToken => "@",
        SyntaxKind::SlashToken => "/",
        _ => return None,
    })
}

/// A problem found while scanning; converted to a `Diagnostic` by the parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannerDiagnostic {
    pub pos: u32,
    pub length: u32,
    pub message: &'static str,
    pub code: u32,
}

/// Snapshot of the scanner used for speculative parsing.
#[derive(Clone, Debug)]
pub struct ScannerState {
    pos: usize,
    token: SyntaxKind,
    token_start: usize,
    token_value: String,
    preceding_line_break: bool,
    template_has_substitutions: bool,
    comments_len: usize,
    diagnostics_len: usize,
}

pub struct Scanner {
    text: String,
    pos: usize,
    token: SyntaxKind,
    token_start: usize,
    token_value: String,
    preceding_line_break: bool,
    template_has_substitutions: bool,
    comments: Vec<CommentRange>,
    diagnostics: Vec<ScannerDiagnostic>,
}

fn is_identifier_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte == b'$' || byte >= 0x80
}

fn is_identifier_part(byte: u8) -> bool {
    is_identifier_start(byte) || byte.is_ascii_digit()
}

impl Scanner {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut pos = 0;
        if text.starts_with('\u{feff}') {
            pos = '\u{feff}'.len_utf8();
        }
        // Shebang trivia
        if text[pos..].starts_with("#!") {
            pos = text[pos..].find('\n').map(|nl| pos + nl).unwrap_or(text.len());
        }
        Scanner {
            text,
            pos,
            token: SyntaxKind::Unknown,
            token_start: 0,
            token_value: String::new(),
            preceding_line_break: false,
            template_has_substitutions: false,
            comments: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn source_text(&self) -> &str {
        &self.text
    }

    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    pub fn token_pos(&self) -> u32 {
        self.token_start as u32
    }

    pub fn token_end(&self) -> u32 {
        self.pos as u32
    }

    /// Cooked value: identifier name, unescaped string, digits of a number.
    pub fn token_value(&self) -> &str {
        &self.token_value
    }

    /// Source text of the current token.
    pub fn token_text(&self) -> &str {
        &self.text[self.token_start..self.pos]
    }

    pub fn has_preceding_line_break(&self) -> bool {
        self.preceding_line_break
    }

    pub fn template_has_substitutions(&self) -> bool {
        self.template_has_substitutions
    }

    pub fn comments(&self) -> &[CommentRange] {
        &self.comments
    }

    pub fn take_comments(&mut self) -> Vec<CommentRange> {
        std::mem::take(&mut self.comments)
    }

    pub fn take_diagnostics(&mut self) -> Vec<ScannerDiagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn save_state(&self) -> ScannerState {
        ScannerState {
            pos: self.pos,
            token: self.token,
            token_start: self.token_start,
            token_value: self.token_value.clone(),
            preceding_line_break: self.preceding_line_break,
            template_has_substitutions: self.template_has_substitutions,
            comments_len: self.comments.len(),
            diagnostics_len: self.diagnostics.len(),
        }
    }

    pub fn restore_state(&mut self, state: ScannerState) {
        self.pos = state.pos;
        self.token = state.token;
        self.token_start = state.token_start;
        self.token_value = state.token_value;
        self.preceding_line_break = state.preceding_line_break;
        self.template_has_substitutions = state.template_has_substitutions;
        self.comments.truncate(state.comments_len);
        self.diagnostics.truncate(state.diagnostics_len);
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    fn byte_at(&self, pos: usize) -> u8 {
        self.text.as_bytes().get(pos).copied().unwrap_or(0)
    }

    fn error(&mut self, pos: usize, length: usize, message: &'static str, code: u32) {
        self.diagnostics.push(ScannerDiagnostic {
            pos: pos as u32,
            length: length as u32,
            message,
            code,
        });
    }

    /// Scan the next token, skipping trivia and recording comments.
    pub fn scan(&mut self) -> SyntaxKind {
        self.preceding_line_break = false;
        self.template_has_substitutions = false;
        self.token_value.clear();
        let len = self.text.len();

        loop {
            self.token_start = self.pos;
            if self.pos >= len {
                self.token = SyntaxKind::EndOfFileToken;
                return self.token;
            }

            let ch = self.byte_at(self.pos);
            let next = self.byte_at(self.pos + 1);
            match ch {
                b'\n' | b'\r' => {
                    self.preceding_line_break = true;
                    self.pos += 1;
                }
                b' ' | b'\t' | 0x0b | 0x0c => self.pos += 1,
                b'/' if next == b'/' => self.scan_single_line_comment(),
                b'/' if next == b'*' => self.scan_multi_line_comment(),
                _ => {
                    self.token = self.scan_token(ch, next);
                    return self.token;
                }
            }
        }
    }

    fn scan_single_line_comment(&mut self) {
        let start = self.pos;
        let bytes = self.text.as_bytes();
        let mut pos = start + 2;
        while pos < bytes.len() && bytes[pos] != b'\n' && bytes[pos] != b'\r' {
            pos += 1;
        }
        self.pos = pos;
        let has_trailing_new_line = pos < bytes.len();
        self.comments.push(CommentRange::new(
            start as u32,
            pos as u32,
            false,
            has_trailing_new_line,
        ));
    }

    fn scan_multi_line_comment(&mut self) {
        let start = self.pos;
        let end = match self.text[start + 2..].find("*/") {
            Some(offset) => start + 2 + offset + 2,
            None => {
                self.error(start, 2, "'*/' expected.", diagnostic_codes::UNTERMINATED_COMMENT);
                self.text.len()
            }
        };
        if self.text[start..end].contains('\n') {
            self.preceding_line_break = true;
        }
        self.pos = end;
        let next = self.byte_at(end);
        self.comments.push(CommentRange::new(
            start as u32,
            end as u32,
            true,
            next == b'\n' || next == b'\r',
        ));
    }

    fn scan_token(&mut self, ch: u8, next: u8) -> SyntaxKind {
        let start = self.pos;
        let single = |scanner: &mut Scanner, kind: SyntaxKind| {
            scanner.pos += 1;
            kind
        };
        match ch {
            b'{' => single(self, SyntaxKind::OpenBraceToken),
            b'}' => single(self, SyntaxKind::CloseBraceToken),
            b'(' => single(self, SyntaxKind::OpenParenToken),
            b')' => single(self, SyntaxKind::CloseParenToken),
            b'[' => single(self, SyntaxKind::OpenBracketToken),
            b']' => single(self, SyntaxKind::CloseBracketToken),
            b';' => single(self, SyntaxKind::SemicolonToken),
            b',' => single(self, SyntaxKind::CommaToken),
            b':' => single(self, SyntaxKind::ColonToken),
            b'@' => single(self, SyntaxKind::AtToken),
            b'<' => single(self, SyntaxKind::LessThanToken),
            b'>' => single(self, SyntaxKind::GreaterThanToken),
            b'\'' | b'"' => self.scan_string(ch),
            b'`' => self.scan_template(),
            b'0'..=b'9' => self.scan_number(),
            b'.' if next.is_ascii_digit() => self.scan_number(),
            b'.' => {
                if next == b'.' && self.byte_at(start + 2) == b'.' {
                    self.pos += 3;
                    SyntaxKind::DotDotDotToken
                } else {
                    single(self, SyntaxKind::DotToken)
                }
            }
            b'=' => match next {
                b'>' => {
                    self.pos += 2;
                    SyntaxKind::EqualsGreaterThanToken
                }
                b'=' => self.scan_operator(),
                _ => single(self, SyntaxKind::EqualsToken),
            },
            b'!' if next == b'=' => self.scan_operator(),
            b'!' => single(self, SyntaxKind::ExclamationToken),
            b'?' if next == b'.' && !self.byte_at(start + 2).is_ascii_digit() => {
                self.pos += 2;
                SyntaxKind::QuestionDotToken
            }
            b'?' if next == b'?' => self.scan_operator(),
            b'?' => single(self, SyntaxKind::QuestionToken),
            b'|' if next == b'|' || next == b'=' => self.scan_operator(),
            b'|' => single(self, SyntaxKind::BarToken),
            b'&' if next == b'&' || next == b'=' => self.scan_operator(),
            b'&' => single(self, SyntaxKind::AmpersandToken),
            b'*' if next == b'*' || next == b'=' => self.scan_operator(),
            b'*' => single(self, SyntaxKind::AsteriskToken),
            b'+' if next == b'+' || next == b'=' => self.scan_operator(),
            b'+' => single(self, SyntaxKind::PlusToken),
            b'-' if next == b'-' || next == b'=' => self.scan_operator(),
            b'-' => single(self, SyntaxKind::MinusToken),
            b'/' if next == b'=' => self.scan_operator(),
            b'/' => single(self, SyntaxKind::SlashToken),
            b'%' | b'^' | b'~' => self.scan_operator(),
            b'#' if is_identifier_start(next) => {
                self.pos += 1;
                self.scan_identifier_rest();
                self.token_value = self.text[start..self.pos].to_string();
                SyntaxKind::PrivateIdentifier
            }
            _ if is_identifier_start(ch) => {
                self.scan_identifier_rest();
                self.token_value = self.text[start..self.pos].to_string();
                SyntaxKind::Identifier
            }
            _ => {
                let width = self.text[start..].chars().next().map_or(1, char::len_utf8);
                self.pos += width;
                self.error(start, width, "Invalid character.", diagnostic_codes::INVALID_CHARACTER);
                SyntaxKind::Unknown
            }
        }
    }

    fn scan_identifier_rest(&mut self) {
        while self.pos < self.text.len() && is_identifier_part(self.byte_at(self.pos)) {
            self.pos += 1;
        }
    }

    /// Greedily consume operator characters; the result is only ever skipped.
    fn scan_operator(&mut self) -> SyntaxKind {
        self.pos += 1;
        while matches!(
            self.byte_at(self.pos),
            b'=' | b'&' | b'|' | b'?' | b'*' | b'+' | b'-'
        ) && self.pos - self.token_start < 4
        {
            self.pos += 1;
        }
        SyntaxKind::OperatorToken
    }

    fn scan_string(&mut self, quote: u8) -> SyntaxKind {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        loop {
            if self.pos >= self.text.len() {
                self.error(
                    start,
                    self.pos - start,
                    "Unterminated string literal.",
                    diagnostic_codes::UNTERMINATED_STRING_LITERAL,
                );
                break;
            }
            let ch = self.byte_at(self.pos);
            if ch == quote {
                self.pos += 1;
                break;
            }
            if ch == b'\n' || ch == b'\r' {
                self.error(
                    start,
                    self.pos - start,
                    "Unterminated string literal.",
                    diagnostic_codes::UNTERMINATED_STRING_LITERAL,
                );
                break;
            }
            if ch == b'\\' {
                self.pos += 1;
                self.scan_escape(&mut value);
                continue;
            }
            let c = self.text[self.pos..].chars().next().unwrap_or('\0');
            value.push(c);
            self.pos += c.len_utf8();
        }
        self.token_value = value;
        SyntaxKind::StringLiteral
    }

    fn scan_escape(&mut self, value: &mut String) {
        let ch = self.byte_at(self.pos);
        self.pos += 1;
        match ch {
            b'n' => value.push('\n'),
            b'r' => value.push('\r'),
            b't' => value.push('\t'),
            b'b' => value.push('\u{8}'),
            b'f' => value.push('\u{c}'),
            b'v' => value.push('\u{b}'),
            b'0' => value.push('\0'),
            // Line continuation
            b'\r' => {
                if self.byte_at(self.pos) == b'\n' {
                    self.pos += 1;
                }
            }
            b'\n' => {}
            b'x' => {
                let digits = self.text.get(self.pos..self.pos + 2).unwrap_or("");
                if let Some(c) = u32::from_str_radix(digits, 16).ok().and_then(char::from_u32) {
                    value.push(c);
                    self.pos += 2;
                }
            }
            b'u' => {
                let code = if self.byte_at(self.pos) == b'{' {
                    let close = self.text[self.pos..].find('}').map(|i| self.pos + i);
                    close.and_then(|close| {
                        let code = u32::from_str_radix(&self.text[self.pos + 1..close], 16).ok();
                        self.pos = close + 1;
                        code
                    })
                } else {
                    let digits = self.text.get(self.pos..self.pos + 4).unwrap_or("");
                    let code = u32::from_str_radix(digits, 16).ok();
                    if code.is_some() {
                        self.pos += 4;
                    }
                    code
                };
                if let Some(c) = code.and_then(char::from_u32) {
                    value.push(c);
                }
            }
            0 => {}
            _ => {
                // Identity escape; re-read the full character for non-ASCII input.
                self.pos -= 1;
                let c = self.text[self.pos..].chars().next().unwrap_or('\0');
                value.push(c);
                self.pos += c.len_utf8();
            }
        }
    }

    /// Scan a template literal, skipping over `${ ... }` substitutions
    /// (including nested strings and templates). The value is the raw text
    /// between the backticks.
    fn scan_template(&mut self) -> SyntaxKind {
        let start = self.pos;
        self.pos += 1;
        let terminated = self.skip_template_body();
        if !terminated {
            self.error(
                start,
                self.pos - start,
                "Unterminated template literal.",
                diagnostic_codes::UNTERMINATED_STRING_LITERAL,
            );
        }
        let end = if terminated { self.pos - 1 } else { self.pos };
        self.token_value = self.text[start + 1..end].to_string();
        SyntaxKind::TemplateLiteral
    }

    /// Consume template text up to and including the closing backtick.
    fn skip_template_body(&mut self) -> bool {
        while self.pos < self.text.len() {
            match self.byte_at(self.pos) {
                b'`' => {
                    self.pos += 1;
                    return true;
                }
                b'\\' => self.pos += 2,
                b'$' if self.byte_at(self.pos + 1) == b'{' => {
                    self.template_has_substitutions = true;
                    self.pos += 2;
                    self.skip_substitution();
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.text.len());
        false
    }

    fn skip_substitution(&mut self) {
        let mut depth = 1u32;
        while self.pos < self.text.len() {
            match self.byte_at(self.pos) {
                b'{' => {
                    depth += 1;
                    self.pos += 1;
                }
                b'}' => {
                    depth -= 1;
                    self.pos += 1;
                    if depth == 0 {
                        return;
                    }
                }
                quote @ (b'\'' | b'"') => {
                    let saved = std::mem::take(&mut self.token_value);
                    self.scan_string(quote);
                    self.token_value = saved;
                }
                b'`' => {
                    self.pos += 1;
                    self.skip_template_body();
                }
                _ => self.pos += 1,
            }
        }
    }

    fn scan_number(&mut self) -> SyntaxKind {
        let start = self.pos;
        let bytes = self.text.as_bytes();
        let len = bytes.len();
        let radix_prefix = self.byte_at(start) == b'0'
            && matches!(self.byte_at(start + 1), b'x' | b'X' | b'o' | b'O' | b'b' | b'B');

        if radix_prefix {
            self.pos += 2;
            while self.pos < len && (bytes[self.pos].is_ascii_hexdigit() || bytes[self.pos] == b'_') {
                self.pos += 1;
            }
        } else {
            while self.pos < len && (bytes[self.pos].is_ascii_digit() || bytes[self.pos] == b'_') {
                self.pos += 1;
            }
            if self.pos < len && bytes[self.pos] == b'.' {
                self.pos += 1;
                while self.pos < len && (bytes[self.pos].is_ascii_digit() || bytes[self.pos] == b'_') {
                    self.pos += 1;
                }
            }
            if self.pos < len && matches!(bytes[self.pos], b'e' | b'E') {
                let mut look = self.pos + 1;
                if look < len && matches!(bytes[look], b'+' | b'-') {
                    look += 1;
                }
                if look < len && bytes[look].is_ascii_digit() {
                    self.pos = look;
                    while self.pos < len && bytes[self.pos].is_ascii_digit() {
                        self.pos += 1;
                    }
                }
            }
        }

        let digits: String = self.text[start..self.pos].chars().filter(|c| *c != '_').collect();
        if self.pos < len && bytes[self.pos] == b'n' {
            self.pos += 1;
            self.token_value = digits;
            return SyntaxKind::BigIntLiteral;
        }
        self.token_value = digits;
        SyntaxKind::NumericLiteral
    }
}

/// Numeric value of a numeric literal's cooked text (`0x1F`, `1e3`, `.5`).
pub fn parse_numeric_value(text: &str) -> f64 {
    let lower = text.to_ascii_lowercase();
    let radix = match lower.get(..2) {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };
    match radix {
        Some(radix) => u64::from_str_radix(&lower[2..], radix)
            .map(|v| v as f64)
            .unwrap_or(f64::NAN),
        None => lower.parse::<f64>().unwrap_or(f64::NAN),
    }
}

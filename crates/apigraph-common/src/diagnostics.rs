//! Diagnostics reported while parsing and binding.
//!
//! Diagnostics never abort a run: the parser recovers and the binder skips
//! what it cannot resolve. They are surfaced so callers can log or display them.

use serde::Serialize;
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Message,
}

/// Diagnostic codes, numbered after the TypeScript messages they mirror.
pub mod diagnostic_codes {
    pub const UNTERMINATED_STRING_LITERAL: u32 = 1002;
    pub const IDENTIFIER_EXPECTED: u32 = 1003;
    pub const TOKEN_EXPECTED: u32 = 1005;
    pub const UNTERMINATED_COMMENT: u32 = 1010;
    pub const INVALID_CHARACTER: u32 = 1127;
    pub const DECLARATION_OR_STATEMENT_EXPECTED: u32 = 1128;
    pub const TYPE_EXPECTED: u32 = 1110;
    pub const UNSUPPORTED_SYNTAX: u32 = 1200;
    pub const CANNOT_FIND_MODULE: u32 = 2307;
    pub const MODULE_HAS_NO_EXPORTED_MEMBER: u32 = 2305;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
}

impl Diagnostic {
    pub fn error(
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            code,
            file: file.into(),
            start,
            length,
            message_text: message.into(),
        }
    }

    pub fn warning(
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            category: DiagnosticCategory::Warning,
            ..Self::error(file, start, length, message, code)
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let category = match self.category {
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Message => "message",
        };
        write!(
            f,
            "{}({}): {} TS{}: {}",
            self.file, self.start, category, self.code, self.message_text
        )
    }
}

pub fn format_message(message: &str, args: &[&str]) -> String {
    let mut result = message.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_location_and_code() {
        let diag = Diagnostic::error(
            "src/index.ts",
            12,
            1,
            format_message("'{0}' expected.", &[";"]),
            diagnostic_codes::TOKEN_EXPECTED,
        );
        assert_eq!(diag.to_string(), "src/index.ts(12): error TS1005: ';' expected.");
    }

    #[test]
    fn warning_keeps_payload() {
        let diag = Diagnostic::warning("a.ts", 0, 3, "odd", 1200);
        assert_eq!(diag.category, DiagnosticCategory::Warning);
        assert_eq!(diag.length, 3);
        assert_eq!(serde_json::to_value(&diag).unwrap()["code"], 1200);
    }
}

//! rsharp_diagnostics: diagnostic messages and error reporting.
//!
//! Diagnostics carry a source location, a stable numeric code, and a
//! resolved message. The message catalog is fixed; downstream tooling
//! matches on the exact message text (e.g. `; expected`,
//! `invalid NamespaceMemberDecl`), so the templates here are preserved
//! verbatim.

use rsharp_core::Location;
use std::fmt;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message template with a code and category. Templates may
/// contain `{0}`, `{1}`, ... placeholders.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

/// A realized diagnostic with location information and resolved text.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub location: Location,
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message_text: String,
}

impl Diagnostic {
    pub fn new(location: Location, message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            location,
            code: message.code,
            category: message.category,
            message_text: format_message(message.message, args),
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{}): {} RS{:04}: {}",
            self.location.line, self.location.column, self.category, self.code, self.message_text
        )
    }
}

/// Format a message template by replacing `{0}`, `{1}`, ... with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// A collection of diagnostics accumulated during lexing and parsing.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn report(&mut self, location: Location, message: &DiagnosticMessage, args: &[&str]) {
        self.add(Diagnostic::new(location, message, args));
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }

    /// Sort diagnostics by source location, preserving report order for
    /// diagnostics at the same location.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by_key(|d| d.location);
    }
}

// ============================================================================
// Message catalog
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage {
                code: $code,
                category: DiagnosticCategory::Error,
                message: $msg,
            }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage {
                code: $code,
                category: DiagnosticCategory::Warning,
                message: $msg,
            }
        };
    }

    // ========================================================================
    // Lexical errors (1000-1099)
    // ========================================================================
    pub const UNTERMINATED_STRING_LITERAL: DiagnosticMessage =
        diag!(1002, Error, "unterminated string literal");
    pub const UNTERMINATED_CHAR_LITERAL: DiagnosticMessage =
        diag!(1003, Error, "unterminated character literal");
    pub const EMPTY_CHAR_LITERAL: DiagnosticMessage =
        diag!(1004, Error, "empty character literal");
    pub const INVALID_ESCAPE_SEQUENCE: DiagnosticMessage =
        diag!(1005, Error, "invalid escape sequence '{0}'");
    pub const INVALID_NUMBER: DiagnosticMessage = diag!(1006, Error, "invalid number '{0}'");
    pub const INVALID_CHARACTER: DiagnosticMessage = diag!(1007, Error, "invalid character '{0}'");
    pub const UNTERMINATED_COMMENT: DiagnosticMessage =
        diag!(1008, Error, "unterminated block comment");
    pub const UNMATCHED_BLOCK: DiagnosticMessage =
        diag!(1009, Error, "unmatched '{' before end of file");

    // ========================================================================
    // Syntax errors (1100-1199)
    // ========================================================================

    /// Expected-token family. `{0}` is the display text of the token kind
    /// (`;`, `ident`, `)` ...), so the realized text reads `; expected`.
    pub const TOKEN_EXPECTED: DiagnosticMessage = diag!(1100, Error, "{0} expected");

    /// Alternative-exhausted family. `{0}` names the production, so the
    /// realized text reads e.g. `invalid NamespaceMemberDecl`.
    pub const INVALID_PRODUCTION: DiagnosticMessage = diag!(1101, Error, "invalid {0}");

    /// Contextual-keyword family: an identifier was found where a specific
    /// spelling was required (`get`, `set`, `where`, `assembly`, ...).
    pub const CONTEXTUAL_KEYWORD_EXPECTED: DiagnosticMessage =
        diag!(1102, Error, "\"{0}\" expected");

    // ========================================================================
    // Parse-time semantic errors (1200-1299)
    // ========================================================================
    pub const DUPLICATE_MODIFIER: DiagnosticMessage =
        diag!(1200, Error, "modifier \"{0}\" already present");
    pub const MODIFIER_NOT_ALLOWED: DiagnosticMessage =
        diag!(1201, Error, "modifier(s) \"{0}\" not allowed here");
    pub const PARAMS_MUST_BE_LAST: DiagnosticMessage =
        diag!(1202, Error, "params array must be the last parameter");
    pub const POSITIONAL_AFTER_NAMED: DiagnosticMessage = diag!(
        1203,
        Error,
        "positional argument cannot follow named argument"
    );
    pub const FIXED_REQUIRES_POINTER: DiagnosticMessage =
        diag!(1204, Error, "the type of a fixed statement must be a pointer type");
    pub const VOID_CANNOT_BE_NULLABLE: DiagnosticMessage =
        diag!(1205, Error, "void cannot be nullable");
    pub const NO_INDEXER_ON_ARRAY_CREATION: DiagnosticMessage =
        diag!(1206, Error, "element access not allowed on array creation");
    pub const DUPLICATE_ACCESSOR: DiagnosticMessage =
        diag!(1207, Error, "accessor \"{0}\" already declared");
    pub const INVALID_ATTRIBUTE_TARGET: DiagnosticMessage =
        diag!(1208, Error, "invalid attribute target \"{0}\"");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_formatting() {
        let d = Diagnostic::new(
            Location::new(3, 14),
            &messages::TOKEN_EXPECTED,
            &[";"],
        );
        assert_eq!(d.message_text, "; expected");
        assert_eq!(d.to_string(), "(3,14): error RS1100: ; expected");
    }

    #[test]
    fn invalid_production_message() {
        let d = Diagnostic::new(
            Location::new(1, 1),
            &messages::INVALID_PRODUCTION,
            &["NamespaceMemberDecl"],
        );
        assert_eq!(d.message_text, "invalid NamespaceMemberDecl");
    }

    #[test]
    fn sort_is_stable_per_location() {
        let mut coll = DiagnosticCollection::new();
        coll.report(Location::new(2, 1), &messages::TOKEN_EXPECTED, &["}"]);
        coll.report(Location::new(1, 1), &messages::TOKEN_EXPECTED, &["("]);
        coll.report(Location::new(1, 1), &messages::TOKEN_EXPECTED, &[")"]);
        coll.sort();
        let msgs: Vec<_> = coll.diagnostics().iter().map(|d| d.message_text.as_str()).collect();
        assert_eq!(msgs, vec!["( expected", ") expected", "} expected"]);
    }
}

use thiserror::Error;

/// What went wrong while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParserErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("invalid section name `{0}`")]
    InvalidSectionName(String),

    /// The section being declared is the one already active.
    #[error("redefinition of section {0}")]
    SectionRedefinition(String),

    #[error("statement found before any section")]
    StatementBeforeSection,

    /// A label followed directly by a `section` directive.
    #[error("illegal instruction")]
    IllegalInstruction,

    #[error("data does not have a symbol")]
    MissingDataSymbol,

    #[error("invalid character `{0}` in operand")]
    InvalidOperandCharacter(char),
}

/// A parsing error with source location.
///
/// `line` is 1-based and `col` is a 0-based byte offset into the line, both
/// taken from the parser cursor when the error was raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{col}: {kind}")]
pub struct ParserError {
    pub kind: ParserErrorKind,
    pub line: usize,
    pub col: usize,
}

impl ParserError {
    pub fn new(kind: ParserErrorKind, line: usize, col: usize) -> Self {
        ParserError { kind, line, col }
    }

    /// The message without location, e.g. `redefinition of section .text`.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_line_col_message() {
        let err = ParserError::new(ParserErrorKind::SectionRedefinition(".text".into()), 3, 13);
        assert_eq!(err.to_string(), "3:13: redefinition of section .text");
    }

    #[test]
    fn test_message_omits_location() {
        let err = ParserError::new(ParserErrorKind::InvalidOperandCharacter('$'), 1, 4);
        assert_eq!(err.message(), "invalid character `$` in operand");
    }
}

use crate::parser_error::{ParserError, ParserErrorKind};

/// Character codes the parser classifies on.
///
/// Every code here is ASCII, so a byte comparison never lands inside a
/// multi-byte UTF-8 sequence.
pub mod ccode {
    pub const LF: u8 = b'\n';
    pub const CR: u8 = b'\r';
    pub const SPACE: u8 = b' ';
    pub const SINGLE_QUOTE: u8 = b'\'';
    pub const DOUBLE_QUOTE: u8 = b'"';
    pub const BACK_SLASH: u8 = b'\\';
    pub const SEMI_COLON: u8 = b';';
    pub const SHARP: u8 = b'#';
    pub const SLASH: u8 = b'/';

    /// Whitespace as far as word boundaries are concerned.
    ///
    /// Tabs are deliberately not in this set.
    pub fn is_whitespace(code: u8) -> bool {
        matches!(code, SPACE | LF | CR)
    }
}

/// A line/column pair. Lines are 1-based, columns are 0-based byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

/// Tracks where the parser is in an immutable source buffer.
///
/// The cursor starts *before* the first character (`index == -1`); callers
/// read the character at [`Cursor::index`] only after a successful
/// [`Cursor::advance`].
#[derive(Debug, Clone)]
pub struct Cursor {
    index: isize,
    len: usize,
    line: usize,
    col: isize,
}

impl Cursor {
    pub fn new(len: usize) -> Self {
        Cursor {
            index: -1,
            len,
            line: 1,
            col: -1,
        }
    }

    pub fn index(&self) -> isize {
        self.index
    }

    /// The current index as a buffer offset; `0` while still before the start.
    pub fn offset(&self) -> usize {
        usize::try_from(self.index).unwrap_or(0)
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn col(&self) -> usize {
        usize::try_from(self.col).unwrap_or(0)
    }

    pub fn position(&self) -> Position {
        Position {
            line: self.line(),
            col: self.col(),
        }
    }

    /// Moves one character forward.
    ///
    /// `current` is the character the cursor is leaving; a line-feed bumps the
    /// line counter. Returns whether the new index is still inside the buffer.
    /// With `fail_on_eof` set, running off the end is an `UnexpectedEof` error
    /// reported at the position held before this call.
    pub fn advance(&mut self, current: Option<u8>, fail_on_eof: bool) -> Result<bool, ParserError> {
        let before = self.position();

        if current == Some(ccode::LF) {
            self.line += 1;
            self.col = -1;
        }

        self.index += 1;
        self.col += 1;

        let in_bounds = self.offset() < self.len;

        if fail_on_eof && !in_bounds {
            return Err(ParserError::new(
                ParserErrorKind::UnexpectedEof,
                before.line,
                before.col,
            ));
        }

        Ok(in_bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_starts_before_input() {
        let cursor = Cursor::new(3);
        assert_eq!(cursor.index(), -1);
        assert_eq!(cursor.line(), 1);
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn test_first_advance_lands_on_column_zero() {
        let mut cursor = Cursor::new(3);
        assert!(cursor.advance(None, false).unwrap());
        assert_eq!(cursor.index(), 0);
        assert_eq!(cursor.position(), Position { line: 1, col: 0 });
    }

    #[test]
    fn test_line_feed_starts_new_line() {
        let source = b"a\nb";
        let mut cursor = Cursor::new(source.len());
        cursor.advance(None, false).unwrap(); // 'a'
        cursor.advance(Some(source[0]), false).unwrap(); // '\n'
        assert_eq!(cursor.position(), Position { line: 1, col: 1 });
        cursor.advance(Some(source[1]), false).unwrap(); // 'b'
        assert_eq!(cursor.position(), Position { line: 2, col: 0 });
    }

    #[test]
    fn test_eof_without_failure() {
        let mut cursor = Cursor::new(1);
        assert!(cursor.advance(None, false).unwrap());
        assert!(!cursor.advance(Some(b'x'), false).unwrap());
        assert_eq!(cursor.offset(), 1);
    }

    #[test]
    fn test_eof_failure_reports_pre_advance_position() {
        let mut cursor = Cursor::new(2);
        cursor.advance(None, true).unwrap();
        cursor.advance(Some(b'a'), true).unwrap();

        let err = cursor.advance(Some(b'b'), true).unwrap_err();
        assert_eq!(err.kind, ParserErrorKind::UnexpectedEof);
        assert_eq!((err.line, err.col), (1, 1));
    }

    #[test]
    fn test_whitespace_classification() {
        assert!(ccode::is_whitespace(b' '));
        assert!(ccode::is_whitespace(b'\n'));
        assert!(ccode::is_whitespace(b'\r'));
        assert!(!ccode::is_whitespace(b'\t'));
        assert!(!ccode::is_whitespace(b'a'));
    }
}

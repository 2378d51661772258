use crate::ast::{Program, Range, Section};
use crate::lexer::{Cursor, ccode};
use crate::parser_error::{ParserError, ParserErrorKind};
use tracing::{debug, trace};

/// A word read from the source together with where it came from.
struct Word<'src> {
    text: &'src str,
    range: Range,
}

/// Section-aware parser for assembly source.
///
/// The parser walks the source one character at a time with a [`Cursor`] and
/// produces a [`Program`]:
/// - `section .text` / `section .data` switch the active section
/// - in `.text`, a line is `[label:] name operand*`
/// - in `.data`, an entry is `label: value`, where the value is a bare word or
///   a quoted string that may span lines
///
/// Comments start with `#`, `;` or `//` and run to the end of the line. They
/// are only recognized where a statement could start.
///
/// Nothing is copied out of the source; the tree holds [`Range`]s.
pub struct Parser<'src> {
    source: &'src str,
    cursor: Cursor,
    program: Program,
    section: Option<Section>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Parser {
            source,
            cursor: Cursor::new(source.len()),
            program: Program::new(),
            section: None,
        }
    }

    /// Parses the whole source.
    ///
    /// Errors are fatal: there is no recovery, and the partially built tree is
    /// discarded.
    pub fn parse(&mut self) -> Result<Program, ParserError> {
        while self.advance_char()? {
            match self.current() {
                Some(code) if ccode::is_whitespace(code) => {}

                // Single line comment
                Some(ccode::SHARP | ccode::SEMI_COLON) => self.skip_line(false)?,
                Some(ccode::SLASH) => {
                    if self.byte_at(-1) == Some(ccode::SLASH) {
                        self.skip_line(false)?;
                    }
                }

                _ => self.parse_word()?,
            }
        }

        debug!(
            text = self.program.text_section.len(),
            data = self.program.data_section.len(),
            "parsed program"
        );

        Ok(std::mem::take(&mut self.program))
    }

    // Character access

    fn byte_at(&self, delta: isize) -> Option<u8> {
        let index = usize::try_from(self.cursor.index() + delta).ok()?;
        self.source.as_bytes().get(index).copied()
    }

    fn current(&self) -> Option<u8> {
        self.byte_at(0)
    }

    fn current_is_whitespace(&self) -> bool {
        self.current().is_some_and(ccode::is_whitespace)
    }

    fn advance(&mut self, fail_on_eof: bool) -> Result<bool, ParserError> {
        let current = self.current();
        self.cursor.advance(current, fail_on_eof)
    }

    /// Moves to the start of the next character, stepping over the
    /// continuation bytes of a multi-byte one. Never fails at EOF.
    fn advance_char(&mut self) -> Result<bool, ParserError> {
        let mut in_bounds = self.advance(false)?;
        while in_bounds && !self.source.is_char_boundary(self.cursor.offset()) {
            in_bounds = self.advance(false)?;
        }
        Ok(in_bounds)
    }

    fn error(&self, kind: ParserErrorKind) -> ParserError {
        ParserError::new(kind, self.cursor.line(), self.cursor.col())
    }

    // Skipping

    fn skip_whitespace(&mut self, fail_on_eof: bool) -> Result<(), ParserError> {
        while self.current_is_whitespace() && self.advance(fail_on_eof)? {}
        Ok(())
    }

    fn skip_while(&mut self, code: u8, fail_on_eof: bool) -> Result<(), ParserError> {
        while self.current() == Some(code) && self.advance(fail_on_eof)? {}
        Ok(())
    }

    fn skip_to_whitespace(&mut self, fail_on_eof: bool) -> Result<(), ParserError> {
        while self.current().is_some_and(|code| !ccode::is_whitespace(code))
            && self.advance(fail_on_eof)?
        {}
        Ok(())
    }

    fn skip_line(&mut self, fail_on_eof: bool) -> Result<(), ParserError> {
        while self.current().is_some_and(|code| code != ccode::LF) && self.advance(fail_on_eof)? {}
        Ok(())
    }

    /// Skips a quoted string starting at the opening `quote` and leaves the
    /// cursor just past the closing one. A quote preceded by `\` does not
    /// close the string; line-feeds inside are ordinary characters.
    fn skip_string(&mut self, quote: u8) -> Result<(), ParserError> {
        while self.advance(true)? {
            if self.current() == Some(quote) && self.byte_at(-1) != Some(ccode::BACK_SLASH) {
                break;
            }
        }
        self.advance(false)?;
        Ok(())
    }

    // Words

    /// Reads the next whitespace-delimited word, skipping leading whitespace
    /// (line-feeds included). With `fail_on_eof`, finding no word at all is an
    /// error.
    fn read_word(&mut self, fail_on_eof: bool) -> Result<Word<'src>, ParserError> {
        self.skip_whitespace(fail_on_eof)?;

        let mut range = Range::starting_at(self.cursor.offset());
        // a word may end at EOF
        self.skip_to_whitespace(false)?;
        range.extend_upper_bound(self.cursor.offset());

        if fail_on_eof && range.is_empty() {
            return Err(self.error(ParserErrorKind::UnexpectedEof));
        }

        Ok(Word {
            text: range.slice(self.source),
            range,
        })
    }

    /// Reads the rest of the current line and splits it into operand ranges.
    fn read_words_till_eol(&mut self) -> Result<Vec<Range>, ParserError> {
        self.skip_while(ccode::SPACE, false)?;

        let mut line = Range::starting_at(self.cursor.offset());
        self.skip_line(false)?;
        line.extend_upper_bound(self.cursor.offset());

        let text = line.slice(self.source);
        let mut operands = Vec::new();
        let mut start = None;

        for (index, ch) in text.char_indices().chain(std::iter::once((text.len(), ' '))) {
            match (ch.is_whitespace(), start) {
                (true, Some(from)) => {
                    operands.push(self.operand(line.lower() + from, &text[from..index])?);
                    start = None;
                }
                (false, None) => start = Some(index),
                _ => {}
            }
        }

        Ok(operands)
    }

    /// Validates one operand token starting at byte `at`.
    ///
    /// The cursor sits at the end of the operand's line, so the column of a bad
    /// character is found by walking back from the cursor.
    fn operand(&self, at: usize, token: &str) -> Result<Range, ParserError> {
        if let Some((offset, bad)) = token.char_indices().find(|(_, ch)| !is_operand_char(*ch)) {
            let distance = self.cursor.offset().saturating_sub(at + offset);
            return Err(ParserError::new(
                ParserErrorKind::InvalidOperandCharacter(bad),
                self.cursor.line(),
                self.cursor.col().saturating_sub(distance),
            ));
        }

        Ok(Range::new(at, at + token.len()))
    }

    // Statements

    fn parse_word(&mut self) -> Result<(), ParserError> {
        let word = self.read_word(false)?;

        if word.text == "section" {
            return self.parse_section_name();
        }

        match self.section {
            None => Err(self.error(ParserErrorKind::StatementBeforeSection)),
            Some(Section::Text) => self.parse_instruction(word),
            Some(Section::Data) => self.parse_data(word),
        }
    }

    fn parse_section_name(&mut self) -> Result<(), ParserError> {
        let word = self.read_word(true)?;

        let Some(section) = Section::from_name(word.text) else {
            return Err(self.error(ParserErrorKind::InvalidSectionName(word.text.to_string())));
        };

        // Already in that section
        if self.section == Some(section) {
            return Err(self.error(ParserErrorKind::SectionRedefinition(word.text.to_string())));
        }

        trace!(line = self.cursor.line(), %section, "section");
        self.section = Some(section);
        Ok(())
    }

    fn parse_instruction(&mut self, word: Word<'src>) -> Result<(), ParserError> {
        let (symbol, name) = if word.text.ends_with(':') {
            let name = self.read_word(true)?;

            if name.text == "section" {
                return Err(self.error(ParserErrorKind::IllegalInstruction));
            }

            (Some(word.range.trim_end(1)), name.range)
        } else {
            (None, word.range)
        };

        let args = self.read_words_till_eol()?;
        let (line, col) = (self.cursor.line(), self.cursor.col());

        trace!(line, col, name = name.slice(self.source), args = args.len(), "instruction");
        self.program.push_instruction(name, args, symbol, line, col);
        Ok(())
    }

    fn parse_data(&mut self, word: Word<'src>) -> Result<(), ParserError> {
        if !word.text.ends_with(':') {
            return Err(self.error(ParserErrorKind::MissingDataSymbol));
        }

        self.skip_whitespace(true)?;

        let mut data = Range::starting_at(self.cursor.offset());

        match self.current() {
            Some(quote @ (ccode::SINGLE_QUOTE | ccode::DOUBLE_QUOTE)) => self.skip_string(quote)?,
            Some(_) => {
                self.read_word(true)?;
            }
            None => return Err(self.error(ParserErrorKind::UnexpectedEof)),
        }

        data.extend_upper_bound(self.cursor.offset());
        let (line, col) = (self.cursor.line(), self.cursor.col());

        trace!(line, col, symbol = word.range.trim_end(1).slice(self.source), "data");
        self.program.push_data(word.range.trim_end(1), data, line, col);
        Ok(())
    }
}

fn is_operand_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

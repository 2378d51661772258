use super::range::Range;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The two kinds of program section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    Text,
    Data,
}

impl Section {
    /// Maps a directive operand (`.text` / `.data`) to its section.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            ".text" => Some(Section::Text),
            ".data" => Some(Section::Data),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Section::Text => ".text",
            Section::Data => ".data",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A labeled value in `.data`: `symbol: value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataEntry {
    /// Label without the trailing `:`.
    pub symbol: Range,
    /// Scalar word or quoted string, quotes included.
    pub data: Range,
    pub line: usize,
    pub col: usize,
}

/// One `.text` statement: `[label:] name operand*`.
///
/// `line`/`col` is where the cursor stood once the statement was fully
/// consumed (its end of line), and is what run-time traps report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub name: Range,
    pub args: Vec<Range>,
    /// Attached label without the trailing `:`.
    pub symbol: Option<Range>,
    pub line: usize,
    pub col: usize,
}

impl Instruction {
    pub fn has_symbol(&self) -> bool {
        self.symbol.is_some()
    }
}

#[derive(Debug, Error)]
#[error("program codec error: {0}")]
pub struct CodecError(pub postcard::Error);

/// Parsed program.
///
/// Built once by the parser and read-only afterwards; every range in it refers
/// to the source text it was parsed from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub data_section: Vec<DataEntry>,
    pub text_section: Vec<Instruction>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_data(&mut self, symbol: Range, data: Range, line: usize, col: usize) {
        self.data_section.push(DataEntry {
            symbol,
            data,
            line,
            col,
        });
    }

    pub fn push_instruction(
        &mut self,
        name: Range,
        args: Vec<Range>,
        symbol: Option<Range>,
        line: usize,
        col: usize,
    ) {
        self.text_section.push(Instruction {
            name,
            args,
            symbol,
            line,
            col,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.data_section.is_empty() && self.text_section.is_empty()
    }

    /// Text-section labels mapped to the index of the instruction they tag.
    ///
    /// A label defined twice resolves to its first definition.
    pub fn labels(&self, source: &str) -> HashMap<String, usize> {
        let mut labels = HashMap::new();
        for (index, instruction) in self.text_section.iter().enumerate() {
            if let Some(symbol) = &instruction.symbol {
                labels
                    .entry(symbol.slice(source).to_string())
                    .or_insert(index);
            }
        }
        labels
    }

    /// First data entry whose symbol is `symbol`.
    pub fn data<'a>(&'a self, source: &str, symbol: &str) -> Option<&'a DataEntry> {
        self.data_section
            .iter()
            .find(|entry| entry.symbol.slice(source) == symbol)
    }

    /// Encodes the tree with postcard so it can be cached alongside its source.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        postcard::to_allocvec(self).map_err(CodecError)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        postcard::from_bytes(bytes).map_err(CodecError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "start: mov a b\n       jmp start\nmsg: 'hi'";

    fn sample() -> Program {
        let mut program = Program::new();
        program.push_instruction(
            Range::new(7, 10),
            vec![Range::new(11, 12), Range::new(13, 14)],
            Some(Range::new(0, 5)),
            1,
            14,
        );
        program.push_instruction(Range::new(22, 25), vec![Range::new(26, 31)], None, 2, 16);
        program.push_data(Range::new(32, 35), Range::new(37, 41), 3, 9);
        program
    }

    #[test]
    fn test_new_program_is_empty() {
        assert!(Program::new().is_empty());
        assert!(!sample().is_empty());
    }

    #[test]
    fn test_labels_map_to_instruction_index() {
        let labels = sample().labels(SOURCE);
        assert_eq!(labels.len(), 1);
        assert_eq!(labels.get("start"), Some(&0));
    }

    #[test]
    fn test_has_symbol() {
        let program = sample();
        assert!(program.text_section[0].has_symbol());
        assert!(!program.text_section[1].has_symbol());
    }

    #[test]
    fn test_data_lookup_by_symbol() {
        let program = sample();
        let entry = program.data(SOURCE, "msg").expect("msg is defined");
        assert_eq!(entry.data.slice(SOURCE), "'hi'");
        assert!(program.data(SOURCE, "missing").is_none());
    }

    #[test]
    fn test_postcard_encoding_preserves_tree() {
        let program = sample();
        let bytes = program.to_bytes().unwrap();
        assert_eq!(Program::from_bytes(&bytes).unwrap(), program);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(Program::from_bytes(&[0xff, 0xff, 0xff]).is_err());
    }

    #[test]
    fn test_section_names() {
        assert_eq!(Section::from_name(".text"), Some(Section::Text));
        assert_eq!(Section::from_name(".data"), Some(Section::Data));
        assert_eq!(Section::from_name("text"), None);
        assert_eq!(Section::Data.to_string(), ".data");
    }
}

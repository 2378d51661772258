use crate::ast::{DataEntry, Instruction, Program};
use std::fmt::{self, Write};

/// Renders a parsed program as a listing, one entry per line, each prefixed
/// with the `[line:col]` the parser recorded for it.
pub struct TreeDumper {
    pub color: bool,
    pub show_ranges: bool, // append the byte range of every entry
}

impl Default for TreeDumper {
    fn default() -> Self {
        Self {
            color: true,
            show_ranges: false,
        }
    }
}

impl TreeDumper {
    // ANSI colors
    const RESET: &'static str = "\x1b[0m";
    const DIM: &'static str = "\x1b[2m";
    const GRN: &'static str = "\x1b[32m";
    const YEL: &'static str = "\x1b[33m";
    const CYN: &'static str = "\x1b[36m";
    const MAG: &'static str = "\x1b[35m";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn with_ranges(mut self) -> Self {
        self.show_ranges = true;
        self
    }

    pub fn dump(&self, source: &str, program: &Program) {
        print!("{}", self.render(source, program));
    }

    pub fn render(&self, source: &str, program: &Program) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = self.write_to(&mut out, source, program);
        out
    }

    pub fn write_to<W: Write>(&self, out: &mut W, source: &str, program: &Program) -> fmt::Result {
        if !program.data_section.is_empty() {
            writeln!(out, "{}section .data{}", self.paint(Self::DIM), self.reset())?;
            for entry in &program.data_section {
                self.write_data(out, source, entry)?;
            }
        }

        if !program.text_section.is_empty() {
            writeln!(out, "{}section .text{}", self.paint(Self::DIM), self.reset())?;
            for instruction in &program.text_section {
                self.write_instruction(out, source, instruction)?;
            }
        }

        Ok(())
    }

    fn write_data<W: Write>(&self, out: &mut W, source: &str, entry: &DataEntry) -> fmt::Result {
        let value = entry.data.slice(source);
        let value_color = if value.starts_with(['\'', '"']) { Self::GRN } else { Self::CYN };

        write!(
            out,
            "{}[{:02}:{:02}]{} {:<6} {}{}{}: {}{}{}",
            self.paint(Self::DIM),
            entry.line,
            entry.col,
            self.reset(),
            "DATA",
            self.paint(Self::YEL),
            entry.symbol.slice(source),
            self.reset(),
            self.paint(value_color),
            value.replace('\n', "\\n"),
            self.reset(),
        )?;

        if self.show_ranges {
            write!(out, "  @{}..{}", entry.symbol.lower(), entry.data.upper())?;
        }
        writeln!(out)
    }

    fn write_instruction<W: Write>(
        &self,
        out: &mut W,
        source: &str,
        instruction: &Instruction,
    ) -> fmt::Result {
        write!(
            out,
            "{}[{:02}:{:02}]{} {:<6} ",
            self.paint(Self::DIM),
            instruction.line,
            instruction.col,
            self.reset(),
            "INSTR",
        )?;

        if let Some(symbol) = &instruction.symbol {
            write!(out, "{}{}:{} ", self.paint(Self::YEL), symbol.slice(source), self.reset())?;
        }

        write!(out, "{}{}{}", self.paint(Self::MAG), instruction.name.slice(source), self.reset())?;

        for arg in &instruction.args {
            write!(out, " {}{}{}", self.paint(Self::CYN), arg.slice(source), self.reset())?;
        }

        if self.show_ranges {
            let lower = instruction
                .symbol
                .map_or(instruction.name.lower(), |symbol| symbol.lower());
            let upper = instruction
                .args
                .last()
                .map_or(instruction.name.upper(), |arg| arg.upper());
            write!(out, "  @{}..{}", lower, upper)?;
        }
        writeln!(out)
    }

    fn paint(&self, color: &'static str) -> &'static str {
        if self.color { color } else { "" }
    }

    fn reset(&self) -> &'static str {
        self.paint(Self::RESET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;

    fn render(source: &str, dumper: TreeDumper) -> String {
        let program = Parser::new(source).parse().unwrap();
        dumper.render(source, &program)
    }

    #[test]
    fn test_plain_listing() {
        let source = "section .data\nmsg: 'a\nb'\nsection .text\nstart: mov a b\n  nop\n";
        let expected = "\
section .data
[03:02] DATA   msg: 'a\\nb'
section .text
[05:14] INSTR  start: mov a b
[06:05] INSTR  nop
";
        assert_eq!(render(source, TreeDumper::new().no_color()), expected);
    }

    #[test]
    fn test_listing_with_ranges() {
        let source = "section .text\nloop: jmp loop\n";
        assert_eq!(
            render(source, TreeDumper::new().no_color().with_ranges()),
            "section .text\n[02:14] INSTR  loop: jmp loop  @14..28\n"
        );
    }

    #[test]
    fn test_empty_program_renders_nothing() {
        assert_eq!(render("section .text\n", TreeDumper::new()), "");
    }

    #[test]
    fn test_color_codes_only_when_enabled() {
        let source = "section .text\nnop\n";
        assert!(render(source, TreeDumper::new()).contains("\x1b[35mnop"));
        assert!(!render(source, TreeDumper::new().no_color()).contains('\x1b'));
    }
}

//! # asmstep
//!
//! A miniature assembly toolchain: a section-aware parser that turns
//! hand-written assembly into a [`Program`] tree, and a [`Processor`] that
//! single-steps the `.text` section against a host-defined instruction set.
//!
//! ```text
//! section .data
//! greeting: "Hello"
//!
//! section .text
//! ; label, name, operands
//! start: mov acc 1
//!        jmp start
//! ```
//!
//! The host describes its machine with an [`Arch`] (registers and one
//! [`Handler`] per instruction name), builds a [`Processor`] from source text,
//! and drives it with a [`Scheduler`]. Faults and completion are reported
//! through the `on_trap` / `on_finish` callbacks.

pub mod ast;
pub mod frontend;
pub mod lexer;
pub mod parser;
pub mod parser_error;
pub mod runtime;

pub use ast::{DataEntry, Instruction, Program, Range, Section};
pub use frontend::TreeDumper;
pub use parser::Parser;
pub use parser_error::{ParserError, ParserErrorKind};
pub use runtime::{
    Arch, Handler, ImmediateScheduler, IntervalScheduler, Processor, ProcessorConfig,
    ProcessorState, RegisterValue, Registers, RuntimeError, Scheduler, Value,
};

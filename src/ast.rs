//! # Program tree
//!
//! The parser produces a [`Program`]: an ordered `.data` section and an ordered
//! `.text` section. Nothing in the tree owns source text. Labels, names,
//! operands and values are [`Range`]s into the buffer the tree was parsed
//! from, materialized on demand with [`Range::slice`].

pub mod program;
pub mod range;

pub use program::{CodecError, DataEntry, Instruction, Program, Section};
pub use range::{Range, RangeError};

//! # Execution
//!
//! A [`Processor`] single-steps a parsed `.text` section against a host-defined
//! [`Arch`]: the register table it starts from and the [`Handler`] behind each
//! instruction name. Pacing is delegated to a [`Scheduler`] so the same engine
//! runs in real time or synchronously under test.

pub mod arch;
pub mod processor;
pub mod runtime_error;
pub mod scheduler;
pub mod value;

pub use arch::{Arch, Handler, IP, RegisterValue, Registers};
pub use processor::{Processor, ProcessorConfig, ProcessorState};
pub use runtime_error::RuntimeError;
pub use scheduler::{ImmediateScheduler, IntervalScheduler, Scheduler};
pub use value::Value;

use super::arch::{Arch, IP, InstructionTable, RegisterValue, Registers};
use super::runtime_error::{RuntimeError, undefined_instruction};
use super::scheduler::Scheduler;
use crate::ast::Program;
use crate::parser::Parser;
use crate::parser_error::ParserError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Delay between two ticks while running.
    pub tick_interval: Duration,
    /// Ticks allowed since the last reset before the processor traps.
    pub max_steps: Option<usize>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        ProcessorConfig {
            tick_interval: Duration::from_secs(1),
            max_steps: None,
        }
    }
}

impl ProcessorConfig {
    pub fn with_speed(ticks_per_second: u32) -> Self {
        ProcessorConfig {
            tick_interval: Duration::from_secs(1) / ticks_per_second.max(1),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    /// No ticks scheduled.
    Idle,
    /// Ticking at the configured interval.
    Running,
}

/// Fetch-decode-execute engine over a parsed `.text` section.
///
/// The processor owns the register file, the operand stack and a baseline
/// register snapshot taken at construction. Each tick fetches the instruction
/// at `ip`, hands it to the handler registered under its name, and advances
/// `ip` by one past whatever the handler left there.
///
/// Faults never escape a tick. They are reported through the trap callback and
/// stop the processor with registers and stack left as they were. Running past
/// the last instruction reports through the finish callback and resets to the
/// baseline.
pub struct Processor<V> {
    source: Arc<str>,
    program: Arc<Program>,
    registers: Registers<V>,
    saved_registers: Registers<V>,
    stack: Vec<V>,
    instructions: InstructionTable<V>,
    state: ProcessorState,
    config: ProcessorConfig,
    steps: usize,
    on_finish: Option<Box<dyn FnMut()>>,
    on_trap: Option<Box<dyn FnMut(&str)>>,
}

impl<V: RegisterValue> Processor<V> {
    /// Parses `source` and builds an idle processor with `ip = 0`.
    pub fn new(source: &str, arch: Arch<V>) -> Result<Self, ParserError> {
        Self::with_config(source, arch, ProcessorConfig::default())
    }

    pub fn with_config(
        source: &str,
        mut arch: Arch<V>,
        config: ProcessorConfig,
    ) -> Result<Self, ParserError> {
        arch.define_register(IP, V::from_ip(0));
        let program = Parser::new(source).parse()?;
        Ok(Self::assemble(Arc::from(source), Arc::new(program), arch, config))
    }

    /// Builds a processor over an already parsed program.
    ///
    /// `source` must be the exact text `program` was parsed from. Several
    /// processors may share one program.
    pub fn from_program(
        source: Arc<str>,
        program: Arc<Program>,
        mut arch: Arch<V>,
        config: ProcessorConfig,
    ) -> Self {
        arch.define_register(IP, V::from_ip(0));
        Self::assemble(source, program, arch, config)
    }

    fn assemble(
        source: Arc<str>,
        program: Arc<Program>,
        arch: Arch<V>,
        config: ProcessorConfig,
    ) -> Self {
        let (registers, instructions) = arch.into_parts();

        let mut processor = Processor {
            source,
            program,
            registers,
            saved_registers: HashMap::new(),
            stack: Vec::new(),
            instructions,
            state: ProcessorState::Idle,
            config,
            steps: 0,
            on_finish: None,
            on_trap: None,
        };

        processor.save_state();
        processor.restore_state();
        processor
    }

    fn save_state(&mut self) {
        self.saved_registers = self.registers.clone();
    }

    /// Stops, then resets registers to the baseline and clears the stack.
    pub fn restore_state(&mut self) {
        self.stop();
        self.registers = self.saved_registers.clone();
        self.stack.clear();
        self.steps = 0;
        debug!("processor state restored");
    }

    /// Cancels scheduled ticks. Registers and stack are left untouched.
    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        self.state = ProcessorState::Idle;
        debug!("processor stopped");
    }

    pub fn execute(&mut self) {
        if self.is_running() {
            return;
        }
        self.state = ProcessorState::Running;
        debug!(interval = ?self.config.tick_interval, "processor running");
    }

    /// Executes and drives the processor until it goes idle or `scheduler`
    /// cancels.
    pub fn run<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        self.execute();

        while self.is_running() {
            if !scheduler.wait(self.config.tick_interval) {
                self.stop();
                break;
            }
            self.tick();
        }
    }

    /// One scheduled tick; does nothing while idle.
    pub fn tick(&mut self) {
        if self.is_running() {
            self.step();
        }
    }

    /// One fetch-decode-execute step, whether or not the processor is running.
    pub fn step(&mut self) {
        if let Some(max) = self.config.max_steps {
            if self.steps >= max {
                self.fault(&format!("execution step limit exceeded ({})", max));
                return;
            }
        }
        self.steps += 1;

        let Some(ip) = self.registers.get(IP).and_then(RegisterValue::as_ip) else {
            self.fault("instruction pointer is not an integer");
            return;
        };

        let Ok(index) = usize::try_from(ip) else {
            self.fault(&format!("instruction pointer out of range: {}", ip));
            return;
        };

        let program = Arc::clone(&self.program);
        let Some(instruction) = program.text_section.get(index) else {
            debug!(ip, "program finished");
            if let Some(on_finish) = self.on_finish.as_mut() {
                on_finish();
            }
            self.restore_state();
            return;
        };

        let source = Arc::clone(&self.source);
        let (line, col) = (instruction.line, instruction.col);

        // A program paired with the wrong source text
        let (Some(name), Some(operands)) = (
            instruction.name.get(&source),
            instruction
                .args
                .iter()
                .map(|range| range.get(&source))
                .collect::<Option<Vec<&str>>>(),
        ) else {
            self.fault(&format!(
                "Instruction at {}:{} does not match the program source",
                line, col
            ));
            return;
        };
        trace!(ip, name, "tick");

        if !self.instructions.contains_key(name) {
            self.trap(&format!("Illegal instruction: {} at {}:{}", name, line, col));
        }

        let result = match self.instructions.get_mut(name) {
            Some(handler) => handler.execute(&mut self.registers, &mut self.stack, &operands),
            None => Err(undefined_instruction(name)),
        };

        let next = result.and_then(|()| {
            self.registers
                .get(IP)
                .and_then(RegisterValue::as_ip)
                .ok_or_else(|| RuntimeError::new("instruction pointer is not an integer"))
        });

        match next {
            Ok(ip) => {
                self.registers
                    .insert(IP.to_string(), V::from_ip(ip.saturating_add(1)));
            }
            Err(err) => {
                self.trap(&format!(
                    "Instruction {} execution error at {}:{}: {}",
                    name, line, col, err.message
                ));
                self.stop();
            }
        }
    }

    fn trap(&mut self, message: &str) {
        warn!(message, "trap");
        if let Some(on_trap) = self.on_trap.as_mut() {
            on_trap(message);
        }
    }

    fn fault(&mut self, message: &str) {
        self.trap(message);
        self.stop();
    }

    /// Sets the completion callback, replacing any earlier one.
    pub fn on_finish<F: FnMut() + 'static>(&mut self, callback: F) {
        self.on_finish = Some(Box::new(callback));
    }

    /// Sets the fault callback, replacing any earlier one.
    ///
    /// An unknown instruction name notifies twice in one tick: once as an
    /// illegal instruction, then again as the failed invocation.
    pub fn on_trap<F: FnMut(&str) + 'static>(&mut self, callback: F) {
        self.on_trap = Some(Box::new(callback));
    }

    pub fn is_running(&self) -> bool {
        self.state == ProcessorState::Running
    }

    pub fn state(&self) -> ProcessorState {
        self.state
    }

    pub fn registers(&self) -> &Registers<V> {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut Registers<V> {
        &mut self.registers
    }

    pub fn saved_registers(&self) -> &Registers<V> {
        &self.saved_registers
    }

    pub fn stack(&self) -> &[V] {
        &self.stack
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }
}

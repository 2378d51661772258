use super::runtime_error::RuntimeError;
use std::collections::HashMap;

/// Name of the instruction pointer register.
pub const IP: &str = "ip";

/// Register file: register name to host-defined value.
pub type Registers<V> = HashMap<String, V>;

/// A value type that can hold the instruction pointer.
pub trait RegisterValue: Clone {
    fn from_ip(ip: i64) -> Self;

    /// The value as an instruction pointer, if it is an integer.
    fn as_ip(&self) -> Option<i64>;
}

macro_rules! integer_register_value {
    ($($ty:ty),*) => {
        $(
            impl RegisterValue for $ty {
                fn from_ip(ip: i64) -> Self {
                    <$ty>::try_from(ip).unwrap_or_default()
                }

                fn as_ip(&self) -> Option<i64> {
                    i64::try_from(*self).ok()
                }
            }
        )*
    };
}

integer_register_value!(i32, i64, u32, u64, usize);

/// Executes one named instruction.
///
/// Handlers get the live registers and stack for the duration of a single
/// tick, plus the operand tokens exactly as written in the source. Setting
/// `ip` to `T - 1` continues execution at instruction `T`.
pub trait Handler<V> {
    fn execute(
        &mut self,
        registers: &mut Registers<V>,
        stack: &mut Vec<V>,
        operands: &[&str],
    ) -> Result<(), RuntimeError>;
}

impl<V, F> Handler<V> for F
where
    F: FnMut(&mut Registers<V>, &mut Vec<V>, &[&str]) -> Result<(), RuntimeError>,
{
    fn execute(
        &mut self,
        registers: &mut Registers<V>,
        stack: &mut Vec<V>,
        operands: &[&str],
    ) -> Result<(), RuntimeError> {
        self(registers, stack, operands)
    }
}

pub type InstructionTable<V> = HashMap<String, Box<dyn Handler<V>>>;

/// An instruction set: the registers a machine starts with and the handler
/// behind every instruction name.
///
/// ```ignore
/// let mut arch = Arch::new();
/// arch.define_register("acc", 0i64)
///     .define_instruction("inc", |regs, _, _| {
///         *regs.get_mut("acc").ok_or("no acc")? += 1;
///         Ok(())
///     });
/// ```
pub struct Arch<V> {
    registers: Registers<V>,
    instructions: InstructionTable<V>,
}

impl<V> Default for Arch<V> {
    fn default() -> Self {
        Arch {
            registers: HashMap::new(),
            instructions: HashMap::new(),
        }
    }
}

impl<V> Arch<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines (or redefines) a register and its initial value.
    pub fn define_register(&mut self, name: impl Into<String>, init: V) -> &mut Self {
        self.registers.insert(name.into(), init);
        self
    }

    /// Defines an instruction backed by a closure. A later definition of the
    /// same name replaces the earlier one.
    pub fn define_instruction<F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: FnMut(&mut Registers<V>, &mut Vec<V>, &[&str]) -> Result<(), RuntimeError> + 'static,
    {
        self.define_handler(name, handler)
    }

    pub fn define_handler<H>(&mut self, name: impl Into<String>, handler: H) -> &mut Self
    where
        H: Handler<V> + 'static,
    {
        self.instructions.insert(name.into(), Box::new(handler));
        self
    }

    pub fn registers(&self) -> &Registers<V> {
        &self.registers
    }

    pub fn has_instruction(&self, name: &str) -> bool {
        self.instructions.contains_key(name)
    }

    pub(crate) fn into_parts(self) -> (Registers<V>, InstructionTable<V>) {
        (self.registers, self.instructions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Push(i64);

    impl Handler<i64> for Push {
        fn execute(
            &mut self,
            _registers: &mut Registers<i64>,
            stack: &mut Vec<i64>,
            _operands: &[&str],
        ) -> Result<(), RuntimeError> {
            stack.push(self.0);
            Ok(())
        }
    }

    #[test]
    fn test_define_registers_chained() {
        let mut arch: Arch<i64> = Arch::new();
        arch.define_register("a", 1).define_register("b", 2);
        assert_eq!(arch.registers().get("a"), Some(&1));
        assert_eq!(arch.registers().get("b"), Some(&2));
    }

    #[test]
    fn test_redefined_register_keeps_last_value() {
        let mut arch: Arch<i64> = Arch::new();
        arch.define_register("a", 1).define_register("a", 5);
        assert_eq!(arch.registers().len(), 1);
        assert_eq!(arch.registers()["a"], 5);
    }

    #[test]
    fn test_closure_and_trait_handlers() {
        let mut arch: Arch<i64> = Arch::new();
        arch.define_instruction("nop", |_, _, _| Ok(()))
            .define_handler("push7", Push(7));
        assert!(arch.has_instruction("nop"));
        assert!(arch.has_instruction("push7"));
        assert!(!arch.has_instruction("hlt"));

        let (mut registers, mut instructions) = arch.into_parts();
        let mut stack = Vec::new();
        let handler = instructions.get_mut("push7").unwrap();
        handler.execute(&mut registers, &mut stack, &[]).unwrap();
        assert_eq!(stack, vec![7]);
    }

    #[test]
    fn test_integer_ip_conversions() {
        assert_eq!(<u32 as RegisterValue>::from_ip(4), 4);
        assert_eq!(<u32 as RegisterValue>::from_ip(-1), 0);
        assert_eq!(5usize.as_ip(), Some(5));
        assert_eq!(u64::MAX.as_ip(), None);
        assert_eq!((-3i32).as_ip(), Some(-3));
    }
}

use thiserror::Error;

/// Failure raised by an instruction handler.
///
/// The processor never propagates this to the scheduler: the message ends up
/// in a trap notification and the processor stops.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RuntimeError {
    pub message: String,
}

impl RuntimeError {
    pub fn new(msg: impl Into<String>) -> Self {
        RuntimeError {
            message: msg.into(),
        }
    }
}

impl From<String> for RuntimeError {
    fn from(message: String) -> Self {
        RuntimeError { message }
    }
}

impl From<&str> for RuntimeError {
    fn from(message: &str) -> Self {
        RuntimeError::new(message)
    }
}

pub fn stack_underflow() -> RuntimeError {
    RuntimeError::new("stack underflow")
}

pub fn unknown_register(name: &str) -> RuntimeError {
    RuntimeError::new(format!("unknown register '{}'", name))
}

pub fn invalid_operand(operand: &str) -> RuntimeError {
    RuntimeError::new(format!("invalid operand '{}'", operand))
}

pub fn arity_mismatch(expected: usize, got: usize) -> RuntimeError {
    RuntimeError::new(format!("expected {} operand(s), got {}", expected, got))
}

pub fn type_error(expected: &str, got: &str) -> RuntimeError {
    RuntimeError::new(format!("type error: expected {}, got {}", expected, got))
}

pub fn undefined_instruction(name: &str) -> RuntimeError {
    RuntimeError::new(format!("instruction '{}' is not defined", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_bare_message() {
        assert_eq!(stack_underflow().to_string(), "stack underflow");
    }

    #[test]
    fn test_helpers_format_their_context() {
        assert_eq!(unknown_register("rx").message, "unknown register 'rx'");
        assert_eq!(arity_mismatch(2, 1).message, "expected 2 operand(s), got 1");
        assert_eq!(type_error("integer", "string").message, "type error: expected integer, got string");
    }

    #[test]
    fn test_conversions() {
        let from_str: RuntimeError = "boom".into();
        let from_string: RuntimeError = String::from("boom").into();
        assert_eq!(from_str, from_string);
    }
}

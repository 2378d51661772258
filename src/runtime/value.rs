use super::arch::RegisterValue;
use serde::{Deserialize, Serialize};

/// A register or stack value for hosts that do not bring their own type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// 64-bit signed integer. The only variant usable as `ip`.
    Integer(i64),

    /// 64-bit floating-point number.
    Float(f64),

    /// UTF-8 string value.
    String(String),

    /// Boolean value.
    Bool(bool),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bool(_) => "bool",
        }
    }

    /// Reads an operand token as a value.
    ///
    /// Decimal and `0x` hex integers (either with a leading `-`), floats and
    /// `true`/`false` are recognized; anything else stays a string.
    pub fn parse_operand(operand: &str) -> Value {
        let (negative, digits) = match operand.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, operand),
        };

        let hex = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"));
        if let Some(hex) = hex {
            if let Ok(n) = i64::from_str_radix(hex, 16) {
                return Value::Integer(if negative { -n } else { n });
            }
        }

        if let Ok(n) = operand.parse::<i64>() {
            return Value::Integer(n);
        }

        // Rust accepts "inf"/"nan" as floats; operands never mean those
        if digits.starts_with(|c: char| c.is_ascii_digit()) {
            if let Ok(n) = operand.parse::<f64>() {
                return Value::Float(n);
            }
        }

        match operand {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(operand.to_string()),
        }
    }
}

impl RegisterValue for Value {
    fn from_ip(ip: i64) -> Self {
        Value::Integer(ip)
    }

    fn as_ip(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

//! Arithmetic calculator tool.

use crate::error::ToolError;
use std::str::FromStr;

/// Supported calculator operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Sqrt,
}

impl Operation {
    /// All operations, in the order advertised to the model.
    pub const ALL: [Operation; 6] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
        Operation::Power,
        Operation::Sqrt,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
            Operation::Power => "power",
            Operation::Sqrt => "sqrt",
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "*",
            Operation::Divide => "/",
            Operation::Power => "^",
            Operation::Sqrt => "√",
        }
    }
}

impl FromStr for Operation {
    type Err = ToolError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let op = s.trim().to_lowercase();
        Operation::ALL
            .into_iter()
            .find(|candidate| candidate.name() == op)
            .ok_or(ToolError::UnknownOperation(op))
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Run a calculation and render it as `"{a} {symbol} {b} = {result}"`.
pub fn calculate(operation: &str, a: f64, b: Option<f64>) -> Result<String, ToolError> {
    let op: Operation = operation.parse()?;

    if op == Operation::Sqrt {
        if a < 0.0 {
            return Err(ToolError::NegativeSqrt);
        }
        let result = checked(a.sqrt())?;
        return Ok(format!("{}{} = {}", op.symbol(), a, result));
    }

    let b = b.ok_or_else(|| {
        ToolError::Calculation(format!("operation '{}' requires a second operand b", op))
    })?;

    let result = match op {
        Operation::Add => a + b,
        Operation::Subtract => a - b,
        Operation::Multiply => a * b,
        Operation::Divide => {
            if b == 0.0 {
                return Err(ToolError::DivideByZero);
            }
            a / b
        }
        Operation::Power => a.powf(b),
        Operation::Sqrt => unreachable!("handled above"),
    };

    Ok(format!("{} {} {} = {}", a, op.symbol(), b, checked(result)?))
}

/// Text-only variant used where the caller must always receive an observation.
pub fn calculate_text(operation: &str, a: f64, b: Option<f64>) -> String {
    calculate(operation, a, b).unwrap_or_else(|e| e.to_string())
}

fn checked(value: f64) -> Result<f64, ToolError> {
    if value.is_finite() {
        Ok(value)
    } else if value.is_nan() {
        Err(ToolError::Calculation("result is not a number".to_string()))
    } else {
        Err(ToolError::Calculation("result is out of range".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        assert!(calculate_text("add", 2.0, Some(3.0)).contains("2 + 3 = 5"));
        assert_eq!(calculate_text("subtract", 10.0, Some(4.5)), "10 - 4.5 = 5.5");
        assert_eq!(calculate_text("multiply", 6.0, Some(7.0)), "6 * 7 = 42");
        assert_eq!(calculate_text("divide", 7.0, Some(2.0)), "7 / 2 = 3.5");
        assert_eq!(calculate_text("power", 2.0, Some(10.0)), "2 ^ 10 = 1024");
    }

    #[test]
    fn test_operation_is_case_insensitive() {
        assert_eq!(calculate_text("  ADD ", 1.0, Some(1.0)), "1 + 1 = 2");
        assert_eq!("Sqrt".parse::<Operation>().unwrap(), Operation::Sqrt);
    }

    #[test]
    fn test_divide_by_zero() {
        assert_eq!(calculate("divide", 5.0, Some(0.0)), Err(ToolError::DivideByZero));
        assert_eq!(calculate_text("divide", 5.0, Some(0.0)), "cannot divide by zero");
    }

    #[test]
    fn test_sqrt() {
        assert_eq!(calculate_text("sqrt", 9.0, None), "√9 = 3");
        assert_eq!(calculate_text("sqrt", 2.25, Some(100.0)), "√2.25 = 1.5");
        assert_eq!(calculate("sqrt", -4.0, None), Err(ToolError::NegativeSqrt));
        assert!(calculate_text("sqrt", -4.0, None).contains("negative"));
    }

    #[test]
    fn test_unknown_operation() {
        assert_eq!(
            calculate("modulo", 10.0, Some(3.0)),
            Err(ToolError::UnknownOperation("modulo".to_string()))
        );
        assert_eq!(calculate_text("Modulo", 10.0, Some(3.0)), "unknown operation: modulo");
    }

    #[test]
    fn test_missing_second_operand() {
        let text = calculate_text("add", 1.0, None);
        assert!(text.starts_with("calculation error:"));
        assert!(text.contains("add"));
    }

    #[test]
    fn test_overflow_is_reported() {
        let text = calculate_text("power", 10.0, Some(400.0));
        assert_eq!(text, "calculation error: result is out of range");
    }
}

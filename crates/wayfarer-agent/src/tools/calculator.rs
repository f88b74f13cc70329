//! Calculator tool: arithmetic for budget breakdowns and unit conversions.
//!
//! Grammar (precedence climbing, `^` right-associative):
//!
//! ```text
//! expr    = term (('+' | '-') term)*
//! term    = power (('*' | '/' | '%') power)*
//! power   = unary ('^' power)?
//! unary   = '-' unary | '+' unary | primary
//! primary = NUMBER | '(' expr ')'
//! ```

use std::iter::Peekable;
use std::str::Chars;

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};

use wayfarer_core::value::Arguments;

use super::base::{Tool, ToolResult};

// ─────────────────────────────────────────────
// CalculatorTool
// ─────────────────────────────────────────────

pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluate an arithmetic expression. Supports + - * / % ^, parentheses, \
         unary minus and decimals. Use it for totals, per-night prices and splits."
    }

    fn parameters(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "Expression to evaluate, e.g. '(320 * 3 + 85) / 2'"
                }
            },
            "required": ["expression"]
        })
    }

    async fn execute(&self, args: &Arguments) -> anyhow::Result<ToolResult> {
        let expression = args.require_str("expression")?;
        match evaluate(expression) {
            Ok(value) => Ok(ToolResult::success(format_number(value)).with_metadata("result", value)),
            Err(e) => Ok(ToolResult::error(format!("Cannot evaluate '{expression}': {e}"))),
        }
    }
}

/// Render integers without a trailing `.0`.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

// ─────────────────────────────────────────────
// Evaluator
// ─────────────────────────────────────────────

/// Evaluate an arithmetic expression.
pub fn evaluate(expr: &str) -> Result<f64, String> {
    let mut parser = Parser {
        chars: expr.chars().peekable(),
    };
    let value = parser.expr()?;
    parser.skip_ws();
    if let Some(c) = parser.chars.peek() {
        return Err(format!("unexpected '{c}'"));
    }
    if !value.is_finite() {
        return Err("result is not a finite number".into());
    }
    Ok(value)
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
}

impl Parser<'_> {
    fn skip_ws(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
        }
    }

    /// Consume `expected` if it is the next non-space character.
    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.chars.peek() == Some(&expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Result<f64, String> {
        let mut acc = self.term()?;
        loop {
            if self.eat('+') {
                acc += self.term()?;
            } else if self.eat('-') {
                acc -= self.term()?;
            } else {
                return Ok(acc);
            }
        }
    }

    fn term(&mut self) -> Result<f64, String> {
        let mut acc = self.power()?;
        loop {
            if self.eat('*') {
                acc *= self.power()?;
            } else if self.eat('/') {
                let rhs = self.power()?;
                if rhs == 0.0 {
                    return Err("division by zero".into());
                }
                acc /= rhs;
            } else if self.eat('%') {
                let rhs = self.power()?;
                if rhs == 0.0 {
                    return Err("modulo by zero".into());
                }
                acc %= rhs;
            } else {
                return Ok(acc);
            }
        }
    }

    fn power(&mut self) -> Result<f64, String> {
        let base = self.unary()?;
        if self.eat('^') {
            let exponent = self.power()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn unary(&mut self) -> Result<f64, String> {
        if self.eat('-') {
            return Ok(-self.unary()?);
        }
        if self.eat('+') {
            return self.unary();
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<f64, String> {
        if self.eat('(') {
            let inner = self.expr()?;
            if !self.eat(')') {
                return Err("missing closing parenthesis".into());
            }
            return Ok(inner);
        }

        self.skip_ws();
        let mut literal = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() || c == '.' {
                literal.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        match (literal.is_empty(), self.chars.peek()) {
            (true, Some(c)) => Err(format!("unexpected '{c}'")),
            (true, None) => Err("unexpected end of expression".into()),
            (false, _) => literal
                .parse::<f64>()
                .map_err(|_| format!("invalid number '{literal}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
        assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
        assert_eq!(evaluate("10 - 4 - 3").unwrap(), 3.0);
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(evaluate("2 ^ 3 ^ 2").unwrap(), 512.0);
        assert_eq!(evaluate("-2 ^ 2").unwrap(), 4.0);
    }

    #[test]
    fn test_modulo_and_decimals() {
        assert_eq!(evaluate("17 % 5").unwrap(), 2.0);
        assert!((evaluate("0.1 + 0.2").unwrap() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_errors() {
        assert!(evaluate("1 / 0").is_err());
        assert!(evaluate("(1 + 2").is_err());
        assert!(evaluate("1 +").is_err());
        assert!(evaluate("2 * x").is_err());
        assert!(evaluate("1.2.3").is_err());
        assert!(evaluate("3 4").is_err());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1045.0), "1045");
        assert_eq!(format_number(2.5), "2.5");
    }

    #[tokio::test]
    async fn test_tool_success() {
        let result = CalculatorTool
            .execute(&Arguments::new().with("expression", "(320 * 3 + 85) / 2"))
            .await
            .unwrap();
        assert_eq!(result.output.as_deref(), Some("522.5"));
    }

    #[tokio::test]
    async fn test_tool_bad_expression_is_error_result() {
        let result = CalculatorTool
            .execute(&Arguments::new().with("expression", "5 / (2 - 2)"))
            .await
            .unwrap();
        assert!(result.output.is_none());
        assert!(result.error.unwrap().contains("division by zero"));
    }

    #[tokio::test]
    async fn test_tool_missing_expression() {
        let err = CalculatorTool.execute(&Arguments::new()).await.unwrap_err();
        assert!(err.to_string().contains("expression"));
    }
}

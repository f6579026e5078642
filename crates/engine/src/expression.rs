//! The arithmetic mini-language of the total field.
//!
//! The expense form accepts totals like `"120+15"` or `"3*45.50"` so a user
//! can sum receipt lines without leaving the input. The language is small:
//! decimal numbers, `+ - * /`, and parentheses, with operators applied
//! strictly **left to right** (no precedence: `2+3*4` is `20`, not `14`).
//!
//! A trailing dangling operator (`"120+"`, mid-typing) is ignored. Anything
//! outside `[0-9+-*/().]` and whitespace is rejected before evaluation.

use crate::{Currency, EngineError, Money};

/// Evaluates a total expression to a major-unit value.
pub fn evaluate(input: &str) -> Result<f64, EngineError> {
    if let Some(bad) = input
        .chars()
        .find(|c| !c.is_ascii_digit() && !"+-*/().".contains(*c) && !c.is_whitespace())
    {
        return Err(EngineError::InvalidExpression(format!(
            "invalid character '{bad}'"
        )));
    }

    let mut tokens = tokenize(input)?;
    // Tolerate a dangling operator from mid-typing input ("120+").
    if matches!(tokens.last(), Some(Token::Op(_))) {
        tokens.pop();
    }
    if tokens.is_empty() {
        return Err(EngineError::InvalidExpression("empty expression".to_string()));
    }

    let mut pos = 0;
    let value = expr(&tokens, &mut pos)?;
    if pos != tokens.len() {
        return Err(EngineError::InvalidExpression(
            "unexpected trailing input".to_string(),
        ));
    }
    Ok(value)
}

/// Evaluates a total expression and converts the major-unit result to minor
/// units in `currency`.
pub fn evaluate_total(input: &str, currency: Currency) -> Result<Money, EngineError> {
    let value = evaluate(input)?;
    let total = Money::from_major(value, currency)?;
    if !total.is_positive() {
        return Err(EngineError::InvalidAmount(
            "total must be positive".to_string(),
        ));
    }
    Ok(total)
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Token {
    Number(f64),
    Op(char),
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, EngineError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c.is_ascii_digit() || c == '.' {
            let mut literal = String::new();
            let mut seen_dot = false;
            while let Some(&c) = chars.peek() {
                if c.is_ascii_digit() {
                    literal.push(c);
                    chars.next();
                } else if c == '.' && !seen_dot {
                    seen_dot = true;
                    literal.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            let value: f64 = literal.parse().map_err(|_| {
                EngineError::InvalidExpression(format!("invalid number \"{literal}\""))
            })?;
            tokens.push(Token::Number(value));
        } else if "+-*/".contains(c) {
            tokens.push(Token::Op(c));
            chars.next();
        } else if c == '(' {
            tokens.push(Token::LParen);
            chars.next();
        } else if c == ')' {
            tokens.push(Token::RParen);
            chars.next();
        } else {
            return Err(EngineError::InvalidExpression(format!(
                "invalid character '{c}'"
            )));
        }
    }

    Ok(tokens)
}

/// `expr := term (op term)*`, folded left to right.
fn expr(tokens: &[Token], pos: &mut usize) -> Result<f64, EngineError> {
    let mut value = term(tokens, pos)?;

    while let Some(Token::Op(op)) = tokens.get(*pos) {
        *pos += 1;
        let rhs = term(tokens, pos)?;
        value = match op {
            '+' => value + rhs,
            '-' => value - rhs,
            '*' => value * rhs,
            '/' => {
                if rhs == 0.0 {
                    return Err(EngineError::InvalidExpression(
                        "division by zero".to_string(),
                    ));
                }
                value / rhs
            }
            _ => unreachable!("tokenizer only emits + - * /"),
        };
    }

    Ok(value)
}

/// `term := number | '-' term | '(' expr ')'`
fn term(tokens: &[Token], pos: &mut usize) -> Result<f64, EngineError> {
    match tokens.get(*pos) {
        Some(Token::Number(value)) => {
            *pos += 1;
            Ok(*value)
        }
        Some(Token::Op('-')) => {
            *pos += 1;
            Ok(-term(tokens, pos)?)
        }
        Some(Token::LParen) => {
            *pos += 1;
            let value = expr(tokens, pos)?;
            match tokens.get(*pos) {
                Some(Token::RParen) => {
                    *pos += 1;
                    Ok(value)
                }
                _ => Err(EngineError::InvalidExpression(
                    "missing closing parenthesis".to_string(),
                )),
            }
        }
        _ => Err(EngineError::InvalidExpression(
            "expected a number".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_plain_numbers() {
        assert_eq!(evaluate("135").unwrap(), 135.0);
        assert_eq!(evaluate(" 12.5 ").unwrap(), 12.5);
    }

    #[test]
    fn evaluates_sums() {
        assert_eq!(evaluate("120+15").unwrap(), 135.0);
        assert_eq!(evaluate("100 - 25 + 5").unwrap(), 80.0);
    }

    #[test]
    fn applies_operators_left_to_right() {
        // No precedence: (2 + 3) * 4.
        assert_eq!(evaluate("2+3*4").unwrap(), 20.0);
        assert_eq!(evaluate("10-4/2").unwrap(), 3.0);
    }

    #[test]
    fn parentheses_group() {
        assert_eq!(evaluate("2+(3*4)").unwrap(), 14.0);
        assert_eq!(evaluate("(1+1)*(2+2)").unwrap(), 8.0);
    }

    #[test]
    fn ignores_trailing_operator() {
        assert_eq!(evaluate("120+").unwrap(), 120.0);
        assert_eq!(evaluate("45*").unwrap(), 45.0);
    }

    #[test]
    fn rejects_invalid_characters() {
        assert!(matches!(
            evaluate("abc"),
            Err(EngineError::InvalidExpression(_))
        ));
        assert!(evaluate("1+2; DROP TABLE").is_err());
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(evaluate("").is_err());
        assert!(evaluate("(1+2").is_err());
        assert!(evaluate("1..2").is_err());
        assert!(evaluate("1/0").is_err());
    }

    #[test]
    fn total_converts_to_minor_units() {
        let total = evaluate_total("120+15", Currency::Sek).unwrap();
        assert_eq!(total.minor(), 13500);
    }

    #[test]
    fn total_rejects_non_positive_results() {
        assert!(evaluate_total("0", Currency::Sek).is_err());
        assert!(evaluate_total("5-10", Currency::Sek).is_err());
    }
}

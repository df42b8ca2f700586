//! Tokenizer for equation text

use crate::compiler::errors::CompileError;

/// A single lexical token of an equation string
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    /// `**` or `^`
    Pow,
    Equals,
    LParen,
    RParen,
    Comma,
}

/// Tokenize an equation or statement string.
///
/// `context` names the source location (e.g. `equations[3]`) for error messages.
pub fn tokenize(src: &str, context: &str) -> Result<Vec<Token>, CompileError> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        match c {
            c if c.is_whitespace() => pos += 1,
            '+' => {
                tokens.push(Token::Plus);
                pos += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                pos += 1;
            }
            '*' => {
                if chars.get(pos + 1) == Some(&'*') {
                    tokens.push(Token::Pow);
                    pos += 2;
                } else {
                    tokens.push(Token::Star);
                    pos += 1;
                }
            }
            '^' => {
                tokens.push(Token::Pow);
                pos += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                pos += 1;
            }
            '=' => {
                tokens.push(Token::Equals);
                pos += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                pos += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                pos += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                pos += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let (token, next) = lex_number(&chars, pos, context)?;
                tokens.push(token);
                pos = next;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = pos;
                while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                    pos += 1;
                }
                tokens.push(Token::Ident(chars[start..pos].iter().collect()));
            }
            other => {
                return Err(CompileError::invalid_expr(
                    context,
                    format!("unexpected character `{other}`"),
                ))
            }
        }
    }

    Ok(tokens)
}

fn lex_number(chars: &[char], start: usize, context: &str) -> Result<(Token, usize), CompileError> {
    let mut pos = start;
    while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '.') {
        pos += 1;
    }

    // optional exponent: e, E with optional sign, at least one digit
    if pos < chars.len() && (chars[pos] == 'e' || chars[pos] == 'E') {
        let mut exp_end = pos + 1;
        if exp_end < chars.len() && (chars[exp_end] == '+' || chars[exp_end] == '-') {
            exp_end += 1;
        }
        if exp_end < chars.len() && chars[exp_end].is_ascii_digit() {
            pos = exp_end;
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
        }
    }

    let text: String = chars[start..pos].iter().collect();
    let value = text
        .parse::<f64>()
        .map_err(|_| CompileError::invalid_expr(context, format!("invalid number `{text}`")))?;
    Ok((Token::Number(value), pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_equation() {
        let tokens = tokenize("w = chi * n**eta * cSS", "test").unwrap();
        assert_eq!(tokens[0], Token::Ident("w".to_string()));
        assert_eq!(tokens[1], Token::Equals);
        assert!(tokens.contains(&Token::Pow));
        assert_eq!(tokens.last(), Some(&Token::Ident("cSS".to_string())));
    }

    #[test]
    fn test_tokenize_numbers() {
        let tokens = tokenize("0.5 + 1e-3 + 2E4", "test").unwrap();
        assert_eq!(tokens[0], Token::Number(0.5));
        assert_eq!(tokens[2], Token::Number(1e-3));
        assert_eq!(tokens[4], Token::Number(2e4));
    }

    #[test]
    fn test_caret_is_pow() {
        let tokens = tokenize("x^2", "test").unwrap();
        assert_eq!(tokens[1], Token::Pow);
    }

    #[test]
    fn test_unexpected_character() {
        let result = tokenize("x + $y", "test");
        assert!(matches!(
            result,
            Err(CompileError::InvalidExpression { .. })
        ));
    }
}

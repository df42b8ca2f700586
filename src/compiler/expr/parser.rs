//! Pratt parser for equation and statement text

use crate::compiler::errors::CompileError;
use crate::compiler::expr::ast::{BinaryOp, Builtin, Expr, UnaryOp};
use crate::compiler::expr::lexer::{tokenize, Token};

/// A parsed equation, split on a single `=` sign
///
/// Without an `=` the text is treated as an already-formed residual
/// expression. More than one `=` is rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEquation {
    pub lhs: Expr,
    pub rhs: Option<Expr>,
}

impl ParsedEquation {
    /// Residual form of the equation: `lhs - rhs`, or `lhs` alone.
    pub fn residual(&self) -> Expr {
        match &self.rhs {
            Some(rhs) => Expr::Binary(
                BinaryOp::Sub,
                Box::new(self.lhs.clone()),
                Box::new(rhs.clone()),
            ),
            None => self.lhs.clone(),
        }
    }

    /// Whether either side references `name` as a whole identifier.
    pub fn references(&self, name: &str) -> bool {
        self.lhs.references(name) || self.rhs.as_ref().is_some_and(|r| r.references(name))
    }
}

/// Parse a bare expression (no `=` allowed).
pub fn parse_expression(src: &str, context: &str) -> Result<Expr, CompileError> {
    let tokens = tokenize(src, context)?;
    if tokens.is_empty() {
        return Err(CompileError::EmptyExpression {
            context: context.to_string(),
        });
    }
    if tokens.contains(&Token::Equals) {
        return Err(CompileError::invalid_expr(
            context,
            "expected an expression, found `=`",
        ));
    }
    Parser::new(tokens, context).parse_all()
}

/// Parse an equation, splitting on at most one `=` into lhs/rhs.
pub fn parse_equation(src: &str, context: &str) -> Result<ParsedEquation, CompileError> {
    let tokens = tokenize(src, context)?;
    if tokens.is_empty() {
        return Err(CompileError::EmptyExpression {
            context: context.to_string(),
        });
    }

    let splits: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| **t == Token::Equals)
        .map(|(i, _)| i)
        .collect();

    match splits.as_slice() {
        [] => Ok(ParsedEquation {
            lhs: Parser::new(tokens, context).parse_all()?,
            rhs: None,
        }),
        [at] => {
            let rhs_tokens = tokens[at + 1..].to_vec();
            let lhs_tokens = tokens[..*at].to_vec();
            Ok(ParsedEquation {
                lhs: Parser::new(lhs_tokens, context).parse_all()?,
                rhs: Some(Parser::new(rhs_tokens, context).parse_all()?),
            })
        }
        _ => Err(CompileError::invalid_expr(
            context,
            "equation contains more than one `=`",
        )),
    }
}

/// Parse an assignment statement of the form `name = expression`.
pub fn parse_statement(src: &str, context: &str) -> Result<(String, Expr), CompileError> {
    let tokens = tokenize(src, context)?;
    if tokens.is_empty() {
        return Err(CompileError::EmptyExpression {
            context: context.to_string(),
        });
    }

    let (target, rest) = match tokens.as_slice() {
        [Token::Ident(name), Token::Equals, rest @ ..] if !rest.is_empty() => {
            (name.clone(), rest.to_vec())
        }
        _ => {
            return Err(CompileError::invalid_expr(
                context,
                "expected an assignment of the form `name = expression`",
            ))
        }
    };
    if rest.contains(&Token::Equals) {
        return Err(CompileError::invalid_expr(
            context,
            "statement contains more than one `=`",
        ));
    }

    let expr = Parser::new(rest, context).parse_all()?;
    Ok((target, expr))
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    context: &'a str,
}

// Binding powers: additive < multiplicative < unary minus < power.
// Power is right-associative; unary minus binds looser than `**` so that
// `-x**2` parses as `-(x**2)`.
const BP_ADD: (u8, u8) = (1, 2);
const BP_MUL: (u8, u8) = (3, 4);
const BP_NEG: u8 = 5;
const BP_POW: (u8, u8) = (7, 6);

impl<'a> Parser<'a> {
    fn new(tokens: Vec<Token>, context: &'a str) -> Self {
        Self {
            tokens,
            pos: 0,
            context,
        }
    }

    fn parse_all(mut self) -> Result<Expr, CompileError> {
        let expr = self.parse_binary(0)?;
        match self.peek() {
            None => Ok(expr),
            Some(t) => Err(self.unexpected(t.clone())),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, token: Token) -> Result<(), CompileError> {
        match self.next() {
            Some(t) if t == token => Ok(()),
            Some(t) => Err(self.unexpected(t)),
            None => Err(self.unexpected_end()),
        }
    }

    fn unexpected(&self, token: Token) -> CompileError {
        CompileError::invalid_expr(self.context, format!("unexpected token `{token:?}`"))
    }

    fn unexpected_end(&self) -> CompileError {
        CompileError::invalid_expr(self.context, "unexpected end of expression")
    }

    fn parse_binary(&mut self, min_bp: u8) -> Result<Expr, CompileError> {
        let mut lhs = self.parse_unary()?;

        while let Some(token) = self.peek() {
            let (op, (left_bp, right_bp)) = match token {
                Token::Plus => (BinaryOp::Add, BP_ADD),
                Token::Minus => (BinaryOp::Sub, BP_ADD),
                Token::Star => (BinaryOp::Mul, BP_MUL),
                Token::Slash => (BinaryOp::Div, BP_MUL),
                Token::Pow => (BinaryOp::Pow, BP_POW),
                _ => break,
            };
            if left_bp < min_bp {
                break;
            }
            self.next();
            let rhs = self.parse_binary(right_bp)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }

        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, CompileError> {
        if self.peek() == Some(&Token::Minus) {
            self.next();
            let operand = self.parse_binary(BP_NEG)?;
            return Ok(Expr::Unary(UnaryOp::Neg, Box::new(operand)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, CompileError> {
        match self.next() {
            Some(Token::Number(v)) => Ok(Expr::Num(v)),
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.parse_call(&name)
                } else {
                    Ok(Expr::Var(name))
                }
            }
            Some(Token::LParen) => {
                let inner = self.parse_binary(0)?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(t) => Err(self.unexpected(t)),
            None => Err(self.unexpected_end()),
        }
    }

    fn parse_call(&mut self, name: &str) -> Result<Expr, CompileError> {
        let builtin = Builtin::from_name(name).ok_or_else(|| {
            CompileError::invalid_expr(self.context, format!("unknown function `{name}`"))
        })?;
        self.expect(Token::LParen)?;

        let mut args = Vec::new();
        loop {
            args.push(self.parse_binary(0)?);
            match self.next() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => break,
                Some(t) => return Err(self.unexpected(t)),
                None => return Err(self.unexpected_end()),
            }
        }

        if args.len() != builtin.arity() {
            return Err(CompileError::invalid_expr(
                self.context,
                format!(
                    "function `{}` takes {} argument(s), found {}",
                    builtin.name(),
                    builtin.arity(),
                    args.len()
                ),
            ));
        }
        Ok(Expr::Call(builtin, args))
    }
}

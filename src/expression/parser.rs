use super::ast::{BinaryOp, Expr, Func, Var};
use super::error::ExprError;
use super::lexer::{Span, Token, TokenKind, lex};

/// Deepest bracket/sign nesting a formula may use.
pub(crate) const MAX_NESTING: usize = 64;
/// Longest formula, in tokens. Operator chains nest as deep as they are long.
pub(crate) const MAX_TOKENS: usize = 4096;

pub(crate) fn parse_expr(src: &str) -> Result<Expr, ExprError> {
    let tokens = lex(src.trim())?;
    if tokens.len() > MAX_TOKENS {
        return Err(ExprError::new(
            0,
            format!("formula has more than {MAX_TOKENS} tokens"),
        ));
    }
    let mut p = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = p.parse_term()?;
    p.expect(TokenKind::Eof)?;
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn bump(&mut self) -> &Token {
        let t = &self.tokens[self.pos];
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn span(&self) -> Span {
        self.peek().span
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ExprError> {
        if self.peek().kind == kind {
            self.bump();
            Ok(())
        } else {
            Err(ExprError::new(
                self.span().start,
                format!("expected {kind:?}, found {:?}", self.peek().kind),
            ))
        }
    }

    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn parse_term(&mut self) -> Result<Expr, ExprError> {
        let mut e = self.parse_factor()?;
        loop {
            let op = if self.consume(TokenKind::Plus) {
                BinaryOp::Add
            } else if self.consume(TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };
            let r = self.parse_factor()?;
            e = Expr::Binary {
                op,
                left: Box::new(e),
                right: Box::new(r),
            };
        }
        Ok(e)
    }

    fn parse_factor(&mut self) -> Result<Expr, ExprError> {
        let mut e = self.parse_unary()?;
        loop {
            let op = if self.consume(TokenKind::Star) {
                BinaryOp::Mul
            } else if self.consume(TokenKind::Slash) {
                BinaryOp::Div
            } else {
                break;
            };
            let r = self.parse_unary()?;
            e = Expr::Binary {
                op,
                left: Box::new(e),
                right: Box::new(r),
            };
        }
        Ok(e)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        if self.depth >= MAX_NESTING {
            return Err(ExprError::new(
                self.span().start,
                format!("formula nests deeper than {MAX_NESTING} levels"),
            ));
        }
        self.depth += 1;
        let e = self.parse_signed();
        self.depth -= 1;
        e
    }

    fn parse_signed(&mut self) -> Result<Expr, ExprError> {
        if self.consume(TokenKind::Minus) {
            let e = self.parse_unary()?;
            return Ok(Expr::Neg(Box::new(e)));
        }
        if self.consume(TokenKind::Plus) {
            return self.parse_unary();
        }
        self.parse_primary()
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, ExprError> {
        let mut args = Vec::new();
        if self.consume(TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_term()?);
            if self.consume(TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::RParen)?;
            return Ok(args);
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        let t = self.bump().clone();
        match t.kind {
            TokenKind::Number(v) => Ok(Expr::Num(v)),
            TokenKind::Dollar => Ok(Expr::Param),
            TokenKind::Ident(name) => {
                if self.consume(TokenKind::LParen) {
                    let func = Func::from_name(&name).ok_or_else(|| {
                        ExprError::new(t.span.start, format!("unknown function \"{name}\""))
                    })?;
                    let args = self.parse_args()?;
                    if args.len() != func.arity() {
                        return Err(ExprError::new(
                            t.span.start,
                            format!(
                                "{name} expects {} argument(s), got {}",
                                func.arity(),
                                args.len()
                            ),
                        ));
                    }
                    return Ok(Expr::Call { func, args });
                }
                Var::from_name(&name).map(Expr::Var).ok_or_else(|| {
                    ExprError::new(t.span.start, format!("unknown variable \"{name}\""))
                })
            }
            TokenKind::LParen => {
                let e = self.parse_term()?;
                self.expect(TokenKind::RParen)?;
                Ok(e)
            }
            other => Err(ExprError::new(
                t.span.start,
                format!("unexpected token {other:?}"),
            )),
        }
    }
}

//! Arithmetic expressions used in animation values and formulas.
//!
//! Values like `x + width/2` or formulas like `$ * $` are parsed once into a
//! [`ValueExpr`] and evaluated against the animated shape's geometry.

mod ast;
mod error;
mod eval;
mod lexer;
mod parser;

pub use self::error::ExprError;
pub use self::eval::ExprEnv;

use crate::foundation::error::SlideplayError;

/// A parsed value expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueExpr {
    source: String,
    expr: ast::Expr,
}

impl ValueExpr {
    pub fn parse(src: &str) -> Result<Self, ExprError> {
        let expr = parser::parse_expr(src)?;
        Ok(Self {
            source: src.trim().to_owned(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the expression reads `$`.
    pub fn uses_param(&self) -> bool {
        self.expr.uses_param()
    }

    pub fn eval(&self, env: &ExprEnv) -> f64 {
        eval::eval(&self.expr, env)
    }
}

impl From<ExprError> for SlideplayError {
    fn from(err: ExprError) -> Self {
        SlideplayError::expression(err.to_string())
    }
}

/// Parse and evaluate `src` in one step.
pub fn eval_str(src: &str, env: &ExprEnv) -> Result<f64, ExprError> {
    Ok(ValueExpr::parse(src)?.eval(env))
}

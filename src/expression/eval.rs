use super::ast::{BinaryOp, Expr, Func, Var};

/// Values visible to an expression. Geometry is normalized to slide size.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExprEnv {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Value bound to `$`.
    pub param: f64,
}

impl ExprEnv {
    pub fn with_param(self, param: f64) -> Self {
        Self { param, ..self }
    }
}

pub(crate) fn eval(expr: &Expr, env: &ExprEnv) -> f64 {
    match expr {
        Expr::Num(v) => *v,
        Expr::Param => env.param,
        Expr::Var(var) => match var {
            Var::X => env.x,
            Var::Y => env.y,
            Var::Width => env.width,
            Var::Height => env.height,
            Var::Pi => std::f64::consts::PI,
            Var::E => std::f64::consts::E,
        },
        Expr::Neg(e) => -eval(e, env),
        Expr::Binary { op, left, right } => {
            let (l, r) = (eval(left, env), eval(right, env));
            match op {
                BinaryOp::Add => l + r,
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                BinaryOp::Div => l / r,
            }
        }
        Expr::Call { func, args } => {
            let a = args.first().map_or(0.0, |e| eval(e, env));
            match func {
                Func::Abs => a.abs(),
                Func::Sqrt => a.sqrt(),
                Func::Sin => a.sin(),
                Func::Cos => a.cos(),
                Func::Tan => a.tan(),
                Func::Asin => a.asin(),
                Func::Acos => a.acos(),
                Func::Atan => a.atan(),
                Func::Exp => a.exp(),
                Func::Log => a.ln(),
                Func::Min | Func::Max => {
                    let b = args.get(1).map_or(0.0, |e| eval(e, env));
                    if *func == Func::Min { a.min(b) } else { a.max(b) }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/eval.rs"]
mod tests;

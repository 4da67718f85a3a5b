#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Num(f64),
    Var(Var),
    /// The `$` placeholder of a formula.
    Param,
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        func: Func,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub(crate) fn uses_param(&self) -> bool {
        match self {
            Expr::Param => true,
            Expr::Num(_) | Expr::Var(_) => false,
            Expr::Neg(e) => e.uses_param(),
            Expr::Binary { left, right, .. } => left.uses_param() || right.uses_param(),
            Expr::Call { args, .. } => args.iter().any(Expr::uses_param),
        }
    }
}

/// Shape geometry and constants available by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Var {
    X,
    Y,
    Width,
    Height,
    Pi,
    E,
}

impl Var {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "x" => Self::X,
            "y" => Self::Y,
            "width" => Self::Width,
            "height" => Self::Height,
            "pi" => Self::Pi,
            "e" => Self::E,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Func {
    Abs,
    Sqrt,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Exp,
    Log,
    Min,
    Max,
}

impl Func {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "abs" => Self::Abs,
            "sqrt" => Self::Sqrt,
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "asin" => Self::Asin,
            "acos" => Self::Acos,
            "atan" => Self::Atan,
            "exp" => Self::Exp,
            "log" => Self::Log,
            "min" => Self::Min,
            "max" => Self::Max,
            _ => return None,
        })
    }

    pub(crate) fn arity(self) -> usize {
        match self {
            Self::Min | Self::Max => 2,
            _ => 1,
        }
    }
}

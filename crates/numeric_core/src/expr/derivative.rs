//! Symbolic differentiation over [`Expr`].

use super::ast::{BinOp, Expr, Function};
use crate::types::NumericError;

/// `d expr / d var`, simplified.
///
/// Fails with `UnsupportedDerivative` when a function without a derivative
/// rule (`floor`, `ceil`, `sign`) is applied to an argument that depends on
/// `var`.
pub fn differentiate(expr: &Expr, var: usize) -> Result<Expr, NumericError> {
    Ok(diff(expr, var)?.simplify())
}

/// `n`-th derivative. `order == 0` returns a copy.
pub fn differentiate_n(expr: &Expr, var: usize, order: usize) -> Result<Expr, NumericError> {
    let mut current = expr.clone();
    for _ in 0..order {
        current = differentiate(&current, var)?;
    }
    Ok(current)
}

fn diff(expr: &Expr, var: usize) -> Result<Expr, NumericError> {
    if !expr.depends_on(var) {
        return Ok(Expr::Num(0.0));
    }
    let d = match expr {
        Expr::Num(_) | Expr::Const(_) => Expr::Num(0.0),
        Expr::Var(i) => Expr::Num(if *i == var { 1.0 } else { 0.0 }),
        Expr::Neg(e) => Expr::neg(diff(e, var)?),
        Expr::Bin(op, l, r) => diff_bin(*op, l, r, var)?,
        Expr::Call(f, u) => {
            let outer = outer_derivative(*f, u)?;
            Expr::bin(BinOp::Mul, outer, diff(u, var)?)
        }
    };
    Ok(d)
}

fn diff_bin(op: BinOp, l: &Expr, r: &Expr, var: usize) -> Result<Expr, NumericError> {
    let (a, b) = (l.clone(), r.clone());
    let d = match op {
        BinOp::Add => Expr::bin(BinOp::Add, diff(l, var)?, diff(r, var)?),
        BinOp::Sub => Expr::bin(BinOp::Sub, diff(l, var)?, diff(r, var)?),
        BinOp::Mul => Expr::bin(
            BinOp::Add,
            Expr::bin(BinOp::Mul, diff(l, var)?, b),
            Expr::bin(BinOp::Mul, a, diff(r, var)?),
        ),
        BinOp::Div => Expr::bin(
            BinOp::Div,
            Expr::bin(
                BinOp::Sub,
                Expr::bin(BinOp::Mul, diff(l, var)?, b.clone()),
                Expr::bin(BinOp::Mul, a, diff(r, var)?),
            ),
            Expr::bin(BinOp::Pow, b, Expr::Num(2.0)),
        ),
        BinOp::Pow if !r.depends_on(var) => {
            // n·u^(n-1)·u'
            let reduced = Expr::bin(BinOp::Sub, b.clone(), Expr::Num(1.0)).simplify();
            Expr::bin(
                BinOp::Mul,
                Expr::bin(BinOp::Mul, b, Expr::bin(BinOp::Pow, a, reduced)),
                diff(l, var)?,
            )
        }
        BinOp::Pow if !l.depends_on(var) => {
            // a^v·ln(a)·v'
            Expr::bin(
                BinOp::Mul,
                Expr::bin(
                    BinOp::Mul,
                    Expr::bin(BinOp::Pow, a.clone(), b),
                    Expr::call(Function::Ln, a),
                ),
                diff(r, var)?,
            )
        }
        BinOp::Pow => {
            // u^v·(v'·ln u + v·u'/u)
            Expr::bin(
                BinOp::Mul,
                Expr::bin(BinOp::Pow, a.clone(), b.clone()),
                Expr::bin(
                    BinOp::Add,
                    Expr::bin(BinOp::Mul, diff(r, var)?, Expr::call(Function::Ln, a.clone())),
                    Expr::bin(
                        BinOp::Div,
                        Expr::bin(BinOp::Mul, b, diff(l, var)?),
                        a,
                    ),
                ),
            )
        }
    };
    Ok(d)
}

// f'(u), to be multiplied by u'.
fn outer_derivative(f: Function, u: &Expr) -> Result<Expr, NumericError> {
    let u = u.clone();
    let d = match f {
        Function::Exp => Expr::call(Function::Exp, u),
        Function::Ln => Expr::bin(BinOp::Div, Expr::Num(1.0), u),
        Function::Log10 => Expr::bin(
            BinOp::Div,
            Expr::Num(1.0),
            Expr::bin(BinOp::Mul, u, Expr::Num(std::f64::consts::LN_10)),
        ),
        Function::Sqrt => Expr::bin(
            BinOp::Div,
            Expr::Num(1.0),
            Expr::bin(BinOp::Mul, Expr::Num(2.0), Expr::call(Function::Sqrt, u)),
        ),
        Function::Sin => Expr::call(Function::Cos, u),
        Function::Cos => Expr::neg(Expr::call(Function::Sin, u)),
        Function::Tan => Expr::bin(
            BinOp::Div,
            Expr::Num(1.0),
            Expr::bin(BinOp::Pow, Expr::call(Function::Cos, u), Expr::Num(2.0)),
        ),
        Function::Atan => Expr::bin(
            BinOp::Div,
            Expr::Num(1.0),
            Expr::bin(
                BinOp::Add,
                Expr::Num(1.0),
                Expr::bin(BinOp::Pow, u, Expr::Num(2.0)),
            ),
        ),
        Function::Sinh => Expr::call(Function::Cosh, u),
        Function::Cosh => Expr::call(Function::Sinh, u),
        Function::Tanh => Expr::bin(
            BinOp::Sub,
            Expr::Num(1.0),
            Expr::bin(BinOp::Pow, Expr::call(Function::Tanh, u), Expr::Num(2.0)),
        ),
        Function::Abs => Expr::bin(BinOp::Div, u.clone(), Expr::call(Function::Abs, u)),
        Function::Floor | Function::Ceil | Function::Sign => {
            return Err(NumericError::UnsupportedDerivative {
                function: f.name().to_string(),
            })
        }
    };
    Ok(d)
}

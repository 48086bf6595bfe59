//! Expression tree, evaluation, rendering and constant folding.

use std::f64::consts;

/// Binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `^`
    Pow,
}

impl BinOp {
    fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => " + ",
            BinOp::Sub => " - ",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Pow => "^",
        }
    }

    fn precedence(self) -> u8 {
        match self {
            BinOp::Add | BinOp::Sub => 1,
            BinOp::Mul | BinOp::Div => 2,
            BinOp::Pow => 4,
        }
    }

    fn apply(self, l: f64, r: f64) -> f64 {
        match self {
            BinOp::Add => l + r,
            BinOp::Sub => l - r,
            BinOp::Mul => l * r,
            BinOp::Div => l / r,
            BinOp::Pow => l.powf(r),
        }
    }
}

/// Named constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    /// π
    Pi,
    /// Euler's number
    E,
}

impl Constant {
    /// Look up a constant by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pi" => Some(Constant::Pi),
            "e" => Some(Constant::E),
            _ => None,
        }
    }

    /// Numeric value.
    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => consts::PI,
            Constant::E => consts::E,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Constant::Pi => "pi",
            Constant::E => "e",
        }
    }
}

/// Built-in function of one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    /// `exp`
    Exp,
    /// `log` / `ln` (natural)
    Ln,
    /// `log10`
    Log10,
    /// `sqrt`
    Sqrt,
    /// `sin`
    Sin,
    /// `cos`
    Cos,
    /// `tan`
    Tan,
    /// `atan`
    Atan,
    /// `sinh`
    Sinh,
    /// `cosh`
    Cosh,
    /// `tanh`
    Tanh,
    /// `abs`
    Abs,
    /// `floor`
    Floor,
    /// `ceil`
    Ceil,
    /// `sign`
    Sign,
}

impl Function {
    /// Look up a function by name.
    pub fn from_name(name: &str) -> Option<Self> {
        let f = match name {
            "exp" => Function::Exp,
            "log" | "ln" => Function::Ln,
            "log10" => Function::Log10,
            "sqrt" => Function::Sqrt,
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "atan" => Function::Atan,
            "sinh" => Function::Sinh,
            "cosh" => Function::Cosh,
            "tanh" => Function::Tanh,
            "abs" => Function::Abs,
            "floor" => Function::Floor,
            "ceil" => Function::Ceil,
            "sign" => Function::Sign,
            _ => return None,
        };
        Some(f)
    }

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            Function::Exp => "exp",
            Function::Ln => "log",
            Function::Log10 => "log10",
            Function::Sqrt => "sqrt",
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Atan => "atan",
            Function::Sinh => "sinh",
            Function::Cosh => "cosh",
            Function::Tanh => "tanh",
            Function::Abs => "abs",
            Function::Floor => "floor",
            Function::Ceil => "ceil",
            Function::Sign => "sign",
        }
    }

    /// Apply to a value.
    pub fn apply(self, v: f64) -> f64 {
        match self {
            Function::Exp => v.exp(),
            Function::Ln => v.ln(),
            Function::Log10 => v.log10(),
            Function::Sqrt => v.sqrt(),
            Function::Sin => v.sin(),
            Function::Cos => v.cos(),
            Function::Tan => v.tan(),
            Function::Atan => v.atan(),
            Function::Sinh => v.sinh(),
            Function::Cosh => v.cosh(),
            Function::Tanh => v.tanh(),
            Function::Abs => v.abs(),
            Function::Floor => v.floor(),
            Function::Ceil => v.ceil(),
            Function::Sign => {
                if v == 0.0 || v.is_nan() {
                    v
                } else {
                    v.signum()
                }
            }
        }
    }
}

/// Expression tree over indexed variables.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal
    Num(f64),
    /// `pi` or `e`
    Const(Constant),
    /// Variable by index
    Var(usize),
    /// Unary minus
    Neg(Box<Expr>),
    /// Binary operation
    Bin(BinOp, Box<Expr>, Box<Expr>),
    /// Function call
    Call(Function, Box<Expr>),
}

impl Expr {
    /// Build a binary node.
    pub fn bin(op: BinOp, l: Expr, r: Expr) -> Expr {
        Expr::Bin(op, Box::new(l), Box::new(r))
    }

    /// Build a call node.
    pub fn call(f: Function, arg: Expr) -> Expr {
        Expr::Call(f, Box::new(arg))
    }

    /// Build a negation node.
    pub fn neg(e: Expr) -> Expr {
        Expr::Neg(Box::new(e))
    }

    /// Evaluate with `vars[i]` bound to variable `i`. Missing variables are NaN.
    pub fn eval(&self, vars: &[f64]) -> f64 {
        match self {
            Expr::Num(v) => *v,
            Expr::Const(c) => c.value(),
            Expr::Var(i) => vars.get(*i).copied().unwrap_or(f64::NAN),
            Expr::Neg(e) => -e.eval(vars),
            Expr::Bin(op, l, r) => op.apply(l.eval(vars), r.eval(vars)),
            Expr::Call(f, e) => f.apply(e.eval(vars)),
        }
    }

    /// Whether variable `index` occurs in the tree.
    pub fn depends_on(&self, index: usize) -> bool {
        match self {
            Expr::Num(_) | Expr::Const(_) => false,
            Expr::Var(i) => *i == index,
            Expr::Neg(e) | Expr::Call(_, e) => e.depends_on(index),
            Expr::Bin(_, l, r) => l.depends_on(index) || r.depends_on(index),
        }
    }

    /// Whether the tree contains no variable at all.
    pub fn is_constant(&self) -> bool {
        match self {
            Expr::Num(_) | Expr::Const(_) => true,
            Expr::Var(_) => false,
            Expr::Neg(e) | Expr::Call(_, e) => e.is_constant(),
            Expr::Bin(_, l, r) => l.is_constant() && r.is_constant(),
        }
    }

    fn as_num(&self) -> Option<f64> {
        match self {
            Expr::Num(v) => Some(*v),
            _ => None,
        }
    }

    /// Fold literal arithmetic and drop neutral elements.
    pub fn simplify(self) -> Expr {
        match self {
            Expr::Neg(e) => match e.simplify() {
                Expr::Num(v) => Expr::Num(-v),
                Expr::Neg(inner) => *inner,
                other => Expr::neg(other),
            },
            Expr::Call(f, e) => {
                let arg = e.simplify();
                match arg.as_num() {
                    Some(v) if f.apply(v).is_finite() && f.apply(v).fract() == 0.0 => {
                        Expr::Num(f.apply(v))
                    }
                    _ => Expr::call(f, arg),
                }
            }
            Expr::Bin(op, l, r) => simplify_bin(op, l.simplify(), r.simplify()),
            leaf => leaf,
        }
    }

    /// Render with variable names.
    pub fn render(&self, names: &[String]) -> String {
        let mut out = String::new();
        self.write(names, 0, &mut out);
        out
    }

    fn own_precedence(&self) -> u8 {
        match self {
            Expr::Num(v) if *v < 0.0 => 3,
            Expr::Neg(_) => 3,
            Expr::Bin(op, _, _) => op.precedence(),
            _ => 5,
        }
    }

    fn write(&self, names: &[String], parent: u8, out: &mut String) {
        let own = self.own_precedence();
        let wrap = own < parent;
        if wrap {
            out.push('(');
        }
        match self {
            Expr::Num(v) => out.push_str(&format_number(*v)),
            Expr::Const(c) => out.push_str(c.name()),
            Expr::Var(i) => match names.get(*i) {
                Some(name) => out.push_str(name),
                None => out.push_str(&format!("x{}", i + 1)),
            },
            Expr::Neg(e) => {
                out.push('-');
                e.write(names, 4, out);
            }
            Expr::Bin(op, l, r) => {
                let p = op.precedence();
                let (left, right) = match op {
                    BinOp::Add | BinOp::Mul => (p, p),
                    BinOp::Sub | BinOp::Div => (p, p + 1),
                    BinOp::Pow => (p + 1, p),
                };
                l.write(names, left, out);
                out.push_str(op.symbol());
                r.write(names, right, out);
            }
            Expr::Call(f, e) => {
                out.push_str(f.name());
                out.push('(');
                e.write(names, 0, out);
                out.push(')');
            }
        }
        if wrap {
            out.push(')');
        }
    }
}

fn simplify_bin(op: BinOp, l: Expr, r: Expr) -> Expr {
    if let (Some(a), Some(b)) = (l.as_num(), r.as_num()) {
        let v = op.apply(a, b);
        if v.is_finite() {
            return Expr::Num(v);
        }
    }
    match (op, l.as_num(), r.as_num()) {
        (BinOp::Add, Some(z), _) if z == 0.0 => r,
        (BinOp::Add, _, Some(z)) if z == 0.0 => l,
        (BinOp::Sub, _, Some(z)) if z == 0.0 => l,
        (BinOp::Sub, Some(z), _) if z == 0.0 => Expr::neg(r).simplify(),
        (BinOp::Mul, Some(z), _) | (BinOp::Mul, _, Some(z)) if z == 0.0 => Expr::Num(0.0),
        (BinOp::Mul, Some(o), _) if o == 1.0 => r,
        (BinOp::Mul, _, Some(o)) if o == 1.0 => l,
        (BinOp::Mul, Some(m), _) if m == -1.0 => Expr::neg(r).simplify(),
        (BinOp::Mul, _, Some(m)) if m == -1.0 => Expr::neg(l).simplify(),
        // constants first, then merge c1*(c2*u) into (c1*c2)*u
        (BinOp::Mul, None, Some(_)) => simplify_bin(op, r, l),
        (BinOp::Mul, Some(a), None) => match r {
            Expr::Bin(BinOp::Mul, inner_l, inner_r) => match inner_l.as_num() {
                Some(b) => Expr::bin(BinOp::Mul, Expr::Num(a * b), *inner_r),
                None => Expr::bin(op, l, Expr::Bin(BinOp::Mul, inner_l, inner_r)),
            },
            _ => Expr::bin(op, l, r),
        },
        (BinOp::Div, Some(z), _) if z == 0.0 => Expr::Num(0.0),
        (BinOp::Div, _, Some(o)) if o == 1.0 => l,
        (BinOp::Pow, _, Some(z)) if z == 0.0 => Expr::Num(1.0),
        (BinOp::Pow, _, Some(o)) if o == 1.0 => l,
        (BinOp::Add, _, _) => match r {
            Expr::Neg(inner) => Expr::bin(BinOp::Sub, l, *inner),
            Expr::Num(v) if v < 0.0 => Expr::bin(BinOp::Sub, l, Expr::Num(-v)),
            _ => Expr::bin(op, l, r),
        },
        (BinOp::Sub, _, _) => match r {
            Expr::Neg(inner) => Expr::bin(BinOp::Add, l, *inner),
            Expr::Num(v) if v < 0.0 => Expr::bin(BinOp::Add, l, Expr::Num(-v)),
            _ => Expr::bin(op, l, r),
        },
        _ => Expr::bin(op, l, r),
    }
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

//! Shunting-yard parser: tokens to RPN, RPN to [`Expr`].

use super::ast::{BinOp, Constant, Expr, Function};
use super::lexer::{tokenize, Spanned, Token};
use crate::types::NumericError;

#[derive(Debug, PartialEq, Clone, Copy)]
enum Assoc {
    Left,
    Right,
}

/// Operator-stack entry.
#[derive(Debug, Clone, Copy)]
enum Pending {
    Bin(BinOp, usize),
    Neg(usize),
    OParen(usize),
    Call(Function, usize),
}

/// RPN output entry.
#[derive(Debug, Clone)]
enum Rpn {
    Operand(Expr),
    Bin(BinOp, usize),
    Neg(usize),
    Call(Function, usize),
}

fn precedence(p: &Pending) -> (usize, Assoc) {
    // Unary minus binds looser than '^' so that -x^2 is -(x^2) while 2^-3
    // still parses because the '-' is pushed as a prefix operator.
    match *p {
        Pending::OParen(_) => (1, Assoc::Left), // keep at bottom
        Pending::Bin(BinOp::Add, _) | Pending::Bin(BinOp::Sub, _) => (2, Assoc::Left),
        Pending::Bin(BinOp::Mul, _) | Pending::Bin(BinOp::Div, _) => (3, Assoc::Left),
        Pending::Neg(_) => (4, Assoc::Right),
        Pending::Bin(BinOp::Pow, _) => (5, Assoc::Right),
        Pending::Call(_, _) => (6, Assoc::Left),
    }
}

fn to_rpn(pending: Pending) -> Option<Rpn> {
    match pending {
        Pending::Bin(op, pos) => Some(Rpn::Bin(op, pos)),
        Pending::Neg(pos) => Some(Rpn::Neg(pos)),
        Pending::Call(f, pos) => Some(Rpn::Call(f, pos)),
        Pending::OParen(_) => None,
    }
}

/// Parse `text` with variables named by `names` (index = position).
///
/// # Errors
///
/// `NumericError::Parse` for unbalanced parentheses, unknown identifiers,
/// dangling or missing operators, and division by a constant that evaluates
/// to zero.
pub fn parse(text: &str, names: &[String]) -> Result<Expr, NumericError> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err(NumericError::parse("empty expression", 0));
    }
    let rpn = shunting_yard(&tokens, names)?;
    fold(rpn, text.chars().count())
}

fn shunting_yard(tokens: &[Spanned], names: &[String]) -> Result<Vec<Rpn>, NumericError> {
    let mut out = Vec::new();
    let mut stack: Vec<Pending> = Vec::new();
    // true when the next token must start an operand
    let mut expect_operand = true;

    let mut iter = tokens.iter().peekable();
    while let Some(Spanned { token, position }) = iter.next() {
        let pos = *position;
        match token {
            Token::Number(v) => {
                require_operator_slot(expect_operand, pos)?;
                out.push(Rpn::Operand(Expr::Num(*v)));
                expect_operand = false;
            }
            Token::Ident(name) => {
                require_operator_slot(expect_operand, pos)?;
                let is_call = matches!(iter.peek(), Some(Spanned { token: Token::OParen, .. }));
                if is_call {
                    let f = Function::from_name(name).ok_or_else(|| {
                        NumericError::parse(
                            format!(
                                "unknown function '{}' (supported: exp, log, ln, log10, sqrt, sin, cos, tan, atan, sinh, cosh, tanh, abs, floor, ceil, sign)",
                                name
                            ),
                            pos,
                        )
                    })?;
                    stack.push(Pending::Call(f, pos));
                    // the '(' that follows opens the argument
                    continue;
                }
                if let Some(index) = names.iter().position(|n| n == name) {
                    out.push(Rpn::Operand(Expr::Var(index)));
                } else if let Some(c) = Constant::from_name(name) {
                    out.push(Rpn::Operand(Expr::Const(c)));
                } else {
                    return Err(NumericError::parse(
                        format!(
                            "unknown identifier '{}' (variables: {})",
                            name,
                            names.join(", ")
                        ),
                        pos,
                    ));
                }
                expect_operand = false;
            }
            Token::OParen => {
                require_operator_slot(expect_operand, pos)?;
                stack.push(Pending::OParen(pos));
                expect_operand = true;
            }
            Token::CParen => {
                if expect_operand {
                    return Err(NumericError::parse("expected an operand before ')'", pos));
                }
                loop {
                    match stack.pop() {
                        Some(Pending::OParen(_)) => break,
                        Some(other) => out.extend(to_rpn(other)),
                        None => return Err(NumericError::parse("missing opening parenthesis", pos)),
                    }
                }
                if let Some(Pending::Call(f, p)) = stack.last().copied() {
                    stack.pop();
                    out.push(Rpn::Call(f, p));
                }
                expect_operand = false;
            }
            Token::Op(c) => {
                if expect_operand {
                    match c {
                        '-' => stack.push(Pending::Neg(pos)),
                        '+' => {}
                        _ => {
                            return Err(NumericError::parse(
                                format!("operator '{}' is missing its left operand", c),
                                pos,
                            ))
                        }
                    }
                    continue;
                }
                let op = match c {
                    '+' => BinOp::Add,
                    '-' => BinOp::Sub,
                    '*' => BinOp::Mul,
                    '/' => BinOp::Div,
                    _ => BinOp::Pow,
                };
                let incoming = Pending::Bin(op, pos);
                let (prec_rhs, assoc_rhs) = precedence(&incoming);
                while let Some(top) = stack.last().copied() {
                    let (prec_lhs, _) = precedence(&top);
                    let pop = prec_lhs > prec_rhs || (prec_lhs == prec_rhs && assoc_rhs == Assoc::Left);
                    if !pop || matches!(top, Pending::OParen(_)) {
                        break;
                    }
                    stack.pop();
                    out.extend(to_rpn(top));
                }
                stack.push(incoming);
                expect_operand = true;
            }
        }
    }

    if expect_operand {
        let pos = tokens.last().map(|t| t.position).unwrap_or(0);
        return Err(NumericError::parse(
            "expression ends with an operator",
            pos,
        ));
    }
    while let Some(top) = stack.pop() {
        match top {
            Pending::OParen(pos) => {
                return Err(NumericError::parse("missing closing parenthesis", pos))
            }
            other => out.extend(to_rpn(other)),
        }
    }
    Ok(out)
}

fn require_operator_slot(expect_operand: bool, pos: usize) -> Result<(), NumericError> {
    if expect_operand {
        Ok(())
    } else {
        Err(NumericError::parse(
            "missing operator between operands (write 2*x, not 2x)",
            pos,
        ))
    }
}

fn fold(rpn: Vec<Rpn>, end: usize) -> Result<Expr, NumericError> {
    let mut operands: Vec<Expr> = Vec::new();
    for item in rpn {
        match item {
            Rpn::Operand(e) => operands.push(e),
            Rpn::Neg(pos) => {
                let e = pop_operand(&mut operands, pos)?;
                operands.push(Expr::neg(e));
            }
            Rpn::Call(f, pos) => {
                let e = pop_operand(&mut operands, pos)?;
                operands.push(Expr::call(f, e));
            }
            Rpn::Bin(op, pos) => {
                let r = pop_operand(&mut operands, pos)?;
                let l = pop_operand(&mut operands, pos)?;
                if op == BinOp::Div && r.is_constant() && r.eval(&[]) == 0.0 {
                    return Err(NumericError::parse(
                        "division by a constant that evaluates to zero",
                        pos,
                    ));
                }
                operands.push(Expr::bin(op, l, r));
            }
        }
    }
    match (operands.pop(), operands.is_empty()) {
        (Some(e), true) => Ok(e),
        _ => Err(NumericError::parse("malformed expression", end)),
    }
}

fn pop_operand(operands: &mut Vec<Expr>, pos: usize) -> Result<Expr, NumericError> {
    operands
        .pop()
        .ok_or_else(|| NumericError::parse("operator is missing an operand", pos))
}

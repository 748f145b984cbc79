// SPDX: CC0-1.0

use crate::{
    lex::{LexErrTyp, Lexer, SubStr},
    parse::{self, ParseErr, ParseErrTyp},
    sample, stdlib, Number, SampleSet,
};
use core::{fmt, ops::Range};
use std::{collections::HashMap, sync::Arc};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperatorTyp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Exp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
}

impl OperatorTyp {
    pub const fn precedence(&self) -> i8 {
        match self {
            Self::Add => 2,
            Self::Sub => 2,
            Self::Mul => 3,
            Self::Div => 3,
            Self::FloorDiv => 3,
            Self::Exp => 5,
        }
    }

    pub const fn associativity(&self) -> Associativity {
        use Associativity::{Left, Right};
        match self {
            Self::Add => Left,
            Self::Sub => Left,
            Self::Mul => Left,
            Self::Div => Left,
            Self::FloorDiv => Left,
            Self::Exp => Right,
        }
    }

    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::FloorDiv => "//",
            Self::Exp => "^",
        }
    }

    pub const fn fun(&self) -> fn(Number, Number) -> Number {
        match self {
            Self::Add => stdlib::add,
            Self::Sub => stdlib::sub,
            Self::Mul => stdlib::mul,
            Self::Div => stdlib::div,
            Self::FloorDiv => stdlib::floor_div,
            Self::Exp => stdlib::exp,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryTyp {
    Neg,
    Pos,
}

impl UnaryTyp {
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Pos => "+",
        }
    }

    pub const fn fun(&self) -> fn(Number) -> Number {
        match self {
            Self::Neg => stdlib::neg,
            Self::Pos => stdlib::pos,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub typ: ExprTyp,
    pub loc: SubStr,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprTyp {
    Number(Number),
    // any identifier in value position, name is the node's `loc`
    Variable,
    Unary(UnaryTyp, Box<Expr>),
    Binary(OperatorTyp, Box<Expr>, Box<Expr>),
    Call { name: SubStr, arg: Box<Expr> },
    Paren(Box<Expr>),
}

impl Expr {
    pub fn children(&self) -> Vec<&Expr> {
        match &self.typ {
            ExprTyp::Number(_) | ExprTyp::Variable => Vec::new(),
            ExprTyp::Unary(_, inner) | ExprTyp::Paren(inner) => vec![inner],
            ExprTyp::Call { arg, .. } => vec![arg],
            ExprTyp::Binary(_, lhs, rhs) => vec![lhs, rhs],
        }
    }
}

impl fmt::Display for ExprTyp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(val) => write!(f, "number {val}"),
            Self::Variable => write!(f, "variable"),
            Self::Unary(typ, _) => write!(f, "unary '{}'", typ.symbol()),
            Self::Binary(typ, _, _) => write!(f, "binary '{}'", typ.symbol()),
            Self::Call { name, .. } => write!(f, "call '{name}'"),
            Self::Paren(_) => write!(f, "parentheses"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.typ {
            ExprTyp::Variable => write!(f, "variable '{}'", self.loc),
            typ => write!(f, "{typ}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum EvalErrTyp {
    Syntax(ParseErrTyp),
    AmbiguousNumeralVariable { numeral_len: usize },
    UnboundIdentifier { name: SubStr },
    NotCallable { name: SubStr },
    NotAValue { name: SubStr },
}

#[derive(Clone, Debug, PartialEq)]
pub struct EvalErr {
    pub typ: EvalErrTyp,
    pub loc: SubStr,
}

impl fmt::Display for EvalErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.typ {
            EvalErrTyp::Syntax(typ) => write!(f, "invalid syntax: {typ}"),

            EvalErrTyp::AmbiguousNumeralVariable { numeral_len } => {
                let (numeral, ident) = self.loc.clone().split_at(*numeral_len);
                write!(
                    f,
                    "missing operator between the numeral '{numeral}' and '{ident}', did you mean '{numeral}*{ident}'?"
                )
            }

            EvalErrTyp::UnboundIdentifier { name } => {
                write!(f, "name '{name}' is not defined")
            }

            EvalErrTyp::NotCallable { name } => {
                write!(f, "'{name}' is not a function and cannot be called")
            }

            EvalErrTyp::NotAValue { name } => {
                write!(f, "function '{name}' must be called with an argument")
            }
        }
    }
}

impl std::error::Error for EvalErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.typ {
            EvalErrTyp::Syntax(ParseErrTyp::ParseNum(err)) => Some(err),
            _ => None,
        }
    }
}

impl From<ParseErr> for EvalErr {
    fn from(err: ParseErr) -> Self {
        let typ = match err.typ {
            ParseErrTyp::LexErr(LexErrTyp::AmbiguousNumeral { numeral_len }) => {
                EvalErrTyp::AmbiguousNumeralVariable { numeral_len }
            }
            typ => EvalErrTyp::Syntax(typ),
        };
        Self { typ, loc: err.loc }
    }
}

#[derive(Debug)]
pub enum Ident {
    Var,
    Fun(fn(Number) -> Number),
}

impl Ident {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Var => "variable",
            Self::Fun(_) => "function",
        }
    }
}

#[derive(Clone, Debug, Eq)]
pub enum IdentKey {
    Arc(SubStr),
    Static(&'static str),
}

impl PartialEq for IdentKey {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl core::hash::Hash for IdentKey {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.get().hash(state)
    }
}

impl IdentKey {
    pub fn get(&self) -> &str {
        match self {
            Self::Arc(s) => s.get(),
            Self::Static(s) => s,
        }
    }
}

impl fmt::Display for IdentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.get())
    }
}

impl From<SubStr> for IdentKey {
    fn from(s: SubStr) -> Self {
        Self::Arc(s)
    }
}

impl From<&'static str> for IdentKey {
    fn from(s: &'static str) -> Self {
        Self::Static(s)
    }
}

pub type Idents = HashMap<IdentKey, Ident>;

// Expression tree with every identifier resolved. Evaluating it cannot
// fail; domain errors show up as `NaN` or infinities.
#[derive(Clone, Debug)]
pub enum Bound {
    Val(Number),
    Var,
    Unary(fn(Number) -> Number, Box<Bound>),
    Binary(fn(Number, Number) -> Number, Box<Bound>, Box<Bound>),
    Call(fn(Number) -> Number, Box<Bound>),
}

impl Bound {
    pub fn eval(&self, x: Number) -> Number {
        match self {
            Self::Val(val) => *val,
            Self::Var => x,
            Self::Unary(fun, inner) | Self::Call(fun, inner) => fun(inner.eval(x)),
            Self::Binary(fun, lhs, rhs) => fun(lhs.eval(x), rhs.eval(x)),
        }
    }
}

// Resolves identifiers against `idents`, visiting left operands before
// right ones and arguments before their callee. First failure wins.
pub fn bind(expr: &Expr, idents: &Idents) -> Result<Bound, EvalErr> {
    let bound = match &expr.typ {
        ExprTyp::Number(val) => Bound::Val(*val),

        ExprTyp::Variable => match idents.get(&expr.loc.clone().into()) {
            Some(Ident::Var) => Bound::Var,
            Some(Ident::Fun(_)) => {
                return Err(EvalErr {
                    typ: EvalErrTyp::NotAValue {
                        name: expr.loc.clone(),
                    },
                    loc: expr.loc.clone(),
                })
            }
            None => {
                return Err(EvalErr {
                    typ: EvalErrTyp::UnboundIdentifier {
                        name: expr.loc.clone(),
                    },
                    loc: expr.loc.clone(),
                })
            }
        },

        ExprTyp::Paren(inner) => bind(inner, idents)?,

        ExprTyp::Unary(typ, inner) => Bound::Unary(typ.fun(), Box::new(bind(inner, idents)?)),

        ExprTyp::Binary(typ, lhs, rhs) => {
            let lhs = bind(lhs, idents)?;
            let rhs = bind(rhs, idents)?;
            Bound::Binary(typ.fun(), Box::new(lhs), Box::new(rhs))
        }

        ExprTyp::Call { name, arg } => {
            let arg = bind(arg, idents)?;
            match idents.get(&name.clone().into()) {
                Some(Ident::Fun(fun)) => Bound::Call(*fun, Box::new(arg)),
                Some(Ident::Var) => {
                    return Err(EvalErr {
                        typ: EvalErrTyp::NotCallable { name: name.clone() },
                        loc: name.clone(),
                    })
                }
                None => {
                    return Err(EvalErr {
                        typ: EvalErrTyp::UnboundIdentifier { name: name.clone() },
                        loc: name.clone(),
                    })
                }
            }
        }
    };
    Ok(bound)
}

pub fn parse_src(src: &Arc<String>) -> Result<Expr, EvalErr> {
    let expr = parse::parse(Lexer::new(src))?;
    log::trace!("parsed '{src}' into {expr:?}");
    Ok(expr)
}

pub fn compile(src: &Arc<String>) -> Result<Bound, EvalErr> {
    bind(&parse_src(src)?, &stdlib::standard_idents())
}

pub fn eval_src(src: &Arc<String>, domain: Range<Number>) -> Result<SampleSet, EvalErr> {
    let bound = compile(src)?;

    let x = sample::linspace(domain, crate::RESOLUTION);
    let y: Vec<Number> = x.iter().map(|&x| bound.eval(x)).collect();

    let non_finite = y.iter().filter(|y| !y.is_finite()).count();
    log::debug!(
        "evaluated '{src}' at {} points ({non_finite} non-finite)",
        x.len()
    );

    Ok(SampleSet { x, y })
}

/// Evaluate `expression` at [`RESOLUTION`](crate::RESOLUTION) evenly spaced
/// points of `[min_x, max_x]`, endpoints included.
///
/// Expects `min_x < max_x`; use [`validate`](crate::validate::validate) on raw
/// user input first.
pub fn evaluate(expression: &str, min_x: Number, max_x: Number) -> Result<SampleSet, EvalErr> {
    eval_src(&Arc::new(expression.to_string()), min_x..max_x)
}

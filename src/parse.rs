// SPDX: CC0-1.0

// recursive descent with precedence climbing for the binary operators (see
// https://en.wikipedia.org/wiki/Operator-precedence_parser#Precedence_climbing_method)

use crate::{
    eval::{Associativity, Expr, ExprTyp, OperatorTyp, UnaryTyp},
    lex::{LexErr, LexErrTyp, Lexer, SubStr, Tok, TokTyp},
    Number,
};
use core::{fmt, iter::Peekable, num::ParseFloatError};
use std::sync::Arc;

// Limit on parentheses, unary operators and operator chains nested inside
// each other. Python puts the same limit on parentheses.
pub const MAX_DEPTH: usize = 200;

#[derive(Clone, Debug, PartialEq)]
pub enum ParseErrTyp {
    LexErr(LexErrTyp),
    ParseNum(ParseFloatError),
    Unclosed,
    Unmatched,
    UnexpectedEnd,
    Unexpected(TokTyp),
    TooDeep,
}

impl fmt::Display for ParseErrTyp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LexErr(err) => write!(f, "{err}"),
            Self::ParseNum(err) => write!(f, "invalid number: {err}"),
            Self::Unclosed => write!(f, "'(' was never closed"),
            Self::Unmatched => write!(f, "unmatched ')'"),
            Self::UnexpectedEnd => write!(f, "unexpected end of expression"),
            Self::Unexpected(typ) => write!(f, "unexpected {typ}"),
            Self::TooDeep => write!(f, "expression is nested too deeply"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParseErr {
    pub typ: ParseErrTyp,
    pub loc: SubStr,
}

impl fmt::Display for ParseErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.typ)
    }
}

impl std::error::Error for ParseErr {}

impl From<LexErr> for ParseErr {
    fn from(err: LexErr) -> Self {
        Self {
            typ: ParseErrTyp::LexErr(err.typ),
            loc: err.loc,
        }
    }
}

struct Parser<'src> {
    src: Arc<String>,
    lex: Peekable<Lexer<'src>>,
    open: Vec<SubStr>, // unclosed parentheses, innermost last
    depth: usize,
}

impl<'src> Parser<'src> {
    fn peek(&mut self) -> Result<Option<TokTyp>, ParseErr> {
        match self.lex.peek() {
            None => Ok(None),
            Some(Ok(tok)) => Ok(Some(tok.typ)),
            Some(Err(err)) => Err(err.clone().into()),
        }
    }

    fn bump(&mut self) -> Result<Option<Tok>, ParseErr> {
        Ok(self.lex.next().transpose()?)
    }

    fn descend(&mut self, loc: &SubStr) -> Result<(), ParseErr> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            Err(ParseErr {
                typ: ParseErrTyp::TooDeep,
                loc: loc.clone(),
            })
        } else {
            Ok(())
        }
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    fn unexpected(&self, tok: Option<Tok>) -> ParseErr {
        match tok {
            None => match self.open.last() {
                // running out of input inside parentheses is the root cause
                Some(paren) => ParseErr {
                    typ: ParseErrTyp::Unclosed,
                    loc: paren.clone(),
                },
                None => ParseErr {
                    typ: ParseErrTyp::UnexpectedEnd,
                    loc: SubStr::end_of(Arc::clone(&self.src)),
                },
            },
            Some(tok) if tok.typ == TokTyp::CloseParen && self.open.is_empty() => ParseErr {
                typ: ParseErrTyp::Unmatched,
                loc: tok.loc,
            },
            Some(tok) => ParseErr {
                typ: ParseErrTyp::Unexpected(tok.typ),
                loc: tok.loc,
            },
        }
    }

    fn expr(&mut self, min_prec: i8) -> Result<Expr, ParseErr> {
        let mut lhs = self.unary()?;
        // each operator wraps `lhs` one level deeper, so a chain counts
        // toward the limit for as long as it keeps growing
        let mut wraps = 0;

        while let Some(TokTyp::Op(op)) = self.peek()? {
            if op.precedence() < min_prec {
                break;
            }
            let tok = self.bump()?.ok_or_else(|| self.unexpected(None))?;
            let next_min = match op.associativity() {
                Associativity::Left => op.precedence() + 1,
                Associativity::Right => op.precedence(),
            };

            self.descend(&tok.loc)?;
            wraps += 1;
            let rhs = self.expr(next_min)?;

            lhs = Expr {
                loc: lhs.loc.join(&rhs.loc),
                typ: ExprTyp::Binary(op, Box::new(lhs), Box::new(rhs)),
            };
        }

        self.depth -= wraps;
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ParseErr> {
        let typ = match self.peek()? {
            Some(TokTyp::Op(OperatorTyp::Sub)) => UnaryTyp::Neg,
            Some(TokTyp::Op(OperatorTyp::Add)) => UnaryTyp::Pos,
            _ => return self.primary(),
        };
        let tok = self.bump()?.ok_or_else(|| self.unexpected(None))?;

        // binds looser than `^` but tighter than everything else, so
        // `-x^2` is `-(x^2)` and `-x*2` is `(-x)*2`
        self.descend(&tok.loc)?;
        let inner = self.expr(OperatorTyp::Exp.precedence())?;
        self.ascend();

        Ok(Expr {
            loc: tok.loc.join(&inner.loc),
            typ: ExprTyp::Unary(typ, Box::new(inner)),
        })
    }

    fn parenthesized(&mut self, open: SubStr) -> Result<(Expr, SubStr), ParseErr> {
        self.descend(&open)?;
        self.open.push(open);
        let inner = self.expr(0)?;
        let close = match self.bump()? {
            Some(tok) if tok.typ == TokTyp::CloseParen => tok.loc,
            tok => return Err(self.unexpected(tok)),
        };
        self.open.pop();
        self.ascend();
        Ok((inner, close))
    }

    fn primary(&mut self) -> Result<Expr, ParseErr> {
        let tok = match self.bump()? {
            Some(tok) => tok,
            None => return Err(self.unexpected(None)),
        };

        match tok.typ {
            TokTyp::Number => {
                let num: Number = match tok.loc.get().parse() {
                    Ok(val) => val,
                    Err(err) => {
                        return Err(ParseErr {
                            typ: ParseErrTyp::ParseNum(err),
                            loc: tok.loc,
                        })
                    }
                };
                Ok(Expr {
                    typ: ExprTyp::Number(num),
                    loc: tok.loc,
                })
            }

            TokTyp::Ident => {
                if self.peek()? != Some(TokTyp::OpenParen) {
                    return Ok(Expr {
                        typ: ExprTyp::Variable,
                        loc: tok.loc,
                    });
                }
                let open = self.bump()?.ok_or_else(|| self.unexpected(None))?;
                let (arg, close) = self.parenthesized(open.loc)?;
                Ok(Expr {
                    loc: tok.loc.join(&close),
                    typ: ExprTyp::Call {
                        name: tok.loc,
                        arg: Box::new(arg),
                    },
                })
            }

            TokTyp::OpenParen => {
                let (inner, close) = self.parenthesized(tok.loc.clone())?;
                Ok(Expr {
                    loc: tok.loc.join(&close),
                    typ: ExprTyp::Paren(Box::new(inner)),
                })
            }

            TokTyp::CloseParen | TokTyp::Op(_) => Err(self.unexpected(Some(tok))),
        }
    }
}

pub fn parse(lex: Lexer<'_>) -> Result<Expr, ParseErr> {
    let mut parser = Parser {
        src: lex.src(),
        lex: lex.peekable(),
        open: Vec::new(),
        depth: 0,
    };

    let expr = parser.expr(0)?;
    match parser.bump()? {
        None => Ok(expr),
        tok => Err(parser.unexpected(tok)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(src: &str) -> Result<Expr, ParseErr> {
        let src = Arc::new(String::from(src));
        parse(Lexer::new(&src))
    }

    fn err(src: &str) -> (ParseErrTyp, String) {
        let err = parse_str(src).unwrap_err();
        (err.typ, err.loc.get().to_string())
    }

    fn shape(expr: &Expr) -> String {
        match &expr.typ {
            ExprTyp::Number(val) => format!("{val}"),
            ExprTyp::Variable => expr.loc.get().to_string(),
            ExprTyp::Unary(typ, inner) => format!("({}{})", typ.symbol(), shape(inner)),
            ExprTyp::Binary(typ, lhs, rhs) => {
                format!("({} {} {})", shape(lhs), typ.symbol(), shape(rhs))
            }
            ExprTyp::Call { name, arg } => format!("{name}[{}]", shape(arg)),
            ExprTyp::Paren(inner) => shape(inner),
        }
    }

    fn shape_of(src: &str) -> String {
        shape(&parse_str(src).unwrap())
    }

    fn nested(depth: usize) -> String {
        format!("{}x{}", "(".repeat(depth), ")".repeat(depth))
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(shape_of("5*x^3 + 2*x"), "((5 * (x ^ 3)) + (2 * x))");
        assert_eq!(shape_of("1 - 2 - 3"), "((1 - 2) - 3)");
        assert_eq!(shape_of("1 / 2 // 3"), "((1 / 2) // 3)");
        assert_eq!(shape_of("2^3^2"), "(2 ^ (3 ^ 2))");
        assert_eq!(shape_of("(1 + 2) * 3"), "((1 + 2) * 3)");
    }

    #[test]
    fn unary_minus() {
        assert_eq!(shape_of("-x^2"), "(-(x ^ 2))");
        assert_eq!(shape_of("-x*2"), "((-x) * 2)");
        assert_eq!(shape_of("2^-x"), "(2 ^ (-x))");
        assert_eq!(shape_of("x - -1"), "(x - (-1))");
        assert_eq!(shape_of("+x"), "(+x)");
    }

    #[test]
    fn calls() {
        assert_eq!(shape_of("sqrt(x) + log10(x)"), "(sqrt[x] + log10[x])");
        assert_eq!(shape_of("sqrt(sqrt(x + 1))"), "sqrt[sqrt[(x + 1)]]");
    }

    #[test]
    fn spans_cover_source() {
        let expr = parse_str(" sqrt( x ) * 2").unwrap();
        assert_eq!(expr.loc.get(), "sqrt( x ) * 2");
        assert_eq!(expr.children()[0].loc.get(), "sqrt( x )");
    }

    #[test]
    fn paren_errors() {
        assert_eq!(err("sin(x"), (ParseErrTyp::Unclosed, "(".into()));
        assert_eq!(err("((x) + 1"), (ParseErrTyp::Unclosed, "(".into()));
        assert_eq!(err("x + 1)"), (ParseErrTyp::Unmatched, ")".into()));
        assert_eq!(err(")"), (ParseErrTyp::Unmatched, ")".into()));
        assert_eq!(
            err("()"),
            (ParseErrTyp::Unexpected(TokTyp::CloseParen), ")".into())
        );
    }

    #[test]
    fn missing_operands() {
        assert_eq!(err("").0, ParseErrTyp::UnexpectedEnd);
        assert_eq!(err("x +").0, ParseErrTyp::UnexpectedEnd);
        assert_eq!(
            err("* x"),
            (ParseErrTyp::Unexpected(TokTyp::Op(OperatorTyp::Mul)), "*".into())
        );
        assert_eq!(
            err("x ^ ^ 2"),
            (ParseErrTyp::Unexpected(TokTyp::Op(OperatorTyp::Exp)), "^".into())
        );
    }

    #[test]
    fn missing_operators() {
        assert_eq!(
            err("5 x"),
            (ParseErrTyp::Unexpected(TokTyp::Ident), "x".into())
        );
        assert_eq!(
            err("2(x)"),
            (ParseErrTyp::Unexpected(TokTyp::OpenParen), "(".into())
        );
    }

    #[test]
    fn lex_errors_pass_through() {
        assert_eq!(
            err("1 + 5x").0,
            ParseErrTyp::LexErr(LexErrTyp::AmbiguousNumeral { numeral_len: 1 })
        );
    }

    #[test]
    fn nesting_limit() {
        assert!(parse_str(&nested(MAX_DEPTH)).is_ok());
        assert_eq!(err(&nested(MAX_DEPTH + 1)).0, ParseErrTyp::TooDeep);
    }

    #[test]
    fn long_chains_hit_the_nesting_limit() {
        let chain = |op: &str, n| format!("x{}", op.repeat(n));
        assert!(parse_str(&chain("+x", 150)).is_ok());
        assert!(parse_str(&chain("*x-x", 90)).is_ok());

        let (typ, loc) = err(&chain("+x", 100_000));
        assert_eq!((typ, loc.as_str()), (ParseErrTyp::TooDeep, "+"));
        assert_eq!(err(&chain("^x", 100_000)).0, ParseErrTyp::TooDeep);

        // a closed chain gives its depth back
        let src = format!("({}) + {}", chain("+x", 150), nested(MAX_DEPTH - 1));
        assert!(parse_str(&src).is_ok());
    }
}

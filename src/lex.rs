// SPDX: CC0-1.0

use crate::eval::OperatorTyp;
use core::{fmt, iter::Peekable, str::CharIndices};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubStr {
    // yes, silly, but atomic operations are cheap for this use case
    src: Arc<String>,
    start: usize,
    len: usize,
}

impl SubStr {
    #[inline]
    pub const fn new(src: Arc<String>, start: usize, len: usize) -> Self {
        Self { src, start, len }
    }

    #[inline]
    pub fn all(src: Arc<String>) -> Self {
        let len = src.len();
        Self::new(src, 0, len)
    }

    // Zero-width span just past the end of `src`.
    #[inline]
    pub fn end_of(src: Arc<String>) -> Self {
        let len = src.len();
        Self::new(src, len, 0)
    }

    pub fn src(&self) -> Arc<String> {
        Arc::clone(&self.src)
    }

    pub const fn start(&self) -> usize {
        self.start
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self) -> &str {
        &self.src[self.start..self.start + self.len]
    }

    pub fn shift_right(&mut self, by: usize) {
        self.len += by;
    }

    pub fn split_at(self, idx: usize) -> (Self, Self) {
        let mut l = self.clone();
        let mut r = self;
        l.len = idx;
        r.len -= idx;
        r.start += idx;
        (l, r)
    }

    // Span covering both `self` and `other`, which must share a source.
    pub fn join(&self, other: &Self) -> Self {
        debug_assert!(Arc::ptr_eq(&self.src, &other.src));
        let start = self.start.min(other.start);
        let end = (self.start + self.len).max(other.start + other.len);
        Self::new(Arc::clone(&self.src), start, end - start)
    }
}

impl fmt::Display for SubStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.get())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokTyp {
    Ident,
    Number,
    Op(OperatorTyp),
    OpenParen,
    CloseParen,
}

impl fmt::Display for TokTyp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident => write!(f, "identifier"),
            Self::Number => write!(f, "number"),
            Self::Op(op) => write!(f, "operator '{}'", op.symbol()),
            Self::OpenParen => write!(f, "'('"),
            Self::CloseParen => write!(f, "')'"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tok {
    pub typ: TokTyp,
    pub loc: SubStr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LexErrTyp {
    InvalidChar,
    // numeral directly followed by an identifier, as in `5x`
    AmbiguousNumeral { numeral_len: usize },
}

impl fmt::Display for LexErrTyp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChar => write!(f, "invalid character"),
            Self::AmbiguousNumeral { .. } => write!(f, "invalid decimal literal"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LexErr {
    pub typ: LexErrTyp,
    pub loc: SubStr,
}

pub const fn is_ident_start(chr: char) -> bool {
    chr.is_ascii_alphabetic() || chr == '_'
}

pub const fn is_ident_continue(chr: char) -> bool {
    chr.is_ascii_alphanumeric() || chr == '_'
}

#[derive(Debug)]
pub struct Lexer<'src> {
    src: &'src Arc<String>,
    cur: Peekable<CharIndices<'src>>,
    has_errored: bool, // tells iter to yield None after error
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src Arc<String>) -> Self {
        Self {
            src,
            cur: src.char_indices().peekable(),
            has_errored: false,
        }
    }

    pub fn src(&self) -> Arc<String> {
        Arc::clone(self.src)
    }

    fn span(&self, start: usize, len: usize) -> SubStr {
        SubStr::new(Arc::clone(self.src), start, len)
    }

    fn peek_chr(&mut self) -> Option<char> {
        self.cur.peek().map(|&(_, chr)| chr)
    }

    fn peek_nth(&mut self, n: usize) -> Option<char> {
        let (idx, _) = self.cur.peek().copied()?;
        self.src[idx..].chars().nth(n)
    }

    pub fn trim_whitespace(&mut self) {
        while let Some(chr) = self.peek_chr() {
            if chr.is_whitespace() {
                self.cur.next();
            } else {
                break;
            }
        }
    }

    pub fn consume_unambiguous(&mut self) -> Option<Tok> {
        let (idx, chr) = self.cur.peek().copied()?;
        let (typ, len) = match chr {
            '+' => (TokTyp::Op(OperatorTyp::Add), 1),
            '-' => (TokTyp::Op(OperatorTyp::Sub), 1),
            '^' => (TokTyp::Op(OperatorTyp::Exp), 1),
            '*' if self.peek_nth(1) == Some('*') => (TokTyp::Op(OperatorTyp::Exp), 2),
            '*' => (TokTyp::Op(OperatorTyp::Mul), 1),
            '/' if self.peek_nth(1) == Some('/') => (TokTyp::Op(OperatorTyp::FloorDiv), 2),
            '/' => (TokTyp::Op(OperatorTyp::Div), 1),
            '(' => (TokTyp::OpenParen, 1),
            ')' => (TokTyp::CloseParen, 1),
            _ => return None,
        };
        for _ in 0..len {
            self.cur.next();
        }
        Some(Tok {
            typ,
            loc: self.span(idx, len),
        })
    }

    pub fn consume_by<P>(&mut self, tok: &mut Tok, predicate: P)
    where
        P: Fn(char) -> bool,
    {
        while let Some(chr) = self.peek_chr() {
            if predicate(chr) {
                tok.loc.shift_right(chr.len_utf8());
                self.cur.next();
            } else {
                break;
            }
        }
    }

    // `digits`, `digits.`, `digits.digits` or `.digits`, then an optional
    // exponent. Caller guarantees the cursor is on a digit or a `.`.
    fn consume_number(&mut self, start: usize) -> Tok {
        let mut tok = Tok {
            typ: TokTyp::Number,
            loc: self.span(start, 0),
        };
        self.consume_by(&mut tok, |chr| chr.is_ascii_digit());
        if self.peek_chr() == Some('.') {
            tok.loc.shift_right(1);
            self.cur.next();
            self.consume_by(&mut tok, |chr| chr.is_ascii_digit());
        }

        // exponent only if a digit actually follows, so `2e` stays `2` `e`
        if let Some('e' | 'E') = self.peek_chr() {
            let exp_len = match (self.peek_nth(1), self.peek_nth(2)) {
                (Some(d), _) if d.is_ascii_digit() => Some(1),
                (Some('+' | '-'), Some(d)) if d.is_ascii_digit() => Some(2),
                _ => None,
            };
            if let Some(exp_len) = exp_len {
                for _ in 0..exp_len {
                    self.cur.next();
                }
                tok.loc.shift_right(exp_len);
                self.consume_by(&mut tok, |chr| chr.is_ascii_digit());
            }
        }
        tok
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Tok, LexErr>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_errored {
            return None;
        }

        self.trim_whitespace();

        let (next_idx, next_chr) = self.cur.peek().copied()?;
        let ret = if let Some(tok) = self.consume_unambiguous() {
            Ok(tok)
        } else if is_ident_start(next_chr) {
            let mut tok = Tok {
                typ: TokTyp::Ident,
                loc: self.span(next_idx, 0),
            };
            self.consume_by(&mut tok, is_ident_continue);
            Ok(tok)
        } else if next_chr.is_ascii_digit()
            || (next_chr == '.' && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()))
        {
            let mut tok = self.consume_number(next_idx);
            if self.peek_chr().is_some_and(is_ident_continue) {
                let numeral_len = tok.loc.len();
                // swallow the identifier so the span shows all of `5x`
                self.consume_by(&mut tok, is_ident_continue);
                Err(LexErr {
                    typ: LexErrTyp::AmbiguousNumeral { numeral_len },
                    loc: tok.loc,
                })
            } else {
                Ok(tok)
            }
        } else {
            Err(LexErr {
                typ: LexErrTyp::InvalidChar,
                loc: self.span(next_idx, next_chr.len_utf8()),
            })
        };
        if ret.is_err() {
            self.has_errored = true;
        }
        Some(ret)
    }
}

// SPDX: CC0-1.0

use crate::{eval, lex::SubStr, Number, SampleSet};
use core::{fmt, num::ParseFloatError};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bound {
    Min,
    Max,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Min => write!(f, "min x"),
            Self::Max => write!(f, "max x"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ValidateErrTyp {
    EmptyExpression,
    MissingBound(Bound),
    InvalidCharacters,
    // `None` when the text parsed but to a non-finite value
    NonNumericBound(Bound, Option<ParseFloatError>),
    InvalidRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValidateErr {
    pub typ: ValidateErrTyp,
    pub loc: SubStr,
}

impl fmt::Display for ValidateErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.typ {
            ValidateErrTyp::EmptyExpression => write!(f, "function cannot be empty"),
            ValidateErrTyp::MissingBound(_) => {
                write!(f, "please enter values for both min x and max x")
            }
            ValidateErrTyp::InvalidCharacters => write!(
                f,
                "invalid function format: unexpected character '{}'",
                self.loc
            ),
            ValidateErrTyp::NonNumericBound(bound, _) => write!(
                f,
                "min and max values must be numbers, but {bound} is '{}'",
                self.loc
            ),
            ValidateErrTyp::InvalidRange => write!(f, "min value must be less than max value"),
        }
    }
}

impl std::error::Error for ValidateErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.typ {
            ValidateErrTyp::NonNumericBound(_, Some(err)) => Some(err),
            _ => None,
        }
    }
}

// Coarse allow-list: ascii letters and digits, `_`, whitespace and
// `+ - * / ^ ( )`. Identifiers are not checked here.
pub const fn is_allowed(chr: char) -> bool {
    chr.is_ascii_alphanumeric()
        || chr == '_'
        || chr.is_ascii_whitespace()
        || matches!(chr, '+' | '-' | '*' | '/' | '^' | '(' | ')')
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlotRequest {
    pub expression: Arc<String>,
    pub min_x: Number,
    pub max_x: Number,
}

impl PlotRequest {
    pub fn evaluate(&self) -> Result<SampleSet, eval::EvalErr> {
        eval::eval_src(&self.expression, self.min_x..self.max_x)
    }
}

// Drops `_` digit separators, each of which must sit between two digits as
// in `1_000`. `None` if any `_` is misplaced.
fn strip_digit_separators(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let mut ret = String::with_capacity(text.len());
    for (idx, chr) in text.char_indices() {
        if chr != '_' {
            ret.push(chr);
            continue;
        }
        let before = idx.checked_sub(1).and_then(|i| bytes.get(i));
        let after = bytes.get(idx + 1);
        match (before, after) {
            (Some(b), Some(a)) if b.is_ascii_digit() && a.is_ascii_digit() => {}
            _ => return None,
        }
    }
    Some(ret)
}

fn parse_bound(bound: Bound, text: &SubStr) -> Result<Number, ValidateErr> {
    let trimmed = text.get().trim();
    let err = |parse_err| ValidateErr {
        typ: ValidateErrTyp::NonNumericBound(bound, parse_err),
        loc: text.clone(),
    };
    // a misplaced separator is left in, where it fails to parse
    let parsed = match strip_digit_separators(trimmed) {
        Some(digits) => digits.parse::<Number>(),
        None => trimmed.parse::<Number>(),
    };
    match parsed {
        Ok(val) if val.is_finite() => Ok(val),
        Ok(_) => Err(err(None)),
        Err(parse_err) => Err(err(Some(parse_err))),
    }
}

// Checks a plot request before anything is parsed. The first failing check
// wins, in this order: empty expression, missing bound, invalid
// characters, non-numeric bound, empty range.
pub fn validate(
    expression: impl Into<String>,
    min_x: impl Into<String>,
    max_x: impl Into<String>,
) -> Result<PlotRequest, ValidateErr> {
    let expression = SubStr::all(Arc::new(expression.into()));
    let min_x = SubStr::all(Arc::new(min_x.into()));
    let max_x = SubStr::all(Arc::new(max_x.into()));

    if expression.get().trim().is_empty() {
        return Err(ValidateErr {
            typ: ValidateErrTyp::EmptyExpression,
            loc: expression,
        });
    }

    for (bound, text) in [(Bound::Min, &min_x), (Bound::Max, &max_x)] {
        if text.is_empty() {
            return Err(ValidateErr {
                typ: ValidateErrTyp::MissingBound(bound),
                loc: text.clone(),
            });
        }
    }

    if let Some((idx, chr)) = expression
        .get()
        .char_indices()
        .find(|&(_, chr)| !is_allowed(chr))
    {
        return Err(ValidateErr {
            typ: ValidateErrTyp::InvalidCharacters,
            loc: SubStr::new(expression.src(), idx, chr.len_utf8()),
        });
    }

    let min = parse_bound(Bound::Min, &min_x)?;
    let max = parse_bound(Bound::Max, &max_x)?;

    if min >= max {
        return Err(ValidateErr {
            typ: ValidateErrTyp::InvalidRange,
            loc: max_x,
        });
    }

    let req = PlotRequest {
        expression: expression.src(),
        min_x: min,
        max_x: max,
    };
    log::debug!(
        "validated '{}' over [{}, {}]",
        req.expression,
        req.min_x,
        req.max_x
    );
    Ok(req)
}

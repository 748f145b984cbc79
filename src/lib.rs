// SPDX: CC0-1.0

pub mod eval;
pub mod lex;
pub mod parse;
pub mod sample;
pub mod shell;
pub mod stdlib;
pub mod validate;

use core::{fmt, num::NonZeroUsize};

pub use sample::SampleSet;

pub type Number = f64;

pub const RESOLUTION: NonZeroUsize = match NonZeroUsize::new(1000) {
    Some(n) => n,
    None => unreachable!(),
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PlotErr {
    Validate(validate::ValidateErr),
    Eval(eval::EvalErr),
}

impl PlotErr {
    pub fn loc(&self) -> &lex::SubStr {
        match self {
            Self::Validate(err) => &err.loc,
            Self::Eval(err) => &err.loc,
        }
    }
}

impl fmt::Display for PlotErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validate(err) => write!(f, "{err}"),
            Self::Eval(err) => write!(f, "error evaluating function: {err}"),
        }
    }
}

impl std::error::Error for PlotErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validate(err) => Some(err),
            Self::Eval(err) => Some(err),
        }
    }
}

impl From<validate::ValidateErr> for PlotErr {
    fn from(err: validate::ValidateErr) -> Self {
        Self::Validate(err)
    }
}

impl From<eval::EvalErr> for PlotErr {
    fn from(err: eval::EvalErr) -> Self {
        Self::Eval(err)
    }
}

/// Validate raw user input and, if it passes, sample the function over the
/// requested range.
pub fn plot(
    expression: impl Into<String>,
    min_x: impl Into<String>,
    max_x: impl Into<String>,
) -> Result<SampleSet, PlotErr> {
    let req = validate::validate(expression, min_x, max_x)?;
    Ok(req.evaluate()?)
}

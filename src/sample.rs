// SPDX: CC0-1.0

use crate::{Number, Point};
use core::{num::NonZeroUsize, ops::Range};

/// `n` evenly spaced values from `domain.start` to `domain.end`, both
/// included. The last value is exactly `domain.end`.
pub fn linspace(domain: Range<Number>, n: NonZeroUsize) -> Vec<Number> {
    let n = n.get();
    if n == 1 {
        return vec![domain.start];
    }

    let intervals = (n - 1) as Number;
    let step = (domain.end - domain.start) / intervals;
    let mut out: Vec<Number> = if step.is_finite() {
        (0..n)
            .map(|i| domain.start + i as Number * step)
            .collect()
    } else {
        // span overflows, interpolate instead
        (0..n)
            .map(|i| {
                let t = i as Number / intervals;
                domain.start * (1.0 - t) + domain.end * t
            })
            .collect()
    };
    out[n - 1] = domain.end;
    out
}

#[derive(Clone, Debug, PartialEq)]
pub struct SampleSet {
    pub x: Vec<Number>,
    pub y: Vec<Number>,
}

impl SampleSet {
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.x.len(), self.y.len());
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn points(&self) -> impl Iterator<Item = Point<Number>> + '_ {
        self.x.iter().zip(&self.y).map(|(&x, &y)| Point { x, y })
    }

    pub fn finite_y_range(&self) -> Option<Range<Number>> {
        self.y
            .iter()
            .copied()
            .filter(|y| y.is_finite())
            .fold(None, |acc, y| match acc {
                None => Some(y..y),
                Some(range) => Some(range.start.min(y)..range.end.max(y)),
            })
    }
}

// SPDX: CC0-1.0

use crate::{eval::*, Number};
use std::collections::HashMap;

pub const X: &str = "x";

pub fn standard_idents() -> Idents {
    let mut ret = HashMap::new();
    ret.insert(X.into(), Ident::Var);
    ret.insert("sqrt".into(), Ident::Fun(sqrt));
    ret.insert("log10".into(), Ident::Fun(log10));
    ret
}

pub fn neg(x: Number) -> Number {
    -x
}

pub fn pos(x: Number) -> Number {
    x
}

pub fn add(x: Number, y: Number) -> Number {
    x + y
}

pub fn sub(x: Number, y: Number) -> Number {
    x - y
}

pub fn mul(x: Number, y: Number) -> Number {
    x * y
}

pub fn div(x: Number, y: Number) -> Number {
    x / y
}

pub fn floor_div(x: Number, y: Number) -> Number {
    (x / y).floor()
}

pub fn exp(x: Number, exp: Number) -> Number {
    x.powf(exp)
}

pub fn sqrt(x: Number) -> Number {
    x.sqrt()
}

pub fn log10(x: Number) -> Number {
    x.log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_x_sqrt_and_log10() {
        let idents = standard_idents();
        assert_eq!(idents.len(), 3);
        assert!(matches!(idents.get(&X.into()), Some(Ident::Var)));
        for name in ["sqrt", "log10"] {
            assert!(matches!(idents.get(&name.into()), Some(Ident::Fun(_))));
        }
        for name in ["y", "sin", "pi", "e", "np"] {
            assert!(idents.get(&name.into()).is_none(), "{name}");
        }
    }

    #[test]
    fn domain_violations() {
        assert!(sqrt(-4.0).is_nan());
        assert!(log10(-4.0).is_nan());
        assert_eq!(log10(0.0), Number::NEG_INFINITY);
        assert_eq!(div(-1.0, 0.0), Number::NEG_INFINITY);
        assert!(div(0.0, 0.0).is_nan());
        assert!(exp(-8.0, 1.0 / 3.0).is_nan());
        assert_eq!(exp(0.0, -1.0), Number::INFINITY);
        assert_eq!(floor_div(1.0, 0.0), Number::INFINITY);
    }

    #[test]
    fn floor_division_rounds_down() {
        assert_eq!(floor_div(7.0, 2.0), 3.0);
        assert_eq!(floor_div(-7.0, 2.0), -4.0);
    }
}

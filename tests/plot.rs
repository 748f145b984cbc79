use approx::assert_relative_eq;
use function_plotter::{
    eval::{self, EvalErrTyp},
    parse::ParseErrTyp,
    plot,
    validate::{self, Bound, ValidateErrTyp},
    PlotErr, RESOLUTION,
};

fn validate_err(expression: &str, min_x: &str, max_x: &str) -> ValidateErrTyp {
    match plot(expression, min_x, max_x) {
        Err(PlotErr::Validate(err)) => err.typ,
        other => panic!("expected a validation error, got {other:?}"),
    }
}

fn eval_err(expression: &str, min_x: &str, max_x: &str) -> EvalErrTyp {
    match plot(expression, min_x, max_x) {
        Err(PlotErr::Eval(err)) => err.typ,
        other => panic!("expected an evaluation error, got {other:?}"),
    }
}

#[test]
fn sample_set_shape() {
    for (expr, min, max) in [
        ("x^2", "-10", "10"),
        ("5*x^3 + 2*x", "0", "1"),
        ("sqrt(x) + log10(x)", "1", "1000"),
        ("7", "-0.5", "0.5"),
    ] {
        let samples = plot(expr, min, max).unwrap();
        assert_eq!(samples.x.len(), RESOLUTION.get());
        assert_eq!(samples.y.len(), RESOLUTION.get());
        assert_eq!(samples.x[0], min.parse::<f64>().unwrap());
        assert_eq!(samples.x[999], max.parse::<f64>().unwrap());
        assert!(samples.x.windows(2).all(|w| w[0] < w[1]), "{expr}");
    }
}

#[test]
fn evaluation_is_deterministic() {
    let a = eval::evaluate("sqrt(x) * x^2 - 1/x", -3.0, 7.0).unwrap();
    let b = eval::evaluate("sqrt(x) * x^2 - 1/x", -3.0, 7.0).unwrap();
    let bits = |y: &[f64]| y.iter().map(|y| y.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&a.y), bits(&b.y));
}

#[test]
fn validation_errors() {
    assert_eq!(validate_err("", "0", "1"), ValidateErrTyp::EmptyExpression);
    assert_eq!(
        validate_err("x^2", "", "10"),
        ValidateErrTyp::MissingBound(Bound::Min)
    );
    assert!(matches!(
        validate_err("x^2", "a", "b"),
        ValidateErrTyp::NonNumericBound(Bound::Min, _)
    ));
    assert_eq!(validate_err("x^2", "10", "-10"), ValidateErrTyp::InvalidRange);
    assert_eq!(
        validate_err("x & 1", "0", "1"),
        ValidateErrTyp::InvalidCharacters
    );
}

#[test]
fn validate_does_not_evaluate() {
    // passes the character check, fails only once it is bound
    let req = validate::validate("x^2 + y^2", "-5", "5").unwrap();
    assert!(matches!(
        req.evaluate().unwrap_err().typ,
        EvalErrTyp::UnboundIdentifier { .. }
    ));
}

#[test]
fn square() {
    let samples = eval::evaluate("x^2", -10.0, 10.0).unwrap();
    for p in samples.points() {
        assert_relative_eq!(p.y, p.x * p.x, max_relative = 1e-12);
    }
}

#[test]
fn unbalanced_parenthesis() {
    assert_eq!(
        eval_err("sin(x", "0", "10"),
        EvalErrTyp::Syntax(ParseErrTyp::Unclosed)
    );
}

#[test]
fn unbound_identifier() {
    match eval_err("x^2 + y^2", "-5", "5") {
        EvalErrTyp::UnboundIdentifier { name } => assert_eq!(name.get(), "y"),
        typ => panic!("unexpected error {typ:?}"),
    }
    let err = plot("x^2 + y^2", "-5", "5").unwrap_err();
    assert_eq!(
        err.to_string(),
        "error evaluating function: name 'y' is not defined"
    );
}

#[test]
fn numeral_next_to_variable() {
    assert!(matches!(
        eval_err("5x", "0", "10"),
        EvalErrTyp::AmbiguousNumeralVariable { .. }
    ));
    // whitespace in between is a plain syntax error
    assert!(matches!(
        eval_err("5 x", "0", "10"),
        EvalErrTyp::Syntax(ParseErrTyp::Unexpected(_))
    ));
}

#[test]
fn pole_is_a_value_not_an_error() {
    // step is exactly 1, so x[333] == 0
    let samples = eval::evaluate("1/x", -333.0, 666.0).unwrap();
    assert_eq!(samples.x[333], 0.0);
    assert_eq!(samples.y[333], f64::INFINITY);
    assert!(samples.y.iter().filter(|y| !y.is_finite()).count() == 1);

    // no sample lands on the pole here, still no error
    let samples = plot("1/x", "-1", "1").unwrap();
    assert!(samples.points().all(|p| p.x != 0.0 || !p.y.is_finite()));
}

#[test]
fn domain_violations_become_nan() {
    let samples = plot("sqrt(x) + log10(x)", "-10", "10").unwrap();
    for p in samples.points() {
        if p.x < 0.0 {
            assert!(p.y.is_nan(), "{p:?}");
        } else if p.x > 0.0 {
            assert!(p.y.is_finite(), "{p:?}");
        }
    }
}

#[test]
fn unknown_functions_never_reach_evaluation() {
    for expr in ["sin(x)", "exp(x)", "np(x)", "eval(x)", "import"] {
        assert!(
            matches!(
                eval_err(expr, "0", "1"),
                EvalErrTyp::UnboundIdentifier { .. }
            ),
            "{expr}"
        );
    }
}

#[test]
fn long_sums_are_rejected_not_overflowed() {
    let long = format!("x{}", "+x".repeat(100_000));
    assert_eq!(
        eval_err(&long, "0", "1"),
        EvalErrTyp::Syntax(ParseErrTyp::TooDeep)
    );
    let err = eval::evaluate(&long[..10_001], 0.0, 1.0).unwrap_err();
    assert_eq!(err.typ, EvalErrTyp::Syntax(ParseErrTyp::TooDeep));

    let samples = plot(format!("x{}", "+x".repeat(99)), "0", "1").unwrap();
    for p in samples.points() {
        assert_relative_eq!(p.y, 100.0 * p.x, max_relative = 1e-12);
    }
}

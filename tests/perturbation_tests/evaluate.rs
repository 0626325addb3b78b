use super::*;

mod evaluate {
  use super::*;

  #[test]
  fn folds_bound_symbols() {
    let value = evaluate(&p("x^2 + 1"), &bindings([("x", 2.0)])).unwrap();
    assert_eq!(value, 5.0);
  }

  #[test]
  fn exact_rationals_become_floats() {
    let value = evaluate(&p("1 - eps/5 - eps^2/25"), &bindings([("eps", 1.0)]))
      .unwrap();
    assert!((value - 0.76).abs() < 1e-12);
  }

  #[test]
  fn constant_needs_no_bindings() {
    assert_eq!(evaluate(&p("2^10"), &Bindings::new()).unwrap(), 1024.0);
  }

  #[test]
  fn missing_binding_is_unresolved() {
    match evaluate(&p("x + y"), &bindings([("x", 1.0)])) {
      Err(PerturbError::UnresolvedSymbol(sym)) => assert_eq!(sym, s("y")),
      other => panic!("expected UnresolvedSymbol, got {other:?}"),
    }
  }

  #[test]
  fn unexpanded_trees_evaluate() {
    let e = p("(1 + x)^3*(2 - y)");
    let b = bindings([("x", 0.5), ("y", 0.25)]);
    let direct = evaluate(&e, &b).unwrap();
    let expanded = evaluate(&expand(&e).unwrap(), &b).unwrap();
    assert!((direct - expanded).abs() < 1e-12);
    assert!((direct - 1.5f64.powi(3) * 1.75).abs() < 1e-12);
  }
}

mod find_root {
  use super::*;

  #[test]
  fn quadratic_root() {
    let root = find_root(&p("x^2 - 2"), &s("x"), 1.0, &Bindings::new()).unwrap();
    assert!((root - 2f64.sqrt()).abs() < 1e-12);
  }

  #[test]
  fn parameters_are_bound() {
    let root =
      find_root(&p("x^5 + eps*x - 1"), &s("x"), 1.0, &bindings([("eps", 0.0)]))
        .unwrap();
    assert!((root - 1.0).abs() < 1e-12);
  }

  #[test]
  fn no_real_root_fails() {
    let result = find_root(&p("x^2 + 1"), &s("x"), 0.5, &Bindings::new());
    assert!(matches!(result, Err(PerturbError::NoConvergence { .. })));
  }

  #[test]
  fn unbound_parameter_is_unresolved() {
    let result = find_root(&p("x - a"), &s("x"), 0.0, &Bindings::new());
    assert!(matches!(result, Err(PerturbError::UnresolvedSymbol(_))));
  }
}

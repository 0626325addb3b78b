use super::*;

mod build_series {
  use super::*;

  #[test]
  fn second_order_with_base() {
    let series = build_series(
      &Expr::sym("eps"),
      &[s("a1"), s("a2")],
      Some(Expr::one()),
    );
    assert_eq!(expand(&series).unwrap(), expand(&p("1 + a1*eps + a2*eps^2")).unwrap());
  }

  #[test]
  fn base_defaults_to_zero() {
    let series = build_series(&Expr::sym("eps"), &[s("a1")], None);
    assert_eq!(expand(&series).unwrap(), p("a1*eps"));
  }

  #[test]
  fn each_coefficient_gets_one_power() {
    let coefficients = coefficient_symbols("a", 4);
    let series = build_series(&Expr::sym("eps"), &coefficients, Some(Expr::sym("M")));
    let collected = collect_powers(&series, &s("eps"), &[0, 1, 2, 3, 4], 10).unwrap();
    assert_eq!(collected[0], Expr::sym("M"));
    for (i, coeff) in coefficients.iter().enumerate() {
      assert_eq!(collected[i + 1], Expr::Symbol(coeff.clone()));
    }
  }

  #[test]
  fn no_coefficients_is_just_the_base() {
    let series = build_series(&Expr::sym("eps"), &[], Some(Expr::int(3)));
    assert_eq!(expand(&series).unwrap(), Expr::int(3));
  }

  #[test]
  fn coefficient_names() {
    let names: Vec<String> = coefficient_symbols("c", 3)
      .iter()
      .map(|sym| sym.name().to_string())
      .collect();
    assert_eq!(names, vec!["c1", "c2", "c3"]);
  }
}

mod maclaurin {
  use super::*;

  #[test]
  fn sin_coefficients() {
    let x = Expr::sym("x");
    assert_eq!(expand(&sin_taylor(&x, 5)).unwrap(), expand(&p("x - x^3/6 + x^5/120")).unwrap());
    assert_eq!(expand(&sin_taylor(&x, 6)).unwrap(), expand(&sin_taylor(&x, 5)).unwrap());
    assert_eq!(sin_taylor(&x, 0), Expr::zero());
  }

  #[test]
  fn cos_coefficients() {
    let x = Expr::sym("x");
    assert_eq!(expand(&cos_taylor(&x, 4)).unwrap(), expand(&p("1 - x^2/2 + x^4/24")).unwrap());
  }

  #[test]
  fn high_order_matches_std() {
    let x = Expr::sym("x");
    let b = bindings([("x", 0.5)]);
    let sin = evaluate(&sin_taylor(&x, 15), &b).unwrap();
    let cos = evaluate(&cos_taylor(&x, 14), &b).unwrap();
    assert!((sin - 0.5f64.sin()).abs() < 1e-12);
    assert!((cos - 0.5f64.cos()).abs() < 1e-12);
  }

  #[test]
  fn derivative_of_sin_is_cos() {
    let x = Expr::sym("x");
    assert_eq!(
      differentiate(&sin_taylor(&x, 9), &s("x")).unwrap(),
      expand(&cos_taylor(&x, 8)).unwrap()
    );
  }
}

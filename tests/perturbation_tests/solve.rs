use super::*;

mod solve_coefficients {
  use super::*;

  #[test]
  fn quintic_coefficients() {
    let equations = vec![p("1 + 5*a1"), p("a1 + 5*a2 + 10*a1^2")];
    let assignment = solve_coefficients(&equations, &[s("a1"), s("a2")]).unwrap();
    assert_eq!(assignment.get(&s("a1")), Some(&Expr::rational(-1, 5).unwrap()));
    assert_eq!(assignment.get(&s("a2")), Some(&Expr::rational(-1, 25).unwrap()));
    assert_eq!(assignment.len(), 2);
  }

  #[test]
  fn resolution_order_is_kept() {
    let equations = vec![p("a1 - 1"), p("a2 - a1")];
    let assignment = solve_coefficients(&equations, &[s("a1"), s("a2")]).unwrap();
    let order: Vec<&str> = assignment.iter().map(|(sym, _)| sym.name()).collect();
    assert_eq!(order, vec!["a1", "a2"]);
  }

  #[test]
  fn values_may_depend_on_free_symbols() {
    let equations = vec![p("a1 - M"), p("2*a2 - 4*a1*M")];
    let assignment = solve_coefficients(&equations, &[s("a1"), s("a2")]).unwrap();
    assert_eq!(assignment.get(&s("a1")), Some(&Expr::sym("M")));
    assert_eq!(assignment.get(&s("a2")), Some(&expand(&p("2*M^2")).unwrap()));
  }

  #[test]
  fn empty_system() {
    let assignment = solve_coefficients(&[], &[]).unwrap();
    assert!(assignment.is_empty());
  }

  #[test]
  fn absent_unknown_is_a_linear_failure() {
    match solve_coefficients(&[Expr::int(5)], &[s("a1")]) {
      Err(PerturbError::LinearSolveFailure {
        index,
        unknown,
        reason,
      }) => {
        assert_eq!(index, 0);
        assert_eq!(unknown, s("a1"));
        assert_eq!(reason, LinearFailure::ZeroCoefficient);
      }
      other => panic!("expected LinearSolveFailure, got {other:?}"),
    }
  }

  #[test]
  fn cancelling_coefficient_reports_failing_index() {
    // a2 cancels once a1 = 1 is substituted
    let equations = vec![p("a1 - 1"), p("a1*a2 - a2 + 3")];
    match solve_coefficients(&equations, &[s("a1"), s("a2")]) {
      Err(PerturbError::LinearSolveFailure { index, unknown, .. }) => {
        assert_eq!(index, 1);
        assert_eq!(unknown, s("a2"));
      }
      other => panic!("expected LinearSolveFailure, got {other:?}"),
    }
  }

  #[test]
  fn shape_mismatch() {
    let result = solve_coefficients(&[p("a1"), p("a2")], &[s("a1")]);
    assert!(matches!(
      result,
      Err(PerturbError::ShapeMismatch {
        equations: 2,
        unknowns: 1
      })
    ));
  }

  #[test]
  fn nonlinear_unknown() {
    let result = solve_coefficients(&[p("a1^2 - 4")], &[s("a1")]);
    assert!(matches!(
      result,
      Err(PerturbError::LinearSolveFailure {
        reason: LinearFailure::NonLinear { degree: 2 },
        ..
      })
    ));
  }

  #[test]
  fn symbolic_coefficient() {
    let result = solve_coefficients(&[p("M*a1 - 1")], &[s("a1")]);
    match result {
      Err(PerturbError::LinearSolveFailure {
        reason: LinearFailure::NonConstantCoefficient(c),
        ..
      }) => assert_eq!(c, Expr::sym("M")),
      other => panic!("expected NonConstantCoefficient, got {other:?}"),
    }
  }

  #[test]
  fn duplicate_unknown() {
    let result = solve_coefficients(&[p("a1 - 1"), p("a1 - 2")], &[s("a1"), s("a1")]);
    assert!(matches!(result, Err(PerturbError::DuplicateUnknown(_))));
  }
}

mod triangularity {
  use super::*;

  #[test]
  fn later_unknown_is_rejected() {
    let equations = vec![p("a1 + a2"), p("a2 - 1")];
    match solve_coefficients(&equations, &[s("a1"), s("a2")]) {
      Err(PerturbError::LinearSolveFailure {
        index: 0,
        reason: LinearFailure::LaterUnknown(later),
        ..
      }) => assert_eq!(later, s("a2")),
      other => panic!("expected LaterUnknown, got {other:?}"),
    }
  }

  #[test]
  fn verification_can_be_disabled() {
    let equations = vec![p("a1 + a2"), p("a2 - 1")];
    let options = SolveOptions {
      verify_triangular: false,
    };
    let assignment =
      solve_coefficients_with(&equations, &[s("a1"), s("a2")], &options).unwrap();
    assert_eq!(assignment.get(&s("a1")), Some(&expand(&p("-a2")).unwrap()));
    assert_eq!(assignment.get(&s("a2")), Some(&Expr::int(1)));
  }
}

mod coefficient_assignment {
  use super::*;

  #[test]
  fn write_once() {
    let mut assignment = CoefficientAssignment::default();
    assignment.insert(s("a1"), Expr::int(1)).unwrap();
    assert!(matches!(
      assignment.insert(s("a1"), Expr::int(2)),
      Err(PerturbError::DuplicateUnknown(_))
    ));
    assert_eq!(assignment.get(&s("a1")), Some(&Expr::int(1)));
  }

  #[test]
  fn becomes_a_substitution_map() {
    let mut assignment = CoefficientAssignment::default();
    assignment.insert(s("a1"), Expr::rational(-1, 5).unwrap()).unwrap();
    let map = assignment.to_substitution_map();
    assert_eq!(
      expand(&substitute(&p("1 + a1*eps"), &map)).unwrap(),
      expand(&p("1 - eps/5")).unwrap()
    );
  }
}

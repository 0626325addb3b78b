use tracing::debug;

use super::{
  Bindings, Monomial, Polynomial, SubstitutionMap, add_term, evaluate,
  from_polynomial, substitute, to_polynomial,
};
use crate::PerturbError;
use crate::syntax::{Expr, Number, Symbol};

// ─── D ──────────────────────────────────────────────────────────────

/// D[expr, var] for polynomial expressions.
pub fn differentiate(expr: &Expr, var: &Symbol) -> Result<Expr, PerturbError> {
  let mut result = Polynomial::new();
  for (mono, coeff) in to_polynomial(expr)? {
    let d = mono.degree_of(var);
    if d == 0 {
      continue;
    }
    let lowered = mono.without(var).mul(&Monomial::var(var.clone(), d - 1))?;
    add_term(&mut result, lowered, coeff * Number::integer(i64::from(d)));
  }
  Ok(from_polynomial(&result))
}

// ─── FindRoot ───────────────────────────────────────────────────────

const MAX_ITERATIONS: usize = 100;
const TOLERANCE: f64 = 1e-15;
const ACCEPT_RESIDUAL: f64 = 1e-10;

/// FindRoot[expr == 0, {var, x0}] by Newton's method.
///
/// Every symbol other than `var` must be bound. Used as the numeric
/// reference against which perturbation results are checked.
pub fn find_root(
  expr: &Expr,
  var: &Symbol,
  x0: f64,
  bindings: &Bindings,
) -> Result<f64, PerturbError> {
  // Fix the parameters once so each step only binds `var`.
  let params: SubstitutionMap = bindings
    .iter()
    .filter(|(sym, _)| *sym != var)
    .map(|(sym, value)| (Expr::Symbol(sym.clone()), Expr::real(*value)))
    .collect();
  let func = super::expand(&substitute(expr, &params))?;
  let deriv = differentiate(&func, var)?;

  let eval_at = |e: &Expr, x: f64| -> Result<f64, PerturbError> {
    let mut at = Bindings::new();
    at.insert(var.clone(), x);
    evaluate(e, &at)
  };

  let mut x = x0;
  let mut fx = eval_at(&func, x)?;
  for iteration in 0..MAX_ITERATIONS {
    if fx.abs() < TOLERANCE {
      return Ok(x);
    }
    let fpx = eval_at(&deriv, x)?;
    let step = if fpx.abs() < 1e-30 {
      // Derivative too small, try a secant step
      let h = 1e-8;
      let slope = (eval_at(&func, x + h)? - fx) / h;
      if slope.abs() < 1e-30 {
        return Err(PerturbError::NoConvergence {
          iterations: iteration,
          residual: fx.abs(),
        });
      }
      fx / slope
    } else {
      fx / fpx
    };
    x -= step;
    fx = eval_at(&func, x)?;
    if step.abs() <= TOLERANCE * (1.0 + x.abs()) {
      break;
    }
  }

  debug!(var = %var, root = x, residual = fx.abs(), "find_root finished");
  if fx.abs() <= ACCEPT_RESIDUAL {
    Ok(x)
  } else {
    Err(PerturbError::NoConvergence {
      iterations: MAX_ITERATIONS,
      residual: fx.abs(),
    })
  }
}

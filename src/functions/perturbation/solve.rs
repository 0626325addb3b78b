use tracing::debug;

use crate::PerturbError;
use crate::functions::{
  Polynomial, SubstitutionMap, add_term, expand, from_polynomial, substitute,
  to_polynomial,
};
use crate::syntax::{Expr, Symbol};

/// Why equation `i` could not be read as `a*u_i + b = 0` with numeric `a != 0`.
#[derive(Debug, Clone, PartialEq)]
pub enum LinearFailure {
  ZeroCoefficient,
  NonConstantCoefficient(Expr),
  NonLinear { degree: u32 },
  LaterUnknown(Symbol),
}

impl std::fmt::Display for LinearFailure {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      LinearFailure::ZeroCoefficient => {
        write!(f, "coefficient of the unknown is zero")
      }
      LinearFailure::NonConstantCoefficient(c) => {
        write!(f, "coefficient of the unknown is not numeric: {c}")
      }
      LinearFailure::NonLinear { degree } => {
        write!(f, "unknown appears with degree {degree}")
      }
      LinearFailure::LaterUnknown(s) => {
        write!(f, "equation depends on later unknown {s}")
      }
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveOptions {
  /// Reject equation `i` if it still mentions an unknown after `i`.
  pub verify_triangular: bool,
}

impl Default for SolveOptions {
  fn default() -> Self {
    SolveOptions {
      verify_triangular: true,
    }
  }
}

// ─── CoefficientAssignment ──────────────────────────────────────────

/// Unknown → resolved value, in resolution order. Write-once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoefficientAssignment {
  entries: Vec<(Symbol, Expr)>,
}

impl CoefficientAssignment {
  pub fn get(&self, unknown: &Symbol) -> Option<&Expr> {
    self
      .entries
      .iter()
      .find(|(s, _)| s == unknown)
      .map(|(_, v)| v)
  }

  pub fn contains(&self, unknown: &Symbol) -> bool {
    self.get(unknown).is_some()
  }

  pub fn insert(&mut self, unknown: Symbol, value: Expr) -> Result<(), PerturbError> {
    if self.contains(&unknown) {
      return Err(PerturbError::DuplicateUnknown(unknown));
    }
    self.entries.push((unknown, value));
    Ok(())
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Expr)> {
    self.entries.iter().map(|(s, v)| (s, v))
  }

  pub fn to_substitution_map(&self) -> SubstitutionMap {
    self
      .entries
      .iter()
      .map(|(s, v)| (Expr::Symbol(s.clone()), v.clone()))
      .collect()
  }
}

// ─── SolveCoefficients ──────────────────────────────────────────────

/// Forward substitution over a triangular system, triangularity verified.
pub fn solve_coefficients(
  equations: &[Expr],
  unknowns: &[Symbol],
) -> Result<CoefficientAssignment, PerturbError> {
  solve_coefficients_with(equations, unknowns, &SolveOptions::default())
}

/// Solve `equations[i] == 0` for `unknowns[i]`, i = 0, 1, ...
///
/// Earlier results are substituted first, so equation `i` must be linear in
/// `unknowns[i]` with a non-zero numeric coefficient. This is not Gaussian
/// elimination; the first equation that fails aborts the solve.
///
/// A symbolic coefficient such as `M` in `M*a1 - 1` is rejected with
/// `NonConstantCoefficient`: there is no division node to hold `1/M`. That
/// reason is independent of the triangularity check (`LaterUnknown`).
pub fn solve_coefficients_with(
  equations: &[Expr],
  unknowns: &[Symbol],
  options: &SolveOptions,
) -> Result<CoefficientAssignment, PerturbError> {
  if equations.len() != unknowns.len() {
    return Err(PerturbError::ShapeMismatch {
      equations: equations.len(),
      unknowns: unknowns.len(),
    });
  }

  for (index, unknown) in unknowns.iter().enumerate() {
    if unknowns[..index].contains(unknown) {
      return Err(PerturbError::DuplicateUnknown(unknown.clone()));
    }
  }

  let mut assignment = CoefficientAssignment::default();
  for (index, (equation, unknown)) in equations.iter().zip(unknowns).enumerate() {
    let fail = |reason: LinearFailure| PerturbError::LinearSolveFailure {
      index,
      unknown: unknown.clone(),
      reason,
    };

    let substituted = substitute(equation, &assignment.to_substitution_map());
    let poly = to_polynomial(&substituted)?;

    if options.verify_triangular {
      let later = unknowns[index + 1..]
        .iter()
        .find(|u| poly.keys().any(|m| m.degree_of(u) > 0));
      if let Some(later) = later {
        return Err(fail(LinearFailure::LaterUnknown(later.clone())));
      }
    }

    // equation = slope*unknown + rest
    let mut slope = Polynomial::new();
    let mut rest = Polynomial::new();
    for (mono, coeff) in poly {
      match mono.degree_of(unknown) {
        0 => add_term(&mut rest, mono, coeff),
        1 => add_term(&mut slope, mono.without(unknown), coeff),
        degree => return Err(fail(LinearFailure::NonLinear { degree })),
      }
    }

    let slope = from_polynomial(&slope);
    let inverse = match slope.as_number() {
      Some(n) => n
        .recip()
        .ok_or_else(|| fail(LinearFailure::ZeroCoefficient))?,
      None => {
        return Err(fail(LinearFailure::NonConstantCoefficient(slope.clone())));
      }
    };
    let value = expand(&Expr::Product(vec![
      Expr::Constant(-inverse),
      from_polynomial(&rest),
    ]))?;
    debug!(index, unknown = %unknown, value = %value, "resolved coefficient");
    assignment.insert(unknown.clone(), value)?;
  }
  Ok(assignment)
}

use tracing::{debug, warn};

use super::{
  CoefficientAssignment, SolveOptions, build_series, coefficient_symbols,
  collect_powers, solve_coefficients_with,
};
use crate::PerturbError;
use crate::functions::{Bindings, SubstitutionMap, evaluate, expand, substitute};
use crate::syntax::{Expr, Symbol};

/// Knobs for one perturbation solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerturbationConfig {
  /// Number of series coefficients, i.e. the truncation order.
  pub order: usize,
  /// Powers of the perturbation variable above `order` and up to this bound
  /// are discarded before coefficients are read.
  pub max_power_bound: u32,
  pub verify_triangular: bool,
}

impl Default for PerturbationConfig {
  fn default() -> Self {
    PerturbationConfig {
      order: 2,
      max_power_bound: 20,
      verify_triangular: true,
    }
  }
}

/// `equation(unknown, var) == 0`, solved as a series in `var` around `base`.
#[derive(Debug, Clone)]
pub struct PerturbationProblem {
  equation: Expr,
  unknown: Symbol,
  var: Symbol,
  base: Expr,
  coefficient_prefix: String,
  config: PerturbationConfig,
}

impl PerturbationProblem {
  pub fn new(equation: Expr, unknown: impl Into<Symbol>, var: impl Into<Symbol>) -> Self {
    PerturbationProblem {
      equation,
      unknown: unknown.into(),
      var: var.into(),
      base: Expr::zero(),
      coefficient_prefix: "a".to_string(),
      config: PerturbationConfig::default(),
    }
  }

  /// Zeroth-order term: the exact solution when `var == 0`.
  pub fn with_base(mut self, base: Expr) -> Self {
    self.base = base;
    self
  }

  pub fn with_config(mut self, config: PerturbationConfig) -> Self {
    self.config = config;
    self
  }

  /// Names of the generated unknowns (`a1, a2, ...` by default). They must
  /// not clash with symbols already in the equation.
  pub fn with_coefficient_prefix(mut self, prefix: &str) -> Self {
    self.coefficient_prefix = prefix.to_string();
    self
  }

  pub fn config(&self) -> &PerturbationConfig {
    &self.config
  }

  pub fn solve(&self) -> Result<PerturbationSolution, PerturbError> {
    let order = self.config.order;
    let coefficients = coefficient_symbols(&self.coefficient_prefix, order);
    if let Some(clash) = self
      .equation
      .symbols()
      .into_iter()
      .find(|s| coefficients.contains(s))
    {
      return Err(PerturbError::DuplicateUnknown(clash));
    }

    let var = Expr::Symbol(self.var.clone());
    let series = build_series(&var, &coefficients, Some(self.base.clone()));
    let substituted = substitute(
      &self.equation,
      &SubstitutionMap::new().with(self.unknown.clone(), series.clone()),
    );

    let max_power = u32::try_from(order).unwrap_or(u32::MAX);
    let powers: Vec<u32> = (0..=max_power).collect();
    let mut collected = collect_powers(
      &substituted,
      &self.var,
      &powers,
      self.config.max_power_bound,
    )?;
    let residue = collected.remove(0);
    if residue != Expr::zero() {
      warn!(residue = %residue, "base does not solve the unperturbed equation");
    }
    let equations = collected;
    debug!(order, equations = equations.len(), "coefficient equations collected");

    let assignment = solve_coefficients_with(
      &equations,
      &coefficients,
      &SolveOptions {
        verify_triangular: self.config.verify_triangular,
      },
    )?;
    let approximation = expand(&substitute(&series, &assignment.to_substitution_map()))?;

    Ok(PerturbationSolution {
      var: self.var.clone(),
      series,
      equations,
      assignment,
      approximation,
    })
  }
}

#[derive(Debug, Clone)]
pub struct PerturbationSolution {
  var: Symbol,
  /// `base + a1*var + ...` before the coefficients were known.
  pub series: Expr,
  /// One coefficient equation per order, `equations[i]` for `var^(i+1)`.
  pub equations: Vec<Expr>,
  pub assignment: CoefficientAssignment,
  /// The series with every coefficient substituted, expanded.
  pub approximation: Expr,
}

impl PerturbationSolution {
  pub fn var(&self) -> &Symbol {
    &self.var
  }

  /// Evaluate the approximation at `var = value`; `params` binds the rest.
  pub fn evaluate_at(&self, value: f64, params: &Bindings) -> Result<f64, PerturbError> {
    let mut bindings = params.clone();
    bindings.insert(self.var.clone(), value);
    evaluate(&self.approximation, &bindings)
  }
}

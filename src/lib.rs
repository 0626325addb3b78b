use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

pub mod functions;
pub mod syntax;

pub use functions::*;
pub use syntax::{Expr, Number, Symbol};

#[derive(Parser)]
#[grammar = "perturb.pest"]
pub struct PerturbParser;

#[derive(Error, Debug)]
pub enum PerturbError {
  #[error("Parse error: {0}")]
  ParseError(#[from] Box<pest::error::Error<Rule>>),
  #[error("Unsupported exponent: {0} (only non-negative integer powers)")]
  UnsupportedExponent(String),
  #[error("Unsupported division by {0} (only non-zero numeric divisors)")]
  UnsupportedDivision(String),
  #[error("Shape mismatch: {equations} equations for {unknowns} unknowns")]
  ShapeMismatch { equations: usize, unknowns: usize },
  #[error("Cannot solve equation {index} for {unknown}: {reason}")]
  LinearSolveFailure {
    index: usize,
    unknown: Symbol,
    reason: LinearFailure,
  },
  #[error("Unknown {0} is listed more than once")]
  DuplicateUnknown(Symbol),
  #[error("Unresolved symbol: {0}")]
  UnresolvedSymbol(Symbol),
  #[error("Root finding did not converge after {iterations} iterations (residual {residual:e})")]
  NoConvergence { iterations: usize, residual: f64 },
}

impl PerturbParser {
  pub fn parse_program(
    input: &str,
  ) -> Result<pest::iterators::Pairs<'_, Rule>, Box<pest::error::Error<Rule>>>
  {
    Self::parse(Rule::Program, input).map_err(Box::new)
  }
}

pub fn parse(
  input: &str,
) -> Result<pest::iterators::Pairs<'_, Rule>, Box<pest::error::Error<Rule>>> {
  PerturbParser::parse_program(input)
}

/// Parse a textual expression such as `x^5 + eps*x - 1`.
pub fn parse_expr(input: &str) -> Result<Expr, PerturbError> {
  let mut pairs = parse(input)?;
  let program = match pairs.next() {
    Some(p) => p,
    None => return Ok(Expr::zero()),
  };
  for node in program.into_inner() {
    if node.as_rule() == Rule::Expression {
      return syntax::pair_to_expr(node);
    }
  }
  Ok(Expr::zero())
}

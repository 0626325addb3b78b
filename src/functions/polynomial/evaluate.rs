use std::collections::HashMap;

use super::{SubstitutionMap, substitute};
use crate::PerturbError;
use crate::syntax::{Expr, Symbol};

/// Numeric values for free symbols.
pub type Bindings = HashMap<Symbol, f64>;

/// Build bindings from `(name, value)` pairs.
pub fn bindings<'a, I>(pairs: I) -> Bindings
where
  I: IntoIterator<Item = (&'a str, f64)>,
{
  pairs
    .into_iter()
    .map(|(name, value)| (Symbol::new(name), value))
    .collect()
}

// ─── Evaluate ───────────────────────────────────────────────────────

/// Substitute every bound symbol by its value, then fold to a number.
pub fn evaluate(expr: &Expr, bindings: &Bindings) -> Result<f64, PerturbError> {
  let map: SubstitutionMap = bindings
    .iter()
    .map(|(sym, value)| (Expr::Symbol(sym.clone()), Expr::real(*value)))
    .collect();
  fold_numeric(&substitute(expr, &map))
}

/// Fold a symbol-free expression. A remaining symbol is an error.
pub fn fold_numeric(expr: &Expr) -> Result<f64, PerturbError> {
  match expr {
    Expr::Constant(n) => Ok(n.to_f64()),
    Expr::Symbol(s) => Err(PerturbError::UnresolvedSymbol(s.clone())),
    Expr::Sum(items) => items.iter().map(fold_numeric).sum(),
    Expr::Product(items) => items.iter().map(fold_numeric).product(),
    Expr::Power(base, n) => {
      let b = fold_numeric(base)?;
      Ok(match i32::try_from(*n) {
        Ok(k) => b.powi(k),
        Err(_) => b.powf(f64::from(*n)),
      })
    }
  }
}

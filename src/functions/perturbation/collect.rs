use tracing::debug;

use crate::PerturbError;
use crate::functions::{Polynomial, add_term, from_polynomial, to_polynomial};
use crate::syntax::{Expr, Symbol};

// ─── CollectPowers ──────────────────────────────────────────────────

/// Coefficient of `var^i` for every requested `i`, in request order.
///
/// 1. Expand `expr`.
/// 2. Zero `var^j` for `max(powers) < j <= max_power_bound`.
/// 3. For each `i`, set `var^i -> 1` and every other `var^j`
///    (`1 <= j <= max(powers)`) to 0. Power 0 is the `var`-free residue.
///
/// `max_power_bound` is a truncation knob, not a validity check: a term above
/// it silently vanishes too, since `var -> 0` also zeroes the base of its
/// `var^d` factor. No returned coefficient contains `var`. Choose the bound
/// generously (10 to 20 for trigonometric expansions).
pub fn collect_powers(
  expr: &Expr,
  var: &Symbol,
  powers: &[u32],
  max_power_bound: u32,
) -> Result<Vec<Expr>, PerturbError> {
  let expanded = to_polynomial(expr)?;
  let top = powers.iter().copied().max().unwrap_or(0);
  debug!(
    var = %var,
    terms = expanded.len(),
    top,
    max_power_bound,
    "collecting powers"
  );

  let beyond_bound = expanded
    .keys()
    .filter(|m| m.degree_of(var) > top.max(max_power_bound))
    .count();
  if beyond_bound > 0 {
    debug!(
      terms = beyond_bound,
      max_power_bound, "terms above the power bound truncated"
    );
  }

  let bounded: Polynomial = expanded
    .into_iter()
    .filter(|(mono, _)| mono.degree_of(var) <= top)
    .collect();

  Ok(
    powers
      .iter()
      .map(|&i| {
        let mut coeff = Polynomial::new();
        for (mono, c) in &bounded {
          if mono.degree_of(var) == i {
            add_term(&mut coeff, mono.without(var), c.clone());
          }
        }
        from_polynomial(&coeff)
      })
      .collect(),
  )
}

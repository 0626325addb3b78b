use num_bigint::BigInt;
use num_rational::BigRational;

use crate::functions::integer_power;
use crate::syntax::{Expr, Number, Symbol};

// ─── Series ─────────────────────────────────────────────────────────

/// `base + c1*var + c2*var^2 + ... + cn*var^n`.
///
/// Coefficients are indexed from 1; the zeroth-order term is `base`
/// (zero when omitted), the exact solution of the unperturbed problem.
pub fn build_series(var: &Expr, coefficients: &[Symbol], base: Option<Expr>) -> Expr {
  let mut items = Vec::with_capacity(coefficients.len() + 1);
  items.push(base.unwrap_or_else(Expr::zero));
  for (i, coeff) in coefficients.iter().enumerate() {
    let exponent = u32::try_from(i + 1).unwrap_or(u32::MAX);
    items.push(Expr::Product(vec![
      Expr::Symbol(coeff.clone()),
      integer_power(var, exponent),
    ]));
  }
  Expr::Sum(items)
}

/// `prefix1, prefix2, ..., prefixn`
pub fn coefficient_symbols(prefix: &str, n: usize) -> Vec<Symbol> {
  (1..=n).map(|i| Symbol::new(format!("{prefix}{i}"))).collect()
}

// ─── Maclaurin polynomials ──────────────────────────────────────────

fn factorial(n: u32) -> BigInt {
  (1..=n).fold(BigInt::from(1), |acc, k| acc * BigInt::from(k))
}

fn maclaurin(x: &Expr, order: u32, first: u32) -> Expr {
  let mut items = Vec::new();
  let mut sign = 1i64;
  let mut k = first;
  while k <= order {
    let coeff = BigRational::new(BigInt::from(sign), factorial(k));
    items.push(Expr::Product(vec![
      Expr::Constant(Number::Rational(coeff)),
      integer_power(x, k),
    ]));
    sign = -sign;
    k += 2;
  }
  match items.len() {
    0 => Expr::zero(),
    1 => items.remove(0),
    _ => Expr::Sum(items),
  }
}

/// sin(x) truncated after degree `order`: x - x^3/3! + x^5/5! - ...
pub fn sin_taylor(x: &Expr, order: u32) -> Expr {
  maclaurin(x, order, 1)
}

/// cos(x) truncated after degree `order`: 1 - x^2/2! + x^4/4! - ...
pub fn cos_taylor(x: &Expr, order: u32) -> Expr {
  maclaurin(x, order, 0)
}

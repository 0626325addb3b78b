use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::trace;

use crate::PerturbError;
use crate::syntax::{Expr, Number, Symbol};

// ─── Monomial ───────────────────────────────────────────────────────

/// Product of symbol powers, sorted by symbol, without zero exponents.
/// E.g. a1^2*eps → [(a1, 2), (eps, 1)]; the empty monomial is 1.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Monomial(Vec<(Symbol, u32)>);

impl Monomial {
  pub fn one() -> Self {
    Monomial(Vec::new())
  }

  pub fn var(sym: Symbol, exponent: u32) -> Self {
    if exponent == 0 {
      Monomial::one()
    } else {
      Monomial(vec![(sym, exponent)])
    }
  }

  pub fn factors(&self) -> &[(Symbol, u32)] {
    &self.0
  }

  pub fn is_one(&self) -> bool {
    self.0.is_empty()
  }

  pub fn total_degree(&self) -> u64 {
    self.0.iter().map(|(_, k)| u64::from(*k)).sum()
  }

  pub fn degree_of(&self, var: &Symbol) -> u32 {
    self
      .0
      .iter()
      .find(|(s, _)| s == var)
      .map(|(_, k)| *k)
      .unwrap_or(0)
  }

  /// The monomial with every `var` factor removed.
  pub fn without(&self, var: &Symbol) -> Monomial {
    Monomial(self.0.iter().filter(|(s, _)| s != var).cloned().collect())
  }

  /// Merge two monomials. An exponent that overflows `u32` is an error.
  pub fn mul(&self, other: &Monomial) -> Result<Monomial, PerturbError> {
    let mut merged: Vec<(Symbol, u32)> = Vec::with_capacity(self.0.len() + other.0.len());
    let (mut i, mut j) = (0, 0);
    while i < self.0.len() && j < other.0.len() {
      match self.0[i].0.cmp(&other.0[j].0) {
        Ordering::Less => {
          merged.push(self.0[i].clone());
          i += 1;
        }
        Ordering::Greater => {
          merged.push(other.0[j].clone());
          j += 1;
        }
        Ordering::Equal => {
          let (sym, k) = &self.0[i];
          let other_k = other.0[j].1;
          let exponent = k.checked_add(other_k).ok_or_else(|| {
            exponent_overflow(sym, format!("{sym}^{k}*{sym}^{other_k}"))
          })?;
          merged.push((sym.clone(), exponent));
          i += 1;
          j += 1;
        }
      }
    }
    merged.extend_from_slice(&self.0[i..]);
    merged.extend_from_slice(&other.0[j..]);
    Ok(Monomial(merged))
  }

  pub fn pow(&self, n: u32) -> Result<Monomial, PerturbError> {
    if n == 0 {
      return Ok(Monomial::one());
    }
    self
      .0
      .iter()
      .map(|(s, k)| {
        k.checked_mul(n)
          .map(|exponent| (s.clone(), exponent))
          .ok_or_else(|| exponent_overflow(s, format!("({s}^{k})^{n}")))
      })
      .collect::<Result<Vec<_>, _>>()
      .map(Monomial)
  }

  /// Factors as expressions: `x` for exponent one, `x^k` otherwise.
  pub fn to_factors(&self) -> Vec<Expr> {
    self
      .0
      .iter()
      .map(|(s, k)| {
        if *k == 1 {
          Expr::Symbol(s.clone())
        } else {
          Expr::Power(Box::new(Expr::Symbol(s.clone())), *k)
        }
      })
      .collect()
  }
}

fn exponent_overflow(sym: &Symbol, shown: String) -> PerturbError {
  PerturbError::UnsupportedExponent(format!(
    "{shown}: exponent of {sym} exceeds {}",
    u32::MAX
  ))
}

// Graded order: constants first, then by total degree, then lexicographic.
impl Ord for Monomial {
  fn cmp(&self, other: &Self) -> Ordering {
    self
      .total_degree()
      .cmp(&other.total_degree())
      .then_with(|| self.0.cmp(&other.0))
  }
}

impl PartialOrd for Monomial {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

// ─── Polynomial ─────────────────────────────────────────────────────

/// Expanded form: monomial → numeric coefficient, zero coefficients removed.
pub type Polynomial = BTreeMap<Monomial, Number>;

/// Add `coeff * mono` into `poly`, dropping the entry if it cancels.
pub fn add_term(poly: &mut Polynomial, mono: Monomial, coeff: Number) {
  if coeff.is_zero() {
    return;
  }
  match poly.remove(&mono) {
    Some(existing) => {
      let sum = existing + coeff;
      if !sum.is_zero() {
        poly.insert(mono, sum);
      }
    }
    None => {
      poly.insert(mono, coeff);
    }
  }
}

pub fn poly_constant(n: Number) -> Polynomial {
  let mut poly = Polynomial::new();
  add_term(&mut poly, Monomial::one(), n);
  poly
}

pub fn poly_add(mut a: Polynomial, b: Polynomial) -> Polynomial {
  for (mono, coeff) in b {
    add_term(&mut a, mono, coeff);
  }
  a
}

/// Distribute the product of two expanded polynomials.
pub fn poly_mul(a: &Polynomial, b: &Polynomial) -> Result<Polynomial, PerturbError> {
  let mut result = Polynomial::new();
  for (ma, ca) in a {
    for (mb, cb) in b {
      add_term(&mut result, ma.mul(mb)?, ca.clone() * cb.clone());
    }
  }
  Ok(result)
}

/// Expand (poly)^n by square-and-multiply.
pub fn poly_pow(base: &Polynomial, n: u32) -> Result<Polynomial, PerturbError> {
  if n == 0 {
    return Ok(poly_constant(Number::one()));
  }
  // Single term: x^a*y^b → x^(a*n)*y^(b*n)
  if base.len() == 1 {
    let mut result = Polynomial::new();
    for (mono, coeff) in base {
      add_term(&mut result, mono.pow(n)?, coeff.pow(n));
    }
    return Ok(result);
  }
  let mut result = poly_constant(Number::one());
  let mut square = base.clone();
  let mut k = n;
  loop {
    if k & 1 == 1 {
      result = poly_mul(&result, &square)?;
    }
    k >>= 1;
    if k == 0 {
      break;
    }
    square = poly_mul(&square, &square)?;
  }
  Ok(result)
}

/// Read any expression as a polynomial in its symbols.
pub fn to_polynomial(expr: &Expr) -> Result<Polynomial, PerturbError> {
  Ok(match expr {
    Expr::Constant(n) => poly_constant(n.clone()),
    Expr::Symbol(s) => {
      let mut poly = Polynomial::new();
      add_term(&mut poly, Monomial::var(s.clone(), 1), Number::one());
      poly
    }
    Expr::Sum(items) => {
      let mut result = Polynomial::new();
      for item in items {
        result = poly_add(result, to_polynomial(item)?);
      }
      result
    }
    Expr::Product(items) => {
      let mut result = poly_constant(Number::one());
      for item in items {
        if result.is_empty() {
          break;
        }
        result = poly_mul(&result, &to_polynomial(item)?)?;
      }
      result
    }
    Expr::Power(base, n) => poly_pow(&to_polynomial(base)?, *n)?,
  })
}

/// Build one canonical term: `c*x^a*y^b`, with unit coefficients omitted.
pub fn term_to_expr(mono: &Monomial, coeff: &Number) -> Expr {
  if mono.is_one() {
    return Expr::Constant(coeff.clone());
  }
  let mut factors = mono.to_factors();
  if coeff.is_one() {
    if factors.len() == 1 {
      return factors.remove(0);
    }
    return Expr::Product(factors);
  }
  let mut items = Vec::with_capacity(factors.len() + 1);
  items.push(Expr::Constant(coeff.clone()));
  items.extend(factors);
  Expr::Product(items)
}

/// Build the canonical expression of a polynomial.
pub fn from_polynomial(poly: &Polynomial) -> Expr {
  let mut terms: Vec<Expr> = poly
    .iter()
    .map(|(mono, coeff)| term_to_expr(mono, coeff))
    .collect();
  match terms.len() {
    0 => Expr::zero(),
    1 => terms.remove(0),
    _ => Expr::Sum(terms),
  }
}

// ─── Expand ─────────────────────────────────────────────────────────

/// Distribute products over sums, flatten, and combine like terms.
///
/// The result is canonical, so `expand(&expand(e)?)? == expand(e)?`.
/// Expanding a degree-d polynomial of an order-n series produces on the
/// order of C(n+d, d) terms; callers bound n. Fails with
/// `UnsupportedExponent` when a merged exponent overflows `u32`.
pub fn expand(expr: &Expr) -> Result<Expr, PerturbError> {
  let poly = to_polynomial(expr)?;
  trace!(terms = poly.len(), "expanded");
  Ok(from_polynomial(&poly))
}

// ─── Power ──────────────────────────────────────────────────────────

/// base^n for a non-negative integer n, without expanding.
pub fn integer_power(base: &Expr, n: u32) -> Expr {
  if n == 0 {
    return Expr::one();
  }
  match base {
    Expr::Constant(c) if c.is_zero() => Expr::zero(),
    Expr::Constant(c) => Expr::Constant(c.pow(n)),
    _ if n == 1 => base.clone(),
    _ => Expr::Power(Box::new(base.clone()), n),
  }
}

/// Power[base, n]; negative exponents are rejected.
pub fn power(base: &Expr, n: i64) -> Result<Expr, PerturbError> {
  let exponent = u32::try_from(n)
    .map_err(|_| PerturbError::UnsupportedExponent(format!("({base})^{n}")))?;
  Ok(integer_power(base, exponent))
}

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use pest::iterators::Pair;

use crate::{PerturbError, Rule};

#[derive(Debug, Clone, PartialEq)]
pub enum Number {
  Rational(BigRational),
  Real(f64),
}

impl std::ops::Add for Number {
  type Output = Self;

  fn add(self, rhs: Self) -> Self {
    match (self, rhs) {
      (Self::Rational(a), Self::Rational(b)) => Self::Rational(a + b),
      (Self::Real(a), Self::Real(b)) => Self::Real(a + b),
      (Self::Real(a), Self::Rational(b)) => Self::Real(a + ratio_to_f64(&b)),
      (Self::Rational(a), Self::Real(b)) => Self::Real(ratio_to_f64(&a) + b),
    }
  }
}

impl std::ops::Mul for Number {
  type Output = Self;

  fn mul(self, rhs: Self) -> Self {
    match (self, rhs) {
      (Self::Rational(a), Self::Rational(b)) => Self::Rational(a * b),
      (Self::Real(a), Self::Real(b)) => Self::Real(a * b),
      (Self::Real(a), Self::Rational(b)) => Self::Real(a * ratio_to_f64(&b)),
      (Self::Rational(a), Self::Real(b)) => Self::Real(ratio_to_f64(&a) * b),
    }
  }
}

impl std::ops::Neg for Number {
  type Output = Self;

  fn neg(self) -> Self {
    match self {
      Self::Rational(r) => Self::Rational(-r),
      Self::Real(f) => Self::Real(-f),
    }
  }
}

impl From<i64> for Number {
  fn from(n: i64) -> Self {
    Number::integer(n)
  }
}

impl From<f64> for Number {
  fn from(f: f64) -> Self {
    Number::Real(f)
  }
}

fn ratio_to_f64(r: &BigRational) -> f64 {
  r.to_f64().unwrap_or(f64::NAN)
}

impl Number {
  pub fn integer(n: i64) -> Self {
    Number::Rational(BigRational::from_integer(BigInt::from(n)))
  }

  /// Exact `numer/denom`, `None` for a zero denominator.
  pub fn rational(numer: i64, denom: i64) -> Option<Self> {
    if denom == 0 {
      return None;
    }
    Some(Number::Rational(BigRational::new(
      BigInt::from(numer),
      BigInt::from(denom),
    )))
  }

  pub fn zero() -> Self {
    Number::Rational(BigRational::zero())
  }

  pub fn one() -> Self {
    Number::Rational(BigRational::one())
  }

  pub fn is_zero(&self) -> bool {
    match self {
      Number::Rational(r) => r.is_zero(),
      Number::Real(f) => *f == 0.0,
    }
  }

  /// Exact one only; `Real(1.0)` is kept as an explicit factor.
  pub fn is_one(&self) -> bool {
    matches!(self, Number::Rational(r) if r.is_one())
  }

  pub fn is_negative(&self) -> bool {
    match self {
      Number::Rational(r) => r.is_negative(),
      Number::Real(f) => *f < 0.0,
    }
  }

  pub fn to_f64(&self) -> f64 {
    match self {
      Number::Rational(r) => ratio_to_f64(r),
      Number::Real(f) => *f,
    }
  }

  /// Multiplicative inverse, `None` for zero.
  pub fn recip(&self) -> Option<Self> {
    if self.is_zero() {
      return None;
    }
    Some(match self {
      Number::Rational(r) => Number::Rational(r.recip()),
      Number::Real(f) => Number::Real(1.0 / f),
    })
  }

  pub fn pow(&self, n: u32) -> Self {
    match self {
      Number::Rational(r) => Number::Rational(num_traits::pow(r.clone(), n as usize)),
      Number::Real(f) => Number::Real(match i32::try_from(n) {
        Ok(k) => f.powi(k),
        Err(_) => f.powf(f64::from(n)),
      }),
    }
  }
}

impl std::fmt::Display for Number {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Number::Rational(r) if r.is_integer() => write!(f, "{}", r.numer()),
      Number::Rational(r) => write!(f, "{}/{}", r.numer(), r.denom()),
      Number::Real(x) => write!(f, "{x:?}"),
    }
  }
}

/// A named atom. Two symbols are the same symbol iff their names match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
  pub fn new(name: impl Into<String>) -> Self {
    Symbol(name.into())
  }

  pub fn name(&self) -> &str {
    &self.0
  }
}

impl std::fmt::Display for Symbol {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for Symbol {
  fn from(name: &str) -> Self {
    Symbol::new(name)
  }
}

/// Symbolic expression tree. Every transformation returns a new tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
  Constant(Number),
  Symbol(Symbol),
  Sum(Vec<Expr>),
  Product(Vec<Expr>),
  Power(Box<Expr>, u32),
}

impl Expr {
  pub fn int(n: i64) -> Self {
    Expr::Constant(Number::integer(n))
  }

  pub fn rational(numer: i64, denom: i64) -> Option<Self> {
    Number::rational(numer, denom).map(Expr::Constant)
  }

  pub fn real(x: f64) -> Self {
    Expr::Constant(Number::Real(x))
  }

  pub fn zero() -> Self {
    Expr::Constant(Number::zero())
  }

  pub fn one() -> Self {
    Expr::Constant(Number::one())
  }

  pub fn sym(name: &str) -> Self {
    Expr::Symbol(Symbol::new(name))
  }

  pub fn as_number(&self) -> Option<&Number> {
    match self {
      Expr::Constant(n) => Some(n),
      _ => None,
    }
  }

  /// Additive terms of a top-level `Sum`, or the expression itself.
  pub fn terms(&self) -> Vec<Expr> {
    match self {
      Expr::Sum(items) => items.clone(),
      Expr::Constant(n) if n.is_zero() => vec![],
      _ => vec![self.clone()],
    }
  }

  /// Whether `sym` occurs anywhere in the tree.
  pub fn contains_symbol(&self, sym: &Symbol) -> bool {
    match self {
      Expr::Constant(_) => false,
      Expr::Symbol(s) => s == sym,
      Expr::Sum(items) | Expr::Product(items) => {
        items.iter().any(|e| e.contains_symbol(sym))
      }
      Expr::Power(base, _) => base.contains_symbol(sym),
    }
  }

  /// Free symbols in first-occurrence order.
  pub fn symbols(&self) -> Vec<Symbol> {
    let mut out = Vec::new();
    collect_symbols(self, &mut out);
    out
  }

  /// Highest power of `var` in any term of the expanded expression.
  pub fn degree_in(&self, var: &Symbol) -> Result<u32, PerturbError> {
    Ok(
      crate::functions::to_polynomial(self)?
        .keys()
        .map(|m| m.degree_of(var))
        .max()
        .unwrap_or(0),
    )
  }
}

fn collect_symbols(expr: &Expr, out: &mut Vec<Symbol>) {
  match expr {
    Expr::Constant(_) => {}
    Expr::Symbol(s) => {
      if !out.contains(s) {
        out.push(s.clone());
      }
    }
    Expr::Sum(items) | Expr::Product(items) => {
      for item in items {
        collect_symbols(item, out);
      }
    }
    Expr::Power(base, _) => collect_symbols(base, out),
  }
}

impl From<Symbol> for Expr {
  fn from(s: Symbol) -> Self {
    Expr::Symbol(s)
  }
}

impl From<&Symbol> for Expr {
  fn from(s: &Symbol) -> Self {
    Expr::Symbol(s.clone())
  }
}

impl From<Number> for Expr {
  fn from(n: Number) -> Self {
    Expr::Constant(n)
  }
}

impl From<i64> for Expr {
  fn from(n: i64) -> Self {
    Expr::int(n)
  }
}

impl std::ops::Add for Expr {
  type Output = Expr;

  fn add(self, rhs: Expr) -> Expr {
    let mut items = match self {
      Expr::Sum(items) => items,
      other => vec![other],
    };
    match rhs {
      Expr::Sum(more) => items.extend(more),
      other => items.push(other),
    }
    Expr::Sum(items)
  }
}

impl std::ops::Sub for Expr {
  type Output = Expr;

  fn sub(self, rhs: Expr) -> Expr {
    self + (-rhs)
  }
}

impl std::ops::Mul for Expr {
  type Output = Expr;

  fn mul(self, rhs: Expr) -> Expr {
    let mut items = match self {
      Expr::Product(items) => items,
      other => vec![other],
    };
    match rhs {
      Expr::Product(more) => items.extend(more),
      other => items.push(other),
    }
    Expr::Product(items)
  }
}

impl std::ops::Neg for Expr {
  type Output = Expr;

  fn neg(self) -> Expr {
    match self {
      Expr::Constant(n) => Expr::Constant(-n),
      other => Expr::Product(vec![Expr::int(-1), other]),
    }
  }
}

// ─── Display ────────────────────────────────────────────────────────

pub fn expr_to_string(expr: &Expr) -> String {
  match expr {
    Expr::Constant(n) => n.to_string(),
    Expr::Symbol(s) => s.to_string(),
    Expr::Sum(items) => {
      if items.is_empty() {
        return "0".to_string();
      }
      let mut out = String::new();
      for (i, item) in items.iter().enumerate() {
        let s = expr_to_string(item);
        if i == 0 {
          out.push_str(&s);
        } else if let Some(rest) = s.strip_prefix('-') {
          out.push_str(" - ");
          out.push_str(rest);
        } else {
          out.push_str(" + ");
          out.push_str(&s);
        }
      }
      out
    }
    Expr::Product(items) => {
      if items.is_empty() {
        return "1".to_string();
      }
      let mut parts: Vec<String> = Vec::new();
      let mut negate = false;
      for (i, item) in items.iter().enumerate() {
        match item {
          Expr::Constant(n) if i == 0 && items.len() > 1 => {
            if *n == Number::integer(-1) {
              negate = true;
            } else if n.is_negative() {
              negate = true;
              parts.push(factor_to_string(&Expr::Constant(-n.clone())));
            } else {
              parts.push(factor_to_string(item));
            }
          }
          _ => parts.push(factor_to_string(item)),
        }
      }
      let body = parts.join("*");
      if negate {
        format!("-{body}")
      } else {
        body
      }
    }
    Expr::Power(base, n) => format!("{}^{}", factor_to_string(base), n),
  }
}

fn factor_to_string(expr: &Expr) -> String {
  match expr {
    Expr::Sum(items) if items.len() > 1 => {
      format!("({})", expr_to_string(expr))
    }
    Expr::Product(items) if items.len() > 1 => {
      format!("({})", expr_to_string(expr))
    }
    Expr::Constant(Number::Rational(r)) if !r.is_integer() || r.is_negative() => {
      format!("({})", expr_to_string(expr))
    }
    Expr::Constant(Number::Real(x)) if *x < 0.0 => {
      format!("({})", expr_to_string(expr))
    }
    _ => expr_to_string(expr),
  }
}

impl std::fmt::Display for Expr {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&expr_to_string(self))
  }
}

// ─── Parse tree → Expr ──────────────────────────────────────────────

/// Convert a `Rule::Expression` pair into an expression tree.
pub fn pair_to_expr(pair: Pair<Rule>) -> Result<Expr, PerturbError> {
  match pair.as_rule() {
    Rule::Expression => {
      let mut inner = pair.into_inner();
      let first = match inner.next() {
        Some(p) => pair_to_expr(p)?,
        None => return Ok(Expr::zero()),
      };
      let mut items = vec![first];
      while let Some(op) = inner.next() {
        let rhs = match inner.next() {
          Some(p) => pair_to_expr(p)?,
          None => break,
        };
        match op.as_str() {
          "-" => items.push(-rhs),
          _ => items.push(rhs),
        }
      }
      Ok(single_or(items, Expr::Sum))
    }
    Rule::Term => {
      let mut inner = pair.into_inner();
      let first = match inner.next() {
        Some(p) => pair_to_expr(p)?,
        None => return Ok(Expr::one()),
      };
      let mut items = vec![first];
      while let Some(op) = inner.next() {
        let rhs = match inner.next() {
          Some(p) => pair_to_expr(p)?,
          None => break,
        };
        match op.as_str() {
          "/" => {
            let inverse = rhs
              .as_number()
              .and_then(Number::recip)
              .ok_or_else(|| PerturbError::UnsupportedDivision(rhs.to_string()))?;
            items.push(Expr::Constant(inverse));
          }
          _ => items.push(rhs),
        }
      }
      Ok(single_or(items, Expr::Product))
    }
    Rule::Unary => {
      let mut inner = pair.into_inner();
      let mut negations = 0usize;
      let mut operand = None;
      for p in inner.by_ref() {
        if p.as_rule() == Rule::Negate {
          negations += 1;
        } else {
          operand = Some(pair_to_expr(p)?);
          break;
        }
      }
      let operand = operand.unwrap_or_else(Expr::zero);
      Ok(if negations % 2 == 1 { -operand } else { operand })
    }
    Rule::PowerExpr => {
      let mut inner = pair.into_inner();
      let base = match inner.next() {
        Some(p) => pair_to_expr(p)?,
        None => return Ok(Expr::zero()),
      };
      match inner.next() {
        None => Ok(base),
        Some(exp_pair) => {
          let exponent = pair_to_expr(exp_pair)?;
          let n = integer_exponent(&exponent)?;
          Ok(Expr::Power(Box::new(base), n))
        }
      }
    }
    Rule::Integer => {
      let value: BigInt = pair.as_str().parse().unwrap_or_default();
      Ok(Expr::Constant(Number::Rational(BigRational::from_integer(value))))
    }
    Rule::Real => {
      let value: f64 = pair.as_str().parse().unwrap_or(f64::NAN);
      Ok(Expr::real(value))
    }
    Rule::Identifier => Ok(Expr::sym(pair.as_str())),
    _ => match pair.into_inner().next() {
      Some(inner) => pair_to_expr(inner),
      None => Ok(Expr::zero()),
    },
  }
}

fn single_or(mut items: Vec<Expr>, wrap: fn(Vec<Expr>) -> Expr) -> Expr {
  if items.len() == 1 {
    items.remove(0)
  } else {
    wrap(items)
  }
}

/// Exponents must be non-negative integer literals.
fn integer_exponent(exponent: &Expr) -> Result<u32, PerturbError> {
  match exponent {
    Expr::Constant(Number::Rational(r)) if r.is_integer() && !r.is_negative() => r
      .to_integer()
      .to_u32()
      .ok_or_else(|| PerturbError::UnsupportedExponent(exponent.to_string())),
    _ => Err(PerturbError::UnsupportedExponent(exponent.to_string())),
  }
}

use crate::syntax::Expr;

// ─── SubstitutionMap ────────────────────────────────────────────────

/// Ordered key → replacement rules. Keys match by exact structure only:
/// `eps^2` matches a literal `Power(eps, 2)` node and nothing else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubstitutionMap {
  entries: Vec<(Expr, Expr)>,
}

impl SubstitutionMap {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert a rule. An existing key keeps its position and gets the new value.
  pub fn insert(&mut self, key: impl Into<Expr>, value: impl Into<Expr>) {
    let key = key.into();
    let value = value.into();
    match self.entries.iter_mut().find(|(k, _)| *k == key) {
      Some(entry) => entry.1 = value,
      None => self.entries.push((key, value)),
    }
  }

  pub fn with(mut self, key: impl Into<Expr>, value: impl Into<Expr>) -> Self {
    self.insert(key, value);
    self
  }

  /// First rule whose key equals `expr`.
  pub fn get(&self, expr: &Expr) -> Option<&Expr> {
    self.entries.iter().find(|(k, _)| k == expr).map(|(_, v)| v)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&Expr, &Expr)> {
    self.entries.iter().map(|(k, v)| (k, v))
  }
}

impl<K: Into<Expr>, V: Into<Expr>> FromIterator<(K, V)> for SubstitutionMap {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    let mut map = SubstitutionMap::new();
    for (k, v) in iter {
      map.insert(k, v);
    }
    map
  }
}

// ─── Substitute ─────────────────────────────────────────────────────

/// ReplaceAll with exact structural keys.
///
/// A node matching a key is replaced and its replacement is not scanned
/// again; other nodes are rebuilt with the same shape from their
/// substituted children.
pub fn substitute(expr: &Expr, map: &SubstitutionMap) -> Expr {
  if let Some(replacement) = map.get(expr) {
    return replacement.clone();
  }
  match expr {
    Expr::Constant(_) | Expr::Symbol(_) => expr.clone(),
    Expr::Sum(items) => {
      Expr::Sum(items.iter().map(|item| substitute(item, map)).collect())
    }
    Expr::Product(items) => {
      Expr::Product(items.iter().map(|item| substitute(item, map)).collect())
    }
    Expr::Power(base, n) => Expr::Power(Box::new(substitute(base, map)), *n),
  }
}

use super::*;

mod substitute {
  use super::*;

  #[test]
  fn symbol_with_itself_is_identity() {
    let e = p("x^2 + 3*x*y - (x + 1)^3");
    let map = SubstitutionMap::new().with(s("x"), s("x"));
    assert_eq!(substitute(&e, &map), e);
  }

  #[test]
  fn empty_map_copies_unchanged() {
    let e = p("(1 + x)*(2 + y)");
    assert_eq!(substitute(&e, &SubstitutionMap::new()), e);
  }

  #[test]
  fn keys_match_exact_structure_only() {
    let e = p("eps^2 + eps^3");
    let map = SubstitutionMap::new().with(p("eps^2"), Expr::zero());
    let result = substitute(&e, &map);
    assert_eq!(
      result,
      Expr::Sum(vec![
        Expr::zero(),
        Expr::Power(Box::new(Expr::sym("eps")), 3),
      ])
    );
  }

  #[test]
  fn first_matching_key_wins() {
    let map = SubstitutionMap::new()
      .with(p("x^2"), Expr::int(7))
      .with(s("x"), Expr::int(2));
    assert_eq!(substitute(&p("x^2"), &map), Expr::int(7));
    assert_eq!(substitute(&p("x^3"), &map), p("2^3"));
  }

  #[test]
  fn replacements_are_not_rescanned() {
    let map = SubstitutionMap::new()
      .with(s("x"), s("y"))
      .with(s("y"), s("z"));
    assert_eq!(substitute(&p("x"), &map), Expr::sym("y"));

    let growing = SubstitutionMap::new().with(s("x"), p("x + 1"));
    assert_eq!(substitute(&p("x"), &growing), p("x + 1"));
  }

  #[test]
  fn input_is_not_modified() {
    let e = p("a*b + c");
    let before = e.clone();
    let _ = substitute(&e, &SubstitutionMap::new().with(s("a"), Expr::int(0)));
    assert_eq!(e, before);
  }

  #[test]
  fn substitution_inside_powers() {
    let e = p("(a + b)^2");
    let map = SubstitutionMap::new().with(s("a"), Expr::int(1));
    assert_eq!(expand(&substitute(&e, &map)).unwrap(), expand(&p("1 + 2*b + b^2")).unwrap());
  }
}

mod substitution_map {
  use super::*;

  #[test]
  fn reinsert_keeps_position() {
    let mut map = SubstitutionMap::new();
    map.insert(s("x"), Expr::int(1));
    map.insert(s("y"), Expr::int(2));
    map.insert(s("x"), Expr::int(3));
    let keys: Vec<String> = map.iter().map(|(k, _)| k.to_string()).collect();
    assert_eq!(keys, vec!["x", "y"]);
    assert_eq!(map.get(&Expr::sym("x")), Some(&Expr::int(3)));
    assert_eq!(map.len(), 2);
  }

  #[test]
  fn collects_from_pairs() {
    let map: SubstitutionMap = vec![(s("a"), Expr::int(1)), (s("b"), Expr::int(2))]
      .into_iter()
      .collect();
    assert_eq!(map.len(), 2);
    assert!(!map.is_empty());
  }
}

use super::*;

fn tag(name: &str) -> Option<String> {
    Some(name.to_string())
}

#[test]
fn test_selector_list() {
    let i = "ul > li.item:nth-child(2n + 1), h1 + p ~ a[href^=\"http\"]";
    let target = SelectorList(vec![
        combinator_selector!(
            compound_selector!(tag: tag("ul")),
            Combinator::Child,
            compound_selector!(
                tag: tag("li"),
                classes: vec!["item".to_string()],
                pseudo_classes: vec![PseudoClass::NthChild(NthFormula::ODD)],
            )
        ),
        combinator_selector!(
            compound_selector!(tag: tag("h1")),
            Combinator::NextSibling,
            combinator_selector!(
                compound_selector!(tag: tag("p")),
                Combinator::SubsequentSibling,
                compound_selector!(
                    tag: tag("a"),
                    attributes: vec![AttributeSelector::StartsWith(
                        "href".to_string(),
                        "http".to_string()
                    )],
                )
            )
        ),
    ]);
    assert_eq!(selector_list(i), Ok(target));
}

#[test]
fn test_spacing_is_insignificant_around_combinators() {
    assert_eq!(selector_list("a > b"), selector_list("a>b"));
    assert_eq!(selector_list("  a   b  "), selector_list("a b"));
    assert_eq!(selector_list("a ,b"), selector_list("a,b"));
    assert_ne!(selector_list("a b"), selector_list("ab"));
}

#[test]
fn test_descendant_chain_nests_right() {
    let target = SelectorList(vec![combinator_selector!(
        compound_selector!(tag: tag("div")),
        Combinator::Descendant,
        combinator_selector!(
            compound_selector!(id: tag("x")),
            Combinator::Descendant,
            compound_selector!()
        )
    )]);
    assert_eq!(selector_list("div #x *"), Ok(target));
}

#[test]
fn test_quoted_separators() {
    let target = SelectorList(vec![compound_selector!(
        attributes: vec![AttributeSelector::Equals(
            "title".to_string(),
            "a, b > c".to_string()
        )],
    )]);
    assert_eq!(selector_list(r#"[title="a, b > c"]"#), Ok(target));
}

#[test]
fn test_empty_selector_matches_anything() {
    assert_eq!(
        selector_list(""),
        Ok(SelectorList(vec![compound_selector!()]))
    );
}

#[test]
fn test_selector_errors() {
    assert_eq!(
        selector_list("a:hover"),
        Err(SelectorError::Unsupported("hover".to_string()))
    );
    assert_eq!(
        selector_list("li:nth-child(3x)"),
        Err(SelectorError::InvalidNth("3x".to_string()))
    );
    assert_eq!(
        "p:first-child:bogus".parse::<SelectorList>(),
        Err(SelectorError::Unsupported("bogus".to_string()))
    );
    assert_eq!(
        SelectorError::Unsupported("hover".to_string()).to_string(),
        "unsupported selector: \"hover\""
    );
}

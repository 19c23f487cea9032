use std::num::ParseIntError;
use std::str::FromStr;

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, digit1, multispace0, one_of};
use nom::combinator::{all_consuming, map, map_res, opt, recognize, value};
use nom::multi::many0;
use nom::sequence::{delimited, pair, preceded, terminated};
use nom::IResult;
use tracing::{debug, span, trace, Level};

use super::error::{Result, SelectorError};
use super::*;

const ESCAPE: char = '\\';
const QUOTE: char = '"';
/// Characters that end a name inside a compound
const COMPOUND_STOPS: &str = ".#[:]";
const COMBINATORS: &str = " >+~";
const SEPARATORS: &str = ", >+~";

/// Attribute operators in the order they are looked for; plain `=` is a
/// suffix of every other one so it must come last
static ATTRIBUTE_OPERATORS: &[(&str, fn(String, String) -> AttributeSelector)] = &[
    ("~=", AttributeSelector::ContainsWord),
    ("|=", AttributeSelector::Begins),
    ("^=", AttributeSelector::StartsWith),
    ("$=", AttributeSelector::EndsWith),
    ("*=", AttributeSelector::Contains),
    ("=", AttributeSelector::Equals),
];

static NTH_PSEUDO_CLASSES: &[(&str, fn(NthFormula) -> PseudoClass)] = &[
    ("nth-child", PseudoClass::NthChild),
    ("nth-last-child", PseudoClass::NthLastChild),
    ("nth-of-type", PseudoClass::NthOfType),
    ("nth-last-of-type", PseudoClass::NthLastOfType),
];

fn is_separator(c: char) -> bool {
    SEPARATORS.contains(c)
}

/// Drop every unquoted space that sits next to a separator, so `a > b` reads as `a>b`
fn collapse_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ESCAPE => {
                out.push(c);
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
                continue;
            }
            QUOTE => in_quotes = !in_quotes,
            ' ' if !in_quotes => {
                let before = out.chars().next_back();
                let after = chars.peek().copied();
                if before.map_or(false, is_separator) || after.map_or(false, is_separator) {
                    continue;
                }
            }
            _ => {}
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
#[test]
fn test_collapse_whitespace() {
    assert_eq!(collapse_whitespace("a > b"), "a>b");
    assert_eq!(collapse_whitespace("a   b"), "a b");
    assert_eq!(collapse_whitespace("a , b ~ c + d"), "a,b~c+d");
    assert_eq!(collapse_whitespace("li:nth-child(2n + 1)"), "li:nth-child(2n+1)");
    assert_eq!(collapse_whitespace("div p"), "div p");
    assert_eq!(collapse_whitespace(r#"[title="a , b"] > p"#), r#"[title="a , b"]>p"#);
}

/// Split at every separator outside quotes, brackets and parentheses. Each
/// piece is paired with the separator that ended it; the last piece has none.
fn split_unnested<'a>(input: &'a str, separators: &str) -> Vec<(&'a str, Option<char>)> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut chars = input.char_indices();
    while let Some((i, c)) = chars.next() {
        if separators.contains(c) && depth == 0 && !in_quotes {
            pieces.push((&input[start..i], Some(c)));
            start = i + c.len_utf8();
        } else if c == ESCAPE {
            chars.next();
        } else if c == QUOTE {
            in_quotes = !in_quotes;
        } else if !in_quotes {
            match c {
                '[' | '(' => depth += 1,
                ']' | ')' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
    }
    pieces.push((&input[start..], None));
    pieces
}

#[cfg(test)]
#[test]
fn test_split_unnested() {
    assert_eq!(
        split_unnested("div>p+a", COMBINATORS),
        [("div", Some('>')), ("p", Some('+')), ("a", None)]
    );
    assert_eq!(
        split_unnested(r#"a[title="x y"] b"#, COMBINATORS),
        [(r#"a[title="x y"]"#, Some(' ')), ("b", None)]
    );
    assert_eq!(
        split_unnested("li:nth-child(2n+1)~b", COMBINATORS),
        [("li:nth-child(2n+1)", Some('~')), ("b", None)]
    );
    assert_eq!(split_unnested(r"a\ b", COMBINATORS), [(r"a\ b", None)]);
    assert_eq!(
        split_unnested(r#"[a=","],b"#, ","),
        [(r#"[a=","]"#, Some(',')), ("b", None)]
    );
}

/// Text up to the next unquoted character in `stops`, with `\` escapes
/// resolved. Double quotes are kept.
fn name<'a>(stops: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, String> {
    move |input: &'a str| {
        let mut out = String::new();
        let mut in_quotes = false;
        let mut chars = input.char_indices();
        while let Some((i, c)) = chars.next() {
            if c == ESCAPE {
                if let Some((_, escaped)) = chars.next() {
                    out.push(escaped);
                }
                continue;
            }
            if c == QUOTE {
                in_quotes = !in_quotes;
            } else if !in_quotes && stops.contains(c) {
                return Ok((&input[i..], out));
            }
            out.push(c);
        }
        Ok(("", out))
    }
}

enum Component {
    Class(String),
    Id(String),
    Attribute(String),
    Pseudo(String),
}

fn component(input: &str) -> IResult<&str, Component> {
    alt((
        map(preceded(char('.'), name(COMPOUND_STOPS)), Component::Class),
        map(preceded(char('#'), name(COMPOUND_STOPS)), Component::Id),
        map(
            delimited(char('['), name("]"), opt(char(']'))),
            Component::Attribute,
        ),
        map(preceded(char(':'), name(COMPOUND_STOPS)), Component::Pseudo),
    ))(input)
}

fn compound(input: &str) -> Result<CompoundSelector> {
    let (rest, (tag, components)) = pair(name(COMPOUND_STOPS), many0(component))(input)
        .map_err(|_| SelectorError::Unsupported(input.to_string()))?;
    if !rest.is_empty() {
        return Err(SelectorError::Unsupported(rest.to_string()));
    }
    let mut selector = CompoundSelector {
        tag: if tag.is_empty() || tag == "*" {
            None
        } else {
            Some(tag)
        },
        ..Default::default()
    };
    for component in components {
        match component {
            Component::Class(class) => selector.classes.push(class),
            Component::Id(id) => selector.id = Some(id),
            Component::Attribute(expression) => selector.attributes.push(attribute(&expression)),
            Component::Pseudo(pseudo) => selector.pseudo_classes.push(pseudo_class(&pseudo)?),
        }
    }
    Ok(selector)
}

#[cfg(test)]
#[test]
fn test_compound() {
    assert_eq!(compound("").unwrap(), CompoundSelector::default());
    assert_eq!(compound("*").unwrap(), CompoundSelector::default());
    assert_eq!(
        compound("input.a.b#main[type=radio]:checked").unwrap(),
        CompoundSelector {
            tag: Some("input".to_string()),
            id: Some("main".to_string()),
            classes: vec!["a".to_string(), "b".to_string()],
            attributes: vec![AttributeSelector::Equals("type".into(), "radio".into())],
            pseudo_classes: vec![PseudoClass::Checked],
        }
    );
    // Escapes and brackets keep reserved characters in names
    assert_eq!(
        compound(r#"a\.b[href$=".html"]"#).unwrap(),
        CompoundSelector {
            tag: Some("a.b".to_string()),
            attributes: vec![AttributeSelector::EndsWith("href".into(), ".html".into())],
            ..Default::default()
        }
    );
    assert_eq!(
        compound("a]b"),
        Err(SelectorError::Unsupported("]b".to_string()))
    );
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() > 1 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn attribute(expression: &str) -> AttributeSelector {
    // Operators inside a quoted value belong to the value
    let head = expression
        .find(|c: char| c == '"' || c == '\'')
        .map_or(expression, |quote| &expression[..quote]);
    for &(operator, build) in ATTRIBUTE_OPERATORS {
        if let Some(index) = head.find(operator) {
            let name = expression[..index].trim().to_string();
            let value = strip_quotes(expression[index + operator.len()..].trim()).to_string();
            return build(name, value);
        }
    }
    AttributeSelector::Has(expression.trim().to_string())
}

#[cfg(test)]
#[test]
fn test_attribute() {
    use AttributeSelector::*;
    assert_eq!(attribute("disabled"), Has("disabled".into()));
    assert_eq!(attribute("lang|=en"), Begins("lang".into(), "en".into()));
    assert_eq!(attribute("class~=\"wide\""), ContainsWord("class".into(), "wide".into()));
    assert_eq!(attribute("href^='http'"), StartsWith("href".into(), "http".into()));
    assert_eq!(attribute("src*=cdn"), Contains("src".into(), "cdn".into()));
    assert_eq!(attribute("title=\"a^=b\""), Equals("title".into(), "a^=b".into()));
    assert_eq!(attribute("title=\""), Equals("title".into(), "\"".into()));
}

fn pseudo_class(token: &str) -> Result<PseudoClass> {
    let pseudo = match token {
        "checked" => PseudoClass::Checked,
        "disabled" => PseudoClass::Disabled,
        "required" => PseudoClass::Required,
        "optional" => PseudoClass::Optional,
        "indeterminate" => PseudoClass::Indeterminate,
        "empty" => PseudoClass::Empty,
        "root" => PseudoClass::Root,
        "first-child" => PseudoClass::FirstChild,
        "last-child" => PseudoClass::LastChild,
        "only-child" => PseudoClass::OnlyChild,
        "first-of-type" => PseudoClass::FirstOfType,
        "last-of-type" => PseudoClass::LastOfType,
        "only-of-type" => PseudoClass::OnlyOfType,
        _ => {
            for &(name, build) in NTH_PSEUDO_CLASSES {
                let argument = token
                    .strip_prefix(name)
                    .and_then(|rest| rest.strip_prefix('('))
                    .and_then(|rest| rest.strip_suffix(')'))
                    .filter(|argument| !argument.is_empty());
                if let Some(argument) = argument {
                    return nth_formula(argument).map(build);
                }
            }
            return Err(SelectorError::Unsupported(token.to_string()));
        }
    };
    Ok(pseudo)
}

#[cfg(test)]
#[test]
fn test_pseudo_class() {
    assert_eq!(pseudo_class("root"), Ok(PseudoClass::Root));
    assert_eq!(
        pseudo_class("nth-last-of-type(odd)"),
        Ok(PseudoClass::NthLastOfType(NthFormula::ODD))
    );
    assert_eq!(
        pseudo_class("hover"),
        Err(SelectorError::Unsupported("hover".to_string()))
    );
    assert_eq!(
        pseudo_class("nth-child()"),
        Err(SelectorError::Unsupported("nth-child()".to_string()))
    );
    assert_eq!(
        pseudo_class("nth-child(x)"),
        Err(SelectorError::InvalidNth("x".to_string()))
    );
}

fn integer(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(one_of("+-")), digit1)), i64::from_str)(input)
}

/// The `An` part, where a bare `n` or `-n` has an implicit magnitude of one
fn step(input: &str) -> IResult<&str, i64> {
    map_res(
        terminated(pair(opt(one_of("+-")), opt(digit1)), one_of("nN")),
        |(sign, digits): (Option<char>, Option<&str>)| -> std::result::Result<i64, ParseIntError> {
            let magnitude = match digits {
                Some(digits) => digits.parse()?,
                None => 1,
            };
            Ok(if sign == Some('-') { -magnitude } else { magnitude })
        },
    )(input)
}

fn formula(input: &str) -> IResult<&str, NthFormula> {
    alt((
        value(NthFormula::EVEN, tag("even")),
        value(NthFormula::ODD, tag("odd")),
        map(pair(step, opt(integer)), |(step, offset)| {
            NthFormula::new(step, offset.unwrap_or(0))
        }),
        map(integer, |offset| NthFormula::new(0, offset)),
    ))(input)
}

/// Parse the argument of an `:nth-*` pseudo-class: `even`, `odd`, `B` or `An+B`
pub fn nth_formula(input: &str) -> Result<NthFormula> {
    all_consuming(delimited(multispace0, formula, multispace0))(input)
        .map(|(_, formula)| formula)
        .map_err(|_| SelectorError::InvalidNth(input.to_string()))
}

#[cfg(test)]
#[test]
fn test_nth_formula() {
    assert_eq!(nth_formula("even"), Ok(NthFormula::new(2, 0)));
    assert_eq!(nth_formula("odd"), Ok(NthFormula::new(2, 1)));
    assert_eq!(nth_formula("3"), Ok(NthFormula::new(0, 3)));
    assert_eq!(nth_formula("+3"), Ok(NthFormula::new(0, 3)));
    assert_eq!(nth_formula("2n+1"), Ok(NthFormula::new(2, 1)));
    assert_eq!(nth_formula("n"), Ok(NthFormula::new(1, 0)));
    assert_eq!(nth_formula("-n+3"), Ok(NthFormula::new(-1, 3)));
    assert_eq!(nth_formula("3n-2"), Ok(NthFormula::new(3, -2)));
    assert_eq!(nth_formula(" 4n "), Ok(NthFormula::new(4, 0)));
    for bad in ["", "n+", "2n+1n", "1.5", "evens", "--n"] {
        assert_eq!(nth_formula(bad), Err(SelectorError::InvalidNth(bad.to_string())));
    }
}

fn selector(input: &str) -> Result<Selector> {
    let mut pieces = split_unnested(input, COMBINATORS).into_iter().rev();
    let mut selector = match pieces.next() {
        Some((last, _)) => Selector::Compound(compound(last)?),
        None => return Err(SelectorError::Unsupported(input.to_string())),
    };
    // Built right to left, so every left side is a single compound
    for (piece, separator) in pieces {
        let combinator = separator
            .and_then(Combinator::from_char)
            .ok_or_else(|| SelectorError::Unsupported(input.to_string()))?;
        let left = Selector::Compound(compound(piece)?);
        selector = Selector::Combinator(Box::new(left), combinator, Box::new(selector));
    }
    trace!(?selector, "compiled alternative");
    Ok(selector)
}

/// Compile a comma separated selector list.
///
/// Spaces next to `,`, `>`, `+` and `~` are ignored, a compound with no tag or
/// a `*` tag matches any element, and unknown pseudo-classes are rejected.
pub fn selector_list(input: &str) -> Result<SelectorList> {
    let span = span!(Level::DEBUG, "compile_selector", selector = input);
    let _enter = span.enter();
    let collapsed = collapse_whitespace(input.trim());
    let selectors = split_unnested(&collapsed, ",")
        .into_iter()
        .map(|(alternative, _)| selector(alternative))
        .collect::<Result<Vec<_>>>()?;
    debug!(alternatives = selectors.len(), "compiled selector");
    Ok(SelectorList(selectors))
}

impl FromStr for SelectorList {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self> {
        selector_list(s)
    }
}

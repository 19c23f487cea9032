//! CSS selector model and the compiler that produces it

use std::cmp::Ordering;

/// Every alternative of a comma separated selector, in the order written
#[derive(PartialEq, Clone, Debug, Default)]
pub struct SelectorList(pub Vec<Selector>);

#[derive(PartialEq, Clone, Debug)]
pub enum Selector {
    Compound(CompoundSelector),
    /// The left side is always a single compound; chains nest to the right
    Combinator(Box<Selector>, Combinator, Box<Selector>),
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Combinator {
    // ( )
    Descendant,
    // (>)
    Child,
    // (+)
    NextSibling,
    // (~)
    SubsequentSibling,
}

impl Combinator {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            ' ' => Some(Combinator::Descendant),
            '>' => Some(Combinator::Child),
            '+' => Some(Combinator::NextSibling),
            '~' => Some(Combinator::SubsequentSibling),
            _ => None,
        }
    }
}

/// One conjunction of conditions on a single element, e.g. `input.a#b[type=radio]:checked`
#[derive(PartialEq, Clone, Debug, Default)]
pub struct CompoundSelector {
    /// `None` matches any tag
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttributeSelector>,
    pub pseudo_classes: Vec<PseudoClass>,
}

// [att]
#[derive(PartialEq, Clone, Debug)]
pub enum AttributeSelector {
    // [att]
    Has(String),
    // [att=val]
    Equals(String, String),
    // [att~=val]
    // `val` is one of the whitespace or hyphen separated words of `att`
    ContainsWord(String, String),
    // [att|=val]
    // `att` begins with val, followed by the end, whitespace or `-`
    Begins(String, String),
    // [att^=val]
    StartsWith(String, String),
    // [att$=val]
    EndsWith(String, String),
    // [att*=val]
    Contains(String, String),
}

impl AttributeSelector {
    pub fn name(&self) -> &str {
        match self {
            AttributeSelector::Has(name)
            | AttributeSelector::Equals(name, _)
            | AttributeSelector::ContainsWord(name, _)
            | AttributeSelector::Begins(name, _)
            | AttributeSelector::StartsWith(name, _)
            | AttributeSelector::EndsWith(name, _)
            | AttributeSelector::Contains(name, _) => name,
        }
    }
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum PseudoClass {
    Checked,
    Disabled,
    Required,
    Optional,
    Indeterminate,
    Empty,
    Root,
    FirstChild,
    LastChild,
    OnlyChild,
    NthChild(NthFormula),
    NthLastChild(NthFormula),
    FirstOfType,
    LastOfType,
    OnlyOfType,
    NthOfType(NthFormula),
    NthLastOfType(NthFormula),
}

impl PseudoClass {
    /// Whether this is counted over the other matches of its own compound
    /// rather than over the element's siblings
    pub fn is_of_type(&self) -> bool {
        matches!(
            self,
            PseudoClass::FirstOfType
                | PseudoClass::LastOfType
                | PseudoClass::OnlyOfType
                | PseudoClass::NthOfType(_)
                | PseudoClass::NthLastOfType(_)
        )
    }
}

/// `An+B`
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct NthFormula {
    pub step: i64,
    pub offset: i64,
}

impl NthFormula {
    pub const EVEN: NthFormula = NthFormula { step: 2, offset: 0 };
    pub const ODD: NthFormula = NthFormula { step: 2, offset: 1 };

    pub fn new(step: i64, offset: i64) -> Self {
        Self { step, offset }
    }

    /// Whether the 1-based `position` among `count` candidates is hit by the
    /// sequence `B, B+A, B+2A, ...` once it has been brought into `1..=count`
    pub fn matches(&self, position: usize, count: usize) -> bool {
        if position == 0 || position > count {
            return false;
        }
        // Widened so `p - B` cannot overflow for any i64 formula
        let (p, a, b) = (position as i128, self.step as i128, self.offset as i128);
        match a.cmp(&0) {
            Ordering::Equal => p == b,
            Ordering::Greater => p >= b && (p - b) % a == 0,
            Ordering::Less => p <= b && (b - p) % -a == 0,
        }
    }
}

#[cfg(test)]
#[test]
fn test_nth_extreme_values() {
    let max = NthFormula::new(i64::MAX, 1);
    assert!(max.matches(1, 2));
    assert!(!max.matches(2, 2));
    assert!(!NthFormula::new(i64::MIN, i64::MAX).matches(usize::MAX, usize::MAX));
    // Large negative offsets land on the same residues as small ones
    let far = NthFormula::new(1, -9_000_000_000_000_000_000);
    assert!(far.matches(1, 1));
    assert!(far.matches(7, 10));
    let shifted = NthFormula::new(3, i64::MIN);
    let hits: Vec<_> = (1..=10).filter(|&p| shifted.matches(p, 10)).collect();
    let residue = (i64::MIN as i128).rem_euclid(3) as usize;
    let expected: Vec<_> = (1..=10).filter(|p| p % 3 == residue).collect();
    assert_eq!(hits, expected);
    // -n+huge: every position up to the end
    let all = NthFormula::new(-1, i64::MAX);
    assert_eq!((1..=4).filter(|&p| all.matches(p, 4)).count(), 4);
    assert!(!NthFormula::new(0, i64::MIN).matches(1, 1));

    let compiled = nth_formula("9223372036854775807n+1").unwrap();
    assert!(compiled.matches(1, 2));
    assert!(!compiled.matches(2, 2));
    let compiled = nth_formula("n-9000000000000000000").unwrap();
    assert!(compiled.matches(3, 3));
}

#[cfg(test)]
#[test]
fn test_nth_walk() {
    let hits = |f: NthFormula, count| {
        (1..=count)
            .filter(|&p| f.matches(p, count))
            .collect::<Vec<_>>()
    };
    assert_eq!(hits(NthFormula::ODD, 5), [1, 3, 5]);
    assert_eq!(hits(NthFormula::EVEN, 5), [2, 4]);
    assert_eq!(hits(NthFormula::new(0, 3), 5), [3]);
    assert_eq!(hits(NthFormula::new(0, 9), 5), Vec::<usize>::new());
    assert_eq!(hits(NthFormula::new(1, 0), 3), [1, 2, 3]);
    // -n+3: the first three
    assert_eq!(hits(NthFormula::new(-1, 3), 5), [1, 2, 3]);
    assert_eq!(hits(NthFormula::new(3, -2), 7), [1, 4, 7]);
    // Negative step starting past the end walks back into range
    assert_eq!(hits(NthFormula::new(-2, 10), 5), [2, 4]);
}

#[macro_export]
macro_rules! compound_selector {
    ($($field:ident: $value:expr),* $(,)?) => {
        $crate::Selector::Compound($crate::CompoundSelector {
            $($field: $value,)*
            ..Default::default()
        })
    };
}

#[macro_export]
macro_rules! combinator_selector {
    ($l:expr, $c:expr, $r:expr) => {
        $crate::Selector::Combinator(Box::new($l), $c, Box::new($r))
    };
}

mod error;
mod parsing;
#[cfg(test)]
mod tests;

pub use error::{Result, SelectorError};
pub use parsing::{nth_formula, selector_list};

//! Syntax tree for style text.
//!
//! Only the structure the filter needs is modelled: rules, at-rules,
//! declarations and selectors broken down to simple selectors.

use std::fmt;

/// A top-level or nested node of a stylesheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Node {
    Rule(StyleRule),
    AtRule(AtRule),
}

/// A qualified rule: `selectors { declarations }`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct StyleRule {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
}

/// An at-rule. Nested rules are only parsed for at-rules that are unwrapped
/// by the filter; the rest are kept as a name so they can be dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct AtRule {
    pub name: String,
    pub rules: Vec<Node>,
}

/// `property: value [!important]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.value)?;
        if self.important {
            f.write_str(" !important")?;
        }
        Ok(())
    }
}

/// Relation between two compound selectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

impl Combinator {
    fn as_str(self) -> &'static str {
        match self {
            Self::Descendant => " ",
            Self::Child => " > ",
            Self::NextSibling => " + ",
            Self::SubsequentSibling => " ~ ",
        }
    }
}

/// A simple selector inside a compound selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Simple {
    Type(String),
    Universal,
    Id(String),
    Class(String),
    /// Raw text between the brackets.
    Attribute(String),
    PseudoClass { name: String, args: Option<String> },
    PseudoElement(String),
    /// Ancestor added by the filter, printed verbatim.
    Scope(&'static str),
}

impl fmt::Display for Simple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(name) => f.write_str(name),
            Self::Universal => f.write_str("*"),
            Self::Id(name) => write!(f, "#{name}"),
            Self::Class(name) => write!(f, ".{name}"),
            Self::Attribute(raw) => write!(f, "[{raw}]"),
            Self::PseudoClass { name, args: None } => write!(f, ":{name}"),
            Self::PseudoClass {
                name,
                args: Some(args),
            } => write!(f, ":{name}({args})"),
            Self::PseudoElement(name) => write!(f, "::{name}"),
            Self::Scope(ancestor) => f.write_str(ancestor),
        }
    }
}

/// One complex selector: compounds joined by combinators.
///
/// The first part never carries a combinator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Selector {
    pub parts: Vec<(Option<Combinator>, Vec<Simple>)>,
}

impl Selector {
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (combinator, compound) in &self.parts {
            if let Some(combinator) = combinator {
                f.write_str(combinator.as_str())?;
            }
            for simple in compound {
                write!(f, "{simple}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_display() {
        let selector = Selector {
            parts: vec![
                (None, vec![Simple::Class("box".to_owned())]),
                (
                    Some(Combinator::Child),
                    vec![
                        Simple::Type("td".to_owned()),
                        Simple::PseudoClass {
                            name: "nth-child".to_owned(),
                            args: Some("2n+1".to_owned()),
                        },
                    ],
                ),
            ],
        };
        assert_eq!(selector.to_string(), ".box > td:nth-child(2n+1)");
    }

    #[test]
    fn test_declaration_display() {
        let decl = Declaration {
            property: "color".to_owned(),
            value: "red".to_owned(),
            important: true,
        };
        assert_eq!(decl.to_string(), "color: red !important");
    }
}

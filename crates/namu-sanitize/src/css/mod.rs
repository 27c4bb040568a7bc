//! CSS rule filter.
//!
//! User-authored style text is parsed into a syntax tree, reduced to an
//! allow-listed subset and printed back out. Two entry points exist:
//!
//! - [`filter_declarations`] for `style="..."` attribute values
//! - [`filter_stylesheet`] for stylesheet text, scoped under
//!   `.wiki-content[class]` unless [`Scope::Root`] is requested
//!
//! Neither returns an error: style text that cannot be parsed filters to the
//! empty string.
//!
//! # Example
//!
//! ```
//! use namu_sanitize::{Scope, filter_declarations, filter_stylesheet};
//!
//! assert_eq!(filter_declarations("color: red; position: fixed"), "color: red");
//!
//! let css = filter_stylesheet("p.note { color: red }", Scope::Document);
//! assert_eq!(css, ".wiki-content[class] .note { color: red }");
//! ```

mod ast;
mod parser;

use ast::{Combinator, Declaration, Node, Selector, Simple, StyleRule};

/// At-rule whose nested rules only apply in dark mode.
pub(crate) const DARK_MODE_AT_RULE: &str = "theseed-dark-mode";

const DARK_MODE_ANCESTOR: &str = ".theseed-dark-mode";
const SCOPE_ANCESTOR: &str = ".wiki-content[class]";

const ALLOWED_PROPERTIES: &[&str] = &[
    "align-items",
    "background",
    "background-color",
    "border",
    "border-bottom",
    "border-bottom-color",
    "border-bottom-style",
    "border-bottom-width",
    "border-collapse",
    "border-color",
    "border-left",
    "border-left-color",
    "border-left-style",
    "border-left-width",
    "border-radius",
    "border-right",
    "border-right-color",
    "border-right-style",
    "border-right-width",
    "border-spacing",
    "border-style",
    "border-top",
    "border-top-color",
    "border-top-style",
    "border-top-width",
    "border-width",
    "box-sizing",
    "clear",
    "color",
    "display",
    "flex",
    "flex-basis",
    "flex-direction",
    "flex-grow",
    "flex-shrink",
    "flex-wrap",
    "float",
    "font-family",
    "font-size",
    "font-style",
    "font-weight",
    "gap",
    "height",
    "justify-content",
    "letter-spacing",
    "line-height",
    "margin",
    "margin-bottom",
    "margin-left",
    "margin-right",
    "margin-top",
    "max-height",
    "max-width",
    "min-height",
    "min-width",
    "opacity",
    "overflow",
    "overflow-x",
    "overflow-y",
    "padding",
    "padding-bottom",
    "padding-left",
    "padding-right",
    "padding-top",
    "text-align",
    "text-decoration",
    "text-shadow",
    "vertical-align",
    "white-space",
    "width",
    "word-break",
];

const ALLOWED_DISPLAY: &[&str] = &[
    "block",
    "inline",
    "inline-block",
    "flex",
    "inline-flex",
    "none",
    "table",
    "table-cell",
    "table-row",
    "list-item",
];
const ALLOWED_TEXT_ALIGN: &[&str] = &["left", "right", "center", "justify", "start", "end"];
const ALLOWED_ALIGN_ITEMS: &[&str] = &[
    "stretch",
    "center",
    "flex-start",
    "flex-end",
    "baseline",
    "start",
    "end",
];

const FORBIDDEN_VALUE_FRAGMENTS: &[&str] = &["url(", "expression(", "javascript:", "\\", "<", ">"];

/// Type selectors that may survive next to a class, id or combinator.
const ALLOWED_TYPE_SELECTORS: &[&str] = &["table", "tbody", "tr", "td"];

const ALLOWED_PSEUDO_CLASSES: &[&str] = &[
    "active",
    "empty",
    "first-child",
    "first-of-type",
    "focus",
    "hover",
    "last-child",
    "last-of-type",
    "nth-child",
    "nth-last-child",
    "nth-of-type",
    "only-child",
];

/// Where filtered stylesheet rules are allowed to apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Rules are confined to rendered document content.
    Document,
    /// Site-level styles; selectors are left unscoped.
    Root,
}

/// Filter a declaration list (the value of a `style` attribute).
///
/// Returns the surviving declarations joined with `"; "`, or an empty string
/// when nothing survives or the input cannot be parsed.
pub fn filter_declarations(style: &str) -> String {
    match parser::parse_declaration_list(style) {
        Ok(declarations) => join_declarations(&filter_declaration_list(declarations)),
        Err(err) => {
            tracing::debug!(error = %err, "Dropping unparsable style attribute");
            String::new()
        }
    }
}

/// Filter a stylesheet.
///
/// Every rule is reduced to allow-listed selectors and declarations, dark
/// mode rules are hoisted out of their at-rule, and all other at-rules are
/// removed. Rules are printed one per line.
pub fn filter_stylesheet(css: &str, scope: Scope) -> String {
    let nodes = match parser::parse_stylesheet(css) {
        Ok(nodes) => nodes,
        Err(err) => {
            tracing::debug!(error = %err, "Dropping unparsable stylesheet");
            return String::new();
        }
    };

    let mut rules = Vec::new();
    filter_nodes(nodes, scope, false, &mut rules);

    let mut out = String::new();
    for rule in rules {
        if !out.is_empty() {
            out.push('\n');
        }
        let selectors: Vec<String> = rule.selectors.iter().map(ToString::to_string).collect();
        out.push_str(&selectors.join(", "));
        out.push_str(" { ");
        out.push_str(&join_declarations(&rule.declarations));
        out.push_str(" }");
    }
    out
}

fn filter_nodes(nodes: Vec<Node>, scope: Scope, dark: bool, out: &mut Vec<StyleRule>) {
    for node in nodes {
        match node {
            Node::Rule(rule) => {
                if let Some(rule) = filter_rule(rule, scope, dark) {
                    out.push(rule);
                }
            }
            Node::AtRule(at_rule) if at_rule.name == DARK_MODE_AT_RULE && !dark => {
                filter_nodes(at_rule.rules, scope, true, out);
            }
            Node::AtRule(at_rule) => {
                tracing::trace!(name = %at_rule.name, "Dropping at-rule");
            }
        }
    }
}

fn filter_rule(rule: StyleRule, scope: Scope, dark: bool) -> Option<StyleRule> {
    let declarations = filter_declaration_list(rule.declarations);
    if declarations.is_empty() {
        return None;
    }

    let selectors: Vec<Selector> = rule
        .selectors
        .into_iter()
        .filter_map(filter_selector)
        .map(|selector| add_ancestors(selector, scope, dark))
        .collect();
    if selectors.is_empty() {
        return None;
    }

    Some(StyleRule {
        selectors,
        declarations,
    })
}

fn filter_declaration_list(declarations: Vec<Declaration>) -> Vec<Declaration> {
    declarations.into_iter().filter(is_allowed).collect()
}

fn is_allowed(declaration: &Declaration) -> bool {
    if !ALLOWED_PROPERTIES.contains(&declaration.property.as_str()) {
        return false;
    }

    let value = declaration.value.to_ascii_lowercase();
    if FORBIDDEN_VALUE_FRAGMENTS
        .iter()
        .any(|fragment| value.contains(fragment))
    {
        return false;
    }

    let enumerated = match declaration.property.as_str() {
        "display" => ALLOWED_DISPLAY,
        "text-align" => ALLOWED_TEXT_ALIGN,
        "align-items" => ALLOWED_ALIGN_ITEMS,
        _ => return true,
    };
    enumerated.contains(&value.trim())
}

fn join_declarations(declarations: &[Declaration]) -> String {
    declarations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Reduce a selector to its allowed simple selectors.
///
/// Compounds that end up empty are removed; the compound that follows takes
/// a descendant combinator since the relation through the removed step is
/// no longer expressible.
fn filter_selector(selector: Selector) -> Option<Selector> {
    let count = selector.parts.len();
    let mut parts = Vec::with_capacity(count);
    let mut broken_chain = false;

    for (i, (combinator, compound)) in selector.parts.into_iter().enumerate() {
        let has_id_or_class = compound
            .iter()
            .any(|s| matches!(s, Simple::Id(_) | Simple::Class(_)));
        let next_to_combinator = i > 0 || i + 1 < count;

        let kept: Vec<Simple> = compound
            .into_iter()
            .filter(|simple| keep_simple(simple, has_id_or_class || next_to_combinator))
            .collect();

        if kept.is_empty() {
            broken_chain = true;
            continue;
        }

        let combinator = if parts.is_empty() {
            None
        } else if broken_chain {
            Some(Combinator::Descendant)
        } else {
            combinator
        };
        broken_chain = false;
        parts.push((combinator, kept));
    }

    let filtered = Selector { parts };
    (!filtered.is_empty()).then_some(filtered)
}

fn keep_simple(simple: &Simple, type_allowed_here: bool) -> bool {
    match simple {
        Simple::Type(name) => type_allowed_here && ALLOWED_TYPE_SELECTORS.contains(&name.as_str()),
        Simple::Id(name) | Simple::Class(name) => is_plain_ident(name),
        Simple::PseudoClass { name, args } => {
            ALLOWED_PSEUDO_CLASSES.contains(&name.as_str())
                && args.as_deref().is_none_or(is_nth_argument)
        }
        Simple::Universal
        | Simple::Attribute(_)
        | Simple::PseudoElement(_)
        | Simple::Scope(_) => false,
    }
}

fn is_plain_ident(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn is_nth_argument(args: &str) -> bool {
    matches!(args, "odd" | "even")
        || args
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, 'n' | '+' | '-' | ' '))
}

fn add_ancestors(selector: Selector, scope: Scope, dark: bool) -> Selector {
    let mut ancestors = Vec::new();
    if dark {
        ancestors.push(DARK_MODE_ANCESTOR);
    }
    if scope == Scope::Document {
        ancestors.push(SCOPE_ANCESTOR);
    }

    let mut parts: Vec<(Option<Combinator>, Vec<Simple>)> = ancestors
        .into_iter()
        .enumerate()
        .map(|(i, ancestor)| {
            let combinator = (i > 0).then_some(Combinator::Descendant);
            (combinator, vec![Simple::Scope(ancestor)])
        })
        .collect();

    for (i, (combinator, compound)) in selector.parts.into_iter().enumerate() {
        let combinator = if i == 0 && !parts.is_empty() {
            Some(Combinator::Descendant)
        } else {
            combinator
        };
        parts.push((combinator, compound));
    }

    Selector { parts }
}

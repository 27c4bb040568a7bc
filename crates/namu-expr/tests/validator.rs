use namu_expr::{Construct, ExprError, check, is_safe};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn rejected(snippet: &str) -> Construct {
    match check(snippet) {
        Err(ExprError::Forbidden { construct, .. }) => construct,
        other => panic!("{snippet:?} should be forbidden, got {other:?}"),
    }
}

#[test]
fn test_reference_snippets() {
    assert!(!is_safe("function f(){}"));
    assert!(is_safe("a && b.includes(c)"));
    assert!(!is_safe("while(true){}"));
}

#[test]
fn test_allowed_snippets() {
    for snippet in [
        "",
        "user.groups.includes('admin') || ip.startsWith(\"10.\")",
        "a ? b : c",
        "x = [1, 2, ...rest].length > 2",
        "const n = Number(input); n >= 0 && n < 10",
        "for (let i = 0; i < 3; i++) { total += i }",
        "for (const g of groups) if (g === 'x') break",
        "({ a: 1, 'b': [2], [k]: 3 })",
        "`user: ${user.name}`",
        "typeof x === 'undefined' || x instanceof Date",
        "/^[a-z]+$/i.test(name)",
        "a?.b?.[c]?.(d) ?? e",
        "new Date().getTime() > deadline",
        "try { JSON.parse(s) } catch { false }",
        "switch (x) { case 1: y = 2; break; default: y = 3 }",
        "a ** -b",
    ] {
        assert_eq!(check(snippet), Ok(()), "{snippet}");
    }
}

#[test]
fn test_forbidden_constructs() {
    assert_eq!(rejected("function f(){}"), Construct::FunctionDeclaration);
    assert_eq!(rejected("async function f(){}"), Construct::FunctionDeclaration);
    assert_eq!(rejected("x = function () {}"), Construct::FunctionExpression);
    assert_eq!(rejected("list.map(x => x * 2)"), Construct::ArrowFunction);
    assert_eq!(rejected("list.map(async (x) => { await x })"), Construct::ArrowFunction);
    assert_eq!(rejected("({ f() {} })"), Construct::Method);
    assert_eq!(rejected("({ get x() { return 1 } })"), Construct::Accessor);
    assert_eq!(rejected("class A {}"), Construct::ClassDeclaration);
    assert_eq!(rejected("x = class {}"), Construct::ClassExpression);
    assert_eq!(rejected("while (x) x--"), Construct::While);
    assert_eq!(rejected("do { x++ } while (x < 10)"), Construct::DoWhile);
    assert_eq!(rejected("`${(() => 1)()}`"), Construct::ArrowFunction);
}

#[test]
fn test_first_forbidden_construct_is_reported() {
    let err = check("ok; while (1) {} function f() {}").unwrap_err();
    assert_eq!(
        err,
        ExprError::Forbidden {
            construct: Construct::While,
            offset: 4
        }
    );
    assert_eq!(err.to_string(), "while loop is not allowed (at byte 4)");
}

#[test]
fn test_syntax_errors_are_invalid() {
    for snippet in ["a +", "if (", "a b", "'unterminated", "}"] {
        assert!(matches!(check(snippet), Err(ExprError::Syntax { .. })), "{snippet}");
        assert!(!is_safe(snippet));
    }
}

#[test]
fn test_deep_nesting_is_a_syntax_error() {
    let parens = format!("{}1{}", "(".repeat(5_000), ")".repeat(5_000));
    let blocks = format!("{}{}", "{".repeat(5_000), "}".repeat(5_000));
    let unary = format!("{}x", "!".repeat(5_000));
    let templates = format!("{}1{}", "`${".repeat(5_000), "}`".repeat(5_000));
    let news = format!("{}X", "new ".repeat(5_000));
    let classes = format!("x = {}A {}", "class extends ".repeat(5_000), "{}".repeat(5_000));
    for snippet in [&parens, &blocks, &unary, &templates, &news, &classes] {
        assert!(matches!(check(snippet), Err(ExprError::Syntax { .. })));
        assert!(!is_safe(snippet));
    }
}

#[test]
fn test_long_flat_chains_are_safe() {
    assert!(is_safe(&vec!["a"; 50_000].join(" + ")));
    assert!(is_safe(&vec!["a"; 50_000].join(" && ")));
    assert!(is_safe(&format!("a{}", ".b".repeat(50_000))));
}

proptest! {
    #[test]
    fn never_panics(input in "\\PC{0,200}") {
        let _ = is_safe(&input);
    }

    #[test]
    fn property_chains_are_safe(names in prop::collection::vec("[a-z][a-z0-9]{0,6}", 1..6)) {
        let snippet = names
            .iter()
            .map(|name| format!("v_{name}"))
            .collect::<Vec<_>>()
            .join(" && ");
        prop_assert!(is_safe(&snippet), "{snippet}");
    }
}

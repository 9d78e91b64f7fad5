use pegrat::prelude::*;
use pegrat::{Error, Grammar, Parser, Tree};
use pretty_assertions::assert_eq;

use crate::{ARITHMETIC, DIRECT_SUM, INDIRECT_SUM};

fn int(text: &str) -> Tree {
    Tree::map([("int", Tree::from(text))])
}

fn op(l: Tree, o: &str, r: Tree) -> Tree {
    Tree::map([("l", l), ("o", Tree::from(o)), ("r", r)])
}

#[test]
fn test_direct_left_recursion_consumes_everything() {
    let tree = DIRECT_SUM.parse("1+2+3").unwrap();
    assert_eq!(tree, Tree::from("1+2+3"));
}

#[test]
fn test_indirect_left_recursion_matches_direct() {
    for input in ["7", "1+2", "1+2+3", "10+200+3000"] {
        assert_eq!(
            INDIRECT_SUM.parse(input).unwrap(),
            DIRECT_SUM.parse(input).unwrap(),
            "input {:?}",
            input
        );
    }
}

#[test]
fn test_left_recursion_is_left_associative() {
    let tree = ARITHMETIC.parse("1-2-3").unwrap();
    assert_eq!(tree, op(op(int("1"), "-", int("2")), "-", int("3")));
}

#[test]
fn test_nested_left_recursive_rules_respect_precedence() {
    let tree = ARITHMETIC.parse("1+2*3").unwrap();
    assert_eq!(tree, op(int("1"), "+", op(int("2"), "*", int("3"))));

    let tree = ARITHMETIC.parse("(1+2)*3").unwrap();
    assert_eq!(tree, op(op(int("1"), "+", int("2")), "*", int("3")));
}

#[test]
fn test_left_recursion_inside_parentheses() {
    let tree = ARITHMETIC.parse("2*(3-1-1)").unwrap();
    assert_eq!(
        tree,
        op(int("2"), "*", op(op(int("3"), "-", int("1")), "-", int("1")))
    );
}

#[test]
fn test_base_case_never_matching_is_an_ordinary_failure() {
    let grammar = Grammar::builder()
        .rule("a", |r| r.rule("a") >> lit("x"))
        .root("a")
        .build()
        .unwrap();
    match grammar.parse("xx") {
        Err(Error::Parse(failure)) => assert_eq!(failure.cause().offset(), 0),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_trailing_operator_is_left_unconsumed() {
    let err = DIRECT_SUM.parse("1+2+").unwrap_err();
    let cause = err.cause().unwrap();
    // the last growth round lost to the plain digits alternative
    assert_eq!(cause.offset(), 3);
    assert_eq!(
        cause.to_string(),
        "Don't know what to do with \"+\" at line 1 char 4."
    );
    assert_eq!(DIRECT_SUM.parse_prefix("1+2+").unwrap(), Tree::from("1+2"));
}

#[test]
fn test_mutual_recursion_through_two_rules() {
    // a := b 'a' / 'a' ; b := a 'b' / 'b'
    let grammar = Grammar::builder()
        .rule("a", |r| (r.rule("b") >> lit("a")) | lit("a"))
        .rule("b", |r| (r.rule("a") >> lit("b")) | lit("b"))
        .root("a")
        .build()
        .unwrap();
    assert_eq!(grammar.parse("a").unwrap(), Tree::from("a"));
    assert_eq!(grammar.parse("ba").unwrap(), Tree::from("ba"));
    assert_eq!(grammar.parse("aba").unwrap(), Tree::from("aba"));
    assert!(grammar.parse("ab").is_err());
}

#[test]
fn test_growth_drops_unnamed_text_next_to_named_seed() {
    let grammar = Grammar::builder()
        .rule("list", |r| {
            (r.rule("list") >> lit(",") >> r.rule("item")) | r.rule("item").named("first")
        })
        .rule("item", |_| class("[a-z]"))
        .root("list")
        .build()
        .unwrap();
    let tree = grammar.parse("a,b,c").unwrap();
    assert_eq!(tree, Tree::map([("first", Tree::from("a"))]));
}

/// `s := a '?' / <fallback>`, `a := d / b / 'x'`, `d := a '!'?`, `b := a '+'`.
///
/// `b` joins the cluster grown from `a` at offset 0, but once `a` has grown to
/// `x!` no round reaches `b` again.
fn cluster_grammar(fallback: &'static str) -> Grammar {
    Grammar::builder()
        .rule("s", move |r| (r.rule("a") >> lit("?")) | r.rule(fallback))
        .rule("a", |r| r.rule("d") | r.rule("b") | lit("x"))
        .rule("d", |r| r.rule("a") >> lit("!").maybe())
        .rule("b", |r| r.rule("a") >> lit("+"))
        .rule("c", |r| r.rule("a") >> lit("+"))
        .root("s")
        .build()
        .unwrap()
}

#[test]
fn test_cluster_member_is_evaluated_again_after_growing() {
    let through_member = cluster_grammar("b");
    let outside = cluster_grammar("c");
    assert_eq!(through_member.parse("x!+").unwrap(), Tree::from("x!+"));
    assert_eq!(outside.parse("x!+").unwrap(), Tree::from("x!+"));
    assert_eq!(through_member.parse("x+").unwrap(), Tree::from("x+"));
    assert_eq!(through_member.parse("x!?").unwrap(), Tree::from("x!?"));
}

#[test]
fn test_rule_outside_the_cluster_fails_while_growing() {
    // expr := expr '+' num / &expr late / num
    let grammar = Grammar::builder()
        .rule("expr", |r| {
            (r.rule("expr") >> lit("+") >> r.rule("num"))
                | (r.rule("expr").present() >> r.rule("late"))
                | r.rule("num")
        })
        .rule("late", |r| r.rule("num") >> lit("?"))
        .rule("num", |_| class("[0-9]").many1())
        .root("expr")
        .build()
        .unwrap();

    // `late` is first reached at offset 0 during a growth round of `expr`,
    // where only rules of the cluster are evaluated
    assert_eq!(grammar.parse_prefix("1?").unwrap(), Tree::from("1"));
    assert!(grammar.parse("1?").is_err());
    assert_eq!(grammar.parse_rule("late", "1?").unwrap(), Tree::from("1?"));
}

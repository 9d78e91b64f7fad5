use pegrat::prelude::*;
use pegrat::{Parser, Tree};
use pretty_assertions::assert_eq;
use proptest::{prop_assert, prop_assert_eq, proptest};

use pegrat::{Captures, Grammar, Source};

use crate::{ARITHMETIC, DIRECT_SUM, INDIRECT_SUM};

/// ```text
/// line := sum:sum? rest:.*
/// sum  := sum '+' num / num
/// num  := [0-9]+
/// ```
fn split_line() -> Grammar {
    Grammar::builder()
        .rule("line", |r| r.rule("sum").maybe().named("sum") >> any().many().named("rest"))
        .rule("sum", |r| (r.rule("sum") >> lit("+") >> r.rule("num")) | r.rule("num"))
        .rule("num", |_| class("[0-9]").many1())
        .root("line")
        .build()
        .unwrap()
}

#[test]
fn test_left_bias() {
    let atom = lit("a").named("first") | lit("a").named("second");
    assert_eq!(atom.parse("a").unwrap(), Tree::map([("first", Tree::from("a"))]));

    // the shorter first alternative wins even though it leaves input behind
    let atom = lit("a") | lit("ab");
    assert!(atom.parse("ab").is_err());
    assert_eq!(atom.parse_prefix("ab").unwrap(), Tree::from("a"));
}

#[test]
fn test_repetition_bounds() {
    let atom = lit("a").repeat(1, 2);
    assert!(atom.parse("").is_err());
    assert_eq!(atom.parse("a").unwrap(), Tree::from("a"));
    assert_eq!(atom.parse("aa").unwrap(), Tree::from("aa"));
    assert!(atom.parse("aaa").is_err());
}

#[test]
fn test_positive_lookahead_does_not_consume() {
    let atom = lit("foo").present();
    assert_eq!(atom.parse_prefix("foo").unwrap(), Tree::Unit);
    // the whole input is left, so a full parse fails at offset 0
    let err = atom.parse("foo").unwrap_err();
    assert_eq!(err.cause().unwrap().offset(), 0);

    let keyword = lit("if") >> class("[a-z]").absent();
    assert!(keyword.parse_prefix("if x").is_ok());
    assert!(keyword.parse_prefix("iffy").is_err());
}

#[test]
fn test_deepest_error_is_reported() {
    let atom = (lit("a") >> lit("b") >> lit("c")) | (lit("a") >> lit("b") >> lit("d"));
    let err = atom.parse("abx").unwrap_err();
    let cause = err.cause().unwrap();
    assert_eq!(cause.offset(), 2);
    assert_eq!(cause.position().unwrap().column, 3);
}

#[test]
fn test_halt_accepts_the_rest_of_the_input() {
    assert_eq!((lit("a") >> halt()).parse("abc").unwrap(), Tree::from("a"));
    assert!(lit("a").parse("abc").is_err());

    let comment_or_word = (lit("#") >> halt()) | class("[a-z]").many1();
    assert_eq!(comment_or_word.parse("# anything at all").unwrap(), Tree::from("#"));
    assert_eq!(comment_or_word.parse("word").unwrap(), Tree::from("word"));
}

fn closing_quote(_: &Source, captures: &Captures) -> Atom {
    lit(captures.get("quote").and_then(Tree::as_str).unwrap_or("'"))
}

#[test]
fn test_dynamic_atom_sees_enclosing_captures() {
    let body = (dynamic(closing_quote).absent() >> any()).many().named("text");
    let string = scope(class("['\"]").capture("quote") >> body >> dynamic(closing_quote));
    assert_eq!(
        string.parse("\"it's\"").unwrap(),
        Tree::map([("text", Tree::from("it's"))])
    );
    assert!(string.parse("\"it's'").is_err());
}

proptest! {
    #[test]
    fn prop_parse_is_deterministic(text in "[0-9+*()-]{0,12}") {
        let first = ARITHMETIC.parse(&text);
        let second = ARITHMETIC.parse(&text);
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => prop_assert_eq!(a.to_string(), b.to_string()),
            _ => prop_assert!(false, "outcomes differ for {:?}", text),
        }
    }

    #[test]
    fn prop_sums_parse_completely(numbers in proptest::collection::vec(0u32..1000, 1..8)) {
        let text = numbers.iter().map(u32::to_string).collect::<Vec<_>>().join("+");
        let direct = DIRECT_SUM.parse(&text).unwrap();
        prop_assert_eq!(direct.as_str(), Some(text.as_str()));
        prop_assert_eq!(INDIRECT_SUM.parse(&text).unwrap(), direct);
    }

    #[test]
    fn prop_repetition_accepts_only_bounded_counts(count in 0usize..8, min in 0usize..4, extra in 0usize..4) {
        let max = min + extra;
        let text = "a".repeat(count);
        let result = lit("a").repeat(min, max).parse(&text);
        prop_assert_eq!(result.is_ok(), count >= min && count <= max);
    }

    #[test]
    fn prop_rules_leave_the_cursor_where_their_match_ends(text in "[0-9+;x]{0,10}") {
        // whatever the left-recursive rule takes, the rest picks up right after it
        let tree = split_line().parse(&text).unwrap();
        let fields = tree.as_map().unwrap();
        let sum = fields["sum"].as_str().unwrap_or("");
        let rest = fields["rest"].as_str().unwrap_or("");
        prop_assert_eq!(format!("{}{}", sum, rest), text);
    }
}

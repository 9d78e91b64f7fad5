use pegrat::prelude::*;
use pegrat::{Grammar, ParseOptions, Parser, Tree};
use pretty_assertions::assert_eq;

fn s(text: &str) -> Tree {
    Tree::from(text)
}

#[test]
fn test_named_sequence_merges_maps() {
    let atom = lit("a").named("a") >> lit("b").named("b");
    assert_eq!(
        atom.parse("ab").unwrap(),
        Tree::map([("a", s("a")), ("b", s("b"))])
    );
}

#[test]
fn test_unnamed_text_between_names_is_dropped() {
    let atom = lit("a").named("a") >> lit("x") >> lit("b").named("b");
    assert_eq!(
        atom.parse("axb").unwrap(),
        Tree::map([("a", s("a")), ("b", s("b"))])
    );
}

#[test]
fn test_repeated_names_become_list_of_maps() {
    let atom = lit("a").named("x").many();
    assert_eq!(
        atom.parse("aa").unwrap(),
        Tree::list([Tree::map([("x", s("a"))]), Tree::map([("x", s("a"))])])
    );
}

#[test]
fn test_unnamed_repetition_concatenates() {
    let word = class("[a-z]").many1();
    assert_eq!(word.parse("hello").unwrap(), s("hello"));
    assert_eq!(word.parse("hello").unwrap().as_slice().unwrap().offset(), 0);
}

#[test]
fn test_empty_repetition() {
    let atom = lit("a").many().named("items") >> lit(";");
    assert_eq!(atom.parse(";").unwrap(), Tree::map([("items", Tree::list([]))]));

    let atom = lit("a").many() >> lit(";").ignore();
    assert_eq!(atom.parse(";").unwrap(), Tree::Unit);
}

#[test]
fn test_maybe_yields_value_or_unit() {
    let atom = lit("-").maybe().named("sign") >> class("[0-9]").named("digit");
    assert_eq!(
        atom.parse("-1").unwrap(),
        Tree::map([("sign", s("-")), ("digit", s("1"))])
    );
    assert_eq!(
        atom.parse("1").unwrap(),
        Tree::map([("sign", Tree::Unit), ("digit", s("1"))])
    );
}

#[test]
fn test_nested_lists_concatenate_one_level() {
    let pair = (lit("a").named("a") >> lit("b").named("b")).many1().named("pairs");
    let groups = (pair >> lit(";")).many1();
    let tree = groups.parse("ab;abab;").unwrap();
    let pairs = tree.as_list().unwrap();
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[1].get("pairs").unwrap().as_list().unwrap().len(), 2);
}

#[test]
fn test_duplicate_keys_last_wins_with_warning() {
    let atom = lit("a").named("k") >> lit("b").named("k");
    let parsed = atom.parse_with("ab", &ParseOptions::default()).unwrap();
    assert_eq!(parsed.tree, Tree::map([("k", s("b"))]));
    assert_eq!(parsed.warnings.len(), 1);
    assert_eq!(
        parsed.warnings[0].to_string(),
        "duplicate subtrees while merging result: key \"k\" was overwritten"
    );
}

#[test]
fn test_rule_results_are_flattened_at_the_boundary() {
    let grammar = Grammar::builder()
        .rule("call", |r| r.rule("ident").named("name") >> lit("(") >> r.rule("args").named("args") >> lit(")"))
        .rule("ident", |_| class("[a-z]").many1())
        .rule("args", |r| (r.rule("ident").named("arg") >> lit(",").maybe()).many())
        .root("call")
        .build()
        .unwrap();

    assert_eq!(
        grammar.parse("f(x,y)").unwrap(),
        Tree::map([
            ("name", s("f")),
            (
                "args",
                Tree::list([Tree::map([("arg", s("x"))]), Tree::map([("arg", s("y"))])])
            ),
        ])
    );
    // the empty repetition is flattened unnamed at the rule boundary
    assert_eq!(
        grammar.parse("f()").unwrap(),
        Tree::map([("name", s("f")), ("args", Tree::Unit)])
    );
}

#[test]
fn test_json_rendering() {
    let atom = lit("a").named("x").many();
    let tree = atom.parse("aa").unwrap();
    assert_eq!(tree.to_json(), serde_json::json!([{"x": "a"}, {"x": "a"}]));
}

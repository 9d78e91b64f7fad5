use pegrat::prelude::*;
use pegrat::{config, Error, Grammar, Message, ParseOptions, Parser, ReporterKind};
use pretty_assertions::assert_eq;

fn choice() -> Atom {
    ((lit("ab") >> lit("c")) | (lit("a") >> lit("b"))) >> lit("!")
}

#[test]
fn test_reporters_pick_different_causes() {
    let deepest = choice().parse("abx").unwrap_err();
    assert_eq!(
        deepest.cause().unwrap().to_string(),
        "Failed to match sequence (('ab' 'c' / 'a' 'b') '!') at line 1 char 3."
    );

    let options = ParseOptions::default().reporter(ReporterKind::Contextual);
    let contextual = choice().parse_with("abx", &options).unwrap_err();
    assert_eq!(
        contextual.cause().unwrap().to_string(),
        "Expected \"!\", but got \"x\" at line 1 char 3."
    );

    let options = ParseOptions::default().reporter(ReporterKind::Tree);
    let tree = choice().parse_with("abx", &options).unwrap_err();
    assert_eq!(tree.cause().unwrap().children().len(), 1);
}

#[test]
fn test_deepest_ignores_alternatives_that_lost() {
    // 'a' 'b' 'c' gets further than 'a', but 'a' is the branch that matched
    let atom = ((lit("a") >> lit("b") >> lit("c")) | lit("a")) >> lit("z");
    let err = atom.parse("abd").unwrap_err();
    let cause = err.cause().unwrap();
    assert_eq!(cause.offset(), 1);
    assert_eq!(
        cause.children()[0].to_string(),
        "Expected \"z\", but got \"b\" at line 1 char 2."
    );
}

#[test]
fn test_ascii_tree_of_failed_choice() {
    let atom = (lit("a") >> lit("b") >> lit("c")) | (lit("a") >> lit("b") >> lit("d"));
    let options = ParseOptions::default().reporter(ReporterKind::Tree);
    let Err(Error::Parse(failure)) = atom.parse_with("abx", &options) else {
        panic!("expected a parse failure");
    };
    assert_eq!(
        failure.ascii_tree(),
        "\
Expected one of ['a' 'b' 'c', 'a' 'b' 'd'] at line 1 char 1.
|- Failed to match sequence ('a' 'b' 'c') at line 1 char 3.
|  `- Expected \"c\", but got \"x\" at line 1 char 3.
`- Failed to match sequence ('a' 'b' 'd') at line 1 char 3.
   `- Expected \"d\", but got \"x\" at line 1 char 3.
"
    );
}

#[test]
fn test_line_and_column_on_later_lines() {
    let line = class("[a-z]").many1() >> lit("\n");
    let atom = line.many1();
    let err = atom.parse("abc\nde\nf1\n").unwrap_err();
    let position = err.cause().unwrap().position().unwrap();
    assert_eq!((position.line, position.column), (3, 2));
    assert_eq!(position.offset, 8);
}

#[test]
fn test_labels_name_the_failing_construct() {
    let block = lit("{") >> class("[a-z]").many() >> lit("}").label("closing brace");
    let options = ParseOptions::default().reporter(ReporterKind::Contextual);
    let err = block.parse_with("{abc", &options).unwrap_err();
    let cause = err.cause().unwrap();
    assert_eq!(cause.label(), Some("closing brace"));
    assert_eq!(
        cause.to_string(),
        "closing brace: Premature end of input at line 1 char 5."
    );
}

#[test]
fn test_rule_names_in_messages() {
    let grammar = Grammar::builder()
        .rule("pair", |r| r.rule("key") >> lit("=") >> r.rule("value"))
        .rule("key", |_| class("[a-z]").many1())
        .rule("value", |_| class("[0-9]").many1())
        .root("pair")
        .build()
        .unwrap();
    let options = ParseOptions::default().reporter(ReporterKind::Tree);
    let err = grammar.parse_with("a=b", &options).unwrap_err();
    let cause = err.cause().unwrap();
    assert_eq!(
        cause.to_string(),
        "Failed to match sequence (KEY '=' VALUE) at line 1 char 3."
    );
    assert!(matches!(cause.children()[0].message(), Message::AtLeast { min: 1, .. }));
}

#[test]
fn test_options_from_config() {
    let options: ParseOptions = config::from_str(r#"{"reporter": "tree", "prefix": true}"#).unwrap();
    let atom = lit("a") >> lit("b");
    assert!(atom.parse_with("abc", &options).is_ok());
    let err = atom.parse_with("ax", &options).unwrap_err();
    assert_eq!(err.cause().unwrap().offset(), 1);
    assert_eq!(err.cause().unwrap().children().len(), 1);
}

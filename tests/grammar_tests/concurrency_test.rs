use std::thread;

use pegrat::prelude::*;
use pegrat::{Grammar, Parser, Tree};
use pretty_assertions::assert_eq;

use crate::{ARITHMETIC, DIRECT_SUM};

#[test]
fn test_shared_grammar_across_threads() {
    let inputs: Vec<String> = (1..=8)
        .map(|n| (1..=n).map(|i| i.to_string()).collect::<Vec<_>>().join("+"))
        .collect();

    thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|input| scope.spawn(move || DIRECT_SUM.parse(input)))
            .collect();
        for (handle, input) in handles.into_iter().zip(&inputs) {
            let tree = handle.join().expect("parser thread panicked").unwrap();
            assert_eq!(tree.as_str(), Some(input.as_str()));
        }
    });
}

#[test]
fn test_parses_do_not_share_state() {
    // a failure must not leave anything behind for the next parse
    assert!(ARITHMETIC.parse("1+").is_err());
    let tree = ARITHMETIC.parse("1").unwrap();
    assert_eq!(tree, Tree::map([("int", Tree::from("1"))]));
}

#[test]
fn test_cloned_grammar_is_independent_of_original() {
    let grammar = Grammar::builder()
        .rule("word", |_| class("[a-z]").many1())
        .root("word")
        .build()
        .unwrap();
    let clone = grammar.clone();
    let handle = thread::spawn(move || clone.parse("thread"));
    assert_eq!(grammar.parse("main").unwrap(), Tree::from("main"));
    assert_eq!(handle.join().unwrap().unwrap(), Tree::from("thread"));
}

mod grammar_tests;

use lazy_static::lazy_static;
use pegrat::prelude::*;
use pegrat::Grammar;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[ctor::ctor]
fn init_tests() {
    // one subscriber for the whole test binary, filtered by RUST_LOG
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

lazy_static! {
    /// Left-recursive arithmetic with named operands:
    ///
    /// ```text
    /// expr   := l:expr o:('+' / '-') r:term / term
    /// term   := l:term o:('*' / '/') r:factor / factor
    /// factor := '(' expr ')' / number
    /// number := int:[0-9]+
    /// ```
    pub static ref ARITHMETIC: Grammar = Grammar::builder()
        .rule("expr", |r| {
            (r.rule("expr").named("l") >> (lit("+") | lit("-")).named("o") >> r.rule("term").named("r"))
                | r.rule("term")
        })
        .rule("term", |r| {
            (r.rule("term").named("l") >> (lit("*") | lit("/")).named("o") >> r.rule("factor").named("r"))
                | r.rule("factor")
        })
        .rule("factor", |r| (lit("(") >> r.rule("expr") >> lit(")")) | r.rule("number"))
        .rule("number", |_| class("[0-9]").many1().named("int"))
        .root("expr")
        .build()
        .expect("arithmetic grammar");

    /// `expr := expr '+' digit+ / digit+`
    pub static ref DIRECT_SUM: Grammar = Grammar::builder()
        .rule("expr", |r| (r.rule("expr") >> lit("+") >> class("[0-9]").many1()) | class("[0-9]").many1())
        .root("expr")
        .build()
        .expect("direct sum grammar");

    /// The same language through a second rule: `expr := sum`, `sum := expr '+' digit+ / digit+`.
    pub static ref INDIRECT_SUM: Grammar = Grammar::builder()
        .rule("expr", |r| r.rule("sum"))
        .rule("sum", |r| (r.rule("expr") >> lit("+") >> class("[0-9]").many1()) | class("[0-9]").many1())
        .root("expr")
        .build()
        .expect("indirect sum grammar");
}

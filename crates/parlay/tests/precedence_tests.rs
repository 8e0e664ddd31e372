//! Operator precedence and associativity via the priority partial order.
//!
//! The expression grammar used here is the canonical double-checkpoint
//! setup: each rule carries a priority, and each recursive operand is
//! scoped with a requirement against it. Sums are left-associative
//! (`expr[>ps] + expr[>=ps]`), products bind tighter than sums, and
//! literals bind tightest.

use parlay::grammar::dsl::{kw, nt, re, rule_p, sym};
use parlay::grammar::{Priority, Symbol};
use parlay::tree::Node;

struct ExprGrammar {
    expr: Symbol,
}

fn expr_grammar() -> ExprGrammar {
    let ps = Priority::new("ps", []);
    let pp = Priority::new("pp", [ps.clone()]);
    let pi = Priority::new("pi", [pp.clone(), ps.clone()]);

    let num = re("NUM", "[0-9]+");
    let e = sym("Expr");
    let expr = nt(
        "Expr",
        [
            rule_p(&ps, [e.gt(&ps), kw("+"), e.ge(&ps)]),
            rule_p(&pp, [e.gt(&pp), kw("*"), e.ge(&pp)]),
            rule_p(&pi, [num]),
        ],
    );
    ExprGrammar { expr }
}

/// Render the tree as a bracketed expression, dropping the single-child
/// literal wrappers, so shapes are easy to assert on.
fn shape(node: &Node) -> String {
    match node {
        Node::Token(token) => token.text().to_string(),
        Node::Element(element) => {
            if element.len() == 1 {
                shape(&element.children()[0])
            } else {
                let mut out = String::from("(");
                for child in element.children() {
                    out.push_str(&shape(child));
                }
                out.push(')');
                out
            }
        }
    }
}

fn parse_shape(input: &str) -> String {
    let grammar = expr_grammar();
    let tree = grammar
        .expr
        .parse_str(input)
        .unwrap_or_else(|err| panic!("parse of {input:?} failed: {err}"));
    shape(tree.root())
}

#[test]
fn product_binds_tighter_than_sum() {
    assert_eq!(parse_shape("12*34+56*78"), "((12*34)+(56*78))");
}

#[test]
fn product_in_the_middle() {
    assert_eq!(parse_shape("12+34*56+78"), "(12+((34*56)+78))");
}

#[test]
fn sums_associate() {
    // With `>ps` on the left operand and `>=ps` on the right, a sum can
    // only extend to the right: a+b+c groups as a+(b+c).
    assert_eq!(parse_shape("1+2+3"), "(1+(2+3))");
}

#[test]
fn products_associate() {
    assert_eq!(parse_shape("1*2*3"), "(1*(2*3))");
}

#[test]
fn single_literal() {
    assert_eq!(parse_shape("42"), "42");
}

#[test]
fn precedence_yields_exactly_one_tree() {
    // The whole point of the priority checkpoints: no ambiguity error,
    // exactly one completed tree.
    let grammar = expr_grammar();
    assert!(grammar.expr.parse_str("1+2*3+4*5+6").is_ok());
}

#[test]
fn deterministic_across_runs() {
    let first = parse_shape("1+2*3*4+5");
    let second = parse_shape("1+2*3*4+5");
    assert_eq!(first, second);
}

#[test]
fn round_trip_with_precedence() {
    let grammar = expr_grammar();
    let tree = grammar.expr.parse_str("12*34+56*78").unwrap();
    assert_eq!(tree.text(), "12*34+56*78");
}

//! Generated `?` / `*` / `+` sequences and their flattening behavior.

use parlay::grammar::dsl::{
    kw, nt_rule, one_or_more, one_or_more_separated_by, opt, re, zero_or_more,
    zero_or_more_separated_by,
};
use parlay::grammar::{Symbol, Terminal};
use parlay::ParseTree;

fn num() -> Symbol {
    re("NUM", "[0-9]+")
}

fn ws() -> Vec<Terminal> {
    match re("WS", r"\s+") {
        Symbol::Terminal(terminal) => vec![terminal],
        _ => unreachable!(),
    }
}

fn parse(input: &str, root: &Symbol) -> ParseTree {
    root.parse_str_ignoring(input, ws())
        .unwrap_or_else(|err| panic!("parse of {input:?} failed: {err}"))
}

fn child_texts(tree: &ParseTree) -> Vec<String> {
    tree.root()
        .as_element()
        .expect("root should be an element")
        .children()
        .iter()
        .map(|child| child.as_token().expect("flat child").text().to_string())
        .collect()
}

#[test]
fn one_or_more_is_flat() {
    let root = one_or_more([num()]);
    let tree = parse("1 2 3", &root);
    // One element with three children, not a right-nested chain.
    assert_eq!(child_texts(&tree), ["1", "2", "3"]);
}

#[test]
fn one_or_more_single_occurrence() {
    let root = one_or_more([num()]);
    let tree = parse("7", &root);
    assert_eq!(child_texts(&tree), ["7"]);
}

#[test]
fn zero_or_more_accepts_empty_input() {
    let root = zero_or_more([num()]);
    let tree = parse("", &root);
    let element = tree.root().as_element().unwrap();
    assert!(element.is_empty());
    assert_eq!(element.range().start.offset, 0);
}

#[test]
fn zero_or_more_matches_many() {
    let root = zero_or_more([num()]);
    let tree = parse("4 5 6 7", &root);
    assert_eq!(child_texts(&tree), ["4", "5", "6", "7"]);
}

#[test]
fn optional_present_and_absent() {
    let root = nt_rule("Signed", [opt([kw("-")]), num()]);
    let with_sign = parse("-5", &root);
    let children = with_sign.root().as_element().unwrap().children();
    assert_eq!(children.len(), 2);
    let sign = children[0].as_element().expect("optional wrapper");
    assert_eq!(sign.len(), 1);

    let without_sign = parse("5", &root);
    let children = without_sign.root().as_element().unwrap().children();
    assert_eq!(children.len(), 2);
    let sign = children[0].as_element().expect("optional wrapper");
    assert!(sign.is_empty());
}

#[test]
fn separated_list_keeps_separators_in_order() {
    let root = one_or_more_separated_by(num(), kw(","));
    let tree = parse("1,2,3", &root);
    assert_eq!(child_texts(&tree), ["1", ",", "2", ",", "3"]);
}

#[test]
fn separated_list_of_one() {
    let root = one_or_more_separated_by(num(), kw(","));
    let tree = parse("9", &root);
    assert_eq!(child_texts(&tree), ["9"]);
}

#[test]
fn zero_or_more_separated_accepts_empty() {
    let root = zero_or_more_separated_by(num(), kw(","));
    let tree = parse("", &root);
    assert!(tree.root().as_element().unwrap().is_empty());
    let tree = parse("1,2", &root);
    assert_eq!(child_texts(&tree), ["1", ",", "2"]);
}

#[test]
fn sequences_round_trip() {
    let root = one_or_more([num()]);
    for src in ["1 2 3", " 1  2 ", "1"] {
        let tree = parse(src, &root);
        assert_eq!(tree.text(), src, "round trip of {src:?}");
    }
}

#[test]
fn nested_sequences_flatten_independently() {
    // A line is one-or-more numbers; the file is one-or-more lines
    // separated by semicolons. Each level flattens its own matches.
    let line = one_or_more([num()]);
    let file = one_or_more_separated_by(line, kw(";"));
    let tree = parse("1 2; 3 4", &file);
    let root = tree.root().as_element().unwrap();
    assert_eq!(root.len(), 3);
    assert_eq!(root.children()[0].as_element().unwrap().len(), 2);
    assert_eq!(root.children()[1].as_token().unwrap().text(), ";");
    assert_eq!(root.children()[2].as_element().unwrap().len(), 2);
}

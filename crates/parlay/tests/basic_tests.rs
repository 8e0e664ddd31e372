//! End-to-end tests for the basic parsing behaviors: single terminals,
//! simple sequences, and whitespace/comment skipping.

use parlay::grammar::dsl::{kw, nt_rule, re};
use parlay::grammar::{Symbol, Terminal};
use parlay::source::{FilePos, FileRange};
use parlay::tree::{Node, Token};
use parlay::ParseTree;

fn num() -> Symbol {
    re("NUM", "[0-9]+")
}

fn ignore_set() -> Vec<Terminal> {
    [
        re("WS", r"\s+"),
        re("SL_COMMENT", r"//[^\n]*"),
        re("ML_COMMENT", r"/\*(?s:.*?)\*/"),
    ]
    .into_iter()
    .map(|symbol| match symbol {
        Symbol::Terminal(terminal) => terminal,
        _ => unreachable!(),
    })
    .collect()
}

fn parse(input: &str, root: &Symbol) -> ParseTree {
    root.parse_str_ignoring(input, ignore_set())
        .unwrap_or_else(|err| panic!("parse of {input:?} failed: {err}"))
}

/// Expected token at a byte offset of a single-line source.
fn tok(src: &str, id: &str, start: usize, text: &str) -> Token {
    assert_eq!(&src[start..start + text.len()], text, "test fixture is off");
    let range = FileRange::new(
        FilePos::new(start, 1, u32::try_from(start).unwrap() + 1),
        FilePos::new(
            start + text.len(),
            1,
            u32::try_from(start + text.len()).unwrap() + 1,
        ),
    );
    Token::new(id.into(), range, text)
}

fn child_tokens(tree: &ParseTree) -> Vec<Token> {
    let element = tree.root().as_element().expect("root should be an element");
    element
        .children()
        .iter()
        .map(|child| child.as_token().expect("child should be a token").clone())
        .collect()
}

#[test]
fn parse_single_number() {
    let tree = parse("5", &num());
    let token = tree.root().as_token().expect("root should be a token");
    assert_eq!(token.text(), "5");
    assert_eq!(token.symbol().as_str(), "NUM");
    assert_eq!(token.range().start.offset, 0);
    assert_eq!(token.range().end.offset, 1);
}

#[test]
fn parse_addition() {
    let src = "12+34";
    let sum = nt_rule("Sum", [num(), kw("+"), num()]);
    let tree = parse(src, &sum);
    let expected = [
        tok(src, "NUM", 0, "12"),
        tok(src, "+", 2, "+"),
        tok(src, "NUM", 3, "34"),
    ];
    assert_eq!(child_tokens(&tree), expected);
}

#[test]
fn parse_addition_with_whitespace() {
    let src = " 12 + 34 ";
    let sum = nt_rule("Sum", [num(), kw("+"), num()]);
    let tree = parse(src, &sum);
    let expected = [
        tok(src, "NUM", 1, "12"),
        tok(src, "+", 4, "+"),
        tok(src, "NUM", 6, "34"),
    ];
    assert_eq!(child_tokens(&tree), expected);
}

#[test]
fn parse_addition_with_inline_comments() {
    let src = "/*pre*/12/*mid*/+/*mid2*/34/*after*/";
    let sum = nt_rule("Sum", [num(), kw("+"), num()]);
    let tree = parse(src, &sum);
    let expected = [
        tok(src, "NUM", 7, "12"),
        tok(src, "+", 16, "+"),
        tok(src, "NUM", 25, "34"),
    ];
    assert_eq!(child_tokens(&tree), expected);
}

#[test]
fn parse_addition_with_single_line_comments() {
    let src = "//pre\n 12 //mid\n + //mid2\n 34 // after";
    let sum = nt_rule("Sum", [num(), kw("+"), num()]);
    let tree = parse(src, &sum);
    let tokens = child_tokens(&tree);
    let texts: Vec<&str> = tokens.iter().map(Token::text).collect();
    assert_eq!(texts, ["12", "+", "34"]);
    // Offsets cross lines here, so check them directly.
    assert_eq!(tokens[0].range().start.offset, 7);
    assert_eq!(tokens[1].range().start.offset, 17);
    assert_eq!(tokens[2].range().start.offset, 27);
}

#[test]
fn comment_text_is_preserved_as_ignored_prefix() {
    let src = "/*pre*/12/*mid*/+/*mid2*/34/*after*/";
    let sum = nt_rule("Sum", [num(), kw("+"), num()]);
    let tree = parse(src, &sum);
    let tokens = child_tokens(&tree);
    assert_eq!(tokens[0].ignored_prefix(), "/*pre*/");
    assert_eq!(tokens[1].ignored_prefix(), "/*mid*/");
    assert_eq!(tokens[2].ignored_prefix(), "/*mid2*/");
    assert_eq!(tree.end_token().ignored_prefix(), "/*after*/");
}

#[test]
fn round_trip_reconstructs_input_exactly() {
    let sum = nt_rule("Sum", [num(), kw("+"), num()]);
    for src in [
        "12+34",
        " 12 + 34 ",
        "\t\r\n12\r\t +\n34\n\n",
        "/*pre*/12/*mid*/+/*mid2*/34/*after*/",
        "//before\n12//mid\n+\n//mid\n  34 // after",
    ] {
        let tree = parse(src, &sum);
        assert_eq!(tree.text(), src, "round trip of {src:?}");
    }
}

#[test]
fn parsing_twice_yields_identical_trees() {
    let src = " 12 + 34 ";
    let sum = nt_rule("Sum", [num(), kw("+"), num()]);
    let first = parse(src, &sum);
    let second = parse(src, &sum);
    assert_eq!(first, second);
}

#[test]
fn syntax_error_reports_failure_position() {
    let sum = nt_rule("Sum", [num(), kw("+"), num()]);
    let err = sum
        .parse_str_ignoring("12+", ignore_set())
        .expect_err("incomplete input should fail");
    match err {
        parlay::Error::Parse(parlay::ParseError::Syntax { range }) => {
            assert_eq!(range.start.offset, 3);
        }
        other => panic!("expected a syntax error, got {other}"),
    }
}

#[test]
fn garbage_input_is_a_syntax_error_not_a_panic() {
    let sum = nt_rule("Sum", [num(), kw("+"), num()]);
    let err = sum
        .parse_str_ignoring("12+x", ignore_set())
        .expect_err("garbage should fail");
    assert!(matches!(
        err,
        parlay::Error::Parse(parlay::ParseError::Syntax { .. })
    ));
}

#[test]
fn keyword_terminal_can_be_root() {
    let plus = kw("+");
    let tree = plus.parse_str("+").unwrap();
    assert_eq!(tree.root().as_token().unwrap().text(), "+");
}

#[test]
fn tree_nodes_carry_ranges() {
    let src = " 12 + 34 ";
    let sum = nt_rule("Sum", [num(), kw("+"), num()]);
    let tree = parse(src, &sum);
    let root = tree.root();
    assert_eq!(root.range().start.offset, 1);
    assert_eq!(root.range().end.offset, 8);
    match root {
        Node::Element(element) => assert_eq!(element.symbol().as_str(), "Sum"),
        Node::Token(_) => panic!("root should be an element"),
    }
}

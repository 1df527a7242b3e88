
use bumpalo::Bump;

use crate::grammar::Grammar;

use super::Matcher;

fn build<'a>(alloc: &'a Bump, rules: &[&str]) -> Grammar<'a> {
    let _ = pretty_env_logger::try_init();

    let mut grammar = Grammar::new(alloc);
    for rule in rules {
        grammar.add_rule(rule);
    }
    grammar
}

#[test]
fn terminals_match_exactly() {
    let alloc = Bump::new();
    let grammar = build(&alloc, &["<A> ::= 'HELLO'"]);
    let matcher = Matcher::new(&grammar);

    let (tree, consumed) = matcher.parse("<A>", b"HELLO").unwrap();
    assert_eq!(5, consumed);
    assert_eq!("HELLO", tree.symbol);
    assert_eq!(b"HELLO", tree.matched.as_slice());

    assert!(matcher.parse("<A>", b"HALLO").is_none());
}

#[test]
fn terminal_mismatch_reports_the_literal() {
    let alloc = Bump::new();
    let grammar = build(&alloc, &["<A> ::= 'HELLO'"]);
    let matcher = Matcher::new(&grammar);

    let ctx = matcher.parse_ctx("<A>", b"HALLO");
    assert!(!ctx.success);
    assert_eq!(0, ctx.error_pos);
    assert_eq!("terminal 'HELLO'", ctx.expected);
}

#[test]
fn extra_input_is_left_unconsumed() {
    let alloc = Bump::new();
    let grammar = build(&alloc, &["<A> ::= 'HI'"]);
    let matcher = Matcher::new(&grammar);

    let (tree, consumed) = matcher.parse("<A>", b"HI!").unwrap();
    assert_eq!(2, consumed);
    assert_eq!(b"HI", tree.matched.as_slice());
}

#[test]
fn sequences_match_left_to_right() {
    let alloc = Bump::new();
    let grammar = build(&alloc, &["<seq> ::= 'A' 'B' 'C'"]);
    let matcher = Matcher::new(&grammar);

    let (tree, consumed) = matcher.parse("<seq>", b"ABC").unwrap();
    assert_eq!(3, consumed);
    assert_eq!("seq", tree.symbol);
    assert_eq!(3, tree.children.len());
    assert_eq!(b"ABC", tree.matched.as_slice());
}

#[test]
fn sequence_failure_points_at_the_deepest_leaf() {
    let alloc = Bump::new();
    let grammar = build(&alloc, &["<greeting> ::= 'hello' ' ' 'world'"]);
    let matcher = Matcher::new(&grammar);

    let ctx = matcher.parse_ctx("<greeting>", b"hello universe");
    assert!(!ctx.success);
    assert_eq!(6, ctx.error_pos);
    assert_eq!("terminal 'world'", ctx.expected);
    assert_eq!(ctx.error_pos, ctx.consumed);
}

#[test]
fn alternatives_pick_the_longest_match() {
    let alloc = Bump::new();
    let grammar = build(&alloc, &["<s> ::= 'A' | 'AB' | 'ABC'"]);
    let matcher = Matcher::new(&grammar);

    let (tree, consumed) = matcher.parse("<s>", b"ABC").unwrap();
    assert_eq!(3, consumed);
    assert_eq!("alt", tree.symbol);
    assert_eq!(1, tree.children.len());
    assert_eq!(b"ABC", tree.children[0].matched.as_slice());
}

#[test]
fn alternative_ties_keep_the_earlier_branch() {
    let alloc = Bump::new();
    let grammar = build(&alloc, &["<s> ::= 'ab' | 'a' 'b'"]);
    let matcher = Matcher::new(&grammar);

    let (tree, consumed) = matcher.parse("<s>", b"ab").unwrap();
    assert_eq!(2, consumed);
    assert_eq!("ab", tree.children[0].symbol);
}

#[test]
fn failed_alternatives_leave_the_position_alone() {
    let alloc = Bump::new();
    let grammar = build(&alloc, &["<s> ::= 'A' | 'B'"]);
    let matcher = Matcher::new(&grammar);

    let ctx = matcher.parse_ctx("<s>", b"C");
    assert!(!ctx.success);
    assert_eq!(0, ctx.error_pos);
    assert_eq!(0, ctx.consumed);
}

#[test]
fn optionals_take_what_they_can() {
    let alloc = Bump::new();
    let grammar = build(&alloc, &["<opt> ::= 'A' [ 'B' ] 'C'"]);
    let matcher = Matcher::new(&grammar);

    let (_, consumed) = matcher.parse("<opt>", b"ABC").unwrap();
    assert_eq!(3, consumed);

    let (tree, consumed) = matcher.parse("<opt>", b"AC").unwrap();
    assert_eq!(2, consumed);
    let opt = &tree.children[1];
    assert_eq!("opt", opt.symbol);
    assert!(opt.matched.is_empty());
    assert!(opt.children.is_empty());

    assert!(matcher.parse("<opt>", b"AXC").is_none());
}

#[test]
fn repeats_are_greedy() {
    let alloc = Bump::new();
    let grammar = build(&alloc, &["<rep> ::= 'A' { 'B' }"]);
    let matcher = Matcher::new(&grammar);

    let (tree, consumed) = matcher.parse("<rep>", b"ABBB").unwrap();
    assert_eq!(4, consumed);
    let rep = &tree.children[1];
    assert_eq!("rep", rep.symbol);
    assert_eq!(3, rep.children.len());

    // Zero iterations is still a match.
    let (_, consumed) = matcher.parse("<rep>", b"A").unwrap();
    assert_eq!(1, consumed);
}

#[test]
fn repeats_of_nullable_children_terminate() {
    let alloc = Bump::new();
    let grammar = build(&alloc, &["<r> ::= { [ 'a' ] }"]);
    let matcher = Matcher::new(&grammar);

    let (tree, consumed) = matcher.parse("<r>", b"bbb").unwrap();
    assert_eq!(0, consumed);
    assert!(tree.matched.is_empty());

    let (_, consumed) = matcher.parse("<r>", b"aab").unwrap();
    assert_eq!(2, consumed);
}

#[test]
fn signed_numbers() {
    let alloc = Bump::new();
    let grammar = build(&alloc, &["<m> ::= [ '+' | '-' ] '0' ... '9' { '0' ... '9' }"]);
    let matcher = Matcher::new(&grammar);

    let (tree, consumed) = matcher.parse("<m>", b"-7").unwrap();
    assert_eq!(2, consumed);
    assert_eq!(b"-7", tree.matched.as_slice());

    let (_, consumed) = matcher.parse("<m>", b"42").unwrap();
    assert_eq!(2, consumed);

    let ctx = matcher.parse_ctx("<m>", b"+");
    assert!(!ctx.success);
    assert_eq!(1, ctx.error_pos);
    assert_eq!("character in range '0'...'9'", ctx.expected);
}

#[test]
fn numbers_through_symbols() {
    let alloc = Bump::new();
    let grammar = build(&alloc, &["<d> ::= '0' ... '9'", "<n> ::= <d> { <d> }"]);
    let matcher = Matcher::new(&grammar);

    let (tree, consumed) = matcher.parse("<n>", b"42").unwrap();
    assert_eq!(2, consumed);
    assert_eq!(b"42", tree.matched.as_slice());

    let ctx = matcher.parse_ctx("<n>", b"abc");
    assert!(!ctx.success);
    assert_eq!(0, ctx.error_pos);
    assert!(ctx.expected.contains("character in range '0'...'9'"));
}

#[test]
fn symbol_nodes_wrap_their_rule_body() {
    let alloc = Bump::new();
    let grammar = build(&alloc, &["<digit> ::= '0' | '1'", "<bin> ::= <digit> <digit>"]);
    let matcher = Matcher::new(&grammar);

    let (tree, consumed) = matcher.parse("<bin>", b"10").unwrap();
    assert_eq!(2, consumed);
    assert_eq!("seq", tree.symbol);
    assert_eq!("<digit>", tree.children[0].symbol);
    assert_eq!(b"1", tree.children[0].matched.as_slice());
    assert_eq!(1, tree.children[0].children.len());
}

#[test]
fn char_classes_match_one_byte() {
    let alloc = Bump::new();
    let grammar = build(&alloc, &["<c> ::= ( 'a' ... 'z' '_' )"]);
    let matcher = Matcher::new(&grammar);

    let (tree, consumed) = matcher.parse("<c>", b"_x").unwrap();
    assert_eq!(1, consumed);
    assert_eq!("char-class", tree.symbol);
    assert_eq!(b"_", tree.matched.as_slice());

    let ctx = matcher.parse_ctx("<c>", b"A");
    assert!(!ctx.success);
    assert_eq!("character class", ctx.expected);
}

#[test]
fn excluded_classes_match_the_complement() {
    let alloc = Bump::new();
    let grammar = build(&alloc, &["<c> ::= (^ 'a' ... 'z' )"]);
    let matcher = Matcher::new(&grammar);

    assert!(matcher.parse("<c>", b"A").is_some());
    assert!(matcher.parse("<c>", b"q").is_none());
}

#[test]
fn hex_ranges_match_like_quoted_ones() {
    let alloc = Bump::new();
    let grammar = build(&alloc, &["<upper> ::= 0x41 ... 0x5A"]);
    let matcher = Matcher::new(&grammar);

    let (tree, consumed) = matcher.parse("<upper>", b"Z").unwrap();
    assert_eq!(1, consumed);
    assert_eq!("char-range", tree.symbol);

    let ctx = matcher.parse_ctx("<upper>", b"a");
    assert_eq!("character in range 'A'...'Z'", ctx.expected);
}

#[test]
fn ranges_fail_at_end_of_input() {
    let alloc = Bump::new();
    let grammar = build(&alloc, &["<d> ::= '0' ... '9'"]);
    let matcher = Matcher::new(&grammar);

    let ctx = matcher.parse_ctx("<d>", b"");
    assert!(!ctx.success);
    assert_eq!(0, ctx.error_pos);
    assert_eq!("character in range '0'...'9'", ctx.expected);
}

#[test]
fn unknown_start_rules_are_reported() {
    let alloc = Bump::new();
    let grammar = build(&alloc, &["<a> ::= 'x'"]);
    let matcher = Matcher::new(&grammar);

    let ctx = matcher.parse_ctx("<nope>", b"x");
    assert!(!ctx.success);
    assert_eq!(0, ctx.error_pos);
    assert_eq!("symbol <nope> (undefined)", ctx.expected);
}

#[test]
fn undefined_symbols_are_hard_failures() {
    let alloc = Bump::new();
    let grammar = build(&alloc, &["<s> ::= 'a' <ghost>"]);
    let matcher = Matcher::new(&grammar);

    let ctx = matcher.parse_ctx("<s>", b"abc");
    assert!(!ctx.success);
    assert_eq!(1, ctx.error_pos);
    assert_eq!("symbol <ghost> (undefined)", ctx.expected);
}

#[test]
fn null_rules_fail_with_a_diagnostic() {
    let alloc = Bump::new();
    let grammar = build(&alloc, &["<e> ::="]);
    let matcher = Matcher::new(&grammar);

    let ctx = matcher.parse_ctx("<e>", b"anything");
    assert!(!ctx.success);
    assert_eq!("null expression", ctx.expected);
}

#[test]
fn nullable_alternatives_match_at_end_of_input() {
    let alloc = Bump::new();
    let grammar = build(&alloc, &["<s> ::= [ 'a' ] | 'b'"]);
    let matcher = Matcher::new(&grammar);

    let (_, consumed) = matcher.parse("<s>", b"b").unwrap();
    assert_eq!(1, consumed);

    // Every non-nullable branch is skipped at end of input; the nullable one
    // still produces an empty match.
    let (tree, consumed) = matcher.parse("<s>", b"").unwrap();
    assert_eq!(0, consumed);
    assert!(tree.matched.is_empty());
}

#[test]
fn pruning_does_not_change_outcomes() {
    let alloc = Bump::new();
    let grammar = build(&alloc, &["<s> ::= ( 'a' ... 'c' ) 'x' | 'z' 'y'"]);
    let matcher = Matcher::new(&grammar);

    let (_, consumed) = matcher.parse("<s>", b"ax").unwrap();
    assert_eq!(2, consumed);
    let (_, consumed) = matcher.parse("<s>", b"zy").unwrap();
    assert_eq!(2, consumed);
}

#[test]
fn fully_pruned_alternatives_still_describe_a_starter() {
    let alloc = Bump::new();
    let grammar = build(&alloc, &["<r> ::= 'GET' ' ' '/' | 'POST' ' ' '/' | 'PING'"]);
    let matcher = Matcher::new(&grammar);

    let ctx = matcher.parse_ctx("<r>", b"TRACE");
    assert!(!ctx.success);
    assert_eq!(0, ctx.error_pos);
    assert_eq!("terminal 'GET'", ctx.expected);
}

#[test]
fn legacy_and_unified_shapes_agree() {
    let alloc = Bump::new();
    let grammar = build(&alloc, &["<d> ::= '0' ... '9'", "<n> ::= <d> { <d> }"]);
    let matcher = Matcher::new(&grammar);

    for input in [&b"123"[..], &b"9"[..], &b""[..], &b"x12"[..]] {
        let legacy = matcher.parse("<n>", input);
        let ctx = matcher.parse_ctx("<n>", input);

        assert_eq!(legacy.is_some(), ctx.success);
        if let Some((tree, consumed)) = legacy {
            assert_eq!(consumed, ctx.consumed);
            assert_eq!(Some(tree), ctx.tree);
        }
    }
}

//! Execution of an expression graph against input bytes.
//!
//! The matcher is a plain recursive descent over the graph: one function per
//! expression kind, all funnelled through [`Matcher::match_expr`]. Match
//! failure is ordinary control flow (a `None` plus a note in the
//! furthest-failure tracker), never a panic or an early abort. Alternatives
//! are selected longest-match-wins, with FIRST-set pruning to skip branches
//! that cannot start at the current lookahead byte.

mod context;
mod first;
mod tree;

#[cfg(test)]
mod tests;

pub use context::ParseContext;
pub use tree::ParseTree;

use lasso::Spur;
use log::{debug, trace};

use crate::charset::ByteSet;
use crate::exprs::Expr;
use crate::grammar::Grammar;

use self::context::Failure;
use self::first::FirstSets;

pub struct Matcher<'g, 'a> {
    grammar: &'g Grammar<'a>,
    first: FirstSets,
}

impl<'g, 'a> Matcher<'g, 'a> {
    /// Builds the FIRST memo for every rule up front, so matching itself
    /// never mutates anything shared.
    pub fn new(grammar: &'g Grammar<'a>) -> Self {
        Self { grammar, first: FirstSets::build(grammar) }
    }

    /// Match `input` against the named rule. Returns the parse tree and the
    /// number of bytes consumed, or `None` if the rule is unknown or the
    /// input does not match.
    pub fn parse(&self, rule: &str, input: &[u8]) -> Option<(ParseTree, usize)> {
        let mut failure = Failure::default();
        let mut pos = 0;
        let tree = self.match_start(rule, input, &mut pos, &mut failure)?;
        Some((tree, pos))
    }

    /// Like [`Matcher::parse`], but always reports: success flag, tree,
    /// consumption, and the furthest-failure diagnostics.
    pub fn parse_ctx(&self, rule: &str, input: &[u8]) -> ParseContext {
        let mut failure = Failure::default();
        let mut pos = 0;
        match self.match_start(rule, input, &mut pos, &mut failure) {
            Some(tree) => failure.into_success(tree, pos),
            None => failure.into_failure(),
        }
    }

    fn match_start(
        &self,
        rule: &str,
        input: &[u8],
        pos: &mut usize,
        failure: &mut Failure,
    ) -> Option<ParseTree> {
        debug!("parsing rule {rule} against {} bytes of input", input.len());

        let Some(found) = self.grammar.rule(rule) else {
            failure.record(0, || format!("symbol {rule} (undefined)"));
            return None;
        };
        self.match_root(found.root, input, pos, failure)
    }

    /// Rules and symbol references share this entry: a rule whose body never
    /// produced an expression fails as a "null expression".
    fn match_root(
        &self,
        root: Option<&'a Expr<'a>>,
        input: &[u8],
        pos: &mut usize,
        failure: &mut Failure,
    ) -> Option<ParseTree> {
        match root {
            Some(expr) => self.match_expr(expr, input, pos, failure),
            None => {
                failure.record(*pos, || "null expression".to_string());
                None
            }
        }
    }

    fn match_expr(
        &self,
        expr: &Expr<'a>,
        input: &[u8],
        pos: &mut usize,
        failure: &mut Failure,
    ) -> Option<ParseTree> {
        match expr {
            Expr::Terminal(literal) => self.match_terminal(literal, input, pos, failure),
            Expr::Symbol(name) => self.match_symbol(*name, input, pos, failure),
            Expr::Sequence(children) => self.match_sequence(children, input, pos, failure),
            Expr::Alternative(children) => self.match_alternative(children, input, pos, failure),
            Expr::Optional(child) => self.match_optional(child, input, pos, failure),
            Expr::Repeat(child) => self.match_repeat(child, input, pos, failure),
            Expr::CharRange(start, end) => {
                self.match_char_range(*start, *end, input, pos, failure)
            }
            Expr::CharClass(set) => self.match_char_class(set, input, pos, failure),
        }
    }

    fn match_terminal(
        &self,
        literal: &str,
        input: &[u8],
        pos: &mut usize,
        failure: &mut Failure,
    ) -> Option<ParseTree> {
        if literal.is_empty() {
            failure.record(*pos, || "empty terminal".to_string());
            return None;
        }

        let bytes = literal.as_bytes();
        if input[*pos..].starts_with(bytes) {
            trace!("terminal '{literal}' matched at {pos}");
            *pos += bytes.len();
            Some(ParseTree::new(literal, bytes))
        } else {
            failure.record(*pos, || format!("terminal '{literal}'"));
            None
        }
    }

    fn match_symbol(
        &self,
        name: Spur,
        input: &[u8],
        pos: &mut usize,
        failure: &mut Failure,
    ) -> Option<ParseTree> {
        let Some(rule) = self.grammar.rule_by_name(name) else {
            let text = self.grammar.resolve(name);
            failure.record(*pos, || format!("symbol {text} (undefined)"));
            return None;
        };

        trace!("entering {} at {pos}", self.grammar.resolve(name));

        let saved = *pos;
        let Some(child) = self.match_root(rule.root, input, pos, failure) else {
            *pos = saved;
            return None;
        };

        let mut node = ParseTree::new(self.grammar.resolve(name), child.matched.clone());
        node.children.push(child);
        Some(node)
    }

    fn match_sequence(
        &self,
        children: &[&Expr<'a>],
        input: &[u8],
        pos: &mut usize,
        failure: &mut Failure,
    ) -> Option<ParseTree> {
        let saved = *pos;

        let mut nodes = Vec::with_capacity(children.len());
        for &child in children {
            let Some(node) = self.match_expr(child, input, pos, failure) else {
                *pos = saved;
                return None;
            };
            nodes.push(node);
        }

        Some(ParseTree::with_children("seq", input[saved..*pos].to_vec(), nodes))
    }

    /// Longest match wins: every branch whose FIRST set allows the lookahead
    /// is attempted from the same start, and the one consuming the most
    /// bytes is kept. Ties keep the earliest branch, as does the first
    /// success of any length.
    fn match_alternative(
        &self,
        branches: &[&Expr<'a>],
        input: &[u8],
        pos: &mut usize,
        failure: &mut Failure,
    ) -> Option<ParseTree> {
        let saved = *pos;
        let lookahead = input.get(saved).copied();

        let mut best: Option<(ParseTree, usize)> = None;
        for &branch in branches {
            let info = self.first.get(branch);
            let viable = match lookahead {
                Some(byte) => info.nullable || info.chars.contains(byte),
                None => info.nullable,
            };
            if !viable {
                // Pruned branches still count as failures for diagnostics,
                // described by whatever their leftmost leaf would have wanted.
                trace!("pruned an alternative at {saved}: lookahead outside FIRST");
                failure.record(saved, || self.expected_start(branch, &mut Vec::new()));
                continue;
            }

            *pos = saved;
            let Some(node) = self.match_expr(branch, input, pos, failure) else {
                continue;
            };

            match &best {
                Some((_, best_end)) if *pos <= *best_end => {}
                _ => best = Some((node, *pos)),
            }
        }

        match best {
            Some((node, end)) => {
                *pos = end;
                Some(ParseTree::with_children("alt", input[saved..end].to_vec(), vec![node]))
            }
            None => {
                *pos = saved;
                None
            }
        }
    }

    /// Optionals always succeed; a failed child just means an empty match.
    fn match_optional(
        &self,
        child: &Expr<'a>,
        input: &[u8],
        pos: &mut usize,
        failure: &mut Failure,
    ) -> Option<ParseTree> {
        let saved = *pos;
        match self.match_expr(child, input, pos, failure) {
            Some(node) => {
                let matched = input[saved..*pos].to_vec();
                Some(ParseTree::with_children("opt", matched, vec![node]))
            }
            None => {
                *pos = saved;
                Some(ParseTree::new("opt", Vec::new()))
            }
        }
    }

    /// Greedy zero-or-more. An empty child match ends the loop, so nullable
    /// children cannot spin forever; zero iterations is still a success.
    fn match_repeat(
        &self,
        child: &Expr<'a>,
        input: &[u8],
        pos: &mut usize,
        failure: &mut Failure,
    ) -> Option<ParseTree> {
        let start = *pos;

        let mut nodes = Vec::new();
        loop {
            let saved = *pos;
            let Some(node) = self.match_expr(child, input, pos, failure) else {
                *pos = saved;
                break;
            };
            if node.matched.is_empty() {
                *pos = saved;
                break;
            }

            nodes.push(node);
            if *pos >= input.len() {
                break;
            }
        }

        Some(ParseTree::with_children("rep", input[start..*pos].to_vec(), nodes))
    }

    /// The description of the leftmost leaf of `expr`: what a branch skipped
    /// by FIRST pruning would have asked for first. `seen` breaks symbol
    /// cycles.
    fn expected_start(&self, expr: &Expr<'a>, seen: &mut Vec<Spur>) -> String {
        match expr {
            Expr::Terminal(literal) if literal.is_empty() => "empty terminal".to_string(),
            Expr::Terminal(literal) => format!("terminal '{literal}'"),
            Expr::Symbol(name) => {
                let text = self.grammar.resolve(*name);
                if seen.contains(name) {
                    return format!("symbol {text}");
                }
                seen.push(*name);
                match self.grammar.rule_by_name(*name).and_then(|rule| rule.root) {
                    Some(root) => self.expected_start(root, seen),
                    None if self.grammar.rule_by_name(*name).is_none() => {
                        format!("symbol {text} (undefined)")
                    }
                    None => "null expression".to_string(),
                }
            }
            Expr::Sequence(children) | Expr::Alternative(children) => {
                self.expected_start(children[0], seen)
            }
            Expr::Optional(child) | Expr::Repeat(child) => self.expected_start(child, seen),
            Expr::CharRange(start, end) => {
                format!("character in range '{}'...'{}'", *start as char, *end as char)
            }
            Expr::CharClass(_) => "character class".to_string(),
        }
    }

    fn match_char_range(
        &self,
        start: u8,
        end: u8,
        input: &[u8],
        pos: &mut usize,
        failure: &mut Failure,
    ) -> Option<ParseTree> {
        match input.get(*pos) {
            Some(&byte) if start <= byte && byte <= end => {
                *pos += 1;
                Some(ParseTree::new("char-range", vec![byte]))
            }
            _ => {
                failure.record(*pos, || {
                    format!("character in range '{}'...'{}'", start as char, end as char)
                });
                None
            }
        }
    }

    fn match_char_class(
        &self,
        set: &ByteSet,
        input: &[u8],
        pos: &mut usize,
        failure: &mut Failure,
    ) -> Option<ParseTree> {
        match input.get(*pos) {
            Some(&byte) if set.contains(byte) => {
                *pos += 1;
                Some(ParseTree::new("char-class", vec![byte]))
            }
            _ => {
                failure.record(*pos, || "character class".to_string());
                None
            }
        }
    }
}

//! FIRST-set analysis: for every expression, the set of input bytes at which
//! it can begin a successful match, and whether it can match the empty
//! prefix. The matcher uses this to skip alternatives that cannot possibly
//! start at the current lookahead byte.

use std::collections::HashMap;

use crate::charset::ByteSet;
use crate::exprs::{Expr, ExprId};
use crate::grammar::Grammar;

#[derive(Clone, Copy, Debug, Default)]
pub struct FirstInfo {
    pub chars: ByteSet,
    pub nullable: bool,
}

/// FIRST information memoised per expression identity.
///
/// Built once, against every rule root, when a matcher is constructed; the
/// matcher itself only reads. Interned subtrees share their entry.
pub(crate) struct FirstSets {
    memo: HashMap<ExprId, FirstInfo>,
}

impl FirstSets {
    pub fn build(grammar: &Grammar) -> Self {
        let mut this = Self { memo: HashMap::new() };
        for rule in grammar.rules() {
            if let Some(root) = rule.root {
                this.compute(grammar, root);
            }
        }
        this
    }

    pub fn get(&self, expr: &Expr) -> FirstInfo {
        self.memo.get(&ExprId::of(expr)).copied().unwrap_or_default()
    }

    fn compute(&mut self, grammar: &Grammar, expr: &Expr) -> FirstInfo {
        let id = ExprId::of(expr);
        if let Some(&known) = self.memo.get(&id) {
            return known;
        }

        // Seed the entry so cycles through symbols read the empty,
        // not-nullable default instead of recursing forever. The fixed point
        // is whatever the first completed traversal settles on.
        self.memo.insert(id, FirstInfo::default());

        let info = match expr {
            Expr::Terminal(literal) => match literal.as_bytes().first() {
                Some(&first) => {
                    let mut chars = ByteSet::empty();
                    chars.insert(first);
                    FirstInfo { chars, nullable: false }
                }
                None => FirstInfo { chars: ByteSet::empty(), nullable: true },
            },

            Expr::Symbol(name) => match grammar.rule_by_name(*name).and_then(|rule| rule.root) {
                Some(root) => self.compute(grammar, root),
                None => FirstInfo::default(),
            },

            Expr::Sequence(children) => {
                let mut info = FirstInfo { chars: ByteSet::empty(), nullable: true };
                for child in *children {
                    let child_info = self.compute(grammar, child);
                    info.chars |= child_info.chars;
                    if !child_info.nullable {
                        info.nullable = false;
                        break;
                    }
                }
                info
            }

            Expr::Alternative(children) => {
                let mut info = FirstInfo { chars: ByteSet::empty(), nullable: false };
                for child in *children {
                    let child_info = self.compute(grammar, child);
                    info.chars |= child_info.chars;
                    info.nullable |= child_info.nullable;
                }
                info
            }

            Expr::Optional(child) | Expr::Repeat(child) => {
                FirstInfo { chars: self.compute(grammar, child).chars, nullable: true }
            }

            Expr::CharRange(start, end) => {
                let mut chars = ByteSet::empty();
                chars.insert_range(*start, *end);
                FirstInfo { chars, nullable: false }
            }

            Expr::CharClass(set) => FirstInfo { chars: *set, nullable: false },
        };

        self.memo.insert(id, info);
        info
    }
}

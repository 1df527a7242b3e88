//! Structural hash-consing of expression subtrees.
//!
//! The builder interns bottom-up, so by the time a composite node reaches the
//! table its children are already canonical. Structural equality is therefore
//! shallow: leaves compare by content, composites by child identity. Two rule
//! bodies with equal structure end up sharing one arena node, which also makes
//! the FIRST memo shared between them.

use std::collections::HashMap;

use lasso::Spur;

use crate::charset::ByteSet;
use crate::exprs::{Expr, ExprId};

#[derive(Debug, Default)]
pub struct Interner<'a> {
    table: HashMap<Shape<'a>, &'a Expr<'a>>,
}

impl<'a> Interner<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the canonical node equal to `expr`, installing `expr` itself
    /// if no equal subtree has been seen. A discarded candidate stays behind
    /// as dead arena bytes.
    pub fn intern(&mut self, expr: &'a Expr<'a>) -> &'a Expr<'a> {
        *self.table.entry(Shape::of(expr)).or_insert(expr)
    }

    /// Number of distinct subtrees seen so far.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Shallow structural view of a node: the hashing/equality key.
#[derive(Debug, Eq, Hash, PartialEq)]
enum Shape<'a> {
    Terminal(&'a str),
    Symbol(Spur),
    Sequence(Vec<ExprId>),
    Alternative(Vec<ExprId>),
    Optional(ExprId),
    Repeat(ExprId),
    CharRange(u8, u8),
    CharClass(ByteSet),
}

impl<'a> Shape<'a> {
    fn of(expr: &'a Expr<'a>) -> Self {
        let ids = |children: &[&Expr]| children.iter().map(|child| ExprId::of(child)).collect();

        match expr {
            Expr::Terminal(literal) => Self::Terminal(*literal),
            Expr::Symbol(name) => Self::Symbol(*name),
            Expr::Sequence(children) => Self::Sequence(ids(children)),
            Expr::Alternative(children) => Self::Alternative(ids(children)),
            Expr::Optional(child) => Self::Optional(ExprId::of(child)),
            Expr::Repeat(child) => Self::Repeat(ExprId::of(child)),
            Expr::CharRange(start, end) => Self::CharRange(*start, *end),
            Expr::CharClass(set) => Self::CharClass(*set),
        }
    }
}

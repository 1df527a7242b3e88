use std::borrow::Cow;

use smol_str::SmolStr;

/// One node of the tree produced by a successful match.
///
/// The shape mirrors the expression graph: composites appear under synthetic
/// labels (`seq`, `alt`, `opt`, `rep`, `char-range`, `char-class`), symbol
/// references under the non-terminal name, terminals under the literal
/// itself. The caller owns the tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseTree {
    pub symbol: SmolStr,

    /// The input bytes this subtree consumed.
    pub matched: Vec<u8>,

    pub children: Vec<ParseTree>,
}

impl ParseTree {
    pub(crate) fn new(symbol: impl Into<SmolStr>, matched: impl Into<Vec<u8>>) -> Self {
        Self { symbol: symbol.into(), matched: matched.into(), children: Vec::new() }
    }

    pub(crate) fn with_children(
        symbol: impl Into<SmolStr>,
        matched: Vec<u8>,
        children: Vec<ParseTree>,
    ) -> Self {
        Self { symbol: symbol.into(), matched, children }
    }

    /// The matched bytes as text, lossily where they are not UTF-8.
    pub fn matched_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.matched)
    }
}

use super::tree::ParseTree;

/// Everything a unified parse reports back.
///
/// `error_pos` is the furthest input index at which any leaf of the descent
/// failed, and `expected` describes what that deepest leaf wanted; both are
/// meaningful even on success, where they point at the failure the winning
/// derivation had to back away from (or zero if there was none).
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub success: bool,
    pub tree: Option<ParseTree>,

    /// Bytes consumed on success; the furthest failure position on failure.
    pub consumed: usize,

    pub error_pos: usize,
    pub expected: String,
}

/// Furthest-failure tracker threaded through every matcher call.
#[derive(Debug, Default)]
pub(crate) struct Failure {
    pos: usize,
    expected: String,
    recorded: bool,
}

impl Failure {
    /// Record a failing leaf. The maximum position wins; ties keep the first
    /// description recorded there. The description is built lazily so the
    /// common case (a failure soon eclipsed by a deeper one) stays cheap.
    pub fn record(&mut self, pos: usize, expected: impl FnOnce() -> String) {
        if !self.recorded || pos > self.pos {
            self.pos = pos;
            self.expected = expected();
            self.recorded = true;
        }
    }

    pub fn into_success(self, tree: ParseTree, consumed: usize) -> ParseContext {
        ParseContext {
            success: true,
            tree: Some(tree),
            consumed,
            error_pos: self.pos,
            expected: self.expected,
        }
    }

    pub fn into_failure(self) -> ParseContext {
        ParseContext {
            success: false,
            tree: None,
            consumed: self.pos,
            error_pos: self.pos,
            expected: self.expected,
        }
    }
}

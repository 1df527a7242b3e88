use log::warn;

use crate::errors::{Error, ErrorId, Errors, Severity};

use super::tokens::Token;

impl Errors {
    pub(crate) fn rule_error<'a>(&'a mut self, rule: &'a str) -> RuleErrors<'a> {
        RuleErrors { errors: self, rule }
    }
}

/// Constructors for the diagnostics the grammar builder can produce, all
/// attributed to the rule being built.
pub(crate) struct RuleErrors<'a> {
    errors: &'a mut Errors,
    rule: &'a str,
}

impl RuleErrors<'_> {
    pub fn no_separator(&mut self) -> ErrorId {
        self.add(Severity::Error, "rule has no `::=` separator".to_string())
    }

    pub fn unclosed_group(&mut self, close: char) -> ErrorId {
        self.add(Severity::Error, format!("missing `{close}`"))
    }

    pub fn empty_group(&mut self, close: char) -> ErrorId {
        self.add(Severity::Error, format!("nothing inside the group ending with `{close}`"))
    }

    pub fn empty_terminal(&mut self) -> ErrorId {
        self.add(Severity::Error, "terminal literal is empty".to_string())
    }

    pub fn bare_hex(&mut self, lexeme: &str) -> ErrorId {
        self.add(
            Severity::Error,
            format!("hex literal `{lexeme}` is only meaningful in a range or character class"),
        )
    }

    pub fn bad_range_end(&mut self, found: &Token) -> ErrorId {
        self.add(
            Severity::Error,
            format!("expected a terminal or hex literal after `...`, found {found:?}"),
        )
    }

    pub fn reversed_range(&mut self, start: u8, end: u8) -> ErrorId {
        self.add(
            Severity::Warning,
            format!(
                "range bounds {:?} ... {:?} are reversed; swapping them",
                start as char, end as char
            ),
        )
    }

    pub fn unterminated_class(&mut self) -> ErrorId {
        self.add(Severity::Error, "character class is missing its `)`".to_string())
    }

    pub fn unexpected_token(&mut self, found: &Token) -> ErrorId {
        self.add(Severity::Error, format!("unexpected {found:?}"))
    }

    fn add(&mut self, severity: Severity, title: String) -> ErrorId {
        warn!("in rule {}: {title}", self.rule);
        self.errors.add(Error::new(severity, title).in_rule(self.rule))
    }
}

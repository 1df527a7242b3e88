//! Grammars and the builder that lowers rule text into expression graphs.

mod messages;
mod rules;
pub mod tokens;


use bumpalo::Bump;
use lasso::{Rodeo, Spur};
use log::debug;

use crate::errors::Errors;
use crate::exprs::Rule;
use crate::intern::Interner;

use self::rules::RuleParser;

/// An ordered collection of named rules over a shared arena.
///
/// Rule and symbol names are interned in a private rodeo; expressions live in
/// the arena passed at construction, which must outlive the grammar.
pub struct Grammar<'a> {
    alloc: &'a Bump,
    names: Rodeo,
    rules: Vec<Rule<'a>>,
    interner: Option<Interner<'a>>,
    errors: Errors,
}

impl<'a> Grammar<'a> {
    pub fn new(alloc: &'a Bump) -> Self {
        Self {
            alloc,
            names: Rodeo::default(),
            rules: Vec::new(),
            interner: None,
            errors: Errors::new(),
        }
    }

    /// Like [`Grammar::new`], but structurally equal subtrees are
    /// deduplicated so equal rule bodies share one root node. Matching
    /// behavior is identical either way.
    pub fn with_interning(alloc: &'a Bump) -> Self {
        Self { interner: Some(Interner::new()), ..Self::new(alloc) }
    }

    /// Add one rule of the form `NAME ::= BODY`.
    ///
    /// Never fails: problems are recorded in [`Grammar::errors`] and the rule
    /// is dropped (no `::=`) or kept partially built. Duplicate names are
    /// appended; lookup returns the first definition, so redefinitions are
    /// shadowed rather than replacing anything.
    pub fn add_rule(&mut self, text: &str) {
        let Some(split) = text.find("::=") else {
            self.errors.rule_error(text.trim()).no_separator();
            return;
        };

        let (lhs, rest) = text.split_at(split);
        let name = lhs.trim();
        let body = &rest[3..];

        debug!("adding rule {name}");

        let root = RuleParser::new(
            self.alloc,
            &mut self.names,
            self.interner.as_mut(),
            &mut self.errors,
            name,
            body,
        )
        .parse();

        let name = self.names.get_or_intern(name);
        self.rules.push(Rule { name, root });
    }

    /// The first rule with the given name, if any.
    pub fn rule(&self, name: &str) -> Option<&Rule<'a>> {
        let name = self.names.get(name)?;
        self.rule_by_name(name)
    }

    pub(crate) fn rule_by_name(&self, name: Spur) -> Option<&Rule<'a>> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    /// Every rule, in insertion order.
    pub fn rules(&self) -> &[Rule<'a>] {
        &self.rules
    }

    pub fn resolve(&self, name: Spur) -> &str {
        self.names.resolve(&name)
    }

    /// Diagnostics recorded while building, in reporting order.
    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    pub fn interner(&self) -> Option<&Interner<'a>> {
        self.interner.as_ref()
    }
}

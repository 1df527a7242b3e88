//! Storage for diagnostics reported while building a grammar.
//!
//! Build problems never abort anything: they are recorded here and the
//! offending rule is dropped or kept partially built. Constructors for the
//! individual messages live in `grammar::messages`.

/// Identifies a particular reported diagnostic.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ErrorId(usize);

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Severity {
    Error,
    Warning,
}

/// A single build diagnostic.
#[derive(Clone, Debug)]
pub struct Error {
    pub severity: Severity,
    pub title: String,

    /// The rule the diagnostic was reported against, if any.
    pub rule: Option<String>,
}

impl Error {
    pub fn new(severity: Severity, title: impl Into<String>) -> Self {
        Self { severity, title: title.into(), rule: None }
    }

    pub fn in_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }
}

/// Stores reported diagnostics in reporting order.
#[derive(Clone, Debug, Default)]
pub struct Errors {
    errors: Vec<Error>,

    num_errors: usize,
    num_warnings: usize,
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: Error) -> ErrorId {
        match error.severity {
            Severity::Error => self.num_errors += 1,
            Severity::Warning => self.num_warnings += 1,
        }

        self.errors.push(error);
        ErrorId(self.errors.len() - 1)
    }

    pub fn is_perfect(&self) -> bool {
        self.num_errors == 0 && self.num_warnings == 0
    }

    pub fn num_errors(&self) -> usize {
        self.num_errors
    }

    pub fn num_warnings(&self) -> usize {
        self.num_warnings
    }

    pub fn get(&self, id: ErrorId) -> &Error {
        &self.errors[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Error> + '_ {
        self.errors.iter()
    }

    /// Drain this store of its diagnostics.
    pub fn drain(&mut self) -> impl Iterator<Item = Error> + '_ {
        self.num_errors = 0;
        self.num_warnings = 0;
        self.errors.drain(..)
    }
}

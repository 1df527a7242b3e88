//! The rule-body parser.
//!
//! Precedence, strongest binding first: factor, term, sequence, alternative.
//! Every function returns `None` when it cannot produce a node; the
//! diagnostic has been recorded by then, and the caller carries on with
//! whatever did parse.

use bumpalo::Bump;
use lasso::Rodeo;

use crate::charset::ByteSet;
use crate::errors::Errors;
use crate::exprs::Expr;
use crate::intern::Interner;

use super::messages::RuleErrors;
use super::tokens::{Token, Tokenizer};

pub(crate) struct RuleParser<'a, 'g, 't> {
    alloc: &'a Bump,
    names: &'g mut Rodeo,
    interner: Option<&'g mut Interner<'a>>,
    errors: &'g mut Errors,

    /// The rule name, for diagnostics.
    rule: &'t str,
    tokens: Tokenizer<'t>,
}

impl<'a, 'g, 't> RuleParser<'a, 'g, 't> {
    pub fn new(
        alloc: &'a Bump,
        names: &'g mut Rodeo,
        interner: Option<&'g mut Interner<'a>>,
        errors: &'g mut Errors,
        rule: &'t str,
        body: &'t str,
    ) -> Self {
        Self { alloc, names, interner, errors, rule, tokens: Tokenizer::new(body) }
    }

    /// Parse the whole body. Trailing close-brackets are ignored, like the
    /// stray tokens they are.
    pub fn parse(mut self) -> Option<&'a Expr<'a>> {
        self.alternative()
    }

    /// ```abnf
    /// alternative = sequence *("|" sequence)
    /// ```
    fn alternative(&mut self) -> Option<&'a Expr<'a>> {
        let first = self.sequence();
        if self.tokens.peek() != Token::Pipe {
            return first;
        }

        let mut branches = Vec::new();
        branches.extend(first);
        while self.tokens.peek() == Token::Pipe {
            self.tokens.next();
            branches.extend(self.sequence());
        }

        match branches.len() {
            0 => None,
            1 => Some(branches[0]),
            _ => {
                let children = &*self.alloc.alloc_slice_copy(&branches);
                Some(self.install(Expr::Alternative(children)))
            }
        }
    }

    /// ```abnf
    /// sequence = *term
    /// ```
    fn sequence(&mut self) -> Option<&'a Expr<'a>> {
        let mut terms = Vec::new();
        loop {
            match self.tokens.peek() {
                Token::End | Token::Pipe | Token::RBrace | Token::RBracket => break,
                _ => terms.extend(self.term()),
            }
        }

        match terms.len() {
            0 => None,
            1 => Some(terms[0]),
            _ => {
                let children = &*self.alloc.alloc_slice_copy(&terms);
                Some(self.install(Expr::Sequence(children)))
            }
        }
    }

    /// ```abnf
    /// term = "{" alternative "}" / "[" alternative "]" / factor
    /// ```
    fn term(&mut self) -> Option<&'a Expr<'a>> {
        match self.tokens.peek() {
            Token::LBrace => {
                let inside = self.group('}');
                inside.map(|child| self.install(Expr::Repeat(child)))
            }
            Token::LBracket => {
                let inside = self.group(']');
                inside.map(|child| self.install(Expr::Optional(child)))
            }
            _ => self.factor(),
        }
    }

    /// The interior of a `{ }` or `[ ]` group, opener still unconsumed.
    fn group(&mut self, close: char) -> Option<&'a Expr<'a>> {
        self.tokens.next();
        let inside = self.alternative();

        let expected = if close == '}' { Token::RBrace } else { Token::RBracket };
        if self.tokens.next() != expected {
            self.report().unclosed_group(close);
        }

        if inside.is_none() {
            self.report().empty_group(close);
        }
        inside
    }

    /// ```abnf
    /// factor = "(" charclass ")" / SYMBOL / atom ["..." atom] / WORD
    /// ```
    fn factor(&mut self) -> Option<&'a Expr<'a>> {
        let token = self.tokens.next();
        match token {
            Token::LParen => self.char_class(),

            Token::Symbol(name) => {
                let name = self.names.get_or_intern(name);
                Some(self.install(Expr::Symbol(name)))
            }

            Token::Terminal(text) => {
                if self.tokens.peek() == Token::Ellipsis {
                    return self.char_range(atom_byte_of(text));
                }
                if text.is_empty() {
                    self.report().empty_terminal();
                    return None;
                }
                let literal = &*self.alloc.alloc_str(text);
                Some(self.install(Expr::Terminal(literal)))
            }

            Token::Hex(lexeme) => {
                if self.tokens.peek() == Token::Ellipsis {
                    return self.char_range(hex_byte_of(lexeme));
                }
                self.report().bare_hex(lexeme);
                None
            }

            Token::Word(text) => {
                let literal = &*self.alloc.alloc_str(text);
                Some(self.install(Expr::Terminal(literal)))
            }

            found => {
                self.report().unexpected_token(&found);
                None
            }
        }
    }

    /// The right half of `atom ... atom`; the `...` is still unconsumed.
    fn char_range(&mut self, mut lo: u8) -> Option<&'a Expr<'a>> {
        self.tokens.next();

        let end = self.tokens.next();
        let Some(mut hi) = atom_byte(&end) else {
            self.report().bad_range_end(&end);
            return None;
        };

        if lo > hi {
            self.report().reversed_range(lo, hi);
            std::mem::swap(&mut lo, &mut hi);
        }
        Some(self.install(Expr::CharRange(lo, hi)))
    }

    /// ```abnf
    /// charclass = ["^"] *(atom ["..." atom])
    /// ```
    /// The opening paren is already consumed. `^` inverts the finished
    /// bitmap, so exclusions are resolved before the node is built.
    fn char_class(&mut self) -> Option<&'a Expr<'a>> {
        let exclude = self.tokens.peek() == Token::Caret;
        if exclude {
            self.tokens.next();
        }

        let mut set = ByteSet::empty();
        loop {
            let token = self.tokens.peek();
            if token == Token::RParen {
                self.tokens.next();
                break;
            }
            if token == Token::End {
                self.report().unterminated_class();
                return None;
            }

            let Some(start) = atom_byte(&token) else {
                self.report().unexpected_token(&token);
                return None;
            };
            self.tokens.next();

            if self.tokens.peek() == Token::Ellipsis {
                self.tokens.next();
                let end_token = self.tokens.next();
                let Some(end) = atom_byte(&end_token) else {
                    self.report().bad_range_end(&end_token);
                    return None;
                };
                let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
                set.insert_range(lo, hi);
            } else {
                set.insert(start);
            }
        }

        if exclude {
            set.invert();
        }
        Some(self.install(Expr::CharClass(set)))
    }

    /// Bump-allocate the node and, when interning is on, swap it for the
    /// canonical copy. A displaced candidate stays behind as dead bytes.
    fn install(&mut self, expr: Expr<'a>) -> &'a Expr<'a> {
        let expr = &*self.alloc.alloc(expr);
        match self.interner.as_deref_mut() {
            Some(interner) => interner.intern(expr),
            None => expr,
        }
    }

    fn report(&mut self) -> RuleErrors<'_> {
        self.errors.rule_error(self.rule)
    }
}

/// The byte value of a range or class atom. Terminals contribute their first
/// byte, hex lexemes their value modulo 256; other tokens are not atoms.
fn atom_byte(token: &Token) -> Option<u8> {
    match token {
        Token::Terminal(text) => Some(atom_byte_of(text)),
        Token::Hex(lexeme) => Some(hex_byte_of(lexeme)),
        _ => None,
    }
}

fn atom_byte_of(text: &str) -> u8 {
    text.as_bytes().first().copied().unwrap_or(0)
}

/// Folds the digits after the `0x` prefix in wrapping arithmetic, which is
/// exactly "interpreted modulo 256". No digits yields zero.
fn hex_byte_of(lexeme: &str) -> u8 {
    lexeme.as_bytes()[2..].iter().fold(0u8, |acc, &digit| {
        let value = match digit {
            b'0'..=b'9' => digit - b'0',
            b'a'..=b'f' => digit - b'a' + 10,
            _ => digit - b'A' + 10,
        };
        acc.wrapping_mul(16).wrapping_add(value)
    })
}

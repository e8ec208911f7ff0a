// src/matcher/pattern.rs
//! Pattern backend: regex-approximated structure for languages without a
//! grammar in this build (Java).
//!
//! This backend is DEGRADED and is never treated as exact:
//!
//! - A function is a signature match followed by a body that runs to the
//!   first `}` returning brace depth to zero. Braces are counted on raw
//!   characters, so a `{` or `}` inside a string literal, char literal or
//!   comment shifts the boundary.
//! - Identifier and operator matching does not skip string literals or
//!   comments, so text inside them can be renamed or rewritten.
//! - `reserialize` is the identity; nothing re-checks syntax after an edit.
//!
//! These errors are what a pattern-backed variant's "best effort" means, and
//! they drive the failure rate expected from this backend.

use super::{
    BinaryExpr, DeclarationScope, Region, Statement, StatementBlock, StatementClass,
    StructuralMatcher,
};
use crate::error::Result;
use crate::lang::{BackendKind, Lang, ReservedWords};
use regex::Regex;
use std::collections::BTreeSet;

/// Words that can precede `(...) {` without naming a method.
const CONTROL_WORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "synchronized", "return", "new", "else", "do",
    "try", "throw", "case",
];

/// Leading words that pin a statement in place.
const PINNED_LEADERS: &[&str] = &[
    "if", "for", "while", "do", "switch", "try", "return", "break", "continue", "throw",
    "synchronized", "else", "case", "default", "assert", "yield", "class",
];

pub struct PatternMatcher {
    lang: Lang,
    reserved: ReservedWords,
    method: Regex,
    main_entry: Regex,
    local_decl: Regex,
    identifier: Regex,
    assignment: Regex,
    binary: Regex,
}

impl PatternMatcher {
    /// # Errors
    /// Returns `Regex` if a pattern fails to compile.
    pub fn new(lang: Lang) -> Result<Self> {
        Self::with_reserved(lang, ReservedWords::for_lang(lang))
    }

    /// Like [`PatternMatcher::new`], but never reports a word in `reserved`
    /// as a declared name.
    ///
    /// # Errors
    /// Returns `Regex` if a pattern fails to compile.
    pub fn with_reserved(lang: Lang, reserved: ReservedWords) -> Result<Self> {
        Ok(Self {
            lang,
            reserved,
            method: Regex::new(
                r"(?m)([A-Za-z_$][\w$.]*(?:<[^<>(){};]*>)?(?:\[\])*)\s+([A-Za-z_$][\w$]*)\s*\(([^()]*)\)\s*(?:throws\s+[\w$.,\s]+?)?\{",
            )?,
            main_entry: Regex::new(lang.main_signature())?,
            local_decl: Regex::new(
                r"\b(?:int|long|short|byte|float|double|boolean|char|String|var|[A-Z][\w$]*(?:<[^<>;{}]*>)?)(?:\[\])*\s+([A-Za-z_$][\w$]*)\s*(?:=|;|,|:|\))",
            )?,
            identifier: Regex::new(r"[A-Za-z_$][\w$]*")?,
            assignment: Regex::new(
                r"^(?:final\s+)?(?:[A-Za-z_$][\w$.]*(?:<[^<>;{}]*>)?(?:\[\])*\s+)?([A-Za-z_$][\w$]*)\s*(?:(?:[+\-*/%&|^]|<<|>>)?=[^=]|\+\+|--|;|$)",
            )?,
            binary: Regex::new(
                r"([A-Za-z_$][\w$]*|\d+(?:\.\d+)?)\s*([+\-*])\s*([A-Za-z_$][\w$]*|\d+(?:\.\d+)?)",
            )?,
        })
    }

    /// Method signatures with their approximated bodies.
    fn methods(&self, source: &str) -> Vec<MethodMatch> {
        self.method
            .captures_iter(source)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let ty = caps.get(1)?.as_str();
                let name = caps.get(2)?.as_str();
                if CONTROL_WORDS.contains(&ty) || CONTROL_WORDS.contains(&name) {
                    return None;
                }
                let open = whole.end() - 1;
                let close = matching_brace(source, open)?;
                Some(MethodMatch {
                    start: whole.start(),
                    body: Region::slice(source, open, close + 1),
                    params: caps.get(3).map_or("", |m| m.as_str()).to_string(),
                })
            })
            .collect()
    }

    fn idents_in<'a>(&'a self, text: &'a str) -> impl Iterator<Item = (usize, &'a str)> + 'a {
        self.identifier.find_iter(text).filter_map(move |m| {
            let prev = text.get(..m.start()).and_then(|s| s.chars().next_back());
            match prev {
                Some(c) if c == '.' || c.is_ascii_digit() => None,
                _ => Some((m.start(), m.as_str())),
            }
        })
    }

    fn classify(&self, text: &str) -> StatementClass {
        let first_word = text
            .split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
            .next()
            .unwrap_or_default();
        let assignment_ops = text.matches('=').count() - text.matches("==").count() * 2;
        if PINNED_LEADERS.contains(&first_word)
            || text.contains(['(', '{', '}', '@'])
            || assignment_ops > 1
        {
            return StatementClass::Pinned;
        }
        let Some(caps) = self.assignment.captures(text) else {
            return StatementClass::Pinned;
        };
        let Some(target) = caps.get(1).map(|m| m.as_str()) else {
            return StatementClass::Pinned;
        };
        if self.reserved.contains(target) {
            return StatementClass::Pinned;
        }

        let mut writes = BTreeSet::new();
        writes.insert(target.to_string());
        let reads = self
            .idents_in(text)
            .map(|(_, id)| id.to_string())
            .filter(|id| !self.reserved.contains(id))
            .collect();
        StatementClass::Candidate { writes, reads }
    }
}

struct MethodMatch {
    start: usize,
    body: Region,
    params: String,
}

impl StructuralMatcher for PatternMatcher {
    fn lang(&self) -> Lang {
        self.lang
    }

    fn backend(&self) -> BackendKind {
        BackendKind::Pattern
    }

    fn validate(&self, _source: &str) -> Result<()> {
        Ok(())
    }

    fn find_function_bodies(&self, source: &str) -> Result<Vec<Region>> {
        Ok(self.methods(source).into_iter().map(|m| m.body).collect())
    }

    fn find_main_entry(&self, source: &str) -> Result<Option<Region>> {
        let Some(m) = self.main_entry.find(source) else {
            return Ok(None);
        };
        let open = m.end() - 1;
        Ok(matching_brace(source, open).map(|close| Region::slice(source, open, close + 1)))
    }

    fn find_declarations(&self, source: &str) -> Result<Vec<DeclarationScope>> {
        let scopes = self
            .methods(source)
            .into_iter()
            .map(|m| {
                let mut scope = DeclarationScope::new(Region::slice(source, m.start, m.body.end));
                let params = m.params.split(',').filter_map(|p| {
                    p.split(|c: char| c.is_whitespace() || c == '.')
                        .filter(|w| !w.is_empty())
                        .last()
                        .map(|name| (name, m.start))
                });
                let locals = self
                    .local_decl
                    .captures_iter(&m.body.text)
                    .filter_map(|c| c.get(1))
                    .map(|n| (n.as_str(), m.body.start + n.start()));
                for (name, at) in params.chain(locals) {
                    let valid = name
                        .chars()
                        .all(|c| c.is_alphanumeric() || c == '_' || c == '$');
                    if valid && !self.reserved.contains(name) {
                        scope.declare(name, at);
                    }
                }
                scope
            })
            .collect();
        Ok(scopes)
    }

    fn find_identifiers(&self, source: &str, region: &Region) -> Result<Vec<Region>> {
        let text = source.get(region.range()).unwrap_or_default();
        Ok(self
            .idents_in(text)
            .map(|(offset, id)| {
                let start = region.start + offset;
                Region::new(start, start + id.len(), id)
            })
            .collect())
    }

    fn find_statement_blocks(&self, source: &str) -> Result<Vec<StatementBlock>> {
        let blocks = self
            .methods(source)
            .into_iter()
            .map(|m| {
                let statements = split_statements(&m.body)
                    .into_iter()
                    .map(|region| {
                        let class = self.classify(&region.text);
                        Statement { region, class }
                    })
                    .collect();
                StatementBlock {
                    region: m.body,
                    statements,
                }
            })
            .collect();
        Ok(blocks)
    }

    fn find_binary_expressions(&self, source: &str) -> Result<Vec<BinaryExpr>> {
        let mut out = Vec::new();
        for caps in self.binary.captures_iter(source) {
            let (Some(whole), Some(left), Some(op), Some(right)) =
                (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
            else {
                continue;
            };
            let before = source.get(..whole.start()).unwrap_or_default();
            let after = source.get(whole.end()..).unwrap_or_default();
            let is_word = |c: char| c.is_alphanumeric() || c == '_' || c == '$';

            // `x++`, `x += 1`, `x->y`: the operator is part of a longer token.
            let op_next = source.get(op.end()..).and_then(|s| s.chars().next());
            let unsafe_op = matches!(op_next, Some('+' | '-' | '=' | '>'));
            // Operand cut out of a longer token (`1e5`, `a.b`, `f(x)`, `a[i]`).
            let glued = matches!(before.chars().next_back(), Some(c) if is_word(c) || c == '.')
                || matches!(after.chars().next(), Some(c) if is_word(c) || ".([".contains(c));
            // A tighter or non-associative neighbour would change the grouping.
            let precedence = matches!(before.trim_end().chars().next_back(), Some(c) if "+-*/%!~&|^<>.".contains(c))
                || matches!(after.trim_start().chars().next(), Some(c) if "*/%.([".contains(c));
            if unsafe_op || glued || precedence {
                continue;
            }
            out.push(BinaryExpr {
                region: Region::new(whole.start(), whole.end(), whole.as_str()),
                left: Region::new(left.start(), left.end(), left.as_str()),
                operator: op.as_str().to_string(),
                right: Region::new(right.start(), right.end(), right.as_str()),
            });
        }
        Ok(out)
    }

    fn reserialize(&self, source: String) -> Result<String> {
        Ok(source)
    }
}

/// Index of the `}` closing the `{` at `open`, counting raw braces.
fn matching_brace(source: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in source.get(open..)?.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Top-level statements of a `{ ... }` body: split on `;` at depth zero and
/// on `}` that closes a nested block.
fn split_statements(body: &Region) -> Vec<Region> {
    let text = &body.text;
    let inner_start = 1;
    let inner_end = text.len().saturating_sub(1);
    let mut out = Vec::new();
    let (mut parens, mut braces) = (0i32, 0i32);
    let mut stmt_start = inner_start;

    let push = |from: usize, to: usize, out: &mut Vec<Region>| {
        let Some(raw) = text.get(from..to) else { return };
        let lead = raw.len() - raw.trim_start().len();
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            let start = body.start + from + lead;
            out.push(Region::new(start, start + trimmed.len(), trimmed));
        }
    };

    for (i, c) in text.char_indices() {
        if i < inner_start || i >= inner_end {
            continue;
        }
        match c {
            '(' => parens += 1,
            ')' => parens -= 1,
            '{' => braces += 1,
            '}' => {
                braces -= 1;
                if braces == 0 && parens == 0 {
                    // `} else {`, `} catch (...) {` and `} while (...);` continue the statement.
                    let rest = text.get(i + 1..inner_end).unwrap_or_default().trim_start();
                    let continues = ["else", "catch", "finally", "while"]
                        .iter()
                        .any(|kw| rest.starts_with(kw));
                    if !continues {
                        push(stmt_start, i + 1, &mut out);
                        stmt_start = i + 1;
                    }
                }
            }
            ';' if parens == 0 && braces == 0 => {
                push(stmt_start, i + 1, &mut out);
                stmt_start = i + 1;
            }
            _ => {}
        }
    }
    push(stmt_start, inner_end, &mut out);
    out
}

// src/matcher/mod.rs
//! Structural matching over source text.
//!
//! Two interchangeable backends sit behind [`StructuralMatcher`]:
//!
//! - `tree`: tree-sitter parse tree. Region lookups are exact and every edit
//!   is re-parsed, so a successful rewrite is always well-formed.
//! - `pattern`: bounded regex matching over raw text. This is a degraded
//!   backend; see its module docs for the boundary errors it is known to make.
//!
//! Regions are byte slices of the source they were computed from. Strategies
//! never mutate a tree: they describe [`Edit`]s, and [`StructuralMatcher::rewrite`]
//! produces a new source string and re-serializes it through the backend.

pub mod pattern;
pub mod tree;

use crate::error::{AdversaError, Result};
use crate::lang::{BackendKind, Lang, ReservedWords};
use std::collections::BTreeSet;
use std::ops::Range;

/// A `{start, end, text}` slice of a source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl Region {
    #[must_use]
    pub fn new(start: usize, end: usize, text: &str) -> Self {
        Self {
            start,
            end,
            text: text.to_string(),
        }
    }

    /// Slices `source[start..end]`, clamped to the source length.
    #[must_use]
    pub fn slice(source: &str, start: usize, end: usize) -> Self {
        let end = end.min(source.len());
        let start = start.min(end);
        Self::new(start, end, source.get(start..end).unwrap_or_default())
    }

    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    #[must_use]
    pub fn contains(&self, other: &Region) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// A declaring region (function parameters, a block, a `for` header) plus
/// the names it binds.
#[derive(Debug, Clone)]
pub struct DeclarationScope {
    pub region: Region,
    /// Declared names in first-seen order, without duplicates.
    pub names: Vec<String>,
    /// Byte offset of each name's declarator, parallel to `names`.
    pub declared_at: Vec<usize>,
}

impl DeclarationScope {
    #[must_use]
    pub fn new(region: Region) -> Self {
        Self {
            region,
            names: Vec::new(),
            declared_at: Vec::new(),
        }
    }

    /// Records `name` declared at byte `at`. Redeclarations keep the first offset.
    pub fn declare(&mut self, name: &str, at: usize) {
        if !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
            self.declared_at.push(at);
        }
    }

    /// Whether a use of `name` starting at byte `at` sees this scope's binding.
    #[must_use]
    pub fn binds(&self, name: &str, at: usize) -> bool {
        self.region.start <= at
            && at < self.region.end
            && self
                .names
                .iter()
                .zip(&self.declared_at)
                .any(|(n, &decl)| n == name && decl <= at)
    }
}

/// How a statement may take part in reordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementClass {
    /// Assignment, declaration or side-effect-free expression.
    Candidate {
        writes: BTreeSet<String>,
        reads: BTreeSet<String>,
    },
    /// Control flow, calls, or anything the backend cannot classify.
    Pinned,
}

#[derive(Debug, Clone)]
pub struct Statement {
    pub region: Region,
    pub class: StatementClass,
}

/// One statement list (a brace-delimited block).
#[derive(Debug, Clone)]
pub struct StatementBlock {
    pub region: Region,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub region: Region,
    pub left: Region,
    pub operator: String,
    pub right: Region,
}

/// A replacement of `range` in the source it was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: Range<usize>,
    pub replacement: String,
}

impl Edit {
    #[must_use]
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            range: at..at,
            replacement: text.into(),
        }
    }

    #[must_use]
    pub fn replace(region: &Region, text: impl Into<String>) -> Self {
        Self {
            range: region.range(),
            replacement: text.into(),
        }
    }
}

/// Applies non-overlapping edits, producing a new string.
///
/// # Errors
/// Returns `MalformedSource` if edits overlap or fall outside `source`.
pub fn apply_edits(source: &str, mut edits: Vec<Edit>) -> Result<String> {
    edits.sort_by_key(|e| (e.range.start, e.range.end));

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in &edits {
        if edit.range.start < cursor || edit.range.end > source.len() {
            return Err(AdversaError::MalformedSource(format!(
                "edit {:?} overlaps a previous edit or exceeds the source",
                edit.range
            )));
        }
        let (Some(kept), true) = (
            source.get(cursor..edit.range.start),
            source.is_char_boundary(edit.range.end),
        ) else {
            return Err(AdversaError::MalformedSource(format!(
                "edit {:?} splits a character",
                edit.range
            )));
        };
        out.push_str(kept);
        out.push_str(&edit.replacement);
        cursor = edit.range.end;
    }
    out.push_str(source.get(cursor..).unwrap_or_default());
    Ok(out)
}

/// Capability surface shared by both backends.
pub trait StructuralMatcher: Send + Sync {
    fn lang(&self) -> Lang;

    fn backend(&self) -> BackendKind;

    /// Checks that `source` is usable input for this backend.
    ///
    /// # Errors
    /// `MalformedSource` if a parse-tree backend cannot parse it.
    fn validate(&self, source: &str) -> Result<()>;

    /// Brace-delimited function bodies, outermost first.
    ///
    /// # Errors
    /// `MalformedSource` if the source cannot be analysed.
    fn find_function_bodies(&self, source: &str) -> Result<Vec<Region>>;

    /// The body of the program's main entry point, if one exists.
    ///
    /// # Errors
    /// `MalformedSource` if the source cannot be analysed.
    fn find_main_entry(&self, source: &str) -> Result<Option<Region>>;

    /// Declaring regions with the names they bind and where each is declared.
    /// Regions may nest; empty regions may be omitted.
    ///
    /// # Errors
    /// `MalformedSource` if the source cannot be analysed.
    fn find_declarations(&self, source: &str) -> Result<Vec<DeclarationScope>>;

    /// Whole-word identifier occurrences inside `region`.
    ///
    /// # Errors
    /// `MalformedSource` if the source cannot be analysed.
    fn find_identifiers(&self, source: &str, region: &Region) -> Result<Vec<Region>>;

    /// Statement lists with def/use classification.
    ///
    /// # Errors
    /// `MalformedSource` if the source cannot be analysed.
    fn find_statement_blocks(&self, source: &str) -> Result<Vec<StatementBlock>>;

    /// Binary operator expressions.
    ///
    /// # Errors
    /// `MalformedSource` if the source cannot be analysed.
    fn find_binary_expressions(&self, source: &str) -> Result<Vec<BinaryExpr>>;

    /// Re-serializes edited text through the backend.
    ///
    /// # Errors
    /// `MalformedSource` if the parse-tree backend finds a syntax error.
    fn reserialize(&self, source: String) -> Result<String>;

    /// Applies `edits` to `source` and re-serializes the result.
    ///
    /// # Errors
    /// Propagates errors from [`apply_edits`] and [`StructuralMatcher::reserialize`].
    fn rewrite(&self, source: &str, edits: Vec<Edit>) -> Result<String> {
        let edited = apply_edits(source, edits)?;
        self.reserialize(edited)
    }
}

/// Selects the backend for `lang` with the language's default reserved words.
///
/// # Errors
/// Returns an error if the pattern backend's expressions fail to compile.
pub fn for_lang(lang: Lang) -> Result<Box<dyn StructuralMatcher>> {
    for_lang_with(lang, &ReservedWords::for_lang(lang))
}

/// Selects the backend for `lang`; `reserved` is never treated as a declared name.
///
/// # Errors
/// Returns an error if the pattern backend's expressions fail to compile.
pub fn for_lang_with(lang: Lang, reserved: &ReservedWords) -> Result<Box<dyn StructuralMatcher>> {
    match lang.backend() {
        BackendKind::ParseTree => Ok(Box::new(tree::TreeMatcher::new(lang)?)),
        BackendKind::Pattern => Ok(Box::new(pattern::PatternMatcher::with_reserved(
            lang,
            reserved.clone(),
        )?)),
    }
}

// src/mutate/mod.rs
//! Language-aware mutation strategies.
//!
//! Every strategy works purely against the [`StructuralMatcher`] surface, so
//! the same code drives the exact C backend and the approximate Java one.
//!
//! # Architecture
//!
//! - `dead_code`: guarded, never-executed block in `main` (or at unit top)
//! - `redundant`: unreferenced auxiliary functions appended to the unit
//! - `identifiers`: scope-aware identifier renaming
//! - `reorder`: permutation of data-independent statements
//! - `comment`: one leading comment
//! - `expression`: equivalent rewrite of one binary expression
//!
//! A strategy that cannot find the region it needs returns
//! `RegionNotFound`; the pipeline decides whether that is a no-op.

pub mod comment;
pub mod dead_code;
pub mod expression;
pub mod identifiers;
pub mod redundant;
pub mod reorder;

use crate::error::Result;
use crate::lang::{Lang, ReservedWords};
use crate::matcher::StructuralMatcher;
use crate::types::{MutationKind, MutationParams};
use rand::rngs::StdRng;
use rand::Rng;

/// Everything a strategy may consult while rewriting one sample.
pub struct MutationContext<'a> {
    pub lang: Lang,
    pub matcher: &'a dyn StructuralMatcher,
    /// Identifiers no strategy may rename.
    pub reserved: &'a ReservedWords,
    pub rng: &'a mut StdRng,
    pub params: MutationParams,
}

pub trait MutationStrategy: Send + Sync {
    fn kind(&self) -> MutationKind;

    /// Produces the rewritten source.
    ///
    /// # Errors
    /// `RegionNotFound` when the needed region is absent, `MalformedSource`
    /// when the backend rejects the input or the rewrite.
    fn apply(&self, source: &str, ctx: &mut MutationContext<'_>) -> Result<String>;
}

/// The strategy implementing `kind`.
#[must_use]
pub fn strategy_for(kind: MutationKind) -> Box<dyn MutationStrategy> {
    match kind {
        MutationKind::DeadCode => Box::new(dead_code::DeadCode),
        MutationKind::RedundantCode => Box::new(redundant::RedundantCode),
        MutationKind::Rename => Box::new(identifiers::RenameIdentifiers),
        MutationKind::Reorder => Box::new(reorder::ReorderStatements),
        MutationKind::Comment => Box::new(comment::CommentInsertion),
        MutationKind::ExpressionRewrite => Box::new(expression::ExpressionRewrite),
    }
}

/// Random draws before falling back to a linear scan.
const SUFFIX_ATTEMPTS: usize = 64;

/// Picks a numeric suffix for injected names that does not occur in `source`.
pub(crate) fn fresh_suffix(source: &str, rng: &mut StdRng) -> String {
    for _ in 0..SUFFIX_ATTEMPTS {
        let suffix = rng.gen_range(1000..100_000u32).to_string();
        if !source.contains(&suffix) {
            return suffix;
        }
    }
    // Finite: `source` cannot contain every integer.
    (100_000u64..)
        .map(|n| n.to_string())
        .find(|suffix| !source.contains(suffix.as_str()))
        .unwrap_or_default()
}

/// Fills a snippet template chosen at random from `pool`.
pub(crate) fn pick_snippet(pool: &[&str], source: &str, rng: &mut StdRng) -> Option<String> {
    if pool.is_empty() {
        return None;
    }
    let template = pool[rng.gen_range(0..pool.len())];
    let suffix = fresh_suffix(source, rng);
    Some(template.replace("{id}", &suffix))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::matcher;
    use rand::SeedableRng;

    /// Runs a single strategy once against `source`.
    pub fn run(kind: MutationKind, lang: Lang, source: &str, seed: u64) -> Result<String> {
        run_reserved(kind, lang, source, seed, &ReservedWords::for_lang(lang))
    }

    /// Like [`run`], with an explicit reserved-word set.
    pub fn run_reserved(
        kind: MutationKind,
        lang: Lang,
        source: &str,
        seed: u64,
        reserved: &ReservedWords,
    ) -> Result<String> {
        let matcher = matcher::for_lang_with(lang, reserved)?;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ctx = MutationContext {
            lang,
            matcher: matcher.as_ref(),
            reserved,
            rng: &mut rng,
            params: MutationParams::default(),
        };
        strategy_for(kind).apply(source, &mut ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_fresh_suffix_terminates_on_dense_numeric_source() {
        let table: String = (1000..100_000u32).map(|n| n.to_string()).collect();
        let mut rng = StdRng::seed_from_u64(0);
        let suffix = fresh_suffix(&table, &mut rng);
        assert!(!suffix.is_empty());
        assert!(!table.contains(&suffix));
    }

    #[test]
    fn test_registry_is_total() {
        for kind in MutationKind::ALL {
            assert_eq!(strategy_for(kind).kind(), kind);
        }
    }
}

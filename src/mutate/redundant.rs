// src/mutate/redundant.rs
//! Redundant-code injection: appends a self-contained auxiliary function
//! that nothing in the unit calls.

use super::{pick_snippet, MutationContext, MutationStrategy};
use crate::error::{AdversaError, Result};
use crate::lang::{Lang, SnippetKind};
use crate::matcher::Edit;
use crate::types::MutationKind;

pub struct RedundantCode;

impl MutationStrategy for RedundantCode {
    fn kind(&self) -> MutationKind {
        MutationKind::RedundantCode
    }

    fn apply(&self, source: &str, ctx: &mut MutationContext<'_>) -> Result<String> {
        let snippet = pick_snippet(ctx.lang.snippets(SnippetKind::Redundant), source, ctx.rng)
            .ok_or_else(|| AdversaError::RegionNotFound("no redundant snippet".into()))?;
        let at = insertion_point(ctx.lang, source);
        ctx.matcher.rewrite(source, vec![Edit::insert(at, snippet)])
    }
}

/// End of unit, or just inside the closing brace of a Java class body.
fn insertion_point(lang: Lang, source: &str) -> usize {
    if lang == Lang::Java && source.contains("class ") {
        let trimmed = source.trim_end();
        if trimmed.ends_with('}') {
            return trimmed.len() - 1;
        }
    }
    source.len()
}

// src/mutate/dead_code.rs
//! Dead-code insertion.
//!
//! Injects a block guarded by a compile-time-false condition right after the
//! opening brace of the main entry. Without an entry point the unit-level
//! variant (`#if 0` for C, a static initializer for Java) is prepended,
//! unless the step is strict.

use super::{pick_snippet, MutationContext, MutationStrategy};
use crate::error::{AdversaError, Result};
use crate::lang::SnippetKind;
use crate::matcher::Edit;
use crate::types::MutationKind;

pub struct DeadCode;

impl MutationStrategy for DeadCode {
    fn kind(&self) -> MutationKind {
        MutationKind::DeadCode
    }

    fn apply(&self, source: &str, ctx: &mut MutationContext<'_>) -> Result<String> {
        let edit = match ctx.matcher.find_main_entry(source)? {
            Some(body) => {
                let block = pick_snippet(ctx.lang.snippets(SnippetKind::DeadBlock), source, ctx.rng)
                    .ok_or_else(|| AdversaError::RegionNotFound("no dead-code snippet".into()))?;
                Edit::insert(body.start + 1, block)
            }
            None if ctx.params.strict => {
                return Err(AdversaError::RegionNotFound("main entry point".into()));
            }
            None => {
                let block =
                    pick_snippet(ctx.lang.snippets(SnippetKind::UnitDeadBlock), source, ctx.rng)
                        .ok_or_else(|| AdversaError::RegionNotFound("no unit snippet".into()))?;
                Edit::insert(0, block)
            }
        };
        ctx.matcher.rewrite(source, vec![edit])
    }
}

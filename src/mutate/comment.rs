// src/mutate/comment.rs
use super::{MutationContext, MutationStrategy};
use crate::error::Result;
use crate::matcher::Edit;
use crate::types::MutationKind;
use rand::Rng;

const COMMENTS: &[&str] = &[
    "This is an added comment",
    "Helper routine",
    "Refactored for readability",
    "Legacy implementation",
    "Computes the result",
];

/// Prepends one comment line. Cannot fail on any input the backend accepts.
pub struct CommentInsertion;

impl MutationStrategy for CommentInsertion {
    fn kind(&self) -> MutationKind {
        MutationKind::Comment
    }

    fn apply(&self, source: &str, ctx: &mut MutationContext<'_>) -> Result<String> {
        let text = COMMENTS[ctx.rng.gen_range(0..COMMENTS.len())];
        let comment = ctx.lang.comment(text);
        let insertion = if source.is_empty() {
            comment
        } else {
            format!("{comment}\n")
        };
        ctx.matcher.rewrite(source, vec![Edit::insert(0, insertion)])
    }
}

// src/mutate/expression.rs
//! Expression rewriting.
//!
//! Replaces one binary expression with an intended-equivalent form. The C
//! backend matches exact `binary_expression` nodes. The pattern backend
//! matches operator text, so it may rewrite inside strings or comments and
//! may produce code that no longer compiles (e.g. `String` concatenation
//! turned into subtraction). That outcome is reported, never hidden.

use super::{MutationContext, MutationStrategy};
use crate::error::{AdversaError, Result};
use crate::matcher::{BinaryExpr, Edit};
use crate::types::MutationKind;
use rand::Rng;

pub struct ExpressionRewrite;

impl MutationStrategy for ExpressionRewrite {
    fn kind(&self) -> MutationKind {
        MutationKind::ExpressionRewrite
    }

    fn apply(&self, source: &str, ctx: &mut MutationContext<'_>) -> Result<String> {
        let candidates: Vec<(BinaryExpr, String)> = ctx
            .matcher
            .find_binary_expressions(source)?
            .into_iter()
            .filter_map(|expr| rewrite(&expr).map(|text| (expr, text)))
            .collect();
        if candidates.is_empty() {
            return Err(AdversaError::RegionNotFound("rewritable binary expression".into()));
        }
        let (expr, replacement) = &candidates[ctx.rng.gen_range(0..candidates.len())];
        ctx.matcher
            .rewrite(source, vec![Edit::replace(&expr.region, replacement.clone())])
    }
}

/// Equivalent form of `expr`, if its operator has one.
#[must_use]
pub fn rewrite(expr: &BinaryExpr) -> Option<String> {
    let l = &expr.left.text;
    let r = &expr.right.text;
    let text = match expr.operator.as_str() {
        // additive decomposition
        "+" => format!("({l} - (-({r})))"),
        "-" => format!("({l} + (-({r})))"),
        "*" => format!("(({r}) * ({l}))"),
        "<" => format!("(({r}) > ({l}))"),
        ">" => format!("(({r}) < ({l}))"),
        "<=" => format!("(({r}) >= ({l}))"),
        ">=" => format!("(({r}) <= ({l}))"),
        "==" => format!("(({r}) == ({l}))"),
        "!=" => format!("(({r}) != ({l}))"),
        _ => return None,
    };
    Some(text)
}

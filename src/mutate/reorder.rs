// src/mutate/reorder.rs
//! Statement reordering.
//!
//! Within one block, a run is a maximal stretch of consecutive candidate
//! statements (no control flow, no calls). A statement of the run is
//! eligible when it shares no def/use edge (read-after-write,
//! write-after-read or write-after-write on an identifier) with any other
//! statement of the same run. Eligible statements are permuted among their
//! own slots; every other statement keeps its position.

use super::{MutationContext, MutationStrategy};
use crate::error::{AdversaError, Result};
use crate::matcher::{Edit, Statement, StatementClass};
use crate::types::MutationKind;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;

pub struct ReorderStatements;

impl MutationStrategy for ReorderStatements {
    fn kind(&self) -> MutationKind {
        MutationKind::Reorder
    }

    fn apply(&self, source: &str, ctx: &mut MutationContext<'_>) -> Result<String> {
        let blocks = ctx.matcher.find_statement_blocks(source)?;
        let plans: Vec<(usize, Vec<usize>)> = blocks
            .iter()
            .enumerate()
            .flat_map(|(b, block)| {
                eligible_groups(&block.statements)
                    .into_iter()
                    .map(move |group| (b, group))
            })
            .collect();
        if plans.is_empty() {
            return Err(AdversaError::RegionNotFound(
                "run of two or more independent statements".into(),
            ));
        }

        let (block_idx, slots) = &plans[ctx.rng.gen_range(0..plans.len())];
        let statements = &blocks[*block_idx].statements;
        let order = permute(slots, ctx.rng);

        let edits = slots
            .iter()
            .zip(&order)
            .map(|(&slot, &from)| Edit::replace(&statements[slot].region, statements[from].region.text.clone()))
            .collect();
        ctx.matcher.rewrite(source, edits)
    }
}

/// A non-identity permutation of `slots` (for two or more slots).
fn permute(slots: &[usize], rng: &mut impl Rng) -> Vec<usize> {
    let mut order = slots.to_vec();
    order.shuffle(rng);
    if order == slots && order.len() > 1 {
        order.rotate_left(1);
    }
    order
}

/// Indices of eligible statements, one group per run with at least two.
#[must_use]
pub fn eligible_groups(statements: &[Statement]) -> Vec<Vec<usize>> {
    let mut groups = Vec::new();
    let mut run: Vec<usize> = Vec::new();
    for (idx, stmt) in statements.iter().enumerate() {
        if matches!(stmt.class, StatementClass::Candidate { .. }) {
            run.push(idx);
            continue;
        }
        collect_group(statements, &run, &mut groups);
        run.clear();
    }
    collect_group(statements, &run, &mut groups);
    groups
}

fn collect_group(statements: &[Statement], run: &[usize], groups: &mut Vec<Vec<usize>>) {
    let independent: Vec<usize> = run
        .iter()
        .copied()
        .filter(|&i| {
            run.iter()
                .all(|&j| i == j || !depends(&statements[i].class, &statements[j].class))
        })
        .collect();
    if independent.len() >= 2 {
        groups.push(independent);
    }
}

fn depends(a: &StatementClass, b: &StatementClass) -> bool {
    let (
        StatementClass::Candidate {
            writes: wa,
            reads: ra,
        },
        StatementClass::Candidate {
            writes: wb,
            reads: rb,
        },
    ) = (a, b)
    else {
        return true;
    };
    intersects(wa, rb) || intersects(wb, ra) || intersects(wa, wb)
}

fn intersects(a: &BTreeSet<String>, b: &BTreeSet<String>) -> bool {
    a.intersection(b).next().is_some()
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::lang::Lang;
    use crate::matcher::Region;
    use crate::mutate::testing::run;

    fn stmt(writes: &[&str], reads: &[&str]) -> Statement {
        Statement {
            region: Region::new(0, 0, ""),
            class: StatementClass::Candidate {
                writes: writes.iter().map(|s| (*s).to_string()).collect(),
                reads: reads.iter().map(|s| (*s).to_string()).collect(),
            },
        }
    }

    fn pinned() -> Statement {
        Statement {
            region: Region::new(0, 0, ""),
            class: StatementClass::Pinned,
        }
    }

    #[test]
    fn test_dependency_edges_exclude_statements() {
        // a = 1; b = a; c = 2; d = 3;
        let stmts = vec![
            stmt(&["a"], &["a"]),
            stmt(&["b"], &["b", "a"]),
            stmt(&["c"], &["c"]),
            stmt(&["d"], &["d"]),
        ];
        assert_eq!(eligible_groups(&stmts), vec![vec![2, 3]]);
    }

    #[test]
    fn test_pinned_statements_split_runs() {
        let stmts = vec![
            stmt(&["a"], &["a"]),
            stmt(&["b"], &["b"]),
            pinned(),
            stmt(&["c"], &["c"]),
            stmt(&["d"], &["d"]),
            stmt(&["e"], &["e"]),
        ];
        assert_eq!(eligible_groups(&stmts), vec![vec![0, 1], vec![3, 4, 5]]);
    }

    #[test]
    fn test_shared_reads_are_independent() {
        let stmts = vec![stmt(&["a"], &["a", "x"]), stmt(&["b"], &["b", "x"])];
        assert_eq!(eligible_groups(&stmts), vec![vec![0, 1]]);
    }

    #[test]
    fn test_c_swaps_independent_pair() {
        let src = "int main() { int a = 1; int b = 2; return a + b; }";
        let out = run(MutationKind::Reorder, Lang::C, src, 21).expect("mutate");
        assert_eq!(out, "int main() { int b = 2; int a = 1; return a + b; }");
    }

    #[test]
    fn test_dependent_statements_keep_order() {
        let src = "int main() { int a = 1; int b = a; return b; }";
        let err = run(MutationKind::Reorder, Lang::C, src, 22).expect_err("nothing eligible");
        assert_eq!(err.category(), "region_not_found");
    }

    #[test]
    fn test_java_reorder_is_permutation() {
        let src = "void f() {\n    int a = 1;\n    int b = 2;\n    int c = 3;\n    System.out.println(a);\n}\n";
        let out = run(MutationKind::Reorder, Lang::Java, src, 23).expect("mutate");
        let mut lines: Vec<&str> = out.lines().collect();
        let mut orig: Vec<&str> = src.lines().collect();
        assert_ne!(lines, orig);
        assert_eq!(lines[4], "    System.out.println(a);");
        lines.sort_unstable();
        orig.sort_unstable();
        assert_eq!(lines, orig);
    }
}

// src/mutate/identifiers.rs
//! Identifier renaming.
//!
//! The matcher reports declaring regions (function parameters, blocks, `for`
//! headers). Each identifier use resolves to the innermost region that
//! declared its name before the use; uses that resolve nowhere (globals,
//! called functions, fields) are left alone. Every region gets its own
//! [`Scope`], and one shared [`Renamer`] keeps generated names from aliasing
//! across scopes.

use super::{MutationContext, MutationStrategy};
use crate::error::{AdversaError, Result};
use crate::matcher::{DeclarationScope, Edit, Region};
use crate::rename::{Renamer, Scope};
use crate::types::MutationKind;
use rand::Rng;

pub struct RenameIdentifiers;

impl MutationStrategy for RenameIdentifiers {
    fn kind(&self) -> MutationKind {
        MutationKind::Rename
    }

    fn apply(&self, source: &str, ctx: &mut MutationContext<'_>) -> Result<String> {
        let declarations: Vec<DeclarationScope> = ctx
            .matcher
            .find_declarations(source)?
            .into_iter()
            .filter(|d| !d.names.is_empty())
            .collect();
        if declarations.is_empty() {
            return Err(AdversaError::RegionNotFound("identifier declarations".into()));
        }

        let mut renamer =
            Renamer::new(ctx.lang, ctx.rng.gen_range(0..1000)).with_reserved(ctx.reserved.clone());
        let whole = Region::slice(source, 0, source.len());
        let mut sites = ctx.matcher.find_identifiers(source, &whole)?;
        sites.sort_by_key(|r| r.start);
        renamer.avoid(sites.iter().map(|r| r.text.clone()));

        let mut scopes: Vec<Scope> = declarations
            .iter()
            .map(|d| Scope::new(d.region.clone()))
            .collect();
        let mut edits = Vec::new();
        for site in &sites {
            if renamer.is_reserved(&site.text) {
                continue;
            }
            let Some(idx) = innermost_binding(&declarations, &site.text, site.start) else {
                continue;
            };
            let renamed = renamer.rename(&mut scopes[idx], &site.text);
            edits.push(Edit::replace(site, renamed));
        }

        if edits.is_empty() {
            return Err(AdversaError::RegionNotFound("identifier use sites".into()));
        }
        ctx.matcher.rewrite(source, edits)
    }
}

/// Index of the smallest declaring region that binds `name` at byte `at`.
fn innermost_binding(declarations: &[DeclarationScope], name: &str, at: usize) -> Option<usize> {
    declarations
        .iter()
        .enumerate()
        .filter(|(_, d)| d.binds(name, at))
        .min_by_key(|(_, d)| d.region.end - d.region.start)
        .map(|(idx, _)| idx)
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use crate::lang::{Lang, ReservedWords};
    use crate::mutate::testing::{run, run_reserved};
    use crate::types::MutationKind;
    use regex::Regex;
    use std::collections::HashSet;

    fn generated(out: &str, prefix: &str) -> Vec<String> {
        let re = Regex::new(&format!(r"\b{prefix}\d+\b")).expect("regex");
        re.find_iter(out).map(|m| m.as_str().to_string()).collect()
    }

    #[test]
    fn test_two_names_three_uses() {
        let src = "int main() { int x = 1; int y = x; return x; }";
        let out = run(MutationKind::Rename, Lang::C, src, 11).expect("mutate");
        let names = generated(&out, "var_");
        let distinct: HashSet<&String> = names.iter().collect();
        assert_eq!(distinct.len(), 2);
        // x: declaration + two uses; y: declaration.
        assert_eq!(names.len(), 4);
        assert_eq!(names[0], names[2]);
        assert_eq!(names[0], names[3]);
        assert!(out.contains("int main()"));
    }

    #[test]
    fn test_whole_word_only() {
        let src = "int main() { int i = 0; int idx = i; return idx + i; }";
        let out = run(MutationKind::Rename, Lang::C, src, 12).expect("mutate");
        assert!(!out.contains(" i ") && !out.contains("idx"));
        assert_eq!(generated(&out, "var_").iter().collect::<HashSet<_>>().len(), 2);
    }

    #[test]
    fn test_keywords_and_calls_untouched() {
        let src = "int main() { int n = 3; while (n > 0) { n--; } printf(\"%d\", n); return n; }";
        let out = run(MutationKind::Rename, Lang::C, src, 13).expect("mutate");
        for keyword in ["while", "return", "int main", "printf"] {
            assert!(out.contains(keyword), "lost {keyword}");
        }
        assert!(!Regex::new(r"\bn\b").expect("regex").is_match(&out));
    }

    #[test]
    fn test_java_uses_adv_prefix() {
        let src = "int twice(int n) {\n    int r = n * 2;\n    return r;\n}\n";
        let out = run(MutationKind::Rename, Lang::Java, src, 14).expect("mutate");
        assert_eq!(generated(&out, "adv_").len(), 4);
        assert!(out.starts_with("int twice("));
    }

    #[test]
    fn test_shadowed_outer_binding_is_not_renamed() {
        let src = "int x = 5;\nint f(void) { int y = x; { int x = 2; y += x; } return y; }";
        let out = run(MutationKind::Rename, Lang::C, src, 16).expect("mutate");
        assert!(out.starts_with("int x = 5;\n"), "{out}");

        let outer = Regex::new(r"int (var_\d+) = x;").expect("regex");
        let y = outer.captures(&out).expect("outer use of the global kept")[1].to_string();

        let inner = Regex::new(r"\{ int (var_\d+) = 2; (var_\d+) \+= (var_\d+); \}").expect("regex");
        let caps = inner.captures(&out).expect("inner block renamed");
        assert_eq!(caps[1], caps[3]);
        assert_eq!(caps[2], y);
        assert_ne!(caps[1], y);
        assert!(out.ends_with(&format!("return {y}; }}")));
    }

    #[test]
    fn test_loop_variable_shadows_function_local() {
        let src = "int main() { int i = 9; for (int i = 0; i < 3; i++) { } return i; }";
        let out = run(MutationKind::Rename, Lang::C, src, 17).expect("mutate");
        let names = generated(&out, "var_");
        // outer decl, loop decl, two loop uses, return use
        assert_eq!(names.len(), 5);
        assert_eq!(names[0], names[4]);
        assert_ne!(names[0], names[1]);
        assert!(names[1..4].iter().all(|n| *n == names[1]));
    }

    #[test]
    fn test_configured_reserved_word_survives() {
        let src = "int main() { int count = 1; int x = count; return x; }";
        let reserved = ReservedWords::for_lang(Lang::C).with_extra(["count"]);
        let out = run_reserved(MutationKind::Rename, Lang::C, src, 18, &reserved).expect("mutate");
        assert_eq!(out.matches("count").count(), 2);
        assert!(!Regex::new(r"\bx\b").expect("regex").is_match(&out));
    }

    #[test]
    fn test_no_declarations_is_region_not_found() {
        let err = run(MutationKind::Rename, Lang::C, "", 15).expect_err("nothing to rename");
        assert_eq!(err.category(), "region_not_found");
    }
}

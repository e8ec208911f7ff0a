// src/cli/mutate_handler.rs
use crate::config::StrategyEntry;
use crate::exit::AdversaExit;
use crate::generator::{derive_seed, report};
use crate::error::AdversaError;
use crate::lang::{Lang, ReservedWords};
use crate::pipeline::Pipeline;
use crate::types::{MutationKind, MutationSpec, SourceUnit, VariantStatus};
use anyhow::{Context, Result};
use colored::Colorize;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::{Path, PathBuf};

pub struct MutateOptions {
    pub language: Option<String>,
    pub file: PathBuf,
    pub strategies: Vec<String>,
    pub seed: u64,
    pub strict: bool,
    pub reserve: Vec<String>,
}

/// Handles the mutate command.
///
/// # Errors
/// Returns error if the file cannot be read, the language cannot be
/// determined, or the strategies are invalid.
pub fn handle_mutate(opts: &MutateOptions) -> Result<AdversaExit> {
    let file = opts.file.as_path();
    let lang = resolve_language(opts.language.as_deref(), file)?;
    let specs = opts
        .strategies
        .iter()
        .map(|name| {
            let spec = StrategyEntry::from(name.as_str()).to_spec()?;
            Ok(if opts.strict { spec.strict() } else { spec })
        })
        .collect::<crate::error::Result<Vec<MutationSpec>>>()?;
    let reserved = ReservedWords::for_lang(lang).with_extra(opts.reserve.iter().cloned());
    let pipeline = Pipeline::with_reserved(lang, &specs, reserved)?;

    let code = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let unit = SourceUnit {
        id: 0,
        language: lang,
        raw_code: code,
        label: serde_json::Value::Null,
        metadata: serde_json::Map::new(),
    };

    let mut rng = StdRng::seed_from_u64(derive_seed(opts.seed, 0, 0));
    let variant = pipeline.run(&unit, &mut rng);
    match &variant.status {
        VariantStatus::Success => {
            print!("{}", variant.mutated_code);
            Ok(AdversaExit::Success)
        }
        VariantStatus::Failed(reason) => {
            eprintln!("{}", report::format_failure(reason));
            Ok(AdversaExit::PartialFailure)
        }
    }
}

/// An explicit `--language` wins; otherwise the file extension decides.
fn resolve_language(explicit: Option<&str>, file: &Path) -> crate::error::Result<Lang> {
    if let Some(name) = explicit {
        return Lang::from_name(name);
    }
    let ext = file.extension().and_then(|e| e.to_str()).unwrap_or_default();
    Lang::from_ext(ext).ok_or_else(|| {
        AdversaError::UnsupportedLanguage(format!(
            "cannot infer a language from {}; pass --language",
            file.display()
        ))
    })
}

/// Prints every mutation kind with its aliases.
#[must_use]
pub fn handle_strategies() -> AdversaExit {
    for kind in MutationKind::ALL {
        println!("{:<20} {}", kind.name().bold(), kind.aliases().join(", ").dimmed());
    }
    AdversaExit::Success
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_language_inferred_from_extension() {
        assert_eq!(resolve_language(None, Path::new("a/Main.java")).expect("java"), Lang::Java);
        assert_eq!(resolve_language(None, Path::new("prog.c")).expect("c"), Lang::C);
    }

    #[test]
    fn test_explicit_language_wins() {
        let lang = resolve_language(Some("java"), Path::new("snippet.txt")).expect("java");
        assert_eq!(lang, Lang::Java);
    }

    #[test]
    fn test_unknown_extension_is_config_error() {
        let err = resolve_language(None, Path::new("script.rb")).expect_err("no language");
        assert!(err.is_config_error());
    }
}

// src/cli/generate_handler.rs
use crate::config::{self, GeneratorConfig, StrategyEntry};
use crate::dataset;
use crate::exit::AdversaExit;
use crate::generator::{report, VariantGenerator};
use anyhow::{Context, Result};
use std::path::PathBuf;

pub struct GenerateOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
    pub language: Option<String>,
    pub num_variants: Option<usize>,
    pub strategies: Vec<String>,
    pub seed: Option<u64>,
    pub workers: Option<usize>,
    pub reserve: Vec<String>,
    pub unordered: bool,
    pub json: bool,
}

/// Handles the generate command.
///
/// # Errors
/// Returns error if the config is invalid or the dataset cannot be read or written.
pub fn handle_generate(opts: &GenerateOptions) -> Result<AdversaExit> {
    let base = match &opts.config {
        Some(path) => config::io::load_from(path)?,
        None => GeneratorConfig::load()?,
    };
    let config = apply_overrides(base, opts);

    // Fails before the dataset is opened.
    let generator = VariantGenerator::new(&config)?;

    let input = dataset::read_jsonl(&opts.input)
        .with_context(|| format!("reading dataset {}", opts.input.display()))?;
    let generation = generator.generate(&input)?;
    dataset::write_jsonl(&opts.output, &generation.dataset)
        .with_context(|| format!("writing dataset {}", opts.output.display()))?;

    if opts.json {
        println!("{}", report::format_json(&generation.report));
    } else {
        print!("{}", report::format_summary(&generation.report));
    }
    Ok(AdversaExit::Success)
}

/// CLI flags win over file values.
#[must_use]
pub fn apply_overrides(mut config: GeneratorConfig, opts: &GenerateOptions) -> GeneratorConfig {
    if let Some(language) = &opts.language {
        config.language.clone_from(language);
    }
    if let Some(n) = opts.num_variants {
        config.num_variants = n;
    }
    if !opts.strategies.is_empty() {
        config.strategy_order = opts
            .strategies
            .iter()
            .map(|s| StrategyEntry::from(s.as_str()))
            .collect();
    }
    if let Some(seed) = opts.seed {
        config.seed = seed;
    }
    if let Some(workers) = opts.workers {
        config.workers = workers;
    }
    if opts.unordered {
        config.preserve_order = false;
    }
    config.extra_reserved_words.extend(opts.reserve.iter().cloned());
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> GenerateOptions {
        GenerateOptions {
            input: PathBuf::from("in.jsonl"),
            output: PathBuf::from("out.jsonl"),
            config: None,
            language: None,
            num_variants: None,
            strategies: Vec::new(),
            seed: None,
            workers: None,
            reserve: Vec::new(),
            unordered: false,
            json: false,
        }
    }

    #[test]
    fn test_no_flags_keep_file_values() {
        let base = GeneratorConfig {
            seed: 99,
            ..GeneratorConfig::default()
        };
        assert_eq!(apply_overrides(base.clone(), &opts()), base);
    }

    #[test]
    fn test_flags_override() {
        let mut o = opts();
        o.language = Some("java".into());
        o.strategies = vec!["rename".into(), "comment".into()];
        o.unordered = true;
        o.num_variants = Some(4);
        let config = apply_overrides(GeneratorConfig::default(), &o);
        assert_eq!(config.language, "java");
        assert_eq!(config.num_variants, 4);
        assert_eq!(config.strategy_order.len(), 2);
        assert!(!config.preserve_order);
    }

    #[test]
    fn test_reserve_flags_append_to_file_words() {
        let base = GeneratorConfig {
            extra_reserved_words: vec!["total".into()],
            ..GeneratorConfig::default()
        };
        let mut o = opts();
        o.reserve = vec!["count".into()];
        let config = apply_overrides(base, &o);
        assert_eq!(config.extra_reserved_words, vec!["total", "count"]);
    }
}

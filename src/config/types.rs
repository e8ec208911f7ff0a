use crate::lang::{Lang, ReservedWords};
use crate::types::MutationSpec;
use serde::{Deserialize, Serialize};

/// Top-level layout of `adversa.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdversaToml {
    #[serde(default)]
    pub generate: GeneratorConfig,
}

/// Per-invocation settings as written by the user. Names are unchecked
/// until [`GeneratorConfig::resolve`] runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_num_variants")]
    pub num_variants: usize,
    #[serde(default = "default_strategy_order")]
    pub strategy_order: Vec<StrategyEntry>,
    #[serde(default)]
    pub seed: u64,
    /// Worker threads; `0` means one per available CPU (capped at 8).
    #[serde(default)]
    pub workers: usize,
    #[serde(default = "default_true")]
    pub preserve_order: bool,
    /// Identifiers never renamed, on top of the language's keywords.
    #[serde(default)]
    pub extra_reserved_words: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            num_variants: default_num_variants(),
            strategy_order: default_strategy_order(),
            seed: 0,
            workers: 0,
            preserve_order: true,
            extra_reserved_words: Vec::new(),
        }
    }
}

/// `"rename"` or `{ kind = "rename", strict = true, repeat = 2 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StrategyEntry {
    Name(String),
    Detailed {
        kind: String,
        #[serde(default)]
        strict: bool,
        #[serde(default = "default_repeat")]
        repeat: u32,
    },
}

impl From<&str> for StrategyEntry {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// Validated settings the generator runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub language: Lang,
    pub num_variants: usize,
    pub strategy_order: Vec<MutationSpec>,
    pub seed: u64,
    pub workers: usize,
    pub preserve_order: bool,
    pub extra_reserved_words: Vec<String>,
}

impl ResolvedConfig {
    /// The language's reserved words plus the configured extras.
    #[must_use]
    pub fn reserved_words(&self) -> ReservedWords {
        ReservedWords::for_lang(self.language).with_extra(self.extra_reserved_words.iter().cloned())
    }
}

fn default_language() -> String { "c".to_string() }
fn default_num_variants() -> usize { 1 }
fn default_strategy_order() -> Vec<StrategyEntry> { vec![StrategyEntry::from("redundant_code")] }
const fn default_true() -> bool { true }
const fn default_repeat() -> u32 { 1 }

// src/config/mod.rs
pub mod io;
pub mod types;

pub use self::types::{AdversaToml, GeneratorConfig, ResolvedConfig, StrategyEntry};
use crate::error::{AdversaError, Result};
use crate::lang::Lang;
use crate::types::{MutationKind, MutationParams, MutationSpec};

/// Upper bound for the automatic worker count.
pub const MAX_DEFAULT_WORKERS: usize = 8;

impl GeneratorConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `adversa.toml` from the working directory, if any.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        io::load_local()
    }

    /// Validates every field and resolves names to typed values.
    ///
    /// # Errors
    /// `UnsupportedLanguage`, `UnsupportedMutationKind` or `InvalidConfig`.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let language = Lang::from_name(&self.language)?;
        if self.num_variants == 0 {
            return Err(AdversaError::InvalidConfig(
                "num_variants must be a positive integer".into(),
            ));
        }
        if self.strategy_order.is_empty() {
            return Err(AdversaError::InvalidConfig(
                "strategy_order must name at least one mutation".into(),
            ));
        }
        let strategy_order = self
            .strategy_order
            .iter()
            .map(StrategyEntry::to_spec)
            .collect::<Result<Vec<_>>>()?;
        if let Some(bad) = self
            .extra_reserved_words
            .iter()
            .find(|w| w.is_empty() || w.chars().any(char::is_whitespace))
        {
            return Err(AdversaError::InvalidConfig(format!(
                "extra_reserved_words: '{bad}' is not an identifier"
            )));
        }

        Ok(ResolvedConfig {
            language,
            num_variants: self.num_variants,
            strategy_order,
            seed: self.seed,
            workers: effective_workers(self.workers),
            preserve_order: self.preserve_order,
            extra_reserved_words: self.extra_reserved_words.clone(),
        })
    }
}

impl StrategyEntry {
    /// # Errors
    /// `UnsupportedMutationKind` for unknown names, `InvalidConfig` for `repeat = 0`.
    pub fn to_spec(&self) -> Result<MutationSpec> {
        match self {
            Self::Name(name) => Ok(MutationSpec::new(MutationKind::from_name(name)?)),
            Self::Detailed { kind, strict, repeat } => {
                if *repeat == 0 {
                    return Err(AdversaError::InvalidConfig(format!(
                        "strategy '{kind}': repeat must be at least 1"
                    )));
                }
                Ok(MutationSpec {
                    kind: MutationKind::from_name(kind)?,
                    parameters: MutationParams {
                        strict: *strict,
                        repeat: *repeat,
                    },
                })
            }
        }
    }
}

fn effective_workers(requested: usize) -> usize {
    if requested > 0 {
        return requested;
    }
    std::thread::available_parallelism()
        .map_or(1, std::num::NonZeroUsize::get)
        .min(MAX_DEFAULT_WORKERS)
}

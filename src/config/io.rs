// src/config/io.rs
use super::types::{AdversaToml, GeneratorConfig};
use crate::error::{AdversaError, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

pub const CONFIG_FILE: &str = "adversa.toml";

/// Loads `adversa.toml` from the working directory, falling back to defaults.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_local() -> Result<GeneratorConfig> {
    let path = Path::new(CONFIG_FILE);
    if !path.exists() {
        return Ok(GeneratorConfig::default());
    }
    load_from(path)
}

/// # Errors
/// `Io` if the file cannot be read, `Toml` if it is not valid.
pub fn load_from(path: &Path) -> Result<GeneratorConfig> {
    let content = fs::read_to_string(path).map_err(|source| AdversaError::Io {
        source,
        path: path.to_path_buf(),
    })?;
    let config = parse_toml(&content)?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// # Errors
/// `Toml` if `content` is not a valid config document.
pub fn parse_toml(content: &str) -> Result<GeneratorConfig> {
    let parsed: AdversaToml = toml::from_str(content)?;
    Ok(parsed.generate)
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::StrategyEntry;

    #[test]
    fn test_parse_mixed_strategy_entries() {
        let content = r#"
[generate]
language = "java"
num_variants = 3
seed = 42
strategy_order = ["dead_code", { kind = "rename", strict = true }]
extra_reserved_words = ["counter"]
"#;
        let config = parse_toml(content).expect("parse");
        assert_eq!(config.language, "java");
        assert_eq!(config.num_variants, 3);
        assert_eq!(config.seed, 42);
        assert_eq!(config.strategy_order[0], StrategyEntry::from("dead_code"));
        assert_eq!(
            config.strategy_order[1],
            StrategyEntry::Detailed {
                kind: "rename".into(),
                strict: true,
                repeat: 1
            }
        );
        assert!(config.preserve_order);
        assert_eq!(config.extra_reserved_words, vec!["counter"]);
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(parse_toml("").expect("parse"), GeneratorConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[generate]\nworkers = 2\n").expect("write");
        let config = load_from(&path).expect("load");
        assert_eq!(config.workers, 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_from(Path::new("/nonexistent/adversa.toml")).expect_err("missing");
        assert_eq!(err.category(), "io");
    }

    #[test]
    fn test_bad_toml_is_toml_error() {
        let err = parse_toml("[generate\n").expect_err("bad toml");
        assert_eq!(err.category(), "toml");
    }
}

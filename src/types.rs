// src/types.rs
//! Core data model: source units, mutation specs, variants, dataset rows.

use crate::error::{AdversaError, Result};
use crate::lang::Lang;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One code sample read from the dataset. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceUnit {
    pub id: u64,
    pub language: Lang,
    pub raw_code: String,
    pub label: serde_json::Value,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    DeadCode,
    RedundantCode,
    Rename,
    Reorder,
    Comment,
    ExpressionRewrite,
}

impl MutationKind {
    pub const ALL: [Self; 6] = [
        Self::DeadCode,
        Self::RedundantCode,
        Self::Rename,
        Self::Reorder,
        Self::Comment,
        Self::ExpressionRewrite,
    ];

    /// Resolves a configured kind name, accepting the legacy aliases.
    ///
    /// # Errors
    /// Returns `UnsupportedMutationKind` for unknown names.
    pub fn from_name(name: &str) -> Result<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized || kind.aliases().contains(&normalized.as_str()))
            .ok_or_else(|| AdversaError::UnsupportedMutationKind(name.to_string()))
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::DeadCode => "dead_code",
            Self::RedundantCode => "redundant_code",
            Self::Rename => "rename",
            Self::Reorder => "reorder",
            Self::Comment => "comment",
            Self::ExpressionRewrite => "expression_rewrite",
        }
    }

    #[must_use]
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::DeadCode => &["insert_dead_code", "dead_code_in_main"],
            Self::RedundantCode => &["inject_redundant_code", "redundant"],
            Self::Rename => &["rename_variables", "obfuscate_identifiers"],
            Self::Reorder => &["reorder_statements"],
            Self::Comment => &["add_comments", "comments"],
            Self::ExpressionRewrite => &[
                "transform_expressions",
                "replace_equivalent_expressions",
                "expression",
            ],
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationParams {
    /// Escalate a missing region to a failed variant instead of a no-op.
    #[serde(default)]
    pub strict: bool,
    /// Applications of the strategy within a single step.
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

const fn default_repeat() -> u32 {
    1
}

impl Default for MutationParams {
    fn default() -> Self {
        Self {
            strict: false,
            repeat: default_repeat(),
        }
    }
}

/// Declarative description of one transformation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationSpec {
    pub kind: MutationKind,
    #[serde(default)]
    pub parameters: MutationParams,
}

impl MutationSpec {
    #[must_use]
    pub fn new(kind: MutationKind) -> Self {
        Self {
            kind,
            parameters: MutationParams::default(),
        }
    }

    #[must_use]
    pub fn strict(mut self) -> Self {
        self.parameters.strict = true;
        self
    }
}

/// Why a variant was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReason {
    pub step: usize,
    pub kind: MutationKind,
    pub category: &'static str,
    pub message: String,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {} ({}): {} [{}]",
            self.step, self.kind, self.message, self.category
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum VariantStatus {
    Success,
    Failed(FailureReason),
}

/// One generated copy of a source unit, with provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variant {
    pub source_unit_id: u64,
    pub mutated_code: String,
    pub applied_mutations: Vec<MutationSpec>,
    pub is_adversarial: bool,
    pub status: VariantStatus,
}

impl Variant {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == VariantStatus::Success
    }
}

/// One dataset row. Unknown columns ride along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    pub code: String,
    pub label: serde_json::Value,
    pub language: String,
    #[serde(default)]
    pub is_adversarial: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DatasetRow {
    #[must_use]
    pub fn new(code: &str, label: serde_json::Value, language: Lang) -> Self {
        Self {
            code: code.to_string(),
            label,
            language: language.name().to_string(),
            is_adversarial: false,
            extra: serde_json::Map::new(),
        }
    }

    /// Builds the engine's read-only view of this row.
    ///
    /// # Errors
    /// Returns `UnsupportedLanguage` if the row's language has no backend.
    pub fn to_source_unit(&self, id: u64) -> Result<SourceUnit> {
        Ok(SourceUnit {
            id,
            language: Lang::from_name(&self.language)?,
            raw_code: self.code.clone(),
            label: self.label.clone(),
            metadata: self.extra.clone(),
        })
    }

    /// Row for a successful variant of `unit`, preserving label and metadata.
    #[must_use]
    pub fn from_variant(unit: &SourceUnit, variant: &Variant) -> Self {
        Self {
            code: variant.mutated_code.clone(),
            label: unit.label.clone(),
            language: unit.language.name().to_string(),
            is_adversarial: variant.is_adversarial,
            extra: unit.metadata.clone(),
        }
    }
}

/// Ordered rows: originals first, variants appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub rows: Vec<DatasetRow>,
}

impl Dataset {
    #[must_use]
    pub fn new(rows: Vec<DatasetRow>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn adversarial_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_adversarial).count()
    }
}

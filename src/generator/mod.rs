// src/generator/mod.rs
//! Batch variant generation over a dataset.
//!
//! Samples run in parallel on a dedicated rayon pool. Each variant draws from
//! its own `StdRng` seeded by `(seed, sample_id, variant_index)`, so output is
//! reproducible regardless of scheduling. Per-sample failures are logged and
//! counted; only configuration errors abort the batch.

pub mod report;

pub use self::report::BatchReport;
use crate::config::{GeneratorConfig, ResolvedConfig};
use crate::error::{AdversaError, Result};
use crate::pipeline::Pipeline;
use crate::types::{Dataset, DatasetRow, SourceUnit, Variant, VariantStatus};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Stops scheduling new samples once cancelled. In-flight samples finish.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Seed for one variant of one sample (splitmix64 over the three inputs).
#[must_use]
pub fn derive_seed(base: u64, sample_id: u64, variant_index: u64) -> u64 {
    let mut state = base;
    for word in [sample_id, variant_index] {
        state = splitmix64(state ^ splitmix64(word));
    }
    state
}

fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Result of a batch: the augmented dataset plus its accounting.
#[derive(Debug, Clone)]
pub struct Generation {
    pub dataset: Dataset,
    pub report: BatchReport,
}

#[derive(Debug)]
enum SampleOutcome {
    Skipped,
    Cancelled,
    Processed { unit: SourceUnit, variants: Vec<Variant> },
}

pub struct VariantGenerator {
    config: ResolvedConfig,
    pipeline: Pipeline,
    cancel: CancelToken,
}

impl VariantGenerator {
    /// Validates `config` before any row is touched.
    ///
    /// # Errors
    /// Any configuration error from [`GeneratorConfig::resolve`].
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        Self::from_resolved(config.resolve()?)
    }

    /// # Errors
    /// Returns an error if the language backend cannot be built.
    pub fn from_resolved(config: ResolvedConfig) -> Result<Self> {
        let pipeline =
            Pipeline::with_reserved(config.language, &config.strategy_order, config.reserved_words())?;
        Ok(Self {
            config,
            pipeline,
            cancel: CancelToken::new(),
        })
    }

    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Runs the pipeline `num_variants` times on one sample.
    #[must_use]
    pub fn variants_for(&self, unit: &SourceUnit) -> Vec<Variant> {
        (0..self.config.num_variants as u64)
            .map(|index| {
                let mut rng = StdRng::seed_from_u64(derive_seed(self.config.seed, unit.id, index));
                let variant = self.pipeline.run(unit, &mut rng);
                if let VariantStatus::Failed(reason) = &variant.status {
                    warn!(
                        sample = unit.id,
                        variant = index,
                        step = reason.step,
                        %reason,
                        "variant dropped"
                    );
                }
                variant
            })
            .collect()
    }

    /// Original rows first, then every successful variant.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the worker pool cannot be started.
    pub fn generate(&self, dataset: &Dataset) -> Result<Generation> {
        info!(
            rows = dataset.len(),
            variants = self.config.num_variants,
            workers = self.config.workers,
            language = %self.config.language,
            "generation started"
        );
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()
            .map_err(|e| AdversaError::InvalidConfig(format!("worker pool: {e}")))?;

        let outcomes: Vec<SampleOutcome> = pool.install(|| {
            if self.config.preserve_order {
                dataset
                    .rows
                    .par_iter()
                    .enumerate()
                    .map(|(idx, row)| self.process(idx, row))
                    .collect()
            } else {
                let sink = Mutex::new(Vec::with_capacity(dataset.len()));
                dataset.rows.par_iter().enumerate().for_each(|(idx, row)| {
                    let outcome = self.process(idx, row);
                    if let Ok(mut done) = sink.lock() {
                        done.push(outcome);
                    }
                });
                sink.into_inner().unwrap_or_else(std::sync::PoisonError::into_inner)
            }
        });

        let mut report = BatchReport::new(dataset.len());
        let mut rows: Vec<DatasetRow> = dataset
            .rows
            .iter()
            .cloned()
            .map(|mut row| {
                row.is_adversarial = false;
                row
            })
            .collect();

        for outcome in outcomes {
            match outcome {
                SampleOutcome::Skipped => report.skipped_rows += 1,
                SampleOutcome::Cancelled => report.cancelled_rows += 1,
                SampleOutcome::Processed { unit, variants } => {
                    for variant in &variants {
                        report.record(variant);
                        if variant.is_success() {
                            rows.push(DatasetRow::from_variant(&unit, variant));
                        }
                    }
                }
            }
        }

        info!(
            successful = report.successful_variants,
            failed = report.failed_variants,
            skipped = report.skipped_rows,
            cancelled = report.cancelled_rows,
            "generation finished"
        );
        Ok(Generation {
            dataset: Dataset::new(rows),
            report,
        })
    }

    fn process(&self, idx: usize, row: &DatasetRow) -> SampleOutcome {
        if self.cancel.is_cancelled() {
            return SampleOutcome::Cancelled;
        }
        let unit = match row.to_source_unit(idx as u64) {
            Ok(unit) if unit.language == self.config.language => unit,
            Ok(unit) => {
                warn!(sample = idx, language = %unit.language, "row language differs from configured language, skipped");
                return SampleOutcome::Skipped;
            }
            Err(err) => {
                warn!(sample = idx, %err, "row skipped");
                return SampleOutcome::Skipped;
            }
        };
        let variants = self.variants_for(&unit);
        SampleOutcome::Processed { unit, variants }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::lang::Lang;
    use crate::types::MutationKind;
    use serde_json::json;

    fn config(kinds: &[&str], variants: usize) -> GeneratorConfig {
        GeneratorConfig {
            language: "c".into(),
            num_variants: variants,
            strategy_order: kinds.iter().map(|k| (*k).into()).collect(),
            seed: 7,
            workers: 2,
            preserve_order: true,
            extra_reserved_words: Vec::new(),
        }
    }

    fn dataset(codes: &[&str]) -> Dataset {
        Dataset::new(
            codes
                .iter()
                .enumerate()
                .map(|(i, c)| DatasetRow::new(c, json!(i), Lang::C))
                .collect(),
        )
    }

    #[test]
    fn test_derive_seed_separates_inputs() {
        assert_eq!(derive_seed(1, 2, 3), derive_seed(1, 2, 3));
        assert_ne!(derive_seed(1, 2, 3), derive_seed(1, 3, 2));
        assert_ne!(derive_seed(1, 2, 3), derive_seed(2, 2, 3));
        assert_ne!(derive_seed(0, 0, 0), derive_seed(0, 0, 1));
    }

    #[test]
    fn test_variants_are_tagged_and_labelled() {
        let generator = VariantGenerator::new(&config(&["dead_code"], 2)).expect("config");
        let out = generator
            .generate(&dataset(&["int main() { return 0; }"]))
            .expect("generate");
        assert_eq!(out.dataset.len(), 3);
        assert!(!out.dataset.rows[0].is_adversarial);
        for row in &out.dataset.rows[1..] {
            assert!(row.is_adversarial);
            assert_eq!(row.label, json!(0));
            assert_eq!(row.language, "c");
        }
    }

    #[test]
    fn test_language_mismatch_is_skipped() {
        let generator = VariantGenerator::new(&config(&["comment"], 1)).expect("config");
        let mut data = dataset(&["int x;"]);
        data.rows.push(DatasetRow::new("class A {}", json!(1), Lang::Java));
        let out = generator.generate(&data).expect("generate");
        assert_eq!(out.report.skipped_rows, 1);
        assert_eq!(out.report.successful_variants, 1);
        assert_eq!(out.dataset.len(), 3);
    }

    #[test]
    fn test_cancelled_batch_keeps_originals() {
        let token = CancelToken::new();
        token.cancel();
        let generator = VariantGenerator::new(&config(&["comment"], 1))
            .expect("config")
            .with_cancel_token(token);
        let out = generator.generate(&dataset(&["int x;", "int y;"])).expect("generate");
        assert_eq!(out.dataset.len(), 2);
        assert_eq!(out.report.cancelled_rows, 2);
    }

    #[test]
    fn test_output_is_reproducible() {
        let data = dataset(&[
            "int main() { int a = 1; int b = 2; return a + b; }",
            "int f(int p) { int q = p; return q; }",
        ]);
        let mut cfg = config(&["rename", "reorder", "expression_rewrite"], 3);
        let first = VariantGenerator::new(&cfg).expect("config").generate(&data).expect("run");
        cfg.workers = 1;
        let second = VariantGenerator::new(&cfg).expect("config").generate(&data).expect("run");
        assert_eq!(first.dataset, second.dataset);
    }

    #[test]
    fn test_unordered_collects_everything() {
        let mut cfg = config(&["comment"], 2);
        cfg.preserve_order = false;
        let out = VariantGenerator::new(&cfg)
            .expect("config")
            .generate(&dataset(&["int a;", "int b;", "int c;"]))
            .expect("generate");
        assert_eq!(out.dataset.len(), 9);
        assert_eq!(out.dataset.adversarial_count(), 6);
    }

    #[test]
    fn test_strategy_order_reaches_pipeline() {
        let generator = VariantGenerator::new(&config(&["add_comments", "dead_code"], 1)).expect("config");
        let kinds: Vec<MutationKind> = generator.config().strategy_order.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![MutationKind::Comment, MutationKind::DeadCode]);
    }
}

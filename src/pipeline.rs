// src/pipeline.rs
//! Ordered composition of strategies into one variant-generation pass.
//!
//! Per sample: `Pending -> Transforming(0..n) -> Success | Failed(reason)`.
//! The first structural error ends the pass; later steps never run and the
//! variant carries the failing step's reason. A missing region is a no-op
//! for the step unless the step is strict.

use crate::error::{AdversaError, Result};
use crate::lang::{Lang, ReservedWords};
use crate::matcher::{self, StructuralMatcher};
use crate::mutate::{strategy_for, MutationContext, MutationStrategy};
use crate::types::{FailureReason, MutationSpec, SourceUnit, Variant, VariantStatus};
use rand::rngs::StdRng;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Pending,
    Transforming(usize),
    Success,
    Failed(FailureReason),
}

pub struct Pipeline {
    lang: Lang,
    reserved: ReservedWords,
    matcher: Box<dyn StructuralMatcher>,
    steps: Vec<(MutationSpec, Box<dyn MutationStrategy>)>,
}

impl Pipeline {
    /// # Errors
    /// Returns `InvalidConfig` for an empty step list, or a backend
    /// construction error.
    pub fn new(lang: Lang, specs: &[MutationSpec]) -> Result<Self> {
        Self::with_reserved(lang, specs, ReservedWords::for_lang(lang))
    }

    /// Like [`Pipeline::new`]; identifiers in `reserved` are never renamed.
    ///
    /// # Errors
    /// Returns `InvalidConfig` for an empty step list, or a backend
    /// construction error.
    pub fn with_reserved(lang: Lang, specs: &[MutationSpec], reserved: ReservedWords) -> Result<Self> {
        if specs.is_empty() {
            return Err(AdversaError::InvalidConfig(
                "strategy order must name at least one mutation".into(),
            ));
        }
        Ok(Self {
            lang,
            matcher: matcher::for_lang_with(lang, &reserved)?,
            reserved,
            steps: specs.iter().map(|s| (*s, strategy_for(s.kind))).collect(),
        })
    }

    /// Produces one variant of `unit`. Never panics on bad input.
    pub fn run(&self, unit: &SourceUnit, rng: &mut StdRng) -> Variant {
        self.run_traced(unit, rng).0
    }

    /// Like [`Pipeline::run`], also returning every state the sample passed through.
    pub fn run_traced(&self, unit: &SourceUnit, rng: &mut StdRng) -> (Variant, Vec<PipelineState>) {
        let mut states = vec![PipelineState::Pending];
        let mut code = unit.raw_code.clone();
        let mut applied = Vec::with_capacity(self.steps.len());

        for (step, (spec, strategy)) in self.steps.iter().enumerate() {
            states.push(PipelineState::Transforming(step));
            trace!(sample = unit.id, step, kind = %spec.kind, "transforming");
            applied.push(*spec);

            let outcome = if step == 0 {
                self.matcher.validate(&code).and_then(|()| self.apply_step(spec, strategy.as_ref(), &code, rng))
            } else {
                self.apply_step(spec, strategy.as_ref(), &code, rng)
            };

            match outcome {
                Ok(next) => code = next,
                Err(err) => {
                    let reason = FailureReason {
                        step,
                        kind: spec.kind,
                        category: err.category(),
                        message: err.to_string(),
                    };
                    debug!(sample = unit.id, %reason, "variant failed");
                    states.push(PipelineState::Failed(reason.clone()));
                    let variant = Variant {
                        source_unit_id: unit.id,
                        mutated_code: String::new(),
                        applied_mutations: applied,
                        is_adversarial: true,
                        status: VariantStatus::Failed(reason),
                    };
                    return (variant, states);
                }
            }
        }

        states.push(PipelineState::Success);
        let variant = Variant {
            source_unit_id: unit.id,
            mutated_code: code,
            applied_mutations: applied,
            is_adversarial: true,
            status: VariantStatus::Success,
        };
        (variant, states)
    }

    fn apply_step(
        &self,
        spec: &MutationSpec,
        strategy: &dyn MutationStrategy,
        source: &str,
        rng: &mut StdRng,
    ) -> Result<String> {
        let mut code = source.to_string();
        for _ in 0..spec.parameters.repeat.max(1) {
            let mut ctx = MutationContext {
                lang: self.lang,
                matcher: self.matcher.as_ref(),
                reserved: &self.reserved,
                rng,
                params: spec.parameters,
            };
            match strategy.apply(&code, &mut ctx) {
                Ok(next) => code = next,
                Err(AdversaError::RegionNotFound(what)) if !spec.parameters.strict => {
                    trace!(kind = %spec.kind, %what, "region not found, step is a no-op");
                    break;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(code)
    }
}

// src/generator/report.rs
//! Batch accounting and its terminal/JSON renderings.

use crate::types::{FailureReason, Variant, VariantStatus};
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub original_rows: usize,
    pub successful_variants: usize,
    pub failed_variants: usize,
    pub skipped_rows: usize,
    pub cancelled_rows: usize,
    /// Failed variants keyed by error category.
    pub failure_reasons: BTreeMap<String, usize>,
}

impl BatchReport {
    #[must_use]
    pub fn new(original_rows: usize) -> Self {
        Self {
            original_rows,
            ..Self::default()
        }
    }

    pub fn record(&mut self, variant: &Variant) {
        match &variant.status {
            VariantStatus::Success => self.successful_variants += 1,
            VariantStatus::Failed(reason) => {
                self.failed_variants += 1;
                *self
                    .failure_reasons
                    .entry(reason.category.to_string())
                    .or_insert(0) += 1;
            }
        }
    }

    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.original_rows + self.successful_variants
    }
}

/// Formats the final batch summary.
#[must_use]
pub fn format_summary(report: &BatchReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "═".repeat(60));
    let _ = writeln!(out, "{}", "ADVERSARIAL GENERATION COMPLETE".bold());
    let _ = writeln!(out, "{}", "═".repeat(60));
    let _ = writeln!(out);
    let _ = writeln!(out, "  Original rows:    {}", report.original_rows);
    let _ = writeln!(out, "  Variants added:   {} ✓", report.successful_variants.to_string().green());
    let _ = writeln!(out, "  Variants failed:  {}", format_failed(report.failed_variants));
    if report.skipped_rows > 0 {
        let _ = writeln!(out, "  Rows skipped:     {}", report.skipped_rows.to_string().yellow());
    }
    if report.cancelled_rows > 0 {
        let _ = writeln!(out, "  Rows cancelled:   {}", report.cancelled_rows.to_string().yellow());
    }
    let _ = writeln!(out, "  Output rows:      {}", report.total_rows().to_string().bold());
    let _ = writeln!(out);

    if !report.failure_reasons.is_empty() {
        let _ = writeln!(out, "{}", "FAILURE REASONS".yellow().bold());
        let _ = writeln!(out, "{}", "─".repeat(60));
        for (category, count) in &report.failure_reasons {
            let _ = writeln!(out, "  {:<28} {count}", category.cyan());
        }
        let _ = writeln!(out);
    }

    out
}

fn format_failed(count: usize) -> colored::ColoredString {
    if count == 0 {
        count.to_string().green()
    } else {
        count.to_string().red()
    }
}

/// One-line rendering of a dropped variant.
#[must_use]
pub fn format_failure(reason: &FailureReason) -> String {
    format!(
        "{} step {} ({}): {}",
        "FAILED".red().bold(),
        reason.step,
        reason.kind.to_string().cyan(),
        reason.message
    )
}

/// Formats the report as JSON for machine consumption.
#[must_use]
pub fn format_json(report: &BatchReport) -> String {
    let output = serde_json::json!({
        "original_rows": report.original_rows,
        "successful_variants": report.successful_variants,
        "failed_variants": report.failed_variants,
        "skipped_rows": report.skipped_rows,
        "cancelled_rows": report.cancelled_rows,
        "output_rows": report.total_rows(),
        "failure_reasons": report.failure_reasons,
    });
    serde_json::to_string_pretty(&output).unwrap_or_default()
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "adversa", version, about = "Adversarial variant generator for code datasets")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    /// Log pipeline steps (overridden by `RUST_LOG`)
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Augment a JSON Lines dataset with adversarial variants
    Generate {
        /// Input dataset (one JSON object per line)
        #[arg(long, short, value_name = "FILE")]
        input: PathBuf,
        /// Output dataset: original rows followed by variants
        #[arg(long, short, value_name = "FILE")]
        output: PathBuf,
        /// Config file (defaults to ./adversa.toml when present)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        #[arg(long, short)]
        language: Option<String>,
        /// Variants per row
        #[arg(long = "variants", short = 'n')]
        num_variants: Option<usize>,
        /// Strategy to apply, in order (repeatable)
        #[arg(long = "strategy", short = 's', value_name = "KIND")]
        strategies: Vec<String>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, short)]
        workers: Option<usize>,
        /// Identifier that must never be renamed (repeatable)
        #[arg(long, value_name = "WORD")]
        reserve: Vec<String>,
        /// Emit rows in completion order
        #[arg(long)]
        unordered: bool,
        /// Print the batch report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the pipeline once on a single source file
    Mutate {
        /// Source language (inferred from the file extension when omitted)
        #[arg(long, short)]
        language: Option<String>,
        #[arg(long, short, value_name = "FILE")]
        file: PathBuf,
        #[arg(long = "strategy", short = 's', value_name = "KIND", required = true)]
        strategies: Vec<String>,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Fail when a strategy finds nothing to transform
        #[arg(long)]
        strict: bool,
        /// Identifier that must never be renamed (repeatable)
        #[arg(long, value_name = "WORD")]
        reserve: Vec<String>,
    },
    /// List mutation kinds and their accepted aliases
    Strategies,
}

//! Command dispatch logic extracted from binary to reduce main function size.

use super::args::Commands;
use super::generate_handler::{handle_generate, GenerateOptions};
use super::mutate_handler::{handle_mutate, handle_strategies, MutateOptions};
use crate::exit::AdversaExit;
use anyhow::Result;

/// Executes the parsed command.
///
/// # Errors
/// Returns error if the command handler fails.
pub fn execute(command: Commands) -> Result<AdversaExit> {
    match command {
        Commands::Generate {
            input,
            output,
            config,
            language,
            num_variants,
            strategies,
            seed,
            workers,
            reserve,
            unordered,
            json,
        } => handle_generate(&GenerateOptions {
            input,
            output,
            config,
            language,
            num_variants,
            strategies,
            seed,
            workers,
            reserve,
            unordered,
            json,
        }),
        Commands::Mutate {
            language,
            file,
            strategies,
            seed,
            strict,
            reserve,
        } => handle_mutate(&MutateOptions {
            language,
            file,
            strategies,
            seed,
            strict,
            reserve,
        }),
        Commands::Strategies => Ok(handle_strategies()),
    }
}

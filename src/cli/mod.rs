// src/cli/mod.rs
//! CLI command handlers.

pub mod args;
pub mod dispatch;
pub mod generate_handler;
pub mod mutate_handler;

pub use args::Cli;

pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod exit;
pub mod generator;
pub mod lang;
pub mod matcher;
pub mod mutate;
pub mod noise;
pub mod pipeline;
pub mod rename;
pub mod types;

pub use error::{AdversaError, Result};

//! Command-line interface module.

mod args;
pub mod build;
pub mod resolve;
pub mod tags;

pub use args::{BuildArgs, Cli, Commands};

//! Configuration loading and CLI overrides

pub mod settings;

pub use settings::{CliOverrides, OutputConfig, OutputFormat, Settings, SolverConfig};

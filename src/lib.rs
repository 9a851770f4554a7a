//! Forced-value deduction for finite-domain CSPs
//!
//! This crate reads a CSP in a small textual grammar, hands it to an
//! external SAT-based solver executable, and either reports one solution or
//! proves which designated answer-key variables are forced to the same value
//! in every satisfying assignment.

pub mod config;
pub mod deduce;
pub mod model;
pub mod report;
pub mod runner;
pub mod solver;

pub use config::Settings;
pub use report::ReportFormatter;
pub use runner::{RunReport, Runner};

use anyhow::Result;
use solver::ProcessBackend;
use std::io::BufRead;

/// Solve one problem stream against the configured external solver
pub fn solve_problem<R: BufRead>(settings: Settings, input: R) -> Result<RunReport> {
    let backend = ProcessBackend::from_config(&settings.solver);
    let mut runner = Runner::new(settings, backend);
    runner.run(input)
}

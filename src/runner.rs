//! Run orchestration
//!
//! Sequences one request: load the problem, ask the backend for a first
//! solution, then either report it directly (answer-finder mode) or hand
//! control to the refutation engine (deduction mode).

use crate::config::Settings;
use crate::deduce::{Binding, RefutationEngine};
use crate::model::{load_problem, ProblemModel, VarKind};
use crate::solver::{SolveOutcome, SolvingBackend};
use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use std::io::BufRead;

/// Answer-finder result: the first assignment, or unsatisfiability
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerReport {
    pub satisfiable: bool,
    pub values: Vec<Binding>,
}

/// Deduction result: the forced answer keys, or initial unsatisfiability
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeductionReport {
    pub satisfiable: bool,
    pub forced: Vec<Binding>,
    pub iterations: usize,
}

/// What one run produced, by mode
#[derive(Debug, Clone, PartialEq)]
pub enum RunReport {
    Answer(AnswerReport),
    Deduction(DeductionReport),
}

/// Orchestrates a single solve-or-deduce request over one backend
pub struct Runner<B: SolvingBackend> {
    settings: Settings,
    backend: B,
}

impl<B: SolvingBackend> Runner<B> {
    pub fn new(settings: Settings, backend: B) -> Self {
        Self { settings, backend }
    }

    /// Process one input stream to completion
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<RunReport> {
        let loaded = load_problem(input).context("Failed to load CSP input")?;
        let mut model = loaded.model;

        let first = self
            .backend
            .solve(&model)
            .context("Initial solve failed")?;

        match loaded.answer_keys {
            None => {
                debug!("answer-finder mode");
                Ok(RunReport::Answer(answer_report(&model, first)?))
            }
            Some(keys) => {
                debug!("deduction mode with {} answer keys", keys.len());
                let report = match first {
                    SolveOutcome::Unsatisfiable => DeductionReport {
                        satisfiable: false,
                        forced: Vec::new(),
                        iterations: 0,
                    },
                    SolveOutcome::Satisfiable(assignment) => {
                        let timeout = self.settings.solver.timeout_seconds;
                        let deduction = RefutationEngine::new(
                            &mut model,
                            &mut self.backend,
                            &assignment,
                            Some(timeout),
                        )
                        .and_then(|engine| engine.run())
                        .context("Deduction failed")?;
                        DeductionReport {
                            satisfiable: true,
                            forced: deduction.forced,
                            iterations: deduction.iterations,
                        }
                    }
                };
                Ok(RunReport::Deduction(report))
            }
        }
    }
}

fn answer_report(model: &ProblemModel, outcome: SolveOutcome) -> Result<AnswerReport> {
    match outcome {
        SolveOutcome::Unsatisfiable => Ok(AnswerReport {
            satisfiable: false,
            values: Vec::new(),
        }),
        SolveOutcome::Satisfiable(assignment) => {
            let mut values = Vec::new();
            for kind in [VarKind::Int, VarKind::Bool] {
                for variable in model.variables(kind) {
                    let value = assignment.value(variable).with_context(|| {
                        format!("Backend assigned no value to `{}`", variable.name)
                    })?;
                    values.push(Binding::new(variable.name.clone(), value));
                }
            }
            Ok(AnswerReport {
                satisfiable: true,
                values,
            })
        }
    }
}

//! Solving backend interface
//!
//! The backend owns CSP propagation, SAT encoding, and the SAT procedure
//! itself; this crate only hands it a model and reads back a verdict. The
//! trait seam keeps the deduction engine testable against in-memory fakes.

pub mod process;

pub use process::ProcessBackend;

use crate::model::{ProblemModel, Value, VarKind, Variable};
use std::collections::HashMap;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("failed to stage problem for the solver")]
    Stage(#[source] std::io::Error),
    #[error("failed to launch solver `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed waiting for the solver to finish")]
    Wait(#[source] std::io::Error),
    #[error("solver exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
    #[error("unexpected solver output: {0}")]
    MalformedOutput(String),
    #[error("solver reported no value for {kind} variable `{name}`")]
    MissingAssignment { kind: VarKind, name: String },
}

/// Verdict of one backend invocation
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    Unsatisfiable,
    Satisfiable(Assignment),
}

impl SolveOutcome {
    pub fn is_satisfiable(&self) -> bool {
        matches!(self, SolveOutcome::Satisfiable(_))
    }
}

/// A concrete value for every variable, kind-partitioned so that an integer
/// and a boolean variable with the same name never collide
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignment {
    ints: HashMap<String, i64>,
    bools: HashMap<String, bool>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_int(&mut self, name: impl Into<String>, value: i64) {
        self.ints.insert(name.into(), value);
    }

    pub fn set_bool(&mut self, name: impl Into<String>, value: bool) {
        self.bools.insert(name.into(), value);
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.ints.get(name).copied()
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.bools.get(name).copied()
    }

    /// The value recorded for a declared variable, if any
    pub fn value(&self, variable: &Variable) -> Option<Value> {
        match variable.kind {
            VarKind::Int => self.int(&variable.name).map(Value::Int),
            VarKind::Bool => self.bool(&variable.name).map(Value::Bool),
        }
    }

    pub fn len(&self) -> usize {
        self.ints.len() + self.bools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ints.is_empty() && self.bools.is_empty()
    }
}

/// Converts a model into SAT form, runs a solver, and decodes the result.
/// Each invocation blocks until a verdict is available and yields a fresh
/// assignment on the satisfiable path.
pub trait SolvingBackend {
    fn solve(&mut self, model: &ProblemModel) -> Result<SolveOutcome, SolverError>;
}

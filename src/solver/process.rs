//! File-and-process transport to an external CSP solver executable
//!
//! Each invocation stages the rendered model into a fresh temporary file,
//! passes its path to the configured command, and waits for completion. The
//! temporary file is removed on every exit path. Expected output is the
//! sugar answer format: a verdict line containing `SATISFIABLE` or
//! `UNSATISFIABLE`, then one `a <name>\t<value>` line per variable and a
//! terminating bare `a`. Lines starting with `c` are comments.

use super::{Assignment, SolveOutcome, SolverError, SolvingBackend};
use crate::config::SolverConfig;
use crate::model::{ProblemModel, VarKind};
use log::{debug, trace};
use std::io::Write;
use std::process::{Command, Stdio};

/// Backend that shells out to a sugar-style CSP solver
pub struct ProcessBackend {
    command: String,
    args: Vec<String>,
}

impl ProcessBackend {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
    }

    fn stage_model(&self, model: &ProblemModel) -> Result<tempfile::NamedTempFile, SolverError> {
        let mut file = tempfile::Builder::new()
            .prefix("csp_deduce")
            .suffix(".csp")
            .tempfile()
            .map_err(SolverError::Stage)?;
        file.write_all(model.render().as_bytes())
            .map_err(SolverError::Stage)?;
        file.flush().map_err(SolverError::Stage)?;
        Ok(file)
    }
}

impl SolvingBackend for ProcessBackend {
    fn solve(&mut self, model: &ProblemModel) -> Result<SolveOutcome, SolverError> {
        let staged = self.stage_model(model)?;
        debug!(
            "invoking solver `{}` on {} ({} terms)",
            self.command,
            staged.path().display(),
            model.terms().len()
        );

        let child = Command::new(&self.command)
            .args(&self.args)
            .arg(staged.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SolverError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        let output = child.wait_with_output().map_err(SolverError::Wait)?;
        if !output.status.success() {
            return Err(SolverError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        trace!("solver output: {} bytes", stdout.len());
        parse_output(&stdout, model)
    }
}

/// Decode sugar-style solver output against the declared variables
pub fn parse_output(stdout: &str, model: &ProblemModel) -> Result<SolveOutcome, SolverError> {
    let mut lines = stdout
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty() && *line != "c" && !line.starts_with("c "));

    let verdict = lines
        .next()
        .ok_or_else(|| SolverError::MalformedOutput("empty output".to_string()))?;

    if verdict.contains("UNSATISFIABLE") {
        return Ok(SolveOutcome::Unsatisfiable);
    }
    if !verdict.contains("SATISFIABLE") {
        return Err(SolverError::MalformedOutput(format!(
            "unrecognized verdict line `{}`",
            verdict
        )));
    }

    let mut assignment = Assignment::new();
    for line in lines {
        if line == "a" {
            break;
        }
        let binding = line.strip_prefix("a ").ok_or_else(|| {
            SolverError::MalformedOutput(format!("unrecognized answer line `{}`", line))
        })?;
        let (name, value) = binding.split_once('\t').ok_or_else(|| {
            SolverError::MalformedOutput(format!("missing value separator in `{}`", line))
        })?;

        match value {
            "true" | "false" => {
                if !model.has_variable(VarKind::Bool, name) {
                    return Err(SolverError::MalformedOutput(format!(
                        "boolean value for undeclared variable `{}`",
                        name
                    )));
                }
                assignment.set_bool(name, value == "true");
            }
            _ => {
                let parsed: i64 = value.parse().map_err(|_| {
                    SolverError::MalformedOutput(format!("unparseable value `{}`", value))
                })?;
                if !model.has_variable(VarKind::Int, name) {
                    return Err(SolverError::MalformedOutput(format!(
                        "integer value for undeclared variable `{}`",
                        name
                    )));
                }
                assignment.set_int(name, parsed);
            }
        }
    }

    for kind in [VarKind::Int, VarKind::Bool] {
        for variable in model.variables(kind) {
            if assignment.value(variable).is_none() {
                return Err(SolverError::MissingAssignment {
                    kind,
                    name: variable.name.clone(),
                });
            }
        }
    }

    Ok(SolveOutcome::Satisfiable(assignment))
}

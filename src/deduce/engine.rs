//! Iterative refutation
//!
//! Starting from one satisfying assignment, the engine repeatedly appends a
//! clause asserting that at least one still-candidate answer key differs
//! from its recorded value, then re-solves. A satisfiable outcome refutes
//! every candidate the new assignment disagrees on; an unsatisfiable outcome
//! proves the survivors forced. Candidate flags only ever move from active
//! to refuted.

use super::{Binding, Deduction};
use crate::model::{Expr, ProblemModel, Value, Variable};
use crate::solver::{SolveOutcome, SolverError, SolvingBackend};
use log::{debug, info};
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeduceError {
    #[error(transparent)]
    Backend(#[from] SolverError),
    #[error("assignment is missing answer key `{0}`")]
    MissingAnswerKey(String),
    #[error("deduction exceeded the {0}s time limit")]
    TimedOut(u64),
}

/// One answer-key variable tracked through the loop
#[derive(Debug, Clone)]
pub struct ForcedCandidate {
    pub variable: Variable,
    pub recorded: Value,
    pub refuted: bool,
}

impl ForcedCandidate {
    /// The predicate "this variable differs from its recorded value"
    fn disagreement(&self) -> Expr {
        match self.recorded {
            Value::Int(v) => Expr::ne(self.variable.name.clone(), v),
            Value::Bool(v) => Expr::xor(self.variable.name.clone(), v),
        }
    }
}

/// Drives the refutation loop over a model that has just solved satisfiably
pub struct RefutationEngine<'a, B: SolvingBackend> {
    model: &'a mut ProblemModel,
    backend: &'a mut B,
    candidates: Vec<ForcedCandidate>,
    deadline: Option<(Instant, u64)>,
}

impl<'a, B: SolvingBackend> RefutationEngine<'a, B> {
    /// Seed candidates from the first assignment: every answer key starts
    /// active, with its value recorded as the forced-value baseline.
    pub fn new(
        model: &'a mut ProblemModel,
        backend: &'a mut B,
        first: &crate::solver::Assignment,
        time_limit_seconds: Option<u64>,
    ) -> Result<Self, DeduceError> {
        let mut candidates = Vec::new();
        for variable in model.answer_keys() {
            let recorded = first
                .value(variable)
                .ok_or_else(|| DeduceError::MissingAnswerKey(variable.name.clone()))?;
            candidates.push(ForcedCandidate {
                variable: variable.clone(),
                recorded,
                refuted: false,
            });
        }
        let deadline = time_limit_seconds
            .filter(|&limit| limit > 0)
            .map(|limit| (Instant::now(), limit));
        Ok(Self {
            model,
            backend,
            candidates,
            deadline,
        })
    }

    /// Run the loop to completion and return the forced partition
    pub fn run(mut self) -> Result<Deduction, DeduceError> {
        let total = self.candidates.len();
        let mut iterations = 0usize;

        loop {
            if let Some((start, limit)) = self.deadline {
                if start.elapsed().as_secs() >= limit {
                    return Err(DeduceError::TimedOut(limit));
                }
            }

            let disagreements: Vec<Expr> = self
                .candidates
                .iter()
                .filter(|c| !c.refuted)
                .map(ForcedCandidate::disagreement)
                .collect();
            // Nothing left to prove; stop rather than append an always-false
            // clause.
            if disagreements.is_empty() {
                break;
            }

            debug!(
                "refutation round {}: {} of {} candidates active",
                iterations + 1,
                disagreements.len(),
                total
            );
            self.model.add_constraint(Expr::or(disagreements));
            iterations += 1;

            match self.backend.solve(self.model)? {
                // No assignment disagrees with the baseline on any active
                // candidate anywhere in the refuted search space: they are
                // all forced.
                SolveOutcome::Unsatisfiable => break,
                SolveOutcome::Satisfiable(assignment) => {
                    for candidate in self.candidates.iter_mut().filter(|c| !c.refuted) {
                        let current = assignment.value(&candidate.variable).ok_or_else(|| {
                            DeduceError::MissingAnswerKey(candidate.variable.name.clone())
                        })?;
                        if current != candidate.recorded {
                            candidate.refuted = true;
                        }
                    }
                }
            }
        }

        let forced: Vec<Binding> = self
            .candidates
            .into_iter()
            .filter(|c| !c.refuted)
            .map(|c| Binding::new(c.variable.name, c.recorded))
            .collect();
        info!(
            "deduction finished: {} of {} answer keys forced after {} rounds",
            forced.len(),
            total,
            iterations
        );
        Ok(Deduction { forced, iterations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::Assignment;
    use std::collections::VecDeque;

    /// Backend fed a fixed sequence of outcomes
    struct ScriptedBackend {
        outcomes: VecDeque<SolveOutcome>,
        calls: usize,
    }

    impl ScriptedBackend {
        fn new(outcomes: Vec<SolveOutcome>) -> Self {
            Self {
                outcomes: outcomes.into(),
                calls: 0,
            }
        }
    }

    impl SolvingBackend for ScriptedBackend {
        fn solve(&mut self, _model: &ProblemModel) -> Result<SolveOutcome, SolverError> {
            self.calls += 1;
            self.outcomes
                .pop_front()
                .ok_or_else(|| SolverError::MalformedOutput("script exhausted".to_string()))
        }
    }

    /// Backend that enumerates a fixed solution table and honors the
    /// refutation clauses appended after construction
    struct TableBackend {
        solutions: Vec<Assignment>,
        base_terms: usize,
        calls: usize,
    }

    impl TableBackend {
        fn new(model: &ProblemModel, solutions: Vec<Assignment>) -> Self {
            Self {
                solutions,
                base_terms: model.terms().len(),
                calls: 0,
            }
        }
    }

    fn satisfies(expr: &Expr, assignment: &Assignment) -> bool {
        match expr {
            // Base constraints are assumed satisfied by every table entry
            Expr::Raw(_) => true,
            Expr::Ne(name, v) => assignment.int(name) != Some(*v),
            Expr::Xor(name, v) => assignment.bool(name).map(|b| b != *v).unwrap_or(false),
            Expr::Or(disjuncts) => disjuncts.iter().any(|d| satisfies(d, assignment)),
        }
    }

    impl SolvingBackend for TableBackend {
        fn solve(&mut self, model: &ProblemModel) -> Result<SolveOutcome, SolverError> {
            self.calls += 1;
            let appended = &model.terms()[self.base_terms..];
            let found = self
                .solutions
                .iter()
                .find(|solution| appended.iter().all(|term| satisfies(term, solution)));
            Ok(match found {
                Some(solution) => SolveOutcome::Satisfiable(solution.clone()),
                None => SolveOutcome::Unsatisfiable,
            })
        }
    }

    fn bool_model(names: &[&str]) -> ProblemModel {
        let mut model = ProblemModel::new();
        for name in names {
            model.declare_bool(name).unwrap();
            model.mark_answer_key(name);
        }
        model
    }

    fn bool_assignment(pairs: &[(&str, bool)]) -> Assignment {
        let mut assignment = Assignment::new();
        for (name, value) in pairs {
            assignment.set_bool(*name, *value);
        }
        assignment
    }

    #[test]
    fn test_forced_variable_survives_to_unsat() {
        let mut model = bool_model(&["x"]);
        let first = bool_assignment(&[("x", true)]);
        let mut backend = ScriptedBackend::new(vec![SolveOutcome::Unsatisfiable]);

        let deduction = RefutationEngine::new(&mut model, &mut backend, &first, None)
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(deduction.forced, vec![Binding::new("x", Value::Bool(true))]);
        assert_eq!(deduction.iterations, 1);
        assert_eq!(backend.calls, 1);
        // The refutation clause was appended before the final solve
        assert_eq!(model.terms().last().unwrap().to_string(), "(|| (xor x true))");
    }

    #[test]
    fn test_disagreeing_candidate_is_refuted() {
        let mut model = bool_model(&["x", "y"]);
        let first = bool_assignment(&[("x", true), ("y", false)]);
        let mut backend = ScriptedBackend::new(vec![
            // y flips, x holds: y is refuted
            SolveOutcome::Satisfiable(bool_assignment(&[("x", true), ("y", true)])),
            SolveOutcome::Unsatisfiable,
        ]);

        let deduction = RefutationEngine::new(&mut model, &mut backend, &first, None)
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(deduction.forced, vec![Binding::new("x", Value::Bool(true))]);
        assert_eq!(deduction.iterations, 2);
        // The second clause only covers the surviving candidate
        assert_eq!(model.terms().last().unwrap().to_string(), "(|| (xor x true))");
    }

    #[test]
    fn test_refuted_candidate_never_returns() {
        let mut model = bool_model(&["x", "y"]);
        let first = bool_assignment(&[("x", true), ("y", false)]);
        let mut backend = ScriptedBackend::new(vec![
            SolveOutcome::Satisfiable(bool_assignment(&[("x", true), ("y", true)])),
            // y agrees with the baseline again, but stays refuted
            SolveOutcome::Satisfiable(bool_assignment(&[("x", true), ("y", false)])),
            SolveOutcome::Unsatisfiable,
        ]);

        let deduction = RefutationEngine::new(&mut model, &mut backend, &first, None)
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(deduction.forced, vec![Binding::new("x", Value::Bool(true))]);
    }

    #[test]
    fn test_no_candidates_makes_no_backend_calls() {
        let mut model = ProblemModel::new();
        model.declare_bool("x").unwrap();

        let first = bool_assignment(&[("x", true)]);
        let mut backend = ScriptedBackend::new(Vec::new());
        let deduction = RefutationEngine::new(&mut model, &mut backend, &first, None)
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(deduction, Deduction::empty());
        assert_eq!(backend.calls, 0);
        assert!(model.terms().len() == 1);
    }

    #[test]
    fn test_all_candidates_refuted_stops_without_empty_clause() {
        let mut model = bool_model(&["x"]);
        let first = bool_assignment(&[("x", true)]);
        let mut backend = ScriptedBackend::new(vec![SolveOutcome::Satisfiable(
            bool_assignment(&[("x", false)]),
        )]);

        let deduction = RefutationEngine::new(&mut model, &mut backend, &first, None)
            .unwrap()
            .run()
            .unwrap();

        assert!(deduction.forced.is_empty());
        assert_eq!(backend.calls, 1);
        // Exactly one refutation clause was appended, never a vacuous one
        assert_eq!(model.terms().len(), 2);
    }

    #[test]
    fn test_unforced_pair_deduces_nothing() {
        // x + y = 3 over [0,3]: four solutions, neither variable is forced
        let mut model = ProblemModel::new();
        model.declare_int("x", 0, 3).unwrap();
        model.declare_int("y", 0, 3).unwrap();
        model.add_constraint(Expr::raw("(= (+ x y) 3)"));
        model.mark_answer_key("x");
        model.mark_answer_key("y");

        let solutions: Vec<Assignment> = (0..=3)
            .map(|x| {
                let mut a = Assignment::new();
                a.set_int("x", x);
                a.set_int("y", 3 - x);
                a
            })
            .collect();
        let mut backend = TableBackend::new(&model, solutions.clone());

        let first = solutions[0].clone();
        let deduction = RefutationEngine::new(&mut model, &mut backend, &first, None)
            .unwrap()
            .run()
            .unwrap();

        assert!(deduction.forced.is_empty());
    }

    #[test]
    fn test_partially_forced_table() {
        // x is 1 in every solution, y varies: only x is forced
        let mut model = ProblemModel::new();
        model.declare_int("x", 0, 3).unwrap();
        model.declare_int("y", 0, 3).unwrap();
        model.mark_answer_key("x");
        model.mark_answer_key("y");

        let solutions: Vec<Assignment> = [1, 2, 3]
            .iter()
            .map(|&y| {
                let mut a = Assignment::new();
                a.set_int("x", 1);
                a.set_int("y", y);
                a
            })
            .collect();
        let mut backend = TableBackend::new(&model, solutions.clone());

        let first = solutions[0].clone();
        let deduction = RefutationEngine::new(&mut model, &mut backend, &first, None)
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(deduction.forced, vec![Binding::new("x", Value::Int(1))]);
    }

    #[test]
    fn test_missing_answer_key_value_is_an_error() {
        let mut model = bool_model(&["x"]);
        let first = Assignment::new();
        let mut backend = ScriptedBackend::new(Vec::new());

        assert!(matches!(
            RefutationEngine::new(&mut model, &mut backend, &first, None),
            Err(DeduceError::MissingAnswerKey(name)) if name == "x"
        ));
    }

    #[test]
    fn test_backend_error_propagates() {
        let mut model = bool_model(&["x"]);
        let first = bool_assignment(&[("x", true)]);
        let mut backend = ScriptedBackend::new(Vec::new());

        let result = RefutationEngine::new(&mut model, &mut backend, &first, None)
            .unwrap()
            .run();
        assert!(matches!(result, Err(DeduceError::Backend(_))));
    }
}

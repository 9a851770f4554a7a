//! In-memory CSP instance
//!
//! The model is append-only: refutation clauses accumulate during deduction
//! and constrain every subsequent solve, but no term is ever removed or
//! edited.

use super::{Expr, VarKind, Variable};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("variable `{name}` is already declared as {kind}")]
    DuplicateVariable { kind: VarKind, name: String },
}

/// A CSP instance: ordered terms plus kind-partitioned variable registries
/// in declaration order
#[derive(Debug, Clone, Default)]
pub struct ProblemModel {
    terms: Vec<Expr>,
    int_vars: Vec<Variable>,
    bool_vars: Vec<Variable>,
}

impl ProblemModel {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self, kind: VarKind) -> &Vec<Variable> {
        match kind {
            VarKind::Int => &self.int_vars,
            VarKind::Bool => &self.bool_vars,
        }
    }

    fn registry_mut(&mut self, kind: VarKind) -> &mut Vec<Variable> {
        match kind {
            VarKind::Int => &mut self.int_vars,
            VarKind::Bool => &mut self.bool_vars,
        }
    }

    /// Register a variable and append its declaration term. The declaration
    /// must precede any constraint referencing the name.
    pub fn declare(
        &mut self,
        kind: VarKind,
        name: impl Into<String>,
        term: Expr,
    ) -> Result<(), ModelError> {
        let name = name.into();
        if self.registry(kind).iter().any(|v| v.name == name) {
            return Err(ModelError::DuplicateVariable { kind, name });
        }
        self.registry_mut(kind).push(Variable::new(name, kind));
        self.terms.push(term);
        Ok(())
    }

    /// Declare an integer variable with an inclusive domain
    pub fn declare_int(&mut self, name: &str, lo: i64, hi: i64) -> Result<(), ModelError> {
        self.declare(VarKind::Int, name, Expr::raw(format!("(int {} {} {})", name, lo, hi)))
    }

    /// Declare a boolean variable
    pub fn declare_bool(&mut self, name: &str) -> Result<(), ModelError> {
        self.declare(VarKind::Bool, name, Expr::raw(format!("(bool {})", name)))
    }

    /// Append a constraint expression
    pub fn add_constraint(&mut self, expr: Expr) {
        self.terms.push(expr);
    }

    /// Declared variables of one kind, in declaration order
    pub fn variables(&self, kind: VarKind) -> &[Variable] {
        self.registry(kind)
    }

    /// All terms (declarations and constraints) in order
    pub fn terms(&self) -> &[Expr] {
        &self.terms
    }

    pub fn has_variable(&self, kind: VarKind, name: &str) -> bool {
        self.registry(kind).iter().any(|v| v.name == name)
    }

    /// Flag `name` as an answer key in every kind registry where it exists.
    /// Returns whether any variable matched.
    pub fn mark_answer_key(&mut self, name: &str) -> bool {
        let mut found = false;
        for var in self.int_vars.iter_mut().chain(self.bool_vars.iter_mut()) {
            if var.name == name {
                var.answer_key = true;
                found = true;
            }
        }
        found
    }

    /// Answer-key variables in reporting order: integers then booleans,
    /// declaration order within each kind
    pub fn answer_keys(&self) -> impl Iterator<Item = &Variable> {
        self.int_vars
            .iter()
            .chain(self.bool_vars.iter())
            .filter(|v| v.answer_key)
    }

    /// The model text handed to the backend: all terms, newline-separated
    pub fn render(&self) -> String {
        let mut text = String::new();
        for term in &self.terms {
            text.push_str(&term.to_string());
            text.push('\n');
        }
        text
    }
}

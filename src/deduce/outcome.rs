//! Deduction results

use crate::model::Value;
use serde::Serialize;

/// A variable name paired with its recorded value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binding {
    pub name: String,
    pub value: Value,
}

impl Binding {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Outcome of a refutation run: the answer keys proven forced, in reporting
/// order, plus how many refutation rounds it took
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deduction {
    pub forced: Vec<Binding>,
    pub iterations: usize,
}

impl Deduction {
    pub fn empty() -> Self {
        Self {
            forced: Vec::new(),
            iterations: 0,
        }
    }
}

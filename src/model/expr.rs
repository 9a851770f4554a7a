//! Constraint expression terms in the backend's textual grammar
//!
//! Terms read from the input are carried verbatim as `Raw`; the only
//! expressions this crate builds itself are the refutation forms: an integer
//! inequality, a boolean exclusive-or, and a disjunction over them.

use itertools::Itertools;
use std::fmt;

/// A constraint expression term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// An opaque term taken verbatim from the input
    Raw(String),
    /// `name` differs from the given integer
    Ne(String, i64),
    /// `name` differs from the given boolean
    Xor(String, bool),
    /// At least one disjunct holds
    Or(Vec<Expr>),
}

impl Expr {
    pub fn raw(term: impl Into<String>) -> Self {
        Expr::Raw(term.into())
    }

    pub fn ne(name: impl Into<String>, value: i64) -> Self {
        Expr::Ne(name.into(), value)
    }

    pub fn xor(name: impl Into<String>, value: bool) -> Self {
        Expr::Xor(name.into(), value)
    }

    pub fn or(disjuncts: Vec<Expr>) -> Self {
        Expr::Or(disjuncts)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Raw(term) => f.write_str(term),
            Expr::Ne(name, value) => write!(f, "(!= {} {})", name, value),
            Expr::Xor(name, value) => write!(f, "(xor {} {})", name, value),
            Expr::Or(disjuncts) => {
                write!(f, "(|| {})", disjuncts.iter().map(|e| e.to_string()).join(" "))
            }
        }
    }
}

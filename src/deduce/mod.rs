//! Forced-value deduction via iterative refutation

pub mod engine;
pub mod outcome;

pub use engine::{DeduceError, ForcedCandidate, RefutationEngine};
pub use outcome::{Binding, Deduction};

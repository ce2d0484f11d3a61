use thiserror::Error;

use crate::solution::SolutionStatus;

/// Malformed input or misuse of an engine. Solver outcomes such as infeasibility are
/// reported through [`SolutionStatus`], never through this type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    #[error("Problem has no variables")]
    NoVariables,
    #[error("Objective has {found} coefficients, expected {expected}")]
    ObjectiveLength { expected: usize, found: usize },
    #[error("Constraint {constraint} has {found} coefficients, expected {expected}")]
    CoefficientCount {
        constraint: String,
        expected: usize,
        found: usize,
    },
    #[error("Non-finite number in {0}")]
    NonFinite(String),
    #[error("{what} has size {found}, expected {expected}")]
    Dimension {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Integrality mask has {found} entries, expected {expected}")]
    IntegerMaskLength { expected: usize, found: usize },
    #[error("Constraint index {index} out of range (problem has {count} constraints)")]
    ConstraintIndex { index: usize, count: usize },
    #[error("Variable index {index} out of range (problem has {count} variables)")]
    VariableIndex { index: usize, count: usize },
    #[error("Sensitivity analysis needs an optimal solution, solver status is {0:?}")]
    NotOptimal(SolutionStatus),
    #[error("The solved tableau belongs to a different problem than the one analyzed")]
    ProblemMismatch,
}

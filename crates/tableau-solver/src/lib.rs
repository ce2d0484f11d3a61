//! Linear and integer programming with the Big-M tableau simplex method.
//!
//! [`Solver`] runs the tableau engine and records every tableau it visits.
//! [`BranchAndBound`] wraps it into an integer solver, [`RevisedSimplex`] solves the same
//! problems through an explicit basis inverse, and [`Sensitivity`] answers post-optimal
//! questions about a finished tableau run.

mod branch;
mod error;
mod matrix;
mod penalty;
mod problem;
mod revised;
mod sensitivity;
mod simplex;
mod solution;
mod standard;

pub use branch::{BranchAndBound, BranchAndBoundResult, BranchNode, Branching, Incumbent, PruneReason};
pub use error::ProblemError;
pub use matrix::Matrix;
pub use penalty::{EPSILON, PenaltyScalar};
pub use problem::{Constraint, ConstraintOp, LinearProgram, Objective};
pub use revised::{RevisedResult, RevisedSimplex, RevisedStep, RevisedStepKind};
pub use sensitivity::{
    AnalysisStep, ObjectiveRange, Outcome, Reoptimization, RhsRange, Sensitivity, ShadowPrice,
};
pub use simplex::{PivotRule, Progress, Solver, Tableau, TableauSimplex};
pub use solution::{Pivot, Solution, SolutionStatus, Step};
pub use standard::{ColumnKind, StandardForm};

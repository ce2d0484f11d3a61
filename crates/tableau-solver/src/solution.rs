use std::fmt;

use crate::matrix::Matrix;
use crate::penalty::PenaltyScalar;

/// The result of running the tableau simplex engine
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Value of each original variable (all zero unless optimal)
    pub values: Vec<f64>,
    /// Objective value in the caller's sense.
    /// `±∞` for unbounded problems, NaN when infeasible or not converged.
    pub objective_value: f64,
    /// Every tableau the engine went through, in order
    pub steps: Vec<Step>,
    /// Number of pivots performed
    pub iterations: usize,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// An optimal solution was found
    Optimal,
    /// The problem is infeasible (an artificial variable stayed positive)
    Infeasible,
    /// The problem is unbounded
    Unbounded,
    /// The iteration cap was hit, probably cycling
    NotConverged,
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SolutionStatus::Optimal => "Optimal Solution Found",
            SolutionStatus::Infeasible => "Infeasible Solution",
            SolutionStatus::Unbounded => "Unbounded Solution",
            SolutionStatus::NotConverged => "Max iterations reached",
        };
        f.write_str(text)
    }
}

/// Tableau coordinates of a pivot element. Row 0 is the objective row.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pivot {
    pub row: usize,
    pub col: usize,
}

/// Snapshot of the tableau at one point of a run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub tableau: Matrix<PenaltyScalar>,
    /// Basic variable of each row, `"Z"` for row 0
    pub row_headers: Vec<String>,
    /// Column names, ending with `"RHS"`
    pub col_headers: Vec<String>,
    /// Basic column of each constraint row
    pub basic_vars: Vec<usize>,
    pub description: String,
    /// Pivot chosen from this tableau, filled in once it is known
    pub pivot: Option<Pivot>,
    /// Ratio test of that pivot, one entry per constraint row (`None` = not eligible)
    pub ratios: Option<Vec<Option<f64>>>,
    /// Row operations that produced this tableau
    pub row_operations: Vec<String>,
}

impl Solution {
    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    /// The last recorded tableau.
    pub fn final_step(&self) -> Option<&Step> {
        self.steps.last()
    }
}

impl Step {
    /// Objective-row right-hand side, i.e. `Z` in maximization form.
    pub fn objective(&self) -> PenaltyScalar {
        self.tableau[(0, self.tableau.cols() - 1)]
    }
}

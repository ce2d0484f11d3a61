use tracing::{debug, info, trace, warn};

use crate::error::ProblemError;
use crate::matrix::Matrix;
use crate::penalty::{EPSILON, PenaltyScalar};
use crate::problem::LinearProgram;
use crate::solution::{Pivot, Solution, SolutionStatus, Step};
use crate::standard::StandardForm;

/// How the entering column and the leaving row are chosen.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PivotRule {
    /// Most negative objective-row entry, first minimum ratio. Not cycling-safe.
    #[default]
    Dantzig,
    /// First negative objective-row entry, ratio ties go to the lowest basic column.
    Bland,
}

/// Big-M tableau simplex solver for linear programming problems
#[derive(Debug, Clone, Copy)]
pub struct Solver {
    /// Maximum pivots before giving up
    max_iterations: usize,
    /// Tolerance for every zero, sign and ratio comparison during a run
    tolerance: f64,
    pivot_rule: PivotRule,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: EPSILON,
            pivot_rule: PivotRule::Dantzig,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_pivot_rule(mut self, rule: PivotRule) -> Self {
        self.pivot_rule = rule;
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn pivot_rule(&self) -> PivotRule {
        self.pivot_rule
    }

    /// Builds the initial tableau without pivoting, for callers that drive the run
    /// themselves through [`TableauSimplex::step`].
    pub fn start(&self, problem: &LinearProgram) -> Result<TableauSimplex, ProblemError> {
        problem.validate()?;
        Ok(TableauSimplex::new(problem, *self))
    }

    /// Solve the LP problem with the Big-M method.
    pub fn solve(&self, problem: &LinearProgram) -> Result<Solution, ProblemError> {
        let mut engine = self.start(problem)?;
        engine.run();
        Ok(engine.into_solution())
    }
}

/// Simplex tableau: objective row 0, one row per constraint, right-hand side last.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Tableau {
    pub cells: Matrix<PenaltyScalar>,
    pub row_headers: Vec<String>,
    pub col_headers: Vec<String>,
    /// Basic column of each constraint row (index 0 is tableau row 1)
    pub basic_vars: Vec<usize>,
}

impl Tableau {
    /// Initial Big-M tableau with the artificial penalties already eliminated from row 0.
    fn new(form: &StandardForm) -> Self {
        let m = form.num_rows();
        let n_cols = form.num_columns();
        let rhs = n_cols;

        let mut cells = Matrix::new(m + 1, n_cols + 1);
        for i in 0..m {
            for j in 0..n_cols {
                cells[(i + 1, j)] = PenaltyScalar::real(form.a[(i, j)]);
            }
            cells[(i + 1, rhs)] = PenaltyScalar::real(form.b[i]);
        }
        for j in 0..n_cols {
            cells[(0, j)] = -form.costs[j];
        }
        // Row 0 must read C_B·B⁻¹A - c, so add each basic cost times its row.
        for (i, &basic) in form.initial_basis.iter().enumerate() {
            let cost = form.costs[basic];
            if cost.is_zero() {
                continue;
            }
            for j in 0..=n_cols {
                let entry = cells[(i + 1, j)].value;
                cells[(0, j)] += cost * entry;
            }
        }

        let mut row_headers = vec!["Z".to_string()];
        row_headers.extend(form.initial_basis.iter().map(|&col| form.names[col].clone()));
        let mut col_headers = form.names.clone();
        col_headers.push("RHS".to_string());

        Self {
            cells,
            row_headers,
            col_headers,
            basic_vars: form.initial_basis.clone(),
        }
    }

    pub fn rhs_col(&self) -> usize {
        self.cells.cols() - 1
    }

    pub fn num_constraints(&self) -> usize {
        self.cells.rows() - 1
    }

    /// Objective-row entry of column `j`.
    pub fn reduced_cost(&self, j: usize) -> PenaltyScalar {
        self.cells[(0, j)]
    }

    /// `Z` in maximization form.
    pub fn objective(&self) -> PenaltyScalar {
        self.cells[(0, self.rhs_col())]
    }

    pub fn is_basic(&self, col: usize) -> bool {
        self.basic_vars.contains(&col)
    }

    /// Current value of column `col`: its right-hand side when basic, 0 otherwise.
    pub fn value_of(&self, col: usize) -> f64 {
        self.basic_vars
            .iter()
            .position(|&b| b == col)
            .map_or(0.0, |row| self.cells[(row + 1, self.rhs_col())].value)
    }

    fn snapshot(&self, description: impl Into<String>, row_operations: Vec<String>) -> Step {
        Step {
            tableau: self.cells.clone(),
            row_headers: self.row_headers.clone(),
            col_headers: self.col_headers.clone(),
            basic_vars: self.basic_vars.clone(),
            description: description.into(),
            pivot: None,
            ratios: None,
            row_operations,
        }
    }
}

/// What a single call to [`TableauSimplex::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// One pivot was performed (column indices)
    Pivoted { entering: usize, leaving: usize },
    /// The run is over
    Finished(SolutionStatus),
}

/// One run of the tableau simplex method over a single problem.
#[derive(Debug, Clone)]
pub struct TableauSimplex {
    config: Solver,
    form: StandardForm,
    minimize: bool,
    tableau: Tableau,
    steps: Vec<Step>,
    status: Option<SolutionStatus>,
    iterations: usize,
}

impl TableauSimplex {
    fn new(problem: &LinearProgram, config: Solver) -> Self {
        let form = StandardForm::new(problem);
        let tableau = Tableau::new(&form);
        let title = if form.num_artificial() > 0 {
            "Initial Tableau (Big M)"
        } else {
            "Initial Tableau"
        };
        let steps = vec![tableau.snapshot(title, Vec::new())];
        debug!(
            rows = tableau.num_constraints(),
            columns = form.num_columns(),
            artificials = form.num_artificial(),
            "initial tableau built"
        );

        Self {
            config,
            form,
            minimize: problem.objective.minimize,
            tableau,
            steps,
            status: None,
            iterations: 0,
        }
    }

    /// Performs at most one pivot.
    pub fn step(&mut self) -> Progress {
        if let Some(status) = self.status {
            return Progress::Finished(status);
        }

        let Some(col) = self.entering_column() else {
            return self.finish_optimal();
        };

        if self.iterations >= self.config.max_iterations {
            warn!(iterations = self.iterations, "iteration cap reached, giving up");
            return self.finish(SolutionStatus::NotConverged);
        }

        let ratios = self.ratio_test(col);
        trace!(column = %self.tableau.col_headers[col], ?ratios, "ratio test");

        let Some(row) = self.leaving_row(&ratios) else {
            debug!(column = %self.tableau.col_headers[col], "no eligible row, unbounded");
            let mut step = self.tableau.snapshot("Unbounded Solution Detected", Vec::new());
            step.ratios = Some(ratios);
            self.steps.push(step);
            return self.finish(SolutionStatus::Unbounded);
        };

        if let Some(last) = self.steps.last_mut() {
            last.pivot = Some(Pivot { row, col });
            last.ratios = Some(ratios);
        }

        let leaving = self.tableau.basic_vars[row - 1];
        self.pivot(row, col);
        Progress::Pivoted { entering: col, leaving }
    }

    /// Pivots until the run finishes.
    pub fn run(&mut self) -> SolutionStatus {
        loop {
            if let Progress::Finished(status) = self.step() {
                return status;
            }
        }
    }

    pub fn status(&self) -> Option<SolutionStatus> {
        self.status
    }

    pub fn tableau(&self) -> &Tableau {
        &self.tableau
    }

    pub fn standard_form(&self) -> &StandardForm {
        &self.form
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn config(&self) -> &Solver {
        &self.config
    }

    pub fn is_minimization(&self) -> bool {
        self.minimize
    }

    /// Value of every original variable at the current basis.
    pub fn values(&self) -> Vec<f64> {
        (0..self.form.num_vars).map(|j| self.tableau.value_of(j)).collect()
    }

    /// Current objective value in the caller's sense.
    pub fn objective_value(&self) -> f64 {
        let z = self.tableau.objective().value;
        if self.minimize { -z } else { z }
    }

    pub fn solution(&self) -> Solution {
        self.clone().into_solution()
    }

    pub fn into_solution(self) -> Solution {
        let status = self.status.unwrap_or(SolutionStatus::NotConverged);
        let (values, objective_value) = match status {
            SolutionStatus::Optimal => (self.values(), self.objective_value()),
            SolutionStatus::Unbounded if self.minimize => (Vec::new(), f64::NEG_INFINITY),
            SolutionStatus::Unbounded => (Vec::new(), f64::INFINITY),
            SolutionStatus::Infeasible | SolutionStatus::NotConverged => (Vec::new(), f64::NAN),
        };
        Solution {
            status,
            values,
            objective_value,
            steps: self.steps,
            iterations: self.iterations,
        }
    }

    fn entering_column(&self) -> Option<usize> {
        let n_cols = self.tableau.rhs_col();
        match self.config.pivot_rule {
            PivotRule::Dantzig => {
                let mut min_val = PenaltyScalar::ZERO;
                let mut min_col = None;
                for j in 0..n_cols {
                    let entry = self.tableau.reduced_cost(j);
                    if entry.less_than_within(&min_val, self.config.tolerance) {
                        min_val = entry;
                        min_col = Some(j);
                    }
                }
                min_col
            }
            PivotRule::Bland => (0..n_cols).find(|&j| {
                self.tableau
                    .reduced_cost(j)
                    .is_negative_within(self.config.tolerance)
            }),
        }
    }

    /// `RHS / entry` for every constraint row with a positive entry in `col`.
    fn ratio_test(&self, col: usize) -> Vec<Option<f64>> {
        let rhs = self.tableau.rhs_col();
        (1..=self.tableau.num_constraints())
            .map(|i| {
                let coef = self.tableau.cells[(i, col)].value;
                (coef > self.config.tolerance).then(|| self.tableau.cells[(i, rhs)].value / coef)
            })
            .collect()
    }

    /// Tableau row (1-based) of the minimum ratio.
    fn leaving_row(&self, ratios: &[Option<f64>]) -> Option<usize> {
        let tol = self.config.tolerance;
        let mut best: Option<(usize, f64)> = None;
        for (k, ratio) in ratios.iter().enumerate() {
            let Some(ratio) = *ratio else { continue };
            let better = match best {
                None => true,
                Some((_, min)) if ratio < min - tol => true,
                Some((row, min)) if self.config.pivot_rule == PivotRule::Bland && (ratio - min).abs() <= tol => {
                    self.tableau.basic_vars[k] < self.tableau.basic_vars[row - 1]
                }
                Some((_, min)) => self.config.pivot_rule == PivotRule::Dantzig && ratio < min,
            };
            if better {
                best = Some((k + 1, ratio));
            }
        }
        best.map(|(row, _)| row)
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let n_rows = self.tableau.cells.rows();
        let n_cols = self.tableau.cells.cols();
        let pivot = self.tableau.cells[(row, col)];
        debug_assert!(pivot.is_real(), "constraint rows never carry a penalty part");

        let mut row_operations = vec![format!("R{row} ← R{row} / {pivot}")];
        for j in 0..n_cols {
            self.tableau.cells[(row, j)] = self.tableau.cells[(row, j)] / pivot.value;
        }
        self.tableau.cells[(row, col)] = PenaltyScalar::real(1.0);

        let pivot_row: Vec<f64> = self.tableau.cells.row(row).iter().map(|x| x.value).collect();
        for i in 0..n_rows {
            if i == row {
                continue;
            }
            let factor = self.tableau.cells[(i, col)];
            if factor.is_zero_within(self.config.tolerance) {
                continue;
            }
            let label = if i == 0 { "Z".to_string() } else { format!("R{i}") };
            row_operations.push(format!("{label} ← {label} - ({factor}) × R{row}"));
            for (j, &p) in pivot_row.iter().enumerate() {
                self.tableau.cells[(i, j)] -= factor * p;
            }
            self.tableau.cells[(i, col)] = PenaltyScalar::ZERO;
        }

        let leaving = std::mem::replace(&mut self.tableau.row_headers[row], self.tableau.col_headers[col].clone());
        self.tableau.basic_vars[row - 1] = col;
        self.iterations += 1;

        let entering = &self.tableau.col_headers[col];
        debug!(
            iteration = self.iterations,
            %entering,
            %leaving,
            objective = %self.tableau.objective(),
            "pivot"
        );
        let description = format!("Iteration {}: Pivot (Leave {leaving}, Enter {entering})", self.iterations);
        let step = self.tableau.snapshot(description, row_operations);
        self.steps.push(step);
    }

    fn finish_optimal(&mut self) -> Progress {
        let rhs = self.tableau.rhs_col();
        let stuck = self.tableau.basic_vars.iter().enumerate().find(|&(i, &col)| {
            self.form.is_artificial(col) && self.tableau.cells[(i + 1, rhs)].value > self.config.tolerance
        });
        if let Some((_, &col)) = stuck {
            debug!(artificial = %self.tableau.col_headers[col], "artificial variable still positive");
            return self.finish(SolutionStatus::Infeasible);
        }
        self.finish(SolutionStatus::Optimal)
    }

    fn finish(&mut self, status: SolutionStatus) -> Progress {
        info!(%status, iterations = self.iterations, objective = %self.tableau.objective(), "simplex finished");
        self.status = Some(status);
        Progress::Finished(status)
    }
}

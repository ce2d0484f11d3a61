//! Revised simplex method: the engine keeps an explicit basis inverse `B⁻¹` instead of a full
//! tableau, and prices every nonbasic column from it on each iteration.
//!
//! Costs are in minimization form. Artificial columns carry a `+M` cost as a
//! [`PenaltyScalar`], so no numeric big-M is ever chosen.

use tracing::{debug, info, trace, warn};

use crate::error::ProblemError;
use crate::matrix::Matrix;
use crate::penalty::{EPSILON, PenaltyScalar, format_number};
use crate::problem::LinearProgram;
use crate::solution::SolutionStatus;
use crate::standard::StandardForm;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisedStepKind {
    /// A basis change was made from this state
    Iteration,
    /// No reduced cost is negative
    Optimal,
    /// The entering column has no positive entry
    Unbounded,
    /// The iteration cap was hit
    NotConverged,
}

/// Matrix state of one revised-simplex iteration.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RevisedStep {
    pub kind: RevisedStepKind,
    pub iteration: usize,
    /// Basic column of each row
    pub basis: Vec<usize>,
    pub b_inv: Matrix<f64>,
    /// `B⁻¹b`
    pub x_b: Vec<f64>,
    pub c_b: Vec<PenaltyScalar>,
    /// `(column, c_j - C_B·B⁻¹a_j)` for every nonbasic column
    pub reduced_costs: Vec<(usize, PenaltyScalar)>,
    pub entering: Option<usize>,
    /// Row (not column) of the leaving basic variable
    pub leaving: Option<usize>,
    /// `B⁻¹a_entering`
    pub direction: Option<Vec<f64>>,
    pub ratios: Option<Vec<Option<f64>>>,
    pub theta: Option<f64>,
    /// `C_B·xB`, minimization form
    pub objective: PenaltyScalar,
    pub description: String,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RevisedResult {
    pub status: SolutionStatus,
    /// Objective in the caller's sense, `±∞` when unbounded, NaN otherwise when not optimal
    pub objective_value: f64,
    /// Value of every original variable (empty unless optimal)
    pub values: Vec<f64>,
    pub basis: Vec<usize>,
    pub b_inv: Matrix<f64>,
    /// Column names, for rendering `basis` and reduced costs
    pub names: Vec<String>,
    pub steps: Vec<RevisedStep>,
    pub iterations: usize,
}

impl RevisedResult {
    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}

#[derive(Debug, Clone)]
pub struct RevisedSimplex {
    names: Vec<String>,
    /// Minimization-form cost of every column
    costs: Vec<PenaltyScalar>,
    a: Matrix<f64>,
    b: Vec<f64>,
    b_inv: Matrix<f64>,
    basis: Vec<usize>,
    /// Columns whose values are reported
    num_vars: usize,
    /// The caller maximizes, so `C_B·xB` is reported negated
    negate_objective: bool,
    max_iterations: usize,
    tolerance: f64,
}

impl RevisedSimplex {
    /// An engine over raw data. `b_inv` must be the inverse of the columns of `a` listed in
    /// `basis`; costs are minimized and every column's value is reported.
    pub fn new(
        costs: Vec<PenaltyScalar>,
        a: Matrix<f64>,
        b: Vec<f64>,
        b_inv: Matrix<f64>,
        basis: Vec<usize>,
    ) -> Result<Self, ProblemError> {
        let m = a.rows();
        let n = a.cols();
        check_dimension("cost vector", n, costs.len())?;
        check_dimension("right-hand side", m, b.len())?;
        check_dimension("basis inverse rows", m, b_inv.rows())?;
        check_dimension("basis inverse columns", m, b_inv.cols())?;
        check_dimension("basis", m, basis.len())?;
        if let Some(&bad) = basis.iter().find(|&&k| k >= n) {
            return Err(ProblemError::VariableIndex { index: bad, count: n });
        }
        Ok(Self {
            names: (1..=n).map(|j| format!("x{j}")).collect(),
            costs,
            a,
            b,
            b_inv,
            basis,
            num_vars: n,
            negate_objective: false,
            max_iterations: 100,
            tolerance: EPSILON,
        })
    }

    /// The all-slack/artificial start for `problem`, with `B⁻¹ = I`.
    pub fn from_problem(problem: &LinearProgram) -> Result<Self, ProblemError> {
        problem.validate()?;
        let form = StandardForm::new(problem);
        let m = form.num_rows();
        Ok(Self {
            names: form.names.clone(),
            costs: form.costs.iter().map(|&c| -c).collect(),
            b_inv: Matrix::identity(m),
            basis: form.initial_basis.clone(),
            num_vars: form.num_vars,
            negate_objective: !problem.objective.minimize,
            a: form.a,
            b: form.b,
            max_iterations: 100,
            tolerance: EPSILON,
        })
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_names(mut self, names: Vec<String>) -> Result<Self, ProblemError> {
        check_dimension("column names", self.costs.len(), names.len())?;
        self.names = names;
        Ok(self)
    }

    fn is_artificial(&self, col: usize) -> bool {
        self.costs[col].penalty > self.tolerance
    }

    fn name(&self, col: usize) -> &str {
        &self.names[col]
    }

    /// `c_j - C_B·B⁻¹a_j` for every nonbasic column.
    fn reduced_costs(&self, b_inv: &Matrix<f64>, basis: &[usize], c_b: &[PenaltyScalar]) -> Vec<(usize, PenaltyScalar)> {
        (0..self.a.cols())
            .filter(|j| !basis.contains(j))
            .map(|j| {
                let d = b_inv.mul_column(&self.a, j);
                let z_j = dot(c_b, &d);
                (j, self.costs[j] - z_j)
            })
            .collect()
    }

    pub fn solve(&self) -> RevisedResult {
        let tol = self.tolerance;
        let mut b_inv = self.b_inv.clone();
        let mut basis = self.basis.clone();
        let mut steps = Vec::new();
        let mut iterations = 0;

        let (status, x_b) = loop {
            let x_b = b_inv.mul_vec(&self.b);
            let c_b: Vec<PenaltyScalar> = basis.iter().map(|&k| self.costs[k]).collect();
            let reduced_costs = self.reduced_costs(&b_inv, &basis, &c_b);
            let objective = dot(&c_b, &x_b);

            let mut entering: Option<(usize, PenaltyScalar)> = None;
            for &(j, rc) in &reduced_costs {
                let threshold = entering.map_or(PenaltyScalar::ZERO, |(_, min)| min);
                if rc.less_than_within(&threshold, tol) {
                    entering = Some((j, rc));
                }
            }

            let mut step = RevisedStep {
                kind: RevisedStepKind::Optimal,
                iteration: iterations,
                basis: basis.clone(),
                b_inv: b_inv.clone(),
                x_b: x_b.clone(),
                c_b,
                reduced_costs,
                entering: None,
                leaving: None,
                direction: None,
                ratios: None,
                theta: None,
                objective,
                description: String::new(),
            };

            let Some((entering, rc)) = entering else {
                step.description = format!("Optimal: no negative reduced cost, Z = {objective}");
                steps.push(step);
                break (SolutionStatus::Optimal, x_b);
            };

            if iterations >= self.max_iterations {
                warn!(iterations, "iteration cap reached, giving up");
                step.kind = RevisedStepKind::NotConverged;
                step.description = "Max iterations reached".to_string();
                steps.push(step);
                break (SolutionStatus::NotConverged, x_b);
            }

            let d = b_inv.mul_column(&self.a, entering);
            let ratios: Vec<Option<f64>> = d
                .iter()
                .zip(&x_b)
                .map(|(&di, &xi)| (di > tol).then(|| xi / di))
                .collect();
            trace!(column = %self.name(entering), ?ratios, "ratio test");

            let mut leaving: Option<(usize, f64)> = None;
            for (i, ratio) in ratios.iter().enumerate() {
                let Some(ratio) = *ratio else { continue };
                if leaving.is_none_or(|(_, min)| ratio < min) {
                    leaving = Some((i, ratio));
                }
            }

            step.entering = Some(entering);
            step.direction = Some(d.clone());
            step.ratios = Some(ratios);

            let Some((row, theta)) = leaving else {
                debug!(column = %self.name(entering), "no positive direction entry, unbounded");
                step.kind = RevisedStepKind::Unbounded;
                step.description = format!("Unbounded: {} can increase without limit", self.name(entering));
                steps.push(step);
                break (SolutionStatus::Unbounded, x_b);
            };

            step.kind = RevisedStepKind::Iteration;
            step.leaving = Some(row);
            step.theta = Some(theta);
            step.description = format!(
                "Iteration {}: {} enters (reduced cost {}), {} leaves, θ = {}",
                iterations + 1,
                self.name(entering),
                rc,
                self.name(basis[row]),
                format_number(theta)
            );
            debug!(
                entering = %self.name(entering),
                leaving = %self.name(basis[row]),
                theta,
                "basis change"
            );
            steps.push(step);

            update_inverse(&mut b_inv, &d, row);
            basis[row] = entering;
            iterations += 1;
        };

        let status = if status == SolutionStatus::Optimal
            && basis.iter().zip(&x_b).any(|(&k, &x)| self.is_artificial(k) && x > tol)
        {
            SolutionStatus::Infeasible
        } else {
            status
        };

        let (objective_value, values) = match status {
            SolutionStatus::Optimal => {
                let c_b: Vec<PenaltyScalar> = basis.iter().map(|&k| self.costs[k]).collect();
                let z = dot(&c_b, &x_b).value;
                let values = (0..self.num_vars)
                    .map(|j| basis.iter().position(|&k| k == j).map_or(0.0, |row| x_b[row]))
                    .collect();
                (if self.negate_objective { -z } else { z }, values)
            }
            SolutionStatus::Unbounded if self.negate_objective => (f64::INFINITY, Vec::new()),
            SolutionStatus::Unbounded => (f64::NEG_INFINITY, Vec::new()),
            SolutionStatus::Infeasible | SolutionStatus::NotConverged => (f64::NAN, Vec::new()),
        };
        info!(%status, iterations, "revised simplex finished");

        RevisedResult {
            status,
            objective_value,
            values,
            basis,
            b_inv,
            names: self.names.clone(),
            steps,
            iterations,
        }
    }
}

fn check_dimension(what: &'static str, expected: usize, found: usize) -> Result<(), ProblemError> {
    if expected == found {
        Ok(())
    } else {
        Err(ProblemError::Dimension { what, expected, found })
    }
}

fn dot(costs: &[PenaltyScalar], x: &[f64]) -> PenaltyScalar {
    costs
        .iter()
        .zip(x)
        .fold(PenaltyScalar::ZERO, |acc, (&c, &v)| acc + c * v)
}

/// Elementary transform of `B⁻¹` for a pivot on `d[row]`.
fn update_inverse(b_inv: &mut Matrix<f64>, d: &[f64], row: usize) {
    let pivot = d[row];
    for x in b_inv.row_mut(row) {
        *x /= pivot;
    }
    let pivot_row = b_inv.row(row).to_vec();
    for (i, &di) in d.iter().enumerate() {
        if i == row || di == 0.0 {
            continue;
        }
        for (x, &p) in b_inv.row_mut(i).iter_mut().zip(&pivot_row) {
            *x -= di * p;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::ConstraintOp;

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-6, "{actual} != {expected}");
    }

    fn wyndor() -> LinearProgram {
        let mut problem = LinearProgram::with_variables(2);
        problem.maximize(vec![3.0, 5.0]);
        problem.constrain(vec![1.0, 0.0], ConstraintOp::Le, 4.0);
        problem.constrain(vec![0.0, 2.0], ConstraintOp::Le, 12.0);
        problem.constrain(vec![3.0, 2.0], ConstraintOp::Le, 18.0);
        problem
    }

    #[test]
    fn test_maximization() {
        let result = RevisedSimplex::from_problem(&wyndor()).unwrap().solve();
        assert_eq!(result.status, SolutionStatus::Optimal);
        assert_close(result.objective_value, 36.0);
        assert_close(result.values[0], 2.0);
        assert_close(result.values[1], 6.0);
        assert_eq!(result.iterations, 2);
        assert_eq!(result.basis, vec![2, 1, 0]);

        let expected = [[1.0, 1.0 / 3.0, -1.0 / 3.0], [0.0, 0.5, 0.0], [0.0, -1.0 / 3.0, 1.0 / 3.0]];
        for (i, row) in expected.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                assert_close(result.b_inv[(i, j)], v);
            }
        }
    }

    #[test]
    fn test_steps_record_matrix_state() {
        let result = RevisedSimplex::from_problem(&wyndor()).unwrap().solve();
        assert_eq!(result.steps.len(), 3);

        let first = &result.steps[0];
        assert_eq!(first.kind, RevisedStepKind::Iteration);
        assert_eq!(first.b_inv, Matrix::identity(3));
        assert_eq!(first.x_b, vec![4.0, 12.0, 18.0]);
        assert_eq!(first.entering, Some(1));
        assert_eq!(first.leaving, Some(1));
        assert_eq!(first.direction, Some(vec![0.0, 2.0, 2.0]));
        assert_eq!(first.ratios, Some(vec![None, Some(6.0), Some(9.0)]));
        assert_eq!(first.theta, Some(6.0));
        assert_eq!(first.reduced_costs[0], (0, PenaltyScalar::real(-3.0)));

        let last = result.steps.last().unwrap();
        assert_eq!(last.kind, RevisedStepKind::Optimal);
        assert_close(last.objective.value, -36.0);
        assert!(last.reduced_costs.iter().all(|(_, rc)| !rc.is_negative()));
    }

    #[test]
    fn test_minimization_with_artificial() {
        let mut problem = LinearProgram::with_variables(2);
        problem.minimize(vec![2.0, 3.0]);
        problem.constrain(vec![1.0, 1.0], ConstraintOp::Ge, 10.0);

        let result = RevisedSimplex::from_problem(&problem).unwrap().solve();
        assert_eq!(result.status, SolutionStatus::Optimal);
        assert_close(result.objective_value, 20.0);
        assert_close(result.values[0], 10.0);
        assert_close(result.values[1], 0.0);
        // The artificial starts basic with cost +M
        assert_eq!(result.steps[0].c_b, vec![PenaltyScalar::M]);
    }

    #[test]
    fn test_infeasible() {
        let mut problem = LinearProgram::with_variables(1);
        problem.maximize(vec![1.0]);
        problem.constrain(vec![1.0], ConstraintOp::Le, 2.0);
        problem.constrain(vec![1.0], ConstraintOp::Ge, 5.0);

        let result = RevisedSimplex::from_problem(&problem).unwrap().solve();
        assert_eq!(result.status, SolutionStatus::Infeasible);
        assert!(result.objective_value.is_nan());
    }

    #[test]
    fn test_unbounded_has_no_leaving_row() {
        let mut problem = LinearProgram::with_variables(2);
        problem.maximize(vec![1.0, 0.0]);
        problem.constrain(vec![0.0, 1.0], ConstraintOp::Le, 3.0);

        let result = RevisedSimplex::from_problem(&problem).unwrap().solve();
        assert_eq!(result.status, SolutionStatus::Unbounded);
        assert_eq!(result.objective_value, f64::INFINITY);
        let last = result.steps.last().unwrap();
        assert_eq!(last.kind, RevisedStepKind::Unbounded);
        assert_eq!(last.entering, Some(0));
        assert_eq!(last.leaving, None);
    }

    #[test]
    fn test_raw_inputs() {
        // min -x1 - x2, x1 <= 3, x2 <= 4 with the slacks as starting basis
        let a = Matrix::from_rows(vec![vec![1.0, 0.0, 1.0, 0.0], vec![0.0, 1.0, 0.0, 1.0]]);
        let costs = [-1.0, -1.0, 0.0, 0.0].map(PenaltyScalar::real).to_vec();
        let engine = RevisedSimplex::new(costs, a, vec![3.0, 4.0], Matrix::identity(2), vec![2, 3]).unwrap();

        let result = engine.solve();
        assert_eq!(result.status, SolutionStatus::Optimal);
        assert_close(result.objective_value, -7.0);
        assert_eq!(result.values.len(), 4);
        assert_close(result.values[0], 3.0);
        assert_close(result.values[1], 4.0);
    }

    #[test]
    fn test_named_raw_columns() {
        let a = Matrix::from_rows(vec![vec![1.0, 1.0, 1.0]]);
        let costs = [-2.0, -1.0, 0.0].map(PenaltyScalar::real).to_vec();
        let names = vec!["chairs".to_string(), "tables".to_string(), "spare".to_string()];
        let result = RevisedSimplex::new(costs.clone(), a.clone(), vec![5.0], Matrix::identity(1), vec![2])
            .unwrap()
            .with_names(names.clone())
            .unwrap()
            .solve();

        assert_eq!(result.names, names);
        assert_close(result.objective_value, -10.0);
        assert!(result.steps[0].description.contains("chairs enters"));
        assert!(result.steps[0].description.contains("spare leaves"));

        let short = RevisedSimplex::new(costs, a, vec![5.0], Matrix::identity(1), vec![2])
            .unwrap()
            .with_names(vec!["chairs".to_string()]);
        assert!(matches!(
            short,
            Err(ProblemError::Dimension { what: "column names", expected: 3, found: 1 })
        ));
    }

    #[test]
    fn test_raw_inputs_are_checked() {
        let a = Matrix::from_rows(vec![vec![1.0, 1.0]]);
        let costs = vec![PenaltyScalar::real(1.0)];
        assert_eq!(
            RevisedSimplex::new(costs, a, vec![1.0], Matrix::identity(1), vec![1]).unwrap_err(),
            ProblemError::Dimension {
                what: "cost vector",
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_degenerate_cycling_hits_the_cap() {
        let mut problem = LinearProgram::with_variables(4);
        problem.maximize(vec![0.75, -20.0, 0.5, -6.0]);
        problem.constrain(vec![0.25, -8.0, -1.0, 9.0], ConstraintOp::Le, 0.0);
        problem.constrain(vec![0.5, -12.0, -0.5, 3.0], ConstraintOp::Le, 0.0);
        problem.constrain(vec![0.0, 0.0, 1.0, 0.0], ConstraintOp::Le, 1.0);

        let result = RevisedSimplex::from_problem(&problem).unwrap().solve();
        assert_eq!(result.status, SolutionStatus::NotConverged);
        assert_eq!(result.iterations, 100);
        assert!(result.objective_value.is_nan());
    }

    #[test]
    fn test_iteration_cap() {
        let result = RevisedSimplex::from_problem(&wyndor())
            .unwrap()
            .with_max_iterations(1)
            .solve();
        assert_eq!(result.status, SolutionStatus::NotConverged);
        assert_eq!(result.iterations, 1);
        assert_eq!(result.steps.last().unwrap().kind, RevisedStepKind::NotConverged);
    }
}

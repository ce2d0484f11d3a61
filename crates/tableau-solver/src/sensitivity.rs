//! Post-optimal analysis of a finished tableau run.
//!
//! Everything here reads the optimal tableau: its objective row holds `C_B·B⁻¹A - c`, and the
//! columns of the initial basis hold `B⁻¹`. What-if operations price the change through
//! `B⁻¹` first and only run the simplex method again when the current basis stops being
//! feasible or optimal.

use std::fmt;

use tracing::{debug, info};

use crate::error::ProblemError;
use crate::matrix::Matrix;
use crate::penalty::{PenaltyScalar, format_number};
use crate::problem::{Constraint, LinearProgram};
use crate::simplex::{Solver, Tableau, TableauSimplex};
use crate::solution::{Solution, SolutionStatus};
use crate::standard::{ColumnKind, StandardForm};

/// Marginal change of the optimal objective per unit increase of a right-hand side.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowPrice {
    pub constraint: usize,
    pub name: String,
    pub value: f64,
}

/// Interval an objective coefficient may move in without changing the optimal basis.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveRange {
    pub variable: usize,
    pub name: String,
    pub basic: bool,
    pub current: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Interval a right-hand side may move in while the optimal basis stays feasible.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RhsRange {
    pub constraint: usize,
    pub name: String,
    pub current: f64,
    pub lower: f64,
    pub upper: f64,
}

/// One line of a what-if analysis.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisStep {
    Info(String),
    Matrix { label: String, matrix: Matrix<f64> },
    Vector { label: String, values: Vec<f64> },
    Calculation(String),
    Verdict { preserved: bool, message: String },
}

impl fmt::Display for AnalysisStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisStep::Info(text) | AnalysisStep::Calculation(text) => f.write_str(text),
            AnalysisStep::Matrix { label, matrix } => {
                write!(f, "{label} =")?;
                for row in matrix.iter_rows() {
                    write!(f, "\n  {}", format_vector(row))?;
                }
                Ok(())
            }
            AnalysisStep::Vector { label, values } => write!(f, "{label} = {}", format_vector(values)),
            AnalysisStep::Verdict { preserved, message } => {
                let tag = if *preserved { "basis preserved" } else { "re-solve" };
                write!(f, "[{tag}] {message}")
            }
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The optimal basis survived the change
    BasisPreserved { objective_value: f64, values: Vec<f64> },
    /// The modified problem was solved from scratch
    Resolved(Box<Solution>),
}

/// Result of one what-if operation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Reoptimization {
    pub steps: Vec<AnalysisStep>,
    pub outcome: Outcome,
    /// The problem after the change
    pub problem: LinearProgram,
}

impl Reoptimization {
    pub fn is_preserved(&self) -> bool {
        matches!(self.outcome, Outcome::BasisPreserved { .. })
    }

    /// New optimal objective in the caller's sense.
    pub fn objective_value(&self) -> f64 {
        match &self.outcome {
            Outcome::BasisPreserved { objective_value, .. } => *objective_value,
            Outcome::Resolved(solution) => solution.objective_value,
        }
    }

    pub fn values(&self) -> &[f64] {
        match &self.outcome {
            Outcome::BasisPreserved { values, .. } => values,
            Outcome::Resolved(solution) => &solution.values,
        }
    }
}

/// Sensitivity report and what-if engine for an optimal tableau run.
#[derive(Debug, Clone)]
pub struct Sensitivity {
    problem: LinearProgram,
    solver: Solver,
    form: StandardForm,
    tableau: Tableau,
    b_inv: Matrix<f64>,
    x_b: Vec<f64>,
}

impl Sensitivity {
    /// `engine` must have finished with an optimal status on `problem`.
    pub fn new(problem: &LinearProgram, engine: &TableauSimplex) -> Result<Self, ProblemError> {
        match engine.status() {
            Some(SolutionStatus::Optimal) => {}
            other => return Err(ProblemError::NotOptimal(other.unwrap_or(SolutionStatus::NotConverged))),
        }
        problem.validate()?;
        let form = engine.standard_form().clone();
        if form.num_vars != problem.num_variables() {
            return Err(ProblemError::Dimension {
                what: "solved problem variables",
                expected: problem.num_variables(),
                found: form.num_vars,
            });
        }
        if form.num_rows() != problem.num_constraints() {
            return Err(ProblemError::Dimension {
                what: "solved problem constraints",
                expected: problem.num_constraints(),
                found: form.num_rows(),
            });
        }
        if form != StandardForm::new(problem) {
            return Err(ProblemError::ProblemMismatch);
        }

        let tableau = engine.tableau().clone();
        let m = form.num_rows();
        let mut b_inv = Matrix::new(m, m);
        for (k, &col) in form.initial_basis.iter().enumerate() {
            for i in 0..m {
                b_inv[(i, k)] = tableau.cells[(i + 1, col)].value;
            }
        }
        let x_b = (1..=m).map(|i| tableau.cells[(i, tableau.rhs_col())].value).collect();

        Ok(Self {
            problem: problem.clone(),
            solver: *engine.config(),
            form,
            tableau,
            b_inv,
            x_b,
        })
    }

    /// Solves `problem` and analyzes the result.
    pub fn analyze(problem: &LinearProgram, solver: &Solver) -> Result<Self, ProblemError> {
        let mut engine = solver.start(problem)?;
        engine.run();
        Self::new(problem, &engine)
    }

    pub fn problem(&self) -> &LinearProgram {
        &self.problem
    }

    pub fn basis(&self) -> &[usize] {
        &self.tableau.basic_vars
    }

    pub fn b_inv(&self) -> &Matrix<f64> {
        &self.b_inv
    }

    pub fn x_b(&self) -> &[f64] {
        &self.x_b
    }

    /// Optimal objective in the caller's sense.
    pub fn objective_value(&self) -> f64 {
        self.problem.orient(self.tableau.objective().value)
    }

    pub fn values(&self) -> Vec<f64> {
        self.values_for(&self.x_b)
    }

    fn values_for(&self, x_b: &[f64]) -> Vec<f64> {
        (0..self.form.num_vars)
            .map(|j| self.basic_row(j).map_or(0.0, |row| x_b[row]))
            .collect()
    }

    fn basic_row(&self, col: usize) -> Option<usize> {
        self.tableau.basic_vars.iter().position(|&b| b == col)
    }

    fn c_b(&self) -> Vec<PenaltyScalar> {
        self.tableau.basic_vars.iter().map(|&k| self.form.costs[k]).collect()
    }

    /// `B⁻¹a` for a column given in the original row orientation.
    fn price_column(&self, column: &[f64]) -> Vec<f64> {
        let oriented: Vec<f64> = column.iter().zip(&self.form.row_signs).map(|(a, s)| a * s).collect();
        self.b_inv.mul_vec(&oriented)
    }

    /// `c - C_B·d` in maximization form; positive means the column would improve the objective.
    fn reduced_cost(&self, cost: PenaltyScalar, d: &[f64], c_b: &[PenaltyScalar]) -> PenaltyScalar {
        let z = c_b.iter().zip(d).fold(PenaltyScalar::ZERO, |acc, (&c, &v)| acc + c * v);
        cost - z
    }

    fn breaks_optimality(&self, reduced: PenaltyScalar) -> bool {
        PenaltyScalar::ZERO.less_than_within(&reduced, self.tolerance())
    }

    fn tolerance(&self) -> f64 {
        self.solver.tolerance()
    }

    fn is_feasible(&self, x_b: &[f64]) -> bool {
        let tol = self.tolerance();
        x_b.iter().zip(&self.tableau.basic_vars).all(|(&x, &k)| {
            if self.form.is_artificial(k) {
                x.abs() <= tol
            } else {
                x >= -tol
            }
        })
    }

    fn constraint_name(&self, i: usize) -> String {
        self.problem.constraints[i].name.clone()
    }

    fn check_constraint(&self, index: usize) -> Result<(), ProblemError> {
        let count = self.problem.num_constraints();
        if index >= count {
            return Err(ProblemError::ConstraintIndex { index, count });
        }
        Ok(())
    }

    fn check_variable(&self, index: usize) -> Result<(), ProblemError> {
        let count = self.problem.num_variables();
        if index >= count {
            return Err(ProblemError::VariableIndex { index, count });
        }
        Ok(())
    }

    fn check_coefficients(&self, constraint: &Constraint) -> Result<(), ProblemError> {
        let expected = self.problem.num_variables();
        if constraint.coefficients.len() != expected {
            return Err(ProblemError::CoefficientCount {
                constraint: constraint.name.clone(),
                expected,
                found: constraint.coefficients.len(),
            });
        }
        Ok(())
    }

    /// Objective-row entry under each constraint's slack, signed as `∂Z/∂b` in the caller's
    /// sense. Equality constraints have no slack and report 0.
    pub fn shadow_prices(&self) -> Vec<ShadowPrice> {
        (0..self.form.num_rows())
            .map(|i| {
                let value = match self.form.slack_of[i] {
                    Some(col) => {
                        let sign = match self.form.columns[col] {
                            ColumnKind::Slack { sign, .. } => sign,
                            _ => 1.0,
                        };
                        let entry = self.tableau.reduced_cost(col).value;
                        self.problem.orient(entry * sign * self.form.row_signs[i])
                    }
                    None => 0.0,
                };
                ShadowPrice {
                    constraint: i,
                    name: self.constraint_name(i),
                    value,
                }
            })
            .collect()
    }

    /// Objective-coefficient ranges for every original variable.
    pub fn objective_ranges(&self) -> Vec<ObjectiveRange> {
        let max_costs = self.problem.max_objective();
        let n_cols = self.form.num_columns();

        (0..self.form.num_vars)
            .map(|j| {
                let c = max_costs[j];
                let (lower, upper, basic) = match self.basic_row(j) {
                    None => (f64::NEG_INFINITY, c + self.tableau.reduced_cost(j).value, false),
                    Some(row) => {
                        let mut lower = f64::NEG_INFINITY;
                        let mut upper = f64::INFINITY;
                        for k in (0..n_cols).filter(|&k| !self.tableau.is_basic(k) && !self.form.is_artificial(k)) {
                            let y = self.tableau.cells[(row + 1, k)].value;
                            if y.abs() <= self.tolerance() {
                                continue;
                            }
                            let delta = -self.tableau.reduced_cost(k).value / y;
                            if y > 0.0 {
                                lower = lower.max(delta);
                            } else {
                                upper = upper.min(delta);
                            }
                        }
                        (c + lower, c + upper, true)
                    }
                };
                let (lower, upper) = if self.problem.objective.minimize {
                    (-upper, -lower)
                } else {
                    (lower, upper)
                };
                ObjectiveRange {
                    variable: j,
                    name: self.problem.variables[j].clone(),
                    basic,
                    current: self.problem.objective.coefficients[j],
                    lower,
                    upper,
                }
            })
            .collect()
    }

    /// Right-hand-side ranges for every constraint, read from the columns of `B⁻¹`.
    ///
    /// A basic artificial variable has to stay at zero, so a constraint that moves one
    /// cannot change at all.
    pub fn rhs_ranges(&self) -> Vec<RhsRange> {
        let tol = self.tolerance();
        (0..self.form.num_rows())
            .map(|i| {
                let mut lower = f64::NEG_INFINITY;
                let mut upper = f64::INFINITY;
                for (r, &x) in self.x_b.iter().enumerate() {
                    let d = self.b_inv[(r, i)];
                    if d.abs() <= tol {
                        continue;
                    }
                    if self.form.is_artificial(self.tableau.basic_vars[r]) {
                        lower = lower.max(0.0);
                        upper = upper.min(0.0);
                        continue;
                    }
                    let delta = -x / d;
                    if d > 0.0 {
                        lower = lower.max(delta);
                    } else {
                        upper = upper.min(delta);
                    }
                }
                // Rows negated for a non-negative right-hand side move the other way.
                let (lower, upper) = if self.form.row_signs[i] < 0.0 {
                    (-upper, -lower)
                } else {
                    (lower, upper)
                };
                let current = self.problem.constraints[i].rhs;
                RhsRange {
                    constraint: i,
                    name: self.constraint_name(i),
                    current,
                    lower: current + lower,
                    upper: current + upper,
                }
            })
            .collect()
    }

    fn resolve(&self, problem: LinearProgram, mut steps: Vec<AnalysisStep>, reason: String) -> Result<Reoptimization, ProblemError> {
        debug!(%reason, "current basis rejected, re-solving");
        steps.push(AnalysisStep::Verdict {
            preserved: false,
            message: reason,
        });
        let solution = self.solver.solve(&problem)?;
        steps.push(AnalysisStep::Info(format!(
            "Full re-solve: {} after {} iterations",
            solution.status, solution.iterations
        )));
        info!(status = %solution.status, "re-solve finished");
        Ok(Reoptimization {
            steps,
            outcome: Outcome::Resolved(Box::new(solution)),
            problem,
        })
    }

    fn preserve(
        &self,
        problem: LinearProgram,
        mut steps: Vec<AnalysisStep>,
        message: String,
        objective_value: f64,
        values: Vec<f64>,
    ) -> Reoptimization {
        debug!(objective_value, "current basis preserved");
        steps.push(AnalysisStep::Verdict {
            preserved: true,
            message,
        });
        Reoptimization {
            steps,
            outcome: Outcome::BasisPreserved { objective_value, values },
            problem,
        }
    }

    /// Objective in the caller's sense at a new `xB` with the current `C_B`.
    fn objective_at(&self, x_b: &[f64]) -> f64 {
        let z: f64 = self.c_b().iter().zip(x_b).map(|(c, x)| c.value * x).sum();
        self.problem.orient(z)
    }

    /// Sets the right-hand side of constraint `index`.
    pub fn modify_rhs(&self, index: usize, value: f64) -> Result<Reoptimization, ProblemError> {
        self.check_constraint(index)?;
        let mut problem = self.problem.clone();
        let old = problem.constraints[index].rhs;
        problem.constraints[index].rhs = value;

        let b: Vec<f64> = problem
            .constraints
            .iter()
            .zip(&self.form.row_signs)
            .map(|(c, s)| c.rhs * s)
            .collect();
        let x_b = self.b_inv.mul_vec(&b);
        let mut steps = vec![
            AnalysisStep::Info(format!(
                "Changing the right-hand side of {} from {} to {}",
                self.constraint_name(index),
                format_number(old),
                format_number(value)
            )),
            AnalysisStep::Vector {
                label: "b'".to_string(),
                values: b,
            },
            AnalysisStep::Matrix {
                label: "B⁻¹".to_string(),
                matrix: self.b_inv.clone(),
            },
            AnalysisStep::Vector {
                label: "xB' = B⁻¹b'".to_string(),
                values: x_b.clone(),
            },
        ];

        if !self.is_feasible(&x_b) {
            return self.resolve(problem, steps, "xB' has a negative entry, the basis is infeasible".to_string());
        }
        let objective_value = self.objective_at(&x_b);
        steps.push(AnalysisStep::Calculation(format!(
            "Z' = C_B·xB' = {}",
            format_number(objective_value)
        )));
        let values = self.values_for(&x_b);
        Ok(self.preserve(
            problem,
            steps,
            "All basic variables stay non-negative, the basis remains optimal".to_string(),
            objective_value,
            values,
        ))
    }

    /// Sets the coefficient of `variable` in constraint `constraint`.
    pub fn modify_coefficient(&self, constraint: usize, variable: usize, value: f64) -> Result<Reoptimization, ProblemError> {
        self.check_constraint(constraint)?;
        self.check_variable(variable)?;
        let mut problem = self.problem.clone();
        let old = problem.constraints[constraint].coefficients[variable];
        problem.constraints[constraint].coefficients[variable] = value;
        let name = &self.problem.variables[variable];

        let mut steps = vec![AnalysisStep::Info(format!(
            "Changing the coefficient of {} in {} from {} to {}",
            name,
            self.constraint_name(constraint),
            format_number(old),
            format_number(value)
        ))];

        if self.basic_row(variable).is_some() {
            return self.resolve(problem, steps, format!("{name} is basic, so the basis matrix itself changes"));
        }

        let column: Vec<f64> = problem.constraints.iter().map(|c| c.coefficients[variable]).collect();
        let d = self.price_column(&column);
        let reduced = self.reduced_cost(self.form.costs[variable], &d, &self.c_b());
        steps.push(AnalysisStep::Vector {
            label: format!("B⁻¹a'({name})"),
            values: d,
        });
        steps.push(AnalysisStep::Calculation(format!("c - C_B·B⁻¹a' for {name} = {reduced}")));

        if self.breaks_optimality(reduced) {
            return self.resolve(problem, steps, format!("{name} now improves the objective, optimality is lost"));
        }
        Ok(self.preserve(
            problem,
            steps,
            format!("{name} stays nonbasic, the solution is unchanged"),
            self.objective_value(),
            self.values(),
        ))
    }

    /// Replaces constraint `index` as a whole.
    pub fn replace_constraint(&self, index: usize, constraint: Constraint) -> Result<Reoptimization, ProblemError> {
        self.check_constraint(index)?;
        self.check_coefficients(&constraint)?;
        let mut problem = self.problem.clone();
        let old = std::mem::replace(&mut problem.constraints[index], constraint.clone());
        let mut steps = vec![AnalysisStep::Info(format!(
            "Replacing {}: {} with {}",
            old.name,
            old.describe(&self.problem.variables),
            constraint.describe(&self.problem.variables)
        ))];

        if old.op != constraint.op || (constraint.rhs < 0.0) != (old.rhs < 0.0) {
            return self.resolve(problem, steps, "The relation changed, so the standard form changes".to_string());
        }

        let changed: Vec<usize> = (0..problem.num_variables())
            .filter(|&j| (old.coefficients[j] - constraint.coefficients[j]).abs() > self.tolerance())
            .collect();
        if let Some(&j) = changed.iter().find(|&&j| self.basic_row(j).is_some()) {
            let name = &self.problem.variables[j];
            return self.resolve(problem, steps, format!("The coefficient of basic variable {name} changed"));
        }

        let b: Vec<f64> = problem
            .constraints
            .iter()
            .zip(&self.form.row_signs)
            .map(|(c, s)| c.rhs * s)
            .collect();
        let x_b = self.b_inv.mul_vec(&b);
        steps.push(AnalysisStep::Vector {
            label: "xB' = B⁻¹b'".to_string(),
            values: x_b.clone(),
        });
        if !self.is_feasible(&x_b) {
            return self.resolve(problem, steps, "xB' has a negative entry, the basis is infeasible".to_string());
        }

        let c_b = self.c_b();
        for &j in &changed {
            let column: Vec<f64> = problem.constraints.iter().map(|c| c.coefficients[j]).collect();
            let reduced = self.reduced_cost(self.form.costs[j], &self.price_column(&column), &c_b);
            let name = &self.problem.variables[j];
            steps.push(AnalysisStep::Calculation(format!("c - C_B·B⁻¹a' for {name} = {reduced}")));
            if self.breaks_optimality(reduced) {
                return self.resolve(problem, steps, format!("{name} now improves the objective, optimality is lost"));
            }
        }

        let objective_value = self.objective_at(&x_b);
        let values = self.values_for(&x_b);
        Ok(self.preserve(
            problem,
            steps,
            "The basis stays feasible and optimal".to_string(),
            objective_value,
            values,
        ))
    }

    /// Sets the objective coefficient of `variable`, in the caller's sense.
    pub fn modify_objective(&self, variable: usize, value: f64) -> Result<Reoptimization, ProblemError> {
        self.check_variable(variable)?;
        let mut problem = self.problem.clone();
        let old = problem.objective.coefficients[variable];
        problem.objective.coefficients[variable] = value;
        let name = &self.problem.variables[variable];
        let cost = PenaltyScalar::real(problem.orient(value));

        let mut steps = vec![AnalysisStep::Info(format!(
            "Changing the objective coefficient of {} from {} to {}",
            name,
            format_number(old),
            format_number(value)
        ))];

        match self.basic_row(variable) {
            Some(row) => {
                let mut c_b = self.c_b();
                c_b[row] = cost;
                steps.push(AnalysisStep::Vector {
                    label: "C_B'".to_string(),
                    values: c_b.iter().map(|c| c.value).collect(),
                });
                let n_cols = self.form.num_columns();
                for k in (0..n_cols).filter(|&k| !self.tableau.is_basic(k) && !self.form.is_artificial(k)) {
                    let d: Vec<f64> = (1..=self.form.num_rows()).map(|i| self.tableau.cells[(i, k)].value).collect();
                    let reduced = self.reduced_cost(self.form.costs[k], &d, &c_b);
                    steps.push(AnalysisStep::Calculation(format!(
                        "c - C_B'·B⁻¹a for {} = {reduced}",
                        self.form.names[k]
                    )));
                    if self.breaks_optimality(reduced) {
                        let reason = format!("{} now improves the objective, optimality is lost", self.form.names[k]);
                        return self.resolve(problem, steps, reason);
                    }
                }
                let values = self.values();
                let objective_value = problem.evaluate(&values);
                Ok(self.preserve(
                    problem,
                    steps,
                    "No nonbasic variable can improve the objective, the basis remains optimal".to_string(),
                    objective_value,
                    values,
                ))
            }
            None => {
                let d: Vec<f64> = (1..=self.form.num_rows())
                    .map(|i| self.tableau.cells[(i, variable)].value)
                    .collect();
                let reduced = self.reduced_cost(cost, &d, &self.c_b());
                steps.push(AnalysisStep::Calculation(format!("c' - C_B·B⁻¹a for {name} = {reduced}")));
                if self.breaks_optimality(reduced) {
                    return self.resolve(problem, steps, format!("{name} now improves the objective, optimality is lost"));
                }
                Ok(self.preserve(
                    problem,
                    steps,
                    format!("{name} stays nonbasic, the solution is unchanged"),
                    self.objective_value(),
                    self.values(),
                ))
            }
        }
    }

    /// Appends a constraint to the problem.
    pub fn add_constraint(&self, constraint: Constraint) -> Result<Reoptimization, ProblemError> {
        self.check_coefficients(&constraint)?;
        let mut problem = self.problem.clone();
        problem.constraints.push(constraint.clone());

        let values = self.values();
        let lhs = constraint.lhs(&values);
        let steps = vec![
            AnalysisStep::Info(format!(
                "Adding {}: {}",
                constraint.name,
                constraint.describe(&self.problem.variables)
            )),
            AnalysisStep::Calculation(format!(
                "At the current optimum the left-hand side is {} (right-hand side {})",
                format_number(lhs),
                format_number(constraint.rhs)
            )),
        ];

        if !constraint.is_satisfied_by(&values) {
            return self.resolve(problem, steps, "The current optimum violates the new constraint".to_string());
        }
        Ok(self.preserve(
            problem,
            steps,
            "The current optimum already satisfies the new constraint".to_string(),
            self.objective_value(),
            values,
        ))
    }

    /// Appends a variable with objective coefficient `objective` (caller's sense) and one
    /// coefficient per constraint.
    pub fn add_variable(&self, name: impl Into<String>, objective: f64, column: Vec<f64>) -> Result<Reoptimization, ProblemError> {
        let name = name.into();
        if column.len() != self.problem.num_constraints() {
            return Err(ProblemError::Dimension {
                what: "new variable column",
                expected: self.problem.num_constraints(),
                found: column.len(),
            });
        }
        if !objective.is_finite() || column.iter().any(|a| !a.is_finite()) {
            return Err(ProblemError::NonFinite(format!("variable {name}")));
        }

        let mut problem = self.problem.clone();
        problem.variables.push(name.clone());
        problem.objective.coefficients.push(objective);
        for (c, &a) in problem.constraints.iter_mut().zip(&column) {
            c.coefficients.push(a);
        }

        let d = self.price_column(&column);
        let reduced = self.reduced_cost(PenaltyScalar::real(self.problem.orient(objective)), &d, &self.c_b());
        let mut steps = vec![
            AnalysisStep::Info(format!("Adding variable {name} with objective coefficient {}", format_number(objective))),
            AnalysisStep::Vector {
                label: format!("B⁻¹a({name})"),
                values: d,
            },
            AnalysisStep::Calculation(format!("c - C_B·B⁻¹a for {name} = {reduced}")),
        ];

        if self.breaks_optimality(reduced) {
            return self.resolve(problem, steps, format!("{name} improves the objective, it enters the basis"));
        }
        let mut values = self.values();
        values.push(0.0);
        steps.push(AnalysisStep::Info(format!("{name} = 0")));
        Ok(self.preserve(
            problem,
            steps,
            format!("{name} is not worth producing, the basis remains optimal"),
            self.objective_value(),
            values,
        ))
    }
}

fn format_vector(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|&v| format_number(v)).collect();
    format!("[{}]", parts.join(", "))
}

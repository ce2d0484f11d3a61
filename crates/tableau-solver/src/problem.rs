use std::fmt;

use crate::error::ProblemError;
use crate::penalty::{EPSILON, format_number};

/// A linear program `max|min c·x` subject to linear constraints and `x ≥ 0`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LinearProgram {
    /// Variable names
    pub variables: Vec<String>,
    /// Objective function
    pub objective: Objective,
    /// Constraints, in the order they are numbered
    pub constraints: Vec<Constraint>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// Coefficients for each variable, as the caller wrote them
    pub coefficients: Vec<f64>,
    /// Whether to minimize or maximize
    pub minimize: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Comparison operator
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    #[cfg_attr(feature = "serde", serde(rename = "<=", alias = "le", alias = "≤"))]
    Le,
    /// Greater than or equal (>=)
    #[cfg_attr(feature = "serde", serde(rename = ">=", alias = "ge", alias = "≥"))]
    Ge,
    /// Equal (=)
    #[cfg_attr(feature = "serde", serde(rename = "=", alias = "eq", alias = "=="))]
    Eq,
}

impl ConstraintOp {
    /// The relation obtained by multiplying both sides by -1.
    pub fn flipped(self) -> Self {
        match self {
            ConstraintOp::Le => ConstraintOp::Ge,
            ConstraintOp::Ge => ConstraintOp::Le,
            ConstraintOp::Eq => ConstraintOp::Eq,
        }
    }
}

impl fmt::Display for ConstraintOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            ConstraintOp::Le => "≤",
            ConstraintOp::Ge => "≥",
            ConstraintOp::Eq => "=",
        };
        f.write_str(symbol)
    }
}

impl Constraint {
    pub fn new(name: impl Into<String>, coefficients: Vec<f64>, op: ConstraintOp, rhs: f64) -> Self {
        Self {
            name: name.into(),
            coefficients,
            op,
            rhs,
        }
    }

    /// Left-hand side evaluated at `values`.
    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.coefficients.iter().zip(values).map(|(a, x)| a * x).sum()
    }

    pub fn is_satisfied_by(&self, values: &[f64]) -> bool {
        let lhs = self.lhs(values);
        match self.op {
            ConstraintOp::Le => lhs <= self.rhs + EPSILON,
            ConstraintOp::Ge => lhs >= self.rhs - EPSILON,
            ConstraintOp::Eq => (lhs - self.rhs).abs() <= EPSILON,
        }
    }

    /// Renders `a1·x1 + a2·x2 ≤ b` with the given variable names.
    pub fn describe(&self, variables: &[String]) -> String {
        let mut out = String::new();
        for (j, &a) in self.coefficients.iter().enumerate() {
            if a.abs() <= EPSILON {
                continue;
            }
            let name = variables.get(j).map_or("?", String::as_str);
            let coef = if (a.abs() - 1.0).abs() <= EPSILON {
                String::new()
            } else {
                format_number(a.abs())
            };
            if out.is_empty() {
                let sign = if a < 0.0 { "-" } else { "" };
                out.push_str(&format!("{sign}{coef}{name}"));
            } else {
                let sign = if a < 0.0 { '-' } else { '+' };
                out.push_str(&format!(" {sign} {coef}{name}"));
            }
        }
        if out.is_empty() {
            out.push('0');
        }
        format!("{} {} {}", out, self.op, format_number(self.rhs))
    }
}

impl LinearProgram {
    pub fn new(variables: Vec<String>) -> Self {
        let n = variables.len();
        Self {
            variables,
            objective: Objective {
                coefficients: vec![0.0; n],
                minimize: false,
            },
            constraints: Vec::new(),
        }
    }

    /// A problem over `n` variables named `x1..xn`.
    pub fn with_variables(n: usize) -> Self {
        Self::new((1..=n).map(|j| format!("x{j}")).collect())
    }

    pub fn set_objective(&mut self, coefficients: Vec<f64>, minimize: bool) {
        self.objective = Objective { coefficients, minimize };
    }

    pub fn maximize(&mut self, coefficients: Vec<f64>) {
        self.set_objective(coefficients, false);
    }

    pub fn minimize(&mut self, coefficients: Vec<f64>) {
        self.set_objective(coefficients, true);
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, coefficients: Vec<f64>, op: ConstraintOp, rhs: f64) {
        self.constraints.push(Constraint::new(name, coefficients, op, rhs));
    }

    /// Adds a constraint named after its position (`c1`, `c2`, ...).
    pub fn constrain(&mut self, coefficients: Vec<f64>, op: ConstraintOp, rhs: f64) {
        let name = format!("c{}", self.constraints.len() + 1);
        self.add_constraint(name, coefficients, op, rhs);
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Same objective and variables, different constraint set.
    pub fn with_constraints(&self, constraints: Vec<Constraint>) -> Self {
        Self {
            variables: self.variables.clone(),
            objective: self.objective.clone(),
            constraints,
        }
    }

    /// Objective coefficients in maximization form.
    pub fn max_objective(&self) -> Vec<f64> {
        self.objective
            .coefficients
            .iter()
            .map(|&c| if self.objective.minimize { -c } else { c })
            .collect()
    }

    /// Converts between the caller's objective sense and maximization form (the map is its own inverse).
    pub fn orient(&self, value: f64) -> f64 {
        if self.objective.minimize { -value } else { value }
    }

    /// Objective evaluated at `values`, in the caller's sense.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.objective.coefficients.iter().zip(values).map(|(c, x)| c * x).sum()
    }

    /// `c1·x1 + ...` as text, in the caller's sense.
    pub fn describe_objective(&self) -> String {
        let sense = if self.objective.minimize { "min" } else { "max" };
        let expr = Constraint::new("", self.objective.coefficients.clone(), ConstraintOp::Eq, 0.0)
            .describe(&self.variables);
        let expr = expr.trim_end_matches(" = 0");
        format!("{sense} Z = {expr}")
    }

    pub fn validate(&self) -> Result<(), ProblemError> {
        let n = self.num_variables();
        if n == 0 {
            return Err(ProblemError::NoVariables);
        }
        if self.objective.coefficients.len() != n {
            return Err(ProblemError::ObjectiveLength {
                expected: n,
                found: self.objective.coefficients.len(),
            });
        }
        if self.objective.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ProblemError::NonFinite("objective".to_string()));
        }
        for c in &self.constraints {
            if c.coefficients.len() != n {
                return Err(ProblemError::CoefficientCount {
                    constraint: c.name.clone(),
                    expected: n,
                    found: c.coefficients.len(),
                });
            }
            if !c.rhs.is_finite() || c.coefficients.iter().any(|a| !a.is_finite()) {
                return Err(ProblemError::NonFinite(format!("constraint {}", c.name)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_names_constraints_by_position() {
        let mut problem = LinearProgram::with_variables(2);
        problem.maximize(vec![3.0, 5.0]);
        problem.constrain(vec![1.0, 0.0], ConstraintOp::Le, 4.0);
        problem.constrain(vec![0.0, 2.0], ConstraintOp::Le, 12.0);

        assert_eq!(problem.variables, vec!["x1", "x2"]);
        assert_eq!(problem.constraints[1].name, "c2");
        assert!(problem.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_length_mismatch() {
        let mut problem = LinearProgram::with_variables(2);
        problem.maximize(vec![1.0, 1.0]);
        problem.add_constraint("short", vec![1.0], ConstraintOp::Le, 1.0);

        assert_eq!(
            problem.validate(),
            Err(ProblemError::CoefficientCount {
                constraint: "short".to_string(),
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let mut problem = LinearProgram::with_variables(1);
        problem.maximize(vec![f64::NAN]);
        assert!(matches!(problem.validate(), Err(ProblemError::NonFinite(_))));
    }

    #[test]
    fn test_minimization_is_negated_for_the_engine() {
        let mut problem = LinearProgram::with_variables(2);
        problem.minimize(vec![2.0, -3.0]);
        assert_eq!(problem.max_objective(), vec![-2.0, 3.0]);
        assert_eq!(problem.orient(5.0), -5.0);
    }

    #[test]
    fn test_describe() {
        let names = vec!["x1".to_string(), "x2".to_string()];
        let c = Constraint::new("c", vec![3.0, -1.0], ConstraintOp::Ge, 2.5);
        assert_eq!(c.describe(&names), "3x1 - x2 ≥ 2.5");
        assert!(c.is_satisfied_by(&[1.0, 0.5]));
        assert!(!c.is_satisfied_by(&[0.0, 0.0]));
    }
}

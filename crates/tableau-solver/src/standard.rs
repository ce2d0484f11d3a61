//! Translation of a [`LinearProgram`] into equality form with slack, surplus and artificial
//! columns. Both simplex engines and the sensitivity analysis number columns through this
//! type, so a column index means the same thing everywhere.

use crate::matrix::Matrix;
use crate::penalty::PenaltyScalar;
use crate::problem::{ConstraintOp, LinearProgram};

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnKind {
    /// Original variable `j`
    Decision(usize),
    /// Slack (`sign = 1`) or surplus (`sign = -1`) of a constraint
    Slack { constraint: usize, sign: f64 },
    /// Artificial variable of a `≥` or `=` constraint
    Artificial { constraint: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StandardForm {
    pub num_vars: usize,
    pub columns: Vec<ColumnKind>,
    /// Column names, `x1.. s1.. a1..`
    pub names: Vec<String>,
    /// Constraint matrix over all columns
    pub a: Matrix<f64>,
    /// Non-negative right-hand side
    pub b: Vec<f64>,
    /// Costs in maximization form; artificials cost `-M`
    pub costs: Vec<PenaltyScalar>,
    /// Column that is basic in each row at the start; together these form the identity
    pub initial_basis: Vec<usize>,
    /// `-1` for rows that were negated to make the right-hand side non-negative
    pub row_signs: Vec<f64>,
    pub slack_of: Vec<Option<usize>>,
    pub artificial_of: Vec<Option<usize>>,
}

impl StandardForm {
    /// Assumes `problem` has been validated.
    pub fn new(problem: &LinearProgram) -> Self {
        let n = problem.num_variables();
        let m = problem.num_constraints();

        let mut row_signs = Vec::with_capacity(m);
        let mut ops = Vec::with_capacity(m);
        for c in &problem.constraints {
            if c.rhs < 0.0 {
                row_signs.push(-1.0);
                ops.push(c.op.flipped());
            } else {
                row_signs.push(1.0);
                ops.push(c.op);
            }
        }

        let n_slack = ops.iter().filter(|op| **op != ConstraintOp::Eq).count();
        let n_artificial = ops.iter().filter(|op| **op != ConstraintOp::Le).count();
        let total = n + n_slack + n_artificial;

        let mut columns: Vec<ColumnKind> = (0..n).map(ColumnKind::Decision).collect();
        let mut names = problem.variables.clone();
        let mut slack_of = vec![None; m];
        let mut artificial_of = vec![None; m];

        for (i, op) in ops.iter().enumerate() {
            let sign = match op {
                ConstraintOp::Le => 1.0,
                ConstraintOp::Ge => -1.0,
                ConstraintOp::Eq => continue,
            };
            slack_of[i] = Some(columns.len());
            columns.push(ColumnKind::Slack { constraint: i, sign });
            names.push(format!("s{}", i + 1));
        }
        for (i, op) in ops.iter().enumerate() {
            if *op == ConstraintOp::Le {
                continue;
            }
            artificial_of[i] = Some(columns.len());
            columns.push(ColumnKind::Artificial { constraint: i });
            names.push(format!("a{}", i + 1));
        }

        let mut a = Matrix::new(m, total);
        let mut b = Vec::with_capacity(m);
        for (i, c) in problem.constraints.iter().enumerate() {
            for (j, &coef) in c.coefficients.iter().enumerate() {
                a[(i, j)] = row_signs[i] * coef;
            }
            b.push(row_signs[i] * c.rhs);
        }
        for (col, kind) in columns.iter().enumerate() {
            match *kind {
                ColumnKind::Decision(_) => {}
                ColumnKind::Slack { constraint, sign } => a[(constraint, col)] = sign,
                ColumnKind::Artificial { constraint } => a[(constraint, col)] = 1.0,
            }
        }

        let max_objective = problem.max_objective();
        let costs = columns
            .iter()
            .map(|kind| match *kind {
                ColumnKind::Decision(j) => PenaltyScalar::real(max_objective[j]),
                ColumnKind::Slack { .. } => PenaltyScalar::ZERO,
                ColumnKind::Artificial { .. } => -PenaltyScalar::M,
            })
            .collect();

        let initial_basis = (0..m)
            .map(|i| artificial_of[i].or(slack_of[i]).unwrap_or_default())
            .collect();

        Self {
            num_vars: n,
            columns,
            names,
            a,
            b,
            costs,
            initial_basis,
            row_signs,
            slack_of,
            artificial_of,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.a.rows()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_artificial(&self) -> usize {
        self.artificial_of.iter().flatten().count()
    }

    pub fn is_artificial(&self, col: usize) -> bool {
        matches!(self.columns[col], ColumnKind::Artificial { .. })
    }

    /// Constraint-matrix column `j`.
    pub fn column(&self, j: usize) -> Vec<f64> {
        self.a.column(j)
    }
}

//! Branch-and-bound over tableau-simplex relaxations.
//!
//! The search tree is kept as a flat list of [`BranchNode`]s with parent ids, in the order
//! the nodes were solved. Nodes are explored depth-first, left (`x ≤ ⌊v⌋`) before right
//! (`x ≥ ⌈v⌉`), from an explicit work stack.

use std::fmt;

use tracing::{debug, info, warn};

use crate::error::ProblemError;
use crate::penalty::{EPSILON, format_number};
use crate::problem::{Constraint, ConstraintOp, LinearProgram};
use crate::simplex::Solver;
use crate::solution::{Solution, SolutionStatus};

#[derive(Debug, Clone, Copy)]
pub struct BranchAndBound {
    solver: Solver,
    /// Stop after solving this many nodes
    max_nodes: Option<usize>,
    /// A value whose fractional part is within this distance of 0 or 1 counts as integral
    integer_tolerance: f64,
}

impl Default for BranchAndBound {
    fn default() -> Self {
        Self {
            solver: Solver::default(),
            max_nodes: None,
            integer_tolerance: 0.001,
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PruneReason {
    /// The relaxation has no feasible point
    Infeasible,
    /// The relaxation ended unbounded or hit the iteration cap
    NotSolved(SolutionStatus),
    /// The relaxation could not beat the incumbent objective
    Bounded { incumbent: f64, minimize: bool },
}

impl fmt::Display for PruneReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PruneReason::Infeasible => f.write_str("Infeasible"),
            PruneReason::NotSolved(status) => write!(f, "Not solved ({status})"),
            PruneReason::Bounded { incumbent, minimize } => {
                let op = if *minimize { ">=" } else { "<=" };
                write!(f, "Bounded (Z {op} {incumbent:.2})")
            }
        }
    }
}

/// Variable a node branched on and its fractional relaxation value
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Branching {
    pub variable: usize,
    pub value: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BranchNode {
    pub id: usize,
    /// `None` for the root
    pub parent_id: Option<usize>,
    pub depth: usize,
    /// Original constraints plus every bound added on the path from the root
    pub constraints: Vec<Constraint>,
    /// The bound this node added to its parent's constraints
    pub added_constraint: Option<Constraint>,
    /// LP relaxation, with its full step trace
    pub relaxation: Solution,
    pub prune_reason: Option<PruneReason>,
    /// This node's relaxation was integral and became the incumbent
    pub is_integer_solution: bool,
    pub branch: Option<Branching>,
}

/// Best integral solution found by a search
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Incumbent {
    pub node_id: usize,
    pub objective_value: f64,
    pub values: Vec<f64>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BranchAndBoundResult {
    /// Solved nodes in visiting order
    pub nodes: Vec<BranchNode>,
    /// `None` when no integral solution was found
    pub best: Option<Incumbent>,
    /// The search stopped early because of the node limit
    pub node_limit_reached: bool,
}

impl BranchAndBoundResult {
    pub fn best_objective(&self) -> Option<f64> {
        self.best.as_ref().map(|b| b.objective_value)
    }

    pub fn node(&self, id: usize) -> Option<&BranchNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn root(&self) -> Option<&BranchNode> {
        self.nodes.first()
    }

    /// Tree view: the solved children of node `id`, left child first.
    pub fn children(&self, id: usize) -> Vec<&BranchNode> {
        let mut children: Vec<&BranchNode> = self.nodes.iter().filter(|n| n.parent_id == Some(id)).collect();
        children.sort_by_key(|n| n.id);
        children
    }
}

impl BranchAndBound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Solver used for every LP relaxation.
    pub fn with_solver(mut self, solver: Solver) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_max_nodes(mut self, max: usize) -> Self {
        self.max_nodes = Some(max);
        self
    }

    pub fn with_integer_tolerance(mut self, tol: f64) -> Self {
        self.integer_tolerance = tol;
        self
    }

    /// Solve with every variable required to be integral.
    pub fn solve(&self, problem: &LinearProgram) -> Result<BranchAndBoundResult, ProblemError> {
        let mask = vec![true; problem.num_variables()];
        self.solve_mixed(problem, &mask)
    }

    /// Solve with `integer[j]` telling whether variable `j` must be integral.
    pub fn solve_mixed(&self, problem: &LinearProgram, integer: &[bool]) -> Result<BranchAndBoundResult, ProblemError> {
        problem.validate()?;
        if integer.len() != problem.num_variables() {
            return Err(ProblemError::IntegerMaskLength {
                expected: problem.num_variables(),
                found: integer.len(),
            });
        }
        let mut search = Search::new(self, problem, integer);
        search.run()?;
        Ok(search.finish())
    }
}

/// A node that has an id but has not been solved yet.
struct Pending {
    id: usize,
    parent_id: Option<usize>,
    depth: usize,
    constraints: Vec<Constraint>,
    added_constraint: Option<Constraint>,
}

/// State of one branch-and-bound run.
struct Search<'a> {
    config: &'a BranchAndBound,
    problem: &'a LinearProgram,
    integer: &'a [bool],
    next_id: usize,
    nodes: Vec<BranchNode>,
    best: Option<Incumbent>,
    node_limit_reached: bool,
}

impl<'a> Search<'a> {
    fn new(config: &'a BranchAndBound, problem: &'a LinearProgram, integer: &'a [bool]) -> Self {
        Self {
            config,
            problem,
            integer,
            next_id: 0,
            nodes: Vec::new(),
            best: None,
            node_limit_reached: false,
        }
    }

    fn minimize(&self) -> bool {
        self.problem.objective.minimize
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn incumbent_objective(&self) -> f64 {
        match &self.best {
            Some(best) => best.objective_value,
            None if self.minimize() => f64::INFINITY,
            None => f64::NEG_INFINITY,
        }
    }

    fn run(&mut self) -> Result<(), ProblemError> {
        let root = Pending {
            id: self.next_id(),
            parent_id: None,
            depth: 0,
            constraints: self.problem.constraints.clone(),
            added_constraint: None,
        };
        let mut stack = vec![root];

        while let Some(pending) = stack.pop() {
            if self.config.max_nodes.is_some_and(|max| self.nodes.len() >= max) {
                warn!(nodes = self.nodes.len(), "node limit reached");
                self.node_limit_reached = true;
                break;
            }
            if let Some((left, right)) = self.process(pending)? {
                stack.push(right);
                stack.push(left);
            }
        }
        Ok(())
    }

    /// Solves one node and returns its children if it branched.
    fn process(&mut self, pending: Pending) -> Result<Option<(Pending, Pending)>, ProblemError> {
        let relaxed = self.problem.with_constraints(pending.constraints.clone());
        let relaxation = self.config.solver.solve(&relaxed)?;
        let mut node = BranchNode {
            id: pending.id,
            parent_id: pending.parent_id,
            depth: pending.depth,
            constraints: pending.constraints,
            added_constraint: pending.added_constraint,
            relaxation,
            prune_reason: None,
            is_integer_solution: false,
            branch: None,
        };

        if node.relaxation.status != SolutionStatus::Optimal {
            debug!(node = node.id, status = %node.relaxation.status, "pruned, relaxation not optimal");
            node.prune_reason = Some(match node.relaxation.status {
                SolutionStatus::Infeasible => PruneReason::Infeasible,
                status => PruneReason::NotSolved(status),
            });
            self.nodes.push(node);
            return Ok(None);
        }

        let z = node.relaxation.objective_value;
        let incumbent = self.incumbent_objective();
        let cannot_improve = if self.minimize() {
            z >= incumbent - EPSILON
        } else {
            z <= incumbent + EPSILON
        };
        if cannot_improve {
            debug!(node = node.id, z, incumbent, "pruned by bound");
            node.prune_reason = Some(PruneReason::Bounded {
                incumbent,
                minimize: self.minimize(),
            });
            self.nodes.push(node);
            return Ok(None);
        }

        let Some(branch) = self.fractional_variable(&node.relaxation.values) else {
            debug!(node = node.id, z, "new incumbent");
            let values = node
                .relaxation
                .values
                .iter()
                .zip(self.integer)
                .map(|(&v, &int)| if int { v.round() } else { v })
                .collect();
            self.best = Some(Incumbent {
                node_id: node.id,
                objective_value: z,
                values,
            });
            node.is_integer_solution = true;
            self.nodes.push(node);
            return Ok(None);
        };

        let name = &self.problem.variables[branch.variable];
        let floor = branch.value.floor();
        let ceil = branch.value.ceil();
        debug!(node = node.id, variable = %name, value = branch.value, "branching");

        let mut unit = vec![0.0; self.problem.num_variables()];
        unit[branch.variable] = 1.0;
        let left_bound = Constraint::new(
            format!("{} ≤ {}", name, format_number(floor)),
            unit.clone(),
            ConstraintOp::Le,
            floor,
        );
        let right_bound = Constraint::new(format!("{} ≥ {}", name, format_number(ceil)), unit, ConstraintOp::Ge, ceil);

        let left = self.child(&node, left_bound);
        let right = self.child(&node, right_bound);
        node.branch = Some(branch);
        self.nodes.push(node);
        Ok(Some((left, right)))
    }

    fn child(&mut self, parent: &BranchNode, bound: Constraint) -> Pending {
        let mut constraints = parent.constraints.clone();
        constraints.push(bound.clone());
        Pending {
            id: self.next_id(),
            parent_id: Some(parent.id),
            depth: parent.depth + 1,
            constraints,
            added_constraint: Some(bound),
        }
    }

    /// First integral variable whose value is not integral (first found, not most fractional).
    fn fractional_variable(&self, values: &[f64]) -> Option<Branching> {
        let tol = self.config.integer_tolerance;
        values
            .iter()
            .enumerate()
            .filter(|&(j, _)| self.integer[j])
            .find(|&(_, &v)| {
                let frac = v - v.floor();
                frac > tol && frac < 1.0 - tol
            })
            .map(|(variable, &value)| Branching { variable, value })
    }

    fn finish(self) -> BranchAndBoundResult {
        info!(
            nodes = self.nodes.len(),
            best = ?self.best.as_ref().map(|b| b.objective_value),
            "branch and bound finished"
        );
        BranchAndBoundResult {
            nodes: self.nodes,
            best: self.best,
            node_limit_reached: self.node_limit_reached,
        }
    }
}

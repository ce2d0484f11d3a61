//! Property-based tests across the engines
//!
//! Random instances use strictly positive constraint coefficients, so every `≤` instance is
//! bounded and has the origin as a feasible point.

use proptest::prelude::*;
use tableau_solver::*;

const TOL: f64 = 1e-6;

#[derive(Debug, Clone)]
struct Instance {
    objective: Vec<f64>,
    rows: Vec<(Vec<f64>, f64)>,
}

impl Instance {
    fn program(&self, op: ConstraintOp, minimize: bool) -> LinearProgram {
        let mut problem = LinearProgram::with_variables(self.objective.len());
        problem.set_objective(self.objective.clone(), minimize);
        for (coefficients, rhs) in &self.rows {
            problem.constrain(coefficients.clone(), op, *rhs);
        }
        problem
    }
}

fn instance(max_vars: usize, max_rows: usize, max_rhs: u32) -> impl Strategy<Value = Instance> {
    (1..=max_vars, 1..=max_rows).prop_flat_map(move |(n, m)| {
        let objective = prop::collection::vec(0u32..=5, n);
        let row = (prop::collection::vec(1u32..=4, n), 1u32..=max_rhs);
        let rows = prop::collection::vec(row, m);
        (objective, rows).prop_map(|(objective, rows)| Instance {
            objective: objective.into_iter().map(f64::from).collect(),
            rows: rows
                .into_iter()
                .map(|(coefficients, rhs)| (coefficients.into_iter().map(f64::from).collect(), f64::from(rhs)))
                .collect(),
        })
    })
}

/// Instance with any mix of relations, signs and objective sense. It may be infeasible or
/// unbounded.
#[derive(Debug, Clone)]
struct MixedInstance {
    objective: Vec<f64>,
    minimize: bool,
    rows: Vec<(Vec<f64>, ConstraintOp, f64)>,
}

impl MixedInstance {
    fn program(&self) -> LinearProgram {
        let mut problem = LinearProgram::with_variables(self.objective.len());
        problem.set_objective(self.objective.clone(), self.minimize);
        for (coefficients, op, rhs) in &self.rows {
            problem.constrain(coefficients.clone(), *op, *rhs);
        }
        problem
    }
}

fn relation() -> impl Strategy<Value = ConstraintOp> {
    prop_oneof![Just(ConstraintOp::Le), Just(ConstraintOp::Ge), Just(ConstraintOp::Eq)]
}

fn mixed_instance() -> impl Strategy<Value = MixedInstance> {
    (1usize..=3, 1usize..=3).prop_flat_map(|(n, m)| {
        let objective = prop::collection::vec(-3i32..=5, n);
        let row = (prop::collection::vec(-2i32..=4, n), relation(), -10i32..=15);
        (objective, any::<bool>(), prop::collection::vec(row, m)).prop_map(|(objective, minimize, rows)| {
            MixedInstance {
                objective: objective.into_iter().map(f64::from).collect(),
                minimize,
                rows: rows
                    .into_iter()
                    .map(|(coefficients, op, rhs)| (coefficients.into_iter().map(f64::from).collect(), op, f64::from(rhs)))
                    .collect(),
            }
        })
    })
}

fn satisfies(problem: &LinearProgram, values: &[f64]) -> bool {
    values.iter().all(|&v| v >= -TOL)
        && problem.constraints.iter().all(|c| {
            let lhs = c.lhs(values);
            match c.op {
                ConstraintOp::Le => lhs <= c.rhs + TOL,
                ConstraintOp::Ge => lhs >= c.rhs - TOL,
                ConstraintOp::Eq => (lhs - c.rhs).abs() <= TOL,
            }
        })
}

/// Applies one of the what-if operations, picked by `kind`.
fn what_if(
    analysis: &Sensitivity,
    kind: usize,
    row: usize,
    var: usize,
    value: f64,
    column: &[f64],
) -> Result<Reoptimization, ProblemError> {
    let problem = analysis.problem();
    let row = row % problem.num_constraints();
    let var = var % problem.num_variables();
    let coefficients = column[..problem.num_variables()].to_vec();
    match kind {
        0 => analysis.modify_rhs(row, value),
        1 => analysis.modify_coefficient(row, var, value),
        2 => {
            let op = problem.constraints[row].op;
            analysis.replace_constraint(row, Constraint::new("replacement", coefficients, op, value))
        }
        3 => analysis.modify_objective(var, value),
        4 => analysis.add_constraint(Constraint::new("extra", coefficients, ConstraintOp::Le, value)),
        _ => analysis.add_variable("y", value, column[..problem.num_constraints()].to_vec()),
    }
}

/// Best objective over every integer point of the box `0..=bound`.
fn enumerate(problem: &LinearProgram, bound: u32) -> f64 {
    let n = problem.num_variables();
    let mut best = f64::NEG_INFINITY;
    let mut point = vec![0u32; n];
    loop {
        let values: Vec<f64> = point.iter().map(|&v| f64::from(v)).collect();
        if problem.constraints.iter().all(|c| c.is_satisfied_by(&values)) {
            best = best.max(problem.evaluate(&values));
        }
        let Some(j) = point.iter().position(|&v| v < bound) else {
            return best;
        };
        point[j] += 1;
        for v in &mut point[..j] {
            *v = 0;
        }
    }
}

proptest! {
    #[test]
    fn optimal_tableau_has_zero_reduced_cost_on_basic_columns(inst in instance(3, 3, 20)) {
        let problem = inst.program(ConstraintOp::Le, false);
        let solution = Solver::new().solve(&problem).unwrap();
        prop_assert_eq!(solution.status, SolutionStatus::Optimal);

        let last = solution.final_step().unwrap();
        for &col in &last.basic_vars {
            let entry = last.tableau[(0, col)];
            prop_assert!(entry.is_zero(), "basic column {} has objective entry {}", col, entry);
        }
        for j in 0..last.tableau.cols() - 1 {
            prop_assert!(!last.tableau[(0, j)].is_negative());
        }
    }

    #[test]
    fn objective_never_decreases_over_pivots(inst in instance(3, 3, 20)) {
        let problem = inst.program(ConstraintOp::Le, false);
        let solution = Solver::new().solve(&problem).unwrap();
        for pair in solution.steps.windows(2) {
            let before = pair[0].objective();
            let after = pair[1].objective();
            prop_assert!(!after.less_than(&before), "{} then {}", before, after);
        }
    }

    #[test]
    fn revised_and_tableau_agree_on_maximization(inst in instance(3, 3, 20)) {
        let problem = inst.program(ConstraintOp::Le, false);
        let tableau = Solver::new().solve(&problem).unwrap();
        let revised = RevisedSimplex::from_problem(&problem).unwrap().solve();
        prop_assert_eq!(tableau.status, revised.status);
        prop_assert!((tableau.objective_value - revised.objective_value).abs() < TOL);
    }

    #[test]
    fn revised_and_tableau_agree_on_covering_problems(inst in instance(3, 3, 10)) {
        // min c·x over x with positive rows >= rhs: feasible, and bounded because c >= 0
        let problem = inst.program(ConstraintOp::Ge, true);
        let tableau = Solver::new().solve(&problem).unwrap();
        let revised = RevisedSimplex::from_problem(&problem).unwrap().solve();
        prop_assert_eq!(tableau.status, SolutionStatus::Optimal);
        prop_assert_eq!(revised.status, SolutionStatus::Optimal);
        prop_assert!((tableau.objective_value - revised.objective_value).abs() < TOL);
        for c in &problem.constraints {
            prop_assert!(c.lhs(&tableau.values) >= c.rhs - TOL);
        }
    }

    #[test]
    fn branch_and_bound_matches_enumeration(inst in instance(3, 2, 12)) {
        let problem = inst.program(ConstraintOp::Le, false);
        let result = BranchAndBound::new().solve(&problem).unwrap();
        let best = result.best_objective().unwrap();
        prop_assert!((best - enumerate(&problem, 12)).abs() < TOL);

        let incumbent = result.best.as_ref().unwrap();
        prop_assert!(incumbent.values.iter().all(|v| v.fract() == 0.0));
        prop_assert!(problem.constraints.iter().all(|c| c.is_satisfied_by(&incumbent.values)));
    }

    #[test]
    fn incumbent_only_improves(inst in instance(3, 2, 12)) {
        let problem = inst.program(ConstraintOp::Le, false);
        let result = BranchAndBound::new().solve(&problem).unwrap();
        let mut previous = f64::NEG_INFINITY;
        for node in result.nodes.iter().filter(|n| n.is_integer_solution) {
            prop_assert!(node.relaxation.objective_value > previous);
            previous = node.relaxation.objective_value;
        }
        prop_assert!((previous - result.best_objective().unwrap()).abs() < TOL);
    }

    #[test]
    fn preserved_rhs_change_matches_a_fresh_solve(
        inst in instance(3, 3, 20),
        row in 0usize..3,
        rhs in 1u32..=30,
    ) {
        let problem = inst.program(ConstraintOp::Le, false);
        let row = row % problem.num_constraints();
        let analysis = Sensitivity::analyze(&problem, &Solver::new()).unwrap();
        let change = analysis.modify_rhs(row, f64::from(rhs)).unwrap();

        let fresh = Solver::new().solve(&change.problem).unwrap();
        prop_assert!((change.objective_value() - fresh.objective_value).abs() < TOL);
    }

    #[test]
    fn revised_and_tableau_agree_on_mixed_relations(inst in mixed_instance()) {
        let problem = inst.program();
        let tableau = Solver::new().solve(&problem).unwrap();
        let revised = RevisedSimplex::from_problem(&problem).unwrap().solve();
        if tableau.status == SolutionStatus::NotConverged || revised.status == SolutionStatus::NotConverged {
            return Ok(());
        }

        prop_assert_eq!(tableau.is_optimal(), revised.is_optimal(), "{} vs {}", tableau.status, revised.status);
        if tableau.is_optimal() {
            prop_assert!((tableau.objective_value - revised.objective_value).abs() < TOL);
            prop_assert!(satisfies(&problem, &tableau.values));
            prop_assert!(satisfies(&problem, &revised.values));
        }
    }

    #[test]
    fn preserved_what_if_results_match_a_fresh_solve(
        inst in mixed_instance(),
        kind in 0usize..6,
        row in 0usize..3,
        var in 0usize..3,
        value in -4i32..=12,
        column in prop::collection::vec(-2i32..=4, 3),
    ) {
        let problem = inst.program();
        let solver = Solver::new().with_pivot_rule(PivotRule::Bland);
        let Ok(analysis) = Sensitivity::analyze(&problem, &solver) else {
            return Ok(());
        };
        let column: Vec<f64> = column.into_iter().map(f64::from).collect();
        let change = what_if(&analysis, kind, row, var, f64::from(value), &column).unwrap();
        if !change.is_preserved() {
            return Ok(());
        }

        let fresh = solver.solve(&change.problem).unwrap();
        prop_assert_eq!(fresh.status, SolutionStatus::Optimal);
        prop_assert!(
            (fresh.objective_value - change.objective_value()).abs() < TOL,
            "fresh {} vs preserved {}",
            fresh.objective_value,
            change.objective_value()
        );
        prop_assert!(satisfies(&change.problem, change.values()));
    }
}

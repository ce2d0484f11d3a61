//! End-to-end runs of every engine on the textbook problems.

use tableau_solver::*;

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

fn diet() -> LinearProgram {
    let mut problem = LinearProgram::with_variables(2);
    problem.minimize(vec![2.0, 3.0]);
    problem.constrain(vec![1.0, 1.0], ConstraintOp::Ge, 10.0);
    problem.constrain(vec![1.0, 0.0], ConstraintOp::Ge, 0.0);
    problem.constrain(vec![0.0, 1.0], ConstraintOp::Ge, 0.0);
    problem
}

#[test]
fn wyndor_glass() {
    let solution = Solver::new().solve(&wyndor()).unwrap();
    assert_eq!(solution.status, SolutionStatus::Optimal);
    assert_close(solution.objective_value, 36.0);
    assert_close(solution.values[0], 2.0);
    assert_close(solution.values[1], 6.0);

    let revised = RevisedSimplex::from_problem(&wyndor()).unwrap().solve();
    assert_close(revised.objective_value, 36.0);
}

#[test]
fn minimization_with_surplus_rows() {
    let solution = Solver::new().solve(&diet()).unwrap();
    assert_eq!(solution.status, SolutionStatus::Optimal);
    assert_close(solution.objective_value, 20.0);
    assert_close(solution.values[0], 10.0);
    assert_close(solution.values[1], 0.0);

    let revised = RevisedSimplex::from_problem(&diet()).unwrap().solve();
    assert_eq!(revised.status, SolutionStatus::Optimal);
    assert_close(revised.objective_value, 20.0);
}

#[test]
fn integer_optimum_with_bound_pruning() {
    let mut problem = LinearProgram::with_variables(2);
    problem.maximize(vec![4.0, 3.0]);
    problem.constrain(vec![1.0, 0.0], ConstraintOp::Le, 4.0);
    problem.constrain(vec![0.0, 1.0], ConstraintOp::Le, 6.0);
    problem.constrain(vec![2.0, 3.0], ConstraintOp::Le, 19.0);

    let result = BranchAndBound::new().solve(&problem).unwrap();
    let best = result.best.as_ref().unwrap();
    assert_close(best.objective_value, 25.0);
    assert_eq!(best.values, vec![4.0, 3.0]);
    assert!(
        result
            .nodes
            .iter()
            .any(|n| matches!(n.prune_reason, Some(PruneReason::Bounded { .. })))
    );
}

#[test]
fn empty_feasible_region() {
    let mut problem = LinearProgram::with_variables(1);
    problem.maximize(vec![1.0]);
    problem.constrain(vec![1.0], ConstraintOp::Le, 2.0);
    problem.constrain(vec![1.0], ConstraintOp::Ge, 5.0);

    assert_eq!(Solver::new().solve(&problem).unwrap().status, SolutionStatus::Infeasible);
    assert_eq!(
        RevisedSimplex::from_problem(&problem).unwrap().solve().status,
        SolutionStatus::Infeasible
    );
}

#[test]
fn unbounded_direction() {
    let mut problem = LinearProgram::with_variables(2);
    problem.maximize(vec![1.0, 0.0]);
    problem.constrain(vec![0.0, 1.0], ConstraintOp::Le, 5.0);

    let solution = Solver::new().solve(&problem).unwrap();
    assert_eq!(solution.status, SolutionStatus::Unbounded);
    let last = solution.final_step().unwrap();
    assert!(last.pivot.is_none());
    assert_eq!(last.ratios, Some(vec![None]));
}

#[test]
fn sensitivity_report_after_tableau_run() {
    let problem = wyndor();
    let mut engine = Solver::new().start(&problem).unwrap();
    while let Progress::Pivoted { .. } = engine.step() {}

    let analysis = Sensitivity::new(&problem, &engine).unwrap();
    let prices: Vec<f64> = analysis.shadow_prices().iter().map(|p| p.value).collect();
    assert_close(prices[1], 1.5);
    assert_close(prices[2], 1.0);

    let change = analysis.modify_rhs(2, 20.0).unwrap();
    assert!(change.is_preserved());
    // 36 + shadow price 1 × 2
    assert_close(change.objective_value(), 38.0);
}

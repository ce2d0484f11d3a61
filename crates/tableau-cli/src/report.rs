//! Plain-text rendering of solver results.

use tableau_solver::{
    BranchAndBoundResult, LinearProgram, Reoptimization, RevisedResult, RevisedStepKind, Sensitivity, Solution,
    SolutionStatus, Step,
};

fn number(x: f64) -> String {
    if x.is_infinite() {
        return if x > 0.0 { "∞".to_string() } else { "-∞".to_string() };
    }
    if x.is_nan() {
        return "-".to_string();
    }
    let s = format!("{:.4}", x);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn list(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|&v| number(v)).collect();
    format!("[{}]", parts.join(", "))
}

/// Right-aligned text table.
fn table(rows: &[Vec<String>]) -> String {
    let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..cols)
        .map(|j| {
            rows.iter()
                .filter_map(|r| r.get(j))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();
    let mut out = String::new();
    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{cell:>w$}"))
            .collect();
        out.push_str("  ");
        out.push_str(&cells.join("  "));
        out.push('\n');
    }
    out
}

pub fn tableau(step: &Step) -> String {
    let mut rows = Vec::with_capacity(step.tableau.rows() + 1);
    let mut header = vec!["Basis".to_string()];
    header.extend(step.col_headers.iter().cloned());
    rows.push(header);
    for (i, row) in step.tableau.iter_rows().enumerate() {
        let mut cells = vec![step.row_headers.get(i).cloned().unwrap_or_default()];
        cells.extend(row.iter().map(ToString::to_string));
        rows.push(cells);
    }

    let mut out = format!("{}\n", step.description);
    for op in &step.row_operations {
        out.push_str(&format!("    {op}\n"));
    }
    out.push_str(&table(&rows));
    if let Some(pivot) = step.pivot {
        out.push_str(&format!(
            "  Pivot: row {} ({}), column {}\n",
            pivot.row, step.row_headers[pivot.row], step.col_headers[pivot.col]
        ));
    }
    if let Some(ratios) = &step.ratios {
        let parts: Vec<String> = ratios
            .iter()
            .map(|r| r.map_or_else(|| "-".to_string(), number))
            .collect();
        out.push_str(&format!("  Ratios: {}\n", parts.join(", ")));
    }
    out
}

fn values(problem: &LinearProgram, values: &[f64]) {
    for (name, v) in problem.variables.iter().zip(values) {
        println!("  {:12} {:>12}", name, number(*v));
    }
}

pub fn solution(problem: &LinearProgram, solution: &Solution, show_steps: bool) {
    println!("{}", problem.describe_objective());
    for c in &problem.constraints {
        println!("  {}: {}", c.name, c.describe(&problem.variables));
    }
    println!();

    if show_steps {
        for step in &solution.steps {
            println!("{}", tableau(step));
        }
    }

    println!("Status: {}", solution.status);
    println!("Iterations: {}", solution.iterations);
    if solution.status == SolutionStatus::Optimal {
        println!("Z = {}", number(solution.objective_value));
        values(problem, &solution.values);
    }
}

pub fn branch(problem: &LinearProgram, result: &BranchAndBoundResult) {
    println!("{}", problem.describe_objective());
    println!();
    for node in &result.nodes {
        let indent = "  ".repeat(node.depth);
        let bound = node
            .added_constraint
            .as_ref()
            .map_or_else(|| "root".to_string(), |c| c.name.clone());
        let z = if node.relaxation.is_optimal() {
            format!("Z = {}", number(node.relaxation.objective_value))
        } else {
            node.relaxation.status.to_string()
        };
        let verdict = match (&node.prune_reason, node.is_integer_solution, node.branch) {
            (Some(reason), _, _) => format!("pruned: {reason}"),
            (None, true, _) => "integer solution".to_string(),
            (None, false, Some(b)) => format!(
                "branch on {} = {}",
                problem.variables[b.variable],
                number(b.value)
            ),
            (None, false, None) => String::new(),
        };
        println!("{indent}#{} [{bound}] {z}  {verdict}", node.id);
    }
    println!();

    if result.node_limit_reached {
        println!("Node limit reached, the search is incomplete");
    }
    match &result.best {
        Some(best) => {
            println!("Best integer solution (node {}): Z = {}", best.node_id, number(best.objective_value));
            values(problem, &best.values);
        }
        None => println!("No integer solution found"),
    }
}

pub fn revised(problem: &LinearProgram, result: &RevisedResult, show_steps: bool) {
    println!("{}", problem.describe_objective());
    println!();
    if show_steps {
        for step in &result.steps {
            println!("{}", step.description);
            let basis: Vec<&str> = step.basis.iter().map(|&k| result.names[k].as_str()).collect();
            println!("  Basis: [{}]", basis.join(", "));
            println!("  B⁻¹ =");
            for row in step.b_inv.iter_rows() {
                println!("    {}", list(row));
            }
            println!("  xB = {}", list(&step.x_b));
            let c_b: Vec<String> = step.c_b.iter().map(ToString::to_string).collect();
            println!("  C_B = [{}]", c_b.join(", "));
            let reduced: Vec<String> = step
                .reduced_costs
                .iter()
                .map(|(j, rc)| format!("{}: {}", result.names[*j], rc))
                .collect();
            println!("  Reduced costs: {}", reduced.join(", "));
            if step.kind == RevisedStepKind::Iteration {
                if let Some(d) = &step.direction {
                    println!("  d = {}", list(d));
                }
                if let Some(theta) = step.theta {
                    println!("  θ = {}", number(theta));
                }
            }
            println!();
        }
    }
    println!("Status: {}", result.status);
    if result.is_optimal() {
        println!("Z = {}", number(result.objective_value));
        values(problem, &result.values);
    }
}

pub fn sensitivity(analysis: &Sensitivity, changes: &[Reoptimization]) {
    let problem = analysis.problem();
    println!("{}", problem.describe_objective());
    println!("Z = {}", number(analysis.objective_value()));
    values(problem, &analysis.values());
    println!();

    let mut rows = vec![vec!["Constraint".to_string(), "Shadow price".to_string()]];
    rows.extend(
        analysis
            .shadow_prices()
            .into_iter()
            .map(|p| vec![p.name, number(p.value)]),
    );
    println!("Shadow prices:\n{}", table(&rows));

    let mut rows = vec![vec![
        "Variable".to_string(),
        "Basic".to_string(),
        "Lower".to_string(),
        "Current".to_string(),
        "Upper".to_string(),
    ]];
    rows.extend(analysis.objective_ranges().into_iter().map(|r| {
        vec![
            r.name,
            if r.basic { "yes" } else { "no" }.to_string(),
            number(r.lower),
            number(r.current),
            number(r.upper),
        ]
    }));
    println!("Objective coefficient ranges:\n{}", table(&rows));

    let mut rows = vec![vec![
        "Constraint".to_string(),
        "Lower".to_string(),
        "Current".to_string(),
        "Upper".to_string(),
    ]];
    rows.extend(
        analysis
            .rhs_ranges()
            .into_iter()
            .map(|r| vec![r.name, number(r.lower), number(r.current), number(r.upper)]),
    );
    println!("Right-hand side ranges:\n{}", table(&rows));

    for change in changes {
        for step in &change.steps {
            println!("{step}");
        }
        if change.is_preserved() {
            println!("Z = {}", number(change.objective_value()));
            values(&change.problem, change.values());
        } else if let tableau_solver::Outcome::Resolved(solution) = &change.outcome {
            println!("Status: {}", solution.status);
            if solution.is_optimal() {
                println!("Z = {}", number(solution.objective_value));
                values(&change.problem, &solution.values);
            }
        }
        println!();
    }
}

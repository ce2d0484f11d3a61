mod input;
mod report;

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tableau_solver::{BranchAndBound, LinearProgram, PivotRule, RevisedSimplex, Sensitivity, Solver};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::input::{CliError, ProblemFile, parse_assignment};

#[derive(Parser)]
#[command(name = "tableau")]
#[command(about = "Big-M simplex, branch-and-bound and sensitivity analysis for linear programs", long_about = None)]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a linear program with the tableau simplex method
    Solve {
        /// JSON problem file
        file: PathBuf,
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
        /// Print every tableau
        #[arg(long)]
        steps: bool,
        /// Use Bland's rule instead of the most negative entry
        #[arg(long)]
        bland: bool,
        #[arg(long, default_value_t = 100)]
        max_iterations: usize,
    },
    /// Solve an integer program with branch-and-bound
    Branch {
        /// JSON problem file
        file: PathBuf,
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
        /// Stop after this many nodes
        #[arg(long)]
        max_nodes: Option<usize>,
    },
    /// Solve a linear program with the revised simplex method
    Revised {
        /// JSON problem file
        file: PathBuf,
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
        /// Print the matrices of every iteration
        #[arg(long)]
        steps: bool,
    },
    /// Shadow prices, ranging and what-if changes at the optimum
    Sensitivity {
        /// JSON problem file
        file: PathBuf,
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
        /// Change a right-hand side (1-based constraint index)
        #[arg(long, value_name = "INDEX=VALUE", value_parser = parse_assignment)]
        rhs: Vec<(usize, f64)>,
        /// Change an objective coefficient (1-based variable index)
        #[arg(long, value_name = "INDEX=VALUE", value_parser = parse_assignment)]
        objective: Vec<(usize, f64)>,
    },
}

fn init_logging(verbose: u8) -> Result<(), CliError> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).map_err(|e| CliError::Logging(e.to_string()))
}

fn load(file: &Path) -> Result<(ProblemFile, LinearProgram), CliError> {
    let parsed = ProblemFile::read(file)?;
    let problem = parsed.to_program()?;
    Ok((parsed, problem))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Runs one command; `Ok(false)` means the problem had no optimal solution.
fn run(command: Commands) -> Result<bool, CliError> {
    match command {
        Commands::Solve {
            file,
            format,
            steps,
            bland,
            max_iterations,
        } => {
            let (_, problem) = load(&file)?;
            let rule = if bland { PivotRule::Bland } else { PivotRule::Dantzig };
            let solver = Solver::new()
                .with_max_iterations(max_iterations)
                .with_pivot_rule(rule);
            let solution = solver.solve(&problem)?;
            match format {
                Format::Json => print_json(&solution)?,
                Format::Pretty => report::solution(&problem, &solution, steps),
            }
            Ok(solution.is_optimal())
        }
        Commands::Branch {
            file,
            format,
            max_nodes,
        } => {
            let (parsed, problem) = load(&file)?;
            let mut bb = BranchAndBound::new();
            if let Some(max) = max_nodes {
                bb = bb.with_max_nodes(max);
            }
            let result = bb.solve_mixed(&problem, &parsed.integer_mask())?;
            match format {
                Format::Json => print_json(&result)?,
                Format::Pretty => report::branch(&problem, &result),
            }
            Ok(result.best.is_some())
        }
        Commands::Revised { file, format, steps } => {
            let (_, problem) = load(&file)?;
            let result = RevisedSimplex::from_problem(&problem)?.solve();
            match format {
                Format::Json => print_json(&result)?,
                Format::Pretty => report::revised(&problem, &result, steps),
            }
            Ok(result.is_optimal())
        }
        Commands::Sensitivity {
            file,
            format,
            rhs,
            objective,
        } => {
            let (_, problem) = load(&file)?;
            let analysis = Sensitivity::analyze(&problem, &Solver::new())?;
            let mut changes = Vec::new();
            for (index, value) in rhs {
                changes.push(analysis.modify_rhs(index, value)?);
            }
            for (index, value) in objective {
                changes.push(analysis.modify_objective(index, value)?);
            }
            match format {
                Format::Json => print_json(&serde_json::json!({
                    "objective_value": analysis.objective_value(),
                    "values": analysis.values(),
                    "shadow_prices": analysis.shadow_prices(),
                    "objective_ranges": analysis.objective_ranges(),
                    "rhs_ranges": analysis.rhs_ranges(),
                    "changes": changes,
                }))?,
                Format::Pretty => report::sensitivity(&analysis, &changes),
            }
            Ok(true)
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    match run(cli.command) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

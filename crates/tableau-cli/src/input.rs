use std::path::{Path, PathBuf};

use serde::Deserialize;
use tableau_solver::{ConstraintOp, LinearProgram, ProblemError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid problem file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Problem(#[from] ProblemError),
    #[error("{found} variable names given for {expected} objective coefficients")]
    VariableNames { expected: usize, found: usize },
    #[error("Expected INDEX=VALUE with INDEX starting at 1, got '{0}'")]
    Assignment(String),
    #[error("Failed to set tracing subscriber: {0}")]
    Logging(String),
}

/// A problem as written in a JSON input file.
#[derive(Debug, Clone, Deserialize)]
pub struct ProblemFile {
    #[serde(default)]
    pub variables: Option<Vec<String>>,
    pub objective: Vec<f64>,
    #[serde(default)]
    pub minimize: bool,
    /// Integrality mask for `branch`; everything is integral when absent
    #[serde(default)]
    pub integer: Option<Vec<bool>>,
    pub constraints: Vec<ConstraintSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConstraintSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub coefficients: Vec<f64>,
    pub op: ConstraintOp,
    pub rhs: f64,
}

impl ProblemFile {
    pub fn read(path: &Path) -> Result<Self, CliError> {
        let source = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source)
    }

    pub fn parse(source: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn to_program(&self) -> Result<LinearProgram, CliError> {
        let mut problem = match &self.variables {
            Some(names) if names.len() != self.objective.len() => {
                return Err(CliError::VariableNames {
                    expected: self.objective.len(),
                    found: names.len(),
                });
            }
            Some(names) => LinearProgram::new(names.clone()),
            None => LinearProgram::with_variables(self.objective.len()),
        };
        problem.set_objective(self.objective.clone(), self.minimize);
        for (i, c) in self.constraints.iter().enumerate() {
            let name = c.name.clone().unwrap_or_else(|| format!("c{}", i + 1));
            problem.add_constraint(name, c.coefficients.clone(), c.op, c.rhs);
        }
        problem.validate()?;
        Ok(problem)
    }

    pub fn integer_mask(&self) -> Vec<bool> {
        self.integer
            .clone()
            .unwrap_or_else(|| vec![true; self.objective.len()])
    }
}

/// Parses `INDEX=VALUE` with a 1-based index into a 0-based pair.
pub fn parse_assignment(text: &str) -> Result<(usize, f64), CliError> {
    let invalid = || CliError::Assignment(text.to_string());
    let (index, value) = text.split_once('=').ok_or_else(invalid)?;
    let index: usize = index.trim().parse().map_err(|_| invalid())?;
    let value: f64 = value.trim().parse().map_err(|_| invalid())?;
    if index == 0 || !value.is_finite() {
        return Err(invalid());
    }
    Ok((index - 1, value))
}

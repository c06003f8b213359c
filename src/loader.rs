//! Flat-file loaders for returns and covariance data.
//!
//! Formats are deliberately minimal: the returns file carries one
//! floating-point value per line, the covariance file one whitespace-
//! separated row per line. Blank lines are skipped. All parse failures are
//! reported with file and line context before any solver sees the data.

use std::path::Path;

use tracing::info;

use crate::domain::ProblemInstance;
use crate::error::{Error, Result};

/// Load a returns vector: one value per line.
pub fn load_returns<P: AsRef<Path>>(path: P) -> Result<Vec<f64>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let mut returns = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value = trimmed
            .parse::<f64>()
            .map_err(|e| parse_error(path, idx + 1, format!("invalid return value: {e}")))?;
        returns.push(value);
    }
    info!(file = %path.display(), assets = returns.len(), "loaded returns");
    Ok(returns)
}

/// Load a covariance matrix: one whitespace-separated row per line.
///
/// Ragged rows are rejected here; squareness and symmetry are enforced by
/// [`ProblemInstance::try_new`].
pub fn load_covariance<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<f64>>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let mut row = Vec::new();
        for token in trimmed.split_whitespace() {
            let value = token.parse::<f64>().map_err(|e| {
                parse_error(path, idx + 1, format!("invalid covariance value '{token}': {e}"))
            })?;
            row.push(value);
        }
        if let Some(first) = rows.first() {
            if row.len() != first.len() {
                return Err(parse_error(
                    path,
                    idx + 1,
                    format!("row has {} columns, expected {}", row.len(), first.len()),
                ));
            }
        }
        rows.push(row);
    }
    info!(file = %path.display(), rows = rows.len(), "loaded covariance");
    Ok(rows)
}

/// Load both files and build a validated problem instance.
pub fn load_problem<P: AsRef<Path>>(
    returns_path: P,
    covariance_path: P,
    risk_aversion: f64,
) -> Result<ProblemInstance> {
    let returns = load_returns(returns_path)?;
    let covariance = load_covariance(covariance_path)?;
    Ok(ProblemInstance::try_new(returns, covariance, risk_aversion)?)
}

fn parse_error(path: &Path, line: usize, reason: String) -> Error {
    Error::Parse {
        file: path.display().to_string(),
        line,
        reason,
    }
}

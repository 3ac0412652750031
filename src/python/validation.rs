//! Validation helpers for Python boundary.
//!
//! This module maps crate errors to Python exceptions and checks arguments
//! before they reach the Rust API.

use crate::error::Error as VolaugError;
use pyo3::exceptions::{PyRuntimeError, PyValueError};

/// Convert a volaug Error to the appropriate Python exception.
pub fn to_py_err(e: VolaugError, context: &str) -> pyo3::PyErr {
    match &e {
        VolaugError::InvalidDimensions(msg)
        | VolaugError::ShapeMismatch(msg)
        | VolaugError::Configuration(msg) => {
            PyValueError::new_err(format!("{}: {}", context, msg))
        }
        VolaugError::UnsupportedTechnique { index, available } => PyValueError::new_err(format!(
            "{}: unsupported technique {} (only {} configured)",
            context, index, available
        )),
        VolaugError::TransformError { operation, reason } => {
            PyValueError::new_err(format!("{}: {} failed: {}", context, operation, reason))
        }
        VolaugError::WorkerPool(msg) => {
            PyRuntimeError::new_err(format!("{}: {}", context, msg))
        }
    }
}

/// Validate probability value (0.0 to 1.0).
pub fn validate_probability(p: f64, param_name: &str) -> pyo3::PyResult<()> {
    if !p.is_finite() {
        return Err(PyValueError::new_err(format!(
            "{}: probability must be finite (got {})",
            param_name, p
        )));
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(PyValueError::new_err(format!(
            "{}: probability must be between 0.0 and 1.0 (got {})",
            param_name, p
        )));
    }
    Ok(())
}

/// Validate a worker count.
pub fn validate_workers(workers: usize, param_name: &str) -> pyo3::PyResult<()> {
    if workers == 0 {
        return Err(PyValueError::new_err(format!(
            "{}: workers must be positive (got 0)",
            param_name
        )));
    }
    Ok(())
}

/// Validate a technique count against the techniques the crate provides.
pub fn validate_technique_count(n: usize, param_name: &str) -> pyo3::PyResult<()> {
    let max = crate::Technique::ALL.len();
    if n == 0 || n > max {
        return Err(PyValueError::new_err(format!(
            "{}: n_techniques must be between 1 and {} (got {})",
            param_name, max, n
        )));
    }
    Ok(())
}

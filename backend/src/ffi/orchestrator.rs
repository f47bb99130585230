//! PyO3 wrapper for Orchestrator
//!
//! This module provides the Python interface to the scenario orchestrator.

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use super::types::{epoch_result_to_py, scenario_error_to_py};
use crate::orchestrator::{Orchestrator as RustOrchestrator, ScenarioConfig};

/// Python wrapper for the Rust orchestrator
///
/// # Example (from Python)
///
/// ```python
/// from proposal_inverter_core_rs import Orchestrator
///
/// orch = Orchestrator.from_json(open("scenario.json").read())
/// for result in orch.run():
///     print(f"Epoch {result['epoch']}: funds {result['funds'] / 100:.2f}")
/// print(orch.snapshot_json())
/// ```
#[pyclass(name = "Orchestrator")]
pub struct PyOrchestrator {
    inner: RustOrchestrator,
}

#[pymethods]
impl PyOrchestrator {
    /// Create an orchestrator from a scenario JSON document
    ///
    /// Raises ValueError if the document does not parse or the scenario
    /// cannot be set up.
    #[staticmethod]
    fn from_json(config_json: &str) -> PyResult<Self> {
        let config: ScenarioConfig = serde_json::from_str(config_json).map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("Invalid scenario: {}", e))
        })?;
        let inner = RustOrchestrator::new(config).map_err(scenario_error_to_py)?;
        Ok(PyOrchestrator { inner })
    }

    /// Execute one epoch and return its result dict
    fn epoch(&mut self, py: Python<'_>) -> PyResult<Py<PyDict>> {
        let result = self.inner.epoch().map_err(scenario_error_to_py)?;
        epoch_result_to_py(py, &result)
    }

    /// Run every remaining configured epoch
    fn run(&mut self, py: Python<'_>) -> PyResult<Py<PyList>> {
        let results = self.inner.run().map_err(scenario_error_to_py)?;
        let list = PyList::empty_bound(py);
        for result in &results {
            list.append(epoch_result_to_py(py, result)?)?;
        }
        Ok(list.unbind())
    }

    fn current_epoch(&self) -> usize {
        self.inner.current_epoch()
    }

    /// Agreement funds in cents
    fn funds(&self) -> i64 {
        self.inner.agreement().funds()
    }

    /// Balance of a labelled account in cents, or None if unknown
    fn get_balance(&self, label: &str) -> Option<i64> {
        self.inner.balance(label)
    }

    fn total_rejections(&self) -> usize {
        self.inner.total_rejections()
    }

    /// Current snapshot as a JSON string
    fn snapshot_json(&self) -> PyResult<String> {
        let snapshot = self.inner.snapshot().map_err(scenario_error_to_py)?;
        serde_json::to_string(&snapshot).map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!(
                "Snapshot serialization failed: {}",
                e
            ))
        })
    }
}

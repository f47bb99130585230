//! Conversions between Rust results and Python objects

use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::agreement::engine::AgreementStatus;
use crate::orchestrator::{EpochResult, ScenarioError};

/// Map a scenario error onto a Python exception
///
/// Configuration problems become `ValueError`; failures while running
/// become `RuntimeError`.
pub fn scenario_error_to_py(err: ScenarioError) -> PyErr {
    match err {
        ScenarioError::UnknownAccount(_)
        | ScenarioError::Ledger(_)
        | ScenarioError::InvalidScenario(_)
        | ScenarioError::Serialization(_) => {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(err.to_string())
        }
        ScenarioError::Agreement(_) => {
            PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(err.to_string())
        }
    }
}

fn status_name(status: AgreementStatus) -> &'static str {
    match status {
        AgreementStatus::Active => "active",
        AgreementStatus::Cancelled { forced: false, .. } => "cancelled",
        AgreementStatus::Cancelled { forced: true, .. } => "force_cancelled",
    }
}

/// Convert an epoch result to a Python dict
pub fn epoch_result_to_py(py: Python<'_>, result: &EpochResult) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("epoch", result.epoch)?;
    dict.set_item("actions_executed", result.actions_executed)?;
    dict.set_item("rejections", result.rejections)?;
    dict.set_item("funds", result.funds)?;
    dict.set_item("num_brokers", result.num_brokers)?;
    dict.set_item("total_allocated", result.total_allocated)?;
    dict.set_item("horizon", result.horizon)?;
    dict.set_item("status", status_name(result.status))?;
    Ok(dict.unbind())
}

//! Python bindings (optional `pyo3` feature)

pub mod orchestrator;
pub mod types;

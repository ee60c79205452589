//! Python bindings via PyO3.

use numpy::{IntoPyArray, PyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::cost::{BuiltinCost, HiatusCost, MorphophonemicCost, UniformCost};
use crate::error::AlignError;
use crate::matrix::compute_alignment;
use crate::phonetic::{segment, weighted_distance};
use crate::transform::{AlignmentRequest, Engine};
use crate::types::{ClassifiedEdits, Transition};

impl From<AlignError> for PyErr {
    fn from(err: AlignError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

fn builtin_model(name: &str) -> PyResult<BuiltinCost> {
    match name {
        "uniform" => Ok(BuiltinCost::Uniform(UniformCost::default())),
        "morphophonemic" => Ok(BuiltinCost::Morphophonemic(MorphophonemicCost::default())),
        "hiatus" => Ok(BuiltinCost::Hiatus(HiatusCost::new(
            MorphophonemicCost::default(),
        ))),
        other => Err(PyValueError::new_err(format!("unknown cost model {other:?}"))),
    }
}

// ============================================================================
// ALIGNMENT FUNCTIONS
// ============================================================================

#[pyfunction]
#[pyo3(signature = (source, target, boundary, model = "uniform"))]
fn py_align(
    source: Vec<String>,
    target: Vec<String>,
    boundary: isize,
    model: &str,
) -> PyResult<PyClassifiedEdits> {
    let engine = Engine::new(builtin_model(model)?);
    Ok(engine.classify(&source, &target, boundary)?.into())
}

#[pyfunction]
#[pyo3(signature = (requests, model = "uniform"))]
fn py_batch_align(
    requests: Vec<(Vec<String>, Vec<String>, isize)>,
    model: &str,
) -> PyResult<Vec<Option<PyClassifiedEdits>>> {
    let engine = Engine::new(builtin_model(model)?);
    let requests: Vec<AlignmentRequest> = requests
        .into_iter()
        .map(|(source, target, boundary)| AlignmentRequest {
            source,
            target,
            boundary,
        })
        .collect();
    Ok(engine
        .align_batch(&requests)
        .into_iter()
        .map(|result| result.ok().map(PyClassifiedEdits::from))
        .collect())
}

#[pyfunction]
#[pyo3(signature = (source, target, model = "uniform"))]
fn py_weighted_distance(source: Vec<String>, target: Vec<String>, model: &str) -> PyResult<f64> {
    Ok(weighted_distance(&source, &target, &builtin_model(model)?)?)
}

#[pyfunction]
#[pyo3(signature = (source, target, model = "uniform"))]
fn py_score_matrix<'py>(
    py: Python<'py>,
    source: Vec<String>,
    target: Vec<String>,
    model: &str,
) -> PyResult<&'py PyArray2<f64>> {
    let matrix = compute_alignment(&source, &target, &builtin_model(model)?)?;
    Ok(matrix.scores().into_pyarray(py))
}

#[pyfunction]
fn py_segment(text: &str) -> Vec<String> {
    segment(text)
}

// ============================================================================
// PYTHON WRAPPER TYPES
// ============================================================================

#[pyclass]
struct PyClassifiedEdits {
    #[pyo3(get)]
    before: Vec<String>,
    #[pyo3(get)]
    at: Vec<String>,
    #[pyo3(get)]
    after: Vec<String>,
}

impl From<ClassifiedEdits> for PyClassifiedEdits {
    fn from(edits: ClassifiedEdits) -> Self {
        let render =
            |ts: Vec<Transition>| -> Vec<String> { ts.iter().map(|t| t.to_string()).collect() };
        Self {
            before: render(edits.before),
            at: render(edits.at),
            after: render(edits.after),
        }
    }
}

#[pymethods]
impl PyClassifiedEdits {
    fn __len__(&self) -> usize {
        self.before.len() + self.at.len() + self.after.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "ClassifiedEdits(before={:?}, at={:?}, after={:?})",
            self.before, self.at, self.after
        )
    }
}

// ============================================================================
// MODULE DEFINITION
// ============================================================================

#[pymodule]
fn derivalign_core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(py_align, m)?)?;
    m.add_function(wrap_pyfunction!(py_batch_align, m)?)?;
    m.add_function(wrap_pyfunction!(py_weighted_distance, m)?)?;
    m.add_function(wrap_pyfunction!(py_score_matrix, m)?)?;
    m.add_function(wrap_pyfunction!(py_segment, m)?)?;

    m.add_class::<PyClassifiedEdits>()?;

    Ok(())
}

//! Python bindings for the MESA reader
//!
//! This crate provides PyO3 bindings exposing mesa-core to Python with the
//! familiar `read_history` / `read_profile` / `find_read_profile` API.

use mesa_core::{Column, Field, MatchPolicy, MesaData, MesaError, RecordAdapter, Value};
use numpy::ndarray::Array1;
use numpy::IntoPyArray;
use pyo3::exceptions::{PyIOError, PyImportError, PyLookupError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

// ============================================================================
// Conversion Helpers
// ============================================================================

fn value_to_py<'py>(py: Python<'py>, value: &Value) -> PyResult<Bound<'py, PyAny>> {
    let obj = match value {
        Value::Int(i) => (*i).into_pyobject(py)?.into_any(),
        Value::Float(f) => (*f).into_pyobject(py)?.into_any(),
        Value::Text(s) => s.as_str().into_pyobject(py)?.into_any(),
    };
    Ok(obj)
}

/// Homogeneous numeric columns become numpy arrays, anything else a list
fn values_to_py<'py>(py: Python<'py>, values: &[Value]) -> PyResult<Bound<'py, PyAny>> {
    if let Some(ints) = values.iter().map(Value::as_i64).collect::<Option<Vec<_>>>() {
        return Ok(Array1::from_vec(ints).into_pyarray(py).into_any());
    }
    if let Some(floats) = values.iter().map(Value::as_f64).collect::<Option<Vec<_>>>() {
        return Ok(Array1::from_vec(floats).into_pyarray(py).into_any());
    }
    let items = values
        .iter()
        .map(|v| value_to_py(py, v))
        .collect::<PyResult<Vec<_>>>()?;
    Ok(PyList::new(py, items)?.into_any())
}

fn column_to_py<'py>(py: Python<'py>, column: &Column) -> PyResult<Bound<'py, PyAny>> {
    values_to_py(py, &column.values)
}

fn to_py_err(err: MesaError) -> PyErr {
    match &err {
        MesaError::Access { .. } => PyIOError::new_err(err.to_string()),
        MesaError::ModelNotFound { .. } => PyLookupError::new_err(err.to_string()),
        MesaError::Format { .. } | MesaError::MissingColumn(_) => {
            PyValueError::new_err(err.to_string())
        }
        MesaError::Write(_) => PyIOError::new_err(err.to_string()),
    }
}

// ============================================================================
// Output Adapter
// ============================================================================

/// Builds either a plain dict or an `astropy.table.Table`
struct PyAdapter<'py> {
    py: Python<'py>,
    as_table: bool,
}

impl<'py> PyAdapter<'py> {
    fn to_dict(&self, data: &MesaData) -> PyResult<Bound<'py, PyAny>> {
        let dict = PyDict::new(self.py);
        for (name, field) in data.fields() {
            let obj = match field {
                Field::Scalar(value) => value_to_py(self.py, value)?,
                Field::Column(values) => values_to_py(self.py, values)?,
            };
            dict.set_item(name, obj)?;
        }
        Ok(dict.into_any())
    }

    fn to_table(&self, data: &MesaData) -> PyResult<Bound<'py, PyAny>> {
        let table_cls = self
            .py
            .import("astropy.table")
            .map_err(|_| {
                PyImportError::new_err(
                    "The astropy package must be installed in order to use the 'as_table' flag",
                )
            })?
            .getattr("Table")?;

        let meta = PyDict::new(self.py);
        for (name, value) in data.header() {
            meta.set_item(name, value_to_py(self.py, value)?)?;
        }
        let kwargs = PyDict::new(self.py);
        kwargs.set_item("meta", meta)?;

        let table = table_cls.call((), Some(&kwargs))?;
        for column in data.columns() {
            table.set_item(&column.name, column_to_py(self.py, column)?)?;
        }
        Ok(table)
    }
}

impl<'py> RecordAdapter for PyAdapter<'py> {
    type Output = PyResult<Bound<'py, PyAny>>;

    fn adapt(&mut self, data: MesaData) -> mesa_core::Result<Self::Output> {
        Ok(if self.as_table {
            self.to_table(&data)
        } else {
            self.to_dict(&data)
        })
    }
}

/// Run a reader without holding the GIL, then convert the record
fn convert<'py, F>(py: Python<'py>, as_table: bool, read: F) -> PyResult<Bound<'py, PyAny>>
where
    F: FnOnce() -> mesa_core::Result<MesaData> + Send,
{
    let data = py.allow_threads(read).map_err(to_py_err)?;
    let mut adapter = PyAdapter { py, as_table };
    adapter.adapt(data).map_err(to_py_err)?
}

// ============================================================================
// Python Functions
// ============================================================================

/// Read data from a MESA history file
///
/// Args:
///     filename: Path to the history file
///     as_table: Return an astropy Table instead of a dict
///
/// Returns:
///     dict (or Table) holding header scalars and history columns
#[pyfunction]
#[pyo3(signature = (filename, as_table=false))]
pub fn read_history<'py>(
    py: Python<'py>,
    filename: &str,
    as_table: bool,
) -> PyResult<Bound<'py, PyAny>> {
    convert(py, as_table, || mesa_core::read_history(filename))
}

/// Read data from a MESA profile file, zones ordered center-first
#[pyfunction]
#[pyo3(signature = (filename, as_table=false))]
pub fn read_profile<'py>(
    py: Python<'py>,
    filename: &str,
    as_table: bool,
) -> PyResult<Bound<'py, PyAny>> {
    convert(py, as_table, || mesa_core::read_profile(filename))
}

/// Find the profile file for a model number and read it
///
/// Args:
///     filename: Path to the profile index (usually 'profiles.index')
///     model_number: Requested model number
///     nearest: Read the closest model if there is no exact match
///     as_table: Return an astropy Table instead of a dict
///
/// Raises:
///     LookupError: No exact match and `nearest` is False
#[pyfunction]
#[pyo3(signature = (filename, model_number, nearest=false, as_table=false))]
pub fn find_read_profile<'py>(
    py: Python<'py>,
    filename: &str,
    model_number: i64,
    nearest: bool,
    as_table: bool,
) -> PyResult<Bound<'py, PyAny>> {
    let policy = MatchPolicy::from_nearest(nearest);
    convert(py, as_table, || {
        mesa_core::find_read_profile(filename, model_number, policy)
    })
}

/// Write selected columns of a history or profile file to CSV
#[pyfunction]
#[pyo3(signature = (filename, output, columns=None, reversed=false))]
pub fn export_csv(
    py: Python,
    filename: &str,
    output: &str,
    columns: Option<Vec<String>>,
    reversed: bool,
) -> PyResult<usize> {
    py.allow_threads(|| -> mesa_core::Result<usize> {
        let data = mesa_core::read(filename, mesa_core::RowOrder::from_reversed(reversed))?;
        let names: Vec<&str> = columns.iter().flatten().map(String::as_str).collect();
        mesa_core::write_csv_file(&data, &names, output)?;
        Ok(data.len())
    })
    .map_err(to_py_err)
}

/// Route library logs to stderr
///
/// Args:
///     level: Filter directive such as 'info' or 'mesa_core=debug'
///
/// Returns:
///     False if a subscriber was already installed
#[pyfunction]
#[pyo3(signature = (level="info"))]
pub fn enable_logging(level: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

// ============================================================================
// Module Definition
// ============================================================================

#[pymodule]
pub fn mesa_reader(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", mesa_core::VERSION)?;

    m.add_function(wrap_pyfunction!(read_history, m)?)?;
    m.add_function(wrap_pyfunction!(read_profile, m)?)?;
    m.add_function(wrap_pyfunction!(find_read_profile, m)?)?;
    m.add_function(wrap_pyfunction!(export_csv, m)?)?;
    m.add_function(wrap_pyfunction!(enable_logging, m)?)?;

    tracing::debug!("mesa_reader module initialized");
    Ok(())
}

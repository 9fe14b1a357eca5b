#[cfg(feature = "python-bindings")]
use ndarray::Array1;

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::PyValueError,
    prelude::*,
    types::{PyAny, PyList},
};

#[cfg(feature = "python-bindings")]
use crate::state::{bounds::Bounds, compound_parameter::CompoundParameter, real_parameter::RealParameter};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
};

#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64",
        )
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

#[cfg(feature = "python-bindings")]
pub fn build_compound_parameter<'py>(
    py: Python<'py>, id: &str, sub_ids: Vec<String>, sub_values: &Bound<'py, PyList>, lower: f64,
    upper: f64,
) -> PyResult<CompoundParameter> {
    if sub_ids.len() != sub_values.len() {
        return Err(PyValueError::new_err(format!(
            "expected one value array per sub-parameter id: {} ids, {} arrays",
            sub_ids.len(),
            sub_values.len()
        )));
    }

    // Shared bounds; re-verified (trivially) by the compound constructor.
    let bounds = Bounds::new(lower, upper)?;

    let mut parameters = Vec::with_capacity(sub_ids.len());
    for (sub_id, raw) in sub_ids.into_iter().zip(sub_values.iter()) {
        let arr = extract_f64_array(py, &raw)?;
        let slice = arr.as_slice().map_err(|_| {
            PyValueError::new_err(format!(
                "sub-parameter '{sub_id}' must be a 1-D contiguous float64 array or sequence"
            ))
        })?;
        parameters.push(RealParameter::new(sub_id, Array1::from(slice.to_vec()), bounds));
    }

    Ok(CompoundParameter::new(id, parameters)?)
}

//! Scalar-or-batch values
//!
//! Every numeric contract field, and every pricer output, is either a single
//! value or an ordered batch of values (one per contract in a parallel array).
//! Carrying the tag explicitly keeps scalar input producing scalar output.

use serde::{Deserialize, Serialize};

use super::error::{PricingError, PricingResult};

/// A single value or an ordered batch of values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Shaped<T> {
    Scalar(T),
    Batch(Vec<T>),
}

impl<T> Shaped<T> {
    /// Batch length, `None` for a scalar
    pub fn batch_len(&self) -> Option<usize> {
        match self {
            Shaped::Scalar(_) => None,
            Shaped::Batch(values) => Some(values.len()),
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Shaped::Scalar(_))
    }

    /// Value for batch row `row`; scalars broadcast to every row
    pub fn at(&self, row: usize) -> Option<&T> {
        match self {
            Shaped::Scalar(value) => Some(value),
            Shaped::Batch(values) => values.get(row),
        }
    }

    /// Apply `f` elementwise, keeping the shape
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Shaped<U> {
        match self {
            Shaped::Scalar(value) => Shaped::Scalar(f(value)),
            Shaped::Batch(values) => Shaped::Batch(values.into_iter().map(f).collect()),
        }
    }

    pub fn as_scalar(&self) -> Option<&T> {
        match self {
            Shaped::Scalar(value) => Some(value),
            Shaped::Batch(_) => None,
        }
    }

    pub fn as_batch(&self) -> Option<&[T]> {
        match self {
            Shaped::Scalar(_) => None,
            Shaped::Batch(values) => Some(values),
        }
    }

    /// Flatten into a vector (a scalar becomes a one-element vector)
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Shaped::Scalar(value) => vec![value],
            Shaped::Batch(values) => values,
        }
    }
}

impl<T: Clone> Shaped<T> {
    /// Broadcast against a batch length of `rows`
    pub fn broadcast(&self, field: &'static str, rows: usize) -> PricingResult<Vec<T>> {
        match self {
            Shaped::Scalar(value) => Ok(vec![value.clone(); rows]),
            Shaped::Batch(values) if values.len() == rows => Ok(values.clone()),
            Shaped::Batch(values) => Err(PricingError::shape_mismatch(field, rows, values.len())),
        }
    }
}

impl Shaped<f64> {
    /// True if `pred` holds for the scalar or for every batch element
    pub fn all(&self, pred: impl Fn(f64) -> bool) -> bool {
        match self {
            Shaped::Scalar(value) => pred(*value),
            Shaped::Batch(values) => values.iter().all(|&v| pred(v)),
        }
    }
}

impl From<f64> for Shaped<f64> {
    fn from(value: f64) -> Self {
        Shaped::Scalar(value)
    }
}

impl From<Vec<f64>> for Shaped<f64> {
    fn from(values: Vec<f64>) -> Self {
        Shaped::Batch(values)
    }
}

impl From<&[f64]> for Shaped<f64> {
    fn from(values: &[f64]) -> Self {
        Shaped::Batch(values.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for Shaped<f64> {
    fn from(values: [f64; N]) -> Self {
        Shaped::Batch(values.to_vec())
    }
}

/// Common batch length of a set of fields.
///
/// Returns `None` when every field is scalar. Batches must agree in length
/// and may not be empty.
pub fn common_len<'a>(
    fields: impl IntoIterator<Item = (&'static str, &'a Shaped<f64>)>,
) -> PricingResult<Option<usize>> {
    let mut rows: Option<usize> = None;
    for (name, field) in fields {
        let Some(len) = field.batch_len() else {
            continue;
        };
        if len == 0 {
            return Err(PricingError::invalid_input(format!("{name} batch is empty")));
        }
        match rows {
            None => rows = Some(len),
            Some(expected) if expected != len => {
                return Err(PricingError::shape_mismatch(name, expected, len));
            }
            Some(_) => {}
        }
    }
    Ok(rows)
}

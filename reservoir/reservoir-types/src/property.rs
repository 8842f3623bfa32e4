//! Per-cell property arrays.
//!
//! A property is a flat array with one value per cell, in the grid's linear
//! cell order (`i + ncol * (j + nrow * k)`). Continuous properties use
//! [`UNDEF`] for undefined cells, discrete properties use [`UNDEF_INT`].

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};
use crate::grid::GridDims;

/// Undefined marker for continuous values.
pub const UNDEF: f64 = 1.0e33;

/// Continuous values at or above this magnitude are treated as undefined.
pub const UNDEF_LIMIT: f64 = 9.9e32;

/// Undefined marker for discrete codes.
pub const UNDEF_INT: i32 = 2_000_000_000;

/// Whether a continuous value is undefined (sentinel, NaN or infinite).
#[inline]
#[must_use]
pub fn is_undef(value: f64) -> bool {
    !value.is_finite() || value.abs() >= UNDEF_LIMIT
}

/// Whether a discrete code is undefined.
#[inline]
#[must_use]
pub const fn is_undef_int(value: i32) -> bool {
    value == UNDEF_INT
}

/// The values of a property, either continuous scalars or discrete codes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PropertyValues {
    /// Floating point values with [`UNDEF`] as the undefined marker.
    Continuous(Vec<f64>),
    /// Integer codes with [`UNDEF_INT`] as the undefined marker.
    Discrete(Vec<i32>),
}

impl PropertyValues {
    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Continuous(v) => v.len(),
            Self::Discrete(v) => v.len(),
        }
    }

    /// Whether there are no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the values are discrete codes.
    #[must_use]
    pub const fn is_discrete(&self) -> bool {
        matches!(self, Self::Discrete(_))
    }

    /// A new array of the same kind with `len` undefined entries.
    #[must_use]
    pub fn undefined_like(&self, len: usize) -> Self {
        match self {
            Self::Continuous(_) => Self::Continuous(vec![UNDEF; len]),
            Self::Discrete(_) => Self::Discrete(vec![UNDEF_INT; len]),
        }
    }

    /// Whether the entry at `index` holds a defined value.
    ///
    /// Out-of-range indices are reported as undefined.
    #[must_use]
    pub fn is_defined(&self, index: usize) -> bool {
        match self {
            Self::Continuous(v) => v.get(index).is_some_and(|&x| !is_undef(x)),
            Self::Discrete(v) => v.get(index).is_some_and(|&x| !is_undef_int(x)),
        }
    }

    /// The entry at `index` as `f64`, or `None` if undefined or out of range.
    #[must_use]
    pub fn value_f64(&self, index: usize) -> Option<f64> {
        match self {
            Self::Continuous(v) => v.get(index).copied().filter(|&x| !is_undef(x)),
            Self::Discrete(v) => v
                .get(index)
                .copied()
                .filter(|&x| !is_undef_int(x))
                .map(f64::from),
        }
    }

    /// The continuous values, if this is a continuous array.
    #[must_use]
    pub fn as_continuous(&self) -> Option<&[f64]> {
        match self {
            Self::Continuous(v) => Some(v),
            Self::Discrete(_) => None,
        }
    }

    /// The discrete codes, if this is a discrete array.
    #[must_use]
    pub fn as_discrete(&self) -> Option<&[i32]> {
        match self {
            Self::Continuous(_) => None,
            Self::Discrete(v) => Some(v),
        }
    }

    /// Number of undefined entries.
    #[must_use]
    pub fn undefined_count(&self) -> usize {
        match self {
            Self::Continuous(v) => v.iter().filter(|&&x| is_undef(x)).count(),
            Self::Discrete(v) => v.iter().filter(|&&x| is_undef_int(x)).count(),
        }
    }

    /// Gather entries by source index; `None` writes the undefined marker.
    #[must_use]
    pub fn gather(&self, indices: &[Option<usize>]) -> Self {
        match self {
            Self::Continuous(v) => Self::Continuous(
                indices
                    .iter()
                    .map(|idx| idx.and_then(|i| v.get(i).copied()).unwrap_or(UNDEF))
                    .collect(),
            ),
            Self::Discrete(v) => Self::Discrete(
                indices
                    .iter()
                    .map(|idx| idx.and_then(|i| v.get(i).copied()).unwrap_or(UNDEF_INT))
                    .collect(),
            ),
        }
    }
}

/// A named property attached to a grid of known dimensions.
///
/// # Example
///
/// ```
/// use reservoir_types::{GridDims, GridProperty, PropertyValues, UNDEF};
///
/// let dims = GridDims::new(2, 1, 1);
/// let poro = GridProperty::continuous("PORO", dims, vec![0.2, UNDEF]).unwrap();
/// assert_eq!(poro.values().undefined_count(), 1);
/// assert!(GridProperty::continuous("PORO", dims, vec![0.2]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridProperty {
    name: String,
    dims: GridDims,
    values: PropertyValues,
    codes: BTreeMap<i32, String>,
}

impl GridProperty {
    /// Create a property, checking that the value count matches `dims`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ShapeMismatch`] if `values` does not have one entry per cell.
    pub fn new(name: impl Into<String>, dims: GridDims, values: PropertyValues) -> GridResult<Self> {
        let expected = dims.cell_count();
        if values.len() != expected {
            return Err(GridError::shape_mismatch("property", expected, values.len()));
        }
        Ok(Self {
            name: name.into(),
            dims,
            values,
            codes: BTreeMap::new(),
        })
    }

    pub(crate) fn from_parts(name: &str, dims: GridDims, values: PropertyValues) -> Self {
        debug_assert_eq!(values.len(), dims.cell_count());
        Self {
            name: name.to_string(),
            dims,
            values,
            codes: BTreeMap::new(),
        }
    }

    /// Create a continuous property.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ShapeMismatch`] on a length mismatch.
    pub fn continuous(name: impl Into<String>, dims: GridDims, values: Vec<f64>) -> GridResult<Self> {
        Self::new(name, dims, PropertyValues::Continuous(values))
    }

    /// Create a discrete property.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ShapeMismatch`] on a length mismatch.
    pub fn discrete(name: impl Into<String>, dims: GridDims, values: Vec<i32>) -> GridResult<Self> {
        Self::new(name, dims, PropertyValues::Discrete(values))
    }

    /// Attach a code-name table to a discrete property.
    #[must_use]
    pub fn with_codes(mut self, codes: BTreeMap<i32, String>) -> Self {
        self.codes = codes;
        self
    }

    /// Property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Grid dimensions this property belongs to.
    #[must_use]
    pub const fn dims(&self) -> GridDims {
        self.dims
    }

    /// The values.
    #[must_use]
    pub const fn values(&self) -> &PropertyValues {
        &self.values
    }

    /// Consume the property and return its values.
    #[must_use]
    pub fn into_values(self) -> PropertyValues {
        self.values
    }

    /// Code-name table (empty for continuous properties).
    #[must_use]
    pub const fn codes(&self) -> &BTreeMap<i32, String> {
        &self.codes
    }

    /// Whether the property holds discrete codes.
    #[must_use]
    pub const fn is_discrete(&self) -> bool {
        self.values.is_discrete()
    }

    /// Check that this property fits a grid of dimensions `dims`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ShapeMismatch`] if the cell counts differ.
    pub fn check_dims(&self, dims: GridDims) -> GridResult<()> {
        if self.dims == dims && self.values.len() == dims.cell_count() {
            Ok(())
        } else {
            Err(GridError::shape_mismatch(
                "property",
                dims.cell_count(),
                self.values.len(),
            ))
        }
    }
}

//! Typed per-sample data columns.
//!
//! A column describes one recordable quantity: how it is extracted from a GTU,
//! how it is stored while a trajectory is open, how it is finalized, and how
//! values are interpolated, formatted and parsed.

pub use column::{Column, ColumnData, ColumnVector, RawValue};
pub(crate) use column::{ColumnSource, SamplePoint};
pub use kinds::{
    CategoryColumn, Duration, DurationColumn, Length, LengthColumn, NumberColumn,
    ReferenceSpeedColumn, Speed, SpeedColumn,
};
pub use storage::{ColumnStorage, OutputVector};

use crate::error::{KpiError, Result};
use crate::gtu::GtuSnapshot;
use std::fmt::Debug;

mod column;
mod kinds;
mod storage;

/// A recordable or derivable per-sample quantity.
///
/// Implementors are stateless apart from their ID and description; one
/// instance is registered with a sampler and shared by all its trajectories.
pub trait ExtendedDataType {
    /// The value type handed to and returned from the column.
    type Value: Clone + PartialEq + Debug;
    /// The representation held in storage.
    type Raw: RawValue;

    /// A short unique ID, e.g. `"v"`.
    fn id(&self) -> &str;

    /// A human readable description.
    fn description(&self) -> &str;

    /// Extracts the current value from a GTU, if it has one.
    fn get_value(&self, gtu: &GtuSnapshot) -> Option<Self::Value>;

    /// The sentinel recorded when a GTU has no value.
    fn missing_value(&self) -> Self::Value;

    /// Converts a value to its stored representation.
    fn to_raw(&self, value: &Self::Value) -> Self::Raw;

    /// Converts a stored representation back to a value.
    fn convert_value(&self, raw: &Self::Raw) -> Self::Value;

    /// Formats a value as text.
    fn format_value(&self, value: &Self::Value) -> String;

    /// Parses text produced by [Self::format_value].
    fn parse_value(&self, text: &str) -> Result<Self::Value>;

    /// Interpolates between two values, with `fraction` in `[0, 1]`.
    fn interpolate(&self, low: &Self::Value, high: &Self::Value, fraction: f64) -> Self::Value;

    /// The value to record for a GTU, falling back to [Self::missing_value].
    fn sample(&self, gtu: &GtuSnapshot) -> Self::Value {
        self.get_value(gtu)
            .unwrap_or_else(|| self.missing_value())
    }

    /// Creates empty storage.
    fn initialize_storage(&self) -> ColumnStorage<Self::Raw> {
        ColumnStorage::with_capacity(0)
    }

    /// Writes `value` at `index`, growing the storage if needed.
    fn set_value(
        &self,
        mut storage: ColumnStorage<Self::Raw>,
        index: usize,
        value: &Self::Value,
    ) -> ColumnStorage<Self::Raw> {
        storage.set(index, self.to_raw(value));
        storage
    }

    /// Reads back a written value. Only the capacity is checked.
    fn get_storage_value(&self, storage: &ColumnStorage<Self::Raw>, index: usize) -> Result<Self::Value> {
        storage.get(index).map(|raw| self.convert_value(raw))
    }

    /// Finalizes storage into a vector of exactly `len` values.
    fn convert(&self, storage: ColumnStorage<Self::Raw>, len: usize) -> OutputVector<Self::Raw> {
        storage.into_output(len)
    }

    /// Reads a value from a finalized vector.
    fn get_output_value(&self, vector: &OutputVector<Self::Raw>, index: usize) -> Result<Self::Value> {
        vector.get(index).map(|raw| self.convert_value(raw))
    }
}

/// Linear interpolation, exact at both end points.
pub fn interpolate_linear(low: f64, high: f64, fraction: f64) -> f64 {
    (1.0 - fraction) * low + fraction * high
}

/// Picks the nearest end point; a fraction of exactly one half picks `high`.
pub fn interpolate_nearest<T: Clone>(low: &T, high: &T, fraction: f64) -> T {
    if fraction < 0.5 {
        low.clone()
    } else {
        high.clone()
    }
}

/// Parses a number, optionally followed by `unit`.
pub(crate) fn parse_number(text: &str, unit: &str, kind: &'static str) -> Result<f64> {
    let trimmed = text.trim();
    let number = if unit.is_empty() {
        trimmed
    } else {
        trimmed.strip_suffix(unit).unwrap_or(trimmed).trim_end()
    };
    number.parse().map_err(|_| KpiError::Parse {
        kind,
        text: text.to_string(),
    })
}

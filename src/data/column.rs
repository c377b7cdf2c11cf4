use super::kinds::{
    CategoryColumn, DurationColumn, LengthColumn, NumberColumn, ReferenceSpeedColumn, SpeedColumn,
};
use super::{ColumnStorage, ExtendedDataType, OutputVector};
use crate::error::{KpiError, Result};
use crate::gtu::GtuSnapshot;
use std::fmt::Debug;

/// The closed set of column kinds a sampler can record.
#[derive(Clone, Debug)]
pub enum Column {
    Duration(DurationColumn),
    Length(LengthColumn),
    Speed(SpeedColumn),
    Number(NumberColumn),
    Category(CategoryColumn),
    ReferenceSpeed(ReferenceSpeedColumn),
}

/// The storage of one column while its trajectory is open.
#[derive(Clone, Debug)]
pub enum ColumnData {
    Numeric(ColumnStorage<f64>),
    Text(ColumnStorage<String>),
}

/// The finalized values of one column.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnVector {
    Numeric(OutputVector<f64>),
    Text(OutputVector<String>),
}

/// Either form of a column's recorded values.
#[derive(Clone, Copy, Debug)]
pub(crate) enum ColumnSource<'a> {
    Storage(&'a ColumnData),
    Output(&'a ColumnVector),
}

/// A raw representation that can live in [ColumnData] and [ColumnVector].
pub trait RawValue: Clone + Default + Debug + Sized {
    fn storage(data: &ColumnData) -> Option<&ColumnStorage<Self>>;
    fn into_storage(data: ColumnData) -> Option<ColumnStorage<Self>>;
    fn wrap_storage(storage: ColumnStorage<Self>) -> ColumnData;
    fn vector(vector: &ColumnVector) -> Option<&OutputVector<Self>>;
    fn wrap_vector(vector: OutputVector<Self>) -> ColumnVector;
}

macro_rules! raw_value {
    ($raw:ty, $variant:ident) => {
        impl RawValue for $raw {
            fn storage(data: &ColumnData) -> Option<&ColumnStorage<Self>> {
                match data {
                    ColumnData::$variant(storage) => Some(storage),
                    _ => None,
                }
            }

            fn into_storage(data: ColumnData) -> Option<ColumnStorage<Self>> {
                match data {
                    ColumnData::$variant(storage) => Some(storage),
                    _ => None,
                }
            }

            fn wrap_storage(storage: ColumnStorage<Self>) -> ColumnData {
                ColumnData::$variant(storage)
            }

            fn vector(vector: &ColumnVector) -> Option<&OutputVector<Self>> {
                match vector {
                    ColumnVector::$variant(vector) => Some(vector),
                    _ => None,
                }
            }

            fn wrap_vector(vector: OutputVector<Self>) -> ColumnVector {
                ColumnVector::$variant(vector)
            }
        }
    };
}

raw_value!(f64, Numeric);
raw_value!(String, Text);

/// Applies `$body` to the concrete column inside a [Column].
macro_rules! dispatch {
    ($column:expr, $c:ident => $body:expr) => {
        match $column {
            Column::Duration($c) => $body,
            Column::Length($c) => $body,
            Column::Speed($c) => $body,
            Column::Number($c) => $body,
            Column::Category($c) => $body,
            Column::ReferenceSpeed($c) => $body,
        }
    };
}

/// A sample of a resampled trajectory: the value at `index`, or between
/// `index` and `index + 1` when `fraction` is positive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SamplePoint {
    pub index: usize,
    pub fraction: f64,
}

impl Column {
    /// The column's ID.
    pub fn id(&self) -> &str {
        dispatch!(self, c => c.id())
    }

    /// The column's description.
    pub fn description(&self) -> &str {
        dispatch!(self, c => c.description())
    }

    /// Creates empty storage for this column.
    pub(crate) fn initialize(&self) -> ColumnData {
        dispatch!(self, c => initialize(c))
    }

    /// Records the GTU's value at `index`.
    pub(crate) fn record(&self, data: &mut ColumnData, index: usize, gtu: &GtuSnapshot) {
        dispatch!(self, c => record(c, data, index, gtu))
    }

    /// Finalizes the storage into exactly `len` values.
    pub(crate) fn convert(&self, data: ColumnData, len: usize) -> Result<ColumnVector> {
        dispatch!(self, c => convert(c, data, len))
    }

    /// Formats the value at `index`.
    pub(crate) fn format(&self, source: ColumnSource, index: usize) -> Result<String> {
        dispatch!(self, c => source.read(c, index).map(|value| c.format_value(&value)))
    }

    /// Builds a new vector from the given sample points, interpolating between samples.
    pub(crate) fn resample(&self, source: ColumnSource, points: &[SamplePoint]) -> Result<ColumnVector> {
        dispatch!(self, c => resample(c, source, points))
    }
}

impl<'a> ColumnSource<'a> {
    /// Reads a typed value, checking only the bounds of the underlying storage.
    pub(crate) fn read<C: ExtendedDataType>(self, column: &C, index: usize) -> Result<C::Value> {
        match self {
            ColumnSource::Storage(data) => {
                let storage = C::Raw::storage(data).ok_or_else(|| mismatch(column))?;
                column.get_storage_value(storage, index)
            }
            ColumnSource::Output(vector) => {
                let vector = C::Raw::vector(vector).ok_or_else(|| mismatch(column))?;
                column.get_output_value(vector, index)
            }
        }
    }
}

fn mismatch<C: ExtendedDataType>(column: &C) -> KpiError {
    KpiError::UnsupportedOperation(format!(
        "column '{}' holds a different value type",
        column.id()
    ))
}

fn initialize<C: ExtendedDataType>(column: &C) -> ColumnData {
    C::Raw::wrap_storage(column.initialize_storage())
}

fn record<C: ExtendedDataType>(column: &C, data: &mut ColumnData, index: usize, gtu: &GtuSnapshot) {
    // Storage is always created by the column that writes to it
    if C::Raw::storage(data).is_none() {
        debug_assert!(false, "column '{}' holds a different value type", column.id());
        log::error!("Column '{}' holds a different value type, sample dropped", column.id());
        return;
    }
    if let Some(storage) = C::Raw::into_storage(std::mem::replace(data, initialize(column))) {
        *data = C::Raw::wrap_storage(column.set_value(storage, index, &column.sample(gtu)));
    }
}

fn convert<C: ExtendedDataType>(column: &C, data: ColumnData, len: usize) -> Result<ColumnVector> {
    let storage = C::Raw::into_storage(data).ok_or_else(|| mismatch(column))?;
    Ok(C::Raw::wrap_vector(column.convert(storage, len)))
}

fn resample<C: ExtendedDataType>(
    column: &C,
    source: ColumnSource,
    points: &[SamplePoint],
) -> Result<ColumnVector> {
    let mut storage = column.initialize_storage();
    for (i, point) in points.iter().enumerate() {
        let low = source.read(column, point.index)?;
        let value = if point.fraction > 0.0 {
            let high = source.read(column, point.index + 1)?;
            column.interpolate(&low, &high, point.fraction)
        } else {
            low
        };
        storage = column.set_value(storage, i, &value);
    }
    Ok(C::Raw::wrap_vector(column.convert(storage, points.len())))
}

impl From<DurationColumn> for Column {
    fn from(column: DurationColumn) -> Self {
        Column::Duration(column)
    }
}

impl From<LengthColumn> for Column {
    fn from(column: LengthColumn) -> Self {
        Column::Length(column)
    }
}

impl From<SpeedColumn> for Column {
    fn from(column: SpeedColumn) -> Self {
        Column::Speed(column)
    }
}

impl From<NumberColumn> for Column {
    fn from(column: NumberColumn) -> Self {
        Column::Number(column)
    }
}

impl From<CategoryColumn> for Column {
    fn from(column: CategoryColumn) -> Self {
        Column::Category(column)
    }
}

impl From<ReferenceSpeedColumn> for Column {
    fn from(column: ReferenceSpeedColumn) -> Self {
        Column::ReferenceSpeed(column)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::Speed;
    use crate::SegmentId;

    fn gtu(speed: f64) -> GtuSnapshot {
        GtuSnapshot {
            id: "7".into(),
            gtu_type: "Car".into(),
            origin: None,
            destination: None,
            route: None,
            reference_speed: None,
            speed,
            acceleration: 0.0,
            segment: SegmentId::default(),
            position: 0.0,
        }
    }

    #[test]
    fn record_and_convert() {
        let column = Column::from(SpeedColumn::speed());
        let mut data = column.initialize();
        for (i, v) in [3.0, 4.0, 5.0].into_iter().enumerate() {
            column.record(&mut data, i, &gtu(v));
        }
        let vector = column.convert(data, 3).unwrap();
        assert_eq!(vector, ColumnVector::Numeric(vec![3.0, 4.0, 5.0].into()));
        let source = ColumnSource::Output(&vector);
        assert_eq!(source.read(&SpeedColumn::speed(), 1), Ok(Speed(4.0)));
        assert_eq!(column.format(source, 2), Ok("5 m/s".to_string()));
    }

    #[test]
    fn resample_interpolates() {
        let column = Column::from(SpeedColumn::speed());
        let vector = ColumnVector::Numeric(vec![0.0, 10.0, 20.0].into());
        let points = [
            SamplePoint { index: 0, fraction: 0.5 },
            SamplePoint { index: 1, fraction: 0.0 },
            SamplePoint { index: 1, fraction: 0.25 },
        ];
        let resampled = column
            .resample(ColumnSource::Output(&vector), &points)
            .unwrap();
        assert_eq!(resampled, ColumnVector::Numeric(vec![5.0, 10.0, 12.5].into()));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "holds a different value type")]
    fn record_into_mismatched_storage() {
        let mut data = Column::from(CategoryColumn::new("c", "category", |_| None)).initialize();
        Column::from(SpeedColumn::speed()).record(&mut data, 0, &gtu(1.0));
    }

    #[test]
    fn mismatched_reads() {
        let vector = ColumnVector::Text(vec!["up".to_string()].into());
        assert!(matches!(
            ColumnSource::Output(&vector).read(&SpeedColumn::speed(), 0),
            Err(KpiError::UnsupportedOperation(_))
        ));
    }
}

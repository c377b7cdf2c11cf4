use crate::data::{
    Column, ColumnData, ColumnSource, ColumnStorage, ColumnVector, ExtendedDataType,
    OutputVector, SamplePoint,
};
use crate::error::{KpiError, Result};
use crate::gtu::GtuSnapshot;
use crate::meta::{MetaData, MetaDataKind};
use crate::util::Interval;
use crate::SegmentId;
use serde_json::json;
use std::borrow::Cow;
use std::rc::Rc;

/// One continuous recorded traverse of a single GTU across a single segment.
#[derive(Clone, Debug)]
pub struct Trajectory {
    /// The GTU's static attributes, captured when the trajectory was opened.
    meta: MetaData,
    /// The segment the trajectory was recorded on.
    segment: SegmentId,
    /// The columns registered with the sampler.
    columns: Rc<[Column]>,
    /// The number of committed samples.
    len: usize,
    /// The recorded samples.
    samples: Samples,
}

/// The recorded samples, in growable form while open and finalized once closed.
#[derive(Clone, Debug)]
enum Samples {
    Open {
        times: ColumnStorage<f64>,
        positions: ColumnStorage<f64>,
        data: Vec<ColumnData>,
    },
    Closed {
        times: OutputVector<f64>,
        positions: OutputVector<f64>,
        data: Vec<ColumnVector>,
    },
}

impl Trajectory {
    /// Creates an open trajectory with no samples.
    pub(crate) fn new(
        gtu: &GtuSnapshot,
        columns: Rc<[Column]>,
        meta_types: &[MetaDataKind],
    ) -> Self {
        let data = columns.iter().map(|c| c.initialize()).collect();
        Self {
            meta: MetaData::capture(gtu, meta_types),
            segment: gtu.segment,
            columns,
            len: 0,
            samples: Samples::Open {
                times: ColumnStorage::with_capacity(0),
                positions: ColumnStorage::with_capacity(0),
                data,
            },
        }
    }

    /// Appends a sample of the GTU at `time`.
    ///
    /// Returns false if the trajectory is closed or `time` does not advance.
    pub(crate) fn append(&mut self, gtu: &GtuSnapshot, time: f64) -> bool {
        if let Some(last) = self.end_time() {
            if time <= last {
                return false;
            }
        }
        let index = self.len;
        match &mut self.samples {
            Samples::Open {
                times,
                positions,
                data,
            } => {
                times.set(index, time);
                positions.set(index, gtu.position);
                for (column, data) in self.columns.iter().zip(data.iter_mut()) {
                    column.record(data, index, gtu);
                }
            }
            Samples::Closed { .. } => return false,
        }
        self.len += 1;
        true
    }

    /// Finalizes every column to exactly the committed number of samples.
    pub(crate) fn close(&mut self) -> Result<()> {
        let len = self.len;
        let samples = std::mem::replace(
            &mut self.samples,
            Samples::Closed {
                times: OutputVector::from(vec![]),
                positions: OutputVector::from(vec![]),
                data: vec![],
            },
        );
        self.samples = match samples {
            Samples::Open {
                times,
                positions,
                data,
            } => Samples::Closed {
                times: times.into_output(len),
                positions: positions.into_output(len),
                data: self
                    .columns
                    .iter()
                    .zip(data)
                    .map(|(column, data)| column.convert(data, len))
                    .collect::<Result<_>>()?,
            },
            closed => closed,
        };
        Ok(())
    }

    /// Whether samples can still be appended.
    pub fn is_open(&self) -> bool {
        matches!(self.samples, Samples::Open { .. })
    }

    /// The number of samples.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no samples.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The ID of the GTU.
    pub fn gtu_id(&self) -> &str {
        self.meta.gtu_id()
    }

    /// The GTU's meta data.
    pub fn meta(&self) -> &MetaData {
        &self.meta
    }

    /// The segment the trajectory was recorded on.
    pub fn segment(&self) -> SegmentId {
        self.segment
    }

    /// The sample times in s.
    pub fn times(&self) -> &[f64] {
        match &self.samples {
            Samples::Open { times, .. } => times.valid(self.len),
            Samples::Closed { times, .. } => times.as_slice(),
        }
    }

    /// The sample positions along the segment in m.
    pub fn positions(&self) -> &[f64] {
        match &self.samples {
            Samples::Open { positions, .. } => positions.valid(self.len),
            Samples::Closed { positions, .. } => positions.as_slice(),
        }
    }

    /// The time of the first sample.
    pub fn start_time(&self) -> Option<f64> {
        self.times().first().copied()
    }

    /// The time of the last sample.
    pub fn end_time(&self) -> Option<f64> {
        self.times().last().copied()
    }

    /// The distance travelled between the first and last sample in m.
    pub fn total_length(&self) -> f64 {
        match self.positions() {
            [first, .., last] => last - first,
            _ => 0.0,
        }
    }

    /// The time elapsed between the first and last sample in s.
    pub fn total_duration(&self) -> f64 {
        match self.times() {
            [first, .., last] => last - first,
            _ => 0.0,
        }
    }

    /// The columns carried by this trajectory.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Whether the trajectory carries the given column.
    pub fn contains<C: ExtendedDataType>(&self, column: &C) -> bool {
        self.column_index(column.id()).is_some()
    }

    /// The finalized values of a column, once closed.
    pub fn output(&self, id: &str) -> Option<&ColumnVector> {
        match &self.samples {
            Samples::Closed { data, .. } => data.get(self.column_index(id)?),
            Samples::Open { .. } => None,
        }
    }

    /// Reads one value of a column.
    pub fn value<C: ExtendedDataType>(&self, column: &C, index: usize) -> Result<C::Value> {
        if index >= self.len {
            return Err(KpiError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        self.source(column)?.read(column, index)
    }

    /// Reads all values of a column.
    pub fn values<C: ExtendedDataType>(&self, column: &C) -> Result<Vec<C::Value>> {
        let source = self.source(column)?;
        (0..self.len).map(|i| source.read(column, i)).collect()
    }

    /// Clips the trajectory to a time window, interpolating samples at the
    /// window edges. Returns `None` if no part of the trajectory is in the window,
    /// or if the window ends before it starts.
    pub fn subset(&self, window: Interval<f64>) -> Option<Cow<'_, Trajectory>> {
        let points = window_points(self.times(), window);
        if points.is_empty() {
            return None;
        }
        if points.len() == self.len && points.iter().all(|p| p.fraction == 0.0) {
            return Some(Cow::Borrowed(self));
        }
        match self.resample(&points) {
            Ok(trajectory) => Some(Cow::Owned(trajectory)),
            Err(err) => {
                log::warn!("Could not clip trajectory of GTU {}: {}", self.gtu_id(), err);
                None
            }
        }
    }

    /// Dumps the trajectory as JSON, with column values formatted as text.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let meta = self
            .meta
            .iter()
            .map(|(kind, value)| (kind.id().to_string(), json!(value)))
            .collect::<serde_json::Map<_, _>>();
        let mut columns = serde_json::Map::new();
        for (idx, column) in self.columns.iter().enumerate() {
            let source = self.column_source(idx);
            let values = (0..self.len)
                .map(|i| column.format(source, i))
                .collect::<Result<Vec<_>>>()?;
            columns.insert(column.id().to_string(), json!(values));
        }
        Ok(json!({
            "gtu": self.gtu_id(),
            "meta": meta,
            "t": self.times(),
            "x": self.positions(),
            "data": columns,
        }))
    }

    fn column_index(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id() == id)
    }

    fn column_source(&self, idx: usize) -> ColumnSource<'_> {
        match &self.samples {
            Samples::Open { data, .. } => ColumnSource::Storage(&data[idx]),
            Samples::Closed { data, .. } => ColumnSource::Output(&data[idx]),
        }
    }

    fn source<C: ExtendedDataType>(&self, column: &C) -> Result<ColumnSource<'_>> {
        let idx = self.column_index(column.id()).ok_or_else(|| {
            KpiError::UnsupportedOperation(format!(
                "trajectory of GTU {} does not carry column '{}'",
                self.gtu_id(),
                column.id()
            ))
        })?;
        Ok(self.column_source(idx))
    }

    /// Builds a closed trajectory from the given sample points.
    fn resample(&self, points: &[SamplePoint]) -> Result<Trajectory> {
        let lerp = |values: &[f64]| -> Vec<f64> {
            points
                .iter()
                .map(|p| {
                    if p.fraction > 0.0 {
                        Interval::new(values[p.index], values[p.index + 1]).lerp(p.fraction)
                    } else {
                        values[p.index]
                    }
                })
                .collect()
        };
        let data = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| column.resample(self.column_source(idx), points))
            .collect::<Result<_>>()?;
        Ok(Trajectory {
            meta: self.meta.clone(),
            segment: self.segment,
            columns: self.columns.clone(),
            len: points.len(),
            samples: Samples::Closed {
                times: lerp(self.times()).into(),
                positions: lerp(self.positions()).into(),
                data,
            },
        })
    }
}

/// Finds the sample points covering `window`: the samples inside it, plus
/// interpolated samples where the window edges fall between two samples.
fn window_points(times: &[f64], window: Interval<f64>) -> Vec<SamplePoint> {
    let (first, last) = match times {
        [] => return vec![],
        [first, ..] => (*first, times[times.len() - 1]),
    };
    if window.min > window.max || !Interval::new(first, last).touches(&window) {
        return vec![];
    }

    // Only called for times within the sampled span.
    let edge = |time: f64| {
        let index = times.partition_point(|t| *t <= time) - 1;
        let fraction = if times[index] < time {
            Interval::new(times[index], times[index + 1]).inv_lerp(time)
        } else {
            0.0
        };
        SamplePoint { index, fraction }
    };

    let mut points = vec![];
    if first < window.min {
        points.push(edge(window.min));
    }
    points.extend(
        times
            .iter()
            .enumerate()
            .filter(|(_, t)| window.contains(**t))
            .map(|(index, _)| SamplePoint {
                index,
                fraction: 0.0,
            }),
    );
    if last > window.max {
        points.push(edge(window.max));
    }
    // Edges on a sample, or a window of zero length
    points.dedup();
    points
}

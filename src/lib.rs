//! Trajectory sampling and KPI aggregation for microscopic traffic simulations.
//!
//! A [Sampler] records the movement of GTUs over monitored segments into
//! [Trajectory] records, a [Query] selects and filters them by meta data, and
//! [indicator]s aggregate the selection into performance values.

pub use data::{
    Column, ColumnVector, ExtendedDataType, OutputVector, ReferenceSpeedColumn, Speed, SpeedColumn,
};
pub use error::{KpiError, Result};
pub use group::TrajectoryGroup;
pub use gtu::{GtuSnapshot, MonitoredSegment, SegmentAttributes};
pub use indicator::Indicator;
pub use meta::{MetaData, MetaDataKind, MetaDataType};
pub use query::{GtuTrajectories, Query, QueryBuilder, Selection};
pub use sampler::{Sampler, SamplerAttributes, SamplerHost};
pub use schedule::{EventClock, EventQueue, RecordingEvent};
use slotmap::new_key_type;
pub use slotmap::{Key, KeyData};
pub use trajectory::Trajectory;
pub use util::Interval;

pub mod data;
mod error;
mod group;
mod gtu;
pub mod indicator;
pub mod meta;
mod query;
mod sampler;
mod schedule;
mod trajectory;
mod util;

new_key_type! {
    /// Unique ID of a [MonitoredSegment].
    pub struct SegmentId;
}

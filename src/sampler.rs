use crate::data::Column;
use crate::error::{KpiError, Result};
use crate::group::TrajectoryGroup;
use crate::gtu::{GtuSnapshot, MonitoredSegment, SegmentAttributes};
use crate::meta::MetaDataKind;
use crate::schedule::RecordingEvent;
use crate::trajectory::Trajectory;
use crate::SegmentId;
use itertools::Itertools;
use log::{debug, trace, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use slotmap::{SecondaryMap, SlotMap};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// The ID handed to the next sampler.
static NEXT_SAMPLER_ID: AtomicUsize = AtomicUsize::new(0);

/// The simulator a sampler is embedded in.
pub trait SamplerHost {
    /// The current simulation time in s.
    fn now(&self) -> f64;

    /// Asks the simulator to deliver `event` to the sampler at `time`.
    fn schedule(&mut self, time: f64, event: RecordingEvent);

    /// The GTUs currently on a segment.
    fn gtus_on_segment(&self, _segment: SegmentId) -> Vec<GtuSnapshot> {
        vec![]
    }

    /// Called the first time a segment starts recording.
    fn init_recording(&mut self, _segment: &MonitoredSegment) {}

    /// Called when a segment stops recording.
    fn finalize_recording(&mut self, _segment: &MonitoredSegment) {}
}

/// The attributes of a sampler.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SamplerAttributes {
    /// The minimum time between two samples of a trajectory in s.
    /// If `None`, every movement of a GTU is sampled.
    pub sampling_interval: Option<f64>,
}

/// Records trajectories of GTUs on monitored segments.
pub struct Sampler<H> {
    /// Unique among the samplers of this process.
    id: usize,
    /// The simulator.
    host: H,
    /// The sampler's attributes.
    attributes: SamplerAttributes,
    /// The columns recorded for every sample.
    columns: Rc<[Column]>,
    /// The meta data captured for every trajectory.
    meta_types: Vec<MetaDataKind>,
    /// The monitored segments.
    segments: SlotMap<SegmentId, MonitoredSegment>,
    /// The trajectory groups, created when a segment first starts recording.
    groups: SecondaryMap<SegmentId, TrajectoryGroup>,
    /// The segments that are currently recording.
    recording: SecondaryMap<SegmentId, ()>,
    /// Incremented whenever recorded data changes.
    revision: usize,
}

impl<H: SamplerHost> Sampler<H> {
    /// Creates a sampler recording the given columns and meta data.
    pub fn new(
        host: H,
        attributes: &SamplerAttributes,
        columns: impl IntoIterator<Item = Column>,
        meta_types: impl IntoIterator<Item = MetaDataKind>,
    ) -> Self {
        Self {
            id: NEXT_SAMPLER_ID.fetch_add(1, Ordering::Relaxed),
            host,
            attributes: attributes.clone(),
            columns: columns.into_iter().collect(),
            meta_types: meta_types.into_iter().unique().collect(),
            segments: SlotMap::with_key(),
            groups: SecondaryMap::new(),
            recording: SecondaryMap::new(),
            revision: 0,
        }
    }

    /// Gets a reference to the simulator.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Gets a mutable reference to the simulator.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Adds a monitored segment.
    pub fn add_segment(&mut self, attributes: &SegmentAttributes) -> SegmentId {
        self.segments
            .insert_with_key(|id| MonitoredSegment::new(id, attributes))
    }

    /// Gets a monitored segment.
    pub fn segment(&self, segment: SegmentId) -> Option<&MonitoredSegment> {
        self.segments.get(segment)
    }

    /// The recorded columns.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// The recorded meta data types.
    pub fn meta_types(&self) -> &[MetaDataKind] {
        &self.meta_types
    }

    /// The current simulation time in s.
    pub fn now(&self) -> f64 {
        self.host.now()
    }

    /// An ID that tells this sampler apart from every other one.
    pub fn id(&self) -> usize {
        self.id
    }

    /// A counter that changes whenever recorded data changes.
    pub fn revision(&self) -> usize {
        self.revision
    }

    /// Whether a segment is currently recording.
    pub fn is_recording(&self, segment: SegmentId) -> bool {
        self.recording.contains_key(segment)
    }

    /// Gets the trajectories recorded on a segment.
    pub fn trajectory_group(&self, segment: SegmentId) -> Option<&TrajectoryGroup> {
        self.groups.get(segment)
    }

    /// Iterates over all trajectory groups.
    pub fn trajectory_groups(&self) -> impl Iterator<Item = &TrajectoryGroup> {
        self.groups.values()
    }

    /// Asks the simulator to start recording a segment at `time`.
    pub fn schedule_start_recording(&mut self, time: f64, segment: SegmentId) {
        self.host.schedule(time, RecordingEvent::Start(segment));
    }

    /// Asks the simulator to stop recording a segment at `time`.
    pub fn schedule_stop_recording(&mut self, time: f64, segment: SegmentId) {
        self.host.schedule(time, RecordingEvent::Stop(segment));
    }

    /// Handles an event previously scheduled with the simulator.
    pub fn handle_event(&mut self, event: RecordingEvent) -> Result<()> {
        match event {
            RecordingEvent::Start(segment) => self.start_recording(segment),
            RecordingEvent::Stop(segment) => self.stop_recording(segment),
        }
    }

    /// Starts recording a segment, opening a trajectory for every GTU on it
    /// that does not already have one.
    pub fn start_recording(&mut self, segment: SegmentId) -> Result<()> {
        let seg = self.segments.get(segment).ok_or(KpiError::UnknownSegment)?;
        let now = self.host.now();
        if self.recording.insert(segment, ()).is_none() {
            debug!("Start recording segment {} at {}", seg.name(), now);
            if !self.groups.contains_key(segment) {
                self.groups
                    .insert(segment, TrajectoryGroup::new(segment, seg.length(), now));
                self.host.init_recording(seg);
            }
        }
        for gtu in self.host.gtus_on_segment(segment) {
            if gtu.segment == segment {
                self.open_trajectory(&gtu, now);
            }
        }
        Ok(())
    }

    /// Stops recording a segment, closing all of its open trajectories.
    pub fn stop_recording(&mut self, segment: SegmentId) -> Result<()> {
        let seg = self.segments.get(segment).ok_or(KpiError::UnknownSegment)?;
        if self.recording.remove(segment).is_none() {
            warn!("Segment {} is not recording", seg.name());
            return Ok(());
        }
        if let Some(group) = self.groups.get_mut(segment) {
            let closed = group.close_all()?;
            debug!(
                "Stop recording segment {} at {}, closed {} trajectories",
                seg.name(),
                self.host.now(),
                closed
            );
        }
        self.revision += 1;
        self.host.finalize_recording(seg);
        Ok(())
    }

    /// Samples a GTU that has moved. A GTU without an open trajectory on a
    /// recording segment gets a new one.
    pub fn gtu_moved(&mut self, gtu: &GtuSnapshot) {
        if !self.is_recording(gtu.segment) {
            return;
        }
        let now = self.host.now();
        let last_time = match self
            .groups
            .get(gtu.segment)
            .and_then(|group| group.open_trajectory(&gtu.id))
        {
            Some(trajectory) => trajectory.end_time(),
            None => {
                self.open_trajectory(gtu, now);
                return;
            }
        };
        if let (Some(interval), Some(last_time)) = (self.attributes.sampling_interval, last_time) {
            if now - last_time < interval {
                return;
            }
        }
        let group = match self.groups.get_mut(gtu.segment) {
            Some(group) => group,
            None => return,
        };
        match group.append(gtu, now) {
            Some(true) => {
                trace!("Sampled GTU {} at {}", gtu.id, now);
                self.revision += 1;
            }
            Some(false) => warn!("Dropped sample of GTU {} at {}: time did not advance", gtu.id, now),
            None => {}
        }
    }

    /// Closes a GTU's trajectory when it leaves a segment.
    pub fn gtu_left(&mut self, segment: SegmentId, gtu_id: &str) -> Result<()> {
        let group = match self.groups.get_mut(segment) {
            Some(group) => group,
            None => return Ok(()),
        };
        if group.close(gtu_id)? {
            debug!("Closed trajectory of GTU {}", gtu_id);
            self.revision += 1;
        }
        Ok(())
    }

    /// Stops recording every segment, so that no data is left in open trajectories.
    pub fn finish(&mut self) -> Result<()> {
        let segments = self.recording.keys().collect::<Vec<_>>();
        for segment in segments {
            self.stop_recording(segment)?;
        }
        Ok(())
    }

    /// Opens a trajectory and records its first sample, unless the GTU
    /// already has an open trajectory on the segment.
    fn open_trajectory(&mut self, gtu: &GtuSnapshot, time: f64) {
        let group = match self.groups.get_mut(gtu.segment) {
            Some(group) => group,
            None => return,
        };
        if group.open_trajectory(&gtu.id).is_some() {
            return;
        }
        let mut trajectory = Trajectory::new(gtu, self.columns.clone(), &self.meta_types);
        trajectory.append(gtu, time);
        group.insert_open(trajectory);
        debug!("Opened trajectory of GTU {} at {}", gtu.id, time);
        self.revision += 1;
    }
}

use crate::error::Result;
use crate::gtu::GtuSnapshot;
use crate::trajectory::Trajectory;
use crate::SegmentId;
use std::collections::HashMap;

/// The trajectories recorded on one monitored segment.
/// Open trajectories are included and expose the samples committed so far.
#[derive(Clone, Debug)]
pub struct TrajectoryGroup {
    /// The segment.
    segment: SegmentId,
    /// The length of the segment in m.
    length: f64,
    /// The time recording first started on the segment.
    start_time: f64,
    /// All trajectories, in the order they were opened.
    trajectories: Vec<Trajectory>,
    /// Indices of the open trajectories, by GTU ID.
    open: HashMap<String, usize>,
}

impl TrajectoryGroup {
    pub(crate) fn new(segment: SegmentId, length: f64, start_time: f64) -> Self {
        Self {
            segment,
            length,
            start_time,
            trajectories: vec![],
            open: HashMap::new(),
        }
    }

    /// The segment the trajectories were recorded on.
    pub fn segment(&self) -> SegmentId {
        self.segment
    }

    /// The length of the segment in m.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// The time recording first started on the segment.
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// The number of trajectories, open or closed.
    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    /// Iterates over all trajectories in the order they were opened.
    pub fn trajectories(&self) -> impl Iterator<Item = &Trajectory> {
        self.trajectories.iter()
    }

    /// Iterates over the closed trajectories.
    pub fn closed(&self) -> impl Iterator<Item = &Trajectory> {
        self.trajectories.iter().filter(|t| !t.is_open())
    }

    /// Iterates over the open trajectories.
    pub fn open(&self) -> impl Iterator<Item = &Trajectory> {
        self.trajectories.iter().filter(|t| t.is_open())
    }

    /// Gets the open trajectory of a GTU.
    pub fn open_trajectory(&self, gtu_id: &str) -> Option<&Trajectory> {
        self.open.get(gtu_id).map(|idx| &self.trajectories[*idx])
    }

    /// Iterates over all trajectories of a GTU.
    pub fn gtu_trajectories<'a>(&'a self, gtu_id: &'a str) -> impl Iterator<Item = &'a Trajectory> {
        self.trajectories.iter().filter(move |t| t.gtu_id() == gtu_id)
    }

    /// Adds an open trajectory, unless one is already open for the GTU.
    pub(crate) fn insert_open(&mut self, trajectory: Trajectory) -> bool {
        if self.open.contains_key(trajectory.gtu_id()) {
            return false;
        }
        self.open
            .insert(trajectory.gtu_id().to_string(), self.trajectories.len());
        self.trajectories.push(trajectory);
        true
    }

    /// Appends a sample to a GTU's open trajectory.
    /// Returns `None` if the GTU has no open trajectory.
    pub(crate) fn append(&mut self, gtu: &GtuSnapshot, time: f64) -> Option<bool> {
        let idx = *self.open.get(&gtu.id)?;
        Some(self.trajectories[idx].append(gtu, time))
    }

    /// Closes a GTU's open trajectory. Returns false if there was none.
    pub(crate) fn close(&mut self, gtu_id: &str) -> Result<bool> {
        match self.open.remove(gtu_id) {
            Some(idx) => {
                self.trajectories[idx].close()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Closes every open trajectory and returns how many were closed.
    pub(crate) fn close_all(&mut self) -> Result<usize> {
        let open = std::mem::take(&mut self.open);
        for idx in open.values() {
            self.trajectories[*idx].close()?;
        }
        Ok(open.len())
    }
}

#[cfg(test)]
mod test {
    use super::TrajectoryGroup;
    use crate::data::{Column, SpeedColumn};
    use crate::gtu::GtuSnapshot;
    use crate::trajectory::Trajectory;
    use crate::SegmentId;
    use std::rc::Rc;

    fn gtu(id: &str, position: f64) -> GtuSnapshot {
        GtuSnapshot {
            id: id.into(),
            gtu_type: "Car".into(),
            origin: None,
            destination: None,
            route: None,
            reference_speed: None,
            speed: 10.0,
            acceleration: 0.0,
            segment: SegmentId::default(),
            position,
        }
    }

    fn open(group: &mut TrajectoryGroup, id: &str, time: f64) -> bool {
        let columns: Rc<[Column]> = vec![Column::from(SpeedColumn::speed())].into();
        let mut trajectory = Trajectory::new(&gtu(id, 0.0), columns, &[]);
        trajectory.append(&gtu(id, 0.0), time);
        group.insert_open(trajectory)
    }

    #[test]
    fn one_open_trajectory_per_gtu() {
        let mut group = TrajectoryGroup::new(SegmentId::default(), 100.0, 0.0);
        assert!(open(&mut group, "a", 0.0));
        assert!(!open(&mut group, "a", 1.0));
        assert!(open(&mut group, "b", 1.0));
        assert_eq!(group.len(), 2);
        assert_eq!(group.open().count(), 2);

        assert_eq!(group.append(&gtu("a", 10.0), 1.0), Some(true));
        assert_eq!(group.append(&gtu("c", 10.0), 1.0), None);
        assert_eq!(group.open_trajectory("a").map(|t| t.len()), Some(2));

        assert_eq!(group.close("a"), Ok(true));
        assert_eq!(group.close("a"), Ok(false));
        assert_eq!(group.closed().count(), 1);

        // A closed GTU may be recorded again
        assert!(open(&mut group, "a", 5.0));
        assert_eq!(group.gtu_trajectories("a").count(), 2);
        assert_eq!(group.close_all(), Ok(2));
        assert_eq!(group.open().count(), 0);
        assert_eq!(group.closed().count(), 3);
    }
}

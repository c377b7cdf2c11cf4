//! Records supplied by the vehicle-state and network collaborators.

use crate::SegmentId;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The state of a GTU at the moment it is sampled.
#[derive(Clone, Debug, PartialEq)]
pub struct GtuSnapshot {
    /// The GTU's unique identity.
    pub id: String,
    /// The GTU type, e.g. `"Car"` or `"Truck"`.
    pub gtu_type: String,
    /// The origin zone or node, if known.
    pub origin: Option<String>,
    /// The destination zone or node, if known.
    pub destination: Option<String>,
    /// The route, if known.
    pub route: Option<String>,
    /// The speed the GTU would like to travel at in m/s, if it has one.
    pub reference_speed: Option<f64>,
    /// The current speed in m/s.
    pub speed: f64,
    /// The current acceleration in m/s^2.
    pub acceleration: f64,
    /// The segment the GTU is currently on.
    pub segment: SegmentId,
    /// The longitudinal position along `segment`, in m.
    pub position: f64,
}

/// The attributes of a monitored segment.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentAttributes {
    /// A human readable name, e.g. the lane ID in the network.
    pub name: String,
    /// The length of the segment in m.
    pub length: f64,
}

/// An instrumented lane or link extent over which trajectories are recorded.
#[derive(Clone, Debug)]
pub struct MonitoredSegment {
    id: SegmentId,
    name: String,
    length: f64,
}

impl MonitoredSegment {
    pub(crate) fn new(id: SegmentId, attributes: &SegmentAttributes) -> Self {
        Self {
            id,
            name: attributes.name.clone(),
            length: attributes.length,
        }
    }

    /// The segment's ID.
    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// The segment's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The length of the segment in m.
    pub fn length(&self) -> f64 {
        self.length
    }
}

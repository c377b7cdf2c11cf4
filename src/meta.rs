//! Static per-GTU attributes captured when a trajectory is opened.

use crate::gtu::GtuSnapshot;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Extracts a static attribute from a GTU.
pub trait MetaDataType {
    /// The attribute's value type.
    type Value: Clone + Ord + Debug;

    /// The kind used to register and filter on this type.
    fn kind(&self) -> MetaDataKind;

    /// Gets the GTU's value, or `None` if it does not apply to this GTU.
    fn get_value(&self, gtu: &GtuSnapshot) -> Option<Self::Value>;
}

/// The GTU type, e.g. car or truck.
#[derive(Clone, Copy, Debug, Default)]
pub struct GtuTypeData;

/// The GTU's origin.
#[derive(Clone, Copy, Debug, Default)]
pub struct OriginData;

/// The GTU's destination.
#[derive(Clone, Copy, Debug, Default)]
pub struct DestinationData;

/// The GTU's route.
#[derive(Clone, Copy, Debug, Default)]
pub struct RouteData;

impl MetaDataType for GtuTypeData {
    type Value = String;

    fn kind(&self) -> MetaDataKind {
        MetaDataKind::GtuType
    }

    fn get_value(&self, gtu: &GtuSnapshot) -> Option<String> {
        Some(gtu.gtu_type.clone())
    }
}

impl MetaDataType for OriginData {
    type Value = String;

    fn kind(&self) -> MetaDataKind {
        MetaDataKind::Origin
    }

    fn get_value(&self, gtu: &GtuSnapshot) -> Option<String> {
        gtu.origin.clone()
    }
}

impl MetaDataType for DestinationData {
    type Value = String;

    fn kind(&self) -> MetaDataKind {
        MetaDataKind::Destination
    }

    fn get_value(&self, gtu: &GtuSnapshot) -> Option<String> {
        gtu.destination.clone()
    }
}

impl MetaDataType for RouteData {
    type Value = String;

    fn kind(&self) -> MetaDataKind {
        MetaDataKind::Route
    }

    fn get_value(&self, gtu: &GtuSnapshot) -> Option<String> {
        gtu.route.clone()
    }
}

/// The closed set of meta data types a sampler records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MetaDataKind {
    GtuType,
    Origin,
    Destination,
    Route,
}

impl MetaDataKind {
    /// All kinds.
    pub const ALL: [MetaDataKind; 4] = [
        MetaDataKind::GtuType,
        MetaDataKind::Origin,
        MetaDataKind::Destination,
        MetaDataKind::Route,
    ];

    /// A short unique ID.
    pub fn id(&self) -> &'static str {
        match self {
            MetaDataKind::GtuType => "gtuType",
            MetaDataKind::Origin => "origin",
            MetaDataKind::Destination => "destination",
            MetaDataKind::Route => "route",
        }
    }

    /// Gets the GTU's value for this kind.
    pub fn get_value(&self, gtu: &GtuSnapshot) -> Option<String> {
        match self {
            MetaDataKind::GtuType => GtuTypeData.get_value(gtu),
            MetaDataKind::Origin => OriginData.get_value(gtu),
            MetaDataKind::Destination => DestinationData.get_value(gtu),
            MetaDataKind::Route => RouteData.get_value(gtu),
        }
    }
}

/// An immutable snapshot of a GTU's static attributes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MetaData {
    gtu_id: String,
    reference_speed: Option<f64>,
    values: BTreeMap<MetaDataKind, String>,
}

impl MetaData {
    /// Captures the given kinds from the GTU.
    pub(crate) fn capture(gtu: &GtuSnapshot, kinds: &[MetaDataKind]) -> Self {
        let values = kinds
            .iter()
            .filter_map(|kind| Some((*kind, kind.get_value(gtu)?)))
            .collect();
        Self {
            gtu_id: gtu.id.clone(),
            reference_speed: gtu.reference_speed,
            values,
        }
    }

    /// The ID of the GTU.
    pub fn gtu_id(&self) -> &str {
        &self.gtu_id
    }

    /// The GTU's reference speed at capture time in m/s.
    pub fn reference_speed(&self) -> Option<f64> {
        self.reference_speed
    }

    /// Gets a recorded value, or `None` if it was not recorded or not applicable.
    pub fn get(&self, kind: MetaDataKind) -> Option<&str> {
        self.values.get(&kind).map(String::as_str)
    }

    /// Iterates over the recorded values.
    pub fn iter(&self) -> impl Iterator<Item = (MetaDataKind, &str)> {
        self.values.iter().map(|(kind, value)| (*kind, value.as_str()))
    }
}

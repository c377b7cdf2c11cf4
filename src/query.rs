use crate::meta::{MetaData, MetaDataKind, MetaDataType};
use crate::sampler::{Sampler, SamplerHost};
use crate::trajectory::Trajectory;
use crate::util::Interval;
use crate::SegmentId;
use itertools::Itertools;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A selection of segments and a meta data filter over the GTUs recorded on them.
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    id: String,
    description: String,
    /// The segments, without duplicates.
    segments: SmallVec<[SegmentId; 4]>,
    /// The accepted values per constrained meta data type.
    constraints: BTreeMap<MetaDataKind, BTreeSet<String>>,
}

/// Builds a [Query].
#[derive(Clone, Debug)]
pub struct QueryBuilder {
    query: Query,
}

/// The trajectories of one GTU selected by a query.
#[derive(Clone, Debug)]
pub struct GtuTrajectories<'a> {
    trajectories: Vec<Cow<'a, Trajectory>>,
}

/// The result of running a query over a time window.
#[derive(Clone, Debug)]
pub struct Selection<'a> {
    window: Interval<f64>,
    gtus: Vec<GtuTrajectories<'a>>,
    /// The summed length of the recorded segments in m.
    segment_length: f64,
}

impl Query {
    /// Starts building a query.
    pub fn builder(id: &str, description: &str) -> QueryBuilder {
        QueryBuilder {
            query: Query {
                id: id.to_string(),
                description: description.to_string(),
                segments: SmallVec::new(),
                constraints: BTreeMap::new(),
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The queried segments.
    pub fn segments(&self) -> &[SegmentId] {
        &self.segments
    }

    /// The accepted values for a meta data type, or `None` if it is unconstrained.
    pub fn constraint(&self, kind: MetaDataKind) -> Option<&BTreeSet<String>> {
        self.constraints.get(&kind)
    }

    /// Whether a GTU with this meta data passes every constraint.
    /// A GTU without a value for a constrained type is rejected.
    pub fn accepts(&self, meta: &MetaData) -> bool {
        self.constraints.iter().all(|(kind, accepted)| {
            meta.get(*kind)
                .map_or(false, |value| accepted.contains(value))
        })
    }

    /// Selects the accepted GTUs and their trajectories, clipped to `window`.
    /// Open trajectories contribute the samples committed so far. An inverted
    /// window selects nothing.
    pub fn select<'a, H: SamplerHost>(
        &self,
        sampler: &'a Sampler<H>,
        window: Interval<f64>,
    ) -> Selection<'a> {
        let groups = self
            .segments
            .iter()
            .filter_map(|segment| sampler.trajectory_group(*segment))
            .collect::<Vec<_>>();

        let mut gtus: Vec<GtuTrajectories<'a>> = vec![];
        let mut index = HashMap::<&'a str, usize>::new();
        for trajectory in groups.iter().copied().flat_map(|group| group.trajectories()) {
            let subset = match trajectory.subset(window) {
                Some(subset) => subset,
                None => continue,
            };
            let idx = *index.entry(trajectory.gtu_id()).or_insert_with(|| {
                gtus.push(GtuTrajectories {
                    trajectories: vec![],
                });
                gtus.len() - 1
            });
            gtus[idx].trajectories.push(subset);
        }
        gtus.retain(|gtu| self.accepts(gtu.meta()));

        Selection {
            window,
            gtus,
            segment_length: groups.iter().fold(0.0, |sum, group| sum + group.length()),
        }
    }
}

impl QueryBuilder {
    /// Adds a segment to the query.
    pub fn segment(mut self, segment: SegmentId) -> Self {
        self.query.segments.push(segment);
        self
    }

    /// Adds segments to the query.
    pub fn segments(mut self, segments: impl IntoIterator<Item = SegmentId>) -> Self {
        self.query.segments.extend(segments);
        self
    }

    /// Only accepts GTUs whose value of `meta` is one of `accepted`.
    /// Constraining the same type twice widens the accepted set.
    pub fn constrain<M, S>(mut self, meta: M, accepted: impl IntoIterator<Item = S>) -> Self
    where
        M: MetaDataType<Value = String>,
        S: Into<String>,
    {
        self.query
            .constraints
            .entry(meta.kind())
            .or_default()
            .extend(accepted.into_iter().map(Into::into));
        self
    }

    /// Builds the query.
    pub fn build(mut self) -> Query {
        self.query.segments = self.query.segments.into_iter().unique().collect();
        self.query
    }
}

impl<'a> GtuTrajectories<'a> {
    /// The ID of the GTU.
    pub fn gtu_id(&self) -> &str {
        self.meta().gtu_id()
    }

    /// The meta data recorded with the GTU's first trajectory in the selection.
    pub fn meta(&self) -> &MetaData {
        self.trajectories[0].meta()
    }

    /// The GTU's selected trajectories.
    pub fn trajectories(&self) -> impl Iterator<Item = &Trajectory> {
        self.trajectories.iter().map(|t| &**t)
    }
}

impl<'a> Selection<'a> {
    /// The time window.
    pub fn window(&self) -> Interval<f64> {
        self.window
    }

    /// The selected GTUs.
    pub fn gtus(&self) -> &[GtuTrajectories<'a>] {
        &self.gtus
    }

    /// All selected trajectories.
    pub fn trajectories(&self) -> impl Iterator<Item = &Trajectory> {
        self.gtus.iter().flat_map(|gtu| gtu.trajectories())
    }

    /// The summed length in m of the queried segments that have been recorded.
    pub fn segment_length(&self) -> f64 {
        self.segment_length
    }

    /// Whether no GTU was selected.
    pub fn is_empty(&self) -> bool {
        self.gtus.is_empty()
    }
}

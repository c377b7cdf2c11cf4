use super::{Indicator, IndicatorCache};
use crate::data::{ExtendedDataType, SpeedColumn};
use crate::error::{KpiError, Result};
use crate::query::Selection;

/// The number of times a GTU came to a stop.
#[derive(Debug)]
pub struct TotalNumberOfStops {
    /// The column holding each GTU's speed.
    speed: SpeedColumn,
    cache: IndicatorCache,
}

impl TotalNumberOfStops {
    pub fn new(speed: SpeedColumn) -> Self {
        Self {
            speed,
            cache: Default::default(),
        }
    }
}

impl Indicator for TotalNumberOfStops {
    fn id(&self) -> &str {
        "NOS"
    }

    fn calculate(&self, selection: &Selection) -> Result<f64> {
        let mut stops = 0;
        for trajectory in selection.trajectories() {
            if !trajectory.contains(&self.speed) {
                return Err(KpiError::UnsupportedOperation(format!(
                    "trajectory of GTU {} has no '{}' column",
                    trajectory.gtu_id(),
                    self.speed.id()
                )));
            }
            stops += trajectory
                .values(&self.speed)?
                .windows(2)
                .filter(|v| v[0].si() > 0.0 && v[1].si() <= 0.0)
                .count();
        }
        Ok(stops as f64)
    }

    fn cache(&self) -> &IndicatorCache {
        &self.cache
    }
}

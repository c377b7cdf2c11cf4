use super::{Indicator, IndicatorCache};
use crate::data::{ExtendedDataType, ReferenceSpeedColumn};
use crate::error::{KpiError, Result};
use crate::query::Selection;
use crate::trajectory::Trajectory;

/// The summed delay in s with respect to each GTU's own reference speed.
///
/// Every selected trajectory must carry the [ReferenceSpeedColumn].
#[derive(Debug, Default)]
pub struct TotalDelayReference {
    column: ReferenceSpeedColumn,
    cache: IndicatorCache,
}

/// The summed delay in s with respect to a fixed reference speed.
#[derive(Debug)]
pub struct TotalDelay {
    /// The reference speed in m/s.
    reference_speed: f64,
    cache: IndicatorCache,
}

impl TotalDelayReference {
    pub fn new() -> Self {
        Default::default()
    }

    /// The time in s the trajectory would have taken at the reference speed.
    /// A step uses the reference speed of its first sample, or the average
    /// of both samples if the first has none.
    fn reference_time(&self, trajectory: &Trajectory) -> Result<f64> {
        if !trajectory.contains(&self.column) {
            return Err(KpiError::UnsupportedOperation(format!(
                "trajectory of GTU {} has no '{}' column",
                trajectory.gtu_id(),
                self.column.id()
            )));
        }
        let speeds = trajectory.values(&self.column)?;
        let time = trajectory
            .positions()
            .windows(2)
            .zip(speeds.windows(2))
            .fold(0.0, |sum, (x, v)| {
                let speed = if v[0].si().is_nan() {
                    0.5 * (v[0].si() + v[1].si())
                } else {
                    v[0].si()
                };
                sum + (x[1] - x[0]) / speed
            });
        Ok(time)
    }
}

impl TotalDelay {
    /// Creates the indicator for a reference speed in m/s.
    pub fn new(reference_speed: f64) -> Self {
        Self {
            reference_speed,
            cache: Default::default(),
        }
    }
}

/// A GTU's delay, never negative. An undefined delay stays NaN.
fn clipped_delay(actual: f64, reference: f64) -> f64 {
    let delay = actual - reference;
    if delay.is_nan() {
        delay
    } else {
        f64::max(delay, 0.0)
    }
}

impl Indicator for TotalDelayReference {
    fn id(&self) -> &str {
        "TDR"
    }

    fn calculate(&self, selection: &Selection) -> Result<f64> {
        let mut delay = 0.0;
        for gtu in selection.gtus() {
            let mut actual = 0.0;
            let mut reference = 0.0;
            for trajectory in gtu.trajectories() {
                actual += trajectory.total_duration();
                reference += self.reference_time(trajectory)?;
            }
            delay += clipped_delay(actual, reference);
        }
        Ok(delay)
    }

    fn cache(&self) -> &IndicatorCache {
        &self.cache
    }
}

impl Indicator for TotalDelay {
    fn id(&self) -> &str {
        "TD"
    }

    fn calculate(&self, selection: &Selection) -> Result<f64> {
        let delay = selection.gtus().iter().fold(0.0, |sum, gtu| {
            let (actual, distance) = gtu
                .trajectories()
                .fold((0.0, 0.0), |(t, x), trajectory| {
                    (t + trajectory.total_duration(), x + trajectory.total_length())
                });
            sum + clipped_delay(actual, distance / self.reference_speed)
        });
        Ok(delay)
    }

    fn cache(&self) -> &IndicatorCache {
        &self.cache
    }
}

use super::{ratio, Indicator, IndicatorCache};
use crate::error::Result;
use crate::query::Selection;
use std::rc::Rc;

/// The summed distance travelled in m.
#[derive(Debug, Default)]
pub struct TotalTravelDistance {
    cache: IndicatorCache,
}

/// The summed time travelled in s.
#[derive(Debug, Default)]
pub struct TotalTravelTime {
    cache: IndicatorCache,
}

/// Total travel distance over total travel time, in m/s.
#[derive(Debug)]
pub struct MeanSpeed {
    travel_distance: Rc<TotalTravelDistance>,
    travel_time: Rc<TotalTravelTime>,
    cache: IndicatorCache,
}

/// The time in s needed to traverse the recorded segments at the mean speed.
#[derive(Debug)]
pub struct MeanTravelTime {
    mean_speed: Rc<MeanSpeed>,
    cache: IndicatorCache,
}

impl TotalTravelDistance {
    pub fn new() -> Self {
        Default::default()
    }
}

impl TotalTravelTime {
    pub fn new() -> Self {
        Default::default()
    }
}

impl MeanSpeed {
    pub fn new(travel_distance: Rc<TotalTravelDistance>, travel_time: Rc<TotalTravelTime>) -> Self {
        Self {
            travel_distance,
            travel_time,
            cache: Default::default(),
        }
    }
}

impl MeanTravelTime {
    pub fn new(mean_speed: Rc<MeanSpeed>) -> Self {
        Self {
            mean_speed,
            cache: Default::default(),
        }
    }
}

impl Indicator for TotalTravelDistance {
    fn id(&self) -> &str {
        "TTD"
    }

    fn calculate(&self, selection: &Selection) -> Result<f64> {
        Ok(selection
            .trajectories()
            .fold(0.0, |sum, t| sum + t.total_length()))
    }

    fn cache(&self) -> &IndicatorCache {
        &self.cache
    }
}

impl Indicator for TotalTravelTime {
    fn id(&self) -> &str {
        "TTT"
    }

    fn calculate(&self, selection: &Selection) -> Result<f64> {
        Ok(selection
            .trajectories()
            .fold(0.0, |sum, t| sum + t.total_duration()))
    }

    fn cache(&self) -> &IndicatorCache {
        &self.cache
    }
}

impl Indicator for MeanSpeed {
    fn id(&self) -> &str {
        "MS"
    }

    fn calculate(&self, selection: &Selection) -> Result<f64> {
        let distance = self.travel_distance.calculate(selection)?;
        let time = self.travel_time.calculate(selection)?;
        Ok(ratio(distance, time))
    }

    fn cache(&self) -> &IndicatorCache {
        &self.cache
    }
}

impl Indicator for MeanTravelTime {
    fn id(&self) -> &str {
        "MTT"
    }

    fn calculate(&self, selection: &Selection) -> Result<f64> {
        let speed = self.mean_speed.calculate(selection)?;
        Ok(ratio(selection.segment_length(), speed))
    }

    fn cache(&self) -> &IndicatorCache {
        &self.cache
    }
}

use super::{ratio, Indicator, IndicatorCache, TotalTravelDistance, TotalTravelTime};
use crate::error::Result;
use crate::query::Selection;
use std::rc::Rc;

/// The mean number of GTUs per m over the window and the recorded segments.
#[derive(Debug)]
pub struct MeanDensity {
    travel_time: Rc<TotalTravelTime>,
    cache: IndicatorCache,
}

/// The mean number of GTUs passing per s over the window and the recorded segments.
#[derive(Debug)]
pub struct MeanIntensity {
    travel_distance: Rc<TotalTravelDistance>,
    cache: IndicatorCache,
}

impl MeanDensity {
    pub fn new(travel_time: Rc<TotalTravelTime>) -> Self {
        Self {
            travel_time,
            cache: Default::default(),
        }
    }
}

impl MeanIntensity {
    pub fn new(travel_distance: Rc<TotalTravelDistance>) -> Self {
        Self {
            travel_distance,
            cache: Default::default(),
        }
    }
}

/// The area of the space-time region in m*s.
fn region_area(selection: &Selection) -> f64 {
    selection.window().length() * selection.segment_length()
}

impl Indicator for MeanDensity {
    fn id(&self) -> &str {
        "MD"
    }

    fn calculate(&self, selection: &Selection) -> Result<f64> {
        let time = self.travel_time.calculate(selection)?;
        Ok(ratio(time, region_area(selection)))
    }

    fn cache(&self) -> &IndicatorCache {
        &self.cache
    }
}

impl Indicator for MeanIntensity {
    fn id(&self) -> &str {
        "MI"
    }

    fn calculate(&self, selection: &Selection) -> Result<f64> {
        let distance = self.travel_distance.calculate(selection)?;
        Ok(ratio(distance, region_area(selection)))
    }

    fn cache(&self) -> &IndicatorCache {
        &self.cache
    }
}

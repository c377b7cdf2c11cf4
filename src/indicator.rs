//! Performance indicators computed from query selections.

pub use delay::{TotalDelay, TotalDelayReference};
pub use density::{MeanDensity, MeanIntensity};
pub use stops::TotalNumberOfStops;
pub use travel::{MeanSpeed, MeanTravelTime, TotalTravelDistance, TotalTravelTime};

use crate::error::Result;
use crate::query::{Query, Selection};
use crate::sampler::{Sampler, SamplerHost};
use crate::util::Interval;
use std::cell::RefCell;

mod delay;
mod density;
mod stops;
mod travel;

/// A derived value computed from the trajectories a query selects.
///
/// Indicators that depend on other indicators hold them directly and
/// evaluate them on the same [Selection].
pub trait Indicator {
    /// A short unique ID.
    fn id(&self) -> &str;

    /// Computes the value from a selection.
    fn calculate(&self, selection: &Selection) -> Result<f64>;

    /// The cache of the most recent value.
    fn cache(&self) -> &IndicatorCache;

    /// Computes the value for `query` over `[start_time, end_time]`,
    /// reusing the cached value if nothing was recorded since.
    fn compute<H: SamplerHost>(
        &self,
        sampler: &Sampler<H>,
        query: &Query,
        start_time: f64,
        end_time: f64,
    ) -> Result<f64>
    where
        Self: Sized,
    {
        let key = CacheKey {
            sampler: sampler.id(),
            revision: sampler.revision(),
            query: query.clone(),
            window: Interval::new(start_time, end_time),
        };
        if let Some(value) = self.cache().get(&key) {
            log::trace!("Indicator {} reused value for query {}", self.id(), query.id());
            return Ok(value);
        }
        let selection = query.select(sampler, key.window);
        let value = self.calculate(&selection)?;
        self.cache().set(key, value);
        Ok(value)
    }
}

/// Identifies an indicator evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheKey {
    sampler: usize,
    revision: usize,
    query: Query,
    window: Interval<f64>,
}

/// Remembers an indicator's most recent value.
#[derive(Debug, Default)]
pub struct IndicatorCache {
    last: RefCell<Option<(CacheKey, f64)>>,
}

impl IndicatorCache {
    fn get(&self, key: &CacheKey) -> Option<f64> {
        match &*self.last.borrow() {
            Some((last, value)) if last == key => Some(*value),
            _ => None,
        }
    }

    fn set(&self, key: CacheKey, value: f64) {
        *self.last.borrow_mut() = Some((key, value));
    }
}

/// Divides, returning NaN when the denominator is zero.
pub(crate) fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        f64::NAN
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ratio_of_zero() {
        assert!(ratio(1.0, 0.0).is_nan());
        assert!(ratio(0.0, 0.0).is_nan());
        assert_eq!(ratio(10.0, 4.0), 2.5);
    }

    #[test]
    fn cache_matches_whole_key() {
        let cache = IndicatorCache::default();
        let key = CacheKey {
            sampler: 0,
            revision: 3,
            query: Query::builder("q", "").build(),
            window: Interval::new(0.0, 10.0),
        };
        assert_eq!(cache.get(&key), None);
        cache.set(key.clone(), 4.0);
        assert_eq!(cache.get(&key), Some(4.0));
        assert_eq!(
            cache.get(&CacheKey {
                revision: 4,
                ..key.clone()
            }),
            None
        );
        assert_eq!(
            cache.get(&CacheKey {
                sampler: 1,
                ..key.clone()
            }),
            None
        );
        assert_eq!(
            cache.get(&CacheKey {
                query: Query::builder("q", "")
                    .constrain(crate::meta::GtuTypeData, ["Truck"])
                    .build(),
                ..key.clone()
            }),
            None
        );
        assert_eq!(
            cache.get(&CacheKey {
                window: Interval::new(0.0, 5.0),
                ..key
            }),
            None
        );
    }
}

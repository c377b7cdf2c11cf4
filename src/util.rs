//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use cgmath::num_traits::Float;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An interval on the real number line, such as a time window.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: std::cmp::PartialOrd> Interval<T> {
    /// Returns true if this interval shares at least one point with the other,
    /// including a shared end point.
    pub fn touches(&self, other: &Self) -> bool {
        self.max >= other.min && other.max >= self.min
    }

    /// Returns true if this interval contains the value.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

impl<T: std::ops::Sub<T, Output = T> + Copy> Interval<T> {
    /// Gets the magnitude of the interval.
    pub fn length(&self) -> T {
        self.max - self.min
    }
}

impl<T: Float> Interval<T> {
    /// Linearly maps `t` in `[0, 1]` onto the interval.
    pub fn lerp(&self, t: T) -> T {
        self.min + t * (self.max - self.min)
    }

    /// The inverse of [Self::lerp].
    pub fn inv_lerp(&self, value: T) -> T {
        (value - self.min) / (self.max - self.min)
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}

#[cfg(test)]
mod test {
    use super::Interval;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn touching_intervals() {
        let window = Interval::new(10.0, 20.0);
        assert!(window.touches(&Interval::new(20.0, 30.0)));
        assert!(window.touches(&Interval::new(0.0, 10.0)));
        assert!(window.touches(&Interval::new(12.0, 13.0)));
        assert!(!window.touches(&Interval::new(20.5, 30.0)));
        assert!(!window.touches(&Interval::new(0.0, 9.9)));
    }

    #[test]
    fn lerp_and_inverse() {
        let window: Interval<f64> = Interval::new(10.0, 20.0);
        assert_approx_eq!(window.lerp(0.25), 12.5);
        assert_approx_eq!(window.inv_lerp(12.5), 0.25);
        assert_approx_eq!(window.length(), 10.0);
    }
}

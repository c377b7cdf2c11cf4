use super::{interpolate_linear, interpolate_nearest, parse_number, ExtendedDataType};
use crate::error::Result;
use crate::gtu::GtuSnapshot;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares a newtype over an SI value with a fixed unit.
macro_rules! quantity {
    ($(#[$doc:meta])* $name:ident, $unit:literal) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name(pub f64);

        impl $name {
            /// The unit used when formatting.
            pub const UNIT: &'static str = $unit;

            /// The value in SI units.
            pub fn si(self) -> f64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} {}", self.0, $unit)
            }
        }
    };
}

quantity!(
    /// A duration in s.
    Duration,
    "s"
);
quantity!(
    /// A length in m.
    Length,
    "m"
);
quantity!(
    /// A speed in m/s.
    Speed,
    "m/s"
);

/// Declares a column recording one quantity extracted from a GTU.
macro_rules! quantity_column {
    ($(#[$doc:meta])* $column:ident, $value:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug)]
        pub struct $column {
            id: String,
            description: String,
            extract: fn(&GtuSnapshot) -> Option<f64>,
        }

        impl $column {
            /// Creates a column that records `extract` for each sample.
            pub fn new(id: &str, description: &str, extract: fn(&GtuSnapshot) -> Option<f64>) -> Self {
                Self {
                    id: id.to_string(),
                    description: description.to_string(),
                    extract,
                }
            }
        }

        impl ExtendedDataType for $column {
            type Value = $value;
            type Raw = f64;

            fn id(&self) -> &str {
                &self.id
            }

            fn description(&self) -> &str {
                &self.description
            }

            fn get_value(&self, gtu: &GtuSnapshot) -> Option<$value> {
                (self.extract)(gtu).map($value)
            }

            fn missing_value(&self) -> $value {
                $value(f64::NAN)
            }

            fn to_raw(&self, value: &$value) -> f64 {
                value.0
            }

            fn convert_value(&self, raw: &f64) -> $value {
                $value(*raw)
            }

            fn format_value(&self, value: &$value) -> String {
                value.to_string()
            }

            fn parse_value(&self, text: &str) -> Result<$value> {
                parse_number(text, $value::UNIT, stringify!($value)).map($value)
            }

            fn interpolate(&self, low: &$value, high: &$value, fraction: f64) -> $value {
                $value(interpolate_linear(low.0, high.0, fraction))
            }
        }
    };
}

quantity_column!(
    /// A column of durations, e.g. a time headway.
    DurationColumn,
    Duration
);
quantity_column!(
    /// A column of lengths, e.g. a distance headway.
    LengthColumn,
    Length
);
quantity_column!(
    /// A column of speeds.
    SpeedColumn,
    Speed
);

impl SpeedColumn {
    /// Records the GTU's current speed.
    pub fn speed() -> Self {
        Self::new("v", "speed", |gtu| Some(gtu.speed))
    }
}

/// A column of dimensionless numbers.
#[derive(Clone, Debug)]
pub struct NumberColumn {
    id: String,
    description: String,
    extract: fn(&GtuSnapshot) -> Option<f64>,
}

impl NumberColumn {
    /// Creates a column that records `extract` for each sample.
    pub fn new(id: &str, description: &str, extract: fn(&GtuSnapshot) -> Option<f64>) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            extract,
        }
    }

    /// Records the GTU's current acceleration in m/s^2.
    pub fn acceleration() -> Self {
        Self::new("a", "acceleration in m/s^2", |gtu| Some(gtu.acceleration))
    }
}

impl ExtendedDataType for NumberColumn {
    type Value = f64;
    type Raw = f64;

    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn get_value(&self, gtu: &GtuSnapshot) -> Option<f64> {
        (self.extract)(gtu)
    }

    fn missing_value(&self) -> f64 {
        f64::NAN
    }

    fn to_raw(&self, value: &f64) -> f64 {
        *value
    }

    fn convert_value(&self, raw: &f64) -> f64 {
        *raw
    }

    fn format_value(&self, value: &f64) -> String {
        value.to_string()
    }

    fn parse_value(&self, text: &str) -> Result<f64> {
        parse_number(text, "", "Number")
    }

    fn interpolate(&self, low: &f64, high: &f64, fraction: f64) -> f64 {
        interpolate_linear(*low, *high, fraction)
    }
}

/// A column of categorical text values, e.g. a lane change direction.
#[derive(Clone, Debug)]
pub struct CategoryColumn {
    id: String,
    description: String,
    extract: fn(&GtuSnapshot) -> Option<String>,
}

impl CategoryColumn {
    /// Creates a column that records `extract` for each sample.
    pub fn new(id: &str, description: &str, extract: fn(&GtuSnapshot) -> Option<String>) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            extract,
        }
    }
}

impl ExtendedDataType for CategoryColumn {
    type Value = String;
    type Raw = String;

    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn get_value(&self, gtu: &GtuSnapshot) -> Option<String> {
        (self.extract)(gtu)
    }

    fn missing_value(&self) -> String {
        String::new()
    }

    fn to_raw(&self, value: &String) -> String {
        value.clone()
    }

    fn convert_value(&self, raw: &String) -> String {
        raw.clone()
    }

    fn format_value(&self, value: &String) -> String {
        value.clone()
    }

    fn parse_value(&self, text: &str) -> Result<String> {
        Ok(text.to_string())
    }

    fn interpolate(&self, low: &String, high: &String, fraction: f64) -> String {
        interpolate_nearest(low, high, fraction)
    }
}

/// Reads the GTU's reference speed straight from its state.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReferenceSpeedColumn;

impl ExtendedDataType for ReferenceSpeedColumn {
    type Value = Speed;
    type Raw = f64;

    fn id(&self) -> &str {
        "referenceSpeed"
    }

    fn description(&self) -> &str {
        "reference speed"
    }

    fn get_value(&self, gtu: &GtuSnapshot) -> Option<Speed> {
        gtu.reference_speed.map(Speed)
    }

    fn missing_value(&self) -> Speed {
        Speed(f64::NAN)
    }

    fn to_raw(&self, value: &Speed) -> f64 {
        value.0
    }

    fn convert_value(&self, raw: &f64) -> Speed {
        Speed(*raw)
    }

    fn format_value(&self, value: &Speed) -> String {
        value.to_string()
    }

    fn parse_value(&self, text: &str) -> Result<Speed> {
        parse_number(text, Speed::UNIT, "Speed").map(Speed)
    }

    fn interpolate(&self, low: &Speed, high: &Speed, fraction: f64) -> Speed {
        Speed(interpolate_linear(low.0, high.0, fraction))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::KpiError;
    use crate::SegmentId;
    use assert_approx_eq::assert_approx_eq;

    fn gtu(reference_speed: Option<f64>) -> GtuSnapshot {
        GtuSnapshot {
            id: "1".into(),
            gtu_type: "Car".into(),
            origin: None,
            destination: None,
            route: None,
            reference_speed,
            speed: 12.0,
            acceleration: -0.5,
            segment: SegmentId::default(),
            position: 0.0,
        }
    }

    fn lane_change() -> CategoryColumn {
        CategoryColumn::new("lc", "lane change", |_| Some("up".to_string()))
    }

    /// Writes `values` at increasing indices and finalizes them.
    fn write_all<C: ExtendedDataType>(column: &C, values: &[C::Value]) -> Vec<C::Value> {
        let mut storage = column.initialize_storage();
        for (i, value) in values.iter().enumerate() {
            storage = column.set_value(storage, i, value);
        }
        let output = column.convert(storage, values.len());
        (0..values.len())
            .map(|i| column.get_output_value(&output, i).unwrap())
            .collect()
    }

    #[test]
    fn written_values_survive_growth() {
        let values = (0..37).map(|i| Speed(i as f64 * 0.5)).collect::<Vec<_>>();
        assert_eq!(write_all(&SpeedColumn::speed(), &values), values);

        let values = ["up", "down", "", "none", "up"].map(String::from).to_vec();
        assert_eq!(write_all(&lane_change(), &values), values);
    }

    #[test]
    fn output_reads_past_the_end_fail() {
        let column = DurationColumn::new("h", "headway", |_| Some(1.0));
        let storage = column.set_value(column.initialize_storage(), 0, &Duration(1.0));
        let output = column.convert(storage, 1);
        assert!(column.get_output_value(&output, 0).is_ok());
        assert_eq!(
            column.get_output_value(&output, 1),
            Err(KpiError::IndexOutOfRange { index: 1, len: 1 })
        );

        let empty = column.convert(column.initialize_storage(), 0);
        assert!(column.get_output_value(&empty, 0).is_err());

        let empty = lane_change().convert(lane_change().initialize_storage(), 0);
        assert!(lane_change().get_output_value(&empty, 0).is_err());
    }

    #[test]
    fn storage_reads_are_bounded_by_capacity() {
        let column = NumberColumn::acceleration();
        let storage = column.set_value(column.initialize_storage(), 2, &3.0);
        assert_eq!(column.get_storage_value(&storage, 2), Ok(3.0));
        assert!(column.get_storage_value(&storage, 3).is_err());
    }

    #[test]
    fn numeric_interpolation() {
        let column = SpeedColumn::speed();
        assert_eq!(column.interpolate(&Speed(2.0), &Speed(6.0), 0.0), Speed(2.0));
        assert_eq!(column.interpolate(&Speed(2.0), &Speed(6.0), 1.0), Speed(6.0));
        assert_approx_eq!(column.interpolate(&Speed(2.0), &Speed(6.0), 0.25).si(), 3.0);
        assert_eq!(NumberColumn::acceleration().interpolate(&0.0, &1.0, 0.3), 0.3);
    }

    #[test]
    fn categorical_interpolation() {
        let column = lane_change();
        let (down, up) = ("down".to_string(), "up".to_string());
        assert_eq!(column.interpolate(&down, &up, 0.0), "down");
        assert_eq!(column.interpolate(&down, &up, 0.49), "down");
        assert_eq!(column.interpolate(&down, &up, 0.50), "up");
        assert_eq!(column.interpolate(&down, &up, 1.0), "up");
    }

    #[test]
    fn text_round_trip() {
        let duration = DurationColumn::new("h", "headway", |_| None);
        let text = duration.format_value(&Duration(1.0));
        assert_eq!(text, "1 s");
        assert_eq!(duration.parse_value(&text), Ok(Duration(1.0)));

        let length = LengthColumn::new("s", "gap", |_| None);
        assert_eq!(length.parse_value(&length.format_value(&Length(1.0))), Ok(Length(1.0)));

        let speed = SpeedColumn::speed();
        assert_eq!(speed.parse_value(&speed.format_value(&Speed(1.0))), Ok(Speed(1.0)));

        let number = NumberColumn::acceleration();
        assert_eq!(number.parse_value(&number.format_value(&1.0)), Ok(1.0));

        let category = lane_change();
        let text = "text".to_string();
        assert_eq!(category.parse_value(&category.format_value(&text)), Ok(text));
    }

    #[test]
    fn malformed_text() {
        assert!(matches!(
            SpeedColumn::speed().parse_value("quick"),
            Err(KpiError::Parse { kind: "Speed", .. })
        ));
        assert!(LengthColumn::new("s", "gap", |_| None).parse_value("2 s").is_err());
    }

    #[test]
    fn reference_speed_reads_through() {
        let column = ReferenceSpeedColumn;
        assert_eq!(column.get_value(&gtu(Some(27.5))), Some(Speed(27.5)));
        assert_eq!(column.get_value(&gtu(None)), None);
        assert!(column.sample(&gtu(None)).si().is_nan());
        assert_eq!(column.parse_value("27.5 m/s"), Ok(Speed(27.5)));
    }

    #[test]
    fn extractors() {
        assert_eq!(SpeedColumn::speed().get_value(&gtu(None)), Some(Speed(12.0)));
        assert_eq!(NumberColumn::acceleration().get_value(&gtu(None)), Some(-0.5));
    }
}

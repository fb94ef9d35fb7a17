//! Record types
//!
//! These types represent what the store persists: detent profiles (one per
//! element of the knob file) and the motor calibration record. Both are
//! stored as JSON; field names below are the on-disk keys.

use core::fmt;

use heapless::String;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::config::DESCRIPTOR_MAX_LEN;

/// Descriptor used when a profile has none
pub const DEFAULT_DESCRIPTOR: &str = "unknown";

/// Profile name, at most [`DESCRIPTOR_MAX_LEN`] bytes
///
/// Construction truncates longer text at the last character boundary that
/// fits, so a descriptor is always valid UTF-8 and never over length.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Descriptor(String<DESCRIPTOR_MAX_LEN>);

impl Descriptor {
    /// Create a descriptor, truncating to [`DESCRIPTOR_MAX_LEN`] bytes
    pub fn new(text: &str) -> Self {
        let mut end = text.len().min(DESCRIPTOR_MAX_LEN);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let mut s = String::new();
        // Cannot fail, end <= capacity
        let _ = s.push_str(&text[..end]);
        Self(s)
    }

    /// The descriptor text
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for Descriptor {
    fn default() -> Self {
        Self::new(DEFAULT_DESCRIPTOR)
    }
}

impl From<&str> for Descriptor {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl PartialEq<str> for Descriptor {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Descriptor {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Descriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

struct DescriptorVisitor;

impl<'de> Visitor<'de> for DescriptorVisitor {
    type Value = Descriptor;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a descriptor string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Descriptor, E> {
        Ok(Descriptor::new(v))
    }

    // A null or scalar descriptor falls back to the default name
    fn visit_unit<E: de::Error>(self) -> Result<Descriptor, E> {
        Ok(Descriptor::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<Descriptor, E> {
        Ok(Descriptor::default())
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Descriptor, E> {
        Ok(Descriptor::default())
    }

    fn visit_i64<E: de::Error>(self, _v: i64) -> Result<Descriptor, E> {
        Ok(Descriptor::default())
    }

    fn visit_u64<E: de::Error>(self, _v: u64) -> Result<Descriptor, E> {
        Ok(Descriptor::default())
    }

    fn visit_f64<E: de::Error>(self, _v: f64) -> Result<Descriptor, E> {
        Ok(Descriptor::default())
    }
}

impl<'de> Deserialize<'de> for Descriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DescriptorVisitor)
    }
}

/// Loose numeric decoding for record fields
///
/// Files are written by hand and by older firmware, so a numeric field
/// takes any JSON value: floats truncate into integer fields, `true` reads
/// as 1, and null, `false`, strings, arrays and objects read as 0.
mod lenient {
    use core::fmt;

    use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};

    struct NumberVisitor;

    impl<'de> Visitor<'de> for NumberVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<f64, E> {
            Ok(if v { 1.0 } else { 0.0 })
        }

        fn visit_unit<E: de::Error>(self) -> Result<f64, E> {
            Ok(0.0)
        }

        fn visit_none<E: de::Error>(self) -> Result<f64, E> {
            Ok(0.0)
        }

        fn visit_str<E: de::Error>(self, _v: &str) -> Result<f64, E> {
            Ok(0.0)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<f64, A::Error> {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            Ok(0.0)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<f64, A::Error> {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(0.0)
        }
    }

    pub fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
        // `as` saturates out-of-range values and maps NaN to 0
        deserializer.deserialize_any(NumberVisitor).map(|v| v as i32)
    }

    pub fn float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        deserializer.deserialize_any(NumberVisitor).map(|v| v as f32)
    }

    pub fn some_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
        int(deserializer).map(Some)
    }
}

/// One selectable detent profile
///
/// Missing keys decode as zero, a missing descriptor as [`DEFAULT_DESCRIPTOR`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct KnobConfig {
    /// Display name
    pub descriptor: Descriptor,
    /// Number of detent positions (0 = unbounded)
    #[serde(deserialize_with = "lenient::int")]
    pub num_positions: i32,
    /// Starting position
    #[serde(deserialize_with = "lenient::int")]
    pub position: i32,
    /// Angular width of one position
    #[serde(deserialize_with = "lenient::float")]
    pub position_width_radians: f32,
    /// Detent torque, 0.0 - 1.0
    #[serde(deserialize_with = "lenient::float")]
    pub detent_strength_unit: f32,
    /// End stop torque, 0.0 - 1.0
    #[serde(deserialize_with = "lenient::float")]
    pub endstop_strength_unit: f32,
    /// Fraction of a position at which the knob snaps to the next one
    #[serde(deserialize_with = "lenient::float")]
    pub snap_point: f32,
}

/// Direction of the position sensor relative to the motor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorDirection {
    Clockwise,
    CounterClockwise,
}

impl SensorDirection {
    /// Value stored in [`MotorConfig::sensor_direction`]
    pub const fn as_raw(self) -> i32 {
        match self {
            SensorDirection::Clockwise => 1,
            SensorDirection::CounterClockwise => -1,
        }
    }
}

/// Motor calibration record
///
/// The direction key is written as `Direction Clockwise`. The older
/// `Clockwise` key is still read; when a file holds both, the newer key
/// wins.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(from = "MotorFile")]
pub struct MotorConfig {
    /// Electrical zero offset in radians
    #[serde(rename = "Zero Electric Angle")]
    pub zero_electric_angle: f32,
    /// Motor pole pairs
    #[serde(rename = "Pole Pairs")]
    pub pole_pairs: i32,
    /// 1 = clockwise, -1 = counter-clockwise, 0 = unknown
    #[serde(rename = "Direction Clockwise")]
    pub sensor_direction: i32,
    /// Greater than zero when the record holds a valid calibration
    #[serde(rename = "Calibrated")]
    pub calibrated: i32,
}

/// Motor file as read, with both direction keys kept apart
#[derive(Default, Deserialize)]
#[serde(default)]
struct MotorFile {
    #[serde(rename = "Zero Electric Angle", deserialize_with = "lenient::float")]
    zero_electric_angle: f32,
    #[serde(rename = "Pole Pairs", deserialize_with = "lenient::int")]
    pole_pairs: i32,
    #[serde(rename = "Direction Clockwise", deserialize_with = "lenient::some_int")]
    direction: Option<i32>,
    #[serde(rename = "Clockwise", deserialize_with = "lenient::some_int")]
    legacy_direction: Option<i32>,
    #[serde(rename = "Calibrated", deserialize_with = "lenient::int")]
    calibrated: i32,
}

impl From<MotorFile> for MotorConfig {
    fn from(file: MotorFile) -> Self {
        Self {
            zero_electric_angle: file.zero_electric_angle,
            pole_pairs: file.pole_pairs,
            sensor_direction: file.direction.or(file.legacy_direction).unwrap_or(0),
            calibrated: file.calibrated,
        }
    }
}

impl MotorConfig {
    /// Create a record flagged as calibrated
    pub const fn new(zero_electric_angle: f32, pole_pairs: i32, direction: SensorDirection) -> Self {
        Self {
            zero_electric_angle,
            pole_pairs,
            sensor_direction: direction.as_raw(),
            calibrated: 1,
        }
    }

    /// Check if this record holds a valid calibration
    pub const fn is_calibrated(&self) -> bool {
        self.calibrated > 0
    }

    /// Sensor direction, if known
    pub const fn direction(&self) -> Option<SensorDirection> {
        if self.sensor_direction > 0 {
            Some(SensorDirection::Clockwise)
        } else if self.sensor_direction < 0 {
            Some(SensorDirection::CounterClockwise)
        } else {
            None
        }
    }
}

/// Position requested from the knob sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigIndex {
    /// A 0-based position
    Concrete(usize),
    /// Whatever the final element is at the time of the call
    Last,
}

impl ConfigIndex {
    /// Check if the element at `position` satisfies this request
    pub const fn matches(self, position: usize) -> bool {
        match self {
            ConfigIndex::Concrete(i) => i == position,
            ConfigIndex::Last => true,
        }
    }

    /// Check if this request names exactly `position`
    pub const fn is_exactly(self, position: usize) -> bool {
        matches!(self, ConfigIndex::Concrete(i) if i == position)
    }
}

impl From<usize> for ConfigIndex {
    fn from(index: usize) -> Self {
        ConfigIndex::Concrete(index)
    }
}

/// A record together with the concrete position it was found at
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Located {
    pub index: usize,
    pub config: KnobConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_truncates() {
        let long = "abcdefghijklmnopqrstuvwxyzabcdefghijklmnopqrstuvwxyz";
        let d = Descriptor::new(long);
        assert_eq!(d.as_str().len(), DESCRIPTOR_MAX_LEN);
        assert_eq!(d.as_str(), &long[..DESCRIPTOR_MAX_LEN]);
    }

    #[test]
    fn test_descriptor_truncates_on_char_boundary() {
        // 48 ASCII bytes followed by a 2 byte character straddling the limit
        let mut text: std::string::String = "a".repeat(48);
        text.push('é');
        let d = Descriptor::new(&text);
        assert_eq!(d.as_str().len(), 48);
    }

    #[test]
    fn test_descriptor_default() {
        assert_eq!(Descriptor::default(), "unknown");
        assert_eq!(KnobConfig::default().descriptor.as_str(), DEFAULT_DESCRIPTOR);
    }

    #[test]
    fn test_motor_direction() {
        let cw = MotorConfig::new(1.5, 7, SensorDirection::Clockwise);
        assert!(cw.is_calibrated());
        assert_eq!(cw.direction(), Some(SensorDirection::Clockwise));

        let ccw = MotorConfig::new(1.5, 7, SensorDirection::CounterClockwise);
        assert_eq!(ccw.sensor_direction, -1);
        assert_eq!(ccw.direction(), Some(SensorDirection::CounterClockwise));

        let unknown = MotorConfig::default();
        assert!(!unknown.is_calibrated());
        assert_eq!(unknown.direction(), None);
    }

    #[test]
    fn test_index_matching() {
        assert!(ConfigIndex::Concrete(3).matches(3));
        assert!(!ConfigIndex::Concrete(3).matches(2));
        assert!(ConfigIndex::Last.matches(0));
        assert!(ConfigIndex::Last.matches(99));

        assert!(ConfigIndex::Concrete(3).is_exactly(3));
        assert!(!ConfigIndex::Last.is_exactly(3));
        assert_eq!(ConfigIndex::from(4), ConfigIndex::Concrete(4));
    }
}

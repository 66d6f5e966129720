//! Trigger — an (intensity, text fragment) pair driving a device command.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::{IntensityError, TriggerError};

/// Vibration intensity as a whole percentage, `0..=100`.
///
/// Normalized to `[0.0, 1.0]` via [`level`](Self::level) before being sent
/// to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Intensity(u8);

impl Intensity {
    /// The strongest valid intensity (100%).
    pub const MAX: Self = Self(100);

    /// Validate and wrap a raw percentage.
    ///
    /// # Errors
    ///
    /// Returns [`IntensityError::OutOfRange`] when `value > 100`.
    pub fn new(value: u8) -> Result<Self, IntensityError> {
        if value > 100 {
            return Err(IntensityError::OutOfRange(i64::from(value)));
        }
        Ok(Self(value))
    }

    /// The raw percentage value.
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// The normalized vibration level in `[0.0, 1.0]`.
    #[must_use]
    pub fn level(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl TryFrom<u8> for Intensity {
    type Error = IntensityError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for Intensity {
    type Err = IntensityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: i64 = s.parse().map_err(|_| IntensityError::NotAnInteger)?;
        if !(0..=100).contains(&raw) {
            return Err(IntensityError::OutOfRange(raw));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(Self(raw as u8))
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A text trigger: when [`pattern`](Self::pattern) appears in an eligible
/// chat message, the device is driven at [`intensity`](Self::intensity).
///
/// Triggers are immutable once created.
///
/// Ordering, equality, and hashing all key on **intensity alone**: a set can
/// hold at most one trigger per intensity, whatever the pattern. `(50, "shh")`
/// and `(50, "also shh")` are duplicates of each other.
#[derive(Debug, Clone)]
pub struct Trigger {
    intensity: Intensity,
    pattern: String,
}

impl Trigger {
    /// Create a trigger, validating that the pattern is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`TriggerError::EmptyPattern`] when `pattern` is empty.
    pub fn new(intensity: Intensity, pattern: impl Into<String>) -> Result<Self, TriggerError> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(TriggerError::EmptyPattern);
        }
        Ok(Self { intensity, pattern })
    }

    /// The intensity sent to the device when this trigger fires.
    #[must_use]
    pub fn intensity(&self) -> Intensity {
        self.intensity
    }

    /// The text fragment this trigger scans for.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether this trigger's pattern appears in `message`.
    ///
    /// Plain case-sensitive containment — not tokenized, not a regex.
    #[must_use]
    pub fn matches(&self, message: &str) -> bool {
        message.contains(self.pattern.as_str())
    }

    /// Render the persisted form: `"<intensity> <pattern>"`.
    #[must_use]
    pub fn to_config_line(&self) -> String {
        format!("{} {}", self.intensity, self.pattern)
    }

    /// Parse one persisted line.
    ///
    /// Splits on the first space; the pattern is everything after it, to the
    /// end of the line. Returns `None` when the first token is not a valid
    /// intensity or no pattern follows — such lines are treated as
    /// non-trigger lines (e.g. a trailing blank), not as errors.
    #[must_use]
    pub fn parse_config_line(line: &str) -> Option<Self> {
        let (head, rest) = line.split_once(' ')?;
        let intensity: Intensity = head.parse().ok()?;
        Self::new(intensity, rest).ok()
    }
}

impl PartialEq for Trigger {
    fn eq(&self, other: &Self) -> bool {
        self.intensity == other.intensity
    }
}

impl Eq for Trigger {}

impl PartialOrd for Trigger {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Trigger {
    fn cmp(&self, other: &Self) -> Ordering {
        self.intensity.cmp(&other.intensity)
    }
}

impl Hash for Trigger {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.intensity.hash(state);
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Trigger(intensity: {}, text: '{}')", self.intensity, self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger(intensity: u8, pattern: &str) -> Trigger {
        Trigger::new(Intensity::new(intensity).unwrap(), pattern).unwrap()
    }

    #[test]
    fn should_accept_intensity_within_range() {
        assert_eq!(Intensity::new(0).unwrap().value(), 0);
        assert_eq!(Intensity::new(100).unwrap().value(), 100);
    }

    #[test]
    fn should_reject_intensity_above_hundred() {
        assert_eq!(Intensity::new(101), Err(IntensityError::OutOfRange(101)));
    }

    #[test]
    fn should_parse_intensity_from_str() {
        let i: Intensity = "75".parse().unwrap();
        assert_eq!(i.value(), 75);
    }

    #[test]
    fn should_reject_non_integer_intensity() {
        let result: Result<Intensity, _> = "high".parse();
        assert_eq!(result, Err(IntensityError::NotAnInteger));
    }

    #[test]
    fn should_reject_negative_intensity() {
        let result: Result<Intensity, _> = "-3".parse();
        assert_eq!(result, Err(IntensityError::OutOfRange(-3)));
    }

    #[test]
    fn should_normalize_intensity_to_unit_level() {
        assert!((trigger(75, "x").intensity().level() - 0.75).abs() < f64::EPSILON);
        assert!((Intensity::new(0).unwrap().level()).abs() < f64::EPSILON);
        assert!((Intensity::MAX.level() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_reject_empty_pattern() {
        let result = Trigger::new(Intensity::new(10).unwrap(), "");
        assert_eq!(result.unwrap_err(), TriggerError::EmptyPattern);
    }

    #[test]
    fn should_match_on_substring_containment() {
        let t = trigger(20, "slowly");
        assert!(t.matches("we go slowly now"));
        assert!(!t.matches("we go fast now"));
    }

    #[test]
    fn should_match_case_sensitively() {
        let t = trigger(20, "Slowly");
        assert!(!t.matches("we go slowly now"));
    }

    #[test]
    fn should_treat_equal_intensity_as_equal_regardless_of_pattern() {
        assert_eq!(trigger(50, "shh"), trigger(50, "also shh"));
        assert_ne!(trigger(50, "shh"), trigger(51, "shh"));
    }

    #[test]
    fn should_order_by_intensity_ascending() {
        let mut triggers = vec![trigger(75, "c"), trigger(0, "a"), trigger(20, "b")];
        triggers.sort();
        let values: Vec<u8> = triggers.iter().map(|t| t.intensity().value()).collect();
        assert_eq!(values, vec![0, 20, 75]);
    }

    #[test]
    fn should_render_config_line() {
        assert_eq!(trigger(75, "getting there").to_config_line(), "75 getting there");
    }

    #[test]
    fn should_render_display_form() {
        assert_eq!(
            trigger(20, "slowly").to_string(),
            "Trigger(intensity: 20, text: 'slowly')"
        );
    }

    #[test]
    fn should_parse_config_line_with_spaces_in_pattern() {
        let t = Trigger::parse_config_line("75 getting there").unwrap();
        assert_eq!(t.intensity().value(), 75);
        assert_eq!(t.pattern(), "getting there");
    }

    #[test]
    fn should_skip_line_without_integer_head() {
        assert!(Trigger::parse_config_line("hello world").is_none());
    }

    #[test]
    fn should_skip_line_without_pattern() {
        assert!(Trigger::parse_config_line("42").is_none());
        assert!(Trigger::parse_config_line("").is_none());
    }

    #[test]
    fn should_skip_line_with_out_of_range_intensity() {
        assert!(Trigger::parse_config_line("250 way too much").is_none());
    }

    #[test]
    fn should_roundtrip_through_config_line() {
        let t = trigger(100, "hey ;)");
        let parsed = Trigger::parse_config_line(&t.to_config_line()).unwrap();
        assert_eq!(parsed.intensity(), t.intensity());
        assert_eq!(parsed.pattern(), t.pattern());
    }
}

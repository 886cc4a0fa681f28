//! Human-facing temperature labels and shift classification.

use serde::{Deserialize, Serialize};

/// Behavioural archetype shown next to a temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureLabel {
    /// Below 25.
    PrincipledGuardian,
    /// 25 to 49.
    RigorousSkeptic,
    /// 50 to 74.
    PragmaticAdvocate,
    /// 75 and above.
    Visionary,
}

impl TemperatureLabel {
    pub fn for_temperature(temperature: u32) -> Self {
        match temperature {
            75.. => Self::Visionary,
            50..=74 => Self::PragmaticAdvocate,
            25..=49 => Self::RigorousSkeptic,
            _ => Self::PrincipledGuardian,
        }
    }
}

impl std::fmt::Display for TemperatureLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PrincipledGuardian => write!(f, "Principled Guardian"),
            Self::RigorousSkeptic => write!(f, "Rigorous Skeptic"),
            Self::PragmaticAdvocate => write!(f, "Pragmatic Advocate"),
            Self::Visionary => write!(f, "Visionary"),
        }
    }
}

/// How far a representative moved between two rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShiftMagnitude {
    Minor,
    /// More than 15 degrees.
    Notable,
    /// More than 30 degrees.
    Big,
}

impl ShiftMagnitude {
    pub fn between(old: u32, new: u32) -> Self {
        match old.abs_diff(new) {
            31.. => Self::Big,
            16..=30 => Self::Notable,
            _ => Self::Minor,
        }
    }

    /// Suffix appended to a reassignment line, empty for minor shifts.
    pub fn note(self) -> &'static str {
        match self {
            Self::Minor => "",
            Self::Notable => " (notable shift)",
            Self::Big => " *** BIG SHIFT ***",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_thresholds() {
        assert_eq!(TemperatureLabel::for_temperature(5), TemperatureLabel::PrincipledGuardian);
        assert_eq!(TemperatureLabel::for_temperature(24), TemperatureLabel::PrincipledGuardian);
        assert_eq!(TemperatureLabel::for_temperature(25), TemperatureLabel::RigorousSkeptic);
        assert_eq!(TemperatureLabel::for_temperature(49), TemperatureLabel::RigorousSkeptic);
        assert_eq!(TemperatureLabel::for_temperature(50), TemperatureLabel::PragmaticAdvocate);
        assert_eq!(TemperatureLabel::for_temperature(74), TemperatureLabel::PragmaticAdvocate);
        assert_eq!(TemperatureLabel::for_temperature(75), TemperatureLabel::Visionary);
        assert_eq!(TemperatureLabel::for_temperature(95), TemperatureLabel::Visionary);
    }

    #[test]
    fn test_label_display() {
        assert_eq!(TemperatureLabel::Visionary.to_string(), "Visionary");
        assert_eq!(
            TemperatureLabel::PragmaticAdvocate.to_string(),
            "Pragmatic Advocate"
        );
    }

    #[test]
    fn test_shift_thresholds() {
        assert_eq!(ShiftMagnitude::between(50, 65), ShiftMagnitude::Minor);
        assert_eq!(ShiftMagnitude::between(50, 66), ShiftMagnitude::Notable);
        assert_eq!(ShiftMagnitude::between(80, 50), ShiftMagnitude::Notable);
        assert_eq!(ShiftMagnitude::between(80, 49), ShiftMagnitude::Big);
        assert_eq!(ShiftMagnitude::Big.note(), " *** BIG SHIFT ***");
        assert_eq!(ShiftMagnitude::Minor.note(), "");
    }
}

//! Round-keyed schedules: convergence range and debate clock.
//!
//! Both are explicit ordered tables covering rounds 0 through
//! [`SCHEDULE_HORIZON`]. Rounds past the horizon (post-veto rounds) saturate
//! to a named final entry instead of extrapolating.

use serde::{Deserialize, Serialize};

/// Last round with its own table entry.
pub const SCHEDULE_HORIZON: u32 = 6;

/// Global temperature bounds; every schedule entry lies inside them.
pub const TEMPERATURE_FLOOR: u32 = 5;
pub const TEMPERATURE_CEILING: u32 = 95;

/// Inclusive temperature range fed to the stratified sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: u32,
    pub max: u32,
}

impl TemperatureRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Width of the range.
    pub fn width(&self) -> u32 {
        self.max - self.min
    }

    pub fn contains(&self, temperature: u32) -> bool {
        (self.min..=self.max).contains(&temperature)
    }
}

impl std::fmt::Display for TemperatureRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.min, self.max)
    }
}

/// Convergence table, indexed by round.
///
/// Rounds 0-1 get the full spectrum; the band then narrows toward the center
/// so later rounds push agents toward compromise.
pub const CONVERGENCE_TABLE: [TemperatureRange; 7] = [
    TemperatureRange::new(5, 95),  // drafting
    TemperatureRange::new(5, 95),  // max creative tension
    TemperatureRange::new(10, 90),
    TemperatureRange::new(15, 85),
    TemperatureRange::new(25, 75), // deal-making
    TemperatureRange::new(30, 70),
    TemperatureRange::new(35, 65), // max compromise pressure
];

/// Range used for every round past the horizon.
pub const CONVERGENCE_SATURATED: TemperatureRange = CONVERGENCE_TABLE[SCHEDULE_HORIZON as usize];

/// Temperature range for a round.
pub fn range_for_round(round: u32) -> TemperatureRange {
    CONVERGENCE_TABLE
        .get(round as usize)
        .copied()
        .unwrap_or(CONVERGENCE_SATURATED)
}

/// One debate clock table row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockEntry {
    /// Exchanges allowed per participant.
    pub exchange_multiplier: f64,
    /// Sentences allowed per response.
    pub response_budget: u32,
}

impl ClockEntry {
    pub const fn new(exchange_multiplier: f64, response_budget: u32) -> Self {
        Self {
            exchange_multiplier,
            response_budget,
        }
    }
}

/// Debate clock table, indexed by round.
pub const DEBATE_CLOCK_TABLE: [ClockEntry; 7] = [
    ClockEntry::new(2.0, 6),
    ClockEntry::new(2.0, 6),
    ClockEntry::new(2.0, 5),
    ClockEntry::new(1.5, 4),
    ClockEntry::new(1.5, 3),
    ClockEntry::new(1.0, 3),
    ClockEntry::new(1.0, 2),
];

/// Clock entry used for every round past the horizon.
pub const DEBATE_CLOCK_SATURATED: ClockEntry = DEBATE_CLOCK_TABLE[SCHEDULE_HORIZON as usize];

/// Interaction budget for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockBudget {
    pub max_exchanges: u32,
    pub response_budget: u32,
}

/// Debate clock for a round and participant count.
///
/// `max_exchanges = floor(participants * multiplier)`.
pub fn clock_for_round(round: u32, participants: usize) -> ClockBudget {
    let entry = DEBATE_CLOCK_TABLE
        .get(round as usize)
        .copied()
        .unwrap_or(DEBATE_CLOCK_SATURATED);

    let max_exchanges = (participants as f64 * entry.exchange_multiplier).floor() as u32;
    ClockBudget {
        max_exchanges,
        response_budget: entry.response_budget,
    }
}

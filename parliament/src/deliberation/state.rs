//! Session record and the round transitions applied to it.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::sampler::stratified_sample;
use super::schedule::{
    clock_for_round, range_for_round, ClockBudget, TemperatureRange, TEMPERATURE_CEILING,
    TEMPERATURE_FLOOR,
};
use crate::error::{ParliamentError, ParliamentResult};

/// Status written at creation. Later values belong to outside tooling.
pub const STATUS_SETUP: &str = "setup";

/// Default number of scheduled rounds.
pub const DEFAULT_MAX_ROUNDS: u32 = 6;

/// Round-scoped interaction budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateClock {
    #[serde(alias = "max_exchanges_per_round")]
    pub max_exchanges: u32,
    pub response_budget: u32,
    #[serde(default)]
    pub exchanges_this_round: u32,
}

impl From<ClockBudget> for DebateClock {
    fn from(budget: ClockBudget) -> Self {
        Self {
            max_exchanges: budget.max_exchanges,
            response_budget: budget.response_budget,
            exchanges_this_round: 0,
        }
    }
}

/// One temperature assignment in a representative's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemperatureEntry {
    pub round: u32,
    pub temperature: u32,
}

/// Caller-supplied description of one seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepresentativeSpec {
    pub name: String,
    #[serde(default)]
    pub motives: Vec<String>,
}

/// A seated representative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Representative {
    /// `rep_<k>`, 1-based, never reused.
    pub agent_id: String,
    pub name: String,
    pub temperature: u32,
    pub temperature_history: Vec<TemperatureEntry>,
    #[serde(default)]
    pub motives: Vec<String>,
    #[serde(default)]
    pub is_quiet: bool,
    #[serde(default)]
    pub quiet_until_round: Option<u32>,
    #[serde(default)]
    pub voting_record: Vec<Value>,
    /// Fields owned by other tooling, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Representative {
    fn seat(index: usize, spec: &RepresentativeSpec, temperature: u32) -> Self {
        Self {
            agent_id: agent_id_for_seat(index),
            name: spec.name.clone(),
            temperature,
            temperature_history: vec![TemperatureEntry {
                round: 0,
                temperature,
            }],
            motives: spec.motives.clone(),
            is_quiet: false,
            quiet_until_round: None,
            voting_record: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// Agent id for a 0-based seat index.
pub fn agent_id_for_seat(index: usize) -> String {
    format!("rep_{}", index + 1)
}

/// Generate a fresh parliament id: `parl-YYYYMMDD-xxxxxxxx`.
pub fn generate_parliament_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("parl-{}-{}", now.format("%Y%m%d"), &suffix[..8])
}

/// Inputs to session initialization.
#[derive(Debug, Clone)]
pub struct InitRequest {
    pub problem_statement: String,
    pub representatives: Vec<RepresentativeSpec>,
    pub constituent_issues: Vec<Value>,
    /// Seat count the caller asked for; the roster length wins on mismatch.
    pub requested_seats: Option<usize>,
    pub max_rounds: u32,
}

impl InitRequest {
    pub fn new(problem_statement: impl Into<String>, representatives: Vec<RepresentativeSpec>) -> Self {
        Self {
            problem_statement: problem_statement.into(),
            representatives,
            constituent_issues: Vec::new(),
            requested_seats: None,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    /// Constituent issues are stored as given; any JSON value is accepted.
    pub fn with_issues<I, V>(mut self, issues: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.constituent_issues = issues.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_requested_seats(mut self, seats: usize) -> Self {
        self.requested_seats = Some(seats);
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Mismatch between requested seats and supplied representatives.
    pub fn seat_mismatch(&self) -> Option<SeatMismatch> {
        let requested = self.requested_seats?;
        let supplied = self.representatives.len();
        (requested != supplied).then_some(SeatMismatch {
            requested,
            supplied,
        })
    }
}

/// Non-fatal warning: the supplied roster governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatMismatch {
    pub requested: usize,
    pub supplied: usize,
}

impl std::fmt::Display for SeatMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} representatives provided for {} seats. Using {} representatives.",
            self.supplied, self.requested, self.supplied
        )
    }
}

/// Temperature movement of one representative across a round advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemperatureChange {
    pub agent_id: String,
    pub name: String,
    pub old: u32,
    pub new: u32,
}

/// Result of a round advance.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundAdvance {
    pub round: u32,
    pub range: TemperatureRange,
    pub clock: DebateClock,
    pub changes: Vec<TemperatureChange>,
}

/// Singleton deliberation state.
///
/// `problem_statement`, `constituent_issues`, `max_rounds`, `bill_version`,
/// `drafter`, `status` and `vote_history` belong to the wider workflow and are
/// kept as raw JSON, so values written by other tooling load and survive a
/// transition unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(alias = "parliament_id")]
    pub id: String,
    #[serde(default)]
    pub problem_statement: Value,
    #[serde(default)]
    pub constituent_issues: Value,
    pub current_round: u32,
    #[serde(default = "default_max_rounds")]
    pub max_rounds: Value,
    #[serde(default)]
    pub bill_version: Value,
    #[serde(default)]
    pub drafter: Value,
    #[serde(default)]
    pub status: Value,
    pub next_message_id: u32,
    pub debate_clock: DebateClock,
    pub representatives: Vec<Representative>,
    #[serde(default)]
    pub vote_history: Value,
    /// Fields owned by other tooling, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_max_rounds() -> Value {
    Value::from(DEFAULT_MAX_ROUNDS)
}

impl Session {
    /// Build a round-0 session from a roster.
    ///
    /// Fails only on an empty roster. A seat-count mismatch is logged and the
    /// supplied roster is used.
    pub fn initialize<R: Rng + ?Sized>(rng: &mut R, request: &InitRequest) -> ParliamentResult<Self> {
        if request.representatives.is_empty() {
            return Err(ParliamentError::EmptyRoster);
        }
        if let Some(mismatch) = request.seat_mismatch() {
            warn!(
                requested = mismatch.requested,
                supplied = mismatch.supplied,
                "Seat count mismatch: {}",
                mismatch
            );
        }

        let seats = request.representatives.len();
        let range = range_for_round(0);
        let temperatures = stratified_sample(rng, seats, range.min, range.max);

        let representatives = request
            .representatives
            .iter()
            .zip(temperatures)
            .enumerate()
            .map(|(index, (spec, temperature))| Representative::seat(index, spec, temperature))
            .collect();

        let session = Self {
            id: generate_parliament_id(Utc::now()),
            problem_statement: Value::String(request.problem_statement.clone()),
            constituent_issues: Value::Array(request.constituent_issues.clone()),
            current_round: 0,
            max_rounds: Value::from(request.max_rounds),
            bill_version: Value::from(0),
            drafter: Value::Null,
            status: Value::from(STATUS_SETUP),
            next_message_id: 1,
            debate_clock: clock_for_round(0, seats).into(),
            representatives,
            vote_history: Value::Array(Vec::new()),
            extra: Map::new(),
        };

        info!(
            parliament_id = %session.id,
            participants = seats,
            range = %range,
            "Parliament initialized"
        );
        Ok(session)
    }

    /// Advance to the next round and draw fresh temperatures for every seat.
    ///
    /// Seats keep their order; each gets the draw in its slot. The debate
    /// clock is replaced wholesale. The message counter, ledger and identity
    /// fields are untouched.
    pub fn advance_round<R: Rng + ?Sized>(&mut self, rng: &mut R) -> RoundAdvance {
        let next_round = self.current_round + 1;
        let range = range_for_round(next_round);
        let seats = self.representatives.len();
        let clock: DebateClock = clock_for_round(next_round, seats).into();

        if let Some(max_rounds) = self.scheduled_rounds().filter(|&max| u64::from(next_round) > max) {
            warn!(
                round = next_round,
                max_rounds,
                "Advancing past scheduled rounds; schedules are saturated"
            );
        }

        let temperatures = stratified_sample(rng, seats, range.min, range.max);
        let changes = self
            .representatives
            .iter_mut()
            .zip(temperatures)
            .map(|(rep, temperature)| {
                let old = rep.temperature;
                rep.temperature = temperature;
                rep.temperature_history.push(TemperatureEntry {
                    round: next_round,
                    temperature,
                });
                debug!(agent_id = %rep.agent_id, old, new = temperature, "Temperature reassigned");
                TemperatureChange {
                    agent_id: rep.agent_id.clone(),
                    name: rep.name.clone(),
                    old,
                    new: temperature,
                }
            })
            .collect();

        self.debate_clock = clock;
        self.current_round = next_round;

        info!(
            parliament_id = %self.id,
            round = next_round,
            range = %range,
            max_exchanges = clock.max_exchanges,
            response_budget = clock.response_budget,
            "Round advanced"
        );

        RoundAdvance {
            round: next_round,
            range,
            clock,
            changes,
        }
    }

    /// Number of seats.
    pub fn seat_count(&self) -> usize {
        self.representatives.len()
    }

    /// Scheduled round count, when `max_rounds` holds a non-negative integer.
    pub fn scheduled_rounds(&self) -> Option<u64> {
        self.max_rounds.as_u64()
    }

    /// Whether the scheduled rounds are exhausted. Unknown when `max_rounds`
    /// is not an integer, which reads as not exhausted.
    pub fn past_schedule(&self) -> bool {
        self.scheduled_rounds()
            .is_some_and(|max| u64::from(self.current_round) >= max)
    }

    /// Check structural invariants; returns one line per violation.
    pub fn check_invariants(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.next_message_id == 0 {
            issues.push("next_message_id must be at least 1".to_string());
        }

        let expected_history = self.current_round as usize + 1;
        for (index, rep) in self.representatives.iter().enumerate() {
            let expected_id = agent_id_for_seat(index);
            if rep.agent_id != expected_id {
                issues.push(format!(
                    "seat {} has agent_id {} (expected {})",
                    index + 1,
                    rep.agent_id,
                    expected_id
                ));
            }
            if !(TEMPERATURE_FLOOR..=TEMPERATURE_CEILING).contains(&rep.temperature) {
                issues.push(format!(
                    "{} temperature {} outside [{}, {}]",
                    rep.agent_id, rep.temperature, TEMPERATURE_FLOOR, TEMPERATURE_CEILING
                ));
            }
            if rep.temperature_history.len() != expected_history {
                issues.push(format!(
                    "{} has {} history entries for round {} (expected {})",
                    rep.agent_id,
                    rep.temperature_history.len(),
                    self.current_round,
                    expected_history
                ));
            }
            if let Some(last) = rep.temperature_history.last() {
                if last.temperature != rep.temperature || last.round != self.current_round {
                    issues.push(format!(
                        "{} last history entry ({}, {}) does not match current ({}, {})",
                        rep.agent_id,
                        last.round,
                        last.temperature,
                        self.current_round,
                        rep.temperature
                    ));
                }
            }
        }

        issues
    }
}

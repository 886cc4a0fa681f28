//! Deliberation state machine
//!
//! Pure pieces of a parliament session: the stratified temperature sampler,
//! the round-keyed convergence and debate clock schedules, the session record
//! with its round transitions, and the append-only ledger.
//!
//! # Round flow
//!
//! ```text
//! initialize ──► round 0 ──append*──► advance ──► round 1 ──append*──► ... ──► round 6
//!   (5-95)                              (5-95)                                   (35-65)
//!                                                                                  │
//!                                                      post-veto rounds ◄──────────┘
//!                                                      (saturated: 35-65)
//! ```
//!
//! Randomness is always injected so callers can seed it.

pub mod ledger;
pub mod sampler;
pub mod schedule;
pub mod state;
pub mod temperature;

pub use ledger::{AppendedMessage, Ledger, Message, MessageId, MessagePayloads};
pub use sampler::{band_bounds, stratified_sample, Band};
pub use schedule::{
    clock_for_round, range_for_round, ClockBudget, TemperatureRange, SCHEDULE_HORIZON,
};
pub use state::{
    DebateClock, InitRequest, Representative, RepresentativeSpec, RoundAdvance, SeatMismatch,
    Session, TemperatureChange, TemperatureEntry,
};
pub use temperature::{ShiftMagnitude, TemperatureLabel};

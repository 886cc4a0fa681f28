//! Parliament Deliberation Library
//!
//! This library provides:
//! - Stratified temperature assignment across a seated roster
//! - Round-keyed convergence and debate clock schedules
//! - Durable session, ledger and bill records with atomic commits
//! - Divergence detection and repair between session and ledger
//!
//! # Transitions
//!
//! - [`transitions::initialize`]: seat a roster at round 0 and write all records
//! - [`transitions::append`]: add messages to the ledger with sequential ids
//! - [`transitions::reassign`]: advance one round and redraw temperatures
//! - [`transitions::reconcile`]: inspect and optionally repair the records
//!
//! # Usage
//!
//! ```bash
//! parliament init --working-dir ./p --num-seats 3 --problem "..." \
//!     --representatives '[{"name":"Ada","motives":["cost"]}, ...]'
//! parliament append --working-dir ./p --message '{"type":"SPEECH","from":"rep_1"}'
//! parliament reassign --session-file ./p/session.json
//! parliament reconcile --working-dir ./p --repair
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod bill;
pub mod config;
pub mod deliberation;
pub mod error;
pub mod reconcile;
pub mod store;
pub mod summary;
pub mod transitions;

pub use bill::Bill;
pub use config::ParliamentConfig;
pub use deliberation::{
    AppendedMessage, InitRequest, Ledger, MessagePayloads, RepresentativeSpec, RoundAdvance,
    Session,
};
pub use error::{ParliamentError, ParliamentResult};
pub use reconcile::{CounterRepair, IntegrityStatus, Remedy};
pub use store::{FileStore, MemoryStore, RecordKind, RecordStore};
pub use transitions::{InitOutcome, ReconcileReport};

//! Session/ledger divergence detection and repair.
//!
//! Session and ledger are written in one commit, ledger first. If a commit is
//! cut short between the two renames the ledger holds messages whose ids the
//! session counter never advanced past. Appending on top of that would reuse
//! ids, so appends refuse to run until the pair is repaired.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::deliberation::{Ledger, Session};

/// Integrity verdict for a session/ledger pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IntegrityStatus {
    /// Records agree.
    Valid,
    /// Minor drift that does not endanger id assignment.
    Recoverable { warnings: Vec<String> },
    /// Records disagree; appends must not proceed.
    Diverged {
        errors: Vec<String>,
        warnings: Vec<String>,
        remedy: Remedy,
    },
}

/// What it takes to bring a diverged pair back in line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Remedy {
    /// Only the session counter lags the ledger; [`repair`] fixes it.
    RepairCounter,
    /// Session and ledger belong to different parliaments, as after an
    /// interrupted `init --force`.
    Reinitialize,
    /// The ledger itself is inconsistent and needs correcting by hand.
    EditLedger,
}

impl std::fmt::Display for Remedy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RepairCounter => {
                write!(f, "Run `parliament reconcile --repair` to advance the session counter.")
            }
            Self::Reinitialize => write!(
                f,
                "Session and ledger belong to different parliaments. Run `parliament init --force` to start over."
            ),
            Self::EditLedger => write!(
                f,
                "The ledger is inconsistent and --repair cannot fix it. Correct ledger.json by hand."
            ),
        }
    }
}

impl IntegrityStatus {
    /// Whether an append may run on top of these records.
    pub fn can_append(&self) -> bool {
        matches!(self, Self::Valid | Self::Recoverable { .. })
    }

    /// How to recover, when the pair has diverged.
    pub fn remedy(&self) -> Option<Remedy> {
        match self {
            Self::Diverged { remedy, .. } => Some(*remedy),
            _ => None,
        }
    }

    pub fn errors(&self) -> &[String] {
        match self {
            Self::Diverged { errors, .. } => errors,
            _ => &[],
        }
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            Self::Valid => &[],
            Self::Recoverable { warnings } | Self::Diverged { warnings, .. } => warnings,
        }
    }
}

impl std::fmt::Display for IntegrityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::Recoverable { warnings } => write!(f, "recoverable ({} warnings)", warnings.len()),
            Self::Diverged { errors, .. } => write!(f, "diverged ({} errors)", errors.len()),
        }
    }
}

/// Compare a session with its ledger.
pub fn inspect(session: &Session, ledger: &Ledger) -> IntegrityStatus {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    let id_mismatch = session.id != ledger.id;
    if id_mismatch {
        errors.push(format!(
            "session id {} does not match ledger id {}",
            session.id, ledger.id
        ));
    }

    let mut seen: HashSet<u32> = HashSet::new();
    let mut previous: Option<(u32, u32)> = None;
    for message in &ledger.messages {
        let Some(number) = message.number() else {
            errors.push(format!("malformed message id {:?}", message.id));
            continue;
        };
        if !seen.insert(number) {
            errors.push(format!("duplicate message id {}", message.id));
        }
        if message.round > session.current_round {
            errors.push(format!(
                "{} is stamped round {} but session is at round {}",
                message.id, message.round, session.current_round
            ));
        }
        if let Some((prev_number, prev_round)) = previous {
            if prev_number.checked_add(1) != Some(number) {
                errors.push(format!(
                    "{} does not follow msg number {} contiguously",
                    message.id, prev_number
                ));
            }
            if message.round < prev_round {
                errors.push(format!(
                    "{} has round {} after a round {} message",
                    message.id, message.round, prev_round
                ));
            }
        }
        previous = Some((number, message.round));
    }

    // Everything so far needs a human; only a lagging counter is repairable.
    let ledger_errors = errors.len() - usize::from(id_mismatch);

    let mut counter_ahead = false;
    match ledger.highest_message_number() {
        Some(u32::MAX) => errors.push(format!(
            "ledger holds message number {} which leaves no id for the next message",
            u32::MAX
        )),
        Some(highest) if highest >= session.next_message_id => {
            counter_ahead = true;
            errors.push(format!(
                "ledger holds message number {} but session next_message_id is {}",
                highest, session.next_message_id
            ));
        }
        Some(highest) if session.next_message_id - highest > 1 => warnings.push(format!(
            "session next_message_id {} skips past highest ledger message {}",
            session.next_message_id, highest
        )),
        None if session.next_message_id > 1 => warnings.push(format!(
            "ledger is empty but session next_message_id is {}",
            session.next_message_id
        )),
        _ => {}
    }

    warnings.extend(session.check_invariants());

    if errors.is_empty() {
        return if warnings.is_empty() {
            IntegrityStatus::Valid
        } else {
            IntegrityStatus::Recoverable { warnings }
        };
    }

    let remedy = if id_mismatch {
        Remedy::Reinitialize
    } else if ledger_errors == 0 && counter_ahead {
        Remedy::RepairCounter
    } else {
        Remedy::EditLedger
    };
    IntegrityStatus::Diverged {
        errors,
        warnings,
        remedy,
    }
}

/// Counter repair applied to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterRepair {
    pub from: u32,
    pub to: u32,
}

/// Move the session counter past the highest ledger id when the ledger is
/// ahead. The ledger itself is never rewritten.
pub fn repair(session: &mut Session, ledger: &Ledger) -> Option<CounterRepair> {
    let highest = ledger.highest_message_number()?;
    if highest < session.next_message_id {
        return None;
    }
    let Some(to) = highest.checked_add(1) else {
        warn!(highest, "Highest ledger id is at the counter limit; cannot repair");
        return None;
    };

    let fix = CounterRepair {
        from: session.next_message_id,
        to,
    };
    session.next_message_id = fix.to;
    info!(
        parliament_id = %session.id,
        from = fix.from,
        to = fix.to,
        "Repaired next_message_id"
    );
    Some(fix)
}

/// Log the warnings of a pair that is still safe to append to.
pub(crate) fn log_warnings(status: &IntegrityStatus) {
    for warning in status.warnings() {
        warn!("Integrity warning: {}", warning);
    }
}

//! Store-level transitions
//!
//! Each transition holds the store's write lock for its whole
//! load-compute-commit cycle. All validation happens before the commit is
//! staged, so a failed transition leaves the records untouched.

use std::path::PathBuf;

use chrono::Utc;
use rand::Rng;
use tracing::{debug, info};

use crate::bill::Bill;
use crate::deliberation::{
    AppendedMessage, InitRequest, Ledger, MessagePayloads, RoundAdvance, SeatMismatch, Session,
};
use crate::error::{ParliamentError, ParliamentResult};
use crate::reconcile::{self, CounterRepair, IntegrityStatus, Remedy};
use crate::store::{Commit, RecordKind, RecordStore};

/// Result of [`initialize`].
#[derive(Debug, Clone)]
pub struct InitOutcome {
    pub session: Session,
    pub seat_mismatch: Option<SeatMismatch>,
    /// Record locations in the order they were written
    pub written: Vec<PathBuf>,
}

/// Result of [`reconcile`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileReport {
    pub parliament_id: String,
    /// Verdict before any repair
    pub status: IntegrityStatus,
    pub repair: Option<CounterRepair>,
    /// Verdict after repair, when one was applied
    pub repaired_status: Option<IntegrityStatus>,
}

/// Create a fresh parliament: bill, ledger and session, written in that order.
///
/// Refuses to replace an existing session unless `force` is set.
pub fn initialize<S, R>(
    store: &mut S,
    rng: &mut R,
    request: &InitRequest,
    force: bool,
) -> ParliamentResult<InitOutcome>
where
    S: RecordStore,
    R: Rng + ?Sized,
{
    let _guard = store.lock()?;

    if store.exists(RecordKind::Session)? {
        let path = store.location(RecordKind::Session);
        if !force {
            return Err(ParliamentError::AlreadyInitialized { path });
        }
        info!(path = %path.display(), "Overwriting existing parliament");
    }

    let session = Session::initialize(rng, request)?;
    let ledger = Ledger::for_session(&session);

    let commit = Commit::new()
        .stage(&Bill::empty())?
        .stage(&ledger)?
        .stage(&session)?;
    let written = commit
        .kinds()
        .into_iter()
        .map(|kind| store.location(kind))
        .collect();
    store.commit(commit)?;

    Ok(InitOutcome {
        session,
        seat_mismatch: request.seat_mismatch(),
        written,
    })
}

/// Append message payloads to the ledger and advance the session counter.
///
/// Refuses to run when the ledger has diverged from the session. An empty
/// payload list writes nothing.
pub fn append<S>(store: &mut S, payloads: MessagePayloads) -> ParliamentResult<Vec<AppendedMessage>>
where
    S: RecordStore,
{
    let _guard = store.lock()?;

    let mut session: Session = store.load()?;
    let mut ledger: Ledger = store.load()?;

    let status = reconcile::inspect(&session, &ledger);
    if let Some(remedy) = status.remedy() {
        return Err(ParliamentError::Diverged {
            details: status.errors().join("; "),
            remedy,
        });
    }
    reconcile::log_warnings(&status);

    if payloads.is_empty() {
        info!(parliament_id = %session.id, "No messages to append");
        return Ok(Vec::new());
    }

    let headroom = u32::try_from(payloads.len())
        .ok()
        .and_then(|count| session.next_message_id.checked_add(count));
    if headroom.is_none() {
        return Err(ParliamentError::IdsExhausted {
            next: session.next_message_id,
            requested: payloads.len(),
        });
    }

    let appended = ledger.append(&mut session, payloads, Utc::now());

    // Ledger first: the session file marks the commit.
    let commit = Commit::new().stage(&ledger)?.stage(&session)?;
    store.commit(commit)?;
    Ok(appended)
}

/// Advance the session one round with fresh temperatures. Only the session
/// record is written.
pub fn reassign<S, R>(store: &mut S, rng: &mut R) -> ParliamentResult<RoundAdvance>
where
    S: RecordStore,
    R: Rng + ?Sized,
{
    let _guard = store.lock()?;

    let mut session: Session = store.load()?;
    let advance = session.advance_round(rng);
    store.commit(Commit::new().stage(&session)?)?;
    Ok(advance)
}

/// Inspect the session/ledger pair and optionally repair the session counter.
pub fn reconcile<S>(store: &mut S, repair: bool) -> ParliamentResult<ReconcileReport>
where
    S: RecordStore,
{
    let _guard = store.lock()?;

    let mut session: Session = store.load()?;
    let ledger: Ledger = store.load()?;

    let status = reconcile::inspect(&session, &ledger);
    debug!(parliament_id = %session.id, status = %status, "Inspected records");

    let mut report = ReconcileReport {
        parliament_id: session.id.clone(),
        status,
        repair: None,
        repaired_status: None,
    };

    // Counter repair only helps when the counter is all that is wrong.
    if repair && report.status.remedy() == Some(Remedy::RepairCounter) {
        if let Some(fix) = reconcile::repair(&mut session, &ledger) {
            store.commit(Commit::new().stage(&session)?)?;
            report.repair = Some(fix);
            report.repaired_status = Some(reconcile::inspect(&session, &ledger));
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deliberation::RepresentativeSpec;
    use crate::store::MemoryStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn request(seats: usize) -> InitRequest {
        let reps = (1..=seats)
            .map(|i| RepresentativeSpec {
                name: format!("Member {}", i),
                motives: vec!["cost".to_string()],
            })
            .collect();
        InitRequest::new("Fund the library?", reps).with_requested_seats(seats)
    }

    fn initialized(seats: usize) -> (MemoryStore, StdRng) {
        let mut store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(11);
        initialize(&mut store, &mut rng, &request(seats), false).unwrap();
        (store, rng)
    }

    #[test]
    fn test_initialize_writes_all_records() {
        let mut store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = initialize(&mut store, &mut rng, &request(4), false).unwrap();

        assert_eq!(
            outcome.written,
            vec![
                PathBuf::from("memory/bill.json"),
                PathBuf::from("memory/ledger.json"),
                PathBuf::from("memory/session.json"),
            ]
        );
        assert!(outcome.seat_mismatch.is_none());

        let session: Session = store.load().unwrap();
        assert_eq!(session, outcome.session);
        let ledger: Ledger = store.load().unwrap();
        assert_eq!(ledger.id, session.id);
        assert!(ledger.messages.is_empty());
        assert_eq!(store.load::<Bill>().unwrap(), Bill::empty());
    }

    #[test]
    fn test_initialize_refuses_overwrite() {
        let (mut store, mut rng) = initialized(2);
        let err = initialize(&mut store, &mut rng, &request(2), false).unwrap_err();
        assert!(matches!(err, ParliamentError::AlreadyInitialized { .. }));

        let before: Session = store.load().unwrap();
        let outcome = initialize(&mut store, &mut rng, &request(3), true).unwrap();
        assert_ne!(outcome.session.id, before.id);
        assert_eq!(store.load::<Session>().unwrap().seat_count(), 3);
    }

    #[test]
    fn test_initialize_reports_seat_mismatch() {
        let mut store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(3);
        let req = request(2).with_requested_seats(5);
        let outcome = initialize(&mut store, &mut rng, &req, false).unwrap();
        assert_eq!(
            outcome.seat_mismatch,
            Some(SeatMismatch {
                requested: 5,
                supplied: 2
            })
        );
        assert_eq!(outcome.session.seat_count(), 2);
    }

    #[test]
    fn test_initialize_empty_roster_writes_nothing() {
        let mut store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(3);
        let err = initialize(&mut store, &mut rng, &request(0), false).unwrap_err();
        assert!(matches!(err, ParliamentError::EmptyRoster));
        assert!(store.raw(RecordKind::Bill).is_none());
        assert!(store.raw(RecordKind::Session).is_none());
    }

    #[test]
    fn test_append_assigns_sequential_ids() {
        let (mut store, _) = initialized(3);

        let first = append(
            &mut store,
            MessagePayloads::parse(r#"[{"type":"SPEECH","from":"rep_1"},{"type":"SPEECH"}]"#).unwrap(),
        )
        .unwrap();
        let second = append(
            &mut store,
            MessagePayloads::parse(r#"{"type":"VOTE"}"#).unwrap(),
        )
        .unwrap();

        let ids: Vec<_> = first.iter().chain(&second).map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["msg-001", "msg-002", "msg-003"]);
        assert_eq!(second[0].kind, "VOTE");

        let session: Session = store.load().unwrap();
        assert_eq!(session.next_message_id, 4);
        let ledger: Ledger = store.load().unwrap();
        assert_eq!(ledger.messages.len(), 3);
    }

    #[test]
    fn test_append_empty_writes_nothing() {
        let (mut store, _) = initialized(2);
        let before = store.raw(RecordKind::Session).map(str::to_string);
        let appended = append(&mut store, MessagePayloads::parse("[]").unwrap()).unwrap();
        assert!(appended.is_empty());
        assert_eq!(store.raw(RecordKind::Session).map(str::to_string), before);
    }

    #[test]
    fn test_append_requires_records() {
        let mut store = MemoryStore::new();
        let err = append(&mut store, MessagePayloads::parse("{}").unwrap()).unwrap_err();
        assert!(matches!(
            err,
            ParliamentError::MissingRecord {
                kind: RecordKind::Session,
                ..
            }
        ));
    }

    #[test]
    fn test_interrupted_append_blocks_until_repaired() {
        let (mut store, _) = initialized(2);
        append(&mut store, MessagePayloads::parse(r#"{"type":"A"}"#).unwrap()).unwrap();

        // Ledger lands, session does not.
        store.interrupt_after(1);
        let err = append(&mut store, MessagePayloads::parse(r#"[{"type":"B"},{"type":"C"}]"#).unwrap())
            .unwrap_err();
        assert!(matches!(err, ParliamentError::Io(_)));

        let err = append(&mut store, MessagePayloads::parse(r#"{"type":"D"}"#).unwrap()).unwrap_err();
        assert_eq!(err.code(), "DIVERGED");

        let report = reconcile(&mut store, false).unwrap();
        assert!(!report.status.can_append());
        assert!(report.repair.is_none());

        let report = reconcile(&mut store, true).unwrap();
        assert_eq!(report.repair, Some(CounterRepair { from: 2, to: 4 }));
        assert_eq!(report.repaired_status, Some(IntegrityStatus::Valid));

        let appended =
            append(&mut store, MessagePayloads::parse(r#"{"type":"D"}"#).unwrap()).unwrap();
        assert_eq!(appended[0].id, "msg-004");
    }

    #[test]
    fn test_reassign_advances_session_only() {
        let (mut store, mut rng) = initialized(4);
        let ledger_before = store.raw(RecordKind::Ledger).map(str::to_string);

        let advance = reassign(&mut store, &mut rng).unwrap();
        assert_eq!(advance.round, 1);
        assert_eq!(advance.changes.len(), 4);

        let session: Session = store.load().unwrap();
        assert_eq!(session.current_round, 1);
        assert_eq!(session.next_message_id, 1);
        assert!(session
            .representatives
            .iter()
            .all(|r| r.temperature_history.len() == 2));
        assert_eq!(store.raw(RecordKind::Ledger).map(str::to_string), ledger_before);
    }

    #[test]
    fn test_interrupted_reinit_points_to_init_not_repair() {
        let (mut store, mut rng) = initialized(2);
        append(&mut store, MessagePayloads::parse(r#"[{"type":"A"},{"type":"B"}]"#).unwrap())
            .unwrap();

        // Fresh bill and ledger land, the old session stays.
        store.interrupt_after(2);
        let err = initialize(&mut store, &mut rng, &request(2), true).unwrap_err();
        assert!(matches!(err, ParliamentError::Io(_)));

        let err = append(&mut store, MessagePayloads::parse(r#"{"type":"C"}"#).unwrap()).unwrap_err();
        match &err {
            ParliamentError::Diverged { remedy, .. } => assert_eq!(*remedy, Remedy::Reinitialize),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("init --force"));
        assert!(!err.to_string().contains("reconcile --repair"));

        let session_before = store.raw(RecordKind::Session).map(str::to_string);
        let report = reconcile(&mut store, true).unwrap();
        assert_eq!(report.status.remedy(), Some(Remedy::Reinitialize));
        assert!(report.repair.is_none());
        assert_eq!(store.raw(RecordKind::Session).map(str::to_string), session_before);

        initialize(&mut store, &mut rng, &request(2), true).unwrap();
        assert_eq!(reconcile(&mut store, false).unwrap().status, IntegrityStatus::Valid);
    }

    #[test]
    fn test_append_refuses_when_ids_run_out() {
        let (mut store, _) = initialized(2);
        let mut session: Session = store.load().unwrap();
        session.next_message_id = u32::MAX - 1;
        store.put_raw(RecordKind::Session, crate::store::encode(&session).unwrap());
        let ledger_before = store.raw(RecordKind::Ledger).map(str::to_string);

        let err = append(&mut store, MessagePayloads::parse(r#"[{"type":"A"},{"type":"B"}]"#).unwrap())
            .unwrap_err();
        assert_eq!(err.code(), "IDS_EXHAUSTED");
        assert_eq!(store.raw(RecordKind::Ledger).map(str::to_string), ledger_before);

        let appended =
            append(&mut store, MessagePayloads::parse(r#"{"type":"A"}"#).unwrap()).unwrap();
        assert_eq!(appended[0].id, format!("msg-{}", u32::MAX - 1));
        let session: Session = store.load().unwrap();
        assert_eq!(session.next_message_id, u32::MAX);
    }

    #[test]
    fn test_reconcile_clean_pair() {
        let (mut store, _) = initialized(2);
        let report = reconcile(&mut store, true).unwrap();
        assert_eq!(report.status, IntegrityStatus::Valid);
        assert!(report.repair.is_none());
        assert!(report.repaired_status.is_none());
    }
}

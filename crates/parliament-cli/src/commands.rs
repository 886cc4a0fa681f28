//! Command handlers. Each returns the summary printed on stdout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use parliament::deliberation::RepresentativeSpec;
use parliament::summary::{AppendSummary, InitSummary, ReassignSummary, ReconcileSummary};
use parliament::{
    transitions, FileStore, InitRequest, MessagePayloads, ParliamentConfig, ParliamentError,
    RecordKind, RecordStore,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cli::{AppendArgs, Command, InitArgs, ReassignArgs, ReconcileArgs};

pub fn run(command: Command, config: &ParliamentConfig) -> Result<String> {
    match command {
        Command::Init(args) => init(args, config),
        Command::Append(args) => append(args, config),
        Command::Reassign(args) => reassign(args, config),
        Command::Reconcile(args) => reconcile(args, config),
    }
}

fn working_dir(flag: Option<PathBuf>, config: &ParliamentConfig) -> PathBuf {
    flag.unwrap_or_else(|| config.working_dir.clone())
}

fn parse_issues(raw: &str) -> Vec<Value> {
    match serde_json::from_str(raw) {
        Ok(Value::Array(issues)) => issues,
        Ok(other) => {
            warn!(found = %other, "Ignoring --issues that is not a JSON array; using an empty list");
            Vec::new()
        }
        Err(e) => {
            warn!(error = %e, "Ignoring unparsable --issues; using an empty list");
            Vec::new()
        }
    }
}

fn init(args: InitArgs, config: &ParliamentConfig) -> Result<String> {
    let representatives: Vec<RepresentativeSpec> = serde_json::from_str(&args.representatives)
        .map_err(|e| ParliamentError::malformed("representatives JSON", e.to_string()))
        .context("Error parsing --representatives")?;

    let request = InitRequest::new(args.problem, representatives)
        .with_issues(parse_issues(&args.issues))
        .with_requested_seats(args.num_seats)
        .with_max_rounds(args.max_rounds.unwrap_or(config.max_rounds));

    let dir = working_dir(args.working_dir, config);
    let mut store = FileStore::in_dir(&dir);
    let mut rng = config.clone().with_seed(args.seed).rng();

    let outcome = transitions::initialize(&mut store, &mut rng, &request, args.force)
        .with_context(|| format!("Failed to initialize parliament in {}", dir.display()))?;
    Ok(InitSummary::from(&outcome).to_string())
}

fn append(args: AppendArgs, config: &ParliamentConfig) -> Result<String> {
    let payloads = MessagePayloads::parse(&args.message).context("Error parsing --message")?;
    debug!(count = payloads.len(), "Parsed message payloads");

    let dir = working_dir(args.working_dir, config);
    let mut store = FileStore::in_dir(&dir);
    let appended = transitions::append(&mut store, payloads)
        .with_context(|| format!("Failed to append to ledger in {}", dir.display()))?;
    Ok(AppendSummary { appended }.to_string())
}

fn reassign(args: ReassignArgs, config: &ParliamentConfig) -> Result<String> {
    let mut store = match args.session_file {
        Some(path) => FileStore::for_session_file(path),
        None => FileStore::in_dir(&config.working_dir),
    };
    let session_file = store.location(RecordKind::Session);
    let mut rng = config.clone().with_seed(args.seed).rng();

    let advance = transitions::reassign(&mut store, &mut rng)
        .with_context(|| format!("Failed to reassign temperatures in {}", session_file.display()))?;
    Ok(ReassignSummary::new(session_file, &advance).to_string())
}

fn reconcile(args: ReconcileArgs, config: &ParliamentConfig) -> Result<String> {
    let dir = working_dir(args.working_dir, config);
    let mut store = FileStore::in_dir(&dir);
    let report = transitions::reconcile(&mut store, args.repair)
        .with_context(|| format!("Failed to reconcile records in {}", dir.display()))?;
    Ok(ReconcileSummary { report }.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parliament::{Ledger, Session};
    use std::path::Path;
    use tempfile::tempdir;

    fn config(dir: &Path) -> ParliamentConfig {
        ParliamentConfig {
            working_dir: dir.to_path_buf(),
            max_rounds: 6,
            seed: Some(17),
        }
    }

    fn init_args(representatives: &str) -> InitArgs {
        InitArgs {
            working_dir: None,
            num_seats: 3,
            problem: "Should the town build a second bridge?".to_string(),
            representatives: representatives.to_string(),
            issues: r#"["traffic","cost"]"#.to_string(),
            max_rounds: None,
            seed: None,
            force: false,
        }
    }

    const ROSTER: &str = r#"[
        {"name":"Ada","motives":["safety"]},
        {"name":"Bo","motives":["budget","jobs"]},
        {"name":"Cy","motives":[]}
    ]"#;

    #[test]
    fn test_init_then_append_then_reassign() {
        let dir = tempdir().unwrap();
        let cfg = config(dir.path());

        let out = run(Command::Init(init_args(ROSTER)), &cfg).unwrap();
        assert!(out.contains("Roster (3 seats):"));
        assert!(out.contains("  Bo (rep_2)"));
        assert!(out.contains("    Motives: budget, jobs"));
        assert!(out.ends_with("Parliament is ready for session."));

        let out = run(
            Command::Append(AppendArgs {
                working_dir: None,
                message: r#"[{"type":"OPENING_STATEMENT"},{"from":"rep_1"}]"#.to_string(),
            }),
            &cfg,
        )
        .unwrap();
        assert_eq!(out, "Appended msg-001 (OPENING_STATEMENT)\nAppended msg-002 (unknown)");

        let out = run(
            Command::Reassign(ReassignArgs {
                session_file: Some(dir.path().join("session.json")),
                seed: None,
            }),
            &cfg,
        )
        .unwrap();
        assert!(out.starts_with("Reassigning temperatures for Round 1\nRange: 5 - 95"));

        let store = FileStore::in_dir(dir.path());
        let session: Session = store.load().unwrap();
        assert_eq!(session.current_round, 1);
        assert_eq!(session.next_message_id, 3);
        assert_eq!(session.constituent_issues, serde_json::json!(["traffic", "cost"]));
        let ledger: Ledger = store.load().unwrap();
        assert_eq!(ledger.messages.len(), 2);
    }

    #[test]
    fn test_init_rejects_bad_representatives() {
        let dir = tempdir().unwrap();
        let err = run(Command::Init(init_args("[{not json")), &config(dir.path())).unwrap_err();
        assert!(format!("{:#}", err).contains("Malformed representatives JSON"));
        assert!(!dir.path().join("session.json").exists());
    }

    #[test]
    fn test_bad_issues_fall_back_to_empty() {
        assert!(parse_issues("{oops").is_empty());
        assert!(parse_issues(r#"{"a":1}"#).is_empty());
        assert_eq!(parse_issues(r#"["a"]"#), [Value::from("a")]);
    }

    #[test]
    fn test_issues_keep_any_json_elements() {
        let issues = parse_issues(r#"["zoning",{"text":"noise","weight":2},3]"#);
        assert_eq!(
            issues,
            [
                Value::from("zoning"),
                serde_json::json!({"text": "noise", "weight": 2}),
                Value::from(3),
            ]
        );
    }

    #[test]
    fn test_append_without_session_fails() {
        let dir = tempdir().unwrap();
        let err = run(
            Command::Append(AppendArgs {
                working_dir: None,
                message: "{}".to_string(),
            }),
            &config(dir.path()),
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("session record not found"));
    }

    #[test]
    fn test_reconcile_reports_clean_records() {
        let dir = tempdir().unwrap();
        let cfg = config(dir.path());
        run(Command::Init(init_args(ROSTER)), &cfg).unwrap();

        let out = run(
            Command::Reconcile(ReconcileArgs {
                working_dir: None,
                repair: false,
            }),
            &cfg,
        )
        .unwrap();
        assert!(out.contains(": valid"));
        assert!(out.ends_with("No repair needed."));
    }
}

//! Human-readable transition summaries
//!
//! These print a digest of what changed, never the full records.

use std::fmt;
use std::path::PathBuf;

use crate::deliberation::{AppendedMessage, RoundAdvance, ShiftMagnitude, TemperatureLabel};
use crate::reconcile::Remedy;
use crate::transitions::{InitOutcome, ReconcileReport};

const RULE_WIDTH: usize = 60;
const PROBLEM_PREVIEW_CHARS: usize = 80;

fn rule(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{}", "=".repeat(RULE_WIDTH))
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(PROBLEM_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// One roster line in [`InitSummary`].
#[derive(Debug, Clone)]
pub struct SeatLine {
    pub agent_id: String,
    pub name: String,
    pub temperature: u32,
    pub label: TemperatureLabel,
    pub motives: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct InitSummary {
    pub created: Vec<PathBuf>,
    pub parliament_id: String,
    pub problem: String,
    pub seats: Vec<SeatLine>,
}

impl From<&InitOutcome> for InitSummary {
    fn from(outcome: &InitOutcome) -> Self {
        let session = &outcome.session;
        Self {
            created: outcome.written.clone(),
            parliament_id: session.id.clone(),
            problem: match &session.problem_statement {
                serde_json::Value::String(text) => text.clone(),
                other => other.to_string(),
            },
            seats: session
                .representatives
                .iter()
                .map(|rep| SeatLine {
                    agent_id: rep.agent_id.clone(),
                    name: rep.name.clone(),
                    temperature: rep.temperature,
                    label: TemperatureLabel::for_temperature(rep.temperature),
                    motives: rep.motives.clone(),
                })
                .collect(),
        }
    }
}

impl fmt::Display for InitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for path in &self.created {
            writeln!(f, "Created: {}", path.display())?;
        }
        writeln!(f)?;
        rule(f)?;
        writeln!(f, "Parliament {} initialized", self.parliament_id)?;
        writeln!(f, "Problem: {}", preview(&self.problem))?;
        writeln!(f, "Assignment: stratified across {} bands", self.seats.len())?;
        rule(f)?;
        writeln!(f)?;
        writeln!(f, "Roster ({} seats):", self.seats.len())?;
        writeln!(f)?;
        for seat in &self.seats {
            writeln!(f, "  {} ({})", seat.name, seat.agent_id)?;
            writeln!(f, "    Temperature: {} ({})", seat.temperature, seat.label)?;
            writeln!(f, "    Motives: {}", seat.motives.join(", "))?;
            writeln!(f)?;
        }
        write!(f, "Parliament is ready for session.")
    }
}

#[derive(Debug, Clone)]
pub struct ReassignSummary {
    pub session_file: PathBuf,
    pub advance: RoundAdvanceView,
}

/// Flattened view of a [`RoundAdvance`].
#[derive(Debug, Clone)]
pub struct RoundAdvanceView {
    pub round: u32,
    pub min: u32,
    pub max: u32,
    pub max_exchanges: u32,
    pub response_budget: u32,
    pub shifts: Vec<ShiftLine>,
}

#[derive(Debug, Clone)]
pub struct ShiftLine {
    pub name: String,
    pub old: u32,
    pub new: u32,
    pub magnitude: ShiftMagnitude,
}

impl ReassignSummary {
    pub fn new(session_file: impl Into<PathBuf>, advance: &RoundAdvance) -> Self {
        Self {
            session_file: session_file.into(),
            advance: RoundAdvanceView {
                round: advance.round,
                min: advance.range.min,
                max: advance.range.max,
                max_exchanges: advance.clock.max_exchanges,
                response_budget: advance.clock.response_budget,
                shifts: advance
                    .changes
                    .iter()
                    .map(|change| ShiftLine {
                        name: change.name.clone(),
                        old: change.old,
                        new: change.new,
                        magnitude: ShiftMagnitude::between(change.old, change.new),
                    })
                    .collect(),
            },
        }
    }
}

impl fmt::Display for ReassignSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = &self.advance;
        writeln!(f, "Reassigning temperatures for Round {}", a.round)?;
        writeln!(f, "Range: {} - {} (convergence pressure)", a.min, a.max)?;
        writeln!(f, "Assignment: stratified across {} bands", a.shifts.len())?;
        writeln!(
            f,
            "Debate clock: {} exchanges, {} sentences/response",
            a.max_exchanges, a.response_budget
        )?;
        rule(f)?;
        writeln!(f)?;
        for shift in &a.shifts {
            writeln!(f, "  {}:", shift.name)?;
            writeln!(
                f,
                "    {} ({}) -> {} ({}){}",
                shift.old,
                TemperatureLabel::for_temperature(shift.old),
                shift.new,
                TemperatureLabel::for_temperature(shift.new),
                shift.magnitude.note()
            )?;
            writeln!(f)?;
        }
        write!(f, "Updated: {}", self.session_file.display())
    }
}

#[derive(Debug, Clone)]
pub struct AppendSummary {
    pub appended: Vec<AppendedMessage>,
}

impl fmt::Display for AppendSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.appended.is_empty() {
            return write!(f, "No messages appended");
        }
        let lines: Vec<String> = self
            .appended
            .iter()
            .map(|m| format!("Appended {} ({})", m.id, m.kind))
            .collect();
        write!(f, "{}", lines.join("\n"))
    }
}

#[derive(Debug, Clone)]
pub struct ReconcileSummary {
    pub report: ReconcileReport,
}

impl fmt::Display for ReconcileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = &self.report;
        writeln!(f, "Parliament {}: {}", report.parliament_id, report.status)?;
        for error in report.status.errors() {
            writeln!(f, "  error: {}", error)?;
        }
        for warning in report.status.warnings() {
            writeln!(f, "  warning: {}", warning)?;
        }
        match (&report.repair, &report.repaired_status) {
            (Some(fix), Some(after)) => write!(
                f,
                "Repaired next_message_id {} -> {}; now {}",
                fix.from, fix.to, after
            ),
            _ => match report.status.remedy() {
                Some(Remedy::RepairCounter) => {
                    write!(f, "Run with --repair to advance the session counter.")
                }
                Some(remedy) => write!(f, "{}", remedy),
                None => write!(f, "No repair needed."),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deliberation::{DebateClock, TemperatureChange, TemperatureRange};
    use crate::reconcile::{CounterRepair, IntegrityStatus};

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        assert_eq!(preview("short"), "short");
        let long = "é".repeat(100);
        let cut = preview(&long);
        assert_eq!(cut.chars().count(), 83);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_reassign_summary_lines() {
        let advance = RoundAdvance {
            round: 4,
            range: TemperatureRange::new(25, 75),
            clock: DebateClock {
                max_exchanges: 6,
                response_budget: 3,
                exchanges_this_round: 0,
            },
            changes: vec![
                TemperatureChange {
                    agent_id: "rep_1".into(),
                    name: "Ada".into(),
                    old: 90,
                    new: 40,
                },
                TemperatureChange {
                    agent_id: "rep_2".into(),
                    name: "Bo".into(),
                    old: 50,
                    new: 52,
                },
            ],
        };
        let text = ReassignSummary::new("p/session.json", &advance).to_string();
        assert!(text.starts_with("Reassigning temperatures for Round 4\nRange: 25 - 75"));
        assert!(text.contains("Debate clock: 6 exchanges, 3 sentences/response"));
        assert!(text.contains("    90 (Visionary) -> 40 (Rigorous Skeptic) *** BIG SHIFT ***"));
        assert!(text.contains("    50 (Pragmatic Advocate) -> 52 (Pragmatic Advocate)\n"));
        assert!(text.ends_with("Updated: p/session.json"));
    }

    #[test]
    fn test_append_summary() {
        let summary = AppendSummary {
            appended: vec![
                AppendedMessage {
                    id: "msg-001".into(),
                    kind: "SPEECH".into(),
                },
                AppendedMessage {
                    id: "msg-002".into(),
                    kind: "unknown".into(),
                },
            ],
        };
        assert_eq!(
            summary.to_string(),
            "Appended msg-001 (SPEECH)\nAppended msg-002 (unknown)"
        );
        assert_eq!(
            AppendSummary { appended: vec![] }.to_string(),
            "No messages appended"
        );
    }

    #[test]
    fn test_reconcile_summary_repaired() {
        let summary = ReconcileSummary {
            report: ReconcileReport {
                parliament_id: "parl-20260101-abcd1234".into(),
                status: IntegrityStatus::Diverged {
                    errors: vec!["ledger ahead".into()],
                    warnings: vec![],
                    remedy: Remedy::RepairCounter,
                },
                repair: Some(CounterRepair { from: 2, to: 4 }),
                repaired_status: Some(IntegrityStatus::Valid),
            },
        };
        let text = summary.to_string();
        assert!(text.contains("diverged (1 errors)"));
        assert!(text.contains("  error: ledger ahead"));
        assert!(text.ends_with("Repaired next_message_id 2 -> 4; now valid"));
    }

    #[test]
    fn test_reconcile_summary_points_at_the_right_fix() {
        let diverged = |remedy| ReconcileSummary {
            report: ReconcileReport {
                parliament_id: "parl-20260101-abcd1234".into(),
                status: IntegrityStatus::Diverged {
                    errors: vec!["x".into()],
                    warnings: vec![],
                    remedy,
                },
                repair: None,
                repaired_status: None,
            },
        };
        assert!(diverged(Remedy::RepairCounter)
            .to_string()
            .ends_with("Run with --repair to advance the session counter."));
        let text = diverged(Remedy::Reinitialize).to_string();
        assert!(text.contains("init --force"));
        assert!(!text.contains("--repair"));
        let text = diverged(Remedy::EditLedger).to_string();
        assert!(text.ends_with("Correct ledger.json by hand."));
    }
}

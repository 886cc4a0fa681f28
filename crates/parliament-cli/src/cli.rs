use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Drive a parliament deliberation session stored in a working directory.
#[derive(Parser, Debug)]
#[command(name = "parliament", author, version, about, long_about = None)]
pub struct Cli {
    /// Log at debug level
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Seat a roster and write session, ledger and bill
    Init(InitArgs),
    /// Append message(s) to the ledger
    Append(AppendArgs),
    /// Advance one round and reassign temperatures
    Reassign(ReassignArgs),
    /// Check that session and ledger agree, optionally repairing the counter
    Reconcile(ReconcileArgs),
}

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory for session files (overrides PARLIAMENT_WORKING_DIR)
    #[arg(long)]
    pub working_dir: Option<PathBuf>,

    /// Number of seats requested; the roster length wins on mismatch
    #[arg(long)]
    pub num_seats: usize,

    /// Problem statement
    #[arg(long)]
    pub problem: String,

    /// JSON array of {name, motives} objects
    #[arg(long)]
    pub representatives: String,

    /// JSON array of constituent issues (strings or objects, kept as given)
    #[arg(long, default_value = "[]")]
    pub issues: String,

    /// Scheduled rounds (overrides PARLIAMENT_MAX_ROUNDS)
    #[arg(long)]
    pub max_rounds: Option<u32>,

    /// RNG seed for reproducible draws (overrides PARLIAMENT_SEED)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Replace an existing session
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct AppendArgs {
    /// Parliament working directory (overrides PARLIAMENT_WORKING_DIR)
    #[arg(long)]
    pub working_dir: Option<PathBuf>,

    /// JSON message object or array of objects (id/round/timestamp are assigned)
    #[arg(long)]
    pub message: String,
}

#[derive(clap::Args, Debug)]
pub struct ReassignArgs {
    /// Path to session.json (defaults to the working directory's session)
    #[arg(long)]
    pub session_file: Option<PathBuf>,

    /// RNG seed for reproducible draws (overrides PARLIAMENT_SEED)
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(clap::Args, Debug)]
pub struct ReconcileArgs {
    /// Parliament working directory (overrides PARLIAMENT_WORKING_DIR)
    #[arg(long)]
    pub working_dir: Option<PathBuf>,

    /// Advance next_message_id past the highest ledger id when the ledger is ahead
    #[arg(long, default_value_t = false)]
    pub repair: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_init() {
        let cli = Cli::try_parse_from([
            "parliament",
            "init",
            "--working-dir",
            "p",
            "--num-seats",
            "2",
            "--problem",
            "Fund it?",
            "--representatives",
            "[]",
            "--seed",
            "9",
        ])
        .unwrap();
        match cli.command {
            Command::Init(args) => {
                assert_eq!(args.working_dir, Some(PathBuf::from("p")));
                assert_eq!(args.num_seats, 2);
                assert_eq!(args.issues, "[]");
                assert_eq!(args.seed, Some(9));
                assert!(!args.force);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_init_requires_representatives() {
        let err = Cli::try_parse_from(["parliament", "init", "--num-seats", "2", "--problem", "x"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}

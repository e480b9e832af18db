use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::board::job::parse_timestamp;
use crate::board::{Board, BoardParams, Clock, FilterState, Job, StatusCounts, Urgency};

#[derive(Parser, Debug)]
#[command(name = "job-board", version, about = "Forklift service job board")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the board HTTP service (default)
    Serve,
    /// Print one board view of a snapshot file as JSON
    Show(ShowArgs),
}

#[derive(Args, Debug, Default)]
pub struct ShowArgs {
    /// JSON snapshot file
    #[arg(long)]
    pub snapshot: PathBuf,

    /// overdue, unassigned, escalated, awaiting-ack, in-progress or a status
    #[arg(long)]
    pub filter: Option<String>,

    #[arg(long)]
    pub search: Option<String>,

    /// today, week, month, custom, all or unfinished
    #[arg(long)]
    pub date: Option<String>,

    #[arg(long)]
    pub status: Option<String>,

    /// Lower bound for --date custom
    #[arg(long)]
    pub from: Option<String>,

    /// Upper bound for --date custom
    #[arg(long)]
    pub to: Option<String>,

    /// Print status counts instead of jobs
    #[arg(long)]
    pub counts: bool,

    /// Evaluate as of this instant instead of the wall clock (RFC 3339)
    #[arg(long)]
    pub now: Option<String>,
}

impl ShowArgs {
    pub fn params(&self) -> BoardParams {
        BoardParams {
            filter: self.filter.clone(),
            search: self.search.clone(),
            date: self.date.clone(),
            status: self.status.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
        }
    }

    pub fn fixed_now(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.now.as_deref().and_then(parse_timestamp)
    }
}

#[derive(Serialize)]
struct ShownJob<'a> {
    id: &'a str,
    job_number: Option<&'a str>,
    title: Option<&'a str>,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    urgency: Option<Urgency>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ShowOutput<'a> {
    Jobs {
        filter: FilterState,
        has_active_filters: bool,
        total: usize,
        jobs: Vec<ShownJob<'a>>,
    },
    Counts(StatusCounts),
}

/// Render the `show` command output for `jobs`.
pub fn render_show(
    jobs: &[Job],
    args: &ShowArgs,
    board: &Board,
    clock: &dyn Clock,
) -> Result<String, serde_json::Error> {
    let output = if args.counts {
        ShowOutput::Counts(board.status_counts(jobs, clock))
    } else {
        let state = FilterState::from_params(&args.params());
        let now = clock.now_utc();
        let shown: Vec<ShownJob> = board
            .apply(jobs, &state, clock)
            .into_iter()
            .map(|job| ShownJob {
                id: &job.id,
                job_number: job.job_number.as_deref(),
                title: job.title.as_deref(),
                status: job.status.as_str(),
                urgency: board.urgency(job, now),
            })
            .collect();

        ShowOutput::Jobs {
            has_active_filters: state.has_active_filters(),
            filter: state,
            total: shown.len(),
            jobs: shown,
        }
    };

    serde_json::to_string_pretty(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::FixedClock;

    fn jobs() -> Vec<Job> {
        serde_json::from_value(serde_json::json!([
            { "id": "a", "status": "completed", "job_type": "service", "priority": "low",
              "created_at": "2024-06-14T09:00:00Z" },
            { "id": "b", "status": "assigned", "job_type": "repair", "priority": "high",
              "created_at": "2024-06-15T09:00:00Z", "title": "Brake fault" }
        ]))
        .unwrap()
    }

    fn clock() -> FixedClock {
        FixedClock::at_utc(parse_timestamp("2024-06-15T10:00:00Z").unwrap())
    }

    #[test]
    fn test_parse_show_command() {
        let cli = Cli::try_parse_from([
            "job-board", "show", "--snapshot", "jobs.json", "--filter", "overdue", "--counts",
        ])
        .unwrap();

        match cli.command {
            Some(Command::Show(args)) => {
                assert_eq!(args.snapshot, PathBuf::from("jobs.json"));
                assert_eq!(args.filter.as_deref(), Some("overdue"));
                assert!(args.counts);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::try_parse_from(["job-board"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_render_jobs() {
        let args = ShowArgs::default();
        let out = render_show(&jobs(), &args, &Board::default(), &clock()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["total"], 1);
        assert_eq!(value["jobs"][0]["id"], "b");
        assert_eq!(value["jobs"][0]["status"], "assigned");
        assert_eq!(value["has_active_filters"], false);
    }

    #[test]
    fn test_render_counts() {
        let args = ShowArgs {
            counts: true,
            ..ShowArgs::default()
        };
        let out = render_show(&jobs(), &args, &Board::default(), &clock()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["total"], 2);
        assert_eq!(value["by_status"]["completed"], 1);
    }
}

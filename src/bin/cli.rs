use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use schedule_cpm::logging::{LogLevel, init_logging};
use schedule_cpm::persistence::{load_schedule_from_json, save_schedule_to_csv, save_schedule_to_json};
use schedule_cpm::report::{cpm_frame, render_frame};
use schedule_cpm::{
    CpmEngine, EngineConfig, InMemoryScheduleStore, ScheduleId, ScheduleRepository,
    SqliteScheduleStore, TaskId,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Critical path scheduling for a JSON snapshot or a SQLite database.
#[derive(Debug, Parser)]
#[command(name = "schedule-cpm", version, about, long_about = None)]
struct CliArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Engine config (JSON). Defaults apply when omitted.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SCHEDULE_CPM_LOG` or `info` is used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// JSON schedule snapshot; rewritten in place by mutating commands.
    #[arg(long, value_name = "PATH", conflicts_with_all = ["db", "schedule"])]
    file: Option<PathBuf>,

    /// SQLite database file.
    #[arg(long, value_name = "PATH", requires = "schedule")]
    db: Option<PathBuf>,

    /// Schedule id inside the database.
    #[arg(long, value_name = "ID")]
    schedule: Option<i64>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Recompute dates, float and the critical path.
    Calculate {
        /// Print the task table after the summary.
        #[arg(long)]
        table: bool,
    },
    /// Move one task and push its successors.
    Cascade {
        #[arg(long)]
        task: i64,
        #[arg(long, value_parser = parse_date)]
        start: NaiveDate,
        #[arg(long, value_parser = parse_date)]
        end: NaiveDate,
    },
    /// Renumber WBS codes for the whole tree.
    Wbs,
    /// Recompute every container's dates from its children.
    Rollup,
    /// Print the task table.
    Show,
    /// Write the schedule as a single CSV file.
    ExportCsv {
        #[arg(long, value_name = "PATH")]
        out: PathBuf,
    },
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| format!("invalid date '{value}' (expected YYYY-MM-DD): {err}"))
}

struct Workspace {
    repository: Arc<dyn ScheduleRepository>,
    schedule_id: ScheduleId,
    snapshot: Option<PathBuf>,
}

impl Workspace {
    fn open(source: &SourceArgs) -> Result<Self> {
        if let Some(path) = &source.file {
            let schedule = load_schedule_from_json(path)
                .with_context(|| format!("loading {}", path.display()))?;
            let schedule_id = schedule.id;
            let store = InMemoryScheduleStore::with_schedules([schedule])?;
            return Ok(Self {
                repository: Arc::new(store),
                schedule_id,
                snapshot: Some(path.clone()),
            });
        }
        let (Some(path), Some(id)) = (&source.db, source.schedule) else {
            bail!("either --file or --db with --schedule is required");
        };
        let store = SqliteScheduleStore::new(path)
            .with_context(|| format!("opening {}", path.display()))?;
        Ok(Self {
            repository: Arc::new(store),
            schedule_id: ScheduleId(id),
            snapshot: None,
        })
    }

    fn load(&self) -> Result<schedule_cpm::ProjectSchedule> {
        self.repository
            .load_schedule(self.schedule_id)?
            .with_context(|| format!("schedule {} not found", self.schedule_id))
    }

    /// File-backed runs write the updated schedule back to the snapshot.
    fn persist(&self) -> Result<()> {
        if let Some(path) = &self.snapshot {
            save_schedule_to_json(&self.load()?, path)
                .with_context(|| format!("writing {}", path.display()))?;
        }
        Ok(())
    }
}

fn run(args: CliArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let workspace = Workspace::open(&args.source)?;
    let engine = CpmEngine::new(Arc::clone(&workspace.repository)).with_config(config);

    match args.command {
        Command::Calculate { table } => {
            let outcome = engine.calculate(workspace.schedule_id)?;
            workspace.persist()?;
            println!("{}", outcome.to_cli_summary());
            if table {
                print!("{}", render_frame(&cpm_frame(&workspace.load()?)?));
            }
        }
        Command::Cascade { task, start, end } => {
            let outcome = engine.cascade(TaskId(task), start, end)?;
            workspace.persist()?;
            println!("{}", outcome.to_cli_summary());
        }
        Command::Wbs => {
            let assignments = engine.renumber_wbs(workspace.schedule_id)?;
            workspace.persist()?;
            for assignment in assignments {
                println!(
                    "{}\t{}",
                    assignment.task_id,
                    assignment.wbs_code.as_deref().unwrap_or("-")
                );
            }
        }
        Command::Rollup => {
            let updated = engine.roll_up(workspace.schedule_id)?;
            workspace.persist()?;
            println!("containers updated: {}", updated.len());
        }
        Command::Show => {
            print!("{}", render_frame(&cpm_frame(&workspace.load()?)?));
        }
        Command::ExportCsv { out } => {
            save_schedule_to_csv(&workspace.load()?, &out)
                .with_context(|| format!("writing {}", out.display()))?;
            println!("wrote {}", out.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    if let Err(err) = init_logging(args.log_level) {
        eprintln!("error: {err:#}");
        return ExitCode::FAILURE;
    }
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

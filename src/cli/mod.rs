//! Command-line interface for weekplan
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::calendar::{self, IsoDate};
use crate::error::Result;
use crate::output::OutputOptions;
use crate::storage::{Storage, DATA_DIR_ENV, DEFAULT_DATA_DIR};

mod init;
mod person;
mod stats;
mod task;
mod week;

/// weekplan - household chore planner
///
/// Plans recurring chores across a household, tracks who finished what, and
/// reports completion rates per week, month and year.
#[derive(Parser, Debug)]
#[command(name = "weekplan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (defaults to ./.weekplan)
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    pub dir: Option<PathBuf>,

    /// Reference date as YYYY-MM-DD (defaults to today)
    #[arg(long, global = true)]
    pub date: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory and household snapshot
    Init {
        /// Start without the sample persons and chores
        #[arg(long)]
        empty: bool,
    },

    /// Household members
    #[command(subcommand)]
    Person(PersonCommands),

    /// Chores and their schedules
    #[command(subcommand)]
    Task(TaskCommands),

    /// Week plan and per-week task selection
    #[command(subcommand)]
    Week(WeekCommands),

    /// Show who owes which chore on the reference date
    Who,

    /// Mark a chore done (or undone) for a person on the reference date
    Done {
        /// Person id or name
        person: String,

        /// Task id or name
        task: String,
    },

    /// Completion statistics
    Stats {
        /// Period: week, month or year (all three when omitted)
        #[arg(long)]
        period: Option<String>,
    },

    /// Daily and weekly progress for the reference week
    Summary {
        /// Only count chores owed by this person
        #[arg(long)]
        person: Option<String>,
    },
}

/// Person subcommands
#[derive(Subcommand, Debug)]
pub enum PersonCommands {
    /// Add a person
    Add {
        /// Display name
        name: String,
    },

    /// Remove a person and their completions
    Rm {
        /// Person id or name
        person: String,
    },

    /// Rename a person
    Rename {
        /// Person id or name
        person: String,

        /// New display name
        name: String,
    },

    /// Set or clear a person's photo
    Photo {
        /// Person id or name
        person: String,

        /// Photo URL (omit to clear)
        url: Option<String>,
    },

    /// List persons
    List,
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a chore, active every day for everyone
    Add {
        /// Chore name
        name: String,
    },

    /// Remove a chore and its completions
    Rm {
        /// Task id or name
        task: String,
    },

    /// Rename a chore
    Rename {
        /// Task id or name
        task: String,

        /// New name
        name: String,
    },

    /// Change when and by whom a chore is done
    Schedule {
        /// Task id or name
        task: String,

        /// Active weekdays: all, none, or a list like mon,wed,fri
        #[arg(long)]
        days: Option<String>,

        /// Assignment mode: all, alternate or person
        #[arg(long)]
        mode: Option<String>,

        /// First person in an alternate rotation
        #[arg(long)]
        start: Option<String>,

        /// Fixed person for person mode
        #[arg(long)]
        person: Option<String>,
    },

    /// Move a chore to a position in the list (0-based)
    Move {
        /// Task id or name
        task: String,

        /// Target position
        index: usize,
    },

    /// Sort chores alphabetically
    Sort,

    /// List chores with their schedules
    List,
}

/// Week subcommands
#[derive(Subcommand, Debug)]
pub enum WeekCommands {
    /// Show the plan for the reference week
    Show,

    /// Switch a chore on or off for the reference week
    Toggle {
        /// Task id or name
        task: String,
    },
}

/// Settings every command shares.
#[derive(Debug, Clone)]
pub struct Context {
    pub storage: Storage,
    pub date: NaiveDate,
    pub today: NaiveDate,
    pub output: OutputOptions,
}

impl Context {
    fn new(dir: Option<PathBuf>, date: Option<&str>, json: bool, quiet: bool) -> Result<Self> {
        let today = calendar::today();
        let date = match date {
            Some(raw) => raw.parse::<IsoDate>()?.date(),
            None => today,
        };
        Ok(Self {
            storage: Storage::open(dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))),
            date,
            today,
            output: OutputOptions { json, quiet },
        })
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let ctx = Context::new(self.dir, self.date.as_deref(), self.json, self.quiet)?;
        match self.command {
            Commands::Init { empty } => init::run(&ctx, init::InitOptions { empty }),
            Commands::Person(cmd) => match cmd {
                PersonCommands::Add { name } => person::run_add(&ctx, person::AddOptions { name }),
                PersonCommands::Rm { person } => person::run_rm(&ctx, person::RmOptions { person }),
                PersonCommands::Rename { person, name } => {
                    person::run_rename(&ctx, person::RenameOptions { person, name })
                }
                PersonCommands::Photo { person, url } => {
                    person::run_photo(&ctx, person::PhotoOptions { person, url })
                }
                PersonCommands::List => person::run_list(&ctx),
            },
            Commands::Task(cmd) => match cmd {
                TaskCommands::Add { name } => task::run_add(&ctx, task::AddOptions { name }),
                TaskCommands::Rm { task } => task::run_rm(&ctx, task::RmOptions { task }),
                TaskCommands::Rename { task, name } => {
                    task::run_rename(&ctx, task::RenameOptions { task, name })
                }
                TaskCommands::Schedule { task, days, mode, start, person } => {
                    task::run_schedule(
                        &ctx,
                        task::ScheduleOptions {
                            task,
                            days,
                            mode,
                            start,
                            person,
                        },
                    )
                }
                TaskCommands::Move { task, index } => {
                    task::run_move(&ctx, task::MoveOptions { task, index })
                }
                TaskCommands::Sort => task::run_sort(&ctx),
                TaskCommands::List => task::run_list(&ctx),
            },
            Commands::Week(cmd) => match cmd {
                WeekCommands::Show => week::run_show(&ctx),
                WeekCommands::Toggle { task } => week::run_toggle(&ctx, week::ToggleOptions { task }),
            },
            Commands::Who => week::run_who(&ctx),
            Commands::Done { person, task } => week::run_done(&ctx, week::DoneOptions { person, task }),
            Commands::Stats { period } => stats::run_stats(&ctx, stats::StatsOptions { period }),
            Commands::Summary { person } => stats::run_summary(&ctx, stats::SummaryOptions { person }),
        }
    }
}

//! weekplan - household chore planner library
//!
//! Core of a family chore planner: recurring chores with per-weekday
//! activation, rotating or fixed assignment, a completion ledger, and
//! completion statistics over calendar periods.
//!
//! # Core Concepts
//!
//! - **Schedule**: which weekdays a task is active and who owes it
//! - **Rotation**: alternate assignment keyed on days since 2024-01-01
//! - **Ledger**: set of (date, person, task) completion facts
//! - **Week overrides**: per-week narrowing of the active task set
//! - **Possible units**: (day, task, person) triples owed in a range
//!
//! # Module Organization
//!
//! - `calendar`: local calendar dates, week/month/year bounds, rotation epoch
//! - `household`: persons, tasks, schedules and their persisted shapes
//! - `assign`: assignment resolver
//! - `ledger`: completion ledger and its composite keys
//! - `overrides`: per-week task activation
//! - `stats`: period aggregator, day/week summaries, ratings
//! - `snapshot`: the `Household` aggregate and its mutations
//! - `storage`: data directory, snapshot persistence
//! - `lock`: file locking and atomic writes
//! - `config`: configuration loading from `weekplan.toml`
//! - `error`: error types and result aliases
//! - `output`: human and JSON output for CLI commands
//! - `cli`: command-line interface using clap

pub mod assign;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod error;
pub mod household;
pub mod ledger;
pub mod lock;
pub mod output;
pub mod overrides;
pub mod snapshot;
pub mod stats;
pub mod storage;

pub use error::{Error, Result};
pub use snapshot::Household;

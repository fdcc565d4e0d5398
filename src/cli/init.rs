//! weekplan init command implementation
//!
//! Creates the data directory, `weekplan.toml` and the household snapshot.

use std::path::PathBuf;

use super::Context;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};

/// Options for `weekplan init`
pub struct InitOptions {
    pub empty: bool,
}

#[derive(serde::Serialize)]
struct InitReport {
    dir: PathBuf,
    created: bool,
    seeded: bool,
    persons: usize,
    tasks: usize,
}

pub fn run(ctx: &Context, options: InitOptions) -> Result<()> {
    let storage = &ctx.storage;
    let seed = !options.empty && storage.config().household.seed_defaults;
    let created = storage.init(seed)?;
    let household = storage.load_household()?;

    let report = InitReport {
        dir: storage.root().to_path_buf(),
        created,
        seeded: created && seed,
        persons: household.persons.len(),
        tasks: household.tasks.len(),
    };

    let header = if created {
        "weekplan init: household created"
    } else {
        "weekplan init: nothing to do"
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("dir", storage.root().display().to_string());
    human.push_summary("persons", report.persons.to_string());
    human.push_summary("tasks", report.tasks.to_string());
    if report.persons == 0 {
        human.push_next_step("weekplan person add <name>");
    }
    if report.tasks == 0 {
        human.push_next_step("weekplan task add <name>");
    }
    if report.persons > 0 && report.tasks > 0 {
        human.push_next_step("weekplan week show");
    }

    emit_success(ctx.output, "init", &report, Some(&human))
}

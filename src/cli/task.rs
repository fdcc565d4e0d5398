//! weekplan task commands
//!
//! Chore management and schedules. Schedules are edited in their persisted
//! form and re-normalized against the roster, so partial edits like
//! `--days` alone keep the current assignment.

use super::Context;
use crate::error::{Error, Result};
use crate::household::{Assignment, AssignmentMode, ActiveDays, Person, Task};
use crate::output::{emit_success, HumanOutput};
use crate::snapshot::Household;

/// Options for `weekplan task add`
pub struct AddOptions {
    pub name: String,
}

/// Options for `weekplan task rm`
pub struct RmOptions {
    pub task: String,
}

/// Options for `weekplan task rename`
pub struct RenameOptions {
    pub task: String,
    pub name: String,
}

/// Options for `weekplan task schedule`
pub struct ScheduleOptions {
    pub task: String,
    pub days: Option<String>,
    pub mode: Option<String>,
    pub start: Option<String>,
    pub person: Option<String>,
}

/// Options for `weekplan task move`
pub struct MoveOptions {
    pub task: String,
    pub index: usize,
}

#[derive(serde::Serialize)]
struct TaskReport {
    task: Task,
}

#[derive(serde::Serialize)]
struct TaskMoveReport {
    task: Task,
    index: usize,
}

#[derive(serde::Serialize)]
struct TaskListReport {
    tasks: Vec<Task>,
}

/// One-line schedule description, e.g. `mon,wed; alternate from Alex`.
pub(crate) fn describe_schedule(task: &Task, roster: &[Person]) -> String {
    let name_of = |id: &Option<String>| {
        id.as_deref()
            .and_then(|id| roster.iter().find(|person| person.id == id))
            .map(|person| person.name.clone())
            .unwrap_or_else(|| "nobody".to_string())
    };
    let assignment = match &task.schedule.assignment {
        Assignment::All => "everyone".to_string(),
        Assignment::Alternate { anchor } => format!("alternate from {}", name_of(anchor)),
        Assignment::Person { assignee } => name_of(assignee),
    };
    format!("{}; {}", task.schedule.days.describe(), assignment)
}

fn task_human(header: String, task: &Task, roster: &[Person]) -> HumanOutput {
    let mut human = HumanOutput::new(header);
    human.push_summary("id", task.id.clone());
    human.push_summary("name", task.name.clone());
    human.push_summary("schedule", describe_schedule(task, roster));
    human
}

pub fn run_add(ctx: &Context, options: AddOptions) -> Result<()> {
    let (task, roster) = ctx.storage.update_household(|household| {
        let task = household.add_task(&options.name)?;
        Ok((task, household.persons.clone()))
    })?;

    let mut human = task_human(format!("weekplan task add: {}", task.name), &task, &roster);
    human.push_next_step(format!("weekplan task schedule \"{}\" --days mon,wed,fri", task.name));

    emit_success(ctx.output, "task add", &TaskReport { task }, Some(&human))
}

pub fn run_rm(ctx: &Context, options: RmOptions) -> Result<()> {
    let (task, roster) = ctx.storage.update_household(|household| {
        let task = household.remove_task(&options.task)?;
        Ok((task, household.persons.clone()))
    })?;

    let human = task_human(format!("weekplan task rm: {}", task.name), &task, &roster);
    emit_success(ctx.output, "task rm", &TaskReport { task }, Some(&human))
}

pub fn run_rename(ctx: &Context, options: RenameOptions) -> Result<()> {
    let (task, roster) = ctx.storage.update_household(|household| {
        let task = household.rename_task(&options.task, &options.name)?;
        Ok((task, household.persons.clone()))
    })?;

    let human = task_human(format!("weekplan task rename: {}", task.name), &task, &roster);
    emit_success(ctx.output, "task rename", &TaskReport { task }, Some(&human))
}

pub fn run_schedule(ctx: &Context, options: ScheduleOptions) -> Result<()> {
    let days = options.days.as_deref().map(str::parse::<ActiveDays>).transpose()?;
    let mode = options.mode.as_deref().map(str::parse::<AssignmentMode>).transpose()?;
    let mode = implied_mode(mode, options.start.is_some(), options.person.is_some())?;

    let (task, roster) = ctx.storage.update_household(|household| {
        let mut stored = household.find_task(&options.task)?.schedule.to_stored();
        if let Some(days) = days {
            stored.days = Some(days.as_array().to_vec());
        }
        if let Some(mode) = mode {
            stored.assignment = Some(mode.as_str().to_string());
        }
        if let Some(start) = &options.start {
            stored.start_person_id = Some(resolve_person_id(household, start)?);
        }
        if let Some(person) = &options.person {
            stored.person_id = Some(resolve_person_id(household, person)?);
        }
        let task = household.set_schedule(&options.task, &stored)?;
        Ok((task, household.persons.clone()))
    })?;

    let mut human = task_human(format!("weekplan task schedule: {}", task.name), &task, &roster);
    if roster.is_empty() && task.schedule.assignment.mode() != AssignmentMode::All {
        human.push_warning("no persons yet; nobody owes this chore");
    }
    emit_success(ctx.output, "task schedule", &TaskReport { task }, Some(&human))
}

/// `--start` implies alternate mode and `--person` implies person mode.
fn implied_mode(
    explicit: Option<AssignmentMode>,
    has_start: bool,
    has_person: bool,
) -> Result<Option<AssignmentMode>> {
    if has_start && has_person {
        return Err(Error::InvalidArgument(
            "--start and --person cannot be combined".to_string(),
        ));
    }
    let implied = if has_start {
        Some(AssignmentMode::Alternate)
    } else if has_person {
        Some(AssignmentMode::Person)
    } else {
        None
    };
    match (explicit, implied) {
        (Some(explicit), Some(implied)) if explicit != implied => Err(Error::InvalidArgument(format!(
            "--{} requires --mode {implied}",
            if has_start { "start" } else { "person" }
        ))),
        (explicit, implied) => Ok(explicit.or(implied)),
    }
}

fn resolve_person_id(household: &Household, query: &str) -> Result<String> {
    Ok(household.find_person(query)?.id.clone())
}

pub fn run_move(ctx: &Context, options: MoveOptions) -> Result<()> {
    let (task, index, roster) = ctx.storage.update_household(|household| {
        let index = household.move_task(&options.task, options.index)?;
        Ok((household.tasks[index].clone(), index, household.persons.clone()))
    })?;

    let mut human = task_human(format!("weekplan task move: {}", task.name), &task, &roster);
    human.push_summary("position", index.to_string());
    emit_success(ctx.output, "task move", &TaskMoveReport { task, index }, Some(&human))
}

pub fn run_sort(ctx: &Context) -> Result<()> {
    let tasks = ctx.storage.update_household(|household| {
        household.sort_tasks_by_name();
        Ok(household.tasks.clone())
    })?;

    let mut human = HumanOutput::new("weekplan task sort: sorted by name");
    for task in &tasks {
        human.push_detail(task.name.clone());
    }
    emit_success(ctx.output, "task sort", &TaskListReport { tasks }, Some(&human))
}

pub fn run_list(ctx: &Context) -> Result<()> {
    let household = ctx.storage.load_household()?;

    let mut human = HumanOutput::new(format!("weekplan task list: {} task(s)", household.tasks.len()));
    for task in &household.tasks {
        human.push_detail(format!(
            "{} [{}] ({})",
            task.name,
            describe_schedule(task, &household.persons),
            task.id
        ));
    }
    if household.tasks.is_empty() {
        human.push_next_step("weekplan task add <name>");
    }

    let report = TaskListReport {
        tasks: household.tasks,
    };
    emit_success(ctx.output, "task list", &report, Some(&human))
}

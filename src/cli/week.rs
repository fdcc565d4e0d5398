//! weekplan week, who and done commands
//!
//! Member-facing views of the plan: who owes what on a day, the full week,
//! and marking chores done.

use chrono::NaiveDate;
use serde::Serialize;

use super::Context;
use crate::calendar::{self, IsoDate};
use crate::error::Result;
use crate::household::DAY_NAMES;
use crate::output::{emit_success, HumanOutput};
use crate::snapshot::Household;

/// Options for `weekplan week toggle`
pub struct ToggleOptions {
    pub task: String,
}

/// Options for `weekplan done`
pub struct DoneOptions {
    pub person: String,
    pub task: String,
}

#[derive(Serialize)]
struct Assignee {
    id: String,
    name: String,
    done: bool,
}

#[derive(Serialize)]
struct ChoreReport {
    task_id: String,
    task: String,
    persons: Vec<Assignee>,
}

#[derive(Serialize)]
struct DayReport {
    date: IsoDate,
    weekday: &'static str,
    chores: Vec<ChoreReport>,
}

#[derive(Serialize)]
struct NamedRef {
    id: String,
    name: String,
}

#[derive(Serialize)]
struct WeekReport {
    week_start: IsoDate,
    active_tasks: Vec<NamedRef>,
    inactive_tasks: Vec<NamedRef>,
    days: Vec<DayReport>,
}

#[derive(Serialize)]
struct ToggleReport {
    week_start: IsoDate,
    task: NamedRef,
    active: bool,
}

#[derive(Serialize)]
struct DoneReport {
    date: IsoDate,
    person: NamedRef,
    task: NamedRef,
    done: bool,
}

fn day_report(household: &Household, date: NaiveDate) -> DayReport {
    let iso_date = IsoDate::new(date);
    let chores = household
        .plan_for_day(date)
        .assignments
        .into_iter()
        .map(|assignment| ChoreReport {
            task_id: assignment.task_id.to_string(),
            task: assignment.task_name.to_string(),
            persons: assignment
                .person_ids
                .iter()
                .filter_map(|id| household.persons.iter().find(|person| person.id == *id))
                .map(|person| Assignee {
                    id: person.id.clone(),
                    name: person.name.clone(),
                    done: household.ledger.is_completed(&person.id, assignment.task_id, iso_date),
                })
                .collect(),
        })
        .collect();
    DayReport {
        date: iso_date,
        weekday: DAY_NAMES[calendar::day_index(date)],
        chores,
    }
}

fn chore_line(chore: &ChoreReport) -> String {
    let persons: Vec<String> = chore
        .persons
        .iter()
        .map(|person| {
            if person.done {
                format!("{} (done)", person.name)
            } else {
                person.name.clone()
            }
        })
        .collect();
    format!("{}: {}", chore.task, persons.join(", "))
}

pub fn run_show(ctx: &Context) -> Result<()> {
    let household = ctx.storage.load_household()?;
    let week_start = calendar::start_of_week(ctx.date);

    let active: Vec<NamedRef> = household
        .effective_tasks(week_start)
        .into_iter()
        .map(|task| NamedRef {
            id: task.id.clone(),
            name: task.name.clone(),
        })
        .collect();
    let inactive: Vec<NamedRef> = household
        .tasks
        .iter()
        .filter(|task| !active.iter().any(|on| on.id == task.id))
        .map(|task| NamedRef {
            id: task.id.clone(),
            name: task.name.clone(),
        })
        .collect();
    let days: Vec<DayReport> = calendar::week_days(week_start)
        .into_iter()
        .map(|day| day_report(&household, day))
        .collect();

    let mut human = HumanOutput::new(format!("weekplan week show: week of {}", IsoDate::new(week_start)));
    human.push_summary("active", active.len().to_string());
    if !inactive.is_empty() {
        let names: Vec<&str> = inactive.iter().map(|task| task.name.as_str()).collect();
        human.push_summary("off this week", names.join(", "));
    }
    for day in &days {
        if day.chores.is_empty() {
            human.push_detail(format!("{} {}: nothing planned", day.weekday, day.date));
            continue;
        }
        let lines: Vec<String> = day.chores.iter().map(chore_line).collect();
        human.push_detail(format!("{} {}: {}", day.weekday, day.date, lines.join("; ")));
    }

    let report = WeekReport {
        week_start: IsoDate::new(week_start),
        active_tasks: active,
        inactive_tasks: inactive,
        days,
    };
    emit_success(ctx.output, "week show", &report, Some(&human))
}

pub fn run_toggle(ctx: &Context, options: ToggleOptions) -> Result<()> {
    let date = ctx.date;
    let (task, active) = ctx.storage.update_household(|household| {
        let active = household.toggle_task_for_week(date, &options.task)?;
        let task = household.find_task(&options.task)?;
        Ok((
            NamedRef {
                id: task.id.clone(),
                name: task.name.clone(),
            },
            active,
        ))
    })?;

    let week_start = IsoDate::new(calendar::start_of_week(date));
    let state = if active { "on" } else { "off" };
    let mut human = HumanOutput::new(format!("weekplan week toggle: {} {state} for week of {week_start}", task.name));
    human.push_summary("task", task.name.clone());
    human.push_summary("week", week_start.to_string());
    human.push_summary("active", active.to_string());
    human.push_next_step("weekplan week show");

    let report = ToggleReport {
        week_start,
        task,
        active,
    };
    emit_success(ctx.output, "week toggle", &report, Some(&human))
}

pub fn run_who(ctx: &Context) -> Result<()> {
    let household = ctx.storage.load_household()?;
    let day = day_report(&household, ctx.date);

    let mut human = HumanOutput::new(format!("weekplan who: {} {}", day.weekday, day.date));
    if day.chores.is_empty() {
        human.push_summary("chores", "none");
    } else {
        human.push_summary("chores", day.chores.len().to_string());
    }
    for chore in &day.chores {
        human.push_detail(chore_line(chore));
    }

    emit_success(ctx.output, "who", &day, Some(&human))
}

pub fn run_done(ctx: &Context, options: DoneOptions) -> Result<()> {
    let date = ctx.date;
    let report = ctx.storage.update_household(|household| {
        let done = household.toggle_completion(&options.person, &options.task, date)?;
        let person = household.find_person(&options.person)?;
        let task = household.find_task(&options.task)?;
        Ok(DoneReport {
            date: IsoDate::new(date),
            person: NamedRef {
                id: person.id.clone(),
                name: person.name.clone(),
            },
            task: NamedRef {
                id: task.id.clone(),
                name: task.name.clone(),
            },
            done,
        })
    })?;

    let header = if report.done {
        format!("weekplan done: {} finished {}", report.person.name, report.task.name)
    } else {
        format!("weekplan done: {} reopened {}", report.person.name, report.task.name)
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("date", report.date.to_string());
    human.push_summary("done", report.done.to_string());

    emit_success(ctx.output, "done", &report, Some(&human))
}

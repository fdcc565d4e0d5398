//! Household snapshot: roster, tasks, ledger and week overrides as one value.
//!
//! [`StoredHousehold`] is the on-disk JSON shape. [`Household`] is the
//! normalized in-memory form every command works on; conversion happens once
//! per load and once per save.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assign::{self, DayPlan};
use crate::calendar::{self, IsoDate};
use crate::error::{Error, Result};
use crate::household::{pick_theme, Person, Schedule, StoredSchedule, StoredTask, Task};
use crate::ledger::CompletionLedger;
use crate::overrides::WeekOverrides;
use crate::stats::{self, DaySummary, PeriodReport, PeriodStats, StatsPeriod};

/// Version tag written into every snapshot.
pub const SNAPSHOT_VERSION: &str = "weekplan.household.v1";

pub const DEFAULT_ADMIN_CODE: &str = "parent";

const DEFAULT_PERSONS: [&str; 2] = ["Alex", "Sam"];

const DEFAULT_TASKS: [&str; 7] = [
    "Pack lunch",
    "Pack school bag",
    "Put shoes away",
    "Hang up coat",
    "Lay out clothes",
    "Empty dishwasher",
    "Set the table",
];

/// Persisted household snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredHousehold {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub persons: Vec<Person>,
    #[serde(default)]
    pub tasks: Vec<StoredTask>,
    #[serde(default)]
    pub completions: BTreeMap<String, bool>,
    #[serde(default)]
    pub week_tasks: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Household {
    pub persons: Vec<Person>,
    pub tasks: Vec<Task>,
    pub ledger: CompletionLedger,
    pub overrides: WeekOverrides,
    pub admin_code: String,
}

impl Default for Household {
    fn default() -> Self {
        Self {
            persons: Vec::new(),
            tasks: Vec::new(),
            ledger: CompletionLedger::new(),
            overrides: WeekOverrides::new(),
            admin_code: DEFAULT_ADMIN_CODE.to_string(),
        }
    }
}

impl Household {
    /// Two sample persons and the everyday chores a new household starts with.
    pub fn with_defaults() -> Self {
        let mut household = Self::default();
        for name in DEFAULT_PERSONS {
            household.push_person(name);
        }
        for name in DEFAULT_TASKS {
            household.tasks.push(Task::new(new_id(), name));
        }
        household
    }

    pub fn from_stored(stored: StoredHousehold) -> Self {
        let persons = stored.persons;
        let tasks = stored
            .tasks
            .iter()
            .map(|task| Task::from_stored(task, &persons))
            .collect();

        let person_ids: Vec<&str> = persons.iter().map(|person| person.id.as_str()).collect();
        let (ledger, rejected) = CompletionLedger::from_map(&stored.completions, &person_ids);
        for key in &rejected {
            tracing::warn!(key = %key, "dropping malformed completion key");
        }
        let (overrides, rejected) = WeekOverrides::from_map(&stored.week_tasks);
        for key in &rejected {
            tracing::warn!(key = %key, "dropping week override that is not keyed by a Monday");
        }

        Self {
            persons,
            tasks,
            ledger,
            overrides,
            admin_code: stored
                .admin_code
                .filter(|code| !code.is_empty())
                .unwrap_or_else(|| DEFAULT_ADMIN_CODE.to_string()),
        }
    }

    pub fn to_stored(&self) -> StoredHousehold {
        StoredHousehold {
            version: SNAPSHOT_VERSION.to_string(),
            persons: self.persons.clone(),
            tasks: self.tasks.iter().map(Task::to_stored).collect(),
            completions: self.ledger.to_map(),
            week_tasks: self.overrides.to_map(),
            admin_code: Some(self.admin_code.clone()),
        }
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Finds a person by id, or by case-insensitive name.
    pub fn find_person(&self, query: &str) -> Result<&Person> {
        let idx = self.person_index(query)?;
        Ok(&self.persons[idx])
    }

    /// Finds a task by id, or by case-insensitive name.
    pub fn find_task(&self, query: &str) -> Result<&Task> {
        let idx = self.task_index(query)?;
        Ok(&self.tasks[idx])
    }

    fn person_index(&self, query: &str) -> Result<usize> {
        let query = query.trim();
        if let Some(idx) = self.persons.iter().position(|person| person.id == query) {
            return Ok(idx);
        }
        unique_name_match(self.persons.iter().map(|person| person.name.as_str()), query)?
            .ok_or_else(|| Error::PersonNotFound(query.to_string()))
    }

    fn task_index(&self, query: &str) -> Result<usize> {
        let query = query.trim();
        if let Some(idx) = self.tasks.iter().position(|task| task.id == query) {
            return Ok(idx);
        }
        unique_name_match(self.tasks.iter().map(|task| task.name.as_str()), query)?
            .ok_or_else(|| Error::TaskNotFound(query.to_string()))
    }

    // =========================================================================
    // Roster
    // =========================================================================

    pub fn add_person(&mut self, name: &str) -> Result<Person> {
        let name = clean_name(name, "person")?;
        let person = self.push_person(&name);
        self.renormalize();
        tracing::debug!(person = %person.id, theme = %person.theme, "added person");
        Ok(person)
    }

    fn push_person(&mut self, name: &str) -> Person {
        let person = Person::new(new_id(), name, pick_theme(&self.persons));
        self.persons.push(person.clone());
        person
    }

    /// Removes a person and every completion recorded for them.
    pub fn remove_person(&mut self, query: &str) -> Result<Person> {
        let idx = self.person_index(query)?;
        let person = self.persons.remove(idx);
        let dropped = self.ledger.remove_all_for_person(&person.id);
        self.renormalize();
        tracing::debug!(person = %person.id, completions = dropped, "removed person");
        Ok(person)
    }

    pub fn rename_person(&mut self, query: &str, name: &str) -> Result<Person> {
        let name = clean_name(name, "person")?;
        let idx = self.person_index(query)?;
        self.persons[idx].name = name;
        Ok(self.persons[idx].clone())
    }

    pub fn set_person_photo(&mut self, query: &str, photo_url: Option<String>) -> Result<Person> {
        let idx = self.person_index(query)?;
        self.persons[idx].photo_url = photo_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        Ok(self.persons[idx].clone())
    }

    fn renormalize(&mut self) {
        let persons = &self.persons;
        for task in &mut self.tasks {
            task.schedule = task.schedule.normalized(persons);
        }
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    /// Adds a task active every day for everyone.
    ///
    /// Weeks that already have an override get the new task switched on.
    pub fn add_task(&mut self, name: &str) -> Result<Task> {
        let name = clean_name(name, "task")?;
        let task = Task::new(new_id(), name);
        self.tasks.push(task.clone());
        self.overrides.include_task(&task.id);
        tracing::debug!(task = %task.id, "added task");
        Ok(task)
    }

    /// Removes a task along with its completions and override entries.
    pub fn remove_task(&mut self, query: &str) -> Result<Task> {
        let idx = self.task_index(query)?;
        let task = self.tasks.remove(idx);
        let dropped = self.ledger.remove_all_for_task(&task.id);
        self.overrides.remove_task(&task.id, &self.tasks);
        tracing::debug!(task = %task.id, completions = dropped, "removed task");
        Ok(task)
    }

    pub fn rename_task(&mut self, query: &str, name: &str) -> Result<Task> {
        let name = clean_name(name, "task")?;
        let idx = self.task_index(query)?;
        self.tasks[idx].name = name;
        Ok(self.tasks[idx].clone())
    }

    /// Replaces a task's schedule, fixing up person references.
    pub fn set_schedule(&mut self, query: &str, schedule: &StoredSchedule) -> Result<Task> {
        let idx = self.task_index(query)?;
        self.tasks[idx].schedule = Schedule::from_stored(Some(schedule), &self.persons);
        tracing::debug!(
            task = %self.tasks[idx].id,
            mode = %self.tasks[idx].schedule.assignment.mode(),
            days = %self.tasks[idx].schedule.days.describe(),
            "updated schedule"
        );
        Ok(self.tasks[idx].clone())
    }

    /// Moves a task to `index`, clamped to the end of the list.
    pub fn move_task(&mut self, query: &str, index: usize) -> Result<usize> {
        let from = self.task_index(query)?;
        let task = self.tasks.remove(from);
        let to = index.min(self.tasks.len());
        self.tasks.insert(to, task);
        Ok(to)
    }

    pub fn sort_tasks_by_name(&mut self) {
        self.tasks
            .sort_by_cached_key(|task| task.name.to_lowercase());
    }

    // =========================================================================
    // Week plan and completions
    // =========================================================================

    /// Switches a task on or off for the week containing `date`.
    pub fn toggle_task_for_week(&mut self, date: NaiveDate, query: &str) -> Result<bool> {
        let idx = self.task_index(query)?;
        let task_id = self.tasks[idx].id.clone();
        let active = self.overrides.toggle_task(date, &task_id, &self.tasks);
        tracing::debug!(
            task = %task_id,
            week = %IsoDate::new(calendar::start_of_week(date)),
            active,
            "toggled task for week"
        );
        Ok(active)
    }

    /// Flips a completion; returns whether the chore is now done.
    ///
    /// Only chores the person owes on that date can be marked done. An
    /// existing mark can always be cleared.
    pub fn toggle_completion(&mut self, person: &str, task: &str, date: NaiveDate) -> Result<bool> {
        let person = self.find_person(person)?.clone();
        let task = self.find_task(task)?.clone();
        let iso_date = IsoDate::new(date);

        let owed = self.overrides.is_task_active(date, &task.id, &self.tasks)
            && assign::is_task_active_for_person_on_day(&task, &person.id, &self.persons, date);
        if !owed && !self.ledger.is_completed(&person.id, &task.id, iso_date) {
            return Err(Error::NotAssigned {
                person: person.name,
                task: task.name,
                date: iso_date.to_string(),
            });
        }

        let done = self.ledger.toggle(&person.id, &task.id, iso_date);
        tracing::debug!(person = %person.id, task = %task.id, date = %iso_date, done, "toggled completion");
        Ok(done)
    }

    pub fn effective_tasks(&self, date: NaiveDate) -> Vec<&Task> {
        self.overrides.effective_tasks(date, &self.tasks)
    }

    /// Resolved assignments for `date`, limited to the week's active tasks.
    pub fn plan_for_day(&self, date: NaiveDate) -> DayPlan<'_> {
        DayPlan {
            date: IsoDate::new(date),
            assignments: assign::assignments_for_day(self.effective_tasks(date), &self.persons, date),
        }
    }

    pub fn plan_for_week(&self, date: NaiveDate) -> Vec<DayPlan<'_>> {
        calendar::week_days(calendar::start_of_week(date))
            .into_iter()
            .map(|day| self.plan_for_day(day))
            .collect()
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    pub fn period_stats(&self, period: StatsPeriod, reference: NaiveDate, today: NaiveDate) -> PeriodReport {
        let (start, end) = period.bounds(reference);
        let stats: PeriodStats = stats::compute_period_stats(
            &self.persons,
            &self.tasks,
            &self.ledger,
            start,
            end,
            &self.overrides,
            today,
        );
        PeriodReport {
            period,
            label: period.label(),
            start: IsoDate::new(start),
            end: IsoDate::from(end),
            stats,
        }
    }

    /// Week, month and year statistics around `reference`.
    pub fn period_overview(&self, reference: NaiveDate, today: NaiveDate) -> Vec<PeriodReport> {
        StatsPeriod::ALL
            .iter()
            .map(|period| self.period_stats(*period, reference, today))
            .collect()
    }

    pub fn day_summaries(&self, week_start: NaiveDate, audience: Option<&str>, today: NaiveDate) -> Vec<DaySummary> {
        stats::day_summaries(
            &self.persons,
            &self.tasks,
            &self.ledger,
            &self.overrides,
            week_start,
            audience,
            today,
        )
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn clean_name(raw: &str, what: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(Error::InvalidArgument(format!("{what} name cannot be empty")));
    }
    Ok(name.to_string())
}

fn unique_name_match<'a>(names: impl Iterator<Item = &'a str>, query: &str) -> Result<Option<usize>> {
    let wanted = query.to_lowercase();
    let matches: Vec<usize> = names
        .enumerate()
        .filter(|(_, name)| name.to_lowercase() == wanted)
        .map(|(idx, _)| idx)
        .collect();
    match matches.as_slice() {
        [] => Ok(None),
        [idx] => Ok(Some(*idx)),
        _ => Err(Error::InvalidArgument(format!(
            "'{query}' matches {} entries; use the id instead",
            matches.len()
        ))),
    }
}

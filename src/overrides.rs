//! Per-week task activation overrides.
//!
//! A week without an override has every task active. An override narrows the
//! week to the listed task ids; ids of deleted tasks are ignored, and an
//! override that ends up naming no existing task behaves like no override at
//! all. Overrides equivalent to "every task" are pruned.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate, Weekday};

use crate::calendar::{self, IsoDate};
use crate::household::Task;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekOverrides {
    weeks: BTreeMap<IsoDate, BTreeSet<String>>,
}

impl WeekOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw override for the week starting at `week_start`, if any.
    pub fn get(&self, week_start: NaiveDate) -> Option<&BTreeSet<String>> {
        self.weeks.get(&IsoDate::new(week_start))
    }

    pub fn set(&mut self, week_start: NaiveDate, task_ids: impl IntoIterator<Item = String>) {
        self.weeks
            .insert(IsoDate::new(calendar::start_of_week(week_start)), task_ids.into_iter().collect());
    }

    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    /// Tasks active in the week containing `date`, in task order.
    pub fn effective_tasks<'a>(&self, date: NaiveDate, tasks: &'a [Task]) -> Vec<&'a Task> {
        let narrowed: Vec<&Task> = match self.get(calendar::start_of_week(date)) {
            Some(ids) if !ids.is_empty() => tasks.iter().filter(|task| ids.contains(&task.id)).collect(),
            _ => Vec::new(),
        };
        if narrowed.is_empty() {
            tasks.iter().collect()
        } else {
            narrowed
        }
    }

    /// Whether `task_id` is an existing task active in the week of `date`.
    pub fn is_task_active(&self, date: NaiveDate, task_id: &str, tasks: &[Task]) -> bool {
        self.effective_tasks(date, tasks)
            .iter()
            .any(|task| task.id == task_id)
    }

    /// Flips `task_id` for the week containing `date`; returns its new state.
    pub fn toggle_task(&mut self, date: NaiveDate, task_id: &str, tasks: &[Task]) -> bool {
        let key = IsoDate::new(calendar::start_of_week(date));
        let mut active: BTreeSet<String> = self
            .effective_tasks(key.date(), tasks)
            .into_iter()
            .map(|task| task.id.clone())
            .collect();

        if !active.remove(task_id) {
            active.insert(task_id.to_string());
        }

        self.weeks.insert(key, active);
        self.prune(tasks);
        // Switching off the last active task empties the override, which
        // resolves to every task again.
        self.is_task_active(key.date(), task_id, tasks)
    }

    /// Adds a newly created task to every existing override so the week keeps
    /// meaning "these tasks plus anything new".
    pub fn include_task(&mut self, task_id: &str) {
        for ids in self.weeks.values_mut() {
            ids.insert(task_id.to_string());
        }
    }

    /// Drops `task_id` from every override.
    pub fn remove_task(&mut self, task_id: &str, tasks: &[Task]) {
        for ids in self.weeks.values_mut() {
            ids.remove(task_id);
        }
        self.prune(tasks);
    }

    /// Removes overrides that resolve to every task anyway.
    pub fn prune(&mut self, tasks: &[Task]) {
        self.weeks.retain(|_, ids| {
            let known = tasks.iter().filter(|task| ids.contains(&task.id)).count();
            known != 0 && known != tasks.len()
        });
    }

    /// Builds overrides from their persisted map.
    ///
    /// Keys that are not the ISO date of a Monday can never match a week and
    /// are returned for reporting instead of being loaded.
    pub fn from_map(map: &BTreeMap<String, Vec<String>>) -> (Self, Vec<String>) {
        let mut overrides = Self::new();
        let mut rejected = Vec::new();
        for (key, ids) in map {
            match key.parse::<IsoDate>() {
                Ok(week) if week.date().weekday() == Weekday::Mon => {
                    overrides.weeks.insert(week, ids.iter().cloned().collect());
                }
                _ => rejected.push(key.clone()),
            }
        }
        (overrides, rejected)
    }

    pub fn to_map(&self) -> BTreeMap<String, Vec<String>> {
        self.weeks
            .iter()
            .map(|(week, ids)| (week.to_string(), ids.iter().cloned().collect()))
            .collect()
    }
}

//! Completion statistics over calendar periods.
//!
//! Possible work is re-derived day by day from the configuration that
//! applies on that day: the week's active tasks and each task's assignment on
//! that date. A ledger entry only counts when it matches such a unit, so
//! entries left behind by removed persons, removed tasks or changed
//! schedules never inflate the numbers.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::assign;
use crate::calendar::{self, IsoDate};
use crate::error::{Error, Result};
use crate::household::{Person, Task};
use crate::ledger::CompletionLedger;
use crate::overrides::WeekOverrides;

#[derive(Debug, Clone, Serialize)]
pub struct PersonStats {
    pub person: Person,
    pub completed: u64,
    pub total: u64,
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskStats {
    pub task: Task,
    pub completed: u64,
}

/// Aggregated completion numbers for one date range.
///
/// `per_person` and `per_task` follow roster and task order.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodStats {
    pub completed: u64,
    pub total_possible: u64,
    pub completion_rate: f64,
    pub per_person: Vec<PersonStats>,
    pub per_task: Vec<TaskStats>,
}

impl PeriodStats {
    fn empty(roster: &[Person], tasks: &[Task]) -> Self {
        Self {
            completed: 0,
            total_possible: 0,
            completion_rate: 0.0,
            per_person: roster
                .iter()
                .map(|person| PersonStats {
                    person: person.clone(),
                    completed: 0,
                    total: 0,
                    rate: 0.0,
                })
                .collect(),
            per_task: tasks
                .iter()
                .map(|task| TaskStats {
                    task: task.clone(),
                    completed: 0,
                })
                .collect(),
        }
    }

    /// Tasks ordered by completions, most completed first.
    pub fn popular_tasks(&self) -> Vec<&TaskStats> {
        let mut ranked: Vec<&TaskStats> = self.per_task.iter().collect();
        ranked.sort_by(|left, right| right.completed.cmp(&left.completed));
        ranked
    }
}

/// Rolls up the ledger over `start..=end`, with `end` capped at the end of
/// `today`.
pub fn compute_period_stats(
    roster: &[Person],
    tasks: &[Task],
    ledger: &CompletionLedger,
    start: NaiveDate,
    end: NaiveDateTime,
    overrides: &WeekOverrides,
    today: NaiveDate,
) -> PeriodStats {
    let capped_end = calendar::clamp_range_end_to_today(end, today).date();
    if tasks.is_empty() || capped_end < start {
        return PeriodStats::empty(roster, tasks);
    }

    let mut total_possible = 0u64;
    let mut person_totals: HashMap<&str, u64> = HashMap::new();
    for day in start.iter_days().take_while(|day| *day <= capped_end) {
        for task in overrides.effective_tasks(day, tasks) {
            for person_id in assign::assigned_person_ids(task, roster, day) {
                total_possible += 1;
                *person_totals.entry(person_id).or_insert(0) += 1;
            }
        }
    }

    let task_by_id: HashMap<&str, &Task> = tasks.iter().map(|task| (task.id.as_str(), task)).collect();
    let roster_ids: HashSet<&str> = roster.iter().map(|person| person.id.as_str()).collect();

    let mut completed = 0u64;
    let mut person_completed: HashMap<&str, u64> = HashMap::new();
    let mut task_completed: HashMap<&str, u64> = HashMap::new();
    for entry in ledger.entries_in_range(start, capped_end) {
        let Some(task) = task_by_id.get(entry.task_id.as_str()) else {
            continue;
        };
        if !roster_ids.contains(entry.person_id.as_str()) {
            continue;
        }
        let day = entry.iso_date.date();
        if !overrides.is_task_active(day, &task.id, tasks) {
            continue;
        }
        if !assign::is_task_active_for_person_on_day(task, &entry.person_id, roster, day) {
            continue;
        }

        completed += 1;
        *person_completed.entry(entry.person_id.as_str()).or_insert(0) += 1;
        *task_completed.entry(task.id.as_str()).or_insert(0) += 1;
    }

    let per_person = roster
        .iter()
        .map(|person| {
            let done = person_completed.get(person.id.as_str()).copied().unwrap_or(0);
            let total = person_totals.get(person.id.as_str()).copied().unwrap_or(0);
            PersonStats {
                person: person.clone(),
                completed: done,
                total,
                rate: ratio(done, total),
            }
        })
        .collect();

    let per_task = tasks
        .iter()
        .map(|task| TaskStats {
            task: task.clone(),
            completed: task_completed.get(task.id.as_str()).copied().unwrap_or(0),
        })
        .collect();

    PeriodStats {
        completed,
        total_possible,
        completion_rate: ratio(completed, total_possible),
        per_person,
        per_task,
    }
}

/// Progress for one day of a week plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub iso_date: IsoDate,
    pub completed: u64,
    pub total: u64,
    pub rate: f64,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub completed: u64,
    pub total: u64,
    pub rate: f64,
}

/// Per-day progress for the week starting at `week_start`.
///
/// Only units owed by persons in `audience` are counted; `None` counts the
/// whole household. Unlike [`compute_period_stats`], future days are
/// included so a week plan shows its full workload.
pub fn day_summaries(
    roster: &[Person],
    tasks: &[Task],
    ledger: &CompletionLedger,
    overrides: &WeekOverrides,
    week_start: NaiveDate,
    audience: Option<&str>,
    today: NaiveDate,
) -> Vec<DaySummary> {
    calendar::week_days(calendar::start_of_week(week_start))
        .into_iter()
        .map(|day| {
            let iso_date = IsoDate::new(day);
            let mut completed = 0u64;
            let mut total = 0u64;
            for task in overrides.effective_tasks(day, tasks) {
                for person_id in assign::assigned_person_ids(task, roster, day) {
                    if audience.is_some_and(|wanted| wanted != person_id) {
                        continue;
                    }
                    total += 1;
                    if ledger.is_completed(person_id, &task.id, iso_date) {
                        completed += 1;
                    }
                }
            }
            DaySummary {
                iso_date,
                completed,
                total,
                rate: ratio(completed, total),
                is_today: day == today,
            }
        })
        .collect()
}

pub fn weekly_summary(days: &[DaySummary]) -> WeeklySummary {
    let completed = days.iter().map(|day| day.completed).sum();
    let total = days.iter().map(|day| day.total).sum();
    WeeklySummary {
        completed,
        total,
        rate: ratio(completed, total),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    Week,
    Month,
    Year,
}

impl StatsPeriod {
    pub const ALL: [StatsPeriod; 3] = [StatsPeriod::Week, StatsPeriod::Month, StatsPeriod::Year];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatsPeriod::Week => "week",
            StatsPeriod::Month => "month",
            StatsPeriod::Year => "year",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatsPeriod::Week => "This week",
            StatsPeriod::Month => "This month",
            StatsPeriod::Year => "This year",
        }
    }

    /// First day and inclusive end of the period containing `reference`.
    pub fn bounds(&self, reference: NaiveDate) -> (NaiveDate, NaiveDateTime) {
        match self {
            StatsPeriod::Week => {
                let start = calendar::start_of_week(reference);
                (start, calendar::end_of_day(calendar::add_days(start, 6)))
            }
            StatsPeriod::Month => (
                calendar::start_of_month(reference),
                calendar::end_of_month(reference),
            ),
            StatsPeriod::Year => (
                calendar::start_of_year(reference),
                calendar::end_of_year(reference),
            ),
        }
    }
}

impl fmt::Display for StatsPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatsPeriod {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(StatsPeriod::Week),
            "month" => Ok(StatsPeriod::Month),
            "year" => Ok(StatsPeriod::Year),
            other => Err(Error::InvalidArgument(format!(
                "invalid period '{other}' (expected week|month|year)"
            ))),
        }
    }
}

/// Statistics for one named period.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodReport {
    pub period: StatsPeriod,
    pub label: &'static str,
    pub start: IsoDate,
    pub end: IsoDate,
    pub stats: PeriodStats,
}

/// Encouragement tier for a completion rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Superstar,
    RocketTeam,
    HappyCrew,
    SteadySnail,
}

impl Rating {
    const LEVELS: [(f64, Rating); 4] = [
        (0.9, Rating::Superstar),
        (0.6, Rating::RocketTeam),
        (0.3, Rating::HappyCrew),
        (0.0, Rating::SteadySnail),
    ];

    pub fn for_rate(rate: f64) -> Self {
        Self::LEVELS
            .iter()
            .find(|(threshold, _)| rate >= *threshold)
            .map(|(_, rating)| *rating)
            .unwrap_or(Rating::SteadySnail)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Rating::Superstar => "Superstar",
            Rating::RocketTeam => "Rocket team",
            Rating::HappyCrew => "Happy crew",
            Rating::SteadySnail => "Steady snail",
        }
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Formats a rate as a whole percentage, e.g. `0.456` as `46%`.
pub fn format_rate(rate: f64) -> String {
    format!("{}%", (rate * 100.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::end_of_day;
    use crate::household::{ActiveDays, Assignment, PersonTheme, Schedule};

    fn date(raw: &str) -> NaiveDate {
        raw.parse::<IsoDate>().expect("date").date()
    }

    fn roster() -> Vec<Person> {
        vec![
            Person::new("a", "Alice", PersonTheme::Indigo),
            Person::new("b", "Bob", PersonTheme::Pink),
        ]
    }

    fn task(id: &str, assignment: Assignment) -> Task {
        Task::new(id, id).with_schedule(Schedule {
            days: ActiveDays::every_day(),
            assignment,
        })
    }

    const FAR_FUTURE: &str = "2030-01-01";

    #[test]
    fn empty_task_list_yields_zero_rate() {
        let stats = compute_period_stats(
            &roster(),
            &[],
            &CompletionLedger::new(),
            date("2024-01-01"),
            end_of_day(date("2024-12-31")),
            &WeekOverrides::new(),
            date(FAR_FUTURE),
        );
        assert_eq!(stats.total_possible, 0);
        assert_eq!(stats.completion_rate, 0.0);
        assert!(!stats.completion_rate.is_nan());
        assert_eq!(stats.per_person.len(), 2);
        assert!(stats.per_person.iter().all(|row| row.rate == 0.0));
    }

    #[test]
    fn one_task_override_week_counts_fourteen_units() {
        let tasks = vec![task("t", Assignment::All), task("u", Assignment::All)];
        let mut overrides = WeekOverrides::new();
        overrides.set(date("2024-01-01"), ["t".to_string()]);

        let stats = compute_period_stats(
            &roster(),
            &tasks,
            &CompletionLedger::new(),
            date("2024-01-01"),
            end_of_day(date("2024-01-07")),
            &overrides,
            date(FAR_FUTURE),
        );
        assert_eq!(stats.total_possible, 14);
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.completion_rate, 0.0);
        assert_eq!(stats.per_person[0].total, 7);
        assert_eq!(stats.per_person[1].total, 7);
    }

    #[test]
    fn future_days_are_not_counted() {
        let tasks = vec![task("t", Assignment::All)];
        let (start, end) = StatsPeriod::Month.bounds(date("2024-03-10"));
        let stats = compute_period_stats(
            &roster(),
            &tasks,
            &CompletionLedger::new(),
            start,
            end,
            &WeekOverrides::new(),
            date("2024-03-10"),
        );
        assert_eq!(stats.total_possible, 10 * 2);
    }

    #[test]
    fn range_entirely_in_future_is_zero() {
        let tasks = vec![task("t", Assignment::All)];
        let stats = compute_period_stats(
            &roster(),
            &tasks,
            &CompletionLedger::new(),
            date("2024-04-01"),
            end_of_day(date("2024-04-30")),
            &WeekOverrides::new(),
            date("2024-03-10"),
        );
        assert_eq!(stats.total_possible, 0);
        assert_eq!(stats.per_task.len(), 1);
        assert_eq!(stats.per_task[0].completed, 0);
    }

    #[test]
    fn only_valid_completions_count() {
        let roster = roster();
        let tasks = vec![
            task(
                "rotating",
                Assignment::Alternate {
                    anchor: Some("a".to_string()),
                },
            ),
            task("shared", Assignment::All),
        ];
        let monday = IsoDate::new(date("2024-01-01"));
        let tuesday = IsoDate::new(date("2024-01-02"));

        let mut ledger = CompletionLedger::new();
        ledger.toggle("a", "rotating", monday); // valid: a owns Monday
        ledger.toggle("b", "rotating", monday); // b is not on duty
        ledger.toggle("b", "rotating", tuesday); // valid
        ledger.toggle("a", "shared", tuesday); // valid
        ledger.toggle("ghost", "shared", tuesday); // removed person
        ledger.toggle("a", "deleted", tuesday); // removed task
        ledger.toggle("a", "shared", IsoDate::new(date("2024-01-09"))); // outside range

        let stats = compute_period_stats(
            &roster,
            &tasks,
            &ledger,
            date("2024-01-01"),
            end_of_day(date("2024-01-02")),
            &WeekOverrides::new(),
            date(FAR_FUTURE),
        );

        // rotating: 1 unit per day, shared: 2 units per day
        assert_eq!(stats.total_possible, 6);
        assert_eq!(stats.completed, 3);
        assert_eq!(stats.completion_rate, 0.5);
        assert_eq!(stats.per_person[0].completed, 2);
        assert_eq!(stats.per_person[0].total, 3);
        assert_eq!(stats.per_person[1].completed, 1);
        assert_eq!(stats.per_task[0].completed, 2);
        assert_eq!(stats.per_task[1].completed, 1);
        assert_eq!(stats.popular_tasks()[0].task.id, "rotating");
    }

    #[test]
    fn completions_in_deactivated_weeks_are_ignored() {
        let tasks = vec![task("t", Assignment::All), task("u", Assignment::All)];
        let mut overrides = WeekOverrides::new();
        overrides.set(date("2024-01-01"), ["t".to_string()]);
        let mut ledger = CompletionLedger::new();
        ledger.toggle("a", "u", IsoDate::new(date("2024-01-03")));
        ledger.toggle("a", "t", IsoDate::new(date("2024-01-03")));

        let stats = compute_period_stats(
            &roster(),
            &tasks,
            &ledger,
            date("2024-01-01"),
            end_of_day(date("2024-01-07")),
            &overrides,
            date(FAR_FUTURE),
        );
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.per_task[1].completed, 0);
    }

    #[test]
    fn day_summaries_cover_week_and_flag_today() {
        let roster = roster();
        let tasks = vec![task(
            "rotating",
            Assignment::Alternate {
                anchor: Some("a".to_string()),
            },
        )];
        let mut ledger = CompletionLedger::new();
        ledger.toggle("a", "rotating", IsoDate::new(date("2024-01-01")));

        let days = day_summaries(
            &roster,
            &tasks,
            &ledger,
            &WeekOverrides::new(),
            date("2024-01-03"),
            None,
            date("2024-01-02"),
        );
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].iso_date.to_string(), "2024-01-01");
        assert_eq!(days[0].completed, 1);
        assert_eq!(days[0].rate, 1.0);
        assert!(days[1].is_today);
        assert!(days.iter().all(|day| day.total == 1));

        let week = weekly_summary(&days);
        assert_eq!(week.completed, 1);
        assert_eq!(week.total, 7);

        let bob = day_summaries(
            &roster,
            &tasks,
            &ledger,
            &WeekOverrides::new(),
            date("2024-01-01"),
            Some("b"),
            date("2024-01-02"),
        );
        assert_eq!(weekly_summary(&bob).total, 3);
        assert_eq!(weekly_summary(&bob).completed, 0);
    }

    #[test]
    fn period_bounds() {
        let reference = date("2024-02-14");
        assert_eq!(
            StatsPeriod::Week.bounds(reference),
            (date("2024-02-12"), end_of_day(date("2024-02-18")))
        );
        assert_eq!(
            StatsPeriod::Month.bounds(reference),
            (date("2024-02-01"), end_of_day(date("2024-02-29")))
        );
        assert_eq!(
            StatsPeriod::Year.bounds(reference),
            (date("2024-01-01"), end_of_day(date("2024-12-31")))
        );
    }

    #[test]
    fn ratings_follow_thresholds() {
        assert_eq!(Rating::for_rate(1.0), Rating::Superstar);
        assert_eq!(Rating::for_rate(0.9), Rating::Superstar);
        assert_eq!(Rating::for_rate(0.75), Rating::RocketTeam);
        assert_eq!(Rating::for_rate(0.3), Rating::HappyCrew);
        assert_eq!(Rating::for_rate(0.0), Rating::SteadySnail);
        assert_eq!(format_rate(0.456), "46%");
    }
}

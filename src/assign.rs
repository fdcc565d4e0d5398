//! Assignment resolution: who owes a task on a given calendar day.
//!
//! Resolution never fails. References to persons that are no longer in the
//! roster resolve to nobody. Alternate rotation is keyed on the absolute
//! number of days since [`calendar::ROTATION_EPOCH`], so every date maps to
//! the same person regardless of which week or period it is viewed from.

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar::{self, IsoDate};
use crate::household::{Assignment, Person, Task};

/// Ids of the persons responsible for `task` on `date`, in roster order.
///
/// Every returned id borrows from `roster`, so the result never contains
/// persons that are not currently in the household.
pub fn assigned_person_ids<'a>(task: &Task, roster: &'a [Person], date: NaiveDate) -> Vec<&'a str> {
    if !task.schedule.days.is_active(calendar::day_index(date)) {
        return Vec::new();
    }

    match &task.schedule.assignment {
        Assignment::All => roster.iter().map(|person| person.id.as_str()).collect(),
        Assignment::Person { assignee } => assignee
            .as_deref()
            .and_then(|id| roster.iter().find(|person| person.id == id))
            .map(|person| vec![person.id.as_str()])
            .unwrap_or_default(),
        Assignment::Alternate { anchor } => rotation_pick(anchor.as_deref(), roster, date)
            .map(|person| vec![person.id.as_str()])
            .unwrap_or_default(),
    }
}

/// Whether `person_id` owes `task` on `date`.
pub fn is_task_active_for_person_on_day(
    task: &Task,
    person_id: &str,
    roster: &[Person],
    date: NaiveDate,
) -> bool {
    assigned_person_ids(task, roster, date).contains(&person_id)
}

/// Whether anybody owes `task` on `date`.
pub fn has_any_assignment_on_day(task: &Task, roster: &[Person], date: NaiveDate) -> bool {
    !assigned_person_ids(task, roster, date).is_empty()
}

fn rotation_pick<'a>(anchor: Option<&str>, roster: &'a [Person], date: NaiveDate) -> Option<&'a Person> {
    if roster.is_empty() {
        return None;
    }

    let anchor_idx = anchor
        .and_then(|id| roster.iter().position(|person| person.id == id))
        .unwrap_or(0);
    let len = roster.len() as i64;
    let offset = calendar::days_since_epoch(date).rem_euclid(len);
    roster.get(((anchor_idx as i64 + offset) % len) as usize)
}

/// One task and the persons owing it on a specific day.
#[derive(Debug, Clone, Serialize)]
pub struct TaskAssignment<'a> {
    pub task_id: &'a str,
    pub task_name: &'a str,
    pub person_ids: Vec<&'a str>,
}

/// Assignments for every task in `tasks` on `date`, skipping tasks nobody owes.
pub fn assignments_for_day<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    roster: &'a [Person],
    date: NaiveDate,
) -> Vec<TaskAssignment<'a>> {
    tasks
        .into_iter()
        .filter_map(|task| {
            let person_ids = assigned_person_ids(task, roster, date);
            if person_ids.is_empty() {
                return None;
            }
            Some(TaskAssignment {
                task_id: task.id.as_str(),
                task_name: task.name.as_str(),
                person_ids,
            })
        })
        .collect()
}

/// Resolved assignments for a whole day, as shown in a week plan.
#[derive(Debug, Clone, Serialize)]
pub struct DayPlan<'a> {
    pub date: IsoDate,
    pub assignments: Vec<TaskAssignment<'a>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::add_days;
    use crate::household::{ActiveDays, PersonTheme, Schedule};

    fn date(raw: &str) -> NaiveDate {
        raw.parse::<IsoDate>().expect("date").date()
    }

    fn roster() -> Vec<Person> {
        vec![
            Person::new("a", "Alice", PersonTheme::Indigo),
            Person::new("b", "Bob", PersonTheme::Pink),
        ]
    }

    fn task(assignment: Assignment) -> Task {
        Task::new("t", "Dishes").with_schedule(Schedule {
            days: ActiveDays::every_day(),
            assignment,
        })
    }

    fn alternate(anchor: &str) -> Task {
        task(Assignment::Alternate {
            anchor: Some(anchor.to_string()),
        })
    }

    #[test]
    fn alternate_rotates_from_epoch() {
        let roster = roster();
        let task = alternate("a");
        let epoch = date("2024-01-01");
        assert_eq!(assigned_person_ids(&task, &roster, epoch), vec!["a"]);
        assert_eq!(assigned_person_ids(&task, &roster, add_days(epoch, 1)), vec!["b"]);
        assert_eq!(assigned_person_ids(&task, &roster, add_days(epoch, 2)), vec!["a"]);
    }

    #[test]
    fn alternate_anchor_shifts_rotation() {
        let roster = roster();
        let epoch = date("2024-01-01");
        assert_eq!(assigned_person_ids(&alternate("b"), &roster, epoch), vec!["b"]);
        assert_eq!(
            assigned_person_ids(&alternate("b"), &roster, add_days(epoch, 1)),
            vec!["a"]
        );
    }

    #[test]
    fn alternate_is_stable_across_weeks() {
        let roster = vec![
            Person::new("a", "Alice", PersonTheme::Indigo),
            Person::new("b", "Bob", PersonTheme::Pink),
            Person::new("c", "Cleo", PersonTheme::Sky),
        ];
        let task = alternate("a");
        let monday = date("2024-01-01");
        let next_monday = add_days(monday, 7);

        assert_eq!(assigned_person_ids(&task, &roster, monday), vec!["a"]);
        // 7 % 3 == 1: same weekday, different person
        assert_eq!(assigned_person_ids(&task, &roster, next_monday), vec!["b"]);
        for _ in 0..3 {
            assert_eq!(assigned_person_ids(&task, &roster, next_monday), vec!["b"]);
        }
    }

    #[test]
    fn alternate_before_epoch_still_picks_one_person() {
        let roster = roster();
        let task = alternate("a");
        assert_eq!(assigned_person_ids(&task, &roster, date("2023-12-31")), vec!["b"]);
        assert_eq!(assigned_person_ids(&task, &roster, date("2023-12-30")), vec!["a"]);
    }

    #[test]
    fn alternate_with_missing_anchor_uses_first_person() {
        let roster = roster();
        let task = alternate("ghost");
        assert_eq!(assigned_person_ids(&task, &roster, date("2024-01-01")), vec!["a"]);
    }

    #[test]
    fn alternate_with_empty_roster_is_empty() {
        assert!(assigned_person_ids(&alternate("a"), &[], date("2024-01-01")).is_empty());
    }

    #[test]
    fn all_mode_returns_everyone_on_active_days() {
        let roster = roster();
        let mut task = task(Assignment::All);
        task.schedule.days = "mon,tue".parse().expect("days");

        assert_eq!(assigned_person_ids(&task, &roster, date("2024-01-01")), vec!["a", "b"]);
        assert_eq!(assigned_person_ids(&task, &roster, date("2024-01-02")), vec!["a", "b"]);
        assert!(assigned_person_ids(&task, &roster, date("2024-01-03")).is_empty());
    }

    #[test]
    fn inactive_day_gates_every_mode() {
        let roster = roster();
        let sunday = date("2024-01-07");
        let modes = [
            Assignment::All,
            Assignment::Alternate {
                anchor: Some("a".to_string()),
            },
            Assignment::Person {
                assignee: Some("b".to_string()),
            },
        ];
        for assignment in modes {
            let mut task = task(assignment);
            task.schedule.days = "mon,tue,wed,thu,fri,sat".parse().expect("days");
            assert!(assigned_person_ids(&task, &roster, sunday).is_empty());
        }
    }

    #[test]
    fn person_mode_resolves_only_present_person() {
        let roster = roster();
        let fixed = task(Assignment::Person {
            assignee: Some("b".to_string()),
        });
        assert_eq!(assigned_person_ids(&fixed, &roster, date("2024-01-05")), vec!["b"]);

        let removed = task(Assignment::Person {
            assignee: Some("ghost".to_string()),
        });
        assert!(assigned_person_ids(&removed, &roster, date("2024-01-05")).is_empty());

        let unset = task(Assignment::Person { assignee: None });
        assert!(assigned_person_ids(&unset, &roster, date("2024-01-05")).is_empty());
    }

    #[test]
    fn membership_helpers() {
        let roster = roster();
        let task = alternate("a");
        let epoch = date("2024-01-01");
        assert!(is_task_active_for_person_on_day(&task, "a", &roster, epoch));
        assert!(!is_task_active_for_person_on_day(&task, "b", &roster, epoch));
        assert!(has_any_assignment_on_day(&task, &roster, epoch));
        assert!(!has_any_assignment_on_day(&task, &[], epoch));
    }

    #[test]
    fn day_assignments_skip_unowned_tasks() {
        let roster = roster();
        let mut weekend_only = Task::new("w", "Garden");
        weekend_only.schedule.days = "sat,sun".parse().expect("days");
        let tasks = vec![alternate("a"), weekend_only];

        let plan = assignments_for_day(&tasks, &roster, date("2024-01-01"));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].task_id, "t");
        assert_eq!(plan[0].person_ids, vec!["a"]);
    }
}

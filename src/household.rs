//! Household data model: persons, tasks and their recurrence schedules.
//!
//! Persisted records (`Stored*`) may come from older snapshots with missing
//! or partial schedule fields. They are turned into the typed model exactly
//! once per load via [`Schedule::from_stored`], so the resolver and the
//! aggregator only ever see fully populated schedules.

use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of recurrence slots (Monday..Sunday).
pub const DAYS_PER_WEEK: usize = 7;

pub const DAY_NAMES: [&str; DAYS_PER_WEEK] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

/// Themes handed out to new persons, in allocation order.
pub const PERSON_THEMES: [PersonTheme; 8] = [
    PersonTheme::Indigo,
    PersonTheme::Pink,
    PersonTheme::Sky,
    PersonTheme::Orange,
    PersonTheme::Green,
    PersonTheme::Violet,
    PersonTheme::Teal,
    PersonTheme::Amber,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonTheme {
    Indigo,
    Pink,
    Sky,
    Orange,
    Green,
    Violet,
    Teal,
    Amber,
}

impl PersonTheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonTheme::Indigo => "indigo",
            PersonTheme::Pink => "pink",
            PersonTheme::Sky => "sky",
            PersonTheme::Orange => "orange",
            PersonTheme::Green => "green",
            PersonTheme::Violet => "violet",
            PersonTheme::Teal => "teal",
            PersonTheme::Amber => "amber",
        }
    }
}

impl fmt::Display for PersonTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First theme no existing person uses; cycles once all eight are taken.
pub fn pick_theme(existing: &[Person]) -> PersonTheme {
    PERSON_THEMES
        .iter()
        .copied()
        .find(|theme| !existing.iter().any(|person| person.theme == *theme))
        .unwrap_or(PERSON_THEMES[existing.len() % PERSON_THEMES.len()])
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub name: String,
    pub theme: PersonTheme,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl Person {
    pub fn new(id: impl Into<String>, name: impl Into<String>, theme: PersonTheme) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            theme,
            photo_url: None,
        }
    }
}

/// Which weekdays a task is active on; index 0 is Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActiveDays([bool; DAYS_PER_WEEK]);

impl ActiveDays {
    pub fn every_day() -> Self {
        Self([true; DAYS_PER_WEEK])
    }

    pub fn new(days: [bool; DAYS_PER_WEEK]) -> Self {
        Self(days)
    }

    /// Pads missing slots with `true` and drops anything past Sunday.
    pub fn from_slice(days: &[bool]) -> Self {
        Self(std::array::from_fn(|idx| days.get(idx).copied().unwrap_or(true)))
    }

    pub fn is_active(&self, day_index: usize) -> bool {
        self.0.get(day_index).copied().unwrap_or(false)
    }

    pub fn as_array(&self) -> [bool; DAYS_PER_WEEK] {
        self.0
    }

    pub fn active_count(&self) -> usize {
        self.0.iter().filter(|active| **active).count()
    }

    /// Comma-separated day names, or `all`/`none`.
    pub fn describe(&self) -> String {
        match self.active_count() {
            DAYS_PER_WEEK => "all".to_string(),
            0 => "none".to_string(),
            _ => DAY_NAMES
                .iter()
                .zip(self.0.iter())
                .filter(|(_, active)| **active)
                .map(|(name, _)| *name)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl Default for ActiveDays {
    fn default() -> Self {
        Self::every_day()
    }
}

impl FromStr for ActiveDays {
    type Err = Error;

    /// Parses `all`, `none`, or a comma list such as `mon,wed,friday`.
    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim().to_ascii_lowercase();
        match trimmed.as_str() {
            "all" => return Ok(Self::every_day()),
            "none" => return Ok(Self([false; DAYS_PER_WEEK])),
            _ => {}
        }

        let mut days = [false; DAYS_PER_WEEK];
        let mut named = false;
        for part in trimmed.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            let weekday = part
                .parse::<Weekday>()
                .map_err(|_| Error::InvalidArgument(format!("unknown weekday '{part}'")))?;
            days[weekday.num_days_from_monday() as usize] = true;
            named = true;
        }
        if !named {
            return Err(Error::InvalidArgument(
                "no weekdays given (use all, none, or a list like mon,wed,fri)".to_string(),
            ));
        }
        Ok(Self(days))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentMode {
    All,
    Alternate,
    Person,
}

impl AssignmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentMode::All => "all",
            AssignmentMode::Alternate => "alternate",
            AssignmentMode::Person => "person",
        }
    }
}

impl fmt::Display for AssignmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignmentMode {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(AssignmentMode::All),
            "alternate" | "rotate" => Ok(AssignmentMode::Alternate),
            "person" => Ok(AssignmentMode::Person),
            other => Err(Error::InvalidArgument(format!(
                "invalid assignment mode '{other}' (expected all|alternate|person)"
            ))),
        }
    }
}

/// Who owes a task on its active days.
///
/// The person ids are `None` only when the roster is empty at normalization
/// time; an empty `Person` assignment resolves to nobody, never to everyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Assignment {
    All,
    Alternate {
        anchor: Option<String>,
    },
    Person {
        assignee: Option<String>,
    },
}

impl Assignment {
    pub fn mode(&self) -> AssignmentMode {
        match self {
            Assignment::All => AssignmentMode::All,
            Assignment::Alternate { .. } => AssignmentMode::Alternate,
            Assignment::Person { .. } => AssignmentMode::Person,
        }
    }

    /// Re-validates person references against `roster`.
    pub fn normalized(&self, roster: &[Person]) -> Self {
        match self {
            Assignment::All => Assignment::All,
            Assignment::Alternate { anchor } => Assignment::Alternate {
                anchor: valid_or_first(anchor.as_deref(), roster),
            },
            Assignment::Person { assignee } => Assignment::Person {
                assignee: valid_or_first(assignee.as_deref(), roster),
            },
        }
    }
}

fn valid_or_first(id: Option<&str>, roster: &[Person]) -> Option<String> {
    id.filter(|id| roster.iter().any(|person| person.id == *id))
        .or_else(|| roster.first().map(|person| person.id.as_str()))
        .map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule {
    pub days: ActiveDays,
    pub assignment: Assignment,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            days: ActiveDays::every_day(),
            assignment: Assignment::All,
        }
    }
}

impl Schedule {
    /// Builds a typed schedule from a possibly partial persisted one.
    ///
    /// Absent schedules become the default (every day, everyone). Unknown
    /// assignment strings fall back to `all`.
    pub fn from_stored(stored: Option<&StoredSchedule>, roster: &[Person]) -> Self {
        let Some(stored) = stored else {
            return Self::default();
        };

        let days = stored
            .days
            .as_deref()
            .map(ActiveDays::from_slice)
            .unwrap_or_default();
        let mode = stored
            .assignment
            .as_deref()
            .and_then(|raw| raw.parse::<AssignmentMode>().ok())
            .unwrap_or(AssignmentMode::All);
        let assignment = match mode {
            AssignmentMode::All => Assignment::All,
            AssignmentMode::Alternate => Assignment::Alternate {
                anchor: stored.start_person_id.clone(),
            },
            AssignmentMode::Person => Assignment::Person {
                assignee: stored.person_id.clone(),
            },
        };

        Self {
            days,
            assignment: assignment.normalized(roster),
        }
    }

    pub fn to_stored(&self) -> StoredSchedule {
        let (start_person_id, person_id) = match &self.assignment {
            Assignment::All => (None, None),
            Assignment::Alternate { anchor } => (anchor.clone(), None),
            Assignment::Person { assignee } => (None, assignee.clone()),
        };
        StoredSchedule {
            days: Some(self.days.as_array().to_vec()),
            assignment: Some(self.assignment.mode().as_str().to_string()),
            start_person_id,
            person_id,
        }
    }

    /// Same schedule with person references fixed up for `roster`.
    pub fn normalized(&self, roster: &[Person]) -> Self {
        Self {
            days: self.days,
            assignment: self.assignment.normalized(roster),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub schedule: Schedule,
}

impl Task {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            schedule: Schedule::default(),
        }
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn from_stored(stored: &StoredTask, roster: &[Person]) -> Self {
        Self {
            id: stored.id.clone(),
            name: stored.name.clone(),
            schedule: Schedule::from_stored(stored.schedule.as_ref(), roster),
        }
    }

    pub fn to_stored(&self) -> StoredTask {
        StoredTask {
            id: self.id.clone(),
            name: self.name.clone(),
            schedule: Some(self.schedule.to_stored()),
        }
    }

    pub fn normalized(&self, roster: &[Person]) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            schedule: self.schedule.normalized(roster),
        }
    }
}

/// Persisted schedule; every field may be missing in older snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_person_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTask {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<StoredSchedule>,
}

//! Completion ledger: which (date, person, task) triples are marked done.
//!
//! Presence means completed; there are no "not done" entries. The ledger does
//! not know about rosters or schedules and keeps orphaned entries after a
//! roster or schedule change; the aggregator ignores entries that no longer
//! resolve.
//!
//! Persisted form is a map from `"{date}__{person}__{task}"` to `true`, the
//! same composite key every storage backend uses.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::calendar::IsoDate;
use crate::error::{Error, Result};

pub const KEY_SEPARATOR: &str = "__";

/// A single completion fact.
///
/// Field order defines the ordering: date first, so date ranges are
/// contiguous in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEntry {
    pub iso_date: IsoDate,
    pub person_id: String,
    pub task_id: String,
}

impl CompletionEntry {
    pub fn new(person_id: impl Into<String>, task_id: impl Into<String>, iso_date: IsoDate) -> Self {
        Self {
            iso_date,
            person_id: person_id.into(),
            task_id: task_id.into(),
        }
    }

    /// Composite storage key.
    pub fn key(&self) -> String {
        format!(
            "{}{KEY_SEPARATOR}{}{KEY_SEPARATOR}{}",
            self.iso_date, self.person_id, self.task_id
        )
    }

    pub fn parse_key(key: &str) -> Result<Self> {
        Self::parse_key_with(key, &[])
    }

    /// Parses a key, splitting person from task at a known person id.
    ///
    /// Ids may themselves contain the separator, so the first separator
    /// after the date is only used when no known person id matches. The
    /// longest matching id wins.
    pub fn parse_key_with(key: &str, person_ids: &[&str]) -> Result<Self> {
        let malformed = || Error::InvalidArgument(format!("malformed completion key '{key}'"));
        let (date, rest) = key.split_once(KEY_SEPARATOR).ok_or_else(malformed)?;

        let known = person_ids
            .iter()
            .filter_map(|person_id| {
                let task_id = rest.strip_prefix(person_id)?.strip_prefix(KEY_SEPARATOR)?;
                Some((*person_id, task_id))
            })
            .max_by_key(|(person_id, _)| person_id.len());
        let (person_id, task_id) = match known {
            Some(split) => split,
            None => rest.split_once(KEY_SEPARATOR).ok_or_else(malformed)?,
        };
        if person_id.is_empty() || task_id.is_empty() {
            return Err(malformed());
        }
        Ok(Self::new(person_id, task_id, date.parse()?))
    }

    /// Smallest possible entry on `date`, used as a range lower bound.
    fn first_on(iso_date: IsoDate) -> Self {
        Self::new(String::new(), String::new(), iso_date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionLedger {
    entries: BTreeSet<CompletionEntry>,
}

impl CompletionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the completion flag and returns the new state.
    pub fn toggle(&mut self, person_id: &str, task_id: &str, iso_date: IsoDate) -> bool {
        let entry = CompletionEntry::new(person_id, task_id, iso_date);
        if self.entries.remove(&entry) {
            false
        } else {
            self.entries.insert(entry);
            true
        }
    }

    pub fn is_completed(&self, person_id: &str, task_id: &str, iso_date: IsoDate) -> bool {
        self.entries
            .contains(&CompletionEntry::new(person_id, task_id, iso_date))
    }

    pub fn entries(&self) -> impl Iterator<Item = &CompletionEntry> {
        self.entries.iter()
    }

    /// Entries dated within `start..=end` (calendar days, inclusive).
    pub fn entries_in_range(
        &self,
        start: impl Into<IsoDate>,
        end: impl Into<IsoDate>,
    ) -> impl Iterator<Item = &CompletionEntry> {
        let start = start.into();
        let end = end.into();
        self.entries
            .range(CompletionEntry::first_on(start)..)
            .take_while(move |entry| entry.iso_date <= end)
    }

    /// Removes every entry for `person_id`; returns how many were removed.
    pub fn remove_all_for_person(&mut self, person_id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.person_id != person_id);
        before - self.entries.len()
    }

    /// Removes every entry for `task_id`; returns how many were removed.
    pub fn remove_all_for_task(&mut self, task_id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.task_id != task_id);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds a ledger from its persisted map.
    ///
    /// Keys mapped to `false` are treated as absent. Keys that do not parse
    /// are returned so the caller can report them. `person_ids` resolves keys
    /// whose ids contain the separator.
    pub fn from_map(map: &BTreeMap<String, bool>, person_ids: &[&str]) -> (Self, Vec<String>) {
        let mut ledger = Self::new();
        let mut rejected = Vec::new();
        for (key, done) in map {
            if !done {
                continue;
            }
            match CompletionEntry::parse_key_with(key, person_ids) {
                Ok(entry) => {
                    ledger.entries.insert(entry);
                }
                Err(_) => rejected.push(key.clone()),
            }
        }
        (ledger, rejected)
    }

    pub fn to_map(&self) -> BTreeMap<String, bool> {
        self.entries
            .iter()
            .map(|entry| (entry.key(), true))
            .collect()
    }
}

impl FromIterator<CompletionEntry> for CompletionLedger {
    fn from_iter<I: IntoIterator<Item = CompletionEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

//! weekplan person commands
//!
//! Roster management. Removing a person drops their completions and moves
//! rotations and fixed assignments that pointed at them to the first
//! remaining person.

use super::Context;
use crate::error::Result;
use crate::household::Person;
use crate::output::{emit_success, HumanOutput};

/// Options for `weekplan person add`
pub struct AddOptions {
    pub name: String,
}

/// Options for `weekplan person rm`
pub struct RmOptions {
    pub person: String,
}

/// Options for `weekplan person rename`
pub struct RenameOptions {
    pub person: String,
    pub name: String,
}

/// Options for `weekplan person photo`
pub struct PhotoOptions {
    pub person: String,
    pub url: Option<String>,
}

#[derive(serde::Serialize)]
struct PersonReport {
    person: Person,
}

#[derive(serde::Serialize)]
struct PersonListReport {
    persons: Vec<Person>,
}

fn person_human(header: String, person: &Person) -> HumanOutput {
    let mut human = HumanOutput::new(header);
    human.push_summary("id", person.id.clone());
    human.push_summary("name", person.name.clone());
    human.push_summary("theme", person.theme.to_string());
    if let Some(url) = &person.photo_url {
        human.push_summary("photo", url.clone());
    }
    human
}

pub fn run_add(ctx: &Context, options: AddOptions) -> Result<()> {
    let person = ctx
        .storage
        .update_household(|household| household.add_person(&options.name))?;

    let mut human = person_human(format!("weekplan person add: {}", person.name), &person);
    human.push_next_step("weekplan task schedule <task> --mode alternate");

    emit_success(ctx.output, "person add", &PersonReport { person }, Some(&human))
}

pub fn run_rm(ctx: &Context, options: RmOptions) -> Result<()> {
    let person = ctx
        .storage
        .update_household(|household| household.remove_person(&options.person))?;

    let human = person_human(format!("weekplan person rm: {}", person.name), &person);
    emit_success(ctx.output, "person rm", &PersonReport { person }, Some(&human))
}

pub fn run_rename(ctx: &Context, options: RenameOptions) -> Result<()> {
    let person = ctx
        .storage
        .update_household(|household| household.rename_person(&options.person, &options.name))?;

    let human = person_human(format!("weekplan person rename: {}", person.name), &person);
    emit_success(ctx.output, "person rename", &PersonReport { person }, Some(&human))
}

pub fn run_photo(ctx: &Context, options: PhotoOptions) -> Result<()> {
    let person = ctx
        .storage
        .update_household(|household| household.set_person_photo(&options.person, options.url))?;

    let header = if person.photo_url.is_some() {
        format!("weekplan person photo: set for {}", person.name)
    } else {
        format!("weekplan person photo: cleared for {}", person.name)
    };
    let human = person_human(header, &person);
    emit_success(ctx.output, "person photo", &PersonReport { person }, Some(&human))
}

pub fn run_list(ctx: &Context) -> Result<()> {
    let household = ctx.storage.load_household()?;

    let mut human = HumanOutput::new(format!("weekplan person list: {} person(s)", household.persons.len()));
    for person in &household.persons {
        human.push_detail(format!("{} ({}, {})", person.name, person.theme, person.id));
    }
    if household.persons.is_empty() {
        human.push_next_step("weekplan person add <name>");
    }

    let report = PersonListReport {
        persons: household.persons,
    };
    emit_success(ctx.output, "person list", &report, Some(&human))
}

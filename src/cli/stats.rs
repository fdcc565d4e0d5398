//! weekplan stats and summary commands

use serde::Serialize;

use super::Context;
use crate::calendar::{self, IsoDate};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::stats::{self, format_rate, DaySummary, PeriodReport, Rating, StatsPeriod, WeeklySummary};

/// Options for `weekplan stats`
pub struct StatsOptions {
    pub period: Option<String>,
}

/// Options for `weekplan summary`
pub struct SummaryOptions {
    pub person: Option<String>,
}

#[derive(Serialize)]
struct StatsReport {
    reference: IsoDate,
    periods: Vec<PeriodReport>,
}

#[derive(Serialize)]
struct SummaryReport {
    week_start: IsoDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    person: Option<String>,
    days: Vec<DaySummary>,
    week: WeeklySummary,
    rating: Rating,
}

pub fn run_stats(ctx: &Context, options: StatsOptions) -> Result<()> {
    let periods = match options.period.as_deref() {
        Some(raw) => vec![raw.parse::<StatsPeriod>()?],
        None => StatsPeriod::ALL.to_vec(),
    };
    let household = ctx.storage.load_household()?;
    let reports: Vec<PeriodReport> = periods
        .into_iter()
        .map(|period| household.period_stats(period, ctx.date, ctx.today))
        .collect();

    let mut human = HumanOutput::new(format!("weekplan stats: around {}", IsoDate::new(ctx.date)));
    for report in &reports {
        let stats = &report.stats;
        human.push_summary(
            report.label,
            format!(
                "{} of {} done ({}), {} to {}",
                stats.completed,
                stats.total_possible,
                format_rate(stats.completion_rate),
                report.start,
                report.end
            ),
        );
        for row in &stats.per_person {
            human.push_detail(format!(
                "{}: {}/{} ({}) {}",
                row.person.name,
                row.completed,
                row.total,
                format_rate(row.rate),
                report.period
            ));
        }
        if let Some(top) = stats.popular_tasks().first().filter(|row| row.completed > 0) {
            human.push_detail(format!("most done {}: {} ({})", report.period, top.task.name, top.completed));
        }
    }
    if household.tasks.is_empty() {
        human.push_warning("no chores yet; every rate is 0%");
        human.push_next_step("weekplan task add <name>");
    }

    let report = StatsReport {
        reference: IsoDate::new(ctx.date),
        periods: reports,
    };
    emit_success(ctx.output, "stats", &report, Some(&human))
}

pub fn run_summary(ctx: &Context, options: SummaryOptions) -> Result<()> {
    let household = ctx.storage.load_household()?;
    let audience = options
        .person
        .as_deref()
        .map(|query| household.find_person(query))
        .transpose()?;

    let week_start = calendar::start_of_week(ctx.date);
    let days = household.day_summaries(week_start, audience.map(|person| person.id.as_str()), ctx.today);
    let week = stats::weekly_summary(&days);
    let rating = Rating::for_rate(week.rate);

    let header = match audience {
        Some(person) => format!("weekplan summary: {} ({})", person.name, rating.title()),
        None => format!("weekplan summary: household ({})", rating.title()),
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("week", IsoDate::new(week_start).to_string());
    human.push_summary(
        "done",
        format!("{} of {} ({})", week.completed, week.total, format_rate(week.rate)),
    );
    for day in &days {
        let marker = if day.is_today { " (today)" } else { "" };
        human.push_detail(format!(
            "{}{marker}: {}/{} ({})",
            day.iso_date,
            day.completed,
            day.total,
            format_rate(day.rate)
        ));
    }

    let report = SummaryReport {
        week_start: IsoDate::new(week_start),
        person: audience.map(|person| person.id.clone()),
        days,
        week,
        rating,
    };
    emit_success(ctx.output, "summary", &report, Some(&human))
}

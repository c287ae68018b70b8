//! Command handlers. Each one works on a loaded [`EntryStore`] and prints to
//! stdout.

use std::{fs::File, io};

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use ledger::{
    CategoryPatch, EntryPatch, EntryStore, JournalType, LedgerRemote, LedgerSnapshot, NewCategory,
    NewEntry, Period, PeriodSummary, Window,
};

use crate::{
    config::{Command, Range},
    error::Result,
    export,
};

/// Settings every command needs.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    pub journal: JournalType,
    pub timezone: Tz,
    pub now: DateTime<Utc>,
}

pub async fn run<R: LedgerRemote>(
    store: &EntryStore<R>,
    ctx: Context,
    command: Command,
) -> Result<()> {
    match command {
        Command::Summary => {
            let snapshot = store.snapshot().await;
            let summaries = snapshot.period_summaries(ctx.journal, ctx.now, ctx.timezone);
            println!("{} journal", ctx.journal);
            for period in Period::ALL {
                print_summary(period.label(), summaries.get(period));
            }
        }
        Command::Entries(range) => {
            let snapshot = store.snapshot().await;
            let window = resolve_window(&range, ctx)?;
            for entry in snapshot.entries_for_period(ctx.journal, window) {
                let category = snapshot
                    .categories
                    .name_of(&entry.category_id)
                    .unwrap_or(ledger::FALLBACK_CATEGORY);
                println!(
                    "{}  {}  {:<7} {:>12}  {:<18} {}",
                    entry.id,
                    entry.date.with_timezone(&ctx.timezone).format("%Y-%m-%d %H:%M"),
                    entry.kind,
                    entry.amount.to_string(),
                    category,
                    entry.note.as_deref().unwrap_or("")
                );
            }
        }
        Command::Breakdown(range) => {
            let snapshot = store.snapshot().await;
            let window = resolve_window(&range, ctx)?;
            print_breakdown(&snapshot, ctx.journal, window);
        }
        Command::Add {
            kind,
            amount,
            category,
            note,
            date,
        } => {
            let date = match date {
                Some(day) => day_start(day, ctx.timezone)?,
                None => ctx.now,
            };
            let entry = store
                .add_entry(NewEntry {
                    date,
                    kind,
                    amount,
                    category_id: category,
                    note,
                    journal_type: ctx.journal,
                })
                .await?;
            tracing::info!(id = %entry.id, "entry saved");
            println!("{}", entry.id);
        }
        Command::Update {
            id,
            kind,
            amount,
            category,
            note,
            date,
        } => {
            let date = date.map(|day| day_start(day, ctx.timezone)).transpose()?;
            let entry = store
                .update_entry(
                    id,
                    EntryPatch {
                        date,
                        kind,
                        amount,
                        category_id: category,
                        note,
                    },
                )
                .await?;
            tracing::info!(id = %entry.id, revision = entry.revision, "entry updated");
        }
        Command::Remove { id } => {
            store.remove_entry(id).await?;
            tracing::info!(%id, "entry removed");
        }
        Command::Categories => {
            for category in store.categories().await {
                let origin = if category.is_custom { "custom" } else { "built-in" };
                println!(
                    "{:<38} {} {:<20} {:<8} {origin}",
                    category.id, category.icon, category.name, category.kind
                );
            }
        }
        Command::CategoryAdd { name, kind, icon } => {
            let category = store
                .create_category(NewCategory { name, icon, kind })
                .await?;
            println!("{}", category.id);
        }
        Command::CategoryUpdate {
            id,
            name,
            icon,
            kind,
        } => {
            let category = store
                .update_category(&id, CategoryPatch { name, icon, kind })
                .await?;
            tracing::info!(id = %category.id, "category updated");
        }
        Command::CategoryRemove { id } => {
            store.delete_category(&id).await?;
            tracing::info!(id, "category removed");
        }
        Command::Export { range, out } => {
            let snapshot = store.snapshot().await;
            let window = resolve_window(&range, ctx)?;
            let entries = snapshot.entries_for_period(ctx.journal, window);
            match out {
                Some(path) => {
                    let file = File::create(&path)?;
                    export::write_entries(file, &entries, &snapshot.categories, ctx.timezone)?;
                    tracing::info!(path, rows = entries.len(), "export written");
                }
                None => export::write_entries(
                    io::stdout().lock(),
                    &entries,
                    &snapshot.categories,
                    ctx.timezone,
                )?,
            }
        }
    }
    Ok(())
}

fn day_start(day: NaiveDate, tz: Tz) -> Result<DateTime<Utc>> {
    let window = Window::for_dates(day, day, tz)?;
    Ok(window.start.unwrap_or_else(Utc::now))
}

/// Explicit dates win; otherwise the canonical period (this month by default).
fn resolve_window(range: &Range, ctx: Context) -> Result<Window> {
    let window = match (range.from, range.to) {
        (Some(from), Some(to)) => Window::for_dates(from, to, ctx.timezone)?,
        (Some(from), None) => Window {
            start: Window::for_dates(from, from, ctx.timezone)?.start,
            end: None,
        },
        (None, Some(to)) => Window {
            start: None,
            end: Window::for_dates(to, to, ctx.timezone)?.end,
        },
        (None, None) => Window::for_period(
            range.period.unwrap_or(Period::Month),
            ctx.now,
            ctx.timezone,
        ),
    };
    Ok(window)
}

fn print_summary(label: &str, summary: PeriodSummary) {
    println!(
        "{label:<12} income {:>12}  expenses {:>12}  net {:>12}",
        summary.income.to_string(),
        summary.expenses.to_string(),
        summary.net.to_string()
    );
}

fn print_breakdown(snapshot: &LedgerSnapshot, journal: JournalType, window: Window) {
    let mut groups = snapshot.category_breakdown(journal, window);
    groups.sort_by(|a, b| b.total.cmp(&a.total));
    for group in &groups {
        println!("{:<24} {:>12}", group.category_name, group.total.to_string());
    }
    let expenses = snapshot.summary(journal, window).expenses;
    println!("{:<24} {:>12}", "total", expenses.to_string());
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn ctx() -> Context {
        Context {
            journal: JournalType::Personal,
            timezone: chrono_tz::UTC,
            now: Utc.with_ymd_and_hms(2024, 1, 17, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn default_window_is_current_month() {
        let range = Range {
            from: None,
            to: None,
            period: None,
        };
        let window = resolve_window(&range, ctx()).unwrap();
        assert_eq!(
            window.start,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn open_ended_ranges() {
        let range = Range {
            from: NaiveDate::from_ymd_opt(2024, 1, 10),
            to: None,
            period: Some(Period::Day),
        };
        let window = resolve_window(&range, ctx()).unwrap();
        assert_eq!(
            window.start,
            Some(Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap())
        );
        assert_eq!(window.end, None);

        let range = Range {
            from: NaiveDate::from_ymd_opt(2024, 2, 1),
            to: NaiveDate::from_ymd_opt(2024, 1, 1),
            period: None,
        };
        assert!(resolve_window(&range, ctx()).is_err());
    }

    #[test]
    fn day_start_uses_timezone() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(
            day_start(day, chrono_tz::Europe::Rome).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 4, 23, 0, 0).unwrap()
        );
    }
}

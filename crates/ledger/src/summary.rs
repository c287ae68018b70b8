//! Income/expense totals over date windows.
//!
//! Every function here re-scans the entry slice it is given: O(n) per call
//! with no memoization. That is fine for ledgers of a few thousand entries and
//! guarantees the totals always match the latest local state; a ledger that
//! grows well beyond that needs an index by date rather than a cache.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::{EntryKind, JournalEntry, JournalType, MoneyCents, Period, Window};

/// Totals for a set of entries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PeriodSummary {
    pub income: MoneyCents,
    pub expenses: MoneyCents,
    /// Always `income - expenses`.
    pub net: MoneyCents,
    /// Reserved, currently always zero.
    pub savings: MoneyCents,
    /// Reserved, currently always zero.
    pub investments: MoneyCents,
}

/// Entries of one journal whose date falls inside `window`.
pub fn entries_in_window(
    entries: &[JournalEntry],
    journal_type: JournalType,
    window: Window,
) -> Vec<&JournalEntry> {
    entries
        .iter()
        .filter(|entry| entry.journal_type == journal_type && window.contains(entry.date))
        .collect()
}

pub fn summarize<'a>(entries: impl IntoIterator<Item = &'a JournalEntry>) -> PeriodSummary {
    let (income, expenses) = entries.into_iter().fold(
        (MoneyCents::ZERO, MoneyCents::ZERO),
        |(income, expenses), entry| match entry.kind {
            EntryKind::Income => (income + entry.amount, expenses),
            EntryKind::Expense => (income, expenses + entry.amount),
        },
    );
    PeriodSummary {
        income,
        expenses,
        net: income - expenses,
        ..Default::default()
    }
}

pub fn summarize_window(
    entries: &[JournalEntry],
    journal_type: JournalType,
    window: Window,
) -> PeriodSummary {
    summarize(entries_in_window(entries, journal_type, window))
}

/// Summary of the whole journal, with no lower or upper bound.
pub fn all_time_summary(entries: &[JournalEntry], journal_type: JournalType) -> PeriodSummary {
    summarize_window(entries, journal_type, Window::all_time())
}

/// Summaries for today, this week, month, year and all time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PeriodSummaries {
    pub day: PeriodSummary,
    pub week: PeriodSummary,
    pub month: PeriodSummary,
    pub year: PeriodSummary,
    pub all_time: PeriodSummary,
}

impl PeriodSummaries {
    pub fn get(&self, period: Period) -> PeriodSummary {
        match period {
            Period::Day => self.day,
            Period::Week => self.week,
            Period::Month => self.month,
            Period::Year => self.year,
            Period::AllTime => self.all_time,
        }
    }
}

/// The five canonical summaries anchored to `now` in `tz`.
pub fn period_summaries(
    entries: &[JournalEntry],
    journal_type: JournalType,
    now: DateTime<Utc>,
    tz: Tz,
) -> PeriodSummaries {
    let of = |period| summarize_window(entries, journal_type, Window::for_period(period, now, tz));
    PeriodSummaries {
        day: of(Period::Day),
        week: of(Period::Week),
        month: of(Period::Month),
        year: of(Period::Year),
        all_time: of(Period::AllTime),
    }
}

//! Immutable views of a user session and the read-only query surface used by
//! reporting and export code.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::{
    CategoryRegistry, CategoryTotal, EntrySet, JournalEntry, JournalType, PeriodSummaries,
    PeriodSummary, Window, breakdown, summary,
};

/// Mutable session state owned by the store.
#[derive(Debug, Default)]
pub(crate) struct LedgerState {
    pub(crate) user_id: Option<String>,
    pub(crate) entries: EntrySet,
    pub(crate) categories: CategoryRegistry,
}

impl LedgerState {
    pub(crate) fn to_snapshot(&self, version: u64) -> LedgerSnapshot {
        LedgerSnapshot {
            version,
            user_id: self.user_id.clone(),
            entries: self.entries.clone(),
            categories: self.categories.clone(),
        }
    }
}

/// Entries and categories of one user at a given version.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub version: u64,
    pub user_id: Option<String>,
    pub entries: EntrySet,
    pub categories: CategoryRegistry,
}

impl LedgerSnapshot {
    pub fn entries_for_period(
        &self,
        journal_type: JournalType,
        window: Window,
    ) -> Vec<&JournalEntry> {
        summary::entries_in_window(self.entries.as_slice(), journal_type, window)
    }

    pub fn summary(&self, journal_type: JournalType, window: Window) -> PeriodSummary {
        summary::summarize_window(self.entries.as_slice(), journal_type, window)
    }

    pub fn all_time_summary(&self, journal_type: JournalType) -> PeriodSummary {
        summary::all_time_summary(self.entries.as_slice(), journal_type)
    }

    pub fn period_summaries(
        &self,
        journal_type: JournalType,
        now: DateTime<Utc>,
        tz: Tz,
    ) -> PeriodSummaries {
        summary::period_summaries(self.entries.as_slice(), journal_type, now, tz)
    }

    pub fn category_breakdown(
        &self,
        journal_type: JournalType,
        window: Window,
    ) -> Vec<CategoryTotal> {
        breakdown::breakdown(
            self.entries.as_slice(),
            &self.categories,
            journal_type,
            window,
        )
    }
}

//! Journal ledger engine.
//!
//! Keeps a local replica of a user's income/expense entries and categories in
//! sync with a remote persistence service ([`EntryStore`]), and computes
//! summaries and category breakdowns over date windows from read-only
//! [`LedgerSnapshot`]s.
//!
//! Entries are split into two journals ([`JournalType`]) that are never mixed
//! in any computation.

pub use breakdown::{CategoryTotal, FALLBACK_CATEGORY, breakdown};
pub use categories::{
    Category, CategoryKind, CategoryPatch, CategoryRegistry, NewCategory, builtin_categories,
};
pub use entry::{EntryKind, EntryPatch, EntrySet, JournalEntry, JournalType, NewEntry};
pub use error::{LedgerError, RemoteError};
pub use money::MoneyCents;
pub use remote::LedgerRemote;
pub use snapshot::LedgerSnapshot;
pub use store::EntryStore;
pub use summary::{
    PeriodSummaries, PeriodSummary, all_time_summary, entries_in_window, period_summaries,
    summarize, summarize_window,
};
pub use sync::{LedgerEvent, Mutation, SyncCoordinator};
pub use window::{Period, Window};

mod breakdown;
mod categories;
mod entry;
mod error;
mod money;
mod remote;
mod snapshot;
mod store;
mod summary;
mod sync;
mod util;
mod window;

pub type ResultLedger<T> = Result<T, LedgerError>;

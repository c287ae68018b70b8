//! Expense totals grouped by category name.

use std::collections::BTreeMap;

use crate::{
    CategoryRegistry, EntryKind, JournalEntry, JournalType, MoneyCents, Window,
    summary::entries_in_window,
};

/// Label used when an entry's category no longer resolves.
pub const FALLBACK_CATEGORY: &str = "Other";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category_name: String,
    pub total: MoneyCents,
}

/// Expenses of one journal inside `window`, grouped by category name.
///
/// Groups are returned in name order. Their totals add up to the expenses of
/// the same window.
pub fn breakdown(
    entries: &[JournalEntry],
    registry: &CategoryRegistry,
    journal_type: JournalType,
    window: Window,
) -> Vec<CategoryTotal> {
    let mut groups: BTreeMap<&str, MoneyCents> = BTreeMap::new();
    for entry in entries_in_window(entries, journal_type, window)
        .into_iter()
        .filter(|entry| entry.kind == EntryKind::Expense)
    {
        let name = registry
            .name_of(&entry.category_id)
            .unwrap_or(FALLBACK_CATEGORY);
        *groups.entry(name).or_default() += entry.amount;
    }

    groups
        .into_iter()
        .map(|(name, total)| CategoryTotal {
            category_name: name.to_string(),
            total,
        })
        .collect()
}

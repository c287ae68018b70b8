//! CSV export of journal entries.

use std::io::Write;

use chrono_tz::Tz;
use csv::Writer;
use ledger::{CategoryRegistry, FALLBACK_CATEGORY, JournalEntry};
use serde::Serialize;

use crate::error::Result;

#[derive(Serialize)]
struct ExportRow<'a> {
    date: String,
    journal: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    amount: String,
    category: &'a str,
    note: Option<&'a str>,
    id: String,
}

/// Write one row per entry, dates in `tz`.
pub fn write_entries<W: Write>(
    out: W,
    entries: &[&JournalEntry],
    categories: &CategoryRegistry,
    tz: Tz,
) -> Result<()> {
    let mut writer = Writer::from_writer(out);
    for entry in entries {
        writer.serialize(ExportRow {
            date: entry.date.with_timezone(&tz).to_rfc3339(),
            journal: entry.journal_type.as_str(),
            kind: entry.kind.as_str(),
            amount: entry.amount.to_string(),
            category: categories
                .name_of(&entry.category_id)
                .unwrap_or(FALLBACK_CATEGORY),
            note: entry.note.as_deref(),
            id: entry.id.to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

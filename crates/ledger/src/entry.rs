//! Journal entries and the in-memory entry set.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    CategoryRegistry, LedgerError, MoneyCents, ResultLedger, util::normalize_optional_text,
};

/// Direction of an entry. Amounts are always stored positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(LedgerError::Validation(format!("unknown entry type: {other}"))),
        }
    }
}

/// Each user keeps two independent ledgers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum JournalType {
    #[default]
    Personal,
    Business,
}

impl JournalType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Business => "business",
        }
    }
}

impl fmt::Display for JournalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for JournalType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "personal" => Ok(Self::Personal),
            "business" => Ok(Self::Business),
            other => Err(LedgerError::Validation(format!(
                "unknown journal type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JournalEntry {
    pub id: Uuid,
    /// When the financial event happened.
    pub date: DateTime<Utc>,
    pub kind: EntryKind,
    pub amount: MoneyCents,
    pub category_id: String,
    pub note: Option<String>,
    pub journal_type: JournalType,
    /// Record creation time, used for display ordering only.
    pub created_at: DateTime<Utc>,
    /// Remote write counter; `0` until the service acknowledged the record.
    pub revision: u64,
}

/// Input for [`EntryStore::add_entry`](crate::EntryStore::add_entry).
#[derive(Clone, Debug)]
pub struct NewEntry {
    pub date: DateTime<Utc>,
    pub kind: EntryKind,
    pub amount: MoneyCents,
    pub category_id: String,
    pub note: Option<String>,
    pub journal_type: JournalType,
}

impl NewEntry {
    pub(crate) fn into_entry(self, id: Uuid, created_at: DateTime<Utc>) -> JournalEntry {
        JournalEntry {
            id,
            date: self.date,
            kind: self.kind,
            amount: self.amount,
            category_id: self.category_id.trim().to_string(),
            note: normalize_optional_text(self.note.as_deref()),
            journal_type: self.journal_type,
            created_at,
            revision: 0,
        }
    }
}

/// Partial update of an entry. `None` leaves the field untouched; an empty
/// `note` clears it.
#[derive(Clone, Debug, Default)]
pub struct EntryPatch {
    pub date: Option<DateTime<Utc>>,
    pub kind: Option<EntryKind>,
    pub amount: Option<MoneyCents>,
    pub category_id: Option<String>,
    pub note: Option<String>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.kind.is_none()
            && self.amount.is_none()
            && self.category_id.is_none()
            && self.note.is_none()
    }

    /// The same patch with text fields in their stored form: `category_id`
    /// trimmed and a blank `note` turned into the empty string that clears it.
    pub fn normalized(&self) -> EntryPatch {
        EntryPatch {
            category_id: self
                .category_id
                .as_deref()
                .map(|id| id.trim().to_string()),
            note: self
                .note
                .as_deref()
                .map(|note| normalize_optional_text(Some(note)).unwrap_or_default()),
            ..self.clone()
        }
    }

    /// Returns the entry as it looks after the patch.
    pub fn apply(&self, entry: &JournalEntry) -> JournalEntry {
        let mut patched = entry.clone();
        if let Some(date) = self.date {
            patched.date = date;
        }
        if let Some(kind) = self.kind {
            patched.kind = kind;
        }
        if let Some(amount) = self.amount {
            patched.amount = amount;
        }
        if let Some(category_id) = &self.category_id {
            patched.category_id = category_id.trim().to_string();
        }
        if let Some(note) = &self.note {
            patched.note = normalize_optional_text(Some(note));
        }
        patched
    }
}

/// Check amount range and category compatibility of an entry.
pub(crate) fn validate_entry(
    entry: &JournalEntry,
    registry: &CategoryRegistry,
) -> ResultLedger<()> {
    if !entry.amount.is_positive() {
        return Err(LedgerError::Validation(format!(
            "amount must be > 0, got {}",
            entry.amount
        )));
    }
    if entry.amount > MoneyCents::MAX_ENTRY {
        return Err(LedgerError::Validation(format!(
            "amount must be at most {}, got {}",
            MoneyCents::MAX_ENTRY,
            entry.amount
        )));
    }
    registry.ensure_compatible(&entry.category_id, entry.kind)
}

/// The entries of one user, newest record first.
///
/// Ids are unique; all mutators keep the ordering on `created_at`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntrySet {
    entries: Vec<JournalEntry>,
}

impl EntrySet {
    /// Build a set from remote records. A repeated id keeps its last record.
    pub fn from_entries(entries: Vec<JournalEntry>) -> Self {
        let mut set = Self::default();
        for entry in entries {
            set.upsert(entry);
        }
        set
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn get(&self, id: Uuid) -> Option<&JournalEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    /// Number of entries that point at `category_id`.
    pub fn count_referencing(&self, category_id: &str) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.category_id == category_id)
            .count()
    }

    /// Insert or replace by id, returning the replaced record.
    pub(crate) fn upsert(&mut self, entry: JournalEntry) -> Option<JournalEntry> {
        let previous = self.remove(entry.id);
        let at = self
            .entries
            .partition_point(|existing| existing.created_at >= entry.created_at);
        self.entries.insert(at, entry);
        previous
    }

    pub(crate) fn remove(&mut self, id: Uuid) -> Option<JournalEntry> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index))
    }
}

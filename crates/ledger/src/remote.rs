//! Contract of the remote persistence service, as consumed by the store.

use std::future::Future;

use uuid::Uuid;

use crate::{Category, CategoryPatch, EntryPatch, JournalEntry, RemoteError};

/// Persistence service holding the authoritative copy of a user's ledger.
///
/// Every call carries the id of the user it acts for. Implementations report
/// failures as [`RemoteError`] and never retry.
pub trait LedgerRemote: Send + Sync {
    fn fetch_entries(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<JournalEntry>, RemoteError>> + Send;

    /// Store `entry` under its client generated id and return the canonical
    /// record.
    fn create_entry(
        &self,
        user_id: &str,
        entry: &JournalEntry,
    ) -> impl Future<Output = Result<JournalEntry, RemoteError>> + Send;

    /// Apply `patch` if the stored revision is still `base_revision`,
    /// otherwise fail with [`RemoteError::Conflict`].
    fn update_entry(
        &self,
        user_id: &str,
        id: Uuid,
        base_revision: u64,
        patch: &EntryPatch,
    ) -> impl Future<Output = Result<JournalEntry, RemoteError>> + Send;

    fn delete_entry(
        &self,
        user_id: &str,
        id: Uuid,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Custom categories only; built-ins are compiled in.
    fn fetch_categories(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<Category>, RemoteError>> + Send;

    fn create_category(
        &self,
        user_id: &str,
        category: &Category,
    ) -> impl Future<Output = Result<Category, RemoteError>> + Send;

    fn update_category(
        &self,
        user_id: &str,
        id: &str,
        patch: &CategoryPatch,
    ) -> impl Future<Output = Result<Category, RemoteError>> + Send;

    fn delete_category(
        &self,
        user_id: &str,
        id: &str,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;
}

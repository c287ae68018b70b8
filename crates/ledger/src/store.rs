//! Session store: local replica of a user's entries and categories kept in
//! sync with a [`LedgerRemote`].
//!
//! Mutations are optimistic. The change is validated and applied locally,
//! then sent to the remote service. When the service fails, the touched record
//! is put back the way it was (unless another mutation changed it in the
//! meantime) and a [`LedgerEvent::Reverted`](crate::LedgerEvent::Reverted) is
//! published. Nothing is retried.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    Category, CategoryPatch, CategoryRegistry, EntryPatch, EntrySet, JournalEntry, LedgerError,
    LedgerRemote, LedgerSnapshot, NewCategory, NewEntry, ResultLedger, SyncCoordinator,
    entry::validate_entry,
    snapshot::LedgerState,
    sync::{Mutation, Outcome},
};

/// Single owner of a user session.
///
/// All methods take `&self`: overlapping mutations may interleave their
/// optimistic applies, each working on its own record. The state lock is
/// never held across a remote call.
#[derive(Debug)]
pub struct EntryStore<R> {
    remote: R,
    state: RwLock<LedgerState>,
    sync: SyncCoordinator,
}

impl<R: LedgerRemote> EntryStore<R> {
    pub fn new(remote: R) -> Self {
        Self {
            remote,
            state: RwLock::new(LedgerState::default()),
            sync: SyncCoordinator::new(),
        }
    }

    pub fn sync(&self) -> &SyncCoordinator {
        &self.sync
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Current local state, optimistic changes included.
    ///
    /// The copy carries the version of the last published snapshot, so while a
    /// mutation is in flight it may differ from the published snapshot with the
    /// same version. Consumers that re-derive on version changes should follow
    /// [`SyncCoordinator::subscribe`] instead.
    pub async fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state.read().await;
        state.to_snapshot(self.sync.version())
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.state.read().await.categories.list().to_vec()
    }

    /// Fetch the whole ledger of `user_id` and make it the session state.
    ///
    /// On failure the previous state is kept.
    pub async fn load(&self, user_id: Option<&str>) -> ResultLedger<Arc<LedgerSnapshot>> {
        let user_id = user_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| LedgerError::Auth("no user id".to_string()))?;

        let entries = self.remote.fetch_entries(user_id).await?;
        let custom = self.remote.fetch_categories(user_id).await?;

        let mut state = self.state.write().await;
        state.user_id = Some(user_id.to_string());
        state.entries = EntrySet::from_entries(entries);
        state.categories = CategoryRegistry::with_custom(custom);
        tracing::debug!(
            user_id,
            entries = state.entries.len(),
            categories = state.categories.list().len(),
            "ledger loaded"
        );
        Ok(self.sync.publish(&state, Outcome::Loaded))
    }

    /// Drop local state, optimistic leftovers included, and load again.
    pub async fn refetch(&self) -> ResultLedger<Arc<LedgerSnapshot>> {
        let user_id = self.session_user().await?;
        self.load(Some(&user_id)).await
    }

    async fn session_user(&self) -> ResultLedger<String> {
        self.state
            .read()
            .await
            .user_id
            .clone()
            .ok_or_else(|| LedgerError::Auth("no ledger loaded".to_string()))
    }

    pub async fn add_entry(&self, new: NewEntry) -> ResultLedger<JournalEntry> {
        let user_id = self.session_user().await?;
        let entry = new.into_entry(Uuid::new_v4(), Utc::now());
        {
            let mut state = self.state.write().await;
            validate_entry(&entry, &state.categories)?;
            state.entries.upsert(entry.clone());
        }
        tracing::debug!(id = %entry.id, "entry added locally");

        let result = self.remote.create_entry(&user_id, &entry).await;
        let mutation = Mutation::EntryAdded(entry.id);
        let mut state = self.state.write().await;
        match result {
            Ok(created) => {
                state.entries.upsert(created.clone());
                self.sync.publish(&state, Outcome::Committed(mutation));
                Ok(created)
            }
            Err(err) => {
                if state.entries.get(entry.id) == Some(&entry) {
                    state.entries.remove(entry.id);
                }
                tracing::warn!(id = %entry.id, "entry create failed, reverted: {err}");
                self.sync
                    .publish(&state, Outcome::Reverted(mutation, err.to_string()));
                Err(err.into())
            }
        }
    }

    pub async fn update_entry(&self, id: Uuid, patch: EntryPatch) -> ResultLedger<JournalEntry> {
        if patch.is_empty() {
            return Err(LedgerError::Validation(
                "provide at least one field to update".to_string(),
            ));
        }
        let patch = patch.normalized();
        let user_id = self.session_user().await?;
        let (previous, patched) = {
            let mut state = self.state.write().await;
            let previous = state
                .entries
                .get(id)
                .cloned()
                .ok_or_else(|| LedgerError::KeyNotFound(id.to_string()))?;
            let patched = patch.apply(&previous);
            validate_entry(&patched, &state.categories)?;
            state.entries.upsert(patched.clone());
            (previous, patched)
        };
        tracing::debug!(%id, base_revision = previous.revision, "entry updated locally");

        let result = self
            .remote
            .update_entry(&user_id, id, previous.revision, &patch)
            .await;
        let mutation = Mutation::EntryUpdated(id);
        let mut state = self.state.write().await;
        match result {
            Ok(updated) => {
                state.entries.upsert(updated.clone());
                self.sync.publish(&state, Outcome::Committed(mutation));
                Ok(updated)
            }
            Err(err) => {
                if state.entries.get(id) == Some(&patched) {
                    state.entries.upsert(previous);
                }
                tracing::warn!(%id, "entry update failed, reverted: {err}");
                self.sync
                    .publish(&state, Outcome::Reverted(mutation, err.to_string()));
                Err(err.into())
            }
        }
    }

    /// Deletion is final once the remote service acknowledged it.
    pub async fn remove_entry(&self, id: Uuid) -> ResultLedger<()> {
        let user_id = self.session_user().await?;
        let previous = {
            let mut state = self.state.write().await;
            state
                .entries
                .remove(id)
                .ok_or_else(|| LedgerError::KeyNotFound(id.to_string()))?
        };
        tracing::debug!(%id, "entry removed locally");

        let result = self.remote.delete_entry(&user_id, id).await;
        let mutation = Mutation::EntryRemoved(id);
        let mut state = self.state.write().await;
        match result {
            Ok(()) => {
                self.sync.publish(&state, Outcome::Committed(mutation));
                Ok(())
            }
            Err(err) => {
                if !state.entries.contains(id) {
                    state.entries.upsert(previous);
                }
                tracing::warn!(%id, "entry delete failed, reverted: {err}");
                self.sync
                    .publish(&state, Outcome::Reverted(mutation, err.to_string()));
                Err(err.into())
            }
        }
    }

    /// Create a custom category. Any kind is allowed.
    pub async fn create_category(&self, new: NewCategory) -> ResultLedger<Category> {
        let user_id = self.session_user().await?;
        let category = {
            let mut state = self.state.write().await;
            let category = state
                .categories
                .prepare_new(Uuid::new_v4().to_string(), new)?;
            state.categories.upsert(category.clone());
            category
        };

        let result = self.remote.create_category(&user_id, &category).await;
        let mutation = Mutation::CategoryAdded(category.id.clone());
        let mut state = self.state.write().await;
        match result {
            Ok(mut created) => {
                created.is_custom = true;
                state.categories.upsert(created.clone());
                self.sync.publish(&state, Outcome::Committed(mutation));
                Ok(created)
            }
            Err(err) => {
                if state.categories.get(&category.id) == Some(&category) {
                    state.categories.remove(&category.id);
                }
                tracing::warn!(id = %category.id, "category create failed, reverted: {err}");
                self.sync
                    .publish(&state, Outcome::Reverted(mutation, err.to_string()));
                Err(err.into())
            }
        }
    }

    /// Built-ins are rejected before the remote call. Changing the kind is
    /// rejected while entries of an incompatible kind still reference the
    /// category.
    pub async fn update_category(&self, id: &str, patch: CategoryPatch) -> ResultLedger<Category> {
        let user_id = self.session_user().await?;
        let (previous, updated) = {
            let mut state = self.state.write().await;
            let (previous, updated) = state.categories.prepare_update(id, &patch)?;
            if patch.is_empty() {
                return Err(LedgerError::Validation(
                    "provide at least one field to update".to_string(),
                ));
            }
            let incompatible = state
                .entries
                .iter()
                .filter(|entry| entry.category_id == id && !updated.kind.accepts(entry.kind))
                .count();
            if incompatible > 0 {
                return Err(LedgerError::Validation(format!(
                    "{incompatible} entries of category '{}' do not fit type {}",
                    previous.name, updated.kind
                )));
            }
            state.categories.upsert(updated.clone());
            (previous, updated)
        };
        let settled = patch.settled(&updated);

        let result = self.remote.update_category(&user_id, id, &settled).await;
        let mutation = Mutation::CategoryUpdated(id.to_string());
        let mut state = self.state.write().await;
        match result {
            Ok(mut stored) => {
                stored.is_custom = true;
                state.categories.upsert(stored.clone());
                self.sync.publish(&state, Outcome::Committed(mutation));
                Ok(stored)
            }
            Err(err) => {
                if state.categories.get(id) == Some(&updated) {
                    state.categories.upsert(previous);
                }
                tracing::warn!(id, "category update failed, reverted: {err}");
                self.sync
                    .publish(&state, Outcome::Reverted(mutation, err.to_string()));
                Err(err.into())
            }
        }
    }

    /// Custom categories still referenced by an entry can't be deleted.
    pub async fn delete_category(&self, id: &str) -> ResultLedger<()> {
        let user_id = self.session_user().await?;
        let previous = {
            let mut state = self.state.write().await;
            state.categories.ensure_custom(id)?;
            let entries = state.entries.count_referencing(id);
            if entries > 0 {
                return Err(LedgerError::CategoryInUse {
                    id: id.to_string(),
                    entries,
                });
            }
            state
                .categories
                .remove(id)
                .ok_or_else(|| LedgerError::KeyNotFound(id.to_string()))?
        };

        let result = self.remote.delete_category(&user_id, id).await;
        let mutation = Mutation::CategoryRemoved(id.to_string());
        let mut state = self.state.write().await;
        match result {
            Ok(()) => {
                self.sync.publish(&state, Outcome::Committed(mutation));
                Ok(())
            }
            Err(err) => {
                if state.categories.get(id).is_none() {
                    state.categories.upsert(previous);
                }
                tracing::warn!(id, "category delete failed, reverted: {err}");
                self.sync
                    .publish(&state, Outcome::Reverted(mutation, err.to_string()));
                Err(err.into())
            }
        }
    }
}

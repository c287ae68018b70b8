//! Snapshot publication for everything that observes the store.
//!
//! Every settled operation (a load, or a mutation once the remote service
//! answered) bumps a monotonic version and publishes exactly one snapshot on a
//! [`watch`] channel, followed by one [`LedgerEvent`] on a [`broadcast`]
//! channel. Optimistic local changes are never published on their own.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::sync::{broadcast, watch};
use uuid::Uuid;

use crate::{LedgerSnapshot, snapshot::LedgerState};

const EVENT_CAPACITY: usize = 64;

/// What a settled mutation touched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    EntryAdded(Uuid),
    EntryUpdated(Uuid),
    EntryRemoved(Uuid),
    CategoryAdded(String),
    CategoryUpdated(String),
    CategoryRemoved(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerEvent {
    /// A full load or refetch replaced the session state.
    Loaded { version: u64 },
    /// The remote service accepted the mutation.
    Committed { version: u64, mutation: Mutation },
    /// The remote service rejected the mutation and the optimistic change was
    /// undone.
    Reverted {
        version: u64,
        mutation: Mutation,
        reason: String,
    },
}

impl LedgerEvent {
    pub fn version(&self) -> u64 {
        match self {
            Self::Loaded { version }
            | Self::Committed { version, .. }
            | Self::Reverted { version, .. } => *version,
        }
    }
}

pub(crate) enum Outcome {
    Loaded,
    Committed(Mutation),
    Reverted(Mutation, String),
}

#[derive(Debug)]
pub struct SyncCoordinator {
    version: AtomicU64,
    snapshots: watch::Sender<Arc<LedgerSnapshot>>,
    events: broadcast::Sender<LedgerEvent>,
}

impl Default for SyncCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncCoordinator {
    pub fn new() -> Self {
        let (snapshots, _) = watch::channel(Arc::new(LedgerSnapshot::default()));
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            version: AtomicU64::new(0),
            snapshots,
            events,
        }
    }

    /// Version of the last published snapshot.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Receiver that is marked changed once per settled operation.
    pub fn subscribe(&self) -> watch::Receiver<Arc<LedgerSnapshot>> {
        self.snapshots.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    pub fn latest(&self) -> Arc<LedgerSnapshot> {
        self.snapshots.borrow().clone()
    }

    /// Publish `state` under a new version. Callers hold the state write lock,
    /// so versions reach subscribers in order.
    pub(crate) fn publish(&self, state: &LedgerState, outcome: Outcome) -> Arc<LedgerSnapshot> {
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
        let snapshot = Arc::new(state.to_snapshot(version));
        self.snapshots.send_replace(snapshot.clone());

        let event = match outcome {
            Outcome::Loaded => LedgerEvent::Loaded { version },
            Outcome::Committed(mutation) => LedgerEvent::Committed { version, mutation },
            Outcome::Reverted(mutation, reason) => LedgerEvent::Reverted {
                version,
                mutation,
                reason,
            },
        };
        // No receivers is fine.
        let _ = self.events.send(event);
        snapshot
    }
}

//! # Observation Hook
//!
//! Listeners subscribed on a [`Registry`](crate::Registry) are called
//! synchronously after every `create` (successful) and every `validate`
//! (either outcome) on a definition of that registry. Watch-style tooling
//! subscribes here instead of wrapping values.
//!
//! Listeners run with no registry lock held, so they may call back into the
//! registry. A listener that panics propagates the panic to the caller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::kind::DefinitionKind;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ObservationEvent {
    /// A value was branded (record `create`, primitive or enum `create`,
    /// opaque `wrap`).
    Created,
    /// A value was checked with `validate`.
    Validated {
        /// The outcome.
        valid: bool,
    },
}

/// A notification delivered to listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observation {
    /// Label of the definition that handled the call.
    pub label: String,
    /// Kind of that definition.
    pub kind: DefinitionKind,
    /// The event.
    #[serde(flatten)]
    pub event: ObservationEvent,
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

pub(crate) type Listener = Arc<dyn Fn(&Observation) + Send + Sync>;

#[derive(Default)]
pub(crate) struct Observers {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(ObserverId, Listener)>>,
}

impl Observers {
    pub(crate) fn subscribe(&self, listener: Listener) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub(crate) fn notify(&self, observation: &Observation) {
        // Snapshot so listeners can subscribe/unsubscribe re-entrantly.
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(observation);
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.len())
            .finish()
    }
}

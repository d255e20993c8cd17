//! Open cleanup dialogs.
//!
//! Each dialog publishes its form snapshots through a `watch` channel so the
//! renderer can re-derive entries whenever the reducer produces a new state.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use teloxide::types::UserId;
use tokio::sync::watch;
use tracing::debug;

use super::entries::{build_entries, DisplayEntry, StaticConfig};
use super::scope::TargetScope;
use super::state::{reduce, Action, FormState};
use super::submit::{plan_submission, Request};
use crate::cache::{CacheConfig, CacheRegistry, TypedCache};

/// A single open dialog owned by the moderator who opened it.
#[derive(Debug)]
pub struct Dialog {
    id: u64,
    owner: UserId,
    config: StaticConfig,
    state: watch::Sender<Arc<FormState>>,
    submitted: AtomicBool,
}

impl Dialog {
    pub fn open(id: u64, scope: TargetScope, config: StaticConfig, owner: UserId) -> Self {
        let initial = FormState::new(Arc::new(scope), config.baseline);
        let (state, _) = watch::channel(Arc::new(initial));

        Self {
            id,
            owner,
            config,
            state,
            submitted: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn config(&self) -> &StaticConfig {
        &self.config
    }

    /// Apply `action` and publish the new snapshot.
    ///
    /// Subscribers are only notified when the state actually changed.
    pub fn dispatch(&self, action: &Action) -> Arc<FormState> {
        self.state.send_if_modified(|current| {
            let next = reduce(current, action);
            if next == **current {
                return false;
            }
            *current = Arc::new(next);
            true
        });
        debug!("Dialog {} applied {:?}", self.id, action);
        self.snapshot()
    }

    pub fn snapshot(&self) -> Arc<FormState> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<FormState>> {
        self.state.subscribe()
    }

    pub fn entries(&self) -> Vec<DisplayEntry> {
        build_entries(&self.snapshot(), &self.config)
    }

    /// Requests for the current snapshot.
    pub fn plan(&self) -> Vec<Request> {
        plan_submission(&self.snapshot(), &self.config)
    }

    /// Mark the dialog as submitted. Returns `false` if it already was.
    pub fn begin_submit(&self) -> bool {
        self.submitted
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Registry of open dialogs, expiring idle ones.
#[derive(Clone)]
pub struct DialogStore {
    dialogs: TypedCache<u64, Arc<Dialog>>,
    next_id: Arc<AtomicU64>,
}

impl DialogStore {
    pub fn new(cache: &CacheRegistry) -> Self {
        let dialogs = cache.get_or_create("cleanup_dialogs", CacheConfig::dialog_sessions());
        // Seeded from the clock so keyboards left over from a previous run
        // don't hit fresh dialogs.
        let seed = chrono::Utc::now().timestamp_millis().max(0) as u64;

        Self {
            dialogs,
            next_id: Arc::new(AtomicU64::new(seed)),
        }
    }

    pub fn open(&self, scope: TargetScope, config: StaticConfig, owner: UserId) -> Arc<Dialog> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let dialog = Arc::new(Dialog::open(id, scope, config, owner));
        self.dialogs.insert(id, dialog.clone());
        debug!("Opened dialog {} for user {}", id, owner);
        dialog
    }

    pub fn get(&self, id: u64) -> Option<Arc<Dialog>> {
        self.dialogs.get(&id)
    }

    pub fn close(&self, id: u64) {
        if self.dialogs.remove(&id).is_some() {
            debug!("Closed dialog {}", id);
        }
    }
}

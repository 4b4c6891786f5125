//! Test support utilities shared across unit and integration tests.

use std::collections::VecDeque;
use std::future::{Ready, ready};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

use crate::status::{HasStatus, ResourceStatus};
use crate::waiter::NotFound;

/// Minimal resource snapshot carrying only an identifier and a status.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StubResource {
    /// Resource identifier.
    pub id: String,
    /// Reported lifecycle status.
    pub status: ResourceStatus,
}

impl StubResource {
    /// Builds a snapshot for `id` reporting `status`.
    #[must_use]
    pub fn new(id: impl Into<String>, status: impl Into<ResourceStatus>) -> Self {
        Self {
            id: id.into(),
            status: status.into(),
        }
    }
}

impl HasStatus for StubResource {
    fn status(&self) -> &ResourceStatus {
        &self.status
    }
}

/// Fetch failures produced by [`ScriptedFetch`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum StubError {
    /// The resource does not exist.
    #[error("resource not found")]
    NotFound,
    /// Any other upstream failure.
    #[error("upstream failure: {0}")]
    Upstream(String),
}

impl NotFound for StubError {
    fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

type Outcome = Result<StubResource, StubError>;

/// Fetch double that replays scripted outcomes in FIFO order and repeats a
/// tail outcome once the script is exhausted.
///
/// Clones share the script and the call counter.
#[derive(Clone, Debug)]
pub struct ScriptedFetch {
    script: Arc<Mutex<VecDeque<Outcome>>>,
    tail: Outcome,
    calls: Arc<AtomicUsize>,
}

impl ScriptedFetch {
    /// Creates a fetch that replays `script` and then returns `tail` forever.
    #[must_use]
    pub fn new(script: impl IntoIterator<Item = Outcome>, tail: Outcome) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            tail,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Creates a fetch that reports each status in turn, then repeats the
    /// last one.
    #[must_use]
    pub fn statuses(id: &str, statuses: &[&str]) -> Self {
        let tail = statuses.last().copied().unwrap_or("UNKNOWN");
        Self::new(
            statuses
                .iter()
                .map(|status| Ok(StubResource::new(id, *status))),
            Ok(StubResource::new(id, tail)),
        )
    }

    /// Performs one scripted fetch.
    pub fn fetch(&self) -> Ready<Outcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        ready(next.unwrap_or_else(|| self.tail.clone()))
    }

    /// Number of fetches performed so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Records every value passed to a progress callback.
#[derive(Clone, Debug, Default)]
pub struct ProgressLog {
    events: Arc<Mutex<Vec<bool>>>,
}

impl ProgressLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a callback that appends to this log.
    #[must_use]
    pub fn sink(&self) -> impl Fn(bool) + Send + Sync + 'static {
        let events = Arc::clone(&self.events);
        move |still_waiting| {
            events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(still_waiting);
        }
    }

    /// Snapshot of the recorded values.
    #[must_use]
    pub fn events(&self) -> Vec<bool> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

//! Shared fixtures for status waiter BDD scenarios.

use std::cell::{Cell, RefCell};
use std::time::Duration;

use nova_compute::WaitError;
use nova_compute::test_support::{ProgressLog, ScriptedFetch, StubError, StubResource};
use rstest::fixture;

/// Refresh delay used by every scenario.
pub const REFRESH_DELAY: Duration = Duration::from_secs(1);

/// Terminal result of the wait under test.
#[derive(Debug)]
pub enum WaitOutcome {
    Reached(StubResource),
    Deleted,
    Failed(WaitError<StubError>),
}

/// Scenario state shared between steps. Steps run sequentially on one
/// thread, so interior mutability is enough.
#[derive(Debug, Default)]
pub struct WaitWorld {
    pub fetch: RefCell<Option<ScriptedFetch>>,
    pub timeout: Cell<Option<Duration>>,
    pub cancel_after: Cell<Option<Duration>>,
    pub progress: ProgressLog,
    pub outcome: RefCell<Option<WaitOutcome>>,
    pub elapsed: Cell<Duration>,
}

impl WaitWorld {
    pub fn scripted_fetch(&self) -> ScriptedFetch {
        self.fetch
            .borrow()
            .clone()
            .unwrap_or_else(|| panic!("a resource step must run before waiting"))
    }

    pub fn calls(&self) -> usize {
        self.fetch.borrow().as_ref().map_or(0, ScriptedFetch::calls)
    }
}

#[fixture]
pub fn wait_world() -> WaitWorld {
    WaitWorld::default()
}

/// Splits a comma separated list from a step, trimming each entry.
pub fn split_list(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect()
}

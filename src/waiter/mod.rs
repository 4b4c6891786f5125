//! Status polling for asynchronous Compute resources.
//!
//! A [`StatusWaiter`] repeatedly calls a caller-supplied fetch function until
//! the returned snapshot reports one of the target statuses, or, for
//! deletion, until the resource is gone. Between polls the waiter suspends on
//! the tokio timer, so thousands of waits can be outstanding on a handful of
//! worker threads. Each wait observes an optional deadline measured from the
//! moment the call starts and an optional [`CancellationToken`].
//!
//! The waiter knows nothing about HTTP or particular resource types: the
//! snapshot only needs to implement [`HasStatus`] and, for delete-waits, the
//! fetch error must implement [`NotFound`].

mod error;

use std::fmt;
use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;

use crate::status::{HasStatus, ResourceStatus, TargetStatuses};

pub use error::WaitError;

/// Delay between polls when none is configured.
pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_secs(5);

/// Classifies fetch failures that mean the resource no longer exists.
pub trait NotFound {
    /// Returns `true` when the error reports a missing resource (HTTP 404).
    fn is_not_found(&self) -> bool;
}

/// Callback told whether the wait is still in progress.
pub type ProgressSink = Arc<dyn Fn(bool) + Send + Sync>;

/// Timing, progress and cancellation settings for a single wait.
#[derive(Clone)]
pub struct WaitOptions {
    refresh_delay: Duration,
    timeout: Option<Duration>,
    progress: Option<ProgressSink>,
    cancellation: Option<CancellationToken>,
}

impl WaitOptions {
    /// Creates options with the default refresh delay, no timeout, no
    /// progress sink and no cancellation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the delay between consecutive polls.
    #[must_use]
    pub const fn refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    /// Fails the wait once `timeout` has elapsed since the call started.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets or clears the timeout; `None` waits indefinitely.
    #[must_use]
    pub const fn maybe_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Registers a progress callback. It receives `true` before every delay
    /// and `false` once when the wait finishes.
    #[must_use]
    pub fn on_progress(mut self, sink: impl Fn(bool) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(sink));
        self
    }

    /// Aborts the wait when `token` is cancelled.
    #[must_use]
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Configured delay between polls.
    #[must_use]
    pub const fn configured_refresh_delay(&self) -> Duration {
        self.refresh_delay
    }

    /// Configured timeout, if any.
    #[must_use]
    pub const fn configured_timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            refresh_delay: DEFAULT_REFRESH_DELAY,
            timeout: None,
            progress: None,
            cancellation: None,
        }
    }
}

impl fmt::Debug for WaitOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitOptions")
            .field("refresh_delay", &self.refresh_delay)
            .field("timeout", &self.timeout)
            .field("progress", &self.progress.is_some())
            .field("cancellation", &self.cancellation)
            .finish()
    }
}

/// Polls one resource until it reaches a target status or disappears.
///
/// A waiter is built per call and consumed by the wait method.
///
/// ```no_run
/// # use nova_compute::{ResourceStatus, StatusWaiter, WaitOptions};
/// # use nova_compute::test_support::{StubError, StubResource};
/// # async fn demo(fetch: impl FnMut() -> std::future::Ready<Result<StubResource, StubError>>) {
/// let server = StatusWaiter::new("a1b2", WaitOptions::new())
///     .wait_for_status(ResourceStatus::ACTIVE, fetch)
///     .await;
/// # }
/// ```
#[derive(Debug)]
pub struct StatusWaiter {
    resource_id: String,
    options: WaitOptions,
}

impl StatusWaiter {
    /// Prepares a wait on `resource_id`.
    #[must_use]
    pub fn new(resource_id: impl Into<String>, options: WaitOptions) -> Self {
        Self {
            resource_id: resource_id.into(),
            options,
        }
    }

    /// Identifier of the resource being waited on.
    #[must_use]
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Polls `fetch` until the snapshot's status is one of `targets` and
    /// returns that snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::Validation`] for an empty identifier or target
    /// set, [`WaitError::Timeout`] when the deadline passes,
    /// [`WaitError::Cancelled`] when the token fires, and
    /// [`WaitError::Fetch`] with the first fetch failure, unchanged.
    pub async fn wait_for_status<R, E, F, Fut>(
        self,
        targets: impl Into<TargetStatuses>,
        fetch: F,
    ) -> Result<R, WaitError<E>>
    where
        R: HasStatus,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        let wanted = targets.into();
        self.validate()?;
        if wanted.is_empty() {
            return Err(WaitError::Validation(String::from("target status")));
        }

        let mut poll = PollState::start(&self.resource_id, &self.options);
        let outcome = poll.until_status(&wanted, fetch).await;
        poll.finish();
        outcome
    }

    /// Polls `fetch` until the resource is gone: either the fetch fails with
    /// a not-found error or the snapshot reports `deleted`.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::Validation`] for an empty identifier,
    /// [`WaitError::Timeout`] when the deadline passes,
    /// [`WaitError::Cancelled`] when the token fires, and
    /// [`WaitError::Fetch`] for any fetch failure other than not-found.
    pub async fn wait_until_deleted<R, E, F, Fut>(
        self,
        deleted: &ResourceStatus,
        fetch: F,
    ) -> Result<(), WaitError<E>>
    where
        R: HasStatus,
        E: NotFound,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        self.validate()?;

        let mut poll = PollState::start(&self.resource_id, &self.options);
        let outcome = poll.until_deleted(deleted, fetch).await;
        poll.finish();
        outcome
    }

    fn validate<E>(&self) -> Result<(), WaitError<E>> {
        if self.resource_id.trim().is_empty() {
            return Err(WaitError::Validation(String::from("resource id")));
        }
        Ok(())
    }
}

/// Per-call bookkeeping for one polling loop.
struct PollState<'a> {
    resource_id: &'a str,
    options: &'a WaitOptions,
    started: Instant,
    attempts: u32,
    last_status: Option<ResourceStatus>,
}

impl<'a> PollState<'a> {
    fn start(resource_id: &'a str, options: &'a WaitOptions) -> Self {
        Self {
            resource_id,
            options,
            started: Instant::now(),
            attempts: 0,
            last_status: None,
        }
    }

    async fn until_status<R, E, F, Fut>(
        &mut self,
        targets: &TargetStatuses,
        mut fetch: F,
    ) -> Result<R, WaitError<E>>
    where
        R: HasStatus,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        loop {
            self.begin_attempt()?;
            let resource = fetch().await.map_err(WaitError::Fetch)?;
            if targets.contains(resource.status()) {
                tracing::debug!(
                    resource_id = self.resource_id,
                    attempt = self.attempts,
                    status = %resource.status(),
                    "resource reached target status"
                );
                return Ok(resource);
            }
            self.pause(resource.status()).await?;
        }
    }

    async fn until_deleted<R, E, F, Fut>(
        &mut self,
        deleted: &ResourceStatus,
        mut fetch: F,
    ) -> Result<(), WaitError<E>>
    where
        R: HasStatus,
        E: NotFound,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        loop {
            self.begin_attempt()?;
            match fetch().await {
                Ok(resource) if resource.status() == deleted => {
                    tracing::debug!(
                        resource_id = self.resource_id,
                        attempt = self.attempts,
                        "resource reports deleted status"
                    );
                    return Ok(());
                }
                Ok(resource) => self.pause(resource.status()).await?,
                Err(err) if err.is_not_found() => {
                    tracing::debug!(
                        resource_id = self.resource_id,
                        attempt = self.attempts,
                        "resource no longer exists"
                    );
                    return Ok(());
                }
                Err(err) => return Err(WaitError::Fetch(err)),
            }
        }
    }

    fn begin_attempt<E>(&mut self) -> Result<(), WaitError<E>> {
        if self.is_cancelled() {
            return Err(self.cancelled());
        }
        self.attempts = self.attempts.saturating_add(1);
        Ok(())
    }

    /// Records the observed status, then sleeps for one refresh delay. When
    /// the deadline falls inside that delay the sleep is cut short at the
    /// deadline and the wait times out without another fetch.
    async fn pause<E>(&mut self, status: &ResourceStatus) -> Result<(), WaitError<E>> {
        tracing::debug!(
            resource_id = self.resource_id,
            attempt = self.attempts,
            status = %status,
            "resource not in target status yet"
        );
        self.last_status = Some(status.clone());

        let delay = self.options.refresh_delay;
        let remaining = self
            .options
            .timeout
            .map(|timeout| timeout.saturating_sub(self.started.elapsed()));

        self.report(true);

        match remaining {
            Some(left) if delay > left => {
                self.sleep_for(left).await?;
                Err(self.timed_out())
            }
            _ => self.sleep_for(delay).await,
        }
    }

    async fn sleep_for<E>(&self, duration: Duration) -> Result<(), WaitError<E>> {
        match &self.options.cancellation {
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => Err(self.cancelled()),
                    () = sleep(duration) => Ok(()),
                }
            }
            None => {
                sleep(duration).await;
                Ok(())
            }
        }
    }

    fn timed_out<E>(&self) -> WaitError<E> {
        WaitError::Timeout {
            resource_id: self.resource_id.to_owned(),
            last_status: self.last_status.clone(),
            elapsed: self.started.elapsed(),
        }
    }

    fn finish(&self) {
        self.report(false);
    }

    fn is_cancelled(&self) -> bool {
        self.options
            .cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    fn cancelled<E>(&self) -> WaitError<E> {
        WaitError::Cancelled {
            resource_id: self.resource_id.to_owned(),
            last_status: self.last_status.clone(),
        }
    }

    fn report(&self, still_waiting: bool) {
        let Some(sink) = &self.options.progress else {
            return;
        };
        if catch_unwind(AssertUnwindSafe(|| sink(still_waiting))).is_err() {
            tracing::warn!(
                resource_id = self.resource_id,
                "progress callback panicked; continuing wait"
            );
        }
    }
}

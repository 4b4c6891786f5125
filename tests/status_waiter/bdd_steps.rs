//! BDD step definitions for status waits.

use std::future::Future;
use std::time::Duration;

use nova_compute::test_support::{ScriptedFetch, StubError, StubResource};
use nova_compute::{ResourceStatus, StatusWaiter, WaitError, WaitOptions};
use rstest_bdd_macros::{given, then, when};
use tokio::runtime::{Builder, Runtime};
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;

use super::test_helpers::{REFRESH_DELAY, WaitOutcome, WaitWorld, split_list};

const RESOURCE_ID: &str = "res-1";

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("failed to build paused runtime: {0}")]
    Runtime(String),
}

#[given("a resource that reports \"{statuses}\"")]
fn resource_reports(wait_world: &WaitWorld, statuses: String) {
    let script = split_list(&statuses);
    *wait_world.fetch.borrow_mut() = Some(ScriptedFetch::statuses(RESOURCE_ID, &script));
}

#[given("a resource that disappears after reporting \"{statuses}\"")]
fn resource_disappears(wait_world: &WaitWorld, statuses: String) {
    let script = split_list(&statuses)
        .into_iter()
        .map(|status| Ok(StubResource::new(RESOURCE_ID, status)))
        .collect::<Vec<_>>();
    *wait_world.fetch.borrow_mut() = Some(ScriptedFetch::new(script, Err(StubError::NotFound)));
}

#[given("a timeout of \"{secs}\" seconds")]
fn timeout_of(wait_world: &WaitWorld, secs: u64) {
    wait_world.timeout.set(Some(Duration::from_secs(secs)));
}

#[given("the wait is cancelled after \"{millis}\" milliseconds")]
fn cancelled_after(wait_world: &WaitWorld, millis: u64) {
    wait_world
        .cancel_after
        .set(Some(Duration::from_millis(millis)));
}

#[when("I wait for status \"{target}\"")]
fn wait_for_status(wait_world: &WaitWorld, target: String) -> Result<(), StepError> {
    let fetch = wait_world.scripted_fetch();
    let (result, elapsed) = run_paused(wait_world, move |options| async move {
        StatusWaiter::new(RESOURCE_ID, options)
            .wait_for_status(ResourceStatus::new(&target), move || fetch.fetch())
            .await
    })?;

    let outcome = match result {
        Ok(resource) => WaitOutcome::Reached(resource),
        Err(err) => WaitOutcome::Failed(err),
    };
    record(wait_world, outcome, elapsed);
    Ok(())
}

#[when("I wait for the resource to be deleted")]
fn wait_until_deleted(wait_world: &WaitWorld) -> Result<(), StepError> {
    let fetch = wait_world.scripted_fetch();
    let (result, elapsed) = run_paused(wait_world, move |options| async move {
        StatusWaiter::new(RESOURCE_ID, options)
            .wait_until_deleted(&ResourceStatus::DELETED, move || fetch.fetch())
            .await
    })?;

    let outcome = match result {
        Ok(()) => WaitOutcome::Deleted,
        Err(err) => WaitOutcome::Failed(err),
    };
    record(wait_world, outcome, elapsed);
    Ok(())
}

#[then("the wait returns a resource in status \"{status}\"")]
fn returns_resource(wait_world: &WaitWorld, status: String) {
    let outcome = wait_world.outcome.borrow();
    let Some(WaitOutcome::Reached(resource)) = outcome.as_ref() else {
        panic!("expected a resource, got {outcome:?}");
    };
    assert_eq!(resource.status, ResourceStatus::new(&status));
}

#[then("the wait confirms deletion")]
fn confirms_deletion(wait_world: &WaitWorld) {
    let outcome = wait_world.outcome.borrow();
    assert!(
        matches!(outcome.as_ref(), Some(WaitOutcome::Deleted)),
        "expected deletion, got {outcome:?}"
    );
}

#[then("the wait times out with last status \"{status}\"")]
fn times_out(wait_world: &WaitWorld, status: String) {
    let outcome = wait_world.outcome.borrow();
    let Some(WaitOutcome::Failed(err)) = outcome.as_ref() else {
        panic!("expected a failure, got {outcome:?}");
    };
    assert!(err.is_timeout(), "expected timeout, got {err}");
    assert_eq!(err.last_status(), Some(&ResourceStatus::new(&status)));
}

#[then("the wait is cancelled with last status \"{status}\"")]
fn is_cancelled(wait_world: &WaitWorld, status: String) {
    let outcome = wait_world.outcome.borrow();
    let Some(WaitOutcome::Failed(err)) = outcome.as_ref() else {
        panic!("expected a failure, got {outcome:?}");
    };
    assert!(err.is_cancelled(), "expected cancellation, got {err}");
    assert_eq!(err.last_status(), Some(&ResourceStatus::new(&status)));
}

#[then("at least \"{secs}\" seconds have elapsed")]
fn at_least_elapsed(wait_world: &WaitWorld, secs: u64) {
    let elapsed = wait_world.elapsed.get();
    assert!(
        elapsed >= Duration::from_secs(secs),
        "wait ended after {elapsed:?}"
    );
}

#[then("the resource was fetched \"{count}\" times")]
fn fetched_times(wait_world: &WaitWorld, count: usize) {
    assert_eq!(wait_world.calls(), count);
}

#[then("progress was reported as \"{events}\"")]
fn progress_reported(wait_world: &WaitWorld, events: String) {
    let expected: Vec<bool> = split_list(&events)
        .into_iter()
        .map(|event| event == "true")
        .collect();
    assert_eq!(wait_world.progress.events(), expected);
}

fn paused_runtime() -> Result<Runtime, StepError> {
    Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .map_err(|err| StepError::Runtime(err.to_string()))
}

/// Runs one wait on a paused clock, wiring the scenario's timeout, progress
/// log, and delayed cancellation into its options.
fn run_paused<T, F, Fut>(
    wait_world: &WaitWorld,
    wait: F,
) -> Result<(Result<T, WaitError<StubError>>, Duration), StepError>
where
    F: FnOnce(WaitOptions) -> Fut,
    Fut: Future<Output = Result<T, WaitError<StubError>>>,
{
    let runtime = paused_runtime()?;
    let mut options = WaitOptions::new()
        .refresh_delay(REFRESH_DELAY)
        .maybe_timeout(wait_world.timeout.get())
        .on_progress(wait_world.progress.sink());
    let cancel_after = wait_world.cancel_after.get();

    Ok(runtime.block_on(async move {
        if let Some(after) = cancel_after {
            let token = CancellationToken::new();
            let trigger = token.clone();
            tokio::spawn(async move {
                sleep(after).await;
                trigger.cancel();
            });
            options = options.cancel_on(token);
        }
        let started = Instant::now();
        let result = wait(options).await;
        (result, started.elapsed())
    }))
}

fn record(wait_world: &WaitWorld, outcome: WaitOutcome, elapsed: Duration) {
    *wait_world.outcome.borrow_mut() = Some(outcome);
    wait_world.elapsed.set(elapsed);
}

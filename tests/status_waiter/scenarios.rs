//! BDD scenarios for the status waiter.

use rstest_bdd_macros::scenario;

use super::test_helpers::{WaitWorld, wait_world};

#[scenario(
    path = "tests/features/status_waiter.feature",
    name = "Wait for a building server to become active"
)]
fn scenario_reach_target(wait_world: WaitWorld) {
    drop(wait_world);
}

#[scenario(
    path = "tests/features/status_waiter.feature",
    name = "Treat a missing resource as deleted"
)]
fn scenario_delete_confirmed(wait_world: WaitWorld) {
    drop(wait_world);
}

#[scenario(
    path = "tests/features/status_waiter.feature",
    name = "Give up once the timeout has elapsed"
)]
fn scenario_timeout(wait_world: WaitWorld) {
    drop(wait_world);
}

#[scenario(
    path = "tests/features/status_waiter.feature",
    name = "Abort a wait when its token is cancelled"
)]
fn scenario_cancelled(wait_world: WaitWorld) {
    drop(wait_world);
}

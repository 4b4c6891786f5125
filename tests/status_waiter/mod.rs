//! BDD coverage for status waits, split into fixtures, steps, and scenarios.

mod bdd_steps;
mod scenarios;
mod test_helpers;

//! Command-line interface definitions for the `nova-wait` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::{Args, Parser, ValueEnum};

/// Top-level CLI for the `nova-wait` binary.
#[derive(Debug, Parser)]
#[command(
    name = "nova-wait",
    version,
    about = "Wait for OpenStack Compute resources to reach a status or disappear",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Poll a resource until it reports one of the target statuses.
    #[command(name = "status", about = "Wait until a resource reaches a status")]
    Status(StatusCommand),
    /// Poll a resource until the API no longer returns it.
    #[command(name = "deleted", about = "Wait until a resource is deleted")]
    Deleted(DeletedCommand),
}

/// Resource types the CLI can wait on.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum ResourceArg {
    /// Compute instance.
    Server,
    /// Block storage volume.
    Volume,
    /// Volume snapshot.
    Snapshot,
    /// Machine image.
    Image,
}

/// Polling overrides shared by both subcommands.
#[derive(Debug, Args)]
pub(crate) struct PollArgs {
    /// Seconds between polls. Overrides `NOVA_POLL_INTERVAL_SECS`.
    #[arg(long, value_name = "SECS")]
    pub(crate) interval: Option<u64>,
    /// Seconds before giving up. Overrides `NOVA_WAIT_TIMEOUT_SECS`.
    #[arg(long, value_name = "SECS")]
    pub(crate) timeout: Option<u64>,
}

/// Arguments for the `nova-wait status` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct StatusCommand {
    /// Kind of resource to poll.
    #[arg(value_enum)]
    pub(crate) kind: ResourceArg,
    /// Identifier of the resource.
    pub(crate) id: String,
    /// Status to wait for; repeat to accept any of several.
    ///
    /// Matching ignores ASCII case, so `active` and `ACTIVE` are equivalent.
    #[arg(long = "target", value_name = "STATUS", required = true)]
    pub(crate) targets: Vec<String>,
    #[command(flatten)]
    pub(crate) poll: PollArgs,
}

/// Arguments for the `nova-wait deleted` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct DeletedCommand {
    /// Kind of resource to poll.
    #[arg(value_enum)]
    pub(crate) kind: ResourceArg,
    /// Identifier of the resource.
    pub(crate) id: String,
    #[command(flatten)]
    pub(crate) poll: PollArgs,
}

//! Binary entry point for the `nova-wait` CLI.

mod cli;

use std::io::{self, Write};
use std::process;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use nova_compute::{
    ComputeClient, ComputeConfig, ComputeError, ResourceKind, ResourceStatus, TargetStatuses,
    WaitError, WaitOptions,
};

use cli::{Cli, DeletedCommand, PollArgs, ResourceArg, StatusCommand};


const EXIT_FAILURE: i32 = 1;
const EXIT_TIMEOUT: i32 = 2;
const EXIT_INTERRUPTED: i32 = 130;

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("failed to build compute client: {0}")]
    Client(ComputeError),
    #[error(transparent)]
    Wait(#[from] WaitError<ComputeError>),
    #[error("failed to write output: {0}")]
    Output(String),
}

impl CliError {
    const fn exit_code(&self) -> i32 {
        match self {
            Self::Wait(WaitError::Timeout { .. }) => EXIT_TIMEOUT,
            Self::Wait(WaitError::Cancelled { .. }) => EXIT_INTERRUPTED,
            _ => EXIT_FAILURE,
        }
    }
}

impl From<ComputeError> for CliError {
    fn from(value: ComputeError) -> Self {
        match value {
            ComputeError::Config(message) => Self::Config(message),
            other => Self::Client(other),
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let cancel = CancellationToken::new();
    cancel_on_interrupt(cancel.clone());

    let exit_code = match dispatch(cli, cancel).await {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            err.exit_code()
        }
    };

    process::exit(exit_code);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .ok();
}

fn cancel_on_interrupt(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; cancelling wait");
            token.cancel();
        }
    });
}

async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<(), CliError> {
    let config =
        ComputeConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    let client = ComputeClient::new(&config)?;

    match cli {
        Cli::Status(command) => {
            let snapshot = exec_status(&client, &command, cancel).await?;
            write_snapshot(io::stdout(), &snapshot)
        }
        Cli::Deleted(command) => {
            exec_deleted(&client, &command, cancel).await?;
            writeln!(
                io::stdout(),
                "{} {} deleted",
                resource_kind(command.kind),
                command.id
            )
            .map_err(|err| CliError::Output(err.to_string()))
        }
    }
}

async fn exec_status(
    client: &ComputeClient,
    command: &StatusCommand,
    cancel: CancellationToken,
) -> Result<Value, CliError> {
    let kind = resource_kind(command.kind);
    let options = wait_options(client, kind, &command.id, &command.poll, cancel)?;
    let targets = target_statuses(&command.targets);
    let id = command.id.as_str();
    tracing::info!(%kind, id, %targets, "waiting for status");

    match kind {
        ResourceKind::Server => to_json(&client.wait_for_server(id, targets, options).await?),
        ResourceKind::Volume => to_json(&client.wait_for_volume(id, targets, options).await?),
        ResourceKind::Snapshot => to_json(&client.wait_for_snapshot(id, targets, options).await?),
        ResourceKind::Image => to_json(&client.wait_for_image(id, targets, options).await?),
    }
}

async fn exec_deleted(
    client: &ComputeClient,
    command: &DeletedCommand,
    cancel: CancellationToken,
) -> Result<(), CliError> {
    let kind = resource_kind(command.kind);
    let options = wait_options(client, kind, &command.id, &command.poll, cancel)?;
    let id = command.id.as_str();
    tracing::info!(%kind, id, "waiting for deletion");

    match kind {
        ResourceKind::Server => client.wait_for_server_deleted(id, options).await?,
        ResourceKind::Volume => client.wait_for_volume_deleted(id, options).await?,
        ResourceKind::Snapshot => client.wait_for_snapshot_deleted(id, options).await?,
        ResourceKind::Image => client.wait_for_image_deleted(id, options).await?,
    }
    Ok(())
}

const fn resource_kind(arg: ResourceArg) -> ResourceKind {
    match arg {
        ResourceArg::Server => ResourceKind::Server,
        ResourceArg::Volume => ResourceKind::Volume,
        ResourceArg::Snapshot => ResourceKind::Snapshot,
        ResourceArg::Image => ResourceKind::Image,
    }
}

fn target_statuses(raw: &[String]) -> TargetStatuses {
    raw.iter().map(ResourceStatus::new).collect()
}

/// Merges CLI overrides over the configured defaults and wires progress
/// logging and interrupt cancellation.
fn wait_options(
    client: &ComputeClient,
    kind: ResourceKind,
    id: &str,
    poll: &PollArgs,
    cancel: CancellationToken,
) -> Result<WaitOptions, CliError> {
    let label = format!("{kind} {id}");
    let mut options = client
        .wait_options()
        .cancel_on(cancel)
        .on_progress(move |waiting| {
            if waiting {
                tracing::info!(resource = %label, "still waiting");
            }
        });

    if let Some(secs) = poll.interval {
        if secs == 0 {
            return Err(CliError::InvalidArgument(String::from(
                "--interval must be greater than zero",
            )));
        }
        options = options.refresh_delay(Duration::from_secs(secs));
    }
    if let Some(secs) = poll.timeout {
        options = options.timeout(Duration::from_secs(secs));
    }
    Ok(options)
}

fn to_json<T: Serialize>(snapshot: &T) -> Result<Value, CliError> {
    serde_json::to_value(snapshot).map_err(|err| CliError::Output(err.to_string()))
}

fn write_snapshot(mut target: impl Write, snapshot: &Value) -> Result<(), CliError> {
    let rendered =
        serde_json::to_string_pretty(snapshot).map_err(|err| CliError::Output(err.to_string()))?;
    writeln!(target, "{rendered}").map_err(|err| CliError::Output(err.to_string()))
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}

//! Client SDK for Nova-compatible Compute APIs.
//!
//! Compute operations such as creating a server or deleting a volume are
//! asynchronous: the API accepts the request and the resource then moves
//! through intermediate statuses. The crate pairs a thin HTTP client with a
//! generic status-polling engine so callers can block until a resource
//! settles, vanishes, or a deadline passes.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use nova_compute::{ComputeClient, ComputeConfig, ResourceStatus};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ComputeConfig::load_without_cli_args()?;
//! let client = ComputeClient::new(&config)?;
//! let options = client.wait_options().timeout(Duration::from_secs(600));
//! let server = client
//!     .wait_for_server("a1b2", ResourceStatus::ACTIVE, options)
//!     .await?;
//! println!("{} is {}", server.id, server.status);
//! # Ok(())
//! # }
//! ```

pub mod compute;
pub mod config;
pub mod status;
pub mod test_support;
pub mod waiter;

pub use compute::{
    ComputeClient, ComputeError, CreatedServer, Image, NetworkRef, RebootKind, ResourceKind,
    Server, ServerAction, ServerCreateRequest, ServerCreateRequestBuilder, ServerFault, Snapshot,
    SnapshotCreateRequest, Volume, VolumeAttachment, VolumeCreateRequest,
};
pub use config::{ComputeConfig, ConfigError};
pub use status::{HasStatus, ResourceStatus, TargetStatuses};
pub use waiter::{
    DEFAULT_REFRESH_DELAY, NotFound, ProgressSink, StatusWaiter, WaitError, WaitOptions,
};

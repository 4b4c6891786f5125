//! Status waits for each Compute resource type.

use crate::status::{HasStatus, TargetStatuses};
use crate::waiter::{StatusWaiter, WaitError, WaitOptions};

use super::{ComputeClient, ComputeError, Image, Server, Snapshot, Volume};

impl ComputeClient {
    /// Waits until the server reports one of `targets` (typically `ACTIVE`
    /// after create or start, `SHUTOFF` after stop).
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::Timeout`] or [`WaitError::Cancelled`] when the
    /// wait ends early, and [`WaitError::Fetch`] when polling fails.
    pub async fn wait_for_server(
        &self,
        id: &str,
        targets: impl Into<TargetStatuses>,
        options: WaitOptions,
    ) -> Result<Server, WaitError<ComputeError>> {
        StatusWaiter::new(id, options)
            .wait_for_status(targets, move || self.get_server(id))
            .await
    }

    /// Waits until the server disappears or reports `DELETED`.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::Timeout`] or [`WaitError::Cancelled`] when the
    /// wait ends early, and [`WaitError::Fetch`] for failures other than 404.
    pub async fn wait_for_server_deleted(
        &self,
        id: &str,
        options: WaitOptions,
    ) -> Result<(), WaitError<ComputeError>> {
        StatusWaiter::new(id, options)
            .wait_until_deleted(&Server::DELETED, move || self.get_server(id))
            .await
    }

    /// Waits until the volume reports one of `targets` (typically
    /// `available` after create or detach, `in-use` after attach).
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::Timeout`] or [`WaitError::Cancelled`] when the
    /// wait ends early, and [`WaitError::Fetch`] when polling fails.
    pub async fn wait_for_volume(
        &self,
        id: &str,
        targets: impl Into<TargetStatuses>,
        options: WaitOptions,
    ) -> Result<Volume, WaitError<ComputeError>> {
        StatusWaiter::new(id, options)
            .wait_for_status(targets, move || self.get_volume(id))
            .await
    }

    /// Waits until the volume disappears or reports `deleted`.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::Timeout`] or [`WaitError::Cancelled`] when the
    /// wait ends early, and [`WaitError::Fetch`] for failures other than 404.
    pub async fn wait_for_volume_deleted(
        &self,
        id: &str,
        options: WaitOptions,
    ) -> Result<(), WaitError<ComputeError>> {
        StatusWaiter::new(id, options)
            .wait_until_deleted(&Volume::DELETED, move || self.get_volume(id))
            .await
    }

    /// Waits until the snapshot reports one of `targets`.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::Timeout`] or [`WaitError::Cancelled`] when the
    /// wait ends early, and [`WaitError::Fetch`] when polling fails.
    pub async fn wait_for_snapshot(
        &self,
        id: &str,
        targets: impl Into<TargetStatuses>,
        options: WaitOptions,
    ) -> Result<Snapshot, WaitError<ComputeError>> {
        StatusWaiter::new(id, options)
            .wait_for_status(targets, move || self.get_snapshot(id))
            .await
    }

    /// Waits until the snapshot disappears or reports `deleted`.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::Timeout`] or [`WaitError::Cancelled`] when the
    /// wait ends early, and [`WaitError::Fetch`] for failures other than 404.
    pub async fn wait_for_snapshot_deleted(
        &self,
        id: &str,
        options: WaitOptions,
    ) -> Result<(), WaitError<ComputeError>> {
        StatusWaiter::new(id, options)
            .wait_until_deleted(&Snapshot::DELETED, move || self.get_snapshot(id))
            .await
    }

    /// Waits until the image reports one of `targets` (typically `ACTIVE`
    /// once an upload from a server completes).
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::Timeout`] or [`WaitError::Cancelled`] when the
    /// wait ends early, and [`WaitError::Fetch`] when polling fails.
    pub async fn wait_for_image(
        &self,
        id: &str,
        targets: impl Into<TargetStatuses>,
        options: WaitOptions,
    ) -> Result<Image, WaitError<ComputeError>> {
        StatusWaiter::new(id, options)
            .wait_for_status(targets, move || self.get_image(id))
            .await
    }

    /// Waits until the image disappears or reports `DELETED`.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::Timeout`] or [`WaitError::Cancelled`] when the
    /// wait ends early, and [`WaitError::Fetch`] for failures other than 404.
    pub async fn wait_for_image_deleted(
        &self,
        id: &str,
        options: WaitOptions,
    ) -> Result<(), WaitError<ComputeError>> {
        StatusWaiter::new(id, options)
            .wait_until_deleted(&Image::DELETED, move || self.get_image(id))
            .await
    }
}

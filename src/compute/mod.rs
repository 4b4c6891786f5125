//! HTTP client for the Compute API.
//!
//! [`ComputeClient`] performs one round trip per call and classifies HTTP
//! 404 as [`ComputeError::NotFound`], which is what lets delete-waits treat
//! a vanished resource as success. The wait helpers in this module's `wait`
//! submodule wrap the `get_*` calls in a [`StatusWaiter`](crate::StatusWaiter).

mod error;
mod types;
mod wait;

use std::fmt;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ComputeConfig;
use crate::waiter::WaitOptions;

pub use error::ComputeError;
pub use types::{
    CreatedServer, Image, NetworkRef, RebootKind, ResourceKind, Server, ServerAction,
    ServerCreateRequest, ServerCreateRequestBuilder, ServerFault, Snapshot,
    SnapshotCreateRequest, Volume, VolumeAttachment, VolumeCreateRequest,
};

/// Client for a Nova-compatible Compute endpoint.
#[derive(Clone)]
pub struct ComputeClient {
    http: reqwest::Client,
    endpoint: String,
    auth_token: String,
    wait_defaults: WaitOptions,
}

impl ComputeClient {
    /// Constructs a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::Config`] when the configuration fails
    /// validation and [`ComputeError::Transport`] when the HTTP client cannot
    /// be built.
    pub fn new(config: &ComputeConfig) -> Result<Self, ComputeError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint.trim().trim_end_matches('/').to_owned(),
            auth_token: config.auth_token.clone(),
            wait_defaults: config.wait_options(),
        })
    }

    /// Wait options seeded with the configured poll interval and timeout.
    /// Callers add progress and cancellation before passing them to a
    /// `wait_for_*` method.
    #[must_use]
    pub fn wait_options(&self) -> WaitOptions {
        self.wait_defaults.clone()
    }

    /// Fetches a server.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::NotFound`] when the server does not exist.
    pub async fn get_server(&self, id: &str) -> Result<Server, ComputeError> {
        self.get_resource(ResourceKind::Server, id).await
    }

    /// Fetches a volume.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::NotFound`] when the volume does not exist.
    pub async fn get_volume(&self, id: &str) -> Result<Volume, ComputeError> {
        self.get_resource(ResourceKind::Volume, id).await
    }

    /// Fetches a volume snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::NotFound`] when the snapshot does not exist.
    pub async fn get_snapshot(&self, id: &str) -> Result<Snapshot, ComputeError> {
        self.get_resource(ResourceKind::Snapshot, id).await
    }

    /// Fetches an image.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::NotFound`] when the image does not exist.
    pub async fn get_image(&self, id: &str) -> Result<Image, ComputeError> {
        self.get_resource(ResourceKind::Image, id).await
    }

    /// Requests a new server. The server starts in `BUILD`; use
    /// [`ComputeClient::wait_for_server`] to wait for `ACTIVE`.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::Validation`] for an incomplete request and
    /// [`ComputeError::Api`] when the API rejects it.
    pub async fn create_server(
        &self,
        request: &ServerCreateRequest,
    ) -> Result<CreatedServer, ComputeError> {
        request.validate()?;
        let body = serde_json::json!({ "server": request });
        let raw = self
            .send(Method::POST, ResourceKind::Server.collection(), Some(&body))
            .await?;
        let response = Self::check(raw, ResourceKind::Server, None).await?;
        Self::decode_envelope(response, ResourceKind::Server).await
    }

    /// Requests a new volume.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::Validation`] for a zero size and
    /// [`ComputeError::Api`] when the API rejects the request.
    pub async fn create_volume(
        &self,
        request: &VolumeCreateRequest,
    ) -> Result<Volume, ComputeError> {
        request.validate()?;
        let body = serde_json::json!({ "volume": request });
        let raw = self
            .send(Method::POST, ResourceKind::Volume.collection(), Some(&body))
            .await?;
        let response = Self::check(raw, ResourceKind::Volume, None).await?;
        Self::decode_envelope(response, ResourceKind::Volume).await
    }

    /// Requests a snapshot of a volume.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::Validation`] for an empty volume id and
    /// [`ComputeError::Api`] when the API rejects the request.
    pub async fn create_snapshot(
        &self,
        request: &SnapshotCreateRequest,
    ) -> Result<Snapshot, ComputeError> {
        request.validate()?;
        let body = serde_json::json!({ "snapshot": request });
        let raw = self
            .send(
                Method::POST,
                ResourceKind::Snapshot.collection(),
                Some(&body),
            )
            .await?;
        let response = Self::check(raw, ResourceKind::Snapshot, None).await?;
        Self::decode_envelope(response, ResourceKind::Snapshot).await
    }

    /// Captures an image of a server and returns the new image id.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::NotFound`] when the server does not exist and
    /// [`ComputeError::Decode`] when the response omits the image id.
    pub async fn create_server_image(
        &self,
        server_id: &str,
        name: &str,
    ) -> Result<String, ComputeError> {
        require_id(ResourceKind::Server, server_id)?;
        if name.trim().is_empty() {
            return Err(ComputeError::Validation(String::from("name")));
        }
        let body = serde_json::json!({
            "createImage": { "name": name.trim(), "metadata": {} }
        });
        let raw = self
            .send(Method::POST, &action_path(server_id), Some(&body))
            .await?;
        let response = Self::check(raw, ResourceKind::Server, Some(server_id)).await?;
        let value: Value = Self::decode(response, ResourceKind::Image).await?;
        value
            .get("image_id")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| ComputeError::Decode {
                kind: ResourceKind::Image,
                message: String::from("response missing image_id"),
            })
    }

    /// Sends a power action to a server.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::NotFound`] when the server does not exist and
    /// [`ComputeError::Api`] when the action conflicts with its state.
    pub async fn server_action(
        &self,
        server_id: &str,
        action: &ServerAction,
    ) -> Result<(), ComputeError> {
        require_id(ResourceKind::Server, server_id)?;
        let raw = self
            .send(Method::POST, &action_path(server_id), Some(&action.body()))
            .await?;
        Self::check(raw, ResourceKind::Server, Some(server_id)).await?;
        Ok(())
    }

    /// Deletes a server. Deletion is asynchronous; use
    /// [`ComputeClient::wait_for_server_deleted`] to confirm it.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::NotFound`] when the server does not exist.
    pub async fn delete_server(&self, id: &str) -> Result<(), ComputeError> {
        self.delete_resource(ResourceKind::Server, id).await
    }

    /// Deletes a volume.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::NotFound`] when the volume does not exist.
    pub async fn delete_volume(&self, id: &str) -> Result<(), ComputeError> {
        self.delete_resource(ResourceKind::Volume, id).await
    }

    /// Deletes a volume snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::NotFound`] when the snapshot does not exist.
    pub async fn delete_snapshot(&self, id: &str) -> Result<(), ComputeError> {
        self.delete_resource(ResourceKind::Snapshot, id).await
    }

    /// Deletes an image.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::NotFound`] when the image does not exist.
    pub async fn delete_image(&self, id: &str) -> Result<(), ComputeError> {
        self.delete_resource(ResourceKind::Image, id).await
    }

    async fn get_resource<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> Result<T, ComputeError> {
        require_id(kind, id)?;
        let raw = self
            .send(Method::GET, &resource_path(kind, id), None)
            .await?;
        let response = Self::check(raw, kind, Some(id)).await?;
        Self::decode_envelope(response, kind).await
    }

    async fn delete_resource(&self, kind: ResourceKind, id: &str) -> Result<(), ComputeError> {
        require_id(kind, id)?;
        let raw = self
            .send(Method::DELETE, &resource_path(kind, id), None)
            .await?;
        Self::check(raw, kind, Some(id)).await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.endpoint, path);
        self.http
            .request(method, url)
            .header("X-Auth-Token", &self.auth_token)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, ComputeError> {
        let mut request = self.request(method.clone(), path);
        if let Some(json) = body {
            request = request.json(json);
        }
        let response = request.send().await?;
        tracing::debug!(
            method = %method,
            path,
            status = response.status().as_u16(),
            "compute request completed"
        );
        Ok(response)
    }

    async fn check(
        response: Response,
        kind: ResourceKind,
        id: Option<&str>,
    ) -> Result<Response, ComputeError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            if let Some(missing) = id {
                return Err(ComputeError::NotFound {
                    kind,
                    id: missing.to_owned(),
                });
            }
        }

        let body = response.text().await?;
        Err(ComputeError::Api {
            status: status.as_u16(),
            message: fault_message(&body),
        })
    }

    async fn decode<T: DeserializeOwned>(
        response: Response,
        kind: ResourceKind,
    ) -> Result<T, ComputeError> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|err| ComputeError::Decode {
            kind,
            message: err.to_string(),
        })
    }

    async fn decode_envelope<T: DeserializeOwned>(
        response: Response,
        kind: ResourceKind,
    ) -> Result<T, ComputeError> {
        let mut value: Value = Self::decode(response, kind).await?;
        let inner = value
            .get_mut(kind.envelope_key())
            .map(Value::take)
            .ok_or_else(|| ComputeError::Decode {
                kind,
                message: format!("response missing \"{}\" envelope", kind.envelope_key()),
            })?;
        serde_json::from_value(inner).map_err(|err| ComputeError::Decode {
            kind,
            message: err.to_string(),
        })
    }
}

impl fmt::Debug for ComputeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputeClient")
            .field("endpoint", &self.endpoint)
            .field("auth_token", &"<redacted>")
            .field("wait_defaults", &self.wait_defaults)
            .finish_non_exhaustive()
    }
}

fn require_id(kind: ResourceKind, id: &str) -> Result<(), ComputeError> {
    if id.trim().is_empty() {
        return Err(ComputeError::Validation(format!("{kind} id")));
    }
    Ok(())
}

fn resource_path(kind: ResourceKind, id: &str) -> String {
    format!("{}/{}", kind.collection(), id.trim())
}

fn action_path(server_id: &str) -> String {
    format!("{}/action", resource_path(ResourceKind::Server, server_id))
}

/// Extracts the message from a Nova fault body such as
/// `{"itemNotFound": {"code": 404, "message": "..."}}`, falling back to the
/// raw body.
fn fault_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value.as_object()?.values().find_map(|fault| {
                fault
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_owned)
            })
        })
        .unwrap_or_else(|| body.trim().to_owned())
}

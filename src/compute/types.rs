//! Resource snapshots and request bodies exchanged with the Compute API.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::status::{HasStatus, ResourceStatus};

use super::ComputeError;

/// Kinds of resource the client can fetch and wait on.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ResourceKind {
    /// Compute instance (`servers`).
    Server,
    /// Block storage volume (`os-volumes`).
    Volume,
    /// Volume snapshot (`os-snapshots`).
    Snapshot,
    /// Machine image (`images`).
    Image,
}

impl ResourceKind {
    /// Collection path segment for this kind.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Server => "servers",
            Self::Volume => "os-volumes",
            Self::Snapshot => "os-snapshots",
            Self::Image => "images",
        }
    }

    /// JSON envelope key wrapping a single resource.
    #[must_use]
    pub const fn envelope_key(self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Volume => "volume",
            Self::Snapshot => "snapshot",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.envelope_key())
    }
}

/// Fault recorded on a server that entered `ERROR`.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct ServerFault {
    /// HTTP-style fault code.
    pub code: u16,
    /// Human readable fault message.
    pub message: String,
}

/// Snapshot of a compute instance.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct Server {
    /// Server identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Lifecycle status (`BUILD`, `ACTIVE`, `SHUTOFF`, ...).
    pub status: ResourceStatus,
    /// Task in progress, when the extended status extension is enabled.
    #[serde(default, rename = "OS-EXT-STS:task_state")]
    pub task_state: Option<String>,
    /// Build progress percentage reported during `BUILD`.
    #[serde(default)]
    pub progress: Option<u8>,
    /// Fault details for servers in `ERROR`.
    #[serde(default)]
    pub fault: Option<ServerFault>,
    /// User metadata.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl HasStatus for Server {
    fn status(&self) -> &ResourceStatus {
        &self.status
    }
}

/// Attachment of a volume to a server.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct VolumeAttachment {
    /// Server the volume is attached to.
    #[serde(default, rename = "serverId")]
    pub server_id: Option<String>,
    /// Device path inside the guest.
    #[serde(default)]
    pub device: Option<String>,
}

/// Snapshot of a block storage volume.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct Volume {
    /// Volume identifier.
    pub id: String,
    /// Lifecycle status (`creating`, `available`, `in-use`, ...).
    pub status: ResourceStatus,
    /// Size in GiB.
    pub size: u64,
    /// Display name.
    #[serde(default, rename = "displayName")]
    pub display_name: Option<String>,
    /// Current attachments; empty entries are dropped by the API.
    #[serde(default)]
    pub attachments: Vec<VolumeAttachment>,
}

impl HasStatus for Volume {
    fn status(&self) -> &ResourceStatus {
        &self.status
    }
}

/// Snapshot of a volume snapshot.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct Snapshot {
    /// Snapshot identifier.
    pub id: String,
    /// Lifecycle status (`creating`, `available`, ...).
    pub status: ResourceStatus,
    /// Size in GiB.
    pub size: u64,
    /// Volume the snapshot was taken from.
    #[serde(rename = "volumeId")]
    pub volume_id: String,
    /// Display name.
    #[serde(default, rename = "displayName")]
    pub display_name: Option<String>,
}

impl HasStatus for Snapshot {
    fn status(&self) -> &ResourceStatus {
        &self.status
    }
}

/// Snapshot of a machine image.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct Image {
    /// Image identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Lifecycle status (`SAVING`, `ACTIVE`, `DELETED`, ...).
    pub status: ResourceStatus,
    /// Upload progress percentage.
    #[serde(default)]
    pub progress: Option<u8>,
    /// Minimum disk size in GiB.
    #[serde(default, rename = "minDisk")]
    pub min_disk: Option<u64>,
    /// Minimum RAM in MiB.
    #[serde(default, rename = "minRam")]
    pub min_ram: Option<u64>,
}

impl HasStatus for Image {
    fn status(&self) -> &ResourceStatus {
        &self.status
    }
}

/// Identifier and one-time password returned when a server is created.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct CreatedServer {
    /// Identifier of the new server.
    pub id: String,
    /// Generated administrator password, when the cloud returns one.
    #[serde(default, rename = "adminPass")]
    pub admin_pass: Option<String>,
}

/// Network reference for a new server.
#[derive(Clone, Debug, Serialize, Eq, PartialEq)]
pub struct NetworkRef {
    /// Network UUID.
    pub uuid: String,
}

/// Body of `POST servers`.
#[derive(Clone, Debug, Serialize, Eq, PartialEq)]
pub struct ServerCreateRequest {
    /// Display name.
    pub name: String,
    /// Image identifier to boot from.
    #[serde(rename = "imageRef")]
    pub image_ref: String,
    /// Flavor identifier.
    #[serde(rename = "flavorRef")]
    pub flavor_ref: String,
    /// Key pair injected into the guest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    /// Networks to attach.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<NetworkRef>,
    /// User metadata.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl ServerCreateRequest {
    /// Starts a builder for a [`ServerCreateRequest`].
    #[must_use]
    pub fn builder() -> ServerCreateRequestBuilder {
        ServerCreateRequestBuilder::default()
    }

    /// Validates the request, returning a descriptive error when a required
    /// field is missing.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::Validation`] when any required field is empty.
    pub fn validate(&self) -> Result<(), ComputeError> {
        if self.name.is_empty() {
            return Err(ComputeError::Validation(String::from("name")));
        }
        if self.image_ref.is_empty() {
            return Err(ComputeError::Validation(String::from("image_ref")));
        }
        if self.flavor_ref.is_empty() {
            return Err(ComputeError::Validation(String::from("flavor_ref")));
        }
        Ok(())
    }
}

/// Builder for [`ServerCreateRequest`] that trims and validates on build.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ServerCreateRequestBuilder {
    name: String,
    image_ref: String,
    flavor_ref: String,
    key_name: Option<String>,
    networks: Vec<String>,
    metadata: BTreeMap<String, String>,
}

impl ServerCreateRequestBuilder {
    /// Sets the display name.
    #[must_use]
    pub fn name(mut self, value: impl Into<String>) -> Self {
        self.name = value.into();
        self
    }

    /// Sets the boot image.
    #[must_use]
    pub fn image_ref(mut self, value: impl Into<String>) -> Self {
        self.image_ref = value.into();
        self
    }

    /// Sets the flavor.
    #[must_use]
    pub fn flavor_ref(mut self, value: impl Into<String>) -> Self {
        self.flavor_ref = value.into();
        self
    }

    /// Sets the optional key pair name.
    #[must_use]
    pub fn key_name(mut self, value: Option<String>) -> Self {
        self.key_name = value;
        self
    }

    /// Adds a network by UUID.
    #[must_use]
    pub fn network(mut self, uuid: impl Into<String>) -> Self {
        self.networks.push(uuid.into());
        self
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Builds and validates the [`ServerCreateRequest`], trimming string
    /// inputs.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::Validation`] when any required field is empty.
    pub fn build(self) -> Result<ServerCreateRequest, ComputeError> {
        let request = ServerCreateRequest {
            name: self.name.trim().to_owned(),
            image_ref: self.image_ref.trim().to_owned(),
            flavor_ref: self.flavor_ref.trim().to_owned(),
            key_name: self
                .key_name
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty()),
            networks: self
                .networks
                .into_iter()
                .map(|uuid| NetworkRef {
                    uuid: uuid.trim().to_owned(),
                })
                .collect(),
            metadata: self.metadata,
        };
        request.validate()?;
        Ok(request)
    }
}

/// Body of `POST os-volumes`.
#[derive(Clone, Debug, Serialize, Eq, PartialEq)]
pub struct VolumeCreateRequest {
    /// Size in GiB.
    pub size: u64,
    /// Optional display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl VolumeCreateRequest {
    /// Creates a request for a volume of `size_gb` GiB.
    #[must_use]
    pub const fn new(size_gb: u64) -> Self {
        Self {
            size: size_gb,
            display_name: None,
        }
    }

    /// Sets the display name, trimming whitespace.
    #[must_use]
    pub fn display_name(mut self, value: impl Into<String>) -> Self {
        self.display_name = Some(value.into().trim().to_owned());
        self
    }

    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::Validation`] when the size is zero.
    pub fn validate(&self) -> Result<(), ComputeError> {
        if self.size == 0 {
            return Err(ComputeError::Validation(String::from("size")));
        }
        Ok(())
    }
}

/// Body of `POST os-snapshots`.
#[derive(Clone, Debug, Serialize, Eq, PartialEq)]
pub struct SnapshotCreateRequest {
    /// Volume to snapshot.
    pub volume_id: String,
    /// Optional display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Snapshot even when the volume is attached.
    pub force: bool,
}

impl SnapshotCreateRequest {
    /// Creates a request to snapshot `volume_id`.
    #[must_use]
    pub fn new(volume_id: impl Into<String>) -> Self {
        Self {
            volume_id: volume_id.into().trim().to_owned(),
            display_name: None,
            force: false,
        }
    }

    /// Sets the display name, trimming whitespace.
    #[must_use]
    pub fn display_name(mut self, value: impl Into<String>) -> Self {
        self.display_name = Some(value.into().trim().to_owned());
        self
    }

    /// Allows snapshotting an attached volume.
    #[must_use]
    pub const fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::Validation`] when the volume id is empty.
    pub fn validate(&self) -> Result<(), ComputeError> {
        if self.volume_id.is_empty() {
            return Err(ComputeError::Validation(String::from("volume_id")));
        }
        Ok(())
    }
}

/// Reboot flavour for [`ServerAction::Reboot`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RebootKind {
    /// Graceful guest reboot.
    Soft,
    /// Power cycle.
    Hard,
}

/// Power actions sent to `POST servers/{id}/action`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ServerAction {
    /// Power on a `SHUTOFF` server.
    Start,
    /// Power off an `ACTIVE` server.
    Stop,
    /// Reboot the server.
    Reboot(RebootKind),
}

impl ServerAction {
    /// JSON body for this action.
    #[must_use]
    pub fn body(&self) -> Value {
        match self {
            Self::Start => json!({ "os-start": null }),
            Self::Stop => json!({ "os-stop": null }),
            Self::Reboot(RebootKind::Soft) => json!({ "reboot": { "type": "SOFT" } }),
            Self::Reboot(RebootKind::Hard) => json!({ "reboot": { "type": "HARD" } }),
        }
    }

    /// Status the server settles in once the action completes.
    #[must_use]
    pub const fn settled_status(&self) -> ResourceStatus {
        match self {
            Self::Start | Self::Reboot(_) => ResourceStatus::ACTIVE,
            Self::Stop => ResourceStatus::SHUTOFF,
        }
    }
}

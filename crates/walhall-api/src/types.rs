//! Resource types owned by Walhall Core.
//!
//! Field names follow the upstream wire format exactly; UUIDs and timestamps
//! travel as strings and numeric identifiers as `i64`. All types deserialize
//! leniently (missing fields default) because upstream responses carry many
//! fields the adaptor never reads.

use serde::{Deserialize, Serialize};

/// A logic module registered in an organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Module name.
    #[serde(default)]
    pub name: String,
    /// Module UUID.
    #[serde(rename = "module_uuid", default)]
    pub uuid: String,
    /// Source repository reference (`owner/repo`).
    #[serde(rename = "github_repo", default)]
    pub repo: String,
    /// Container image name within the registry.
    #[serde(default)]
    pub image: String,
    /// Published versions, newest first as returned by upstream.
    #[serde(default)]
    pub versions: Vec<ModuleVersion>,
}

/// One published version of a [`Module`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleVersion {
    /// Numeric version id, used to address configurations.
    #[serde(default)]
    pub id: i64,
    /// Version UUID.
    #[serde(rename = "version_uuid", default)]
    pub uuid: String,
    /// Version label (e.g. `0.0.3`).
    #[serde(default)]
    pub version: String,
}

/// An environment belonging to one application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Module versions deployed into this environment, each paired with its
    /// owning module.
    #[serde(rename = "logic_module_versions", default)]
    pub module_versions: Vec<EnvironmentModuleVersion>,
    /// Environment UUID.
    #[serde(rename = "env_uuid", default)]
    pub uuid: String,
    /// Environment name. Name matching is adaptor-side; upstream has no
    /// by-name environment endpoint.
    #[serde(default)]
    pub name: String,
}

/// A module version as it appears inside an [`Environment`] listing: the
/// version fields inline plus the owning module nested under `logic_module`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentModuleVersion {
    /// The version itself.
    #[serde(flatten)]
    pub version: ModuleVersion,
    /// The module this version belongs to.
    #[serde(rename = "logic_module", default)]
    pub module: Module,
}

/// A configuration scoped to one (environment, module version) pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Numeric configuration id.
    #[serde(default)]
    pub id: i64,
    /// Configuration UUID.
    #[serde(rename = "configuration_uuid", default)]
    pub uuid: String,
    /// Configuration name.
    #[serde(default)]
    pub name: String,
    /// Arbitrary keyed specification document; the adaptor treats it as
    /// opaque JSON.
    #[serde(default)]
    pub specification: serde_json::Value,
    /// Configuration type (`config_map`, `container`, `ingress`, ...).
    #[serde(rename = "type", default)]
    pub config_type: String,
    /// Upstream processing status.
    #[serde(default)]
    pub status: String,
    /// UUID of the owning environment.
    #[serde(rename = "environment", default)]
    pub environment_uuid: String,
    /// Numeric id of the owning module version.
    #[serde(rename = "logic_module_version", default)]
    pub module_version_id: i64,
    /// Creation timestamp, opaque string.
    #[serde(rename = "create_date", default)]
    pub created_at: String,
    /// Last-edit timestamp, opaque string.
    #[serde(rename = "edit_date", default)]
    pub edited_at: String,
}

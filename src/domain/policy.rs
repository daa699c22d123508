use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::value::{PolicyValue, RegistryValueKind};

/// Id of the single GPO that represents the machine's own policy
pub const LOCAL_POLICY_ID: &str = "LOCAL_COMPUTER_POLICY";

/// Display name of the local GPO
pub const LOCAL_POLICY_NAME: &str = "Local Computer Policy";

/// Display name of the domain placeholder GPO
pub const DEFAULT_DOMAIN_POLICY_NAME: &str = "Default Domain Policy";

/// Root path of registry-backed policies under both hives
pub const POLICIES_ROOT: &str = r"SOFTWARE\Policies";

/// Category a policy setting belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PolicyType {
    UserConfiguration,
    #[default]
    ComputerConfiguration,
    SecuritySettings,
    AdministrativeTemplates,
    SoftwareInstallation,
    Scripts,
    FolderRedirection,
}

impl PolicyType {
    pub fn all() -> &'static [PolicyType] {
        &[
            PolicyType::UserConfiguration,
            PolicyType::ComputerConfiguration,
            PolicyType::SecuritySettings,
            PolicyType::AdministrativeTemplates,
            PolicyType::SoftwareInstallation,
            PolicyType::Scripts,
            PolicyType::FolderRedirection,
        ]
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyType::UserConfiguration => write!(f, "UserConfiguration"),
            PolicyType::ComputerConfiguration => write!(f, "ComputerConfiguration"),
            PolicyType::SecuritySettings => write!(f, "SecuritySettings"),
            PolicyType::AdministrativeTemplates => write!(f, "AdministrativeTemplates"),
            PolicyType::SoftwareInstallation => write!(f, "SoftwareInstallation"),
            PolicyType::Scripts => write!(f, "Scripts"),
            PolicyType::FolderRedirection => write!(f, "FolderRedirection"),
        }
    }
}

/// Status of a GPO
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GpoStatus {
    Enabled,
    Disabled,
    NotConfigured,
    PartiallyConfigured,
}

impl fmt::Display for GpoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpoStatus::Enabled => write!(f, "Enabled"),
            GpoStatus::Disabled => write!(f, "Disabled"),
            GpoStatus::NotConfigured => write!(f, "NotConfigured"),
            GpoStatus::PartiallyConfigured => write!(f, "PartiallyConfigured"),
        }
    }
}

/// A Group Policy Object.
///
/// This is a live view: it is rebuilt from the store (or from placeholder
/// data for domain scope) on every call and never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPolicyObject {
    pub id: String,
    pub name: String,
    pub domain: String,
    pub created_time: DateTime<Utc>,
    pub modified_time: DateTime<Utc>,
    pub status: GpoStatus,
    /// Summary of setting values by name; not the canonical source of settings
    pub settings: BTreeMap<String, PolicyValue>,
}

/// Sentinel for timestamps the store cannot provide (0001-01-01T00:00:00Z)
pub fn unknown_time() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(-62_135_596_800, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// A registry-backed policy value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySetting {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub policy_type: PolicyType,
    pub value: PolicyValue,
    pub is_enabled: bool,
    /// Key path under the scope root, e.g. `SOFTWARE\Policies\Contoso`
    pub registry_path: String,
    /// Value name within `registry_path`
    pub registry_key: String,
    pub value_type: RegistryValueKind,
}

impl PolicySetting {
    /// Build a setting destined for `registry_path\registry_key`.
    pub fn new(
        registry_path: impl Into<String>,
        registry_key: impl Into<String>,
        value: PolicyValue,
        value_type: RegistryValueKind,
    ) -> Self {
        let registry_key = registry_key.into();
        Self {
            name: registry_key.clone(),
            description: String::new(),
            policy_type: PolicyType::default(),
            value,
            is_enabled: false,
            registry_path: registry_path.into(),
            registry_key,
            value_type,
        }
    }

    pub fn with_type(mut self, policy_type: PolicyType) -> Self {
        self.policy_type = policy_type;
        self
    }

    /// Full location of the value, `path\key`
    pub fn location(&self) -> String {
        format!("{}\\{}", self.registry_path, self.registry_key)
    }
}

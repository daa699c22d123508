//! Flattened transfer records for display and serialization

use serde::{Deserialize, Serialize};

use super::policy::{GroupPolicyObject, PolicySetting};

/// Display form of a GPO
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPolicyInfo {
    pub id: String,
    pub name: String,
    pub domain: String,
    pub created_time: String,
    pub modified_time: String,
    pub status: String,
    pub settings_count: usize,
}

impl From<&GroupPolicyObject> for GroupPolicyInfo {
    fn from(gpo: &GroupPolicyObject) -> Self {
        GroupPolicyInfo {
            id: gpo.id.clone(),
            name: gpo.name.clone(),
            domain: gpo.domain.clone(),
            created_time: gpo.created_time.to_rfc3339(),
            modified_time: gpo.modified_time.to_rfc3339(),
            status: gpo.status.to_string(),
            settings_count: gpo.settings.len(),
        }
    }
}

/// Display form of a policy setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySettingInfo {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub policy_type: String,
    pub value: String,
    pub is_enabled: bool,
    pub registry_path: String,
    pub registry_key: String,
    pub value_type: String,
}

impl From<&PolicySetting> for PolicySettingInfo {
    fn from(setting: &PolicySetting) -> Self {
        PolicySettingInfo {
            name: setting.name.clone(),
            description: setting.description.clone(),
            policy_type: setting.policy_type.to_string(),
            value: setting.value.to_string(),
            is_enabled: setting.is_enabled,
            registry_path: setting.registry_path.clone(),
            registry_key: setting.registry_key.clone(),
            value_type: setting.value_type.to_string(),
        }
    }
}

//! Commands for policy settings

use super::gpo::require_done;
use crate::cli::{OutputFormat, SettingKind, SettingScope};
use crate::domain::{
    PolicySetting, PolicySettingInfo, PolicyType, PolicyValue, RegistryValueKind,
};
use crate::error::{AppError, AppResult};
use crate::infrastructure::{PolicyManager, RegistryStore};
use crate::output::render_settings;

/// Arguments of the `set` command
#[derive(Debug, Clone)]
pub struct SetSettingArgs<'a> {
    pub gpo_id: &'a str,
    pub name: &'a str,
    pub value: &'a str,
    pub kind: SettingKind,
    pub path: &'a str,
    pub scope: SettingScope,
}

pub async fn list_settings<S: RegistryStore>(
    manager: &PolicyManager<S>,
    gpo_id: &str,
    format: OutputFormat,
) -> AppResult<String> {
    let settings = manager.get_settings(gpo_id).await?;
    let infos: Vec<PolicySettingInfo> = settings.iter().map(PolicySettingInfo::from).collect();
    render_settings(&infos, format)
}

pub async fn set_setting<S: RegistryStore>(
    manager: &PolicyManager<S>,
    args: SetSettingArgs<'_>,
) -> AppResult<String> {
    let setting = build_setting(&args)?;
    let written = manager.set_setting(args.gpo_id, &setting).await?;
    require_done(
        written,
        format!("setting '{}' in {}", args.name, manager.scope()),
    )?;
    Ok(format!(
        "Setting '{}' updated successfully ({} = {})",
        args.name,
        setting.location(),
        setting.value
    ))
}

pub async fn remove_setting<S: RegistryStore>(
    manager: &PolicyManager<S>,
    gpo_id: &str,
    name: &str,
) -> AppResult<String> {
    let removed = manager.remove_setting(gpo_id, name).await?;
    if !removed {
        return Err(if manager.is_local_policy() {
            AppError::SettingNotFound(name.to_string())
        } else {
            AppError::NotImplemented(format!("removing '{}' in {}", name, manager.scope()))
        });
    }
    Ok(format!("Setting '{}' removed successfully", name))
}

/// Build the setting described by the `set` arguments
pub fn build_setting(args: &SetSettingArgs<'_>) -> AppResult<PolicySetting> {
    let (value, value_type) = match args.kind {
        SettingKind::String => (PolicyValue::String(args.value.to_string()), RegistryValueKind::String),
        SettingKind::Integer => {
            let data = PolicyValue::String(args.value.to_string())
                .to_registry_data(RegistryValueKind::DWord)?;
            (PolicyValue::from(data), RegistryValueKind::DWord)
        }
        SettingKind::Boolean => (
            PolicyValue::Boolean(parse_bool(args.value)?),
            RegistryValueKind::DWord,
        ),
    };

    let policy_type = match args.scope {
        SettingScope::Computer => PolicyType::ComputerConfiguration,
        SettingScope::User => PolicyType::UserConfiguration,
    };

    Ok(PolicySetting::new(args.path, args.name, value, value_type).with_type(policy_type))
}

fn parse_bool(s: &str) -> AppResult<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(AppError::InvalidValue(format!("'{}' is not a boolean", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PolicyScope, POLICIES_ROOT};
    use crate::infrastructure::{MemoryRegistry, RegistryRoot};

    fn args<'a>(value: &'a str, kind: SettingKind, scope: SettingScope) -> SetSettingArgs<'a> {
        SetSettingArgs {
            gpo_id: "LOCAL_COMPUTER_POLICY",
            name: "Flag",
            value,
            kind,
            path: r"SOFTWARE\Policies\TestApp",
            scope,
        }
    }

    #[test]
    fn test_build_integer_setting() {
        let setting = build_setting(&args("42", SettingKind::Integer, SettingScope::Computer)).unwrap();
        assert_eq!(setting.value, PolicyValue::DWord(42));
        assert_eq!(setting.value_type, RegistryValueKind::DWord);
        assert_eq!(setting.policy_type, PolicyType::ComputerConfiguration);
    }

    #[test]
    fn test_build_boolean_user_setting() {
        let setting = build_setting(&args("Yes", SettingKind::Boolean, SettingScope::User)).unwrap();
        assert_eq!(setting.value, PolicyValue::Boolean(true));
        assert_eq!(setting.policy_type, PolicyType::UserConfiguration);
    }

    #[test]
    fn test_build_negative_integer_setting() {
        let setting = build_setting(&args("-1", SettingKind::Integer, SettingScope::Computer)).unwrap();
        assert_eq!(setting.value, PolicyValue::DWord(0xFFFF_FFFF));
        assert!(build_setting(&args("-2147483649", SettingKind::Integer, SettingScope::Computer)).is_err());
    }

    #[test]
    fn test_build_rejects_bad_values() {
        assert!(build_setting(&args("abc", SettingKind::Integer, SettingScope::Computer)).is_err());
        assert!(build_setting(&args("maybe", SettingKind::Boolean, SettingScope::Computer)).is_err());
    }

    #[tokio::test]
    async fn test_set_then_remove_through_commands() {
        let registry = MemoryRegistry::new();
        let manager = PolicyManager::with_store(PolicyScope::Local, registry.clone());

        let message = set_setting(&manager, args("1", SettingKind::Boolean, SettingScope::User))
            .await
            .unwrap();
        assert!(message.contains("Flag"));
        assert_eq!(
            registry.value_count(RegistryRoot::User, r"SOFTWARE\Policies\TestApp"),
            1
        );
        assert_eq!(registry.value_count(RegistryRoot::Machine, POLICIES_ROOT), 0);

        remove_setting(&manager, "LOCAL_COMPUTER_POLICY", "Flag").await.unwrap();
        let missing = remove_setting(&manager, "LOCAL_COMPUTER_POLICY", "Flag").await;
        assert!(matches!(missing, Err(AppError::SettingNotFound(_))));
    }
}

//! Policy category inference from registry paths

use crate::domain::PolicyType;

/// Marker for paths under the current user's hive
const USER_MARKER: &str = "currentuser";

/// Marker for paths under the machine-wide hive
const MACHINE_MARKER: &str = "localmachine";

/// Map a registry path to the policy category it belongs to.
///
/// The user marker wins over the machine marker. Discovery only ever yields
/// `UserConfiguration`, `ComputerConfiguration` or `AdministrativeTemplates`;
/// the other categories exist for hand-built settings.
pub fn classify(path: &str) -> PolicyType {
    let lowered = path.to_lowercase();

    if lowered.contains(USER_MARKER) {
        PolicyType::UserConfiguration
    } else if lowered.contains(MACHINE_MARKER) {
        PolicyType::ComputerConfiguration
    } else {
        PolicyType::AdministrativeTemplates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_marker() {
        assert_eq!(
            classify(r"HKEY_CURRENT_USER\CurrentUser\SOFTWARE\Policies"),
            PolicyType::UserConfiguration
        );
        assert_eq!(classify(r"x\CURRENTUSER\y"), PolicyType::UserConfiguration);
    }

    #[test]
    fn test_machine_marker() {
        assert_eq!(
            classify(r"LocalMachine\SOFTWARE\Policies\Microsoft"),
            PolicyType::ComputerConfiguration
        );
        assert_eq!(classify("localmachine"), PolicyType::ComputerConfiguration);
    }

    #[test]
    fn test_user_marker_takes_precedence() {
        assert_eq!(
            classify(r"LocalMachine\CurrentUser\Settings"),
            PolicyType::UserConfiguration
        );
        assert_eq!(
            classify(r"CurrentUser\LocalMachine\Settings"),
            PolicyType::UserConfiguration
        );
    }

    #[test]
    fn test_fallback_is_administrative_templates() {
        assert_eq!(
            classify(r"SOFTWARE\Policies\Microsoft\Windows"),
            PolicyType::AdministrativeTemplates
        );
        assert_eq!(classify(""), PolicyType::AdministrativeTemplates);
    }

    #[test]
    fn test_is_deterministic() {
        let path = r"SOFTWARE\Policies\LocalMachineTools";
        assert_eq!(classify(path), classify(path));
    }
}

//! GPO identity resolution
//!
//! The local machine always has exactly one GPO, the Local Computer Policy.
//! Domain scope has no directory lookup behind it: it yields a placeholder
//! whose id is freshly generated on every call, so an id returned by one
//! listing will not be found by a later lookup.

use chrono::{Duration, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::registry::{RegistryKey, RegistryRoot, RegistryStore};
use crate::domain::{
    unknown_time, GpoStatus, GroupPolicyObject, DEFAULT_DOMAIN_POLICY_NAME, LOCAL_POLICY_ID,
    LOCAL_POLICY_NAME, POLICIES_ROOT,
};

#[cfg(windows)]
use windows::{
    core::PWSTR,
    Win32::System::SystemInformation::{ComputerNameDnsHostname, GetComputerNameExW},
};

/// The Local Computer Policy as currently reflected by the store
pub fn local_policy<S: RegistryStore>(store: &S) -> GroupPolicyObject {
    let modified_time = policies_last_write(store).unwrap_or_else(Utc::now);

    GroupPolicyObject {
        id: LOCAL_POLICY_ID.to_string(),
        name: LOCAL_POLICY_NAME.to_string(),
        domain: machine_name(),
        created_time: unknown_time(),
        modified_time,
        status: GpoStatus::Enabled,
        settings: BTreeMap::new(),
    }
}

/// Placeholder for a domain GPO; a new id is generated on every call
pub fn domain_placeholder(domain: &str) -> GroupPolicyObject {
    let now = Utc::now();

    GroupPolicyObject {
        id: Uuid::new_v4().to_string(),
        name: DEFAULT_DOMAIN_POLICY_NAME.to_string(),
        domain: domain.to_string(),
        created_time: now - Duration::days(30),
        modified_time: now - Duration::days(1),
        status: GpoStatus::Enabled,
        settings: BTreeMap::new(),
    }
}

/// Last write time of the machine policies key, when the store exposes it
fn policies_last_write<S: RegistryStore>(store: &S) -> Option<chrono::DateTime<Utc>> {
    let key = match store.open_read(RegistryRoot::Machine, POLICIES_ROOT) {
        Ok(Some(key)) => key,
        Ok(None) => return None,
        Err(e) => {
            tracing::debug!(error = %e, "Cannot open machine policies key for timestamp");
            return None;
        }
    };

    key.last_write_time().unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Cannot query policies key timestamp");
        None
    })
}

/// Name of this machine
#[cfg(windows)]
pub fn machine_name() -> String {
    unsafe {
        let mut size: u32 = 0;
        // First call reports the required buffer length
        let _ = GetComputerNameExW(ComputerNameDnsHostname, PWSTR::null(), &mut size);
        if size == 0 {
            return fallback_machine_name();
        }

        let mut buffer = vec![0u16; size as usize];
        match GetComputerNameExW(
            ComputerNameDnsHostname,
            PWSTR(buffer.as_mut_ptr()),
            &mut size,
        ) {
            Ok(()) => String::from_utf16_lossy(&buffer[..size as usize]),
            Err(e) => {
                tracing::debug!(error = %e, "GetComputerNameExW failed, using environment");
                fallback_machine_name()
            }
        }
    }
}

/// Non-Windows fallback - uses the environment
#[cfg(not(windows))]
pub fn machine_name() -> String {
    fallback_machine_name()
}

fn fallback_machine_name() -> String {
    ["COMPUTERNAME", "HOSTNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RegistryData;
    use crate::infrastructure::MemoryRegistry;

    #[test]
    fn test_local_policy_identity() {
        let registry = MemoryRegistry::new();
        let gpo = local_policy(&registry);

        assert_eq!(gpo.id, "LOCAL_COMPUTER_POLICY");
        assert_eq!(gpo.name, "Local Computer Policy");
        assert_eq!(gpo.status, GpoStatus::Enabled);
        assert_eq!(gpo.created_time, unknown_time());
        assert!(!gpo.domain.is_empty());
        assert!(gpo.settings.is_empty());
    }

    #[test]
    fn test_local_modified_time_comes_from_store() {
        let registry = MemoryRegistry::new();
        let before = Utc::now();
        registry.insert(RegistryRoot::Machine, POLICIES_ROOT, "A", RegistryData::DWord(1));
        let after = Utc::now();

        let gpo = local_policy(&registry);
        assert!(gpo.modified_time >= before && gpo.modified_time <= after);
    }

    #[test]
    fn test_domain_placeholder_ids_are_not_stable() {
        let first = domain_placeholder("contoso.com");
        let second = domain_placeholder("contoso.com");

        assert_eq!(first.name, "Default Domain Policy");
        assert_eq!(first.domain, "contoso.com");
        assert!(Uuid::parse_str(&first.id).is_ok());
        // Known limitation: nothing is looked up, so every call is a new identity
        assert_ne!(first.id, second.id);
        assert!(first.created_time < first.modified_time);
    }
}

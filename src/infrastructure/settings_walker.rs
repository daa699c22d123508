//! Recursive walk of registry policy keys
//!
//! Produces one `PolicySetting` per value, pre-order: the values of a key in
//! enumeration order, then each subkey in enumeration order. Policy hives
//! routinely contain keys the caller cannot read, so a failure at one key
//! only drops that key and the walk carries on with its siblings.

use std::ops::ControlFlow;

use super::classifier::classify;
use super::registry::{join_path, RegistryKey, RegistryRoot, RegistryStore};
use crate::domain::{PolicySetting, PolicyType, PolicyValue, RegistryData};

/// Keys nested deeper than this below the start path are skipped
pub const MAX_WALK_DEPTH: usize = 64;

/// Where a value was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueLocation {
    pub root: RegistryRoot,
    pub path: String,
    pub name: String,
}

/// Collect every setting under `start_path`
pub fn walk_settings<S: RegistryStore>(
    store: &S,
    root: RegistryRoot,
    start_path: &str,
) -> Vec<PolicySetting> {
    let mut settings = Vec::new();
    let _ = visit_settings(store, root, start_path, &mut |setting| {
        settings.push(setting);
        ControlFlow::<()>::Continue(())
    });
    tracing::debug!(
        root = %root,
        path = start_path,
        count = settings.len(),
        "Walked policy settings"
    );
    settings
}

/// Find the first value named `name` (case-insensitive) in walk order
pub fn find_value<S: RegistryStore>(
    store: &S,
    root: RegistryRoot,
    start_path: &str,
    name: &str,
) -> Option<ValueLocation> {
    let found = visit_settings(store, root, start_path, &mut |setting| {
        if setting.registry_key.eq_ignore_ascii_case(name) {
            ControlFlow::Break(ValueLocation {
                root,
                path: setting.registry_path,
                name: setting.registry_key,
            })
        } else {
            ControlFlow::Continue(())
        }
    });

    match found {
        ControlFlow::Break(location) => Some(location),
        ControlFlow::Continue(()) => None,
    }
}

/// Feed each setting under `start_path` to `visitor` until it breaks
pub fn visit_settings<S, B>(
    store: &S,
    root: RegistryRoot,
    start_path: &str,
    visitor: &mut impl FnMut(PolicySetting) -> ControlFlow<B>,
) -> ControlFlow<B>
where
    S: RegistryStore,
{
    visit_key(store, root, start_path, 0, visitor)
}

fn visit_key<S, B>(
    store: &S,
    root: RegistryRoot,
    path: &str,
    depth: usize,
    visitor: &mut impl FnMut(PolicySetting) -> ControlFlow<B>,
) -> ControlFlow<B>
where
    S: RegistryStore,
{
    if depth > MAX_WALK_DEPTH {
        tracing::warn!(root = %root, path, "Registry nesting too deep, skipping key");
        return ControlFlow::Continue(());
    }

    let key = match store.open_read(root, path) {
        Ok(Some(key)) => key,
        Ok(None) => {
            tracing::debug!(root = %root, path, "Registry key not present");
            return ControlFlow::Continue(());
        }
        Err(e) => {
            tracing::warn!(root = %root, path, error = %e, "Cannot open registry key, skipping");
            return ControlFlow::Continue(());
        }
    };

    let value_names = key.value_names().unwrap_or_else(|e| {
        tracing::warn!(root = %root, path, error = %e, "Cannot list registry values, skipping them");
        Vec::new()
    });

    let policy_type = classify(path);
    for name in value_names {
        match key.get_value(&name) {
            Ok(data) => visitor(discovered_setting(path, name, data, policy_type))?,
            Err(e) => {
                tracing::warn!(root = %root, path, value = %name, error = %e, "Cannot read registry value");
            }
        }
    }

    let subkeys = match key.subkey_names() {
        Ok(names) => names,
        Err(e) => {
            tracing::warn!(root = %root, path, error = %e, "Cannot list registry subkeys");
            return ControlFlow::Continue(());
        }
    };
    drop(key);

    for subkey in subkeys {
        visit_key(store, root, &join_path(path, &subkey), depth + 1, visitor)?;
    }

    ControlFlow::Continue(())
}

fn discovered_setting(
    path: &str,
    name: String,
    data: RegistryData,
    policy_type: PolicyType,
) -> PolicySetting {
    PolicySetting {
        name: name.clone(),
        description: String::new(),
        policy_type,
        value_type: data.kind(),
        value: PolicyValue::from(data),
        is_enabled: true,
        registry_path: path.to_string(),
        registry_key: name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{MemoryKey, MemoryRegistry, RegistryError, RegistryResult};
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;

    /// Store whose key at `broken_path` cannot list its values
    struct BrokenValueList {
        inner: MemoryRegistry,
        broken_path: String,
    }

    struct BrokenKey {
        inner: MemoryKey,
        broken: bool,
    }

    impl RegistryStore for BrokenValueList {
        type Key = BrokenKey;

        fn open_read(&self, root: RegistryRoot, path: &str) -> RegistryResult<Option<BrokenKey>> {
            Ok(self.inner.open_read(root, path)?.map(|inner| BrokenKey {
                inner,
                broken: path.eq_ignore_ascii_case(&self.broken_path),
            }))
        }

        fn open_write(&self, root: RegistryRoot, path: &str) -> RegistryResult<BrokenKey> {
            Ok(BrokenKey {
                inner: self.inner.open_write(root, path)?,
                broken: false,
            })
        }
    }

    impl RegistryKey for BrokenKey {
        fn value_names(&self) -> RegistryResult<Vec<String>> {
            if self.broken {
                return Err(RegistryError::InvalidData("value list unavailable".to_string()));
            }
            self.inner.value_names()
        }

        fn subkey_names(&self) -> RegistryResult<Vec<String>> {
            self.inner.subkey_names()
        }

        fn get_value(&self, name: &str) -> RegistryResult<RegistryData> {
            self.inner.get_value(name)
        }

        fn set_value(&self, name: &str, data: &RegistryData) -> RegistryResult<()> {
            self.inner.set_value(name, data)
        }

        fn delete_value(&self, name: &str) -> RegistryResult<bool> {
            self.inner.delete_value(name)
        }

        fn last_write_time(&self) -> RegistryResult<Option<DateTime<Utc>>> {
            self.inner.last_write_time()
        }
    }

    const ROOT: &str = r"SOFTWARE\Policies";

    fn seeded() -> MemoryRegistry {
        let registry = MemoryRegistry::new();
        registry.insert(RegistryRoot::Machine, ROOT, "A", RegistryData::DWord(1));
        registry.insert(RegistryRoot::Machine, ROOT, "B", RegistryData::String("b".to_string()));
        registry.insert(
            RegistryRoot::Machine,
            &join_path(ROOT, "X"),
            "C",
            RegistryData::QWord(3),
        );
        registry
    }

    fn names(settings: &[PolicySetting]) -> Vec<&str> {
        settings.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_values_before_children() {
        let settings = walk_settings(&seeded(), RegistryRoot::Machine, ROOT);
        assert_eq!(names(&settings), vec!["A", "B", "C"]);
        assert_eq!(settings[2].registry_path, r"SOFTWARE\Policies\X");
        assert_eq!(settings[2].value, PolicyValue::QWord(3));
        assert!(settings.iter().all(|s| s.is_enabled && s.description.is_empty()));
    }

    #[test]
    fn test_depth_first_order() {
        let registry = seeded();
        registry.insert(
            RegistryRoot::Machine,
            &join_path(ROOT, r"X\Deep"),
            "D",
            RegistryData::DWord(4),
        );
        registry.insert(
            RegistryRoot::Machine,
            &join_path(ROOT, "Y"),
            "E",
            RegistryData::DWord(5),
        );

        let settings = walk_settings(&registry, RegistryRoot::Machine, ROOT);
        assert_eq!(names(&settings), vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn test_unreadable_subkey_is_skipped() {
        let registry = seeded();
        registry.deny_read(RegistryRoot::Machine, &join_path(ROOT, "X"));

        let settings = walk_settings(&registry, RegistryRoot::Machine, ROOT);
        assert_eq!(names(&settings), vec!["A", "B"]);
    }

    #[test]
    fn test_unlistable_values_still_walk_subkeys() {
        let registry = seeded();
        let store = BrokenValueList {
            inner: registry,
            broken_path: ROOT.to_string(),
        };

        let settings = walk_settings(&store, RegistryRoot::Machine, ROOT);
        assert_eq!(names(&settings), vec!["C"]);
    }

    #[test]
    fn test_missing_start_path_yields_nothing() {
        let registry = seeded();
        assert!(walk_settings(&registry, RegistryRoot::User, ROOT).is_empty());
    }

    #[test]
    fn test_discovered_type_follows_classifier() {
        let registry = MemoryRegistry::new();
        registry.insert(
            RegistryRoot::Machine,
            r"SOFTWARE\Policies\LocalMachine",
            "Z",
            RegistryData::DWord(0),
        );
        let settings = walk_settings(&registry, RegistryRoot::Machine, ROOT);
        assert_eq!(settings[0].policy_type, PolicyType::ComputerConfiguration);
    }

    #[test]
    fn test_depth_cap() {
        let registry = MemoryRegistry::new();
        let deep_path = (0..=MAX_WALK_DEPTH + 1).fold(ROOT.to_string(), |path, i| {
            join_path(&path, &format!("K{}", i))
        });
        registry.insert(RegistryRoot::Machine, &deep_path, "TooDeep", RegistryData::DWord(1));
        registry.insert(RegistryRoot::Machine, ROOT, "Shallow", RegistryData::DWord(1));

        let settings = walk_settings(&registry, RegistryRoot::Machine, ROOT);
        assert_eq!(names(&settings), vec!["Shallow"]);
    }

    #[test]
    fn test_find_value_stops_at_first_match() {
        let registry = seeded();
        registry.insert(
            RegistryRoot::Machine,
            &join_path(ROOT, "Y"),
            "C",
            RegistryData::DWord(9),
        );

        let location = find_value(&registry, RegistryRoot::Machine, ROOT, "c").unwrap();
        assert_eq!(location.path, r"SOFTWARE\Policies\X");
        assert_eq!(location.name, "C");
        assert!(find_value(&registry, RegistryRoot::Machine, ROOT, "Missing").is_none());
    }
}

//! Registry access abstraction
//!
//! Policy values live under two roots: the machine-wide hive and the
//! current user's hive. Everything above this module talks to the store
//! through [`RegistryStore`] and [`RegistryKey`], so the walk and write logic
//! runs the same against the real Windows registry and the in-memory store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::domain::RegistryData;

/// Path separator used in registry key paths
pub const PATH_SEPARATOR: char = '\\';

/// Root hive a policy path is resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistryRoot {
    /// `HKEY_LOCAL_MACHINE`
    Machine,
    /// `HKEY_CURRENT_USER`
    User,
}

impl RegistryRoot {
    pub fn hive_name(&self) -> &'static str {
        match self {
            RegistryRoot::Machine => "HKEY_LOCAL_MACHINE",
            RegistryRoot::User => "HKEY_CURRENT_USER",
        }
    }
}

impl fmt::Display for RegistryRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hive_name())
    }
}

/// Failures reported by a registry store
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("key or value not found: {0}")]
    NotFound(String),

    #[error("access denied: {0}")]
    PermissionDenied(String),

    #[error("invalid registry data: {0}")]
    InvalidData(String),

    #[error("registry I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegistryError {
    /// Classify an OS error, keeping the path it happened on
    pub fn from_io(err: std::io::Error, path: &str) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => RegistryError::NotFound(path.to_string()),
            std::io::ErrorKind::PermissionDenied => RegistryError::PermissionDenied(path.to_string()),
            _ => RegistryError::Io(err),
        }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// An open key in a registry store
pub trait RegistryKey {
    /// Value names in store enumeration order
    fn value_names(&self) -> RegistryResult<Vec<String>>;

    /// Immediate subkey names in store enumeration order
    fn subkey_names(&self) -> RegistryResult<Vec<String>>;

    fn get_value(&self, name: &str) -> RegistryResult<RegistryData>;

    /// Create or overwrite a value
    fn set_value(&self, name: &str, data: &RegistryData) -> RegistryResult<()>;

    /// Delete a value, returning whether it existed
    fn delete_value(&self, name: &str) -> RegistryResult<bool>;

    /// Last time the key was written, if the store tracks it
    fn last_write_time(&self) -> RegistryResult<Option<DateTime<Utc>>>;
}

/// A hierarchical key/value store with a machine root and a user root
pub trait RegistryStore: Send + Sync + 'static {
    type Key: RegistryKey;

    /// Open an existing key for reading; `Ok(None)` when the path does not exist
    fn open_read(&self, root: RegistryRoot, path: &str) -> RegistryResult<Option<Self::Key>>;

    /// Open a key for writing, creating it and any missing parents
    fn open_write(&self, root: RegistryRoot, path: &str) -> RegistryResult<Self::Key>;
}

/// Join a parent key path and a child name
pub fn join_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{}{}{}", parent, PATH_SEPARATOR, child)
    }
}

/// Split a key path into its non-empty segments
pub fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split(PATH_SEPARATOR).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path(r"SOFTWARE\Policies", "TestApp"), r"SOFTWARE\Policies\TestApp");
        assert_eq!(join_path("", "SOFTWARE"), "SOFTWARE");
    }

    #[test]
    fn test_split_path_ignores_empty_segments() {
        let segments: Vec<&str> = split_path(r"\SOFTWARE\\Policies\").collect();
        assert_eq!(segments, vec!["SOFTWARE", "Policies"]);
    }

    #[test]
    fn test_io_error_classification() {
        let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert!(matches!(
            RegistryError::from_io(denied, "X"),
            RegistryError::PermissionDenied(p) if p == "X"
        ));

        let missing = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert!(matches!(RegistryError::from_io(missing, "Y"), RegistryError::NotFound(_)));
    }
}

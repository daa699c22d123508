//! In-memory registry store
//!
//! Keeps an insertion-ordered key tree per root with case-insensitive
//! names, like the real registry. Keys can be marked unreadable or
//! read-only to reproduce the access-denied keys found in real policy hives.
//!
//! Used by the test suite and as the system store on non-Windows builds.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};

use super::registry::{
    split_path, RegistryError, RegistryKey, RegistryResult, RegistryRoot, RegistryStore,
};
use crate::domain::RegistryData;

#[derive(Debug, Default)]
struct MemoryNode {
    name: String,
    values: Vec<(String, RegistryData)>,
    children: Vec<MemoryNode>,
    read_denied: bool,
    write_denied: bool,
    last_write: Option<DateTime<Utc>>,
}

impl MemoryNode {
    fn named(name: &str) -> Self {
        MemoryNode {
            name: name.to_string(),
            last_write: Some(Utc::now()),
            ..Default::default()
        }
    }

    fn find(&self, path: &str) -> Option<&MemoryNode> {
        split_path(path).try_fold(self, |node, segment| {
            node.children
                .iter()
                .find(|child| child.name.eq_ignore_ascii_case(segment))
        })
    }

    fn find_mut(&mut self, path: &str) -> Option<&mut MemoryNode> {
        split_path(path).try_fold(self, |node, segment| {
            node.children
                .iter_mut()
                .find(|child| child.name.eq_ignore_ascii_case(segment))
        })
    }

    fn find_or_create(&mut self, path: &str) -> &mut MemoryNode {
        split_path(path).fold(self, |node, segment| {
            let index = match node
                .children
                .iter()
                .position(|child| child.name.eq_ignore_ascii_case(segment))
            {
                Some(index) => index,
                None => {
                    node.children.push(MemoryNode::named(segment));
                    node.children.len() - 1
                }
            };
            &mut node.children[index]
        })
    }
}

#[derive(Debug, Default)]
struct Hives {
    machine: MemoryNode,
    user: MemoryNode,
}

impl Hives {
    fn root(&self, root: RegistryRoot) -> &MemoryNode {
        match root {
            RegistryRoot::Machine => &self.machine,
            RegistryRoot::User => &self.user,
        }
    }

    fn root_mut(&mut self, root: RegistryRoot) -> &mut MemoryNode {
        match root {
            RegistryRoot::Machine => &mut self.machine,
            RegistryRoot::User => &mut self.user,
        }
    }
}

fn lock_hives(hives: &Mutex<Hives>) -> MutexGuard<'_, Hives> {
    hives.lock().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "In-memory registry mutex was poisoned, recovering");
        e.into_inner()
    })
}

/// Process-local registry store
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    hives: Arc<Mutex<Hives>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a key (created if missing) fail every read with access denied
    pub fn deny_read(&self, root: RegistryRoot, path: &str) {
        let mut hives = lock_hives(&self.hives);
        hives.root_mut(root).find_or_create(path).read_denied = true;
    }

    /// Make a key (created if missing) reject opening for write and every change
    pub fn deny_write(&self, root: RegistryRoot, path: &str) {
        let mut hives = lock_hives(&self.hives);
        hives.root_mut(root).find_or_create(path).write_denied = true;
    }

    /// Stored data of a value, if present
    pub fn value(&self, root: RegistryRoot, path: &str, name: &str) -> Option<RegistryData> {
        let hives = lock_hives(&self.hives);
        hives.root(root).find(path).and_then(|node| {
            node.values
                .iter()
                .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
                .map(|(_, data)| data.clone())
        })
    }

    /// Seed a value, creating its key
    pub fn insert(&self, root: RegistryRoot, path: &str, name: &str, data: RegistryData) {
        let mut hives = lock_hives(&self.hives);
        upsert_value(hives.root_mut(root).find_or_create(path), name, data);
    }

    /// Number of values stored directly under `path`
    pub fn value_count(&self, root: RegistryRoot, path: &str) -> usize {
        let hives = lock_hives(&self.hives);
        hives
            .root(root)
            .find(path)
            .map(|node| node.values.len())
            .unwrap_or(0)
    }
}

fn upsert_value(node: &mut MemoryNode, name: &str, data: RegistryData) {
    match node
        .values
        .iter_mut()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
    {
        Some((_, slot)) => *slot = data,
        None => node.values.push((name.to_string(), data)),
    }
    node.last_write = Some(Utc::now());
}

impl RegistryStore for MemoryRegistry {
    type Key = MemoryKey;

    fn open_read(&self, root: RegistryRoot, path: &str) -> RegistryResult<Option<MemoryKey>> {
        let hives = lock_hives(&self.hives);
        match hives.root(root).find(path) {
            None => Ok(None),
            Some(node) if node.read_denied => Err(RegistryError::PermissionDenied(path.to_string())),
            Some(_) => Ok(Some(MemoryKey {
                hives: Arc::clone(&self.hives),
                root,
                path: path.to_string(),
            })),
        }
    }

    fn open_write(&self, root: RegistryRoot, path: &str) -> RegistryResult<MemoryKey> {
        let mut hives = lock_hives(&self.hives);
        if hives.root_mut(root).find_or_create(path).write_denied {
            return Err(RegistryError::PermissionDenied(path.to_string()));
        }
        Ok(MemoryKey {
            hives: Arc::clone(&self.hives),
            root,
            path: path.to_string(),
        })
    }
}

/// Handle to a key in a [`MemoryRegistry`]
#[derive(Debug)]
pub struct MemoryKey {
    hives: Arc<Mutex<Hives>>,
    root: RegistryRoot,
    path: String,
}

impl MemoryKey {
    fn read<T>(&self, f: impl FnOnce(&MemoryNode) -> RegistryResult<T>) -> RegistryResult<T> {
        let hives = lock_hives(&self.hives);
        let node = hives
            .root(self.root)
            .find(&self.path)
            .ok_or_else(|| RegistryError::NotFound(self.path.clone()))?;
        if node.read_denied {
            return Err(RegistryError::PermissionDenied(self.path.clone()));
        }
        f(node)
    }

    fn write<T>(&self, f: impl FnOnce(&mut MemoryNode) -> T) -> RegistryResult<T> {
        let mut hives = lock_hives(&self.hives);
        let node = hives
            .root_mut(self.root)
            .find_mut(&self.path)
            .ok_or_else(|| RegistryError::NotFound(self.path.clone()))?;
        if node.write_denied {
            return Err(RegistryError::PermissionDenied(self.path.clone()));
        }
        Ok(f(node))
    }
}

impl RegistryKey for MemoryKey {
    fn value_names(&self) -> RegistryResult<Vec<String>> {
        self.read(|node| Ok(node.values.iter().map(|(name, _)| name.clone()).collect()))
    }

    fn subkey_names(&self) -> RegistryResult<Vec<String>> {
        self.read(|node| Ok(node.children.iter().map(|child| child.name.clone()).collect()))
    }

    fn get_value(&self, name: &str) -> RegistryResult<RegistryData> {
        self.read(|node| {
            node.values
                .iter()
                .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
                .map(|(_, data)| data.clone())
                .ok_or_else(|| RegistryError::NotFound(format!("{}\\{}", self.path, name)))
        })
    }

    fn set_value(&self, name: &str, data: &RegistryData) -> RegistryResult<()> {
        self.write(|node| upsert_value(node, name, data.clone()))
    }

    fn delete_value(&self, name: &str) -> RegistryResult<bool> {
        self.write(|node| {
            let before = node.values.len();
            node.values
                .retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            let removed = node.values.len() != before;
            if removed {
                node.last_write = Some(Utc::now());
            }
            removed
        })
    }

    fn last_write_time(&self) -> RegistryResult<Option<DateTime<Utc>>> {
        self.read(|node| Ok(node.last_write))
    }
}

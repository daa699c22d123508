//! Windows registry store backed by `winreg`

use chrono::{DateTime, Utc};
use std::io;
use winreg::enums::{RegType, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_READ, KEY_WRITE};
use winreg::types::FromRegValue;
use winreg::{RegKey, RegValue};

use super::registry::{RegistryError, RegistryKey, RegistryResult, RegistryRoot, RegistryStore};
use crate::domain::RegistryData;

/// The live registry of this machine and the current user
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsRegistry;

impl WindowsRegistry {
    fn predef(root: RegistryRoot) -> RegKey {
        match root {
            RegistryRoot::Machine => RegKey::predef(HKEY_LOCAL_MACHINE),
            RegistryRoot::User => RegKey::predef(HKEY_CURRENT_USER),
        }
    }
}

impl RegistryStore for WindowsRegistry {
    type Key = WindowsKey;

    fn open_read(&self, root: RegistryRoot, path: &str) -> RegistryResult<Option<WindowsKey>> {
        match Self::predef(root).open_subkey_with_flags(path, KEY_READ) {
            Ok(key) => Ok(Some(WindowsKey {
                key,
                path: path.to_string(),
            })),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RegistryError::from_io(e, path)),
        }
    }

    fn open_write(&self, root: RegistryRoot, path: &str) -> RegistryResult<WindowsKey> {
        let (key, _disposition) = Self::predef(root)
            .create_subkey_with_flags(path, KEY_READ | KEY_WRITE)
            .map_err(|e| RegistryError::from_io(e, path))?;
        Ok(WindowsKey {
            key,
            path: path.to_string(),
        })
    }
}

/// Open registry key handle
#[derive(Debug)]
pub struct WindowsKey {
    key: RegKey,
    path: String,
}

impl WindowsKey {
    fn map_err(&self, err: io::Error) -> RegistryError {
        RegistryError::from_io(err, &self.path)
    }

    fn value_path(&self, name: &str) -> String {
        format!("{}\\{}", self.path, name)
    }
}

/// UTF-16LE bytes with a trailing NUL, the layout of `REG_SZ`-family data
fn to_wide_bytes(s: &str) -> Vec<u8> {
    s.encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(u16::to_le_bytes)
        .collect()
}

impl RegistryKey for WindowsKey {
    fn value_names(&self) -> RegistryResult<Vec<String>> {
        self.key
            .enum_values()
            .map(|entry| entry.map(|(name, _)| name))
            .collect::<io::Result<Vec<_>>>()
            .map_err(|e| self.map_err(e))
    }

    fn subkey_names(&self) -> RegistryResult<Vec<String>> {
        self.key
            .enum_keys()
            .collect::<io::Result<Vec<_>>>()
            .map_err(|e| self.map_err(e))
    }

    fn get_value(&self, name: &str) -> RegistryResult<RegistryData> {
        let raw = self
            .key
            .get_raw_value(name)
            .map_err(|e| RegistryError::from_io(e, &self.value_path(name)))?;

        let data = match raw.vtype {
            RegType::REG_SZ => RegistryData::String(String::from_reg_value(&raw)?),
            RegType::REG_EXPAND_SZ => RegistryData::ExpandString(String::from_reg_value(&raw)?),
            RegType::REG_MULTI_SZ => RegistryData::MultiString(Vec::<String>::from_reg_value(&raw)?),
            RegType::REG_DWORD => RegistryData::DWord(u32::from_reg_value(&raw)?),
            RegType::REG_QWORD => RegistryData::QWord(u64::from_reg_value(&raw)?),
            RegType::REG_BINARY => RegistryData::Binary(raw.bytes),
            other => {
                return Err(RegistryError::InvalidData(format!(
                    "{} has unsupported type {:?}",
                    self.value_path(name),
                    other
                )))
            }
        };

        Ok(data)
    }

    fn set_value(&self, name: &str, data: &RegistryData) -> RegistryResult<()> {
        let result = match data {
            RegistryData::String(s) => self.key.set_value(name, s),
            RegistryData::ExpandString(s) => self.key.set_raw_value(
                name,
                &RegValue {
                    bytes: to_wide_bytes(s),
                    vtype: RegType::REG_EXPAND_SZ,
                },
            ),
            RegistryData::MultiString(lines) => self.key.set_value(name, lines),
            RegistryData::Binary(bytes) => self.key.set_raw_value(
                name,
                &RegValue {
                    bytes: bytes.clone(),
                    vtype: RegType::REG_BINARY,
                },
            ),
            RegistryData::DWord(n) => self.key.set_value(name, n),
            RegistryData::QWord(n) => self.key.set_value(name, n),
        };

        result.map_err(|e| RegistryError::from_io(e, &self.value_path(name)))
    }

    fn delete_value(&self, name: &str) -> RegistryResult<bool> {
        match self.key.delete_value(name) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(RegistryError::from_io(e, &self.value_path(name))),
        }
    }

    fn last_write_time(&self) -> RegistryResult<Option<DateTime<Utc>>> {
        let info = self.key.query_info().map_err(|e| self.map_err(e))?;
        Ok(Some(info.get_last_write_time_chrono().and_utc()))
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AppError, AppResult};

/// Native storage kind of a registry value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RegistryValueKind {
    #[default]
    String,
    ExpandString,
    MultiString,
    Binary,
    DWord,
    QWord,
}

impl fmt::Display for RegistryValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryValueKind::String => write!(f, "String"),
            RegistryValueKind::ExpandString => write!(f, "ExpandString"),
            RegistryValueKind::MultiString => write!(f, "MultiString"),
            RegistryValueKind::Binary => write!(f, "Binary"),
            RegistryValueKind::DWord => write!(f, "DWord"),
            RegistryValueKind::QWord => write!(f, "QWord"),
        }
    }
}

/// Raw registry data, tagged with the kind it is stored as
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryData {
    String(String),
    ExpandString(String),
    MultiString(Vec<String>),
    Binary(Vec<u8>),
    DWord(u32),
    QWord(u64),
}

impl RegistryData {
    pub fn kind(&self) -> RegistryValueKind {
        match self {
            RegistryData::String(_) => RegistryValueKind::String,
            RegistryData::ExpandString(_) => RegistryValueKind::ExpandString,
            RegistryData::MultiString(_) => RegistryValueKind::MultiString,
            RegistryData::Binary(_) => RegistryValueKind::Binary,
            RegistryData::DWord(_) => RegistryValueKind::DWord,
            RegistryData::QWord(_) => RegistryValueKind::QWord,
        }
    }
}

/// Value of a policy setting.
///
/// Discovered settings carry whatever the store holds; `Boolean` only appears
/// on settings built by hand and is stored as a DWORD of 0 or 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum PolicyValue {
    String(String),
    MultiString(Vec<String>),
    DWord(u32),
    QWord(u64),
    Boolean(bool),
    Binary(Vec<u8>),
}

impl Default for PolicyValue {
    fn default() -> Self {
        PolicyValue::String(String::new())
    }
}

impl From<RegistryData> for PolicyValue {
    fn from(data: RegistryData) -> Self {
        match data {
            RegistryData::String(s) | RegistryData::ExpandString(s) => PolicyValue::String(s),
            RegistryData::MultiString(lines) => PolicyValue::MultiString(lines),
            RegistryData::Binary(bytes) => PolicyValue::Binary(bytes),
            RegistryData::DWord(n) => PolicyValue::DWord(n),
            RegistryData::QWord(n) => PolicyValue::QWord(n),
        }
    }
}

impl PolicyValue {
    /// Coerce this value into the storage form for `kind`.
    pub fn to_registry_data(&self, kind: RegistryValueKind) -> AppResult<RegistryData> {
        let data = match (kind, self) {
            (RegistryValueKind::String, value) => RegistryData::String(value.to_string()),
            (RegistryValueKind::ExpandString, value) => {
                RegistryData::ExpandString(value.to_string())
            }

            (RegistryValueKind::MultiString, PolicyValue::MultiString(lines)) => {
                RegistryData::MultiString(lines.clone())
            }
            (RegistryValueKind::MultiString, PolicyValue::String(s)) => {
                RegistryData::MultiString(s.lines().map(str::to_string).collect())
            }
            (RegistryValueKind::MultiString, value) => {
                RegistryData::MultiString(vec![value.to_string()])
            }

            (RegistryValueKind::DWord, PolicyValue::DWord(n)) => RegistryData::DWord(*n),
            (RegistryValueKind::DWord, PolicyValue::Boolean(b)) => RegistryData::DWord(u32::from(*b)),
            (RegistryValueKind::DWord, PolicyValue::QWord(n)) => {
                let narrowed = u32::try_from(*n).map_err(|_| {
                    AppError::InvalidValue(format!("{} does not fit in a DWORD", n))
                })?;
                RegistryData::DWord(narrowed)
            }
            (RegistryValueKind::DWord, PolicyValue::String(s)) => {
                RegistryData::DWord(parse_dword(s)?)
            }

            (RegistryValueKind::QWord, PolicyValue::QWord(n)) => RegistryData::QWord(*n),
            (RegistryValueKind::QWord, PolicyValue::DWord(n)) => RegistryData::QWord(u64::from(*n)),
            (RegistryValueKind::QWord, PolicyValue::Boolean(b)) => RegistryData::QWord(u64::from(*b)),
            (RegistryValueKind::QWord, PolicyValue::String(s)) => {
                RegistryData::QWord(parse_qword(s)?)
            }

            (RegistryValueKind::Binary, PolicyValue::Binary(bytes)) => {
                RegistryData::Binary(bytes.clone())
            }
            (RegistryValueKind::Binary, PolicyValue::String(s)) => {
                let bytes = hex::decode(s.trim()).map_err(|e| {
                    AppError::InvalidValue(format!("'{}' is not a hex byte string: {}", s, e))
                })?;
                RegistryData::Binary(bytes)
            }

            (kind, value) => {
                return Err(AppError::InvalidValue(format!(
                    "cannot store {} as {}",
                    value.kind_name(),
                    kind
                )))
            }
        };

        Ok(data)
    }

    fn kind_name(&self) -> &'static str {
        match self {
            PolicyValue::String(_) => "a string",
            PolicyValue::MultiString(_) => "a string list",
            PolicyValue::DWord(_) => "a 32-bit integer",
            PolicyValue::QWord(_) => "a 64-bit integer",
            PolicyValue::Boolean(_) => "a boolean",
            PolicyValue::Binary(_) => "binary data",
        }
    }
}

/// Parse a DWORD; negative decimal input is stored as its two's complement bits
fn parse_dword(s: &str) -> AppResult<u32> {
    let trimmed = s.trim();
    if trimmed.starts_with('-') {
        return trimmed
            .parse::<i32>()
            .map(|n| n as u32)
            .map_err(|e| not_an_integer(s, e));
    }
    parse_unsigned(s)
}

/// Parse a QWORD; negative decimal input is stored as its two's complement bits
fn parse_qword(s: &str) -> AppResult<u64> {
    let trimmed = s.trim();
    if trimmed.starts_with('-') {
        return trimmed
            .parse::<i64>()
            .map(|n| n as u64)
            .map_err(|e| not_an_integer(s, e));
    }
    parse_unsigned(s)
}

/// Parse a decimal or `0x`-prefixed hexadecimal unsigned integer
fn parse_unsigned<T>(s: &str) -> AppResult<T>
where
    T: TryFrom<u64>,
{
    let trimmed = s.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex_digits) => u64::from_str_radix(hex_digits, 16),
        None => trimmed.parse::<u64>(),
    }
    .map_err(|e| not_an_integer(s, e))?;

    T::try_from(parsed)
        .map_err(|_| AppError::InvalidValue(format!("{} is out of range for the value type", parsed)))
}

fn not_an_integer(s: &str, err: std::num::ParseIntError) -> AppError {
    AppError::InvalidValue(format!("'{}' is not an integer: {}", s, err))
}

impl fmt::Display for PolicyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyValue::String(s) => write!(f, "{}", s),
            PolicyValue::MultiString(lines) => write!(f, "{}", lines.join("; ")),
            PolicyValue::DWord(n) => write!(f, "{}", n),
            PolicyValue::QWord(n) => write!(f, "{}", n),
            PolicyValue::Boolean(b) => write!(f, "{}", b),
            PolicyValue::Binary(bytes) => write!(f, "{}", hex::encode_upper(bytes)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_stored_as_dword() {
        assert_eq!(
            PolicyValue::Boolean(true).to_registry_data(RegistryValueKind::DWord).unwrap(),
            RegistryData::DWord(1)
        );
        assert_eq!(
            PolicyValue::Boolean(false).to_registry_data(RegistryValueKind::DWord).unwrap(),
            RegistryData::DWord(0)
        );
    }

    #[test]
    fn test_string_coercions() {
        assert_eq!(
            PolicyValue::String("0x10".to_string())
                .to_registry_data(RegistryValueKind::DWord)
                .unwrap(),
            RegistryData::DWord(16)
        );
        assert_eq!(
            PolicyValue::String("DEADBEEF".to_string())
                .to_registry_data(RegistryValueKind::Binary)
                .unwrap(),
            RegistryData::Binary(vec![0xDE, 0xAD, 0xBE, 0xEF])
        );
        assert_eq!(
            PolicyValue::DWord(7).to_registry_data(RegistryValueKind::String).unwrap(),
            RegistryData::String("7".to_string())
        );
    }

    #[test]
    fn test_invalid_coercions_rejected() {
        let too_big = PolicyValue::QWord(u64::from(u32::MAX) + 1);
        assert!(too_big.to_registry_data(RegistryValueKind::DWord).is_err());

        let not_a_number = PolicyValue::String("enabled".to_string());
        assert!(matches!(
            not_a_number.to_registry_data(RegistryValueKind::DWord),
            Err(AppError::InvalidValue(_))
        ));

        let bool_as_binary = PolicyValue::Boolean(true);
        assert!(bool_as_binary.to_registry_data(RegistryValueKind::Binary).is_err());
    }

    #[test]
    fn test_negative_integers_keep_their_bits() {
        let dword = |s: &str| PolicyValue::String(s.to_string()).to_registry_data(RegistryValueKind::DWord);
        let qword = |s: &str| PolicyValue::String(s.to_string()).to_registry_data(RegistryValueKind::QWord);

        assert_eq!(dword("-1").unwrap(), RegistryData::DWord(0xFFFF_FFFF));
        assert_eq!(dword("-2147483648").unwrap(), RegistryData::DWord(0x8000_0000));
        assert_eq!(dword("4294967295").unwrap(), RegistryData::DWord(u32::MAX));
        assert!(matches!(dword("-2147483649"), Err(AppError::InvalidValue(_))));
        assert!(matches!(dword("4294967296"), Err(AppError::InvalidValue(_))));

        assert_eq!(qword("-1").unwrap(), RegistryData::QWord(u64::MAX));
        assert!(qword("-9223372036854775809").is_err());
    }

    #[test]
    fn test_expand_string_read_back_as_string() {
        let value = PolicyValue::from(RegistryData::ExpandString("%SystemRoot%".to_string()));
        assert_eq!(value, PolicyValue::String("%SystemRoot%".to_string()));
    }
}

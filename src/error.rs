use serde::Serialize;
use thiserror::Error;

use crate::infrastructure::RegistryError;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    /// The current policy scope can never perform this operation.
    #[error("Unsupported operation: {operation} is not supported for {scope} policies")]
    UnsupportedOperation {
        operation: &'static str,
        scope: &'static str,
    },

    /// Conceptually possible for the scope, but this tool has no backing implementation.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Registry error while trying to {action} '{path}' for GPO '{gpo_id}': {source}")]
    Registry {
        action: &'static str,
        gpo_id: String,
        path: String,
        #[source]
        source: RegistryError,
    },

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("GPO not found: {0}")]
    GpoNotFound(String),

    #[error("Policy setting not found: {0}")]
    SettingNotFound(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Serializable error for JSON output
#[derive(Debug, Serialize)]
pub struct CommandError {
    pub code: String,
    pub message: String,
}

impl From<AppError> for CommandError {
    fn from(err: AppError) -> Self {
        CommandError {
            code: err.error_code().to_string(),
            message: err.to_string(),
        }
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let cmd_error = CommandError {
            code: self.error_code().to_string(),
            message: self.to_string(),
        };
        cmd_error.serialize(serializer)
    }
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::UnsupportedOperation { .. } => "UNSUPPORTED_OPERATION",
            AppError::NotImplemented(_) => "NOT_IMPLEMENTED",
            AppError::Registry { .. } => "REGISTRY_ERROR",
            AppError::InvalidValue(_) => "INVALID_VALUE",
            AppError::GpoNotFound(_) => "NOT_FOUND",
            AppError::SettingNotFound(_) => "SETTING_NOT_FOUND",
            AppError::OperationFailed(_) => "OPERATION_FAILED",
            AppError::IoError(_) => "IO_ERROR",
            AppError::SerializationError(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Whether repeating the call could ever succeed.
    ///
    /// Unsupported and unimplemented operations fail the same way every time;
    /// store failures may clear up (permissions, a locked hive).
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::UnsupportedOperation { .. }
            | AppError::NotImplemented(_)
            | AppError::InvalidValue(_)
            | AppError::GpoNotFound(_)
            | AppError::SettingNotFound(_) => false,
            AppError::Registry { source, .. } => !matches!(source, RegistryError::InvalidData(_)),
            _ => true,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_and_failed_are_distinct() {
        let unsupported = AppError::UnsupportedOperation {
            operation: "link",
            scope: "local",
        };
        let failed = AppError::Registry {
            action: "write",
            gpo_id: "LOCAL_COMPUTER_POLICY".to_string(),
            path: r"SOFTWARE\Policies\TestApp".to_string(),
            source: RegistryError::PermissionDenied(r"SOFTWARE\Policies\TestApp".to_string()),
        };

        assert_eq!(unsupported.error_code(), "UNSUPPORTED_OPERATION");
        assert_eq!(failed.error_code(), "REGISTRY_ERROR");
        assert!(!unsupported.is_retryable());
        assert!(failed.is_retryable());
        assert!(unsupported.to_string().starts_with("Unsupported operation"));
        assert!(failed.to_string().contains(r"SOFTWARE\Policies\TestApp"));
        assert!(failed.to_string().contains("LOCAL_COMPUTER_POLICY"));
    }

    #[test]
    fn test_serializes_as_command_error() {
        let err = AppError::NotImplemented("domain GPO creation".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NOT_IMPLEMENTED");
        assert_eq!(json["message"], "Not implemented: domain GPO creation");
    }
}

//! Storage error types.

use sea_orm::DbErr;
use stipend_core::config::ConfigError;
use stipend_shared::AppError;

/// Errors raised by repositories, the run ledger and backup/restore.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Stored allowance configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Requested row does not exist.
    #[error("{entity} '{id}' not found")]
    NotFound {
        /// Kind of row.
        entity: &'static str,
        /// Key that was looked up.
        id: String,
    },

    /// A stored row could not be turned back into a domain value.
    #[error("Corrupt {table} row '{key}': {message}")]
    Corrupt {
        /// Table the row came from.
        table: &'static str,
        /// Primary key of the row.
        key: String,
        /// What was wrong with it.
        message: String,
    },

    /// JSON document could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backup archive error.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Backup file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backup archive is not one this version can restore.
    #[error("Unsupported backup: {0}")]
    UnsupportedBackup(String),

    /// Restore mode is neither `replace` nor `merge`.
    #[error("Unknown restore mode: {0}")]
    UnknownRestoreMode(String),
}

/// Run ledger operations share the storage error type.
pub type LedgerError = StorageError;

impl StorageError {
    pub(crate) fn corrupt(
        table: &'static str,
        key: impl Into<String>,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::Corrupt {
            table,
            key: key.into(),
            message: message.to_string(),
        }
    }

    /// Returns the stable error code printed by the command line.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(err) => err.error_code(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Corrupt { .. } => "CORRUPT_ROW",
            Self::Json(_) | Self::Archive(_) | Self::UnsupportedBackup(_) => "BACKUP_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::UnknownRestoreMode(_) => "VALIDATION_ERROR",
        }
    }

    /// Returns the process exit code, matching [`AppError::exit_code`].
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 5,
            Self::NotFound { .. } => 3,
            Self::Json(_)
            | Self::Archive(_)
            | Self::UnsupportedBackup(_)
            | Self::UnknownRestoreMode(_) => 4,
            Self::Database(_) | Self::Corrupt { .. } | Self::Io(_) => 1,
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Config(err) => Self::Configuration(err.to_string()),
            StorageError::NotFound { .. } => Self::NotFound(err.to_string()),
            StorageError::Database(_) | StorageError::Corrupt { .. } => {
                Self::Database(err.to_string())
            }
            StorageError::Io(_) => Self::Io(err.to_string()),
            StorageError::Json(_)
            | StorageError::Archive(_)
            | StorageError::UnsupportedBackup(_)
            | StorageError::UnknownRestoreMode(_) => Self::Validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_missing_maps_to_configuration() {
        let err = StorageError::from(ConfigError::Missing);
        assert_eq!(err.error_code(), "CONFIG_MISSING");
        assert_eq!(err.exit_code(), 5);
        let app: AppError = err.into();
        assert_eq!(app.exit_code(), 5);
    }

    #[test]
    fn test_not_found_display() {
        let err = StorageError::NotFound {
            entity: "student",
            id: "S9".into(),
        };
        assert_eq!(err.to_string(), "student 'S9' not found");
        assert!(matches!(AppError::from(err), AppError::NotFound(_)));
    }

    #[test]
    fn test_corrupt_row_display() {
        let err = StorageError::corrupt("students", "S1", "bad degree");
        assert_eq!(err.to_string(), "Corrupt students row 'S1': bad degree");
    }
}

//! Allowance configuration repository.
//!
//! Configurations are append-only: saving always creates a new version and
//! settlement runs keep the version they were computed with.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set,
};
use stipend_core::config::{AllowanceConfig, ConfigError, VersionedConfig};

use crate::entities::allowance_configs;
use crate::error::StorageError;

/// Configuration repository.
#[derive(Debug, Clone)]
pub struct ConfigRepository {
    db: DatabaseConnection,
}

impl ConfigRepository {
    /// Creates a new configuration repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the newest configuration version.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` when no configuration was ever saved.
    pub async fn latest(&self) -> Result<VersionedConfig, StorageError> {
        allowance_configs::Entity::find()
            .order_by_desc(allowance_configs::Column::Version)
            .one(&self.db)
            .await?
            .ok_or(StorageError::Config(ConfigError::Missing))
            .and_then(config_from_model)
    }

    /// Returns a specific configuration version, if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored document is corrupt.
    pub async fn by_version(&self, version: i32) -> Result<Option<VersionedConfig>, StorageError> {
        allowance_configs::Entity::find_by_id(version)
            .one(&self.db)
            .await?
            .map(config_from_model)
            .transpose()
    }

    /// Lists all versions, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored document is corrupt.
    pub async fn history(&self) -> Result<Vec<VersionedConfig>, StorageError> {
        allowance_configs::Entity::find()
            .order_by_desc(allowance_configs::Column::Version)
            .all(&self.db)
            .await?
            .into_iter()
            .map(config_from_model)
            .collect()
    }

    /// Validates and stores `config` as a new version.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is invalid, or a database
    /// error if the insert fails.
    pub async fn save(&self, config: &AllowanceConfig) -> Result<VersionedConfig, StorageError> {
        config.validate()?;

        let model = allowance_configs::ActiveModel {
            created_at: Set(Utc::now()),
            config_json: Set(serde_json::to_string(config)?),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::info!(
            version = model.version,
            fx_rate = %config.fx_rate,
            currency = %config.local_currency,
            "allowance configuration saved"
        );
        config_from_model(model)
    }

    /// Seeds the default configuration when no version exists yet.
    ///
    /// Returns the newest version either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the query or insert fails.
    pub async fn ensure_default(&self) -> Result<VersionedConfig, StorageError> {
        if allowance_configs::Entity::find().count(&self.db).await? == 0 {
            return self.save(&AllowanceConfig::default()).await;
        }
        self.latest().await
    }
}

/// Decodes a stored configuration version.
pub(crate) fn config_from_model(
    model: allowance_configs::Model,
) -> Result<VersionedConfig, StorageError> {
    let config: AllowanceConfig = serde_json::from_str(&model.config_json).map_err(|e| {
        StorageError::corrupt("allowance_configs", model.version.to_string(), e)
    })?;
    Ok(VersionedConfig {
        version: model.version,
        created_at: model.created_at,
        config,
    })
}

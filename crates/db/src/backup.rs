//! Backup and restore of the whole database as a zip of JSON documents.

use std::io::{Cursor, Read, Write};
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    TransactionTrait,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::entities::{
    allowance_configs, allowance_records, baggage_payments, settlement_runs, students,
};
use crate::error::StorageError;
use crate::repositories::config::config_from_model;
use crate::repositories::run_ledger::{record_from_model, run_from_model};
use crate::repositories::student::student_from_model;

/// Archive layout version written into the manifest.
pub const FORMAT_VERSION: u32 = 1;

/// Rows per multi-row insert during restore.
const INSERT_CHUNK: usize = 200;

const MANIFEST: &str = "manifest.json";
const STUDENTS: &str = "students.json";
const CONFIGS: &str = "allowance_configs.json";
const RUNS: &str = "settlement_runs.json";
const RECORDS: &str = "allowance_records.json";
const BAGGAGE: &str = "baggage_payments.json";

/// How a restore treats existing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestoreMode {
    /// Wipe every table, then load the archive.
    #[default]
    Replace,
    /// Only add students whose id is not yet present.
    Merge,
}

impl FromStr for RestoreMode {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "merge" => Ok(Self::Merge),
            _ => Err(StorageError::UnknownRestoreMode(s.to_string())),
        }
    }
}

/// Summary document stored in every archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupManifest {
    /// Archive layout version.
    pub format_version: u32,
    /// When the backup was taken.
    pub created_at: DateTime<Utc>,
    /// Number of students.
    pub students: usize,
    /// Number of configuration versions.
    pub configs: usize,
    /// Number of settlement runs.
    pub runs: usize,
    /// Number of allowance records.
    pub records: usize,
    /// Number of baggage ledger entries.
    pub baggage_payments: usize,
}

/// Students added and skipped by a restore.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RestoreSummary {
    /// Students written.
    pub added: usize,
    /// Students left untouched because their id already existed.
    pub skipped: usize,
}

#[derive(Debug)]
struct Snapshot {
    students: Vec<students::Model>,
    configs: Vec<allowance_configs::Model>,
    runs: Vec<settlement_runs::Model>,
    records: Vec<allowance_records::Model>,
    baggage: Vec<baggage_payments::Model>,
}

/// Backup and restore service.
#[derive(Debug, Clone)]
pub struct BackupService {
    db: DatabaseConnection,
}

impl BackupService {
    /// Creates a new backup service.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Writes a backup archive to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the database or writing the file fails.
    pub async fn backup(&self, path: &Path) -> Result<BackupManifest, StorageError> {
        let (bytes, manifest) = self.backup_to_bytes().await?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, bytes).await?;

        tracing::info!(
            path = %path.display(),
            students = manifest.students,
            runs = manifest.runs,
            records = manifest.records,
            "backup written"
        );
        Ok(manifest)
    }

    /// Builds a backup archive in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the database or encoding fails.
    pub async fn backup_to_bytes(&self) -> Result<(Vec<u8>, BackupManifest), StorageError> {
        let snapshot = Snapshot {
            students: students::Entity::find().all(&self.db).await?,
            configs: allowance_configs::Entity::find().all(&self.db).await?,
            runs: settlement_runs::Entity::find().all(&self.db).await?,
            records: allowance_records::Entity::find().all(&self.db).await?,
            baggage: baggage_payments::Entity::find().all(&self.db).await?,
        };
        let manifest = BackupManifest {
            format_version: FORMAT_VERSION,
            created_at: Utc::now(),
            students: snapshot.students.len(),
            configs: snapshot.configs.len(),
            runs: snapshot.runs.len(),
            records: snapshot.records.len(),
            baggage_payments: snapshot.baggage.len(),
        };

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options: FileOptions<'_, ()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut put = |name: &str, bytes: Vec<u8>| -> Result<(), StorageError> {
            zip.start_file(name, options)?;
            zip.write_all(&bytes)?;
            Ok(())
        };
        put(MANIFEST, serde_json::to_vec_pretty(&manifest)?)?;
        put(STUDENTS, serde_json::to_vec_pretty(&snapshot.students)?)?;
        put(CONFIGS, serde_json::to_vec_pretty(&snapshot.configs)?)?;
        put(RUNS, serde_json::to_vec_pretty(&snapshot.runs)?)?;
        put(RECORDS, serde_json::to_vec_pretty(&snapshot.records)?)?;
        put(BAGGAGE, serde_json::to_vec_pretty(&snapshot.baggage)?)?;

        let bytes = zip.finish()?.into_inner();
        Ok((bytes, manifest))
    }

    /// Restores the archive at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the archive is invalid,
    /// or a write fails. Nothing is changed in that case.
    pub async fn restore(
        &self,
        path: &Path,
        mode: RestoreMode,
    ) -> Result<RestoreSummary, StorageError> {
        let bytes = tokio::fs::read(path).await?;
        let summary = self.restore_from_bytes(bytes, mode).await?;
        tracing::info!(
            path = %path.display(),
            mode = ?mode,
            added = summary.added,
            skipped = summary.skipped,
            "backup restored"
        );
        Ok(summary)
    }

    /// Restores an archive held in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive is invalid or a write fails. Nothing
    /// is changed in that case.
    pub async fn restore_from_bytes(
        &self,
        bytes: Vec<u8>,
        mode: RestoreMode,
    ) -> Result<RestoreSummary, StorageError> {
        let snapshot = read_archive(bytes)?;
        validate(&snapshot)?;

        let txn = self.db.begin().await?;
        let summary = match mode {
            RestoreMode::Replace => replace_all(&txn, snapshot).await?,
            RestoreMode::Merge => merge_students(&txn, snapshot.students).await?,
        };
        txn.commit().await?;
        Ok(summary)
    }
}

fn read_archive(bytes: Vec<u8>) -> Result<Snapshot, StorageError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let manifest: BackupManifest = read_document(&mut archive, MANIFEST)?;
    if manifest.format_version != FORMAT_VERSION {
        return Err(StorageError::UnsupportedBackup(format!(
            "format version {} (expected {FORMAT_VERSION})",
            manifest.format_version
        )));
    }

    Ok(Snapshot {
        students: read_document(&mut archive, STUDENTS)?,
        configs: read_document(&mut archive, CONFIGS)?,
        runs: read_document(&mut archive, RUNS)?,
        records: read_document(&mut archive, RECORDS)?,
        baggage: read_document(&mut archive, BAGGAGE)?,
    })
}

fn read_document<T: DeserializeOwned>(
    archive: &mut ZipArchive<Cursor<Vec<u8>>>,
    name: &str,
) -> Result<T, StorageError> {
    let mut file = archive.by_name(name).map_err(|e| match e {
        zip::result::ZipError::FileNotFound => {
            StorageError::UnsupportedBackup(format!("missing {name}"))
        }
        other => StorageError::Archive(other),
    })?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)?;
    Ok(serde_json::from_slice(&contents)?)
}

/// Rejects archives with rows the application could not read back.
fn validate(snapshot: &Snapshot) -> Result<(), StorageError> {
    for model in &snapshot.students {
        student_from_model(model.clone())?;
    }
    for model in &snapshot.configs {
        config_from_model(model.clone())?;
    }
    for model in &snapshot.runs {
        run_from_model(model.clone())?;
    }
    for model in &snapshot.records {
        record_from_model(model.clone())?;
    }
    Ok(())
}

async fn replace_all<C: ConnectionTrait>(
    conn: &C,
    snapshot: Snapshot,
) -> Result<RestoreSummary, StorageError> {
    baggage_payments::Entity::delete_many().exec(conn).await?;
    allowance_records::Entity::delete_many().exec(conn).await?;
    settlement_runs::Entity::delete_many().exec(conn).await?;
    allowance_configs::Entity::delete_many().exec(conn).await?;
    students::Entity::delete_many().exec(conn).await?;

    let added = snapshot.students.len();
    insert_chunked::<students::Entity, _, _>(conn, snapshot.students).await?;
    insert_chunked::<allowance_configs::Entity, _, _>(conn, snapshot.configs).await?;
    insert_chunked::<settlement_runs::Entity, _, _>(conn, snapshot.runs).await?;
    insert_chunked::<allowance_records::Entity, _, _>(conn, snapshot.records).await?;
    insert_chunked::<baggage_payments::Entity, _, _>(conn, snapshot.baggage).await?;

    Ok(RestoreSummary { added, skipped: 0 })
}

async fn merge_students<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<students::Model>,
) -> Result<RestoreSummary, StorageError> {
    let mut summary = RestoreSummary::default();
    for model in rows {
        let inserted = students::Entity::insert(model.into_active_model().reset_all())
            .on_conflict(
                OnConflict::column(students::Column::StudentId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
        if inserted > 0 {
            summary.added += 1;
        } else {
            summary.skipped += 1;
        }
    }
    Ok(summary)
}

async fn insert_chunked<E, M, C>(conn: &C, rows: Vec<M>) -> Result<(), StorageError>
where
    E: EntityTrait<Model = M>,
    M: IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
    C: ConnectionTrait,
{
    let models: Vec<E::ActiveModel> = rows
        .into_iter()
        .map(|row| row.into_active_model().reset_all())
        .collect();
    for chunk in models.chunks(INSERT_CHUNK) {
        E::insert_many(chunk.to_vec())
            .exec_without_returning(conn)
            .await?;
    }
    Ok(())
}

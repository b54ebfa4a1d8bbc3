//! Run ledger: settlement runs, their allowance records and the baggage
//! payment ledger.
//!
//! Runs and records are immutable once written. The baggage ledger has one
//! row per student; a conditional insert into it is what guarantees the
//! one-time allowance is paid at most once across all runs.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use stipend_core::config::VersionedConfig;
use stipend_core::money::MoneyAmount;
use stipend_core::period::SettlementPeriod;
use stipend_core::rules::{AllowanceRecord, AllowanceTotals, AllowanceType, RuleId};
use stipend_core::settlement::{SettlementResult, SettlementWarning};
use stipend_core::student::StudentId;
use stipend_shared::types::{Currency, RecordId, RunId};

use crate::entities::{allowance_records, baggage_payments, settlement_runs};
use crate::error::LedgerError;

/// Records per multi-row insert, well below SQLite's bound-parameter limit.
const INSERT_CHUNK: usize = 200;

/// A persisted settlement run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementRun {
    /// Run identifier.
    pub id: RunId,
    /// When the run was committed.
    pub created_at: DateTime<Utc>,
    /// Configuration version the run was computed with.
    pub config_version: i32,
    /// Settled month.
    pub period: SettlementPeriod,
    /// FX rate snapshot.
    pub fx_rate: Decimal,
    /// Local currency of the run.
    pub currency: Currency,
}

/// A persisted allowance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredRecord {
    /// Record identifier.
    pub id: RecordId,
    /// Run the record belongs to.
    pub run_id: RunId,
    /// The record itself.
    pub record: AllowanceRecord,
}

/// Outcome of an atomic settlement commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommittedSettlement {
    /// The new run.
    pub run: SettlementRun,
    /// Records actually persisted.
    pub records: Vec<AllowanceRecord>,
    /// Warnings of the computation plus any baggage dropped at commit time.
    pub warnings: Vec<SettlementWarning>,
    /// Totals of the persisted records.
    pub totals: AllowanceTotals,
}

/// Run ledger repository.
#[derive(Debug, Clone)]
pub struct RunLedgerRepository {
    db: DatabaseConnection,
}

impl RunLedgerRepository {
    /// Creates a new run ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an empty run for `period` under `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_run(
        &self,
        period: SettlementPeriod,
        config: &VersionedConfig,
    ) -> Result<SettlementRun, LedgerError> {
        insert_run(&self.db, period, config).await
    }

    /// Appends records to an existing run. Returns the new record ids.
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails.
    pub async fn save_records(
        &self,
        run_id: RunId,
        records: &[AllowanceRecord],
    ) -> Result<Vec<RecordId>, LedgerError> {
        let txn = self.db.begin().await?;
        let ids = insert_records(&txn, run_id, records).await?;
        txn.commit().await?;
        Ok(ids)
    }

    /// Whether the student's baggage allowance has been paid by any run.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn is_baggage_paid(&self, student_id: &StudentId) -> Result<bool, LedgerError> {
        Ok(
            baggage_payments::Entity::find_by_id(student_id.as_str())
                .one(&self.db)
                .await?
                .is_some()
                || has_baggage_record(&self.db, student_id).await?,
        )
    }

    /// Ids of every student whose baggage allowance has been paid.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn baggage_paid_students(&self) -> Result<BTreeSet<StudentId>, LedgerError> {
        let mut ids: Vec<String> = baggage_payments::Entity::find()
            .select_only()
            .column(baggage_payments::Column::StudentId)
            .into_tuple()
            .all(&self.db)
            .await?;
        let recorded: Vec<String> = allowance_records::Entity::find()
            .select_only()
            .column(allowance_records::Column::StudentId)
            .filter(allowance_records::Column::AllowanceType.eq(AllowanceType::Baggage.as_str()))
            .distinct()
            .into_tuple()
            .all(&self.db)
            .await?;
        ids.extend(recorded);

        ids.into_iter()
            .map(|id| {
                StudentId::new(id.clone())
                    .map_err(|e| LedgerError::corrupt("baggage_payments", id, e))
            })
            .collect()
    }

    /// Marks the student's baggage as paid by `run_id`.
    ///
    /// Returns `false` if it was already marked; the existing entry is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn record_baggage_paid(
        &self,
        student_id: &StudentId,
        run_id: RunId,
        period: SettlementPeriod,
    ) -> Result<bool, LedgerError> {
        insert_baggage_payment(&self.db, student_id, run_id, period).await
    }

    /// Records of one run.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    pub async fn fetch_records_for_run(
        &self,
        run_id: RunId,
    ) -> Result<Vec<StoredRecord>, LedgerError> {
        self.fetch_records(allowance_records::Column::RunId.eq(run_id.into_inner()))
            .await
    }

    /// Every persisted record of one student, across runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    pub async fn fetch_records_for_student(
        &self,
        student_id: &StudentId,
    ) -> Result<Vec<StoredRecord>, LedgerError> {
        self.fetch_records(allowance_records::Column::StudentId.eq(student_id.as_str()))
            .await
    }

    /// Records whose period starts in `year`, across runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    pub async fn fetch_records_for_year(&self, year: i32) -> Result<Vec<StoredRecord>, LedgerError> {
        let (Ok(first), Ok(last)) = (SettlementPeriod::new(year, 1), SettlementPeriod::new(year, 12))
        else {
            return Ok(Vec::new());
        };
        self.fetch_records(
            allowance_records::Column::PeriodStart
                .gte(first.start())
                .and(allowance_records::Column::PeriodStart.lte(last.end())),
        )
        .await
    }

    async fn fetch_records(
        &self,
        condition: sea_orm::sea_query::SimpleExpr,
    ) -> Result<Vec<StoredRecord>, LedgerError> {
        allowance_records::Entity::find()
            .filter(condition)
            .order_by_asc(allowance_records::Column::StudentId)
            .order_by_asc(allowance_records::Column::PeriodStart)
            .order_by_asc(allowance_records::Column::AllowanceType)
            .all(&self.db)
            .await?
            .into_iter()
            .map(record_from_model)
            .collect()
    }

    /// All runs, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    pub async fn list_runs(&self) -> Result<Vec<SettlementRun>, LedgerError> {
        settlement_runs::Entity::find()
            .order_by_desc(settlement_runs::Column::CreatedAt)
            .order_by_desc(settlement_runs::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(run_from_model)
            .collect()
    }

    /// Finds one run by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt.
    pub async fn get_run(&self, run_id: RunId) -> Result<Option<SettlementRun>, LedgerError> {
        settlement_runs::Entity::find_by_id(run_id.into_inner())
            .one(&self.db)
            .await?
            .map(run_from_model)
            .transpose()
    }

    /// Newest run for `period`, if the month has been settled.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt.
    pub async fn latest_run_for_period(
        &self,
        period: SettlementPeriod,
    ) -> Result<Option<SettlementRun>, LedgerError> {
        settlement_runs::Entity::find()
            .filter(settlement_runs::Column::Period.eq(period.to_string()))
            .order_by_desc(settlement_runs::Column::CreatedAt)
            .order_by_desc(settlement_runs::Column::Id)
            .one(&self.db)
            .await?
            .map(run_from_model)
            .transpose()
    }

    /// Persists a computed settlement as a new run, in one transaction.
    ///
    /// Each baggage record is only kept if its ledger entry can be inserted.
    /// A student already in the ledger, or with an earlier baggage record,
    /// loses the duplicate record and gains a `BaggageAlreadyPaid` warning.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails; nothing is persisted then.
    pub async fn commit_settlement(
        &self,
        config: &VersionedConfig,
        result: &SettlementResult,
    ) -> Result<CommittedSettlement, LedgerError> {
        let txn = self.db.begin().await?;
        let run = insert_run(&txn, result.period, config).await?;

        let mut records = Vec::with_capacity(result.records.len());
        let mut warnings = result.warnings.clone();
        for record in &result.records {
            if record.allowance_type == AllowanceType::Baggage {
                let student_id = &record.student_id;
                let paid = has_baggage_record(&txn, student_id).await?
                    || !insert_baggage_payment(&txn, student_id, run.id, result.period).await?;
                if paid {
                    tracing::warn!(
                        run_id = %run.id,
                        student_id = %student_id,
                        "baggage already paid, record dropped"
                    );
                    warnings.push(SettlementWarning::BaggageAlreadyPaid {
                        student_id: student_id.clone(),
                    });
                    continue;
                }
            }
            records.push(record.clone());
        }

        insert_records(&txn, run.id, &records).await?;
        txn.commit().await?;

        let totals = AllowanceTotals::from_records(&records);
        tracing::info!(
            run_id = %run.id,
            period = %run.period,
            config_version = run.config_version,
            records = records.len(),
            warnings = warnings.len(),
            total_local = %totals.total.local,
            "settlement committed"
        );

        Ok(CommittedSettlement {
            run,
            records,
            warnings,
            totals,
        })
    }

    /// Number of persisted records.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn record_count(&self) -> Result<u64, LedgerError> {
        Ok(allowance_records::Entity::find().count(&self.db).await?)
    }
}

async fn insert_run<C: ConnectionTrait>(
    conn: &C,
    period: SettlementPeriod,
    config: &VersionedConfig,
) -> Result<SettlementRun, LedgerError> {
    let model = settlement_runs::ActiveModel {
        id: Set(RunId::new().into_inner()),
        created_at: Set(Utc::now()),
        config_version: Set(config.version),
        period: Set(period.to_string()),
        fx_rate: Set(config.config.fx_rate.to_string()),
        currency: Set(config.config.local_currency.code().to_string()),
    }
    .insert(conn)
    .await?;

    tracing::debug!(run_id = %model.id, period = %period, "settlement run created");
    run_from_model(model)
}

async fn insert_records<C: ConnectionTrait>(
    conn: &C,
    run_id: RunId,
    records: &[AllowanceRecord],
) -> Result<Vec<RecordId>, LedgerError> {
    let now = Utc::now();
    let mut ids = Vec::with_capacity(records.len());
    let mut models = Vec::with_capacity(records.len());
    for record in records {
        let id = RecordId::new();
        ids.push(id);
        models.push(allowance_records::ActiveModel {
            id: Set(id.into_inner()),
            run_id: Set(run_id.into_inner()),
            student_id: Set(record.student_id.to_string()),
            allowance_type: Set(record.allowance_type.as_str().to_string()),
            period_start: Set(record.period_start),
            period_end: Set(record.period_end),
            amount_usd: Set(record.amount.usd().to_string()),
            amount_local: Set(record.amount.local().to_string()),
            fx_rate: Set(record.amount.fx_rate().to_string()),
            currency: Set(record.amount.currency().code().to_string()),
            rule_id: Set(record.rule_id.as_str().to_string()),
            description: Set(record.description.clone()),
            metadata_json: Set(serde_json::to_string(&record.metadata)?),
            created_at: Set(now),
        });
    }

    for chunk in models.chunks(INSERT_CHUNK) {
        allowance_records::Entity::insert_many(chunk.to_vec())
            .exec_without_returning(conn)
            .await?;
    }
    Ok(ids)
}

async fn insert_baggage_payment<C: ConnectionTrait>(
    conn: &C,
    student_id: &StudentId,
    run_id: RunId,
    period: SettlementPeriod,
) -> Result<bool, LedgerError> {
    let entry = baggage_payments::ActiveModel {
        student_id: Set(student_id.to_string()),
        run_id: Set(run_id.into_inner()),
        period: Set(period.to_string()),
        paid_at: Set(Utc::now()),
    };
    let inserted = baggage_payments::Entity::insert(entry)
        .on_conflict(
            OnConflict::column(baggage_payments::Column::StudentId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(inserted > 0)
}

async fn has_baggage_record<C: ConnectionTrait>(
    conn: &C,
    student_id: &StudentId,
) -> Result<bool, LedgerError> {
    let count = allowance_records::Entity::find()
        .filter(allowance_records::Column::StudentId.eq(student_id.as_str()))
        .filter(allowance_records::Column::AllowanceType.eq(AllowanceType::Baggage.as_str()))
        .count(conn)
        .await?;
    Ok(count > 0)
}

fn parse_decimal(table: &'static str, key: &str, value: &str) -> Result<Decimal, LedgerError> {
    value
        .parse()
        .map_err(|e| LedgerError::corrupt(table, key, format!("bad decimal '{value}': {e}")))
}

/// Rebuilds a run from its row.
pub(crate) fn run_from_model(model: settlement_runs::Model) -> Result<SettlementRun, LedgerError> {
    let key = model.id.to_string();
    Ok(SettlementRun {
        id: RunId::from_uuid(model.id),
        created_at: model.created_at,
        config_version: model.config_version,
        period: model
            .period
            .parse()
            .map_err(|e| LedgerError::corrupt("settlement_runs", &key, e))?,
        fx_rate: parse_decimal("settlement_runs", &key, &model.fx_rate)?,
        currency: model
            .currency
            .parse()
            .map_err(|e| LedgerError::corrupt("settlement_runs", &key, e))?,
    })
}

/// Rebuilds a stored record from its row.
pub(crate) fn record_from_model(
    model: allowance_records::Model,
) -> Result<StoredRecord, LedgerError> {
    const TABLE: &str = "allowance_records";
    let key = model.id.to_string();
    let corrupt = |message: String| LedgerError::corrupt(TABLE, &key, message);

    let amount = MoneyAmount::restore(
        parse_decimal(TABLE, &key, &model.amount_usd)?,
        parse_decimal(TABLE, &key, &model.amount_local)?,
        parse_decimal(TABLE, &key, &model.fx_rate)?,
        model.currency.parse::<Currency>().map_err(|e| corrupt(e.to_string()))?,
    );
    let metadata: BTreeMap<String, String> =
        serde_json::from_str(&model.metadata_json).map_err(|e| corrupt(e.to_string()))?;

    Ok(StoredRecord {
        id: RecordId::from_uuid(model.id),
        run_id: RunId::from_uuid(model.run_id),
        record: AllowanceRecord {
            student_id: StudentId::new(model.student_id).map_err(|e| corrupt(e.to_string()))?,
            allowance_type: model.allowance_type.parse::<AllowanceType>().map_err(|e| corrupt(e.to_string()))?,
            period_start: model.period_start,
            period_end: model.period_end,
            amount,
            rule_id: model.rule_id.parse::<RuleId>().map_err(|e| corrupt(e.to_string()))?,
            description: model.description,
            metadata,
        },
    })
}

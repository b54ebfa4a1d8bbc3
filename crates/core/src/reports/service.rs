//! Report generation service.

use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;
use stipend_shared::types::Currency;

use super::types::{RecordRow, ReportTables};
use crate::export::Table;
use crate::rules::{AllowanceRecord, AllowanceTotals, AllowanceType};
use crate::student::{Student, StudentId};

/// Service for building reports from allowance records.
pub struct ReportService;

impl ReportService {
    /// Builds report tables for `records`.
    ///
    /// Student names are looked up in `students`; records of unknown
    /// students keep an empty name. The currency is taken from the first
    /// record, falling back to the default local currency.
    #[must_use]
    pub fn build(students: &[Student], records: &[AllowanceRecord]) -> ReportTables {
        let names: HashMap<&StudentId, &str> =
            students.iter().map(|s| (s.id(), s.name())).collect();

        let rows = records
            .iter()
            .map(|record| RecordRow {
                student_id: record.student_id.clone(),
                student_name: names
                    .get(&record.student_id)
                    .map_or_else(String::new, |name| (*name).to_string()),
                allowance_type: record.allowance_type,
                period: Self::period_label(record),
                period_start: record.period_start,
                period_end: record.period_end,
                amount_usd: record.amount.usd(),
                amount_local: record.amount.local(),
                fx_rate: record.amount.fx_rate(),
                rule_id: record.rule_id,
                description: record.description.clone(),
                metadata: Self::metadata_label(record),
            })
            .collect();

        let mut by_student: BTreeMap<StudentId, Vec<&AllowanceRecord>> = BTreeMap::new();
        let mut by_year: BTreeMap<i32, Vec<&AllowanceRecord>> = BTreeMap::new();
        for record in records {
            by_student
                .entry(record.student_id.clone())
                .or_default()
                .push(record);
            by_year
                .entry(record.period_start.year())
                .or_default()
                .push(record);
        }

        ReportTables {
            currency: records
                .first()
                .map_or_else(Currency::default, |r| r.amount.currency()),
            records: rows,
            by_student: by_student
                .into_iter()
                .map(|(id, recs)| (id, AllowanceTotals::from_records(recs)))
                .collect(),
            by_year: by_year
                .into_iter()
                .map(|(year, recs)| (year, AllowanceTotals::from_records(recs)))
                .collect(),
            overall: AllowanceTotals::from_records(records),
        }
    }

    /// Period label: `YYYY-MM` for living, `YYYY` for study, ISO date for baggage.
    #[must_use]
    pub fn period_label(record: &AllowanceRecord) -> String {
        match record.allowance_type {
            AllowanceType::Living => record.period_start.format("%Y-%m").to_string(),
            AllowanceType::Study => record.period_start.year().to_string(),
            AllowanceType::Baggage => record.period_start.to_string(),
        }
    }

    /// Metadata as `key=value` pairs joined by `|`, keys in order.
    #[must_use]
    pub fn metadata_label(record: &AllowanceRecord) -> String {
        record
            .metadata
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("|")
    }

    /// Flattens report tables into exportable tables: records, by student,
    /// by year and by type.
    #[must_use]
    pub fn to_tables(report: &ReportTables) -> Vec<Table> {
        let local = report.currency.code().to_lowercase();

        let mut records = Table::new(
            "Records",
            [
                "student_id".to_string(),
                "student_name".to_string(),
                "allowance_type".to_string(),
                "period".to_string(),
                "period_start".to_string(),
                "period_end".to_string(),
                "amount_usd".to_string(),
                format!("amount_{local}"),
                "fx_rate".to_string(),
                "rule_id".to_string(),
                "description".to_string(),
                "metadata".to_string(),
            ],
        )
        .with_numeric_columns([6, 7, 8]);
        for row in &report.records {
            records.push_row([
                row.student_id.to_string(),
                row.student_name.clone(),
                row.allowance_type.to_string(),
                row.period.clone(),
                row.period_start.to_string(),
                row.period_end.to_string(),
                row.amount_usd.to_string(),
                row.amount_local.to_string(),
                row.fx_rate.to_string(),
                row.rule_id.to_string(),
                row.description.clone(),
                row.metadata.clone(),
            ]);
        }

        let mut by_student = Self::summary_table("By student", "student_id", &local);
        for (id, totals) in &report.by_student {
            by_student.push_row(Self::summary_cells(id.to_string(), totals));
        }

        let mut by_year = Self::summary_table("By year", "year", &local);
        for (year, totals) in &report.by_year {
            by_year.push_row(Self::summary_cells(year.to_string(), totals));
        }

        let mut by_type = Table::new(
            "By type",
            [
                "allowance_type".to_string(),
                "count".to_string(),
                "total_usd".to_string(),
                format!("total_{local}"),
            ],
        )
        .with_numeric_columns(1..4);
        for (allowance_type, total) in &report.overall.by_type {
            by_type.push_row([
                allowance_type.to_string(),
                total.count.to_string(),
                total.usd.to_string(),
                total.local.to_string(),
            ]);
        }

        vec![records, by_student, by_year, by_type]
    }

    /// Key column first, then numeric totals.
    fn summary_table(name: &str, key: &str, local: &str) -> Table {
        let headers = Self::summary_headers(key, local);
        let width = headers.len();
        Table::new(name, headers).with_numeric_columns(1..width)
    }

    fn summary_headers(key: &str, local: &str) -> Vec<String> {
        let mut headers = vec![key.to_string()];
        for allowance_type in AllowanceType::ALL {
            let name = allowance_type.as_str().to_lowercase();
            headers.push(format!("{name}_usd"));
            headers.push(format!("{name}_{local}"));
        }
        headers.push("grand_total_usd".to_string());
        headers.push(format!("grand_total_{local}"));
        headers
    }

    fn summary_cells(key: String, totals: &AllowanceTotals) -> Vec<String> {
        let mut cells = vec![key];
        for allowance_type in AllowanceType::ALL {
            let total = totals.for_type(allowance_type);
            cells.push(total.usd.to_string());
            cells.push(total.local.to_string());
        }
        cells.push(totals.total.usd.to_string());
        cells.push(totals.total.local.to_string());
        cells
    }
}

//! Student repository for roster storage.

use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, OnConflict};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use stipend_core::student::{DegreeLevel, Lifecycle, Student, StudentId, StudentStatus};

use crate::entities::students;
use crate::error::StorageError;

/// Filter for listing students.
#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    /// Case-insensitive substring of the id or the name.
    pub query: Option<String>,
    /// Only students with this status.
    pub status: Option<StudentStatus>,
    /// Only students at this degree level.
    pub degree: Option<DegreeLevel>,
}

/// Roster size by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StudentCounts {
    /// All students.
    pub total: u64,
    /// Students currently enrolled.
    pub in_study: u64,
    /// Graduated students.
    pub graduated: u64,
    /// Withdrawn students.
    pub withdrawn: u64,
}

/// Student repository for roster operations.
#[derive(Debug, Clone)]
pub struct StudentRepository {
    db: DatabaseConnection,
}

impl StudentRepository {
    /// Creates a new student repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists students matching `filter`, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    pub async fn list(&self, filter: &StudentFilter) -> Result<Vec<Student>, StorageError> {
        let mut query = students::Entity::find();

        if let Some(text) = filter.query.as_deref().map(str::trim)
            && !text.is_empty()
        {
            let pattern = format!("%{}%", text.to_lowercase());
            query = query.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(students::Column::StudentId)))
                            .like(pattern.as_str()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(students::Column::Name)))
                            .like(pattern.as_str()),
                    ),
            );
        }
        if let Some(status) = filter.status {
            query = query.filter(students::Column::Status.eq(status.as_str()));
        }
        if let Some(degree) = filter.degree {
            query = query.filter(students::Column::DegreeLevel.eq(degree.as_str()));
        }

        query
            .order_by_asc(students::Column::StudentId)
            .all(&self.db)
            .await?
            .into_iter()
            .map(student_from_model)
            .collect()
    }

    /// Lists the whole roster.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    pub async fn all(&self) -> Result<Vec<Student>, StorageError> {
        self.list(&StudentFilter::default()).await
    }

    /// Finds a student by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt.
    pub async fn get(&self, id: &StudentId) -> Result<Option<Student>, StorageError> {
        students::Entity::find_by_id(id.as_str())
            .one(&self.db)
            .await?
            .map(student_from_model)
            .transpose()
    }

    /// Inserts a student or replaces the stored one with the same id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn upsert(&self, student: &Student) -> Result<(), DbErr> {
        Self::upsert_on(&self.db, student).await
    }

    /// Upserts many students in one transaction. Returns how many were written.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails; nothing is written in that case.
    pub async fn upsert_many(&self, roster: &[Student]) -> Result<usize, DbErr> {
        let txn = self.db.begin().await?;
        for student in roster {
            Self::upsert_on(&txn, student).await?;
        }
        txn.commit().await?;

        tracing::info!(count = roster.len(), "students upserted");
        Ok(roster.len())
    }

    async fn upsert_on<C>(conn: &C, student: &Student) -> Result<(), DbErr>
    where
        C: sea_orm::ConnectionTrait,
    {
        let now = Utc::now();
        let model = students::ActiveModel {
            student_id: Set(student.id().to_string()),
            name: Set(student.name().to_string()),
            degree_level: Set(student.degree().as_str().to_string()),
            first_entry_date: Set(student.entry_date()),
            graduation_date: Set(student.graduation_date()),
            withdrawal_date: Set(student.withdrawal_date()),
            status: Set(student.status().as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        students::Entity::insert(model)
            .on_conflict(
                OnConflict::column(students::Column::StudentId)
                    .update_columns([
                        students::Column::Name,
                        students::Column::DegreeLevel,
                        students::Column::FirstEntryDate,
                        students::Column::GraduationDate,
                        students::Column::WithdrawalDate,
                        students::Column::Status,
                        students::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
        Ok(())
    }

    /// Deletes a student. Returns `false` if no such student existed.
    ///
    /// Persisted allowance records of the student are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(&self, id: &StudentId) -> Result<bool, DbErr> {
        let result = students::Entity::delete_by_id(id.as_str())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Counts students in total and per status.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn counts(&self) -> Result<StudentCounts, DbErr> {
        let count = |status: StudentStatus| {
            students::Entity::find()
                .filter(students::Column::Status.eq(status.as_str()))
                .count(&self.db)
        };

        Ok(StudentCounts {
            total: students::Entity::find().count(&self.db).await?,
            in_study: count(StudentStatus::InStudy).await?,
            graduated: count(StudentStatus::Graduated).await?,
            withdrawn: count(StudentStatus::Withdrawn).await?,
        })
    }
}

/// Rebuilds a domain student from its row.
pub(crate) fn student_from_model(model: students::Model) -> Result<Student, StorageError> {
    let key = model.student_id.clone();
    let corrupt = |message: String| StorageError::corrupt("students", key.clone(), message);

    let id = StudentId::new(model.student_id).map_err(|e| corrupt(e.to_string()))?;
    let degree: DegreeLevel = model
        .degree_level
        .parse()
        .map_err(|e| corrupt(format!("{e}")))?;
    let status: StudentStatus = model.status.parse().map_err(|e| corrupt(format!("{e}")))?;

    let lifecycle = match status {
        StudentStatus::InStudy => Lifecycle::InStudy,
        StudentStatus::Graduated => Lifecycle::Graduated {
            graduation_date: model
                .graduation_date
                .ok_or_else(|| corrupt("graduated without graduation_date".into()))?,
        },
        StudentStatus::Withdrawn => Lifecycle::Withdrawn {
            withdrawal_date: model
                .withdrawal_date
                .ok_or_else(|| corrupt("withdrawn without withdrawal_date".into()))?,
        },
    };

    Student::new(id, model.name, degree, model.first_entry_date, lifecycle)
        .map_err(|e| corrupt(e.to_string()))
}

//! Integration tests for the Student repository.

mod common;

use common::{date, id, roster, setup, student};
use stipend_core::student::{DegreeLevel, Lifecycle, StudentStatus};
use stipend_db::{StudentCounts, StudentFilter, StudentRepository};

#[tokio::test]
async fn test_student_upsert_and_get() {
    let test = setup().await;
    let repo = StudentRepository::new(test.db.clone());

    for s in roster() {
        repo.upsert(&s).await.expect("Failed to upsert student");
    }

    let found = repo
        .get(&id("S2"))
        .await
        .expect("Query should succeed")
        .expect("Student should exist");
    assert_eq!(found, roster()[1]);
    assert_eq!(found.graduation_date(), Some(date(2025, 6, 30)));

    assert!(repo.get(&id("S9")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_student_upsert_replaces_existing() {
    let test = setup().await;
    let repo = StudentRepository::new(test.db.clone());

    let enrolled = student("S1", DegreeLevel::Master, date(2024, 9, 1), Lifecycle::InStudy);
    repo.upsert(&enrolled).await.unwrap();
    let graduated = enrolled.graduate(date(2026, 6, 30)).unwrap();
    repo.upsert(&graduated).await.unwrap();

    let all = repo.all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].status(), StudentStatus::Graduated);
    assert_eq!(all[0].graduation_date(), Some(date(2026, 6, 30)));
}

#[tokio::test]
async fn test_student_list_filters() {
    let test = setup().await;
    let repo = StudentRepository::new(test.db.clone());
    assert_eq!(repo.upsert_many(&roster()).await.unwrap(), 3);

    let ids = |students: Vec<stipend_core::student::Student>| {
        students
            .iter()
            .map(|s| s.id().to_string())
            .collect::<Vec<_>>()
    };

    let all = repo.list(&StudentFilter::default()).await.unwrap();
    assert_eq!(ids(all), vec!["S1", "S2", "S3"]);

    let by_name = repo
        .list(&StudentFilter {
            query: Some("student s3".into()),
            ..StudentFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(ids(by_name), vec!["S3"]);

    let graduated = repo
        .list(&StudentFilter {
            status: Some(StudentStatus::Graduated),
            ..StudentFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(ids(graduated), vec!["S2"]);

    let bachelors = repo
        .list(&StudentFilter {
            degree: Some(DegreeLevel::Bachelor),
            ..StudentFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(ids(bachelors), vec!["S1"]);

    let blank_query = repo
        .list(&StudentFilter {
            query: Some("   ".into()),
            ..StudentFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(blank_query.len(), 3);
}

#[tokio::test]
async fn test_student_delete_and_counts() {
    let test = setup().await;
    let repo = StudentRepository::new(test.db.clone());
    repo.upsert_many(&roster()).await.unwrap();

    assert_eq!(
        repo.counts().await.unwrap(),
        StudentCounts {
            total: 3,
            in_study: 1,
            graduated: 1,
            withdrawn: 1,
        }
    );

    assert!(repo.delete(&id("S3")).await.unwrap());
    assert!(!repo.delete(&id("S3")).await.unwrap());

    let counts = repo.counts().await.unwrap();
    assert_eq!(counts.total, 2);
    assert_eq!(counts.withdrawn, 0);
}

use chrono::NaiveDate;
use teloxide::types::UserId;
use crate::domain::NewSubmission;
use crate::repo;
use crate::repo::DailyCount;
use super::{start_database, AUTHOR_ID};

async fn deliver_on(db: &sqlx::Pool<sqlx::Sqlite>, day: NaiveDate) {
    let submissions = repo::Submissions::new(db.clone());
    let id = submissions.create(UserId(AUTHOR_ID), &NewSubmission::text("x"), day.and_hms_opt(9, 30, 0).expect("valid time"))
        .await.expect("couldn't create a submission");
    assert!(submissions.retire_and_record_delivery(id, day)
        .await.expect("couldn't retire the submission"));
}

#[tokio::test]
async fn total_starts_at_zero() {
    let db = start_database().await;
    let deliveries = repo::Deliveries::new(db.clone());

    assert_eq!(deliveries.total().await.expect("couldn't count the deliveries"), 0);
    assert!(deliveries.series_by_day().await.expect("couldn't fetch the series").is_empty());
}

#[tokio::test]
async fn series_is_grouped_by_day_in_ascending_order() {
    let db = start_database().await;
    let deliveries = repo::Deliveries::new(db.clone());

    let day1 = NaiveDate::from_ymd_opt(2026, 8, 3).expect("valid date");
    let day2 = NaiveDate::from_ymd_opt(2026, 8, 4).expect("valid date");
    deliver_on(&db, day2).await;
    deliver_on(&db, day1).await;
    deliver_on(&db, day2).await;

    let series = deliveries.series_by_day().await.expect("couldn't fetch the series");
    assert_eq!(series, vec![
        DailyCount { day: day1, count: 1 },
        DailyCount { day: day2, count: 2 },
    ]);

    let sum: i64 = series.iter().map(|point| point.count).sum();
    assert_eq!(sum as u64, deliveries.total().await.expect("couldn't count the deliveries"));
}

use anyhow::Context;
use chrono::NaiveDate;
use sqlx::FromRow;
use crate::repository;

#[derive(FromRow, Debug, Clone, PartialEq, Eq)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub count: i64,
}

repository!(Deliveries,
    pub async fn total(&self) -> anyhow::Result<u64> {
        sqlx::query_scalar::<_, i64>("SELECT count(*) FROM Deliveries")
            .fetch_one(&self.pool)
            .await
            .map(|total| total as u64)
            .context("couldn't count the delivery events")
    }
,
    pub async fn series_by_day(&self) -> anyhow::Result<Vec<DailyCount>> {
        sqlx::query_as::<_, DailyCount>(
            "SELECT day, count(*) AS count FROM Deliveries GROUP BY day ORDER BY day")
            .fetch_all(&self.pool)
            .await
            .context("couldn't fetch the per-day delivery counts")
    }
);

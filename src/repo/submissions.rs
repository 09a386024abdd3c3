use anyhow::{anyhow, Context};
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::FromRow;
use teloxide::types::UserId;
use crate::domain::{NewSubmission, Submission, SubmissionId, SubmissionKind};
use crate::repository;

#[derive(FromRow)]
struct SubmissionEntity {
    id: i64,
    author_id: i64,
    kind: String,
    media_ref: String,
    body: String,
    submitted_at: NaiveDateTime,
}

impl TryFrom<SubmissionEntity> for Submission {
    type Error = anyhow::Error;

    fn try_from(value: SubmissionEntity) -> Result<Self, Self::Error> {
        let kind: SubmissionKind = value.kind.parse()
            .map_err(|_| anyhow!("unknown submission kind stored for id = {}: {}", value.id, value.kind))?;
        Ok(Self {
            id: SubmissionId(value.id),
            author_id: UserId(value.author_id as u64),
            kind,
            media_ref: value.media_ref,
            body: value.body,
            submitted_at: value.submitted_at,
        })
    }
}

repository!(Submissions,
    pub async fn create(&self, author_id: UserId, submission: &NewSubmission, submitted_at: NaiveDateTime) -> anyhow::Result<SubmissionId> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO Submissions (author_id, kind, media_ref, body, submitted_at)
                VALUES (?, ?, ?, ?, ?) RETURNING id")
            .bind(author_id.0 as i64)
            .bind(submission.kind.to_string())
            .bind(&submission.media_ref)
            .bind(&submission.body)
            .bind(submitted_at)
            .fetch_one(&self.pool)
            .await
            .map(SubmissionId)
            .context("couldn't store a new submission")
    }
,
    pub async fn get(&self, id: SubmissionId) -> anyhow::Result<Option<Submission>> {
        sqlx::query_as::<_, SubmissionEntity>(
            "SELECT id, author_id, kind, media_ref, body, submitted_at FROM Submissions WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .context(format!("couldn't fetch the submission with id = {id}"))?
            .map(Submission::try_from)
            .transpose()
    }
,
    pub async fn list_pending(&self) -> anyhow::Result<Vec<Submission>> {
        sqlx::query_as::<_, SubmissionEntity>(
            "SELECT id, author_id, kind, media_ref, body, submitted_at FROM Submissions ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("couldn't fetch the pending submissions")?
            .into_iter()
            .map(Submission::try_from)
            .collect()
    }
,
    /// Deletes the submission and appends the delivery event in one transaction,
    /// so retirement is never observable without its count (and vice versa).
    /// Returns false when the submission was already gone.
    pub async fn retire_and_record_delivery(&self, id: SubmissionId, day: NaiveDate) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;
        let retired = sqlx::query("DELETE FROM Submissions WHERE id = ?")
            .bind(id.0)
            .execute(&mut *tx)
            .await
            .context(format!("couldn't retire the submission with id = {id}"))?
            .rows_affected() > 0;
        if retired {
            sqlx::query("INSERT INTO Deliveries (day) VALUES (?)")
                .bind(day)
                .execute(&mut *tx)
                .await
                .context(format!("couldn't record a delivery event for the submission with id = {id}"))?;
        }
        tx.commit().await?;
        Ok(retired)
    }
);

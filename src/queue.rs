use chrono::{DateTime, FixedOffset, NaiveDateTime, Timelike};
use derive_more::{Display, Error};
use teloxide::types::{ChatId, UserId};
use crate::domain::{InvalidSubmission, NewSubmission, SubmissionId};
use crate::gateway::{ActionButton, MessagingGateway};
use crate::handlers::ApprovalCallbackData;
use crate::handlers::utils::callbacks::CallbackDataWithPrefix;
use crate::repo::Repositories;

const APPROVE_BUTTON_LABEL: &str = "✅ APPROVE";
const RECEIPT_TEXT: &str = "✅ Confession received. Wait for the moderator to approve it.";

#[derive(Debug, Display, Error)]
pub enum SubmitError {
    #[display("rejected submission: {_0}")]
    Validation(InvalidSubmission),
    #[display("couldn't queue the submission: {_0}")]
    Store(#[error(not(source))] anyhow::Error),
}

/// Intake side of the pipeline: validates a submission, persists it under a fresh
/// reference and puts the approval control in front of the moderator.
pub struct ModerationQueue<'a, G: MessagingGateway> {
    gateway: &'a G,
    repos: &'a Repositories,
}

impl<'a, G: MessagingGateway> ModerationQueue<'a, G> {
    pub fn new(gateway: &'a G, repos: &'a Repositories) -> Self {
        Self { gateway, repos }
    }

    pub async fn submit(&self, author_id: UserId, submission: NewSubmission, now: DateTime<FixedOffset>) -> Result<SubmissionId, SubmitError> {
        submission.validate().map_err(SubmitError::Validation)?;

        let submitted_at = minute_precision(now);
        let id = self.repos.submissions.create(author_id, &submission, submitted_at)
            .await
            .map_err(SubmitError::Store)?;

        let preview = render_preview(id, author_id, &submission.body, submitted_at);
        let button = ActionButton::new(
            APPROVE_BUTTON_LABEL.to_owned(),
            ApprovalCallbackData::new(id).to_data_string(),
        );
        if let Err(fault) = self.gateway.notify_moderator(&preview, button).await {
            // the submission stays queued; /pending still lets the moderator find it
            log::error!("couldn't notify the moderator about submission {id}: {fault}");
        }
        if let Err(fault) = self.gateway.acknowledge_sender(ChatId(author_id.0 as i64), RECEIPT_TEXT).await {
            log::warn!("couldn't acknowledge submission {id} to its author: {fault}");
        }
        Ok(id)
    }
}

fn render_preview(id: SubmissionId, author_id: UserId, body: &str, submitted_at: NaiveDateTime) -> String {
    format!(
        "📥 NEW SUBMISSION\nID: {id}\nFrom: {author_id}\nTime: {}\n\n{body}",
        submitted_at.format("%Y-%m-%d %H:%M"),
    )
}

fn minute_precision(now: DateTime<FixedOffset>) -> NaiveDateTime {
    let naive = now.naive_local();
    naive.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(naive)
}

use chrono::Utc;
use teloxide::Bot;
use teloxide::requests::Requester;
use teloxide::types::Message;
use crate::config::AppConfig;
use crate::domain::{NewSubmission, SubmissionKind};
use crate::gateway::TelegramGateway;
use crate::handlers::HandlerResult;
use crate::queue::{ModerationQueue, SubmitError};
use crate::{metrics, repo};

const UNSUPPORTED_TEXT: &str = "❌ Only text, photo, and video messages can be relayed.";

/// The submission entry point: any private, non-command message from a regular
/// user ends up here.
pub async fn submission_handler(bot: Bot, msg: Message, repos: repo::Repositories, config: AppConfig) -> HandlerResult {
    metrics::SUBMISSIONS_COUNTER.invoked();

    let from = match msg.from() {
        Some(from) => from,
        None => return Ok(()),
    };
    let submission = match extract_submission(&msg) {
        Some(submission) => submission,
        None => {
            bot.send_message(msg.chat.id, UNSUPPORTED_TEXT).await?;
            return Ok(());
        }
    };

    let gateway = TelegramGateway::new(bot.clone(), config.moderator_id);
    let queue = ModerationQueue::new(&gateway, &repos);
    let now = Utc::now().with_timezone(&config.time_zone);
    match queue.submit(from.id, submission, now).await {
        Ok(id) => {
            metrics::SUBMISSIONS_COUNTER.finished();
            log::info!("submission {id} was queued for moderation");
        }
        Err(SubmitError::Validation(reason)) => {
            log::info!("rejected a submission from user {}: {reason}", from.id);
            bot.send_message(msg.chat.id, UNSUPPORTED_TEXT).await?;
        }
        Err(SubmitError::Store(e)) => Err(e)?,
    }
    Ok(())
}

fn extract_submission(msg: &Message) -> Option<NewSubmission> {
    if let Some(text) = msg.text() {
        Some(NewSubmission::text(text))
    } else if let Some(photos) = msg.photo() {
        // the largest size comes last
        photos.last()
            .map(|photo| NewSubmission::with_media(SubmissionKind::Photo, photo.file.id.clone(), msg.caption()))
    } else if let Some(video) = msg.video() {
        Some(NewSubmission::with_media(SubmissionKind::Video, video.file.id.clone(), msg.caption()))
    } else {
        None
    }
}

use derive_more::{Constructor, Display};
use teloxide::Bot;
use teloxide::requests::Requester;
use teloxide::types::CallbackQuery;
use crate::broadcast::{ApproveError, BroadcastEngine};
use crate::broadcast::locks::ApprovalLocks;
use crate::config::AppConfig;
use crate::domain::SubmissionId;
use crate::gateway::TelegramGateway;
use crate::handlers::HandlerResult;
use crate::handlers::utils::callbacks;
use crate::handlers::utils::callbacks::{CallbackDataWithPrefix, InvalidCallbackData, InvalidCallbackDataBuilder};
use crate::{metrics, repo};

const NOT_MODERATOR_TEXT: &str = "Only the moderator may approve submissions.";
const NOT_FOUND_TEXT: &str = "Not found. It may have been approved already.";

#[derive(Display, Constructor)]
#[display("{submission_id}")]
pub struct ApprovalCallbackData {
    pub submission_id: SubmissionId,
}

impl CallbackDataWithPrefix for ApprovalCallbackData {
    fn prefix() -> &'static str {
        "approve"
    }
}

impl TryFrom<String> for ApprovalCallbackData {
    type Error = InvalidCallbackData;

    fn try_from(data: String) -> Result<Self, Self::Error> {
        let err = InvalidCallbackDataBuilder(&data);
        let mut parts = data.as_str().split(':');
        let submission_id = callbacks::parse_part::<_, i64>(&mut parts, &err, "submission_id")
            .map(SubmissionId)?;
        Ok(Self { submission_id })
    }
}

#[inline]
pub fn approval_callback_filter(query: CallbackQuery) -> bool {
    ApprovalCallbackData::check_prefix(query)
}

pub async fn approval_callback_handler(bot: Bot, query: CallbackQuery, repos: repo::Repositories,
                                       config: AppConfig, locks: ApprovalLocks) -> HandlerResult {
    metrics::APPROVAL_COUNTER.invoked();

    let mut answer = bot.answer_callback_query(&query.id);
    if query.from.id != config.moderator_id {
        log::warn!("an approval attempt by the non-moderator user {}", query.from.id);
        answer.show_alert.replace(true);
        answer.text.replace(NOT_MODERATOR_TEXT.to_owned());
        answer.await?;
        return Ok(());
    }

    let data = ApprovalCallbackData::parse(&query)?;
    let id = data.submission_id;

    let gateway = TelegramGateway::new(bot.clone(), config.moderator_id);
    let engine = BroadcastEngine::new(&gateway, &repos, &locks, &config);
    match engine.approve(id).await {
        Ok(report) => {
            metrics::APPROVAL_COUNTER.finished();
            report.failed.iter().for_each(|_| metrics::BROADCAST_FAILURES.inc());
            log::info!("submission {id} was broadcast to {} of {} destination(s)",
                report.delivered.len(), report.attempted());
            if let Some(message) = &query.message {
                bot.send_message(message.chat.id, report.summary()).await?;
            }
            answer.text.replace("Approved".to_owned());
        }
        Err(ApproveError::NotFound(id)) => {
            log::info!("an approval of the vanished or already consumed submission {id}");
            answer.show_alert.replace(true);
            answer.text.replace(NOT_FOUND_TEXT.to_owned());
        }
        Err(ApproveError::Store(e)) => Err(e)?,
    }
    answer.await?;
    Ok(())
}

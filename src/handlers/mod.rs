mod approval;
mod destinations;
mod start;
mod stats;
mod submission;
pub mod utils;

use teloxide::Bot;
use teloxide::payloads::SendMessage;
use teloxide::requests::{JsonRequest, Requester};
use teloxide::types::Message;
use teloxide::types::ParseMode::Html;

pub use approval::*;
pub use destinations::*;
pub use start::*;
pub use stats::*;
pub use submission::*;

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

pub fn reply_html<T: Into<String>>(bot: Bot, msg: &Message, answer: T) -> JsonRequest<SendMessage> {
    let mut answer = bot.send_message(msg.chat.id, answer);
    answer.parse_mode = Some(Html);
    if msg.chat.is_group() || msg.chat.is_supergroup() {
        answer.reply_to_message_id = Some(msg.id);
    }
    answer
}

pub mod checks {
    use teloxide::types::Message;
    use crate::config::AppConfig;

    pub fn is_private_chat(msg: Message) -> bool {
        msg.chat.is_private()
    }

    pub fn is_moderator(msg: Message, config: AppConfig) -> bool {
        msg.from()
            .map(|user| user.id == config.moderator_id)
            .unwrap_or(false)
    }

    pub fn is_not_moderator(msg: Message, config: AppConfig) -> bool {
        !is_moderator(msg, config)
    }
}

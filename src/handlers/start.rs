use teloxide::Bot;
use teloxide::macros::BotCommands;
use teloxide::types::Message;
use crate::config::AppConfig;
use crate::handlers::{reply_html, HandlerResult};
use crate::help::HelpContainer;
use crate::metrics;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum StartCommands {
    #[command(description = "show the instructions")]
    Start,
    #[command(description = "show the instructions")]
    Help,
}

pub async fn start_cmd_handler(bot: Bot, msg: Message, config: AppConfig,
                               help: HelpContainer) -> HandlerResult {
    metrics::CMD_START_COUNTER.inc();
    let from_moderator = msg.from()
        .map(|user| user.id == config.moderator_id)
        .unwrap_or(false);
    let answer = if from_moderator {
        help.owner_panel()
    } else {
        help.user_instructions()
    };
    reply_html(bot, &msg, answer).await?;
    Ok(())
}

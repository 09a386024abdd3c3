use futures::future::join_all;
use teloxide::{Bot, RequestError};
use teloxide::requests::Requester;
use teloxide::types::{BotCommand, BotCommandScope, ChatId, Recipient};
use teloxide::utils::command::BotCommands;
use crate::config::AppConfig;
use crate::handlers::{DestinationCommands, StartCommands, StatsCommands};

pub async fn set_my_commands(bot: &Bot, config: &AppConfig) -> Result<(), RequestError> {
    let personal_commands = vec![
        StartCommands::bot_commands(),
    ];
    let group_admin_commands = vec![
        DestinationCommands::bot_commands(),
    ];
    let moderator_commands = vec![
        StartCommands::bot_commands(),
        DestinationCommands::bot_commands(),
        StatsCommands::bot_commands(),
    ];

    let moderator_chat = Recipient::Id(ChatId(config.moderator_id.0 as i64));
    let requests = vec![
        set_commands(bot, personal_commands, BotCommandScope::AllPrivateChats),
        set_commands(bot, group_admin_commands, BotCommandScope::AllChatAdministrators),
        set_commands(bot, moderator_commands, BotCommandScope::Chat { chat_id: moderator_chat }),
    ];
    join_all(requests)
        .await
        .into_iter()
        .find(Result::is_err)
        .unwrap_or(Ok(()))
}

async fn set_commands(bot: &Bot, commands: Vec<Vec<BotCommand>>, scope: BotCommandScope) -> Result<(), RequestError> {
    let mut request = bot.set_my_commands(commands.concat());
    request.scope.replace(scope);
    request.await?;
    Ok(())
}

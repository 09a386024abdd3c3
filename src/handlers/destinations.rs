use teloxide::Bot;
use teloxide::macros::BotCommands;
use teloxide::types::Message;
use crate::handlers::{reply_html, HandlerResult};
use crate::{metrics, repo};

const USE_INSIDE_A_GROUP_TEXT: &str = "Run this command inside the group itself.";

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum DestinationCommands {
    #[command(description = "register this group for broadcasts")]
    AddGroup,
    #[command(description = "remove this group from broadcasts")]
    DelGroup,
    #[command(description = "list the registered groups")]
    Groups,
}

pub async fn destinations_cmd_handler(bot: Bot, msg: Message, cmd: DestinationCommands,
                                      repos: repo::Repositories) -> HandlerResult {
    let in_group = msg.chat.is_group() || msg.chat.is_supergroup();
    let answer = match cmd {
        DestinationCommands::AddGroup if in_group => {
            metrics::CMD_ADD_GROUP_COUNTER.inc();
            repos.destinations.register(msg.chat.id).await?;
            log::info!("registered the destination group {}", msg.chat.id);
            "✅ Group registered.".to_owned()
        }
        DestinationCommands::DelGroup if in_group => {
            metrics::CMD_DEL_GROUP_COUNTER.inc();
            repos.destinations.deregister(msg.chat.id).await?;
            log::info!("deregistered the destination group {}", msg.chat.id);
            "❌ Group removed.".to_owned()
        }
        DestinationCommands::AddGroup | DestinationCommands::DelGroup =>
            USE_INSIDE_A_GROUP_TEXT.to_owned(),
        DestinationCommands::Groups => {
            metrics::CMD_GROUPS_COUNTER.inc();
            let destinations = repos.destinations.list().await?;
            if destinations.is_empty() {
                "No groups yet.".to_owned()
            } else {
                let lines = destinations.iter()
                    .map(|chat_id| chat_id.to_string())
                    .collect::<Vec<String>>()
                    .join("\n");
                format!("📌 REGISTERED GROUPS:\n{lines}")
            }
        }
    };
    reply_html(bot, &msg, answer).await?;
    Ok(())
}

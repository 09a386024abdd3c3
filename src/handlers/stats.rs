use teloxide::Bot;
use teloxide::macros::BotCommands;
use teloxide::requests::Requester;
use teloxide::types::{InputFile, Message};
use crate::chart::{ChartRenderer, SvgChartRenderer};
use crate::handlers::{reply_html, HandlerResult};
use crate::{metrics, repo};

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum StatsCommands {
    #[command(description = "show the moderation queue")]
    Pending,
    #[command(description = "show the total of delivered broadcasts")]
    Stats,
    #[command(description = "render the per-day delivery chart")]
    Graph,
}

pub async fn stats_cmd_handler(bot: Bot, msg: Message, cmd: StatsCommands,
                               repos: repo::Repositories) -> HandlerResult {
    match cmd {
        StatsCommands::Pending => {
            metrics::CMD_PENDING_COUNTER.inc();
            let pending = repos.submissions.list_pending().await?;
            let answer = if pending.is_empty() {
                "The moderation queue is empty.".to_owned()
            } else {
                let lines = pending.iter()
                    .map(|submission| format!("#{}: {} from {} at {}",
                        submission.id, submission.kind, submission.author_id,
                        submission.submitted_at.format("%Y-%m-%d %H:%M")))
                    .collect::<Vec<String>>()
                    .join("\n");
                format!("📥 PENDING SUBMISSIONS:\n{lines}")
            };
            reply_html(bot, &msg, answer).await?;
        }
        StatsCommands::Stats => {
            metrics::CMD_STATS_COUNTER.inc();
            let total = repos.deliveries.total().await?;
            reply_html(bot, &msg, format!("📊 Total broadcasts delivered: {total}")).await?;
        }
        StatsCommands::Graph => {
            metrics::CMD_GRAPH_COUNTER.inc();
            let series = repos.deliveries.series_by_day().await?;
            if series.is_empty() {
                reply_html(bot, &msg, "No data yet.").await?;
            } else {
                let chart = SvgChartRenderer::default().render(&series)?;
                let document = InputFile::memory(chart).file_name("deliveries.svg");
                bot.send_document(msg.chat.id, document).await?;
            }
        }
    }
    Ok(())
}

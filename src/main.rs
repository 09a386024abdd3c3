mod broadcast;
mod chart;
mod commands;
mod config;
mod domain;
mod gateway;
mod handlers;
mod help;
mod metrics;
mod queue;
mod repo;

use std::env::VarError;
use std::net::SocketAddr;
use reqwest::Url;
use teloxide::prelude::*;
use teloxide::dptree::deps;
use teloxide::update_listeners::webhooks::{axum_to_router, Options};
use teloxide::update_listeners::UpdateListener;
use crate::broadcast::locks::ApprovalLocks;
use crate::handlers::checks;
use crate::handlers::{DestinationCommands, StartCommands, StatsCommands};

const ENV_WEBHOOK_URL: &str = "WEBHOOK_URL";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(debug_assertions)]
    dotenvy::dotenv()?;

    pretty_env_logger::init();

    let app_config = config::AppConfig::from_env()?;
    let database_config = config::DatabaseConfig::from_env()?;
    let db_conn = repo::establish_database_connection(&database_config).await?;

    let handler = dptree::entry()
        .branch(Update::filter_message().filter_command::<StartCommands>().endpoint(handlers::start_cmd_handler))
        .branch(Update::filter_message().filter_command::<DestinationCommands>().filter(checks::is_moderator).endpoint(handlers::destinations_cmd_handler))
        .branch(Update::filter_message().filter_command::<StatsCommands>().filter(checks::is_moderator).endpoint(handlers::stats_cmd_handler))
        .branch(Update::filter_message().filter(checks::is_private_chat).filter(checks::is_not_moderator).endpoint(handlers::submission_handler))
        .branch(Update::filter_callback_query().filter(handlers::approval_callback_filter).endpoint(handlers::approval_callback_handler));

    let bot = Bot::from_env();
    bot.delete_webhook().await?;

    commands::set_my_commands(&bot, &app_config).await?;

    let me = bot.get_me().await?;
    let repos = repo::Repositories::new(&db_conn);
    let help_container = help::render_help_messages(help::Context {
        bot_name: me.username().to_owned(),
    })?;
    let approval_locks = ApprovalLocks::default();

    let webhook_url: Option<Url> = match std::env::var(ENV_WEBHOOK_URL) {
        Ok(env_url) if !env_url.is_empty() => Some(env_url.parse()?),
        Ok(env_url) if env_url.is_empty() => None,
        Err(VarError::NotPresent) => None,
        _ => Err("invalid webhook URL!")?
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    let metrics_router = metrics::init();

    let ignore_unknown_updates = |_| Box::pin(async {});
    let deps = deps![
        repos,
        app_config,
        help_container,
        approval_locks
    ];

    match webhook_url {
        Some(url) => {
            log::info!("Setting a webhook: {url}");

            let (mut listener, stop_flag, bot_router) = axum_to_router(bot.clone(), Options::new(addr, url)).await?;
            let stop_token = listener.stop_token();

            let error_handler = LoggingErrorHandler::with_custom_text("An error from the update listener");
            let mut dispatcher = Dispatcher::builder(bot, handler)
                .default_handler(ignore_unknown_updates)
                .dependencies(deps)
                .build();
            let bot_fut = dispatcher.dispatch_with_listener(listener, error_handler);

            let srv = tokio::spawn(async move {
                let server = axum::Server::try_bind(&addr)
                    .map_err(|err| {
                        stop_token.stop();
                        err
                    })?;
                let app = axum::Router::new()
                    .merge(metrics_router)
                    .merge(bot_router);
                server.serve(app.into_make_service())
                    .with_graceful_shutdown(stop_flag)
                    .await
            });

            let (res, _) = futures::join!(srv, bot_fut);
            res
        }
        None => {
            log::info!("The polling dispatcher is activating...");

            let bot_fut = tokio::spawn(async move {
                Dispatcher::builder(bot, handler)
                    .default_handler(ignore_unknown_updates)
                    .dependencies(deps)
                    .enable_ctrlc_handler()
                    .build()
                    .dispatch()
                    .await
            });

            let srv = tokio::spawn(async move {
                axum::Server::try_bind(&addr)?
                    .serve(metrics_router.into_make_service())
                    .with_graceful_shutdown(async {
                        tokio::signal::ctrl_c()
                            .await
                            .expect("failed to install CTRL+C signal handler");
                        log::info!("Shutdown of the metrics server")
                    })
                    .await
            });

            let (res, _) = futures::join!(srv, bot_fut);
            res
        }
    }?.map_err(Into::into)
}

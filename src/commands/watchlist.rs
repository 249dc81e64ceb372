use anyhow::Result;
use log::info;
use std::sync::Arc;
use teloxide::prelude::*;

use super::{watchlist_presenter, CommandHandler, MyDialogue};
use crate::di::ServiceContainer;
use crate::entity::State;
use crate::presenter::watchlist_presenter::WatchlistPresenter;

pub struct WatchlistCommand;

impl CommandHandler for WatchlistCommand {
    fn command_name() -> &'static str {
        "watchlist"
    }

    fn description() -> &'static str {
        "show your watchlist and portfolio value"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        telegram_id: i64,
        _dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        info!(
            "Watchlist command received from Telegram ID: {}",
            telegram_id
        );

        let presenter = watchlist_presenter(bot, msg.chat.id, &services);
        presenter.show_watchlist().await?;

        Ok(())
    }
}

pub struct RefreshCommand;

impl CommandHandler for RefreshCommand {
    fn command_name() -> &'static str {
        "refresh"
    }

    fn description() -> &'static str {
        "refresh prices now"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        telegram_id: i64,
        _dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        info!("Refresh command received from Telegram ID: {}", telegram_id);

        let presenter = watchlist_presenter(bot, msg.chat.id, &services);
        presenter.refresh_watchlist().await?;

        Ok(())
    }
}

pub struct PortfolioCommand;

impl CommandHandler for PortfolioCommand {
    fn command_name() -> &'static str {
        "portfolio"
    }

    fn description() -> &'static str {
        "show the portfolio distribution"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        _telegram_id: i64,
        _dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        let presenter = watchlist_presenter(bot, msg.chat.id, &services);
        presenter.show_distribution().await?;

        Ok(())
    }
}

// Handler for the holdings amount while a holdings edit is open
pub async fn receive_holdings(
    bot: Bot,
    msg: Message,
    state: State,
    dialogue: MyDialogue,
    services: Arc<ServiceContainer>,
) -> Result<()> {
    let State::AwaitingHoldings { token_id } = state else {
        return Ok(());
    };

    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Please send the amount as a number.")
            .await?;
        return Ok(());
    };

    dialogue.exit().await?;

    let presenter = watchlist_presenter(bot, msg.chat.id, &services);
    presenter.save_holdings(&token_id, text).await?;

    Ok(())
}

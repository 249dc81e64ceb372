use anyhow::Result;
use log::info;
use std::sync::Arc;
use teloxide::prelude::*;

use super::{reset_dialogue, search_presenter, CommandHandler, MyDialogue};
use crate::di::ServiceContainer;
use crate::entity::State;
use crate::presenter::search_presenter::SearchPresenter;

pub struct AddCommand;

impl CommandHandler for AddCommand {
    fn command_name() -> &'static str {
        "add"
    }

    fn description() -> &'static str {
        "search for a token to track"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        telegram_id: i64,
        dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        info!("Add command received from Telegram ID: {}", telegram_id);

        start_search(bot, msg.chat.id, dialogue, &services).await
    }
}

pub struct TrendingCommand;

impl CommandHandler for TrendingCommand {
    fn command_name() -> &'static str {
        "trending"
    }

    fn description() -> &'static str {
        "show trending tokens"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        _telegram_id: i64,
        _dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        let presenter = search_presenter(bot, msg.chat.id, &services);
        presenter.show_trending().await?;

        Ok(())
    }
}

/// Opens the search prompt and waits for a term
pub async fn start_search(
    bot: Bot,
    chat_id: ChatId,
    dialogue: Option<MyDialogue>,
    services: &ServiceContainer,
) -> Result<()> {
    if let Some(dialogue) = dialogue {
        reset_dialogue(&dialogue, services).await?;
        dialogue.update(State::AwaitingSearchTerm).await?;
    }

    let presenter = search_presenter(bot, chat_id, services);
    presenter.prompt_for_search_term().await?;

    Ok(())
}

// Handler for the search term; the dialogue stays open so the user can refine it
pub async fn receive_search_term(
    bot: Bot,
    msg: Message,
    services: Arc<ServiceContainer>,
) -> Result<()> {
    let Some(term) = msg.text() else {
        bot.send_message(msg.chat.id, "Please send the token name as text.")
            .await?;
        return Ok(());
    };

    let presenter = search_presenter(bot, msg.chat.id, &services);
    presenter.search(term).await?;

    Ok(())
}

use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;
use teloxide::{prelude::*, types::ParseMode};

use crate::commands::help::help_text;
use crate::commands::search::start_search;
use crate::commands::{
    main_menu_keyboard, reset_dialogue, search_presenter, watchlist_presenter, MyDialogue,
};
use crate::di::ServiceContainer;
use crate::entity::State;
use crate::presenter::search_presenter::SearchPresenter;
use crate::presenter::watchlist_presenter::WatchlistPresenter;

/// Inline button intents
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackAction {
    Menu,
    Watchlist,
    Refresh,
    Distribution,
    Search,
    Trending,
    Help,
    Add(String),
    Remove(String),
    EditHoldings(String),
    CancelEdit(String),
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        let action = match data {
            "menu" => Self::Menu,
            "watchlist" => Self::Watchlist,
            "watchlist_refresh" => Self::Refresh,
            "watchlist_add" => Self::Search,
            "portfolio" => Self::Distribution,
            "trending" => Self::Trending,
            "help" => Self::Help,
            _ => {
                let with_id = |prefix: &str| {
                    data.strip_prefix(prefix)
                        .filter(|id| !id.is_empty())
                        .map(str::to_string)
                };
                if let Some(id) = with_id("cancel_edit_") {
                    Self::CancelEdit(id)
                } else if let Some(id) = with_id("edit_") {
                    Self::EditHoldings(id)
                } else if let Some(id) = with_id("remove_") {
                    Self::Remove(id)
                } else if let Some(id) = with_id("add_") {
                    Self::Add(id)
                } else {
                    return None;
                }
            }
        };
        Some(action)
    }
}

// Main callback handler function
pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    dialogue: MyDialogue,
    services: Arc<ServiceContainer>,
) -> Result<()> {
    // Extract the callback data
    let callback_data = match q.data {
        Some(ref data) => data.clone(),
        None => return Ok(()),
    };

    // Get the chat ID
    let chat_id = match q.message {
        Some(ref msg) => msg.chat().id,
        None => return Ok(()),
    };

    let telegram_id = q.from.id.0 as i64;
    info!(
        "Received callback: {} from user {}",
        callback_data, telegram_id
    );

    // Acknowledge the callback query to stop loading animation
    if let Err(err) = bot.answer_callback_query(q.id.clone()).await {
        info!("Failed to answer callback query: {}", err);
    }

    let Some(action) = CallbackAction::parse(&callback_data) else {
        warn!("Unknown callback data: {}", callback_data);
        return Ok(());
    };

    match action {
        CallbackAction::Menu => {
            reset_dialogue(&dialogue, &services).await?;
            bot.send_message(chat_id, "<b>Main Menu</b>")
                .parse_mode(ParseMode::Html)
                .reply_markup(main_menu_keyboard())
                .await?;
        }
        CallbackAction::Watchlist => {
            reset_dialogue(&dialogue, &services).await?;
            watchlist_presenter(bot, chat_id, &services)
                .show_watchlist()
                .await?;
        }
        CallbackAction::Refresh => {
            watchlist_presenter(bot, chat_id, &services)
                .refresh_watchlist()
                .await?;
        }
        CallbackAction::Distribution => {
            watchlist_presenter(bot, chat_id, &services)
                .show_distribution()
                .await?;
        }
        CallbackAction::Search => {
            start_search(bot, chat_id, Some(dialogue), &services).await?;
        }
        CallbackAction::Trending => {
            search_presenter(bot, chat_id, &services)
                .show_trending()
                .await?;
        }
        CallbackAction::Help => {
            bot.send_message(chat_id, help_text()).await?;
        }
        CallbackAction::Add(token_id) => {
            reset_dialogue(&dialogue, &services).await?;
            watchlist_presenter(bot, chat_id, &services)
                .add_token(&token_id)
                .await?;
        }
        CallbackAction::Remove(token_id) => {
            if matches!(
                dialogue.get().await?,
                Some(State::AwaitingHoldings { token_id: ref editing }) if *editing == token_id
            ) {
                dialogue.exit().await?;
            }
            watchlist_presenter(bot, chat_id, &services)
                .remove_token(&token_id)
                .await?;
        }
        CallbackAction::EditHoldings(token_id) => {
            // Another open edit loses focus
            reset_dialogue(&dialogue, &services).await?;
            let started = watchlist_presenter(bot, chat_id, &services)
                .begin_holdings_edit(&token_id)
                .await?;
            if started {
                dialogue
                    .update(State::AwaitingHoldings { token_id })
                    .await?;
            }
        }
        CallbackAction::CancelEdit(token_id) => {
            dialogue.exit().await?;
            watchlist_presenter(bot, chat_id, &services)
                .cancel_holdings_edit(&token_id)
                .await?;
        }
    }

    Ok(())
}

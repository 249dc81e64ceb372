use anyhow::Result;
use log::debug;
use std::sync::Arc;
use teloxide::{
    dispatching::dialogue::InMemStorage,
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup},
};

use crate::di::ServiceContainer;
use crate::entity::State;
use crate::interactor::search_interactor::SearchInteractorImpl;
use crate::interactor::watchlist_interactor::WatchlistInteractorImpl;
use crate::presenter::search_presenter::SearchPresenterImpl;
use crate::presenter::watchlist_presenter::WatchlistPresenterImpl;
use crate::view::search_view::TelegramSearchView;
use crate::view::watchlist_view::TelegramWatchlistView;
use teloxide::dispatching::dialogue::Dialogue;

pub mod callback;
pub mod help;
pub mod search;
pub mod start;
pub mod watchlist;

pub type MyDialogue = Dialogue<State, InMemStorage<State>>;

/// Trait that defines a command handler
pub trait CommandHandler {
    /// The command name in lowercase
    fn command_name() -> &'static str;

    /// The command description for help
    fn description() -> &'static str;

    /// Execute the command
    async fn execute(
        bot: Bot,
        msg: Message,
        telegram_id: i64,
        dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()>;
}

/// Register all command handlers in the command system
pub fn register_commands() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            start::StartCommand::command_name(),
            start::StartCommand::description(),
        ),
        (
            watchlist::WatchlistCommand::command_name(),
            watchlist::WatchlistCommand::description(),
        ),
        (
            search::AddCommand::command_name(),
            search::AddCommand::description(),
        ),
        (
            search::TrendingCommand::command_name(),
            search::TrendingCommand::description(),
        ),
        (
            watchlist::RefreshCommand::command_name(),
            watchlist::RefreshCommand::description(),
        ),
        (
            watchlist::PortfolioCommand::command_name(),
            watchlist::PortfolioCommand::description(),
        ),
        (
            help::HelpCommand::command_name(),
            help::HelpCommand::description(),
        ),
    ]
}

/// Bot Commands enum for teloxide command filter
#[derive(teloxide::utils::command::BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum BotCommands {
    #[command(description = "start the bot and show the main menu")]
    Start,
    #[command(description = "show your watchlist and portfolio value")]
    Watchlist,
    #[command(description = "search for a token to track")]
    Add,
    #[command(description = "show trending tokens")]
    Trending,
    #[command(description = "refresh prices now")]
    Refresh,
    #[command(description = "show the portfolio distribution")]
    Portfolio,
    #[command(description = "display this help message")]
    Help,
}

pub fn main_menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("📋 Watchlist", "watchlist"),
            InlineKeyboardButton::callback("📊 Distribution", "portfolio"),
        ],
        vec![
            InlineKeyboardButton::callback("➕ Add Token", "watchlist_add"),
            InlineKeyboardButton::callback("🔥 Trending", "trending"),
        ],
        vec![InlineKeyboardButton::callback("❓ Help", "help")],
    ])
}

pub(crate) fn watchlist_presenter(
    bot: Bot,
    chat_id: ChatId,
    services: &ServiceContainer,
) -> WatchlistPresenterImpl<WatchlistInteractorImpl, TelegramWatchlistView> {
    let interactor = Arc::new(WatchlistInteractorImpl::new(
        services.store(),
        services.coordinator(),
        services.search(),
    ));
    let view = Arc::new(TelegramWatchlistView::new(
        bot,
        chat_id,
        services.config().vs_currency.clone(),
    ));
    WatchlistPresenterImpl::new(interactor, view)
}

pub(crate) fn search_presenter(
    bot: Bot,
    chat_id: ChatId,
    services: &ServiceContainer,
) -> SearchPresenterImpl<SearchInteractorImpl, TelegramSearchView> {
    let interactor = Arc::new(SearchInteractorImpl::new(
        services.search(),
        services.store(),
    ));
    let view = Arc::new(TelegramSearchView::new(bot, chat_id));
    SearchPresenterImpl::new(interactor, view)
}

/// Resets the dialogue, dropping the edit flag of an abandoned holdings edit
pub(crate) async fn reset_dialogue(
    dialogue: &MyDialogue,
    services: &ServiceContainer,
) -> Result<()> {
    if let Some(State::AwaitingHoldings { token_id }) = dialogue.get().await? {
        debug!("Abandoning holdings edit of {}", token_id);
        services.store().set_editing_mode(&token_id, false);
    }
    dialogue.exit().await?;
    Ok(())
}

use async_trait::async_trait;
use log::warn;
use std::sync::Arc;
use teloxide::{
    dispatching::dialogue::InMemStorage, dispatching::UpdateHandler, prelude::*,
};

use crate::commands::{
    self, callback::handle_callback, BotCommands, CommandHandler, MyDialogue,
};
use crate::di::ServiceContainer;
use crate::entity::State;

// Base router trait
#[async_trait]
pub trait Router: Send + Sync {
    fn setup_handlers(&self) -> UpdateHandler<anyhow::Error>;
}

// Command router implementation
pub struct TelegramRouter {
    services: Arc<ServiceContainer>,
}

impl TelegramRouter {
    pub fn new(services: Arc<ServiceContainer>) -> Self {
        Self { services }
    }
}

fn chat_of(update: &Update) -> Option<i64> {
    update.chat().map(|chat| chat.id.0)
}

#[async_trait]
impl Router for TelegramRouter {
    fn setup_handlers(&self) -> UpdateHandler<anyhow::Error> {
        use dptree::case;
        use teloxide::dispatching::UpdateFilterExt;

        let services = self.services.clone();
        let owner_gate = dptree::filter(move |update: Update| match chat_of(&update) {
            Some(chat_id) if services.is_authorized(chat_id) => true,
            chat_id => {
                warn!("Ignoring update from unauthorized chat {:?}", chat_id);
                false
            }
        });

        // Use BotCommands enum with teloxide's command filter
        let command_handler = teloxide::filter_command::<BotCommands, _>()
            .branch(case![BotCommands::Start].endpoint(
                |bot: Bot, msg: Message, dialogue: MyDialogue, services: Arc<ServiceContainer>| async move {
                    let telegram_id = msg.chat.id.0;
                    commands::start::StartCommand::execute(bot, msg, telegram_id, Some(dialogue), services).await
                },
            ))
            .branch(case![BotCommands::Watchlist].endpoint(
                |bot: Bot, msg: Message, dialogue: MyDialogue, services: Arc<ServiceContainer>| async move {
                    let telegram_id = msg.chat.id.0;
                    commands::watchlist::WatchlistCommand::execute(bot, msg, telegram_id, Some(dialogue), services).await
                },
            ))
            .branch(case![BotCommands::Add].endpoint(
                |bot: Bot, msg: Message, dialogue: MyDialogue, services: Arc<ServiceContainer>| async move {
                    let telegram_id = msg.chat.id.0;
                    commands::search::AddCommand::execute(bot, msg, telegram_id, Some(dialogue), services).await
                },
            ))
            .branch(case![BotCommands::Trending].endpoint(
                |bot: Bot, msg: Message, dialogue: MyDialogue, services: Arc<ServiceContainer>| async move {
                    let telegram_id = msg.chat.id.0;
                    commands::search::TrendingCommand::execute(bot, msg, telegram_id, Some(dialogue), services).await
                },
            ))
            .branch(case![BotCommands::Refresh].endpoint(
                |bot: Bot, msg: Message, dialogue: MyDialogue, services: Arc<ServiceContainer>| async move {
                    let telegram_id = msg.chat.id.0;
                    commands::watchlist::RefreshCommand::execute(bot, msg, telegram_id, Some(dialogue), services).await
                },
            ))
            .branch(case![BotCommands::Portfolio].endpoint(
                |bot: Bot, msg: Message, dialogue: MyDialogue, services: Arc<ServiceContainer>| async move {
                    let telegram_id = msg.chat.id.0;
                    commands::watchlist::PortfolioCommand::execute(bot, msg, telegram_id, Some(dialogue), services).await
                },
            ))
            .branch(case![BotCommands::Help].endpoint(
                |bot: Bot, msg: Message, dialogue: MyDialogue, services: Arc<ServiceContainer>| async move {
                    let telegram_id = msg.chat.id.0;
                    commands::help::HelpCommand::execute(bot, msg, telegram_id, Some(dialogue), services).await
                },
            ));

        let message_handler = Update::filter_message().branch(command_handler).branch(
            dptree::entry()
                .branch(case![State::AwaitingSearchTerm].endpoint(
                    |bot: Bot, msg: Message, services: Arc<ServiceContainer>| async move {
                        commands::search::receive_search_term(bot, msg, services).await
                    },
                ))
                .branch(case![State::AwaitingHoldings { token_id }].endpoint(
                    |bot: Bot,
                     msg: Message,
                     state: State,
                     dialogue: MyDialogue,
                     services: Arc<ServiceContainer>| async move {
                        commands::watchlist::receive_holdings(bot, msg, state, dialogue, services)
                            .await
                    },
                ))
                .branch(case![State::Start].endpoint(|bot: Bot, msg: Message| async move {
                    bot.send_message(
                        msg.chat.id,
                        "Use /watchlist to see your portfolio or /add to track a token.",
                    )
                    .reply_markup(commands::main_menu_keyboard())
                    .await?;
                    Ok::<(), anyhow::Error>(())
                })),
        );

        // Add callback query handler for our buttons
        let callback_handler = Update::filter_callback_query().endpoint(
            |bot: Bot, q: CallbackQuery, dialogue: MyDialogue, services: Arc<ServiceContainer>| async move {
                handle_callback(bot, q, dialogue, services).await
            },
        );

        owner_gate
            .chain(teloxide::dispatching::dialogue::enter::<Update, InMemStorage<State>, State, _>())
            .branch(message_handler)
            .branch(callback_handler)
    }
}

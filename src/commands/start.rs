use anyhow::Result;
use log::info;
use std::sync::Arc;
use teloxide::{prelude::*, types::ParseMode};

use super::{main_menu_keyboard, reset_dialogue, CommandHandler, MyDialogue};
use crate::di::ServiceContainer;
use crate::utils::format_currency;

pub struct StartCommand;

impl CommandHandler for StartCommand {
    fn command_name() -> &'static str {
        "start"
    }

    fn description() -> &'static str {
        "start the bot and show the main menu"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        telegram_id: i64,
        dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        let chat_id = msg.chat.id;
        info!("Start command received from Telegram ID: {}", telegram_id);

        if let Some(dialogue) = dialogue {
            reset_dialogue(&dialogue, &services).await?;
        }

        let store = services.store();
        let summary = if store.is_empty() {
            "Your watchlist is empty. Add a token to start tracking.".to_string()
        } else {
            format!(
                "Tracking <b>{}</b> tokens, portfolio value <b>{}</b>.",
                store.len(),
                format_currency(store.total_value(), &services.config().vs_currency)
            )
        };

        bot.send_message(
            chat_id,
            format!("<b>Welcome to Crypto Portfolio Bot!</b>\n\n{}", summary),
        )
        .parse_mode(ParseMode::Html)
        .reply_markup(main_menu_keyboard())
        .await?;

        Ok(())
    }
}

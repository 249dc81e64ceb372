use super::{register_commands, CommandHandler, MyDialogue};
use crate::di::ServiceContainer;
use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;

pub struct HelpCommand;

/// Help text listing every registered command
pub fn help_text() -> String {
    let mut text = String::from("Available commands:\n");
    for (name, description) in register_commands() {
        text.push_str(&format!("/{} - {}\n", name, description));
    }
    text.push_str("\nPrices refresh automatically; tap ✏️ next to a token to set your holdings.");
    text
}

impl CommandHandler for HelpCommand {
    fn command_name() -> &'static str {
        "help"
    }

    fn description() -> &'static str {
        "display this help message"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        _telegram_id: i64,
        _dialogue: Option<MyDialogue>,
        _services: Arc<ServiceContainer>,
    ) -> Result<()> {
        bot.send_message(msg.chat.id, help_text()).await?;

        Ok(())
    }
}

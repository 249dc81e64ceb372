use log::{debug, error, info};
use teloxide::{prelude::*, types::ParseMode, Bot};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::entity::PortfolioResult;
use crate::services::SyncStatus;
use crate::utils::escape_html;

/// Message for a sync status transition, if it deserves one
pub fn failure_notice(previous: &SyncStatus, current: &SyncStatus) -> Option<String> {
    match (&previous.last_error, &current.last_error) {
        (None, Some(error)) => Some(format!(
            "⚠️ <b>Price refresh failed</b>\n\nShowing last known prices.\n<i>{}</i>",
            escape_html(error)
        )),
        (Some(_), None) => Some("✅ Price refresh recovered, prices are live again.".to_string()),
        _ => None,
    }
}

async fn send_notice(bot: &Bot, chat_id: ChatId, text: String) -> PortfolioResult<()> {
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Pushes refresh failures (and the recovery after them) to the owner chat
pub fn spawn_sync_notifier(
    bot: Bot,
    chat_id: ChatId,
    mut status: watch::Receiver<SyncStatus>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut previous = status.borrow_and_update().clone();
        info!("Sync failure notifications go to chat {}", chat_id);

        while status.changed().await.is_ok() {
            let current = status.borrow_and_update().clone();
            if let Some(text) = failure_notice(&previous, &current) {
                if let Err(e) = send_notice(&bot, chat_id, text).await {
                    error!("Failed to send sync notification: {}", e);
                }
            }
            previous = current;
        }

        debug!("Sync notifier stopped");
    })
}

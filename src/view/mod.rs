pub mod search_view;
pub mod watchlist_view;

use log::warn;
use teloxide::types::InlineKeyboardButton;

/// Telegram rejects callback data longer than this many bytes.
pub const MAX_CALLBACK_DATA_LEN: usize = 64;

/// Callback button for a token action, or `None` when `{prefix}{id}` would not fit.
pub(crate) fn token_button(text: String, prefix: &str, id: &str) -> Option<InlineKeyboardButton> {
    let data = format!("{}{}", prefix, id);
    if data.len() > MAX_CALLBACK_DATA_LEN {
        warn!("Skipping {} button for {}: callback data too long", prefix, id);
        return None;
    }
    Some(InlineKeyboardButton::callback(text, data))
}

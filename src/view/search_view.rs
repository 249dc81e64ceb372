use anyhow::Result;
use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode},
    Bot,
};

use crate::interactor::search_interactor::SearchHit;
use crate::services::token_search::MIN_SEARCH_TERM_LEN;
use crate::utils::escape_html;
use crate::view::token_button;

// Telegram keyboards get unwieldy beyond this
const MAX_RESULTS: usize = 10;

#[async_trait]
pub trait SearchView: Send + Sync {
    async fn prompt_for_search_term(&self) -> Result<()>;
    async fn display_results(&self, term: &str, hits: Vec<SearchHit>) -> Result<()>;
    async fn display_trending(&self, hits: Vec<SearchHit>) -> Result<()>;
    async fn display_error(&self, error_message: String) -> Result<()>;
}

fn hit_label(hit: &SearchHit) -> String {
    let rank = hit
        .summary
        .market_cap_rank
        .map(|rank| format!(" #{}", rank))
        .unwrap_or_default();
    let marker = if hit.tracked { "✓" } else { "➕" };
    format!(
        "{} {} ({}){}",
        marker,
        hit.summary.name,
        hit.summary.symbol.to_uppercase(),
        rank
    )
}

/// One button per hit; tapping an untracked hit adds it
pub fn results_keyboard(hits: &[SearchHit]) -> InlineKeyboardMarkup {
    let mut keyboard_buttons: Vec<Vec<InlineKeyboardButton>> = hits
        .iter()
        .take(MAX_RESULTS)
        .filter_map(|hit| {
            let button = if hit.tracked {
                InlineKeyboardButton::callback(hit_label(hit), "watchlist")
            } else {
                token_button(hit_label(hit), "add_", &hit.summary.id)?
            };
            Some(vec![button])
        })
        .collect();

    keyboard_buttons.push(vec![
        InlineKeyboardButton::callback("🔍 Search Again", "watchlist_add"),
        InlineKeyboardButton::callback("← Watchlist", "watchlist"),
    ]);

    InlineKeyboardMarkup::new(keyboard_buttons)
}

pub struct TelegramSearchView {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramSearchView {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl SearchView for TelegramSearchView {
    async fn prompt_for_search_term(&self) -> Result<()> {
        let keyboard = InlineKeyboardMarkup::new(vec![vec![
            InlineKeyboardButton::callback("🔥 Trending", "trending"),
            InlineKeyboardButton::callback("Cancel", "watchlist"),
        ]]);

        self.bot
            .send_message(
                self.chat_id,
                format!(
                    "Send the name or symbol of the token you want to track (at least {} characters):",
                    MIN_SEARCH_TERM_LEN
                ),
            )
            .reply_markup(keyboard)
            .await?;

        Ok(())
    }

    async fn display_results(&self, term: &str, hits: Vec<SearchHit>) -> Result<()> {
        if hits.is_empty() {
            let keyboard = InlineKeyboardMarkup::new(vec![vec![
                InlineKeyboardButton::callback("Try Again", "watchlist_add"),
                InlineKeyboardButton::callback("🔥 Trending", "trending"),
            ]]);
            self.bot
                .send_message(
                    self.chat_id,
                    format!("No tokens found for <b>{}</b>", escape_html(term)),
                )
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboard)
                .await?;
            return Ok(());
        }

        self.bot
            .send_message(
                self.chat_id,
                format!(
                    "<b>Results for {}</b>\n\nTap a token to add it to your watchlist:",
                    escape_html(term)
                ),
            )
            .parse_mode(ParseMode::Html)
            .reply_markup(results_keyboard(&hits))
            .await?;

        Ok(())
    }

    async fn display_trending(&self, hits: Vec<SearchHit>) -> Result<()> {
        if hits.is_empty() {
            self.bot
                .send_message(self.chat_id, "No trending tokens right now.")
                .await?;
            return Ok(());
        }

        self.bot
            .send_message(
                self.chat_id,
                "<b>🔥 Trending Tokens</b>\n\nTap a token to add it to your watchlist:",
            )
            .parse_mode(ParseMode::Html)
            .reply_markup(results_keyboard(&hits))
            .await?;

        Ok(())
    }

    async fn display_error(&self, error_message: String) -> Result<()> {
        self.bot
            .send_message(self.chat_id, format!("❌ Error: {}", error_message))
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::TokenSummary;
    use crate::view::MAX_CALLBACK_DATA_LEN;
    use teloxide::types::InlineKeyboardButtonKind;

    fn hit(id: &str, tracked: bool) -> SearchHit {
        SearchHit {
            summary: TokenSummary {
                id: id.to_string(),
                name: id.to_string(),
                symbol: id[..3].to_string(),
                thumbnail_uri: String::new(),
                market_cap_rank: Some(1),
            },
            tracked,
        }
    }

    #[test]
    fn tracked_hits_link_back_to_the_watchlist() {
        let keyboard = results_keyboard(&[hit("bitcoin", true), hit("solana", false)]);

        let data: Vec<String> = keyboard
            .inline_keyboard
            .iter()
            .take(2)
            .map(|row| match &row[0].kind {
                InlineKeyboardButtonKind::CallbackData(data) => data.clone(),
                other => panic!("unexpected button {:?}", other),
            })
            .collect();

        assert_eq!(data, vec!["watchlist", "add_solana"]);
        assert!(keyboard.inline_keyboard[0][0].text.starts_with('✓'));
    }

    #[test]
    fn results_are_capped() {
        let hits: Vec<SearchHit> = (0..15).map(|i| hit(&format!("token{}", i), false)).collect();
        // capped results plus the navigation row
        assert_eq!(results_keyboard(&hits).inline_keyboard.len(), MAX_RESULTS + 1);
    }

    #[test]
    fn hits_with_oversized_ids_get_no_add_button() {
        let long_id = "x".repeat(MAX_CALLBACK_DATA_LEN);
        let keyboard = results_keyboard(&[hit(&long_id, false), hit("solana", false)]);

        assert_eq!(keyboard.inline_keyboard.len(), 2);
        match &keyboard.inline_keyboard[0][0].kind {
            InlineKeyboardButtonKind::CallbackData(data) => assert_eq!(data, "add_solana"),
            other => panic!("unexpected button {:?}", other),
        }
    }
}

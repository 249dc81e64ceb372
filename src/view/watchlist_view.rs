use anyhow::Result;
use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode},
    Bot,
};

use crate::entity::TokenRecord;
use crate::services::{SyncOutcome, SyncStatus};
use crate::store::WatchlistState;
use crate::utils::{
    escape_html, format_currency, format_holdings, format_percent, render_share_bar,
    render_sparkline,
};
use crate::view::token_button;

const SPARKLINE_WIDTH: usize = 16;
const SHARE_BAR_WIDTH: usize = 12;

#[async_trait]
pub trait WatchlistView: Send + Sync {
    async fn display_watchlist(&self, state: WatchlistState, status: SyncStatus) -> Result<()>;
    async fn display_empty_watchlist(&self) -> Result<()>;
    async fn display_distribution(&self, state: WatchlistState) -> Result<()>;
    async fn display_token_added(&self, record: TokenRecord) -> Result<()>;
    async fn display_token_removed(&self, token_symbol: &str) -> Result<()>;
    async fn prompt_for_holdings(&self, record: TokenRecord) -> Result<()>;
    async fn display_holdings_saved(&self, record: TokenRecord, state: WatchlistState)
        -> Result<()>;
    async fn display_refresh_result(&self, outcome: SyncOutcome) -> Result<()>;
    async fn display_error(&self, error_message: String) -> Result<()>;
}

/// HTML body of the watchlist message
pub fn render_watchlist(state: &WatchlistState, status: &SyncStatus, currency: &str) -> String {
    let mut text = String::from("<b>Your Watchlist</b>\n");

    for record in state.records() {
        text.push_str(&format!(
            "\n<b>{}</b> {}\n{} ({})\n",
            escape_html(&record.display_symbol()),
            escape_html(&record.name),
            format_currency(record.current_price, currency),
            format_percent(record.price_change_percentage_24h),
        ));

        let sparkline = render_sparkline(&record.sparkline, SPARKLINE_WIDTH);
        if !sparkline.is_empty() {
            text.push_str(&format!("<code>{}</code>\n", sparkline));
        }

        if record.is_editing_holdings {
            text.push_str("✏️ <i>editing holdings…</i>\n");
        } else {
            text.push_str(&format!(
                "Holdings: {} · Value: {}\n",
                format_holdings(record.holdings),
                format_currency(state.value_of(record), currency),
            ));
        }
    }

    text.push_str(&format!(
        "\n💰 <b>Total: {}</b>",
        format_currency(state.total_value(), currency)
    ));

    if status.is_syncing {
        text.push_str("\n🔄 Refreshing prices…");
    } else if let Some(error) = &status.last_error {
        text.push_str(&format!(
            "\n⚠️ Showing last known prices ({})",
            escape_html(error)
        ));
    } else if let Some(updated) = state.last_updated() {
        text.push_str(&format!(
            "\n<i>Updated {}</i>",
            updated.format("%Y-%m-%d %H:%M UTC")
        ));
    }

    text
}

/// HTML body of the distribution chart, largest position first
pub fn render_distribution(state: &WatchlistState, currency: &str) -> String {
    let allocations = state.allocations();
    if allocations.is_empty() {
        return "<b>Portfolio Distribution</b>\n\nNo holdings yet. Set holdings on a token to see its share.".to_string();
    }

    let mut text = String::from("<b>Portfolio Distribution</b>\n\n");
    for allocation in allocations {
        text.push_str(&format!(
            "<code>{:<6} {} {:>7}</code>\n{}\n",
            escape_html(&allocation.symbol),
            render_share_bar(allocation.percentage, SHARE_BAR_WIDTH),
            format!("{:.2}%", allocation.percentage.round_dp(2)),
            format_currency(allocation.value, currency),
        ));
    }
    text.push_str(&format!(
        "\n💰 <b>Total: {}</b>",
        format_currency(state.total_value(), currency)
    ));

    text
}

fn watchlist_keyboard(state: &WatchlistState) -> InlineKeyboardMarkup {
    let mut keyboard_buttons = vec![];

    for record in state.records() {
        let symbol = record.display_symbol();
        let edit_button = if record.is_editing_holdings {
            token_button(format!("✖️ Cancel {}", symbol), "cancel_edit_", &record.id)
        } else {
            token_button(format!("✏️ {}", symbol), "edit_", &record.id)
        };
        let remove_button = token_button(format!("🗑️ {}", symbol), "remove_", &record.id);
        let row: Vec<InlineKeyboardButton> =
            edit_button.into_iter().chain(remove_button).collect();
        if !row.is_empty() {
            keyboard_buttons.push(row);
        }
    }

    keyboard_buttons.push(vec![
        InlineKeyboardButton::callback("➕ Add Token", "watchlist_add"),
        InlineKeyboardButton::callback("🔄 Refresh", "watchlist_refresh"),
    ]);
    keyboard_buttons.push(vec![InlineKeyboardButton::callback(
        "📊 Distribution",
        "portfolio",
    )]);

    InlineKeyboardMarkup::new(keyboard_buttons)
}

pub struct TelegramWatchlistView {
    bot: Bot,
    chat_id: ChatId,
    currency: String,
}

impl TelegramWatchlistView {
    pub fn new(bot: Bot, chat_id: ChatId, currency: impl Into<String>) -> Self {
        Self {
            bot,
            chat_id,
            currency: currency.into(),
        }
    }
}

#[async_trait]
impl WatchlistView for TelegramWatchlistView {
    async fn display_watchlist(&self, state: WatchlistState, status: SyncStatus) -> Result<()> {
        if state.is_empty() {
            return self.display_empty_watchlist().await;
        }

        self.bot
            .send_message(self.chat_id, render_watchlist(&state, &status, &self.currency))
            .parse_mode(ParseMode::Html)
            .reply_markup(watchlist_keyboard(&state))
            .await?;

        Ok(())
    }

    async fn display_empty_watchlist(&self) -> Result<()> {
        let keyboard = InlineKeyboardMarkup::new(vec![
            vec![InlineKeyboardButton::callback(
                "➕ Add First Token",
                "watchlist_add",
            )],
            vec![InlineKeyboardButton::callback("🔥 Trending", "trending")],
        ]);

        self.bot
            .send_message(
                self.chat_id,
                "Your watchlist is empty. Add tokens to track their prices!",
            )
            .reply_markup(keyboard)
            .await?;

        Ok(())
    }

    async fn display_distribution(&self, state: WatchlistState) -> Result<()> {
        let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
            "← Back to Watchlist",
            "watchlist",
        )]]);

        self.bot
            .send_message(self.chat_id, render_distribution(&state, &self.currency))
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .await?;

        Ok(())
    }

    async fn display_token_added(&self, record: TokenRecord) -> Result<()> {
        let keyboard = InlineKeyboardMarkup::new(vec![vec![
            InlineKeyboardButton::callback("View Watchlist", "watchlist"),
            InlineKeyboardButton::callback("Add Another", "watchlist_add"),
        ]]);

        self.bot
            .send_message(
                self.chat_id,
                format!(
                    "✅ Added <b>{}</b> ({}) to your watchlist\nFetching its price…",
                    escape_html(&record.name),
                    escape_html(&record.display_symbol())
                ),
            )
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .await?;

        Ok(())
    }

    async fn display_token_removed(&self, token_symbol: &str) -> Result<()> {
        let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
            "Back to Watchlist",
            "watchlist",
        )]]);

        self.bot
            .send_message(
                self.chat_id,
                format!("✅ Removed {} from your watchlist", token_symbol),
            )
            .reply_markup(keyboard)
            .await?;

        Ok(())
    }

    async fn prompt_for_holdings(&self, record: TokenRecord) -> Result<()> {
        let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
            "✖️ Cancel",
            format!("cancel_edit_{}", record.id),
        )]]);

        self.bot
            .send_message(
                self.chat_id,
                format!(
                    "How much <b>{}</b> do you hold?\nCurrent holdings: {}\n\nSend a number, e.g. <code>1,250.5</code>",
                    escape_html(&record.display_symbol()),
                    format_holdings(record.holdings)
                ),
            )
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .await?;

        Ok(())
    }

    async fn display_holdings_saved(
        &self,
        record: TokenRecord,
        state: WatchlistState,
    ) -> Result<()> {
        let keyboard = InlineKeyboardMarkup::new(vec![vec![
            InlineKeyboardButton::callback("View Watchlist", "watchlist"),
            InlineKeyboardButton::callback("📊 Distribution", "portfolio"),
        ]]);

        self.bot
            .send_message(
                self.chat_id,
                format!(
                    "✅ Holdings of <b>{}</b> set to {}\nValue: {} ({:.2}% of {})",
                    escape_html(&record.display_symbol()),
                    format_holdings(record.holdings),
                    format_currency(state.value_of(&record), &self.currency),
                    state.percentage_of_total(&record).round_dp(2),
                    format_currency(state.total_value(), &self.currency),
                ),
            )
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .await?;

        Ok(())
    }

    async fn display_refresh_result(&self, outcome: SyncOutcome) -> Result<()> {
        let text = match outcome {
            SyncOutcome::Failed(message) => format!(
                "⚠️ Could not refresh prices, showing last known prices.\n{}",
                message
            ),
            SyncOutcome::Coalesced => "🔄 A refresh is already running.".to_string(),
            _ => return Ok(()),
        };

        self.bot.send_message(self.chat_id, text).await?;

        Ok(())
    }

    async fn display_error(&self, error_message: String) -> Result<()> {
        self.bot
            .send_message(self.chat_id, format!("❌ Error: {}", error_message))
            .await?;

        Ok(())
    }
}

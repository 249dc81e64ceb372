mod market;
mod portfolio_error;
mod state;
mod token_record;

pub use market::{PriceQuote, TokenSummary};
pub use portfolio_error::{PortfolioError, PortfolioResult};
pub use state::State;
pub use token_record::TokenRecord;

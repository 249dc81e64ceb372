use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::{Client, RequestBuilder, Response};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

use crate::entity::{PortfolioError, PortfolioResult, PriceQuote, TokenSummary};
use crate::market::models::{ApiErrorResponse, SearchResponse, TrendingResponse};
use crate::market::{MarketConfig, MarketDataProvider};

/// Price-data provider backed by the public CoinGecko API
pub struct CoinGeckoClient {
    http_client: Client,
    config: MarketConfig,
}

impl CoinGeckoClient {
    pub fn new(config: MarketConfig) -> PortfolioResult<Self> {
        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.api_url.trim_end_matches('/'), path);
        let request = self.http_client.get(url).header("accept", "application/json");
        match &self.config.api_key {
            Some(key) => request.header("x-cg-demo-api-key", key),
            None => request,
        }
    }

    async fn send_json<T>(&self, request: RequestBuilder, operation: &str) -> PortfolioResult<T>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await.map_err(|e| {
            error!("CoinGecko request [{}] failed: {}", operation, e);
            PortfolioError::Http(e)
        })?;

        let response = Self::check_status(response, operation).await?;

        response.json::<T>().await.map_err(|e| {
            error!("Failed to parse CoinGecko response [{}]: {}", operation, e);
            PortfolioError::Parse(e.to_string())
        })
    }

    async fn check_status(response: Response, operation: &str) -> PortfolioResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = serde_json::from_str::<ApiErrorResponse>(&body)
            .ok()
            .and_then(|e| e.message())
            .unwrap_or(body);

        error!("CoinGecko API error [{}]: {} {}", operation, status, message);
        Err(PortfolioError::MarketApi(format!("{}: {}", status, message)))
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoClient {
    async fn fetch_prices(&self, ids: &[String]) -> PortfolioResult<HashMap<String, PriceQuote>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let request = self.get("/simple/price").query(&[
            ("ids", ids.join(",")),
            ("vs_currencies", self.config.vs_currency.clone()),
            ("include_24hr_change", "true".to_string()),
            ("include_sparkline", "true".to_string()),
        ]);

        let body: Value = self.send_json(request, "simple/price").await?;
        let quotes = parse_simple_prices(body, &self.config.vs_currency)?;

        info!("Fetched {} of {} requested prices", quotes.len(), ids.len());
        Ok(quotes)
    }

    async fn search_tokens(&self, term: &str) -> PortfolioResult<Vec<TokenSummary>> {
        let request = self.get("/search").query(&[("query", term)]);
        let response: SearchResponse = self.send_json(request, "search").await?;

        debug!("Search {:?} returned {} coins", term, response.coins.len());
        Ok(response.coins.into_iter().map(TokenSummary::from).collect())
    }

    async fn fetch_trending(&self) -> PortfolioResult<Vec<TokenSummary>> {
        let request = self.get("/search/trending");
        let response: TrendingResponse = self.send_json(request, "search/trending").await?;

        Ok(response
            .coins
            .into_iter()
            .map(|coin| TokenSummary::from(coin.item))
            .collect())
    }
}

/// Parses a `/simple/price` body:
/// `{ "<id>": { "<vs>": 1.0, "<vs>_24h_change": -0.5, "sparkline_7d": [..] } }`.
///
/// Entries without a usable price are skipped rather than reported as zero.
pub fn parse_simple_prices(
    body: Value,
    vs_currency: &str,
) -> PortfolioResult<HashMap<String, PriceQuote>> {
    let Value::Object(entries) = body else {
        return Err(PortfolioError::Parse(
            "expected an object keyed by token id".to_string(),
        ));
    };

    let vs = vs_currency.to_lowercase();
    let change_key = format!("{}_24h_change", vs);
    let mut quotes = HashMap::with_capacity(entries.len());

    for (id, entry) in entries {
        let Some(fields) = entry.as_object() else {
            debug!("Skipping malformed price entry for {}", id);
            continue;
        };

        let Some(price) = fields
            .get(&vs)
            .and_then(Value::as_f64)
            .and_then(Decimal::from_f64)
        else {
            debug!("No {} price for {}", vs, id);
            continue;
        };

        let change = fields
            .get(&change_key)
            .and_then(Value::as_f64)
            .and_then(Decimal::from_f64)
            .unwrap_or(Decimal::ZERO);

        let sparkline = fields
            .get("sparkline_7d")
            .or_else(|| fields.get("sparkline_in_7d"))
            .and_then(parse_sparkline);

        quotes.insert(
            id,
            PriceQuote {
                price,
                change_24h_percent: change,
                sparkline,
            },
        );
    }

    Ok(quotes)
}

// Accepts either a bare array or the `{ "price": [...] }` shape
fn parse_sparkline(value: &Value) -> Option<Vec<f64>> {
    let samples = match value {
        Value::Array(samples) => samples,
        Value::Object(map) => map.get("price")?.as_array()?,
        _ => return None,
    };
    Some(samples.iter().filter_map(Value::as_f64).collect())
}

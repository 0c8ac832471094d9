use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;

use super::traits::QuoteProvider;
use crate::errors::CoreError;
use crate::models::quote::{Quote, Suggestion};
use crate::models::settings::Settings;

const PROVIDER_NAME: &str = "Yahoo Finance";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) panel-portfolio";

/// Yahoo Finance quote provider.
///
/// - **Free**: No API key required.
/// - **Quote**: `GET /v8/finance/chart/{symbol}?interval=1d`, read from
///   `chart.result[0].meta`.
/// - **Search**: `GET /v1/finance/search`, equities only.
///
/// Talks to the public JSON endpoints directly so the host can be pointed at
/// a mirror (or a local mock server in tests).
pub struct YahooFinanceProvider {
    client: Client,
    base_url: String,
    suggestion_limit: usize,
}

impl YahooFinanceProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            suggestion_limit: 5,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.finance_host.clone(),
            Duration::from_secs(settings.request_timeout_secs),
        )
        .with_suggestion_limit(settings.suggestion_limit)
    }

    pub fn with_suggestion_limit(mut self, limit: usize) -> Self {
        self.suggestion_limit = limit;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, CoreError> {
        Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| CoreError::Request(format!("Invalid URL for {path}: {e}")))
    }

    async fn fetch_chart(&self, url: Url, symbol: &str) -> Option<Quote> {
        let response = match self.client.get(url).query(&[("interval", "1d")]).send().await {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Quote request for {symbol} failed: {}", CoreError::from(e));
                return None;
            }
        };
        if response.status() != StatusCode::OK {
            log::warn!("Quote request for {symbol} returned {}", response.status());
            return None;
        }
        let body: ChartResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                log::warn!("Could not parse quote for {symbol}: {e}");
                return None;
            }
        };

        let meta = body
            .chart
            .and_then(|c| c.result)
            .and_then(|r| r.into_iter().next())
            .and_then(|r| r.meta)?;
        let price = meta.regular_market_price.filter(|p| p.is_finite() && *p > 0.0)?;
        let resolved = meta.symbol.unwrap_or_else(|| symbol.to_string());
        let name = meta.short_name.unwrap_or_else(|| resolved.clone());
        Some(Quote {
            symbol: resolved,
            price,
            name,
        })
    }

    async fn fetch_suggestions(&self, url: Url, query: &str) -> Result<Vec<Suggestion>, CoreError> {
        let count = self.suggestion_limit.to_string();
        let response = self
            .client
            .get(url)
            .query(&[
                ("q", query),
                ("lang", "en-US"),
                ("region", "US"),
                ("quotesCount", count.as_str()),
            ])
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            return Err(CoreError::Api {
                provider: PROVIDER_NAME.into(),
                message: format!("search returned {}", response.status()),
            });
        }
        let body: SearchResponse = response.json().await?;

        Ok(body
            .quotes
            .unwrap_or_default()
            .into_iter()
            .filter(|q| q.quote_type.as_deref() == Some("EQUITY"))
            .filter_map(|q| {
                let symbol = q.symbol?;
                let name = q
                    .shortname
                    .or(q.longname)
                    .unwrap_or_else(|| symbol.clone());
                Some(Suggestion {
                    symbol,
                    name,
                    exchange: q.exchange.unwrap_or_default(),
                    quote_type: "EQUITY".to_string(),
                })
            })
            .take(self.suggestion_limit)
            .collect())
    }
}

// ── Yahoo Finance response types ────────────────────────────────────

#[derive(Deserialize)]
struct ChartResponse {
    chart: Option<ChartBody>,
}

#[derive(Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
}

#[derive(Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: Option<String>,
    regular_market_price: Option<f64>,
    short_name: Option<String>,
}

#[derive(Deserialize)]
struct SearchResponse {
    quotes: Option<Vec<SearchQuote>>,
}

#[derive(Deserialize)]
struct SearchQuote {
    symbol: Option<String>,
    shortname: Option<String>,
    longname: Option<String>,
    exchange: Option<String>,
    #[serde(rename = "quoteType")]
    quote_type: Option<String>,
}

#[async_trait]
impl QuoteProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn quote(&self, symbol: &str) -> Result<Option<Quote>, CoreError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Ok(None);
        }
        let url = self.endpoint(&format!(
            "/v8/finance/chart/{}",
            urlencoding::encode(&symbol)
        ))?;
        log::debug!("Fetching quote for {symbol}");
        Ok(self.fetch_chart(url, &symbol).await)
    }

    async fn suggest(&self, query: &str) -> Vec<Suggestion> {
        let query = query.trim();
        if query.is_empty() || self.suggestion_limit == 0 {
            return Vec::new();
        }
        let url = match self.endpoint("/v1/finance/search") {
            Ok(u) => u,
            Err(e) => {
                log::warn!("{e}");
                return Vec::new();
            }
        };
        log::debug!("Searching suggestions for '{query}'");
        match self.fetch_suggestions(url, query).await {
            Ok(list) => list,
            Err(e) => {
                log::warn!("Suggestion lookup for '{query}' failed: {e}");
                Vec::new()
            }
        }
    }
}

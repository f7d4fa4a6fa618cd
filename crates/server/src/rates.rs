//! Exchange-rate source and the `/rates` endpoint.
//!
//! Rates are fetched from a public JSON feed, kept for a configurable TTL and
//! replaced by a static table whenever the feed cannot be used.

use std::time::{Duration, Instant};

use api_types::rates::RatesView;
use axum::{Json, extract::State};
use chrono::Utc;
use engine::{Currency, ExchangeRates, RateTable, time_ago};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::{server::ServerState, views};

pub const DEFAULT_RATES_URL: &str = "https://open.er-api.com/v6/latest/THB";
pub const DEFAULT_RATES_TTL: Duration = Duration::from_secs(3600);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum RateError {
    #[error("rate request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rate feed returned no rates")]
    MissingRates,
}

#[derive(Debug, Deserialize)]
struct RateFeed {
    rates: Option<RateTable>,
    time_last_update_unix: Option<i64>,
}

#[derive(Debug)]
struct Cached {
    rates: ExchangeRates,
    fetched_at: Instant,
}

#[derive(Debug)]
pub struct RateSource {
    http: reqwest::Client,
    url: Option<String>,
    ttl: Duration,
    cache: RwLock<Option<Cached>>,
}

impl RateSource {
    pub fn new(url: impl Into<String>, ttl: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            url: Some(url.into()),
            ttl,
            cache: RwLock::new(None),
        }
    }

    /// A source that never goes to the network and always serves the static table.
    pub fn offline() -> Self {
        Self {
            http: reqwest::Client::new(),
            url: None,
            ttl: DEFAULT_RATES_TTL,
            cache: RwLock::new(None),
        }
    }

    /// Current rate table, refreshed when the cached one is older than the TTL.
    pub async fn current(&self) -> ExchangeRates {
        if let Some(cached) = self.cache.read().await.as_ref()
            && cached.fetched_at.elapsed() < self.ttl
        {
            return cached.rates.clone();
        }

        let mut cache = self.cache.write().await;
        if let Some(cached) = cache.as_ref()
            && cached.fetched_at.elapsed() < self.ttl
        {
            return cached.rates.clone();
        }

        let rates = match self.fetch().await {
            Ok(rates) => rates,
            Err(err) => {
                tracing::warn!("using fallback exchange rates: {err}");
                ExchangeRates::fallback(Utc::now().timestamp())
            }
        };
        *cache = Some(Cached {
            rates: rates.clone(),
            fetched_at: Instant::now(),
        });
        rates
    }

    async fn fetch(&self) -> Result<ExchangeRates, RateError> {
        let Some(url) = self.url.as_deref() else {
            return Err(RateError::MissingRates);
        };

        let feed = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<RateFeed>()
            .await?;
        parse_feed(feed, Utc::now().timestamp())
    }
}

fn parse_feed(feed: RateFeed, now_unix: i64) -> Result<ExchangeRates, RateError> {
    let rates = feed
        .rates
        .filter(|rates| !rates.is_empty())
        .ok_or(RateError::MissingRates)?;
    Ok(ExchangeRates {
        rates,
        updated_at: feed.time_last_update_unix.unwrap_or(now_unix),
    })
}

/// Handle requests for the current exchange-rate table
pub async fn get(State(state): State<ServerState>) -> Json<RatesView> {
    let rates = state.rates.current().await;
    let now = Utc::now().timestamp();

    Json(RatesView {
        base: views::map_currency(Currency::BASE),
        updated_ago: time_ago(rates.updated_at, now),
        rates: rates.rates,
        updated_at: rates.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_without_rates_is_rejected() {
        let feed: RateFeed = serde_json::from_str(r#"{"result":"error"}"#).unwrap();
        assert!(matches!(parse_feed(feed, 10), Err(RateError::MissingRates)));
    }

    #[test]
    fn feed_timestamp_is_kept() {
        let feed: RateFeed = serde_json::from_str(
            r#"{"result":"success","time_last_update_unix":1700000000,"rates":{"THB":1,"USD":0.028}}"#,
        )
        .unwrap();
        let rates = parse_feed(feed, 10).unwrap();
        assert_eq!(rates.updated_at, 1_700_000_000);
        assert_eq!(rates.rates.get("USD"), Some(&0.028));
    }

    #[tokio::test]
    async fn offline_source_serves_the_static_table() {
        let source = RateSource::offline();
        let rates = source.current().await;
        assert_eq!(rates.rates.get("USD"), Some(&0.029));
        assert_eq!(rates.rates.get("JPY"), Some(&4.3));
    }
}

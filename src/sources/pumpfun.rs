// src/sources/pumpfun.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{get_json, search_each_term, TokenSource};
use crate::error::SourceError;
use crate::matcher::{dedupe_by_liquidity, Candidate, SearchTerms};
use crate::models::{format_supply, Socials, Token};

pub const PUMPFUN_SEARCH_URL: &str = "https://frontend-api-v3.pump.fun/coins/search";

/// Every pump.fun mint uses 6 decimals
const PUMPFUN_DECIMALS: u8 = 6;
const PAGE_LIMIT: &str = "50";

#[derive(Debug, Deserialize)]
pub struct Coin {
    pub mint: String,
    pub name: String,
    pub symbol: String,
    pub total_supply: Option<f64>,
    pub usd_market_cap: Option<f64>,
    pub created_timestamp: Option<i64>,
    pub virtual_sol_reserves: Option<f64>,
    pub twitter: Option<String>,
    pub telegram: Option<String>,
    pub website: Option<String>,
}

pub struct PumpFunSource {
    client: Client,
    terms: SearchTerms,
    term_delay: Duration,
}

impl PumpFunSource {
    pub fn new(client: Client, terms: SearchTerms, term_delay: Duration) -> Self {
        Self {
            client,
            terms,
            term_delay,
        }
    }

    async fn search(&self, term: String) -> Result<Vec<Coin>, SourceError> {
        debug!("Pump.fun search → {}?searchTerm={}", PUMPFUN_SEARCH_URL, term);
        let request = self.client.get(PUMPFUN_SEARCH_URL).query(&[
            ("searchTerm", term.as_str()),
            ("offset", "0"),
            ("limit", PAGE_LIMIT),
            ("sort", "market_cap"),
            ("order", "DESC"),
            ("includeNsfw", "false"),
        ]);
        get_json(self.name(), request).await
    }
}

#[async_trait]
impl TokenSource for PumpFunSource {
    fn name(&self) -> &'static str {
        "pumpfun"
    }

    async fn fetch_tokens(&self) -> Result<Vec<Token>, SourceError> {
        let coins = search_each_term(self.name(), &self.terms, self.term_delay, |term| {
            self.search(term)
        })
        .await?;
        Ok(normalize(coins))
    }
}

pub fn normalize(coins: Vec<Coin>) -> Vec<Token> {
    let candidates = coins
        .into_iter()
        .map(|coin| {
            let liquidity = coin.virtual_sol_reserves;
            Candidate::new(coin_to_token(coin), liquidity)
        })
        .collect();

    dedupe_by_liquidity(candidates)
}

fn coin_to_token(coin: Coin) -> Token {
    let mut token = Token::new(coin.name, coin.symbol, coin.mint);
    token.decimals = Some(PUMPFUN_DECIMALS);
    token.supply = coin
        .total_supply
        .and_then(|raw| format_supply(raw / 10f64.powi(PUMPFUN_DECIMALS as i32)));
    token.market_cap = coin.usd_market_cap;
    token.created_at = coin.created_timestamp;
    token.socials = Socials {
        twitter: non_blank(coin.twitter),
        telegram: non_blank(coin.telegram),
        discord: None,
        website: non_blank(coin.website),
    }
    .non_empty();
    token
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coins() -> Vec<Coin> {
        serde_json::from_value(json!([
            {
                "mint": "PumpMint402pump",
                "name": "x402 Meme",
                "symbol": "X402",
                "description": "ignored",
                "total_supply": 1000000000000000u64,
                "usd_market_cap": 5321.77,
                "created_timestamp": 1730001234567i64,
                "virtual_sol_reserves": 31000000000u64,
                "twitter": "https://x.com/x402meme",
                "telegram": "",
                "website": null,
                "complete": false
            },
            {
                "mint": "pumpmint402PUMP",
                "name": "x402 Meme (dup)",
                "symbol": "X402",
                "virtual_sol_reserves": 1000u64
            }
        ]))
        .unwrap()
    }

    #[test]
    fn maps_coin_fields() {
        let tokens = normalize(coins());
        assert_eq!(tokens.len(), 1);

        let token = &tokens[0];
        assert_eq!(token.name, "x402 Meme");
        assert_eq!(token.decimals, Some(6));
        assert_eq!(token.supply.as_deref(), Some("1,000,000,000"));
        assert_eq!(token.market_cap, Some(5321.77));
        assert_eq!(token.created_at, Some(1730001234567));

        let socials = token.socials.as_ref().unwrap();
        assert_eq!(socials.twitter.as_deref(), Some("https://x.com/x402meme"));
        assert!(socials.telegram.is_none());
        assert!(socials.website.is_none());
    }

    #[test]
    fn coin_without_links_has_no_socials() {
        let mut list = coins();
        let bare = list.pop().unwrap();
        let tokens = normalize(vec![bare]);
        assert!(tokens[0].socials.is_none());
        assert!(tokens[0].supply.is_none());
    }
}

// src/sources/jupiter.rs
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{get_json, search_each_term, TokenSource};
use crate::error::SourceError;
use crate::matcher::{dedupe_by_liquidity, Candidate, SearchTerms};
use crate::models::{format_supply, Socials, Token};

pub const JUPITER_SEARCH_URL: &str = "https://lite-api.jup.ag/tokens/v2/search";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JupiterToken {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub decimals: Option<u8>,
    pub total_supply: Option<f64>,
    pub mcap: Option<f64>,
    pub liquidity: Option<f64>,
    pub created_at: Option<String>, // RFC 3339
    pub twitter: Option<String>,
    pub telegram: Option<String>,
    pub website: Option<String>,
}

pub struct JupiterSource {
    client: Client,
    terms: SearchTerms,
    term_delay: Duration,
}

impl JupiterSource {
    pub fn new(client: Client, terms: SearchTerms, term_delay: Duration) -> Self {
        Self {
            client,
            terms,
            term_delay,
        }
    }

    async fn search(&self, term: String) -> Result<Vec<JupiterToken>, SourceError> {
        debug!("Jupiter search → {}?query={}", JUPITER_SEARCH_URL, term);
        let request = self
            .client
            .get(JUPITER_SEARCH_URL)
            .query(&[("query", term.as_str())]);
        get_json(self.name(), request).await
    }
}

#[async_trait]
impl TokenSource for JupiterSource {
    fn name(&self) -> &'static str {
        "jupiter"
    }

    async fn fetch_tokens(&self) -> Result<Vec<Token>, SourceError> {
        let found = search_each_term(self.name(), &self.terms, self.term_delay, |term| {
            self.search(term)
        })
        .await?;
        Ok(normalize(found))
    }
}

pub fn normalize(found: Vec<JupiterToken>) -> Vec<Token> {
    let candidates = found
        .into_iter()
        .map(|t| {
            let liquidity = t.liquidity;
            Candidate::new(to_token(t), liquidity)
        })
        .collect();

    dedupe_by_liquidity(candidates)
}

fn to_token(t: JupiterToken) -> Token {
    let mut token = Token::new(t.name, t.symbol, t.id);
    token.decimals = t.decimals;
    token.supply = t.total_supply.and_then(format_supply);
    token.market_cap = t.mcap;
    token.created_at = t
        .created_at
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.timestamp_millis());
    token.socials = Socials {
        twitter: t.twitter,
        telegram: t.telegram,
        discord: None,
        website: t.website,
    }
    .non_empty();
    token
}

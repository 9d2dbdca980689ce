// src/sources/birdeye.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{get_json, TokenSource};
use crate::error::SourceError;
use crate::matcher::{dedupe_by_liquidity, Candidate};
use crate::models::Token;

pub const BIRDEYE_TOKENLIST_URL: &str = "https://public-api.birdeye.so/defi/tokenlist";

#[derive(Serialize, Debug)]
pub struct TokenListQuery {
    pub sort_by: &'static str,
    pub sort_type: &'static str,
    pub offset: u32,
    pub limit: u32,
}

impl Default for TokenListQuery {
    fn default() -> Self {
        Self {
            sort_by: "v24hUSD",
            sort_type: "desc",
            offset: 0,
            limit: 50,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct TokenListResponse {
    pub success: bool,
    pub data: Option<TokenListData>,
}

#[derive(Debug, Deserialize, Default)]
pub struct TokenListData {
    #[serde(default)]
    pub tokens: Vec<BirdeyeToken>,
}

#[derive(Debug, Deserialize)]
pub struct BirdeyeToken {
    pub address: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    pub decimals: Option<u8>,
    pub mc: Option<f64>,
    pub liquidity: Option<f64>,
}

/// Keyed token list; a single request, the matcher does the filtering
pub struct BirdeyeSource {
    client: Client,
    api_key: String,
}

impl BirdeyeSource {
    pub fn new(client: Client, api_key: String) -> Self {
        Self { client, api_key }
    }
}

#[async_trait]
impl TokenSource for BirdeyeSource {
    fn name(&self) -> &'static str {
        "birdeye"
    }

    async fn fetch_tokens(&self) -> Result<Vec<Token>, SourceError> {
        let query = TokenListQuery::default();
        debug!("Birdeye token list → {} {:?}", BIRDEYE_TOKENLIST_URL, query);

        let request = self
            .client
            .get(BIRDEYE_TOKENLIST_URL)
            .header("X-API-KEY", &self.api_key)
            .header("x-chain", "solana")
            .query(&query);
        let resp: TokenListResponse = get_json(self.name(), request).await?;

        normalize(resp)
    }
}

pub fn normalize(resp: TokenListResponse) -> Result<Vec<Token>, SourceError> {
    if !resp.success {
        return Err(SourceError::Api("birdeye reported success=false".to_string()));
    }

    let candidates = resp
        .data
        .unwrap_or_default()
        .tokens
        .into_iter()
        .map(|t| {
            let mut token = Token::new(
                t.name.unwrap_or_default(),
                t.symbol.unwrap_or_default(),
                t.address,
            );
            token.decimals = t.decimals;
            token.market_cap = t.mc;
            Candidate::new(token, t.liquidity)
        })
        .collect();

    Ok(dedupe_by_liquidity(candidates))
}

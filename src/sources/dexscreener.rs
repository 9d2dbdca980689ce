// src/sources/dexscreener.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{get_json, search_each_term, TokenSource};
use crate::error::SourceError;
use crate::matcher::{dedupe_by_liquidity, Candidate, SearchTerms};
use crate::models::{Socials, Token};

pub const DEXSCREENER_SEARCH_URL: &str = "https://api.dexscreener.com/latest/dex/search";
const SOLANA_CHAIN_ID: &str = "solana";

#[derive(Debug, Deserialize, Default)]
pub struct SearchResponse {
    #[serde(default)]
    pub pairs: Option<Vec<Pair>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pair {
    pub chain_id: String,
    pub base_token: PairToken,
    pub liquidity: Option<Liquidity>,
    pub fdv: Option<f64>,
    pub market_cap: Option<f64>,
    pub pair_created_at: Option<i64>,
    pub info: Option<PairInfo>,
}

#[derive(Debug, Deserialize)]
pub struct PairToken {
    pub address: String,
    pub name: String,
    pub symbol: String,
}

#[derive(Debug, Deserialize)]
pub struct Liquidity {
    pub usd: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PairInfo {
    #[serde(default)]
    pub websites: Vec<Website>,
    #[serde(default)]
    pub socials: Vec<Social>,
}

#[derive(Debug, Deserialize)]
pub struct Website {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct Social {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

/// Pair search, one query per search term
pub struct DexScreenerSource {
    client: Client,
    terms: SearchTerms,
    term_delay: Duration,
}

impl DexScreenerSource {
    pub fn new(client: Client, terms: SearchTerms, term_delay: Duration) -> Self {
        Self {
            client,
            terms,
            term_delay,
        }
    }

    async fn search(&self, term: String) -> Result<Vec<Pair>, SourceError> {
        debug!("DexScreener search → {}?q={}", DEXSCREENER_SEARCH_URL, term);
        let request = self
            .client
            .get(DEXSCREENER_SEARCH_URL)
            .query(&[("q", term.as_str())]);
        let resp: SearchResponse = get_json(self.name(), request).await?;
        Ok(resp.pairs.unwrap_or_default())
    }
}

#[async_trait]
impl TokenSource for DexScreenerSource {
    fn name(&self) -> &'static str {
        "dexscreener"
    }

    async fn fetch_tokens(&self) -> Result<Vec<Token>, SourceError> {
        let pairs = search_each_term(self.name(), &self.terms, self.term_delay, |term| {
            self.search(term)
        })
        .await?;
        Ok(normalize(pairs))
    }
}

/// Solana pairs only; one token per base mint, most liquid pair wins
pub fn normalize(pairs: Vec<Pair>) -> Vec<Token> {
    let candidates = pairs
        .into_iter()
        .filter(|p| p.chain_id.eq_ignore_ascii_case(SOLANA_CHAIN_ID))
        .map(|pair| {
            let liquidity = pair.liquidity.as_ref().and_then(|l| l.usd);
            Candidate::new(pair_to_token(pair), liquidity)
        })
        .collect();

    dedupe_by_liquidity(candidates)
}

fn pair_to_token(pair: Pair) -> Token {
    let mut token = Token::new(pair.base_token.name, pair.base_token.symbol, pair.base_token.address);
    token.market_cap = pair.market_cap.or(pair.fdv);
    token.created_at = pair.pair_created_at;
    token.socials = pair.info.map(info_to_socials).and_then(Socials::non_empty);
    token
}

fn info_to_socials(info: PairInfo) -> Socials {
    let mut socials = Socials::default();
    for social in info.socials {
        let slot = match social.kind.to_lowercase().as_str() {
            "twitter" | "x" => &mut socials.twitter,
            "telegram" => &mut socials.telegram,
            "discord" => &mut socials.discord,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(social.url);
        }
    }
    socials.website = info.websites.into_iter().map(|w| w.url).next();
    socials
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> SearchResponse {
        serde_json::from_value(json!({
            "schemaVersion": "1.0.0",
            "pairs": [
                {
                    "chainId": "solana",
                    "dexId": "raydium",
                    "pairAddress": "pairLow",
                    "baseToken": { "address": "MintA", "name": "402 Protocol", "symbol": "402X" },
                    "quoteToken": { "address": "So11111111111111111111111111111111111111112", "name": "Wrapped SOL", "symbol": "SOL" },
                    "priceNative": "0.0001",
                    "liquidity": { "usd": 1200.0, "base": 10.0, "quote": 2.0 },
                    "fdv": 90000.0,
                    "pairCreatedAt": 1730000000000i64
                },
                {
                    "chainId": "solana",
                    "dexId": "meteora",
                    "pairAddress": "pairHigh",
                    "baseToken": { "address": "minta", "name": "402 Protocol", "symbol": "402X" },
                    "quoteToken": { "address": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", "name": "USDC", "symbol": "USDC" },
                    "liquidity": { "usd": 50000.0 },
                    "marketCap": 120000.0,
                    "pairCreatedAt": 1731000000000i64,
                    "info": {
                        "imageUrl": "https://example.invalid/img.png",
                        "websites": [ { "label": "Website", "url": "https://402protocol.com" } ],
                        "socials": [
                            { "type": "twitter", "url": "https://x.com/402protocol" },
                            { "type": "telegram", "url": "https://t.me/402protocol" }
                        ]
                    }
                },
                {
                    "chainId": "base",
                    "dexId": "uniswap",
                    "pairAddress": "evm",
                    "baseToken": { "address": "0xabc", "name": "x402 on Base", "symbol": "X402" },
                    "quoteToken": { "address": "0xdef", "name": "WETH", "symbol": "WETH" }
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn keeps_most_liquid_solana_pair() {
        let tokens = normalize(fixture().pairs.unwrap());
        assert_eq!(tokens.len(), 1);

        let token = &tokens[0];
        assert_eq!(token.mint_address, "minta");
        assert_eq!(token.market_cap, Some(120000.0));
        assert_eq!(token.created_at, Some(1731000000000));
        let socials = token.socials.as_ref().unwrap();
        assert_eq!(socials.twitter.as_deref(), Some("https://x.com/402protocol"));
        assert_eq!(socials.telegram.as_deref(), Some("https://t.me/402protocol"));
        assert_eq!(socials.website.as_deref(), Some("https://402protocol.com"));
        assert!(socials.discord.is_none());
    }

    #[test]
    fn fdv_stands_in_for_missing_market_cap() {
        let mut pairs = fixture().pairs.unwrap();
        pairs.truncate(1);
        let tokens = normalize(pairs);
        assert_eq!(tokens[0].market_cap, Some(90000.0));
        assert!(tokens[0].socials.is_none());
    }

    #[test]
    fn null_pairs_decode_to_empty() {
        let resp: SearchResponse =
            serde_json::from_value(json!({ "schemaVersion": "1.0.0", "pairs": null })).unwrap();
        assert!(normalize(resp.pairs.unwrap_or_default()).is_empty());
    }
}

// src/sources/mod.rs
pub mod birdeye;
pub mod dexscreener;
pub mod jupiter;
pub mod pumpfun;

use async_trait::async_trait;
use eyre::eyre;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::{fmt, future::Future, str::FromStr, sync::Arc, time::Duration};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::SourceError;
use crate::matcher::SearchTerms;
use crate::models::Token;

pub use birdeye::BirdeyeSource;
pub use dexscreener::DexScreenerSource;
pub use jupiter::JupiterSource;
pub use pumpfun::PumpFunSource;

/// Something that can list candidate tokens
#[async_trait]
pub trait TokenSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Candidates from this provider, already deduplicated by mint
    async fn fetch_tokens(&self) -> Result<Vec<Token>, SourceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    DexScreener,
    PumpFun,
    Jupiter,
    Birdeye,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::DexScreener => "dexscreener",
            SourceKind::PumpFun => "pumpfun",
            SourceKind::Jupiter => "jupiter",
            SourceKind::Birdeye => "birdeye",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dexscreener" => Ok(SourceKind::DexScreener),
            "pumpfun" | "pump.fun" | "pump" => Ok(SourceKind::PumpFun),
            "jupiter" | "jup" => Ok(SourceKind::Jupiter),
            "birdeye" => Ok(SourceKind::Birdeye),
            other => Err(eyre!("unknown token source: {}", other)),
        }
    }
}

/// Instantiate the configured sources in priority order.
/// Birdeye is left out when no API key is set.
pub fn build_sources(cfg: &Config) -> eyre::Result<Vec<Arc<dyn TokenSource>>> {
    let client = Client::builder()
        .timeout(cfg.request_timeout)
        .build()?;

    let mut sources: Vec<Arc<dyn TokenSource>> = Vec::new();
    for kind in &cfg.source_priority {
        match kind {
            SourceKind::DexScreener => sources.push(Arc::new(DexScreenerSource::new(
                client.clone(),
                cfg.search_terms.clone(),
                cfg.term_delay,
            ))),
            SourceKind::PumpFun => sources.push(Arc::new(PumpFunSource::new(
                client.clone(),
                cfg.search_terms.clone(),
                cfg.term_delay,
            ))),
            SourceKind::Jupiter => sources.push(Arc::new(JupiterSource::new(
                client.clone(),
                cfg.search_terms.clone(),
                cfg.term_delay,
            ))),
            SourceKind::Birdeye => match &cfg.birdeye_api_key {
                Some(key) => sources.push(Arc::new(BirdeyeSource::new(client.clone(), key.clone()))),
                None => info!("BIRDEYE_API_KEY not set, skipping {}", kind),
            },
        }
    }

    let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
    info!("Token sources (primary first): {:?}", names);

    Ok(sources)
}

/// Send a GET and decode the JSON body, mapping 429 and other non-2xx codes
pub(crate) async fn get_json<T: DeserializeOwned>(
    source: &str,
    request: RequestBuilder,
) -> Result<T, SourceError> {
    let resp = request.send().await?;
    let status = resp.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(SourceError::RateLimited);
    }
    if !status.is_success() {
        return Err(SourceError::Status(status));
    }

    let text = resp.text().await?;
    debug!("{} response: {} bytes", source, text.len());

    Ok(serde_json::from_str(&text)?)
}

/// Run `query` for each term one at a time, sleeping `delay` in between.
/// A failed term is logged and skipped; the source only fails when every term does.
pub(crate) async fn search_each_term<T, F, Fut>(
    source: &str,
    terms: &SearchTerms,
    delay: Duration,
    query: F,
) -> Result<Vec<T>, SourceError>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Vec<T>, SourceError>>,
{
    let mut results = Vec::new();
    let mut last_error = None;
    let mut succeeded = 0;

    for (i, term) in terms.as_slice().iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(delay).await; // stay under provider rate limits
        }

        match query(term.clone()).await {
            Ok(mut batch) => {
                debug!("{}: {} results for '{}'", source, batch.len(), term);
                succeeded += 1;
                results.append(&mut batch);
            }
            Err(e) => {
                warn!("{}: search for '{}' failed: {}", source, term, e);
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if succeeded == 0 => Err(e),
        _ => Ok(results),
    }
}

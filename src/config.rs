use dotenvy::dotenv;
use eyre::Result;
use std::{env, fmt, net::IpAddr, time::Duration};
use tracing::info;

use crate::matcher::SearchTerms;
use crate::sources::SourceKind;

pub const DEFAULT_SEARCH_TERMS: &str = "402,x402,402x";
pub const DEFAULT_PRIORITY: [SourceKind; 4] = [
    SourceKind::DexScreener,
    SourceKind::PumpFun,
    SourceKind::Jupiter,
    SourceKind::Birdeye,
];

#[derive(Clone)]
pub struct Config {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub search_terms: SearchTerms,
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
    pub term_delay: Duration,      // pause between term queries to one provider
    pub birdeye_api_key: Option<String>,
    pub source_priority: Vec<SourceKind>, // first entry is the primary source
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_addr", &self.bind_addr)
            .field("port", &self.port)
            .field("search_terms", &self.search_terms.as_slice())
            .field("cache_ttl", &self.cache_ttl)
            .field("request_timeout", &self.request_timeout)
            .field("term_delay", &self.term_delay)
            .field("birdeye_api_key", &self.birdeye_api_key.as_ref().map(|_| "<redacted>"))
            .field("source_priority", &self.source_priority)
            .finish()
    }
}

pub fn load() -> Result<Config> {
    dotenv().ok(); // load .env if present

    let cfg = from_vars(|key| env::var(key).ok())?;
    info!("Loaded config: {:?}", cfg);

    Ok(cfg)
}

/// Build a config from any key lookup (the process env in `load`)
pub fn from_vars<F>(get: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let bind_addr = get("BIND_ADDR")
        .and_then(|s| s.parse().ok())
        .unwrap_or(IpAddr::from([127, 0, 0, 1]));

    let port = get("PORT").and_then(|s| s.parse().ok()).unwrap_or(5000);

    let terms_raw = get("SEARCH_TERMS").unwrap_or_else(|| DEFAULT_SEARCH_TERMS.to_string());
    let mut search_terms = SearchTerms::new(terms_raw.split(','));
    if search_terms.is_empty() {
        search_terms = SearchTerms::new(DEFAULT_SEARCH_TERMS.split(','));
    }

    let cache_ttl = Duration::from_secs(
        get("CACHE_TTL_SECS").and_then(|s| s.parse().ok()).unwrap_or(300),
    );
    let request_timeout = Duration::from_secs(
        get("REQUEST_TIMEOUT_SECS").and_then(|s| s.parse().ok()).unwrap_or(10),
    );
    let term_delay = Duration::from_millis(
        get("TERM_DELAY_MS").and_then(|s| s.parse().ok()).unwrap_or(1000),
    );

    let birdeye_api_key = get("BIRDEYE_API_KEY")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let source_priority = match get("SOURCE_PRIORITY") {
        Some(raw) => parse_priority(&raw)?,
        None => DEFAULT_PRIORITY.to_vec(),
    };

    Ok(Config {
        bind_addr,
        port,
        search_terms,
        cache_ttl,
        request_timeout,
        term_delay,
        birdeye_api_key,
        source_priority,
    })
}

fn parse_priority(raw: &str) -> Result<Vec<SourceKind>> {
    let mut order: Vec<SourceKind> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let kind: SourceKind = name.parse()?;
        if !order.contains(&kind) {
            order.push(kind);
        }
    }

    if order.is_empty() {
        return Ok(DEFAULT_PRIORITY.to_vec());
    }
    Ok(order)
}

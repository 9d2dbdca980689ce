use futures_util::future::join_all;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::TokenCache;
use crate::matcher::SearchTerms;
use crate::models::Token;
use crate::sources::TokenSource;

/// What one source produced during a refresh
#[derive(Debug)]
pub enum SourceOutcome {
    Success(Vec<Token>),
    Failure(String),
}

/// Fans out to every source, merges by mint and caches the merged list.
/// The first source is primary: without it there is no fresh result.
pub struct Aggregator {
    sources: Vec<Arc<dyn TokenSource>>,
    terms: SearchTerms,
    cache: RwLock<TokenCache>,
}

impl Aggregator {
    pub fn new(sources: Vec<Arc<dyn TokenSource>>, terms: SearchTerms, cache: TokenCache) -> Self {
        Self {
            sources,
            terms,
            cache: RwLock::new(cache),
        }
    }

    /// Current token list. Never fails: falls back to the cached list,
    /// or an empty one when nothing was ever fetched.
    pub async fn fetch_tokens(&self) -> Vec<Token> {
        {
            let cache = self.cache.read().await;
            if cache.is_fresh() {
                debug!("Serving {} tokens from cache", cache.len());
                return cache.get();
            }
        }

        info!("Refreshing tokens from {} sources", self.sources.len());
        let mut outcomes = self.collect_outcomes().await.into_iter();

        let primary = match outcomes.next() {
            Some(SourceOutcome::Success(tokens)) => tokens,
            Some(SourceOutcome::Failure(reason)) => return self.stale(&reason).await,
            None => return self.stale("no sources configured").await,
        };

        let secondaries = outcomes.filter_map(|outcome| match outcome {
            SourceOutcome::Success(tokens) => Some(tokens),
            SourceOutcome::Failure(_) => None,
        });
        let merged = merge_sources(primary, secondaries);

        info!("Aggregated {} tokens", merged.len());
        self.cache.write().await.set(merged.clone());
        merged
    }

    /// Query all sources at once; one failing never cancels the others
    async fn collect_outcomes(&self) -> Vec<SourceOutcome> {
        let fetches = self.sources.iter().map(|source| async move {
            match source.fetch_tokens().await {
                Ok(tokens) => {
                    let found = tokens.len();
                    let matching: Vec<Token> =
                        tokens.into_iter().filter(|t| self.terms.matches(t)).collect();
                    info!("{}: {} tokens ({} matching)", source.name(), found, matching.len());
                    SourceOutcome::Success(matching)
                }
                Err(e) => {
                    warn!("{}: fetch failed: {}", source.name(), e);
                    SourceOutcome::Failure(e.to_string())
                }
            }
        });

        join_all(fetches).await
    }

    async fn stale(&self, reason: &str) -> Vec<Token> {
        let cache = self.cache.read().await;
        if cache.is_empty() {
            warn!("Primary source unavailable ({}), no cached tokens", reason);
        } else {
            warn!("Primary source unavailable ({}), serving {} stale tokens", reason, cache.len());
        }
        cache.get()
    }
}

/// Primary records first, in their order. Secondary records enrich a match
/// by mint without overwriting, or are appended when new.
pub fn merge_sources<I>(primary: Vec<Token>, secondaries: I) -> Vec<Token>
where
    I: IntoIterator<Item = Vec<Token>>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<Token> = Vec::with_capacity(primary.len());

    for batch in std::iter::once(primary).chain(secondaries) {
        for token in batch {
            match index.get(&token.key()) {
                Some(&idx) => merged[idx].merge_missing(&token),
                None => {
                    index.insert(token.key(), merged.len());
                    merged.push(token);
                }
            }
        }
    }

    merged
}

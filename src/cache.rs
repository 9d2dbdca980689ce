// src/cache.rs
use std::time::Duration;
use tokio::time::Instant;

use crate::models::Token;

/// Last merged token list and when it was fetched
#[derive(Debug)]
pub struct TokenCache {
    entries: Vec<Token>,
    fetched_at: Option<Instant>,
    ttl: Duration,
}

impl TokenCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Vec::new(),
            fetched_at: None,
            ttl,
        }
    }

    pub fn get(&self) -> Vec<Token> {
        self.entries.clone()
    }

    pub fn set(&mut self, entries: Vec<Token>) {
        self.entries = entries;
        self.fetched_at = Some(Instant::now());
    }

    /// Non-empty and younger than the ttl
    pub fn is_fresh(&self) -> bool {
        match self.fetched_at {
            Some(at) => !self.entries.is_empty() && at.elapsed() < self.ttl,
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

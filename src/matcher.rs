// src/matcher.rs
use std::collections::HashMap;

use crate::models::Token;

/// Case-insensitive substrings a token name or symbol must contain
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTerms(Vec<String>);

impl SearchTerms {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for term in terms {
            let term = term.as_ref().trim().to_lowercase();
            if !term.is_empty() && !out.contains(&term) {
                out.push(term);
            }
        }
        Self(out)
    }

    /// Terms in the order they should be queried
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches_text(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.0.iter().any(|term| text.contains(term.as_str()))
    }

    pub fn matches(&self, token: &Token) -> bool {
        self.matches_text(&token.name) || self.matches_text(&token.symbol)
    }
}

/// A token as one source reported it, with that source's liquidity figure
#[derive(Debug, Clone)]
pub struct Candidate {
    pub token: Token,
    pub liquidity: f64,
}

impl Candidate {
    pub fn new(token: Token, liquidity: Option<f64>) -> Self {
        Self {
            token,
            liquidity: liquidity.unwrap_or(0.0),
        }
    }
}

/// Collapse candidates sharing a mint, keeping the most liquid.
/// Ties keep whichever came first; output follows first-seen order.
pub fn dedupe_by_liquidity(candidates: Vec<Candidate>) -> Vec<Token> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<Candidate> = Vec::new();

    for candidate in candidates {
        match slots.get(&candidate.token.key()) {
            Some(&idx) => {
                if candidate.liquidity > kept[idx].liquidity {
                    kept[idx] = candidate;
                }
            }
            None => {
                slots.insert(candidate.token.key(), kept.len());
                kept.push(candidate);
            }
        }
    }

    kept.into_iter().map(|c| c.token).collect()
}

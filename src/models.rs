// src/models.rs
use serde::{Deserialize, Serialize};

/// Social links attached to a token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Socials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl Socials {
    pub fn is_empty(&self) -> bool {
        self.twitter.is_none()
            && self.telegram.is_none()
            && self.discord.is_none()
            && self.website.is_none()
    }

    /// Fill links we don't have yet; existing links are kept
    pub fn merge_missing(&mut self, other: &Socials) {
        fill(&mut self.twitter, &other.twitter);
        fill(&mut self.telegram, &other.telegram);
        fill(&mut self.discord, &other.discord);
        fill(&mut self.website, &other.website);
    }

    /// `None` when no link is set, so the field drops out of the JSON
    pub fn non_empty(self) -> Option<Socials> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

/// A token as served to the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub name: String,
    pub symbol: String,
    pub mint_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>, // epoch millis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socials: Option<Socials>,
}

impl Token {
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        mint_address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            mint_address: mint_address.into(),
            decimals: None,
            supply: None,
            market_cap: None,
            created_at: None,
            socials: None,
        }
    }

    /// Identity of a token across sources
    pub fn key(&self) -> String {
        self.mint_address.to_lowercase()
    }

    /// Enrich with fields from `other` that are missing here.
    /// Anything already set wins, including name and symbol.
    pub fn merge_missing(&mut self, other: &Token) {
        if self.name.is_empty() {
            self.name = other.name.clone();
        }
        if self.symbol.is_empty() {
            self.symbol = other.symbol.clone();
        }
        fill(&mut self.decimals, &other.decimals);
        fill(&mut self.supply, &other.supply);
        fill(&mut self.market_cap, &other.market_cap);
        fill(&mut self.created_at, &other.created_at);

        if let Some(theirs) = &other.socials {
            let mut socials = self.socials.take().unwrap_or_default();
            socials.merge_missing(theirs);
            self.socials = socials.non_empty();
        }
    }
}

/// Whole-unit supply with thousands separators, e.g. `1,000,000,000`
pub fn format_supply(amount: f64) -> Option<String> {
    if !amount.is_finite() || amount < 0.0 {
        return None;
    }

    let digits = format!("{:.0}", amount.trunc());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    Some(out)
}

fn fill<T: Clone>(slot: &mut Option<T>, other: &Option<T>) {
    if slot.is_none() {
        slot.clone_from(other);
    }
}

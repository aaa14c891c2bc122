//! News feed for one symbol.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    pub source: String,
    pub published_at_utc: DateTime<Utc>,
}

/// Articles in the order the source returned them. No ordering is imposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsResult {
    pub symbol: String,
    pub articles: Vec<Article>,
}

impl NewsResult {
    /// The first `n` articles, as a view would display them.
    pub fn top(&self, n: usize) -> &[Article] {
        &self.articles[..n.min(self.articles.len())]
    }
}

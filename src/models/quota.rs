use serde::{Deserialize, Serialize};

/// Category values used to group models in the rate-limit table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaCategory {
    Text,
    Embedding,
    Image,
}

impl QuotaCategory {
    /// Parse a category string into a QuotaCategory enum value
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "embedding" => Some(Self::Embedding),
            "image" => Some(Self::Image),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Embedding => "embedding",
            Self::Image => "image",
        }
    }
}

/// Per-model quota tuple as published by the provider.
///
/// Each limit is evaluated independently: exceeding any single one is enough
/// to reject a request, even when the others still have headroom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelQuota {
    pub model: String,
    pub category: QuotaCategory,
    pub requests_per_minute: u32,
    pub tokens_per_minute: u64,
    pub requests_per_day: u32,
}

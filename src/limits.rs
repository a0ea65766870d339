//! # Rate Limit Table
//!
//! Static lookup of per-model quota tuples (requests/minute, tokens/minute,
//! requests/day), grouped by category.
//!
//! The published numbers are inconsistent between provider doc revisions, so
//! the table is configurable data rather than a hardcoded truth: a JSON file
//! given via `--limits-file` or `GEMINI_LIMITS_FILE` replaces the built-in
//! entries wholesale.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use std::fs;
use std::path::Path;

use crate::error::LimitsError;
use crate::models::{ModelQuota, QuotaCategory};

static BUILTIN: Lazy<RateLimitTable> = Lazy::new(builtin_table);

/// Ordered, read-only collection of model quotas, keyed by exact model name
#[derive(Debug, Clone)]
pub struct RateLimitTable {
    quotas: Vec<ModelQuota>,
}

impl RateLimitTable {
    /// The built-in free-tier table
    pub fn builtin() -> &'static RateLimitTable {
        &BUILTIN
    }

    /// Load quotas from a JSON array of `ModelQuota` objects
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read limits file {}", path.display()))?;
        let quotas: Vec<ModelQuota> = serde_json::from_str(&raw)
            .with_context(|| format!("parse limits file {}", path.display()))?;
        anyhow::ensure!(!quotas.is_empty(), "limits file {} is empty", path.display());
        Ok(Self { quotas })
    }

    /// Resolve the effective table: explicit file override, else built-in
    pub fn load(limits_file: Option<&Path>) -> Result<RateLimitTable> {
        match limits_file {
            Some(path) => Self::from_json_file(path),
            None => Ok(Self::builtin().clone()),
        }
    }

    /// Exact-name lookup. Absent models are surfaced, never defaulted.
    pub fn lookup(&self, model: &str) -> Result<&ModelQuota, LimitsError> {
        self.quotas
            .iter()
            .find(|q| q.model == model)
            .ok_or_else(|| LimitsError::UnknownModel(model.to_string()))
    }

    /// All quotas in a category, in table order
    pub fn by_category(&self, name: &str) -> Result<Vec<&ModelQuota>, LimitsError> {
        let category = QuotaCategory::parse(name)
            .ok_or_else(|| LimitsError::UnknownCategory(name.to_string()))?;
        Ok(self
            .quotas
            .iter()
            .filter(|q| q.category == category)
            .collect())
    }

    /// Distinct category names present in the table, in first-seen order
    pub fn categories(&self) -> Vec<&'static str> {
        let mut seen = Vec::new();
        for q in &self.quotas {
            let name = q.category.as_str();
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
        seen
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelQuota> {
        self.quotas.iter()
    }
}

fn quota(
    model: &str,
    category: QuotaCategory,
    rpm: u32,
    tpm: u64,
    rpd: u32,
) -> ModelQuota {
    ModelQuota {
        model: model.to_string(),
        category,
        requests_per_minute: rpm,
        tokens_per_minute: tpm,
        requests_per_day: rpd,
    }
}

fn builtin_table() -> RateLimitTable {
    use QuotaCategory::{Embedding, Image, Text};
    // Free-tier numbers as last published; override via a limits file when
    // the provider revises them.
    RateLimitTable {
        quotas: vec![
            quota("gemini-2.0-flash", Text, 15, 1_000_000, 1_500),
            quota("gemini-2.0-flash-lite", Text, 30, 1_000_000, 1_500),
            quota("gemini-2.5-flash", Text, 10, 250_000, 250),
            quota("gemini-2.5-flash-lite", Text, 15, 250_000, 1_000),
            quota("gemini-2.5-pro", Text, 5, 250_000, 100),
            quota("gemini-embedding-001", Embedding, 100, 30_000, 1_000),
            quota("text-embedding-004", Embedding, 1_500, 1_000_000, 10_000),
            quota("imagen-3.0-generate-002", Image, 10, 1_000_000, 70),
        ],
    }
}

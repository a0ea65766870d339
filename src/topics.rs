//! # Topics
//!
//! Static pool of article topics, the prompt built from them, and structural
//! validation of what the model sends back.
//!
//! Topic selection rotates by date so an unattended schedule cycles through
//! the pool without repeating on consecutive days; `--topic` pins a specific
//! entry.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;

/// Minimum article length accepted from the model, in characters
const MIN_ARTICLE_CHARS: usize = 400;

static TITLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#\s+\S").expect("valid regex"));

#[derive(Debug, Clone, Copy)]
pub struct Topic {
    pub slug: &'static str,
    pub title: &'static str,
    pub category: &'static str,
    pub tags: &'static [&'static str],
}

pub const TOPICS: &[Topic] = &[
    Topic {
        slug: "circuit-breakers",
        title: "Circuit Breakers in Distributed Systems",
        category: "resilience",
        tags: &["resilience", "microservices", "fault-tolerance", "design-patterns"],
    },
    Topic {
        slug: "rate-limiting",
        title: "Rate Limiting Strategies for Public APIs",
        category: "backend",
        tags: &["api", "rate-limiting", "scalability", "backend"],
    },
    Topic {
        slug: "kubernetes-autoscaling",
        title: "Autoscaling Workloads on Kubernetes",
        category: "devops",
        tags: &["kubernetes", "autoscaling", "devops", "cloud"],
    },
    Topic {
        slug: "docker-layer-caching",
        title: "Docker Layer Caching for Faster Builds",
        category: "devops",
        tags: &["docker", "ci-cd", "devops", "performance"],
    },
    Topic {
        slug: "consistent-hashing",
        title: "Consistent Hashing Explained",
        category: "distributed-systems",
        tags: &["distributed-systems", "hashing", "scalability"],
    },
    Topic {
        slug: "idempotency-keys",
        title: "Designing Idempotent APIs",
        category: "backend",
        tags: &["api", "idempotency", "reliability", "backend"],
    },
    Topic {
        slug: "blue-green-deployments",
        title: "Blue-Green Deployments Without Downtime",
        category: "devops",
        tags: &["deployment", "devops", "release-engineering"],
    },
    Topic {
        slug: "write-ahead-logging",
        title: "Write-Ahead Logging and Crash Recovery",
        category: "databases",
        tags: &["databases", "durability", "storage", "wal"],
    },
    Topic {
        slug: "backpressure",
        title: "Backpressure in Streaming Systems",
        category: "distributed-systems",
        tags: &["streaming", "backpressure", "concurrency", "distributed-systems"],
    },
    Topic {
        slug: "service-discovery",
        title: "Service Discovery Patterns for Microservices",
        category: "microservices",
        tags: &["microservices", "service-discovery", "networking"],
    },
    Topic {
        slug: "observability",
        title: "Observability Beyond Logs",
        category: "observability",
        tags: &["observability", "metrics", "tracing", "sre"],
    },
    Topic {
        slug: "database-indexing",
        title: "Database Indexing: What the Planner Actually Does",
        category: "databases",
        tags: &["databases", "indexing", "performance", "sql"],
    },
];

/// Topic for a given calendar date; the rotation index is the day number so
/// the choice is stable within a day and advances daily
pub fn topic_for_date(date: NaiveDate) -> &'static Topic {
    let idx = date.num_days_from_ce().rem_euclid(TOPICS.len() as i32) as usize;
    &TOPICS[idx]
}

/// Find a topic by its slug (case-insensitive)
pub fn find_topic(slug: &str) -> Option<&'static Topic> {
    TOPICS.iter().find(|t| t.slug.eq_ignore_ascii_case(slug))
}

pub fn build_prompt(topic: &Topic) -> String {
    format!(
        "Write a technical blog post about \"{}\" for an audience of working \
         software engineers.\n\
         \n\
         Requirements:\n\
         - Start with a single markdown H1 title line (`# ...`).\n\
         - Use `##` subheadings to structure the article.\n\
         - Around 900 words, practical and concrete, with at least one short \
           code or configuration example.\n\
         - Plain markdown only: no YAML front matter, no HTML.\n",
        topic.title
    )
}

/// Structural checks on the generated markdown: a real H1 title on the first
/// non-empty line and a body of useful length. Content quality is out of
/// scope; retrying the model over structure is not a transient-fault decision.
pub fn validate_article(text: &str) -> Result<(), ValidationError> {
    let first_line = text
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or_default();
    if !TITLE_RE.is_match(first_line.trim_start()) {
        return Err(ValidationError(
            "generated article does not start with a markdown H1 title".to_string(),
        ));
    }
    if text.trim().len() < MIN_ARTICLE_CHARS {
        return Err(ValidationError(format!(
            "generated article is too short ({} chars, need {})",
            text.trim().len(),
            MIN_ARTICLE_CHARS
        )));
    }
    Ok(())
}

/// Split a validated article into its H1 title and the remaining body
pub fn split_title_body(text: &str) -> Option<(String, String)> {
    let trimmed = text.trim_start();
    let mut lines = trimmed.lines();
    let title_line = lines.next()?;
    let title = title_line.strip_prefix('#')?.trim().to_string();
    if title.is_empty() {
        return None;
    }
    let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();
    Some((title, body))
}

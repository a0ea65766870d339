//! # Run Orchestrator
//!
//! One scheduled invocation, as a linear state machine:
//! quota check → generate → validate → write. Each step's success is a
//! precondition for the next, no state is revisited, and every outcome is
//! resolved here; only an exit code and a log line cross the process
//! boundary.
//!
//! A quota denial or a path collision is not a failure. The documented
//! intent for both is "skip this scheduled slot", so they map to exit 0.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Offset, Utc};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::GenerateArgs;
use crate::client::GenerationClient;
use crate::error::WriteError;
use crate::limits::RateLimitTable;
use crate::models::BlogPost;
use crate::topics;
use crate::tracker::{QuotaDecision, QuotaTracker};
use crate::utils::estimate_tokens;
use crate::writer::PostWriter;

/// Terminal states of one run
#[derive(Debug)]
pub enum RunOutcome {
    Written(PathBuf),
    SkippedQuota {
        reason: String,
        retry_after_secs: i64,
    },
    AlreadyExists(PathBuf),
    Failed(String),
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Written(_) | Self::SkippedQuota { .. } | Self::AlreadyExists(_) => 0,
            Self::Failed(_) => 1,
        }
    }
}

pub fn execute(args: &GenerateArgs) -> Result<RunOutcome> {
    execute_at(args, Utc::now())
}

/// Clock-injected variant of [`execute`]
pub fn execute_at(args: &GenerateArgs, now: DateTime<Utc>) -> Result<RunOutcome> {
    let table = RateLimitTable::load(args.limits_file.as_deref())?;
    let quota = table.lookup(&args.model)?.clone();

    // Required secret. Read once, passed only as a request header.
    let api_key = env::var("GEMINI_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| anyhow!("GEMINI_API_KEY is not set"))?;

    let topic = match &args.topic {
        Some(slug) => {
            topics::find_topic(slug).ok_or_else(|| anyhow!("unknown topic: {slug}"))?
        }
        None => topics::topic_for_date(now.date_naive()),
    };
    let prompt = topics::build_prompt(topic);
    let estimated = estimate_tokens(&prompt, args.max_tokens);

    let tracker = match &args.db_path {
        Some(path) => QuotaTracker::open(path)?,
        None => QuotaTracker::open_default()?,
    };

    match tracker.try_acquire_at(&quota, estimated, now)? {
        QuotaDecision::Denied {
            reason,
            retry_after_secs,
        } => {
            return Ok(RunOutcome::SkippedQuota {
                reason,
                retry_after_secs,
            });
        }
        QuotaDecision::Allowed => {}
    }

    let client = GenerationClient::new(api_key, Duration::from_secs(args.timeout_secs));
    let result = client.generate(&tracker, &quota, &prompt, args.max_tokens)?;
    if !result.success {
        return Ok(RunOutcome::Failed(
            result
                .error
                .unwrap_or_else(|| "generation failed".to_string()),
        ));
    }

    if let Err(e) = topics::validate_article(&result.content) {
        return Ok(RunOutcome::Failed(e.to_string()));
    }

    let (title, body) = match topics::split_title_body(&result.content) {
        Some(parts) => parts,
        None => (topic.title.to_string(), result.content.clone()),
    };
    let post = BlogPost {
        title,
        date: now.with_timezone(&Utc.fix()),
        categories: vec![topic.category.to_string()],
        tags: topic.tags.iter().map(|t| t.to_string()).collect(),
        description: None,
        keywords: None,
        author: None,
        image: None,
        body,
    };

    let writer = PostWriter::new(&args.output_dir);
    match writer.write(&post) {
        Ok(path) => Ok(RunOutcome::Written(path)),
        Err(WriteError::Collision(path)) => Ok(RunOutcome::AlreadyExists(path)),
        Err(WriteError::Validation(e)) => Ok(RunOutcome::Failed(e.to_string())),
        Err(WriteError::Io(e)) => Err(e.into()),
    }
}

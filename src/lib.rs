//! # Gemini Bloggen
//!
//! A rate-limit-aware, single-shot blog post generator for a scheduled
//! (e.g. hourly) trigger.
//!
//! ## Overview
//!
//! Each invocation runs one linear pass: check the model's quota against
//! persisted rolling windows, call the Gemini text API once (with bounded
//! retries that each re-acquire quota), validate the article's shape, and
//! write it as a front-matter markdown file under a `YYYY/MM/DD/` partition.
//! Existing files are never overwritten; a denied quota check or a path
//! collision just skips the slot.
//!
//! A second subcommand renders the rate-limit table as a text or markdown
//! report.

/// Command-line argument parsing
pub mod cli;

/// Gemini API client with timeout, retry and backoff
pub mod client;

/// SQLite persistence for usage windows
pub mod db;

/// Error taxonomy
pub mod error;

/// Static per-model rate-limit table
pub mod limits;

/// Data models for quotas, windows, posts and generation results
pub mod models;

/// Rate-limit table report rendering
pub mod report;

/// Single-run orchestration
pub mod run;

/// Topic rotation, prompt building and article validation
pub mod topics;

/// Quota window tracking and acquisition
pub mod tracker;

/// Utility functions for time, slugs and formatting
pub mod utils;

/// Front-matter markdown writer
pub mod writer;

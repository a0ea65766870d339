use chrono::{DateTime, Utc};

/// Outcome of one generate() call, including retries.
///
/// Failures are reported in-band (`success == false` plus a descriptive
/// `error`) so the orchestrator can map them to a terminal state without
/// unwinding.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub content: String,
    pub model_used: String,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub error: Option<String>,
}

impl GenerationResult {
    pub fn ok(content: String, model: &str) -> Self {
        Self {
            content,
            model_used: model.to_string(),
            timestamp: Utc::now(),
            success: true,
            error: None,
        }
    }

    pub fn failed(model: &str, error: String) -> Self {
        Self {
            content: String::new(),
            model_used: model.to_string(),
            timestamp: Utc::now(),
            success: false,
            error: Some(error),
        }
    }
}

use std::path::PathBuf;

use crate::report::ReportFormat;

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
pub enum FormatArg {
    Text,
    Markdown,
}

impl From<FormatArg> for ReportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Markdown => ReportFormat::Markdown,
        }
    }
}

#[derive(clap::Parser, Debug)]
#[command(name = "gemini-bloggen", version, about = "Rate-limit-aware scheduled blog post generator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Run one scheduled generation: quota check, generate, validate, write
    Generate(GenerateArgs),
    /// Report the rate-limit table
    Limits(LimitsArgs),
}

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Model to generate with (must have a rate-limit table entry)
    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-2.0-flash")]
    pub model: String,

    /// Pin a topic by slug instead of the daily rotation
    #[arg(long)]
    pub topic: Option<String>,

    /// Root directory for the YYYY/MM/DD post partition
    #[arg(long, env = "GEMINI_OUTPUT_DIR", default_value = "posts")]
    pub output_dir: PathBuf,

    /// Output token budget per request
    #[arg(long, default_value_t = 2048)]
    pub max_tokens: u32,

    /// Hard timeout for the API call, in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// JSON file replacing the built-in quota table
    #[arg(long, env = "GEMINI_LIMITS_FILE")]
    pub limits_file: Option<PathBuf>,

    /// Quota state database (default: ~/.gemini-bloggen/quota.db)
    #[arg(long, env = "GEMINI_BLOGGEN_DB_PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct LimitsArgs {
    /// Report format: text|markdown
    #[arg(long, value_enum, default_value_t = FormatArg::Text)]
    pub format: FormatArg,

    /// Restrict the report to one model
    #[arg(long)]
    pub model: Option<String>,

    /// Restrict the report to one category
    #[arg(long)]
    pub category: Option<String>,

    /// List known categories and exit
    #[arg(long)]
    pub list_categories: bool,

    /// Write the report to a file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// JSON file replacing the built-in quota table
    #[arg(long, env = "GEMINI_LIMITS_FILE")]
    pub limits_file: Option<PathBuf>,
}

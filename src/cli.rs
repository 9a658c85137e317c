use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "viralclip",
    about = "Find short-form viral clip candidates in a YouTube video",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// YouTube video URL (prompts interactively if omitted)
    pub url: Option<String>,

    /// Output format: text (default), json
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Play back clip N (1-based) with its captions after generating
    #[arg(short, long, value_name = "N")]
    pub preview: Option<usize>,

    /// Preview speed multiplier
    #[arg(long, default_value_t = 4.0)]
    pub speed: f64,

    /// Gemini model to use
    #[arg(short, long)]
    pub model: Option<String>,

    /// Disable coloured output
    #[arg(long)]
    pub no_color: bool,

    /// Show request details and clip advisories
    #[arg(short, long)]
    pub verbose: bool,
}

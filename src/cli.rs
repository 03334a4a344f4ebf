use clap::Parser;

/// Generate rule-conformant social posts from a block of text.
#[derive(Debug, Parser)]
#[command(name = "tweetforge", version, about)]
pub struct Cli {
    /// Input text. Read from stdin when omitted.
    pub input: Option<String>,

    /// Generate with the authenticated tier's constraints (4 posts,
    /// hashtags allowed) instead of the guest tier (3 posts, none).
    #[arg(long)]
    pub authenticated: bool,

    /// File holding prior conversation turns to generate against.
    #[arg(long, value_name = "FILE")]
    pub context: Option<std::path::PathBuf>,

    /// Source link that will be appended to each post downstream; its
    /// length is reserved during validation.
    #[arg(long, value_name = "URL")]
    pub source_url: Option<String>,

    /// Rules document name inside the rules directory.
    #[arg(long, value_name = "NAME")]
    pub rules: Option<String>,

    /// Directory holding rules documents.
    #[arg(long, value_name = "DIR", default_value = "rules")]
    pub rules_dir: std::path::PathBuf,

    /// Completion model to use.
    #[arg(long)]
    pub model: Option<String>,

    /// Override the token budget for this call.
    #[arg(long, value_name = "TOKENS")]
    pub max_tokens: Option<u32>,
}

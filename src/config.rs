use clap::Parser;
use std::time::Duration;

use crate::hn_client::DEFAULT_API_BASE;
use crate::models::Category;

#[derive(Debug, Clone, Parser)]
#[command(name = "hn_categories", version, about = "Browse Hacker News stories by category")]
pub struct Config {
    /// Base URL of the Hacker News API
    #[arg(long, env = "HN_API_BASE", default_value = DEFAULT_API_BASE, value_parser = parse_api_base)]
    pub api_base: String,

    /// Category shown at startup
    #[arg(long, value_enum, default_value_t = Category::New)]
    pub category: Category,

    /// Start with the light theme instead of the saved one
    #[arg(long)]
    pub light: bool,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_api_base(value: &str) -> Result<String, String> {
    let url = reqwest::Url::parse(value).map_err(|e| format!("invalid URL '{value}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(value.to_string()),
        other => Err(format!("unsupported scheme '{other}', expected http or https")),
    }
}

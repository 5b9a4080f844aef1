use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::ranker::FailurePolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Feed source identifiers, fetched in this order
    pub feeds: Vec<String>,
    /// Number of entries in the digest
    #[serde(default = "default_num_items")]
    pub num_items: usize,
    pub output_file: PathBuf,
    /// Entry title to exclude; falls back to the page title
    #[serde(default)]
    pub skip_title: Option<String>,
    #[serde(default)]
    pub on_fetch_error: FailurePolicy,
    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    pub page: PageConfig,
}

fn default_num_items() -> usize {
    20
}

fn default_request_timeout() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct PageConfig {
    pub title: String,
    pub author: String,
    pub menu: String,
    pub weight: MenuWeight,
    pub icon: String,
}

/// Menu weight as written in the config, either `40` or `"40"`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum MenuWeight {
    Number(i64),
    Text(String),
}

impl fmt::Display for MenuWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuWeight::Number(n) => write!(f, "{}", n),
            MenuWeight::Text(s) => f.write_str(s),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn skip_title(&self) -> &str {
        self.skip_title.as_deref().unwrap_or(&self.page.title)
    }
}

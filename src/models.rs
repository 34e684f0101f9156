use serde::Deserialize;

/// Story rankings exposed by the Hacker News API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum Category {
    #[default]
    New,
    Top,
    Best,
    Job,
}

impl Category {
    pub const ALL: [Category; 4] = [Category::New, Category::Top, Category::Best, Category::Job];

    pub fn label(self) -> &'static str {
        match self {
            Category::New => "New",
            Category::Top => "Top",
            Category::Best => "Best",
            Category::Job => "Job",
        }
    }

    /// Path segment used by the list endpoint, e.g. `newstories.json`.
    pub fn list_path(self) -> &'static str {
        match self {
            Category::New => "newstories.json",
            Category::Top => "topstories.json",
            Category::Best => "beststories.json",
            Category::Job => "jobstories.json",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Story {
    pub id: u64,
    // Deleted and dead items come back without a title.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub by: Option<String>,
}

impl Story {
    pub fn domain(&self) -> Option<String> {
        let url = reqwest::Url::parse(self.url.as_deref()?).ok()?;
        let host = url.host_str()?;
        Some(host.strip_prefix("www.").unwrap_or(host).to_string())
    }
}

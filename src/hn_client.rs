use anyhow::Context;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::models::{Category, Story};

pub const DEFAULT_API_BASE: &str = "https://hacker-news.firebaseio.com";

/// The only failure kind surfaced to the UI. Carries the server's status
/// text, or the transport/decode message when there is no status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("{0}")]
    RequestFailed(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::RequestFailed(err.to_string())
    }
}

/// Where story lists and items come from.
pub trait StorySource: Send + Sync {
    fn fetch_story_ids(&self, category: Category) -> Result<Vec<u64>, FetchError>;
    fn fetch_story(&self, id: u64) -> Result<Story, FetchError>;
}

#[derive(Clone)]
pub struct HackerNewsClient {
    client: Client,
    base_url: String,
}

impl HackerNewsClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hn_categories/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn story_ids_url(&self, category: Category) -> String {
        format!("{}/v0/{}", self.base_url, category.list_path())
    }

    pub fn story_url(&self, id: u64) -> String {
        format!("{}/v0/item/{}.json", self.base_url, id)
    }

    /// GET `url` and decode its JSON body. Any non-2xx status fails with
    /// the status' reason phrase.
    pub fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        debug!(%url, "GET");
        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            let status_text = status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_str().to_string());
            return Err(FetchError::RequestFailed(status_text));
        }

        Ok(response.json::<T>()?)
    }
}

impl StorySource for HackerNewsClient {
    fn fetch_story_ids(&self, category: Category) -> Result<Vec<u64>, FetchError> {
        self.get_json(&self.story_ids_url(category))
    }

    fn fetch_story(&self, id: u64) -> Result<Story, FetchError> {
        self.get_json(&self.story_url(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // The blocking client must be built, used and dropped off the async runtime.
    async fn with_client<R, F>(server: &MockServer, f: F) -> R
    where
        R: Send + 'static,
        F: FnOnce(HackerNewsClient) -> R + Send + 'static,
    {
        let base = server.uri();
        tokio::task::spawn_blocking(move || {
            let client = HackerNewsClient::new(&base, Duration::from_secs(5)).unwrap();
            f(client)
        })
        .await
        .unwrap()
    }

    #[test]
    fn builds_endpoint_urls() {
        let client = HackerNewsClient::new("https://hacker-news.firebaseio.com/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.story_ids_url(Category::Best),
            "https://hacker-news.firebaseio.com/v0/beststories.json"
        );
        assert_eq!(
            client.story_url(8863),
            "https://hacker-news.firebaseio.com/v0/item/8863.json"
        );
    }

    #[tokio::test]
    async fn fetches_story_ids_for_category() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/jobstories.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[3, 2, 1]"))
            .expect(1)
            .mount(&server)
            .await;

        let ids = with_client(&server, |c| c.fetch_story_ids(Category::Job)).await;
        assert_eq!(ids, Ok(vec![3, 2, 1]));
    }

    #[tokio::test]
    async fn fetches_story_item() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/item/42.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"id": 42, "title": "Rust 2.0", "url": "https://rust-lang.org", "score": 9001, "by": "ferris"}"#,
            ))
            .mount(&server)
            .await;

        let story = with_client(&server, |c| c.fetch_story(42)).await.unwrap();
        assert_eq!(
            story,
            Story {
                id: 42,
                title: "Rust 2.0".to_string(),
                url: Some("https://rust-lang.org".to_string()),
                score: 9001,
                by: Some("ferris".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn error_status_carries_status_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/item/7.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = with_client(&server, |c| c.fetch_story(7)).await;
        assert_eq!(result, Err(FetchError::RequestFailed("Not Found".to_string())));
    }

    #[tokio::test]
    async fn malformed_body_is_a_request_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/newstories.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = with_client(&server, |c| c.fetch_story_ids(Category::New)).await;
        assert!(matches!(result, Err(FetchError::RequestFailed(_))));
    }

    #[tokio::test]
    async fn deleted_item_still_decodes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/item/2.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"id": 2, "deleted": true, "type": "story", "time": 1160418628}"#),
            )
            .mount(&server)
            .await;

        let story = with_client(&server, |c| c.fetch_story(2)).await.unwrap();
        assert_eq!(story.id, 2);
        assert_eq!(story.title, "");
    }

    #[tokio::test]
    async fn null_item_is_a_request_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/item/1.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        let result = with_client(&server, |c| c.fetch_story(1)).await;
        assert!(result.is_err());
    }
}

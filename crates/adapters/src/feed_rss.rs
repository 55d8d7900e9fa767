//! RSS/Atom feed source over HTTP

use async_trait::async_trait;
use feed_rs::model::Entry;
use feedpress_domain::{FeedError, FeedItem, FeedSource};
use reqwest::Client;
use std::time::Duration;
use time::OffsetDateTime;

const DEFAULT_USER_AGENT: &str = concat!("feedpress/", env!("CARGO_PKG_VERSION"));

/// Feed source that fetches and parses RSS and Atom feeds
pub struct RssFeedSource {
    client: Client,
}

impl RssFeedSource {
    pub fn new(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }
}

impl Default for RssFeedSource {
    fn default() -> Self {
        Self::new(30)
    }
}

#[async_trait]
impl FeedSource for RssFeedSource {
    async fn fetch_items(&self, feed_url: &str) -> Result<Vec<FeedItem>, FeedError> {
        let response = self
            .client
            .get(feed_url)
            .send()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Http(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        let feed =
            feed_rs::parser::parse(body.as_ref()).map_err(|e| FeedError::Parse(e.to_string()))?;

        Ok(feed.entries.into_iter().map(entry_to_item).collect())
    }
}

fn entry_to_item(entry: Entry) -> FeedItem {
    let published_at = entry
        .published
        .or(entry.updated)
        .and_then(|dt| OffsetDateTime::from_unix_timestamp(dt.timestamp()).ok());

    FeedItem {
        title: entry.title.map(|t| t.content).unwrap_or_default(),
        link: entry.links.first().map(|l| l.href.clone()).unwrap_or_default(),
        summary: entry.summary.map(|s| s.content),
        published_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SAMPLE_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example Tech Feed</title>
    <link>https://example.com</link>
    <item>
      <title>First article</title>
      <link>https://example.com/first</link>
      <description>First summary</description>
    </item>
    <item>
      <title>Second article</title>
      <link>https://example.com/second</link>
      <description>Second summary</description>
    </item>
  </channel>
</rss>"#;

    #[tokio::test]
    async fn fetches_items_in_feed_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/feed.xml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(SAMPLE_RSS, "application/rss+xml"),
            )
            .mount(&server)
            .await;

        let source = RssFeedSource::default();
        let items = source
            .fetch_items(&format!("{}/feed.xml", server.uri()))
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "First article");
        assert_eq!(items[0].link, "https://example.com/first");
        assert_eq!(items[0].summary.as_deref(), Some("First summary"));
        assert_eq!(items[1].title, "Second article");
    }

    #[tokio::test]
    async fn http_error_surfaces_with_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/feed.xml"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let source = RssFeedSource::default();
        let result = source.fetch_items(&format!("{}/feed.xml", server.uri())).await;

        assert!(matches!(result, Err(FeedError::Http(404))));
    }

    #[tokio::test]
    async fn unparseable_body_is_a_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/feed.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not a feed"))
            .mount(&server)
            .await;

        let source = RssFeedSource::default();
        let result = source.fetch_items(&format!("{}/feed.xml", server.uri())).await;

        assert!(matches!(result, Err(FeedError::Parse(_))));
    }
}

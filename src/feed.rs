use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use tracing::info;

use crate::error::PlanetError;

/// A fetched feed document, reduced to what the ranker reads.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFeed {
    pub title: String,
    pub link: String,
    pub items: Vec<RawItem>,
}

/// One feed item with its publication date still in textual form.
///
/// Title and link are only required of items that make the per-source cap,
/// so they stay optional here.
#[derive(Debug, Clone, PartialEq)]
pub struct RawItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub published: String,
}

impl SourceFeed {
    /// Parse an RSS 2.0 channel. Feed title and link, and each item's
    /// `pubDate`, must be present.
    pub fn parse(source_id: &str, bytes: &[u8]) -> Result<Self, PlanetError> {
        let channel = rss::Channel::read_from(bytes).map_err(|source| PlanetError::Parse {
            source_id: source_id.to_string(),
            source,
        })?;

        let missing = |field| PlanetError::MissingField {
            source_id: source_id.to_string(),
            field,
        };

        let title = non_empty(Some(channel.title())).ok_or_else(|| missing("feed title"))?;
        let link = non_empty(Some(channel.link())).ok_or_else(|| missing("feed link"))?;

        let items = channel
            .items()
            .iter()
            .map(|item| -> Result<RawItem, PlanetError> {
                Ok(RawItem {
                    title: item.title().map(str::to_string),
                    link: non_empty(item.link()),
                    published: non_empty(item.pub_date())
                        .ok_or_else(|| missing("item pubDate"))?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { title, link, items })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Anything that can turn a source identifier into a [`SourceFeed`].
pub trait FeedSource {
    fn fetch(&self, source_id: &str)
        -> impl Future<Output = Result<SourceFeed, PlanetError>> + Send;
}

/// Fetches feeds over HTTP(S), or from the local filesystem for any
/// identifier that is not an HTTP URL.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self, PlanetError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("planet-digest/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(PlanetError::Client)?;

        Ok(Self { client })
    }

    async fn read_source(&self, source_id: &str) -> Result<Vec<u8>, PlanetError> {
        if is_http(source_id) {
            let http_err = |source| PlanetError::Http {
                url: source_id.to_string(),
                source,
            };
            let response = self
                .client
                .get(source_id)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(http_err)?;
            let bytes = response.bytes().await.map_err(http_err)?;
            return Ok(bytes.to_vec());
        }

        let path = local_path(source_id);
        tokio::fs::read(&path)
            .await
            .map_err(|source| PlanetError::Io { path, source })
    }
}

impl FeedSource for Fetcher {
    async fn fetch(&self, source_id: &str) -> Result<SourceFeed, PlanetError> {
        info!("Fetching feed: {}", source_id);

        let bytes = self.read_source(source_id).await?;
        let feed = SourceFeed::parse(source_id, &bytes)?;

        info!("Fetched {} items from '{}'", feed.items.len(), feed.title);
        Ok(feed)
    }
}

fn is_http(source_id: &str) -> bool {
    source_id.starts_with("http://") || source_id.starts_with("https://")
}

fn local_path(source_id: &str) -> PathBuf {
    PathBuf::from(source_id.strip_prefix("file://").unwrap_or(source_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
        <rss version="2.0">
            <channel>
                <title>Tech Blog</title>
                <link>https://blog.example.com</link>
                <description>Posts</description>
                <item>
                    <title>Second Post</title>
                    <link>https://blog.example.com/2</link>
                    <pubDate>Tue, 02 Jan 2024 10:00:00 +0100</pubDate>
                </item>
                <item>
                    <title>First Post</title>
                    <link>https://blog.example.com/1</link>
                    <pubDate>Mon, 01 Jan 2024 09:00:00 +0000</pubDate>
                </item>
            </channel>
        </rss>
    "#;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_parse_channel() {
            let feed = SourceFeed::parse("blog", RSS.as_bytes()).unwrap();

            assert_eq!(feed.title, "Tech Blog");
            assert_eq!(feed.link, "https://blog.example.com");
            assert_eq!(feed.items.len(), 2);
            assert_eq!(
                feed.items[0],
                RawItem {
                    title: Some("Second Post".to_string()),
                    link: Some("https://blog.example.com/2".to_string()),
                    published: "Tue, 02 Jan 2024 10:00:00 +0100".to_string(),
                }
            );
        }

        #[test]
        fn test_parse_keeps_raw_date_text() {
            let feed = SourceFeed::parse("blog", RSS.as_bytes()).unwrap();
            assert_eq!(feed.items[1].published, "Mon, 01 Jan 2024 09:00:00 +0000");
        }

        #[test]
        fn test_parse_empty_channel() {
            let xml = r#"<rss version="2.0"><channel>
                <title>Quiet</title><link>https://quiet.example.com</link>
                <description></description>
            </channel></rss>"#;

            let feed = SourceFeed::parse("quiet", xml.as_bytes()).unwrap();
            assert!(feed.items.is_empty());
        }

        #[test]
        fn test_parse_missing_feed_title() {
            let xml = r#"<rss version="2.0"><channel>
                <link>https://blog.example.com</link>
                <description></description>
            </channel></rss>"#;

            let err = SourceFeed::parse("blog", xml.as_bytes()).unwrap_err();
            assert!(matches!(
                err,
                PlanetError::MissingField { field: "feed title", .. } | PlanetError::Parse { .. }
            ));
        }

        #[test]
        fn test_parse_missing_item_date() {
            let xml = r#"<rss version="2.0"><channel>
                <title>Blog</title><link>https://blog.example.com</link>
                <description></description>
                <item><title>Undated</title><link>https://blog.example.com/u</link></item>
            </channel></rss>"#;

            let err = SourceFeed::parse("blog", xml.as_bytes()).unwrap_err();
            assert!(matches!(
                err,
                PlanetError::MissingField { field: "item pubDate", .. }
            ));
        }

        #[test]
        fn test_parse_allows_missing_item_link() {
            let xml = r#"<rss version="2.0"><channel>
                <title>Blog</title><link>https://blog.example.com</link>
                <description></description>
                <item><title>Linkless</title><pubDate>Mon, 01 Jan 2024 09:00:00 +0000</pubDate></item>
            </channel></rss>"#;

            let feed = SourceFeed::parse("blog", xml.as_bytes()).unwrap();
            assert_eq!(feed.items[0].title.as_deref(), Some("Linkless"));
            assert_eq!(feed.items[0].link, None);
        }

        #[test]
        fn test_parse_not_rss() {
            let err = SourceFeed::parse("junk", b"this is not xml at all").unwrap_err();
            assert!(matches!(err, PlanetError::Parse { .. }));
        }
    }

    mod source_tests {
        use super::*;

        #[test]
        fn test_is_http() {
            assert!(is_http("https://blog.example.com/feed"));
            assert!(is_http("http://blog.example.com/feed"));
            assert!(!is_http("file:///tmp/feed.xml"));
            assert!(!is_http("feeds/local.xml"));
        }

        #[test]
        fn test_local_path_strips_file_scheme() {
            assert_eq!(
                local_path("file:///tmp/feed.xml"),
                PathBuf::from("/tmp/feed.xml")
            );
            assert_eq!(local_path("feeds/a.xml"), PathBuf::from("feeds/a.xml"));
        }

        #[tokio::test]
        async fn test_fetch_local_file() {
            let mut temp_file = NamedTempFile::new().unwrap();
            temp_file.write_all(RSS.as_bytes()).unwrap();

            let fetcher = Fetcher::new(Duration::from_secs(5)).unwrap();
            let source_id = format!("file://{}", temp_file.path().display());
            let feed = fetcher.fetch(&source_id).await.unwrap();

            assert_eq!(feed.title, "Tech Blog");
            assert_eq!(feed.items.len(), 2);
        }

        #[tokio::test]
        async fn test_fetch_missing_local_file() {
            let fetcher = Fetcher::new(Duration::from_secs(5)).unwrap();
            let err = fetcher.fetch("/nonexistent/feed.xml").await.unwrap_err();
            assert!(matches!(err, PlanetError::Io { .. }));
        }
    }
}

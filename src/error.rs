use std::path::PathBuf;

/// Errors raised while collecting, ranking and rendering a digest.
///
/// Every variant is fatal to a run under the default failure policy.
#[derive(Debug, thiserror::Error)]
pub enum PlanetError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to fetch '{url}': {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse feed '{source_id}': {source}")]
    Parse {
        source_id: String,
        #[source]
        source: rss::Error,
    },

    #[error("feed '{source_id}' is missing {field}")]
    MissingField {
        source_id: String,
        field: &'static str,
    },

    #[error("invalid publication date '{value}': {source}")]
    Date {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("failed to render digest: {0}")]
    Render(#[from] askama::Error),
}

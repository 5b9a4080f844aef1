use std::time::Duration;

use anyhow::Context;
use tracing::info;

use crate::config::Config;
use crate::error::PlanetError;
use crate::feed::{FeedSource, Fetcher};
use crate::ranker::{rank, RankOptions};
use crate::render::{render_header, render_table};

/// Rank the configured feeds and render the full Markdown document.
pub async fn build<S: FeedSource>(config: &Config, source: &S) -> Result<String, PlanetError> {
    let options = RankOptions {
        limit: config.num_items,
        skip_title: config.skip_title(),
        on_fetch_error: config.on_fetch_error,
    };
    let ranked = rank(source, &config.feeds, &options).await?;

    let page = &config.page;
    let mut document = render_header(
        &page.title,
        &page.author,
        &page.menu,
        &page.weight.to_string(),
        &page.icon,
    )?;
    document.push_str(&render_table(&ranked)?);
    Ok(document)
}

/// Fetch the configured feeds over the network or filesystem and render
/// the document.
pub async fn compose(config: &Config) -> anyhow::Result<String> {
    let fetcher = Fetcher::new(Duration::from_secs(config.request_timeout_secs))?;
    Ok(build(config, &fetcher).await?)
}

/// Build the digest and write it to `config.output_file`.
///
/// Nothing is written unless ranking and rendering both succeed.
pub async fn generate(config: &Config) -> anyhow::Result<()> {
    let document = compose(config).await?;

    let output = &config.output_file;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create '{}'", parent.display()))?;
    }
    tokio::fs::write(output, document)
        .await
        .with_context(|| format!("failed to write '{}'", output.display()))?;

    info!(
        "Markdown file '{}' has been generated with the latest {} items",
        output.display(),
        config.num_items
    );
    Ok(())
}

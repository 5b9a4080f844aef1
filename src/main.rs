use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use planet_digest::config::Config;
use planet_digest::digest;

/// Merge the latest entries of several feeds into one Markdown page.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the TOML configuration
    #[arg(short, long, default_value = "planet.toml")]
    config: PathBuf,

    /// Print the page to stdout instead of writing `output_file`
    #[arg(long)]
    stdout: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planet_digest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;
    info!(
        "Loaded {} feeds from {}",
        config.feeds.len(),
        cli.config.display()
    );

    if cli.stdout {
        let document = digest::compose(&config).await?;
        print!("{}", document);
        return Ok(());
    }

    digest::generate(&config).await
}

//! Command line tool to generate a CheerLights tweet.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use serde_json::json;
use tokio::time::{sleep, Duration};
use tracing::{error, info};

use cheerlights_tweeter::logging::init_logging;
use cheerlights_tweeter::poster::Poster;
use cheerlights_tweeter::template::TemplateRenderer;
use cheerlights_tweeter::twitter::{ApiVersion, ConnectionSettings, PostingClient};
use cheerlights_tweeter::{Colour, TweeterError};

/// Generate a CheerLights tweet
#[derive(Parser)]
#[command(name = "cheerlights")]
#[command(about = "Generate a CheerLights tweet")]
#[command(version)]
struct Cli {
    /// Colour to tweet
    #[arg(value_enum)]
    colour: Colour,

    /// Show all the logging information in the console
    #[arg(short, long)]
    verbose: bool,

    /// Make the connection to twitter but suppress any status update,
    /// useful for testing
    #[arg(short, long)]
    suppress_tweeting: bool,

    /// Do not connect to the twitter API, useful for testing
    #[arg(short = 'c', long)]
    suppress_connection: bool,

    /// Generate the user access token via a web confirmation
    #[arg(short, long)]
    generate_access: bool,

    /// Destroy (delete) the tweet created, useful in testing
    #[arg(short, long)]
    destroy_tweet: bool,

    /// Directory holding the twitter credential files
    #[arg(long, default_value = ".")]
    key_path: PathBuf,

    /// Which twitter API generation to use
    #[arg(long, value_enum, default_value_t = ApiVersion::V1)]
    twitter_api_version: ApiVersion,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("{e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), TweeterError> {
    let mut settings = ConnectionSettings::new(cli.key_path);
    settings.api_version = cli.twitter_api_version;
    settings.suppress_tweeting = cli.suppress_tweeting;
    settings.suppress_connection = cli.suppress_connection;
    settings.generate_access = cli.generate_access;

    let renderer = TemplateRenderer::new(None, serde_json::Map::new())?;
    let mut poster = Poster::new(PostingClient::new(settings), renderer);

    poster.connect().await?;
    let sent = poster.post_colour(&json!(cli.colour.name()), None).await?;

    // With no suppression in play a missing id means the tweet failed.
    if !(cli.suppress_connection || cli.suppress_tweeting) {
        let id = sent.ok_or(TweeterError::PostFailed)?;
        if cli.destroy_tweet {
            info!(%id, "deleting tweet after a short delay");
            sleep(Duration::from_secs(10)).await;
            poster.delete(&id).await?;
        }
    }

    poster.disconnect();
    Ok(())
}

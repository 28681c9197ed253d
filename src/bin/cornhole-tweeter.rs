//! Tweet scoring plays from an MQTT-instrumented cornhole board.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::error;

use cheerlights_tweeter::cornhole::cornhole_renderer;
use cheerlights_tweeter::cornhole::mqtt::CornholeSubscriber;
use cheerlights_tweeter::logging::init_logging;
use cheerlights_tweeter::poster::Poster;
use cheerlights_tweeter::twitter::{ApiVersion, ConnectionSettings, PostingClient};
use cheerlights_tweeter::TweeterError;

/// Tweet cornhole game events published over MQTT
#[derive(Parser)]
#[command(name = "cornhole-tweeter")]
#[command(about = "Tweet cornhole game events published over MQTT")]
#[command(version)]
struct Cli {
    /// MQTT broker host
    #[arg(short = 'a', long, default_value = "localhost")]
    mqtt_server: String,

    /// MQTT broker port
    #[arg(short = 'p', long, default_value_t = 1883)]
    mqtt_port: u16,

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

    let poster = Poster::new(PostingClient::new(settings), cornhole_renderer());
    let mut subscriber = CornholeSubscriber::new(&cli.mqtt_server, cli.mqtt_port, poster);
    subscriber.run().await
}

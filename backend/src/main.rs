// FILENAME: src/main.rs
// DESCRIPTION: Entry point of the network builder backend. Loads the configuration,
//              installs the tracing subscriber and serves the HTTP API until Ctrl-C.

use network_builder::{api, config::Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    api::run(config).await
}

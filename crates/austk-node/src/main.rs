use tracing::info;
use tracing_subscriber::EnvFilter;

use austk_node::{Node, NodeConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,austk=debug")),
        )
        .init();

    info!("Starting austk node v{}", env!("CARGO_PKG_VERSION"));

    let config = NodeConfig::from_env();
    info!(
        artist = %config.artist_id,
        art_dir = %config.art_dir.display(),
        rest = format!("{}:{}", config.rest_host, config.rest_port),
        lnd = format!("{}:{}", config.lnd_host, config.lnd_rest_port),
        proxy = %config.tor_proxy,
        "Loaded configuration"
    );

    let node = Node::bootstrap(config).await?;
    node.run().await
}

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use austk_art::{ArtError, Artist, Peer, Pubkey};
use austk_lightning::{publish, LightningClient, LightningPublisher, LndRestClient, Publisher};
use austk_net::{sync_from_peers, TorHttpClient};
use austk_store::{CatalogStore, FileStore};

use crate::api::{build_router, AppState};
use crate::config::NodeConfig;

/// The composed node: store, publisher gateway, serve layer, sync loop.
pub struct Node {
    config: NodeConfig,
    store: Arc<FileStore>,
    publisher: Arc<LightningPublisher<LndRestClient>>,
}

impl Node {
    /// Wire up the node: scan the art directory, connect to lnd, adopt or
    /// check the identity pubkey, re-verify everything the scan loaded, and
    /// resolve the publishing artist record.
    pub async fn bootstrap(config: NodeConfig) -> anyhow::Result<Self> {
        if config.artist_id.is_empty() {
            anyhow::bail!("no artist configured; set AUSTK_ARTIST_ID");
        }

        let store = Arc::new(
            FileStore::open(&config.art_dir)
                .await
                .with_context(|| format!("open art directory {}", config.art_dir.display()))?,
        );

        let lnd = LndRestClient::connect(
            &config.lnd_host,
            config.lnd_rest_port,
            &config.tls_cert_path,
            &config.macaroon_path,
        )
        .await
        .context("connect to lnd")?;

        let node_pubkey = lnd.get_info().await.context("query lnd identity")?.identity_pubkey;
        if let Some(pinned) = &config.pubkey {
            if pinned != &node_pubkey {
                anyhow::bail!(ArtError::ConfigMismatch(format!(
                    "configured pubkey {} but lnd identity is {}",
                    pinned.short(),
                    node_pubkey.short()
                )));
            }
        }

        let artist = resolve_publishing_artist(store.as_ref(), &config, &node_pubkey)
            .await
            .context("resolve publishing artist")?;
        let publisher = Arc::new(LightningPublisher::new(lnd, artist));

        reverify_catalog(store.as_ref(), publisher.as_ref())
            .await
            .context("re-verify stored publications")?;

        Ok(Self {
            config,
            store,
            publisher,
        })
    }

    pub fn store(&self) -> &Arc<FileStore> {
        &self.store
    }

    pub fn publisher(&self) -> &Arc<LightningPublisher<LndRestClient>> {
        &self.publisher
    }

    /// Serve until interrupted: register peers, publish the local catalog,
    /// start the listener, run one startup sync pass, then wait for ctrl-c.
    pub async fn run(self) -> anyhow::Result<()> {
        let Node {
            config,
            store,
            publisher,
        } = self;

        if let Some(peer) = &config.peer {
            store.store_peer(&peer.to_peer()).await?;
            info!(peer = %peer, "Stored configured peer");
        }

        // advertise the live listener address under the node's own pubkey
        let self_pubkey = publisher.publishing_artist().pubkey.clone();
        store
            .store_peer(&Peer {
                pubkey: self_pubkey.clone(),
                host: config.rest_host.clone(),
                port: config.rest_port,
            })
            .await?;

        publish(store.as_ref(), publisher.as_ref())
            .await
            .context("publish local catalog")?;

        let state = AppState {
            store: store.clone(),
            publisher: publisher.clone(),
            price_bits: config.price_bits,
        };
        let router = build_router(state);
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.rest_port))
            .await
            .with_context(|| format!("bind :{}", config.rest_port))?;
        info!(
            host = %config.rest_host,
            port = config.rest_port,
            "Serving catalog"
        );

        let serve = tokio::spawn(async move { axum::serve(listener, router).await });

        startup_sync(store.as_ref(), publisher.as_ref(), &config, &self_pubkey).await;

        tokio::select! {
            result = serve => {
                let result = result.context("http server task")?;
                result.context("http server")?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received interrupt, shutting down");
            }
        }
        Ok(())
    }
}

async fn startup_sync(
    store: &dyn CatalogStore,
    publisher: &dyn Publisher,
    config: &NodeConfig,
    self_pubkey: &Pubkey,
) {
    let client = match TorHttpClient::with_proxy(&config.tor_proxy) {
        Ok(client) => client,
        Err(e) => {
            warn!(proxy = %config.tor_proxy, error = %e, "Skipping startup sync");
            return;
        }
    };
    match sync_from_peers(
        store,
        publisher,
        &client,
        self_pubkey,
        &config.rest_host,
        config.rest_port,
        None,
    )
    .await
    {
        Ok(report) => info!(
            synced = report.synced(),
            failed = report.failed(),
            "Startup sync finished"
        ),
        Err(e) => warn!(error = %e, "Startup sync failed"),
    }
}

/// Get or store the local artist record, keeping its name in step with the
/// config and its pubkey in step with the node identity. The pubkey is
/// append-only: a recorded key that differs from the node identity is fatal.
pub async fn resolve_publishing_artist(
    store: &dyn CatalogStore,
    config: &NodeConfig,
    node_pubkey: &Pubkey,
) -> Result<Artist, ArtError> {
    match store.artist(&config.artist_id).await {
        Ok(mut artist) => {
            if !artist.pubkey.is_empty() && &artist.pubkey != node_pubkey {
                return Err(ArtError::ConfigMismatch(format!(
                    "artist {} is recorded with pubkey {} but the node identity is {}",
                    artist.artist_id,
                    artist.pubkey.short(),
                    node_pubkey.short()
                )));
            }
            let mut changed = false;
            if artist.pubkey.is_empty() {
                artist.pubkey = node_pubkey.clone();
                changed = true;
            }
            if !config.artist_name.is_empty() && artist.name != config.artist_name {
                info!(
                    artist = %artist.artist_id,
                    from = %artist.name,
                    to = %config.artist_name,
                    "Updating artist name from config"
                );
                artist.name = config.artist_name.clone();
                changed = true;
            }
            if changed {
                store.store_artist(&artist).await?;
            }
            Ok(artist)
        }
        Err(ArtError::NotFound(_)) => {
            let artist = Artist {
                artist_id: config.artist_id.clone(),
                name: config.artist_name.clone(),
                pubkey: node_pubkey.clone(),
            };
            store.store_artist(&artist).await?;
            info!(artist = %artist.artist_id, "Stored publishing artist");
            Ok(artist)
        }
        Err(e) => Err(e),
    }
}

/// Cryptographically re-verify every publication the startup scan loaded.
/// The scan only checks structure; this closes the gap before the node
/// serves anything. An invalid signature on disk means the tree was
/// tampered with or corrupted, and the node refuses to serve it.
pub async fn reverify_catalog(
    store: &dyn CatalogStore,
    publisher: &dyn Publisher,
) -> Result<(), ArtError> {
    for publication in store.publications().await? {
        publisher.verify(&publication).await.map_err(|e| {
            ArtError::StorageCorruption(format!(
                "stored publication for artist {} failed verification: {e}",
                publication.artist.artist_id
            ))
        })?;
    }
    Ok(())
}

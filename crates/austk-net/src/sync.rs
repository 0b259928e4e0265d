use async_trait::async_trait;
use tracing::{debug, info, warn};

use austk_art::{ArtError, Invoice, Peer, Pubkey};
use austk_lightning::{validate_foreign, Publisher};
use austk_store::CatalogStore;

use crate::onion::OnionClient;

/// External settlement of an invoice: pay the bolt11 request and return the
/// 32-byte preimage. In production this is a human operator or a wallet
/// integration; tests settle against the mock node.
#[async_trait]
pub trait PaymentAgent: Send + Sync {
    async fn settle(&self, invoice: &Invoice) -> Result<Vec<u8>, ArtError>;
}

/// What one sync pass did, per peer and in total.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub outcomes: Vec<SyncOutcome>,
    pub tracks_downloaded: usize,
}

#[derive(Debug)]
pub struct SyncOutcome {
    pub peer: Peer,
    pub result: Result<(), ArtError>,
}

impl SyncReport {
    pub fn synced(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.synced()
    }
}

/// One pass over every peer the store knows: fetch the peer's publication,
/// verify it, merge it, and optionally buy and download its tracks.
///
/// The self-peer is skipped, matched by pubkey and also by listener address
/// since the node may appear under both. A failure with one peer is logged
/// and isolated; the loop continues with the next. Within one peer session
/// the publication is stored before any payload download, so every payload
/// lands under an already-known track.
pub async fn sync_from_peers(
    store: &dyn CatalogStore,
    publisher: &dyn Publisher,
    client: &dyn OnionClient,
    self_pubkey: &Pubkey,
    listen_host: &str,
    listen_port: u16,
    agent: Option<&dyn PaymentAgent>,
) -> Result<SyncReport, ArtError> {
    let mut report = SyncReport::default();

    for (pubkey, peer) in store.peers().await? {
        if &pubkey == self_pubkey || (peer.host == listen_host && peer.port == listen_port) {
            debug!(peer = %pubkey.short(), "Skipping self peer");
            continue;
        }

        let result = sync_one_peer(store, publisher, client, &peer, agent, &mut report).await;
        if let Err(err) = &result {
            warn!(
                peer = %pubkey.short(),
                address = %peer.address(),
                error = %err,
                "Peer sync failed, continuing with next peer"
            );
        }
        report.outcomes.push(SyncOutcome { peer, result });
    }

    info!(
        synced = report.synced(),
        failed = report.failed(),
        downloaded = report.tracks_downloaded,
        "Peer sync pass finished"
    );
    Ok(report)
}

async fn sync_one_peer(
    store: &dyn CatalogStore,
    publisher: &dyn Publisher,
    client: &dyn OnionClient,
    peer: &Peer,
    agent: Option<&dyn PaymentAgent>,
    report: &mut SyncReport,
) -> Result<(), ArtError> {
    let address = peer.address();
    let publication = client.fetch_catalog(&address).await?;
    let resources = validate_foreign(&publication, publisher).await?;
    store.store_publication(&publication).await?;
    info!(
        peer = %peer.pubkey.short(),
        artists = resources.artists.len(),
        tracks = resources.tracks.len(),
        "Merged peer catalog"
    );

    let Some(agent) = agent else {
        return Ok(());
    };

    for track in &resources.tracks {
        let path = store.track_file_path(track)?;
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            continue;
        }
        match buy_and_download(store, client, agent, &address, track).await {
            Ok(()) => report.tracks_downloaded += 1,
            Err(err) => {
                // one failed purchase should not end the session
                warn!(
                    track = %track.full_id(),
                    peer = %peer.pubkey.short(),
                    error = %err,
                    "Track download failed"
                );
            }
        }
    }
    Ok(())
}

async fn buy_and_download(
    store: &dyn CatalogStore,
    client: &dyn OnionClient,
    agent: &dyn PaymentAgent,
    address: &str,
    track: &austk_art::Track,
) -> Result<(), ArtError> {
    let invoice = client
        .fetch_invoice(address, &track.artist_id, &track.artist_track_id)
        .await?;
    let preimage = agent.settle(&invoice).await?;
    let payload = client
        .fetch_track(address, &track.artist_id, &track.artist_track_id, &preimage)
        .await?;
    store.store_track_payload(track, &payload).await?;
    debug!(track = %track.full_id(), bytes = payload.len(), "Downloaded track");
    Ok(())
}

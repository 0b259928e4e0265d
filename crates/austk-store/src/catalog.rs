use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;

use austk_art::{
    Album, ArtError, Artist, ArtistPublication, Invoice, PaymentHash, Peer, Pubkey, Track,
};

/// Capability interface over a node's catalog.
///
/// The file-backed [`FileStore`](crate::FileStore) is the canonical
/// implementation; tests swap in in-memory ones. Lookups return
/// `ArtError::NotFound` rather than options so callers can propagate the kind
/// straight to the HTTP layer or the sync loop.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn store_artist(&self, artist: &Artist) -> Result<(), ArtError>;
    async fn artist(&self, artist_id: &str) -> Result<Artist, ArtError>;
    async fn artists(&self) -> Result<HashMap<String, Artist>, ArtError>;

    async fn store_album(&self, album: &Album) -> Result<(), ArtError>;
    async fn albums(&self, artist_id: &str) -> Result<HashMap<String, Album>, ArtError>;

    async fn store_track(&self, track: &Track) -> Result<(), ArtError>;
    async fn track(&self, artist_id: &str, artist_track_id: &str) -> Result<Track, ArtError>;
    async fn tracks(&self, artist_id: &str) -> Result<HashMap<String, Track>, ArtError>;
    async fn album_tracks(
        &self,
        artist_id: &str,
        artist_album_id: &str,
    ) -> Result<HashMap<u32, Track>, ArtError>;

    async fn store_track_payload(&self, track: &Track, payload: &[u8]) -> Result<(), ArtError>;

    /// Path of the track's payload file, validated to stay inside the store
    /// root. Does not check that the file exists.
    fn track_file_path(&self, track: &Track) -> Result<PathBuf, ArtError>;

    async fn store_peer(&self, peer: &Peer) -> Result<(), ArtError>;
    async fn peer(&self, pubkey: &Pubkey) -> Result<Peer, ArtError>;
    async fn peers(&self) -> Result<HashMap<Pubkey, Peer>, ArtError>;

    async fn store_invoice(&self, invoice: &Invoice) -> Result<(), ArtError>;
    async fn invoice(&self, payment_hash: &PaymentHash) -> Result<Invoice, ArtError>;

    /// Merge a verified publication: persist its `.art`/`.pub` pair and
    /// re-index every contained entity.
    async fn store_publication(&self, publication: &ArtistPublication) -> Result<(), ArtError>;

    /// Every publication currently held, local and foreign.
    async fn publications(&self) -> Result<Vec<ArtistPublication>, ArtError>;
}

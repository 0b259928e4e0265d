use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use austk_art::constants::{ART_FILE_NAME, PUB_FILE_EXT, PUBKEY_SIZE, TRACK_FILE_EXT};
use austk_art::{
    Album, ArtError, Artist, ArtistPublication, Invoice, PaymentHash, Peer, Pubkey, Track,
};

use crate::catalog::CatalogStore;

#[derive(Default, Debug)]
struct CatalogIndex {
    artists: HashMap<String, Artist>,
    // albums indexed by artist id, then by album id
    albums: HashMap<String, HashMap<String, Album>>,
    // tracks indexed by artist id, then by track id
    tracks: HashMap<String, HashMap<String, Track>>,
    // tracks indexed by artist id, then album id, then album track number
    album_tracks: HashMap<String, HashMap<String, HashMap<u32, Track>>>,
    peers: HashMap<Pubkey, Peer>,
    invoices: HashMap<PaymentHash, Invoice>,
    // signed envelopes by publishing artist id
    publications: HashMap<String, ArtistPublication>,
}

impl CatalogIndex {
    fn insert_track(&mut self, track: Track) {
        if track.in_album() {
            self.album_tracks
                .entry(track.artist_id.clone())
                .or_default()
                .entry(track.artist_album_id.clone())
                .or_default()
                .insert(track.album_track_number, track.clone());
        }
        self.tracks
            .entry(track.artist_id.clone())
            .or_default()
            .insert(track.artist_track_id.clone(), track);
    }

    /// Re-index every entity of a publication. The signing artist must
    /// already have passed the pubkey conflict check; contained foreign
    /// artists that conflict are skipped together with their albums and
    /// tracks.
    fn merge_publication(&mut self, publication: &ArtistPublication) -> Result<(), ArtError> {
        let resources = publication.resources()?;

        let mut rejected: Vec<&str> = Vec::new();
        for artist in &resources.artists {
            match self.artists.get(&artist.artist_id) {
                Some(known)
                    if !known.pubkey.is_empty() && known.pubkey != artist.pubkey =>
                {
                    warn!(
                        artist = %artist.artist_id,
                        known = %known.pubkey.short(),
                        offered = %artist.pubkey.short(),
                        "Skipping artist entry with conflicting pubkey"
                    );
                    rejected.push(&artist.artist_id);
                }
                _ => {
                    self.artists.insert(artist.artist_id.clone(), artist.clone());
                }
            }
        }

        for album in &resources.albums {
            if rejected.contains(&album.artist_id.as_str()) {
                continue;
            }
            self.albums
                .entry(album.artist_id.clone())
                .or_default()
                .insert(album.artist_album_id.clone(), album.clone());
        }

        for track in &resources.tracks {
            if rejected.contains(&track.artist_id.as_str()) {
                continue;
            }
            self.insert_track(track.clone());
        }

        for peer in &resources.peers {
            self.peers.insert(peer.pubkey.clone(), peer.clone());
        }

        self.publications
            .insert(publication.artist.artist_id.clone(), publication.clone());
        Ok(())
    }
}

/// Catalog store rooted at a directory tree.
///
/// Layout under the root: `<artist>/.art` (raw serialized resources),
/// `<artist>/<pubkey>.pub` (signed envelope), and `<artist>/<track>.mp3`
/// payloads, where the track id may contain slashes. The in-memory index is
/// rebuilt by walking the tree at startup.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    index: RwLock<CatalogIndex>,
    // serializes .art/.pub writes per artist so the on-disk pair always
    // matches the last stored publication
    artist_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    // serializes concurrent writes of one payload file
    payload_locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl FileStore {
    /// Open a store over `root`, creating the directory if needed and
    /// hydrating the index from whatever the tree already holds.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, ArtError> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            ArtError::TransientIo(format!("create art directory {}: {e}", root.display()))
        })?;

        let store = Self {
            root: root.clone(),
            index: RwLock::new(CatalogIndex::default()),
            artist_locks: Mutex::new(HashMap::new()),
            payload_locks: Mutex::new(HashMap::new()),
        };
        store.scan().await?;

        let index = store.index.read().await;
        info!(
            root = %root.display(),
            artists = index.artists.len(),
            publications = index.publications.len(),
            "Art directory scanned"
        );
        drop(index);

        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the root directory. Each top-level directory is an artist; its
    /// `.pub` envelope is merged first so payload files land under known
    /// tracks. Unexpected path shapes are logged and skipped; a corrupt
    /// `.pub` aborts the scan.
    async fn scan(&self) -> Result<(), ArtError> {
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !file_type.is_dir() {
                warn!(file = %name, "Skipping non-artist file at art root");
                continue;
            }
            if !is_valid_id_segment(&name) {
                warn!(dir = %name, "Skipping directory that is not a valid artist id");
                continue;
            }
            self.scan_artist_dir(&name, &entry.path()).await?;
        }
        Ok(())
    }

    async fn scan_artist_dir(&self, artist_id: &str, dir: &Path) -> Result<(), ArtError> {
        let mut publication_files = Vec::new();
        let mut payload_files = Vec::new();

        let mut pending = vec![dir.to_path_buf()];
        while let Some(current) = pending.pop() {
            let mut entries = fs::read_dir(&current).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                    continue;
                }
                let name = entry.file_name().to_string_lossy().into_owned();
                if path.parent() == Some(dir) && name == ART_FILE_NAME {
                    // companion of the .pub envelope; the envelope is canonical
                    continue;
                }
                if path.parent() == Some(dir) && is_pub_file_name(&name) {
                    publication_files.push(path);
                    continue;
                }
                if path.extension().and_then(|e| e.to_str()) == Some(TRACK_FILE_EXT) {
                    payload_files.push(path);
                    continue;
                }
                warn!(file = %path.display(), "Skipping unknown file in artist directory");
            }
        }

        for path in publication_files {
            let data = fs::read(&path).await?;
            let publication = ArtistPublication::from_bytes(&data).map_err(|e| {
                ArtError::StorageCorruption(format!("bad publication {}: {e}", path.display()))
            })?;
            if publication.artist.artist_id != artist_id {
                return Err(ArtError::StorageCorruption(format!(
                    "publication {} names artist {} but lives under {}",
                    path.display(),
                    publication.artist.artist_id,
                    artist_id
                )));
            }
            let mut index = self.index.write().await;
            index.merge_publication(&publication)?;
            debug!(artist = %artist_id, file = %path.display(), "Loaded publication");
        }

        for path in payload_files {
            self.register_payload(artist_id, dir, &path).await?;
        }
        Ok(())
    }

    /// Validate a payload file found by the scan and make sure the index
    /// knows its track. A payload without a published track entry registers
    /// a draft so the index covers everything on disk.
    async fn register_payload(
        &self,
        artist_id: &str,
        artist_dir: &Path,
        path: &Path,
    ) -> Result<(), ArtError> {
        let relative = match path.strip_prefix(artist_dir) {
            Ok(rel) => rel,
            Err(_) => {
                warn!(file = %path.display(), "Skipping payload outside its artist directory");
                return Ok(());
            }
        };
        let rel_str = relative.to_string_lossy();
        let Some(track_id) = rel_str.strip_suffix(&format!(".{TRACK_FILE_EXT}")) else {
            return Ok(());
        };
        if !track_id.split('/').all(is_valid_id_segment) {
            warn!(file = %path.display(), "Skipping payload with invalid track id");
            return Ok(());
        }

        let mut index = self.index.write().await;
        let known = index
            .tracks
            .get(artist_id)
            .is_some_and(|tracks| tracks.contains_key(track_id));
        if !known {
            let title = track_id.rsplit('/').next().unwrap_or(track_id).to_string();
            debug!(artist = %artist_id, track = %track_id, "Registering draft track for payload");
            index.insert_track(Track {
                artist_id: artist_id.to_string(),
                artist_album_id: String::new(),
                artist_track_id: track_id.to_string(),
                album_track_number: 0,
                title,
            });
        }
        Ok(())
    }

    async fn artist_lock(&self, artist_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.artist_locks.lock().await;
        locks
            .entry(artist_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn payload_lock(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.payload_locks.lock().await;
        locks
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn artist_dir(&self, artist_id: &str) -> Result<PathBuf, ArtError> {
        if !is_valid_id_segment(artist_id) {
            return Err(ArtError::StorageCorruption(format!(
                "unsafe artist id: {artist_id:?}"
            )));
        }
        Ok(self.root.join(artist_id))
    }

    fn art_path(&self, artist_id: &str) -> Result<PathBuf, ArtError> {
        Ok(self.artist_dir(artist_id)?.join(ART_FILE_NAME))
    }

    fn publication_path(&self, artist: &Artist) -> Result<PathBuf, ArtError> {
        let file = format!("{}.{PUB_FILE_EXT}", artist.pubkey);
        Ok(self.artist_dir(&artist.artist_id)?.join(file))
    }
}

/// One `/`-free identifier segment: non-empty, `[a-z0-9.-]`, and not a dot
/// path. The normalizer's character class admits `.`, so `..` is expressible
/// and must be rejected here before it reaches a filesystem join.
fn is_valid_id_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '.' | '-'))
}

fn is_pub_file_name(name: &str) -> bool {
    name.strip_suffix(&format!(".{PUB_FILE_EXT}"))
        .is_some_and(|stem| {
            stem.len() == PUBKEY_SIZE * 2
                && stem.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
        })
}

async fn write_atomically(path: &Path, data: &[u8]) -> Result<(), ArtError> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, data).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl CatalogStore for FileStore {
    async fn store_artist(&self, artist: &Artist) -> Result<(), ArtError> {
        let mut index = self.index.write().await;
        if let Some(known) = index.artists.get(&artist.artist_id) {
            // pubkey is append-only: an empty draft may be filled in, a set
            // key never silently replaced
            if !known.pubkey.is_empty() && known.pubkey != artist.pubkey {
                return Err(ArtError::ConfigMismatch(format!(
                    "artist {} is bound to pubkey {}, refusing {}",
                    artist.artist_id,
                    known.pubkey.short(),
                    artist.pubkey.short()
                )));
            }
        }
        index.artists.insert(artist.artist_id.clone(), artist.clone());
        Ok(())
    }

    async fn artist(&self, artist_id: &str) -> Result<Artist, ArtError> {
        self.index
            .read()
            .await
            .artists
            .get(artist_id)
            .cloned()
            .ok_or_else(|| ArtError::not_found(format!("artist {artist_id}")))
    }

    async fn artists(&self) -> Result<HashMap<String, Artist>, ArtError> {
        Ok(self.index.read().await.artists.clone())
    }

    async fn store_album(&self, album: &Album) -> Result<(), ArtError> {
        let mut index = self.index.write().await;
        index
            .albums
            .entry(album.artist_id.clone())
            .or_default()
            .insert(album.artist_album_id.clone(), album.clone());
        Ok(())
    }

    async fn albums(&self, artist_id: &str) -> Result<HashMap<String, Album>, ArtError> {
        Ok(self
            .index
            .read()
            .await
            .albums
            .get(artist_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn store_track(&self, track: &Track) -> Result<(), ArtError> {
        self.index.write().await.insert_track(track.clone());
        Ok(())
    }

    async fn track(&self, artist_id: &str, artist_track_id: &str) -> Result<Track, ArtError> {
        self.index
            .read()
            .await
            .tracks
            .get(artist_id)
            .and_then(|tracks| tracks.get(artist_track_id))
            .cloned()
            .ok_or_else(|| ArtError::not_found(format!("track {artist_id}/{artist_track_id}")))
    }

    async fn tracks(&self, artist_id: &str) -> Result<HashMap<String, Track>, ArtError> {
        Ok(self
            .index
            .read()
            .await
            .tracks
            .get(artist_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn album_tracks(
        &self,
        artist_id: &str,
        artist_album_id: &str,
    ) -> Result<HashMap<u32, Track>, ArtError> {
        self.index
            .read()
            .await
            .album_tracks
            .get(artist_id)
            .and_then(|albums| albums.get(artist_album_id))
            .cloned()
            .ok_or_else(|| ArtError::not_found(format!("album {artist_id}/{artist_album_id}")))
    }

    async fn store_track_payload(&self, track: &Track, payload: &[u8]) -> Result<(), ArtError> {
        let path = self.track_file_path(track)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let lock = self.payload_lock(&path).await;
        let _guard = lock.lock().await;
        fs::write(&path, payload).await?;
        debug!(
            track = %track.full_id(),
            bytes = payload.len(),
            file = %path.display(),
            "Stored track payload"
        );
        Ok(())
    }

    fn track_file_path(&self, track: &Track) -> Result<PathBuf, ArtError> {
        if !track.artist_track_id.split('/').all(is_valid_id_segment) {
            return Err(ArtError::StorageCorruption(format!(
                "unsafe track id: {:?}",
                track.artist_track_id
            )));
        }
        let path = self
            .artist_dir(&track.artist_id)?
            .join(format!("{}.{TRACK_FILE_EXT}", track.artist_track_id));
        if !path.starts_with(&self.root) {
            return Err(ArtError::StorageCorruption(format!(
                "track path escapes the art directory: {}",
                path.display()
            )));
        }
        Ok(path)
    }

    async fn store_peer(&self, peer: &Peer) -> Result<(), ArtError> {
        let mut index = self.index.write().await;
        index.peers.insert(peer.pubkey.clone(), peer.clone());
        Ok(())
    }

    async fn peer(&self, pubkey: &Pubkey) -> Result<Peer, ArtError> {
        self.index
            .read()
            .await
            .peers
            .get(pubkey)
            .cloned()
            .ok_or_else(|| ArtError::not_found(format!("peer {}", pubkey.short())))
    }

    async fn peers(&self) -> Result<HashMap<Pubkey, Peer>, ArtError> {
        Ok(self.index.read().await.peers.clone())
    }

    async fn store_invoice(&self, invoice: &Invoice) -> Result<(), ArtError> {
        let mut index = self.index.write().await;
        index.invoices.insert(invoice.payment_hash, invoice.clone());
        Ok(())
    }

    async fn invoice(&self, payment_hash: &PaymentHash) -> Result<Invoice, ArtError> {
        self.index
            .read()
            .await
            .invoices
            .get(payment_hash)
            .cloned()
            .ok_or_else(|| ArtError::not_found(format!("invoice {payment_hash}")))
    }

    async fn store_publication(&self, publication: &ArtistPublication) -> Result<(), ArtError> {
        let artist = &publication.artist;

        // Reject before touching disk if the signer conflicts with a pubkey
        // this node already recorded for that artist id.
        {
            let index = self.index.read().await;
            if let Some(known) = index.artists.get(&artist.artist_id) {
                if !known.pubkey.is_empty() && known.pubkey != artist.pubkey {
                    return Err(ArtError::InvalidSignature(format!(
                        "artist {} is bound to pubkey {}, rejecting publication signed by {}",
                        artist.artist_id,
                        known.pubkey.short(),
                        artist.pubkey.short()
                    )));
                }
            }
        }

        let art_path = self.art_path(&artist.artist_id)?;
        let pub_path = self.publication_path(artist)?;

        let lock = self.artist_lock(&artist.artist_id).await;
        let _guard = lock.lock().await;

        fs::create_dir_all(self.artist_dir(&artist.artist_id)?).await?;
        write_atomically(&art_path, &publication.serialized_art_resources).await?;
        write_atomically(&pub_path, &publication.to_bytes()?).await?;

        // Read back what landed on disk; a mismatch means the node would
        // serve bytes the signature no longer covers.
        let written = fs::read(&art_path).await?;
        if written != publication.serialized_art_resources {
            return Err(ArtError::StorageCorruption(format!(
                "resources on disk diverge from signed bytes for artist {}",
                artist.artist_id
            )));
        }

        let mut index = self.index.write().await;
        index.merge_publication(publication)?;
        info!(
            artist = %artist.artist_id,
            pubkey = %artist.pubkey.short(),
            "Stored publication"
        );
        Ok(())
    }

    async fn publications(&self) -> Result<Vec<ArtistPublication>, ArtError> {
        Ok(self.index.read().await.publications.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn hexkey(fill: char) -> Pubkey {
        Pubkey::from_hex(&std::iter::repeat(fill).take(66).collect::<String>()).unwrap()
    }

    fn sample_artist(pubkey: Pubkey) -> Artist {
        Artist {
            artist_id: "aliceinchains".into(),
            name: "Alice In Chains".into(),
            pubkey,
        }
    }

    fn sample_track(track_id: &str) -> Track {
        Track {
            artist_id: "aliceinchains".into(),
            artist_album_id: "dirt".into(),
            artist_track_id: track_id.into(),
            album_track_number: 6,
            title: "Would?".into(),
        }
    }

    fn sample_publication(pubkey: Pubkey) -> ArtistPublication {
        let artist = sample_artist(pubkey);
        let resources = austk_art::ArtResources {
            artists: vec![artist.clone()],
            albums: vec![Album {
                artist_id: "aliceinchains".into(),
                artist_album_id: "dirt".into(),
                title: "Dirt".into(),
            }],
            tracks: vec![sample_track("dirt/would")],
            peers: vec![Peer {
                pubkey: artist.pubkey.clone(),
                host: "alice.onion".into(),
                port: 53545,
            }],
        };
        ArtistPublication {
            artist,
            signature: "unchecked-by-the-store".into(),
            serialized_art_resources: resources.to_bytes().unwrap(),
        }
    }

    async fn open_store(dir: &TempDir) -> FileStore {
        FileStore::open(dir.path()).await.unwrap()
    }

    #[tokio::test]
    async fn test_store_and_lookup_track() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        store.store_track(&sample_track("dirt/would")).await.unwrap();
        let track = store.track("aliceinchains", "dirt/would").await.unwrap();
        assert_eq!(track.title, "Would?");

        let by_number = store.album_tracks("aliceinchains", "dirt").await.unwrap();
        assert_eq!(by_number[&6].artist_track_id, "dirt/would");

        assert!(matches!(
            store.track("aliceinchains", "missing").await,
            Err(ArtError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_payload_roundtrip_creates_directories() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let track = sample_track("dirt/would");

        store.store_track_payload(&track, b"mp3-bytes").await.unwrap();
        let path = store.track_file_path(&track).unwrap();
        assert!(path.starts_with(dir.path()));
        assert_eq!(std::fs::read(path).unwrap(), b"mp3-bytes");
    }

    #[tokio::test]
    async fn test_track_path_traversal_rejected() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let mut track = sample_track("../../etc/passwd");
        assert!(store.track_file_path(&track).is_err());

        track.artist_track_id = "dirt/../../escape".into();
        assert!(store.track_file_path(&track).is_err());

        track.artist_track_id = "dirt/would".into();
        track.artist_id = "..".into();
        assert!(store.track_file_path(&track).is_err());
    }

    #[tokio::test]
    async fn test_publication_merge_and_rescan() {
        let dir = TempDir::new().unwrap();
        let publication = sample_publication(hexkey('a'));
        {
            let store = open_store(&dir).await;
            store.store_publication(&publication).await.unwrap();
            assert!(dir.path().join("aliceinchains/.art").exists());
            assert!(dir
                .path()
                .join(format!("aliceinchains/{}.pub", hexkey('a')))
                .exists());
        }

        // A fresh store over the same tree rebuilds the same index.
        let store = open_store(&dir).await;
        let artist = store.artist("aliceinchains").await.unwrap();
        assert_eq!(artist.pubkey, hexkey('a'));
        let track = store.track("aliceinchains", "dirt/would").await.unwrap();
        assert_eq!(track.title, "Would?");
        let peers = store.peers().await.unwrap();
        assert_eq!(peers.len(), 1);
        assert_eq!(store.publications().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_store_publication_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let publication = sample_publication(hexkey('a'));

        store.store_publication(&publication).await.unwrap();
        store.store_publication(&publication).await.unwrap();

        assert_eq!(store.artists().await.unwrap().len(), 1);
        assert_eq!(store.tracks("aliceinchains").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_conflicting_signer_pubkey_rejected() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        store.store_publication(&sample_publication(hexkey('a'))).await.unwrap();
        let err = store
            .store_publication(&sample_publication(hexkey('b')))
            .await
            .unwrap_err();
        assert!(matches!(err, ArtError::InvalidSignature(_)));

        // nothing overwritten
        let artist = store.artist("aliceinchains").await.unwrap();
        assert_eq!(artist.pubkey, hexkey('a'));
        assert!(!dir
            .path()
            .join(format!("aliceinchains/{}.pub", hexkey('b')))
            .exists());
    }

    #[tokio::test]
    async fn test_empty_draft_pubkey_may_be_filled() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        store.store_artist(&sample_artist(Pubkey::empty())).await.unwrap();
        store.store_artist(&sample_artist(hexkey('a'))).await.unwrap();
        let err = store.store_artist(&sample_artist(hexkey('b'))).await.unwrap_err();
        assert!(matches!(err, ArtError::ConfigMismatch(_)));
    }

    #[tokio::test]
    async fn test_corrupt_pub_file_aborts_scan() {
        let dir = TempDir::new().unwrap();
        let artist_dir = dir.path().join("aliceinchains");
        std::fs::create_dir_all(&artist_dir).unwrap();
        std::fs::write(
            artist_dir.join(format!("{}.pub", hexkey('a'))),
            b"not a publication",
        )
        .unwrap();

        let err = FileStore::open(dir.path()).await.unwrap_err();
        assert!(matches!(err, ArtError::StorageCorruption(_)));
    }

    #[tokio::test]
    async fn test_scan_registers_draft_for_orphan_payload() {
        let dir = TempDir::new().unwrap();
        let artist_dir = dir.path().join("aliceinchains/dirt");
        std::fs::create_dir_all(&artist_dir).unwrap();
        std::fs::write(artist_dir.join("would.mp3"), b"mp3-bytes").unwrap();

        let store = open_store(&dir).await;
        let track = store.track("aliceinchains", "dirt/would").await.unwrap();
        assert_eq!(track.title, "would");
    }

    #[tokio::test]
    async fn test_scan_skips_unknown_shapes() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("stray.txt"), b"noise").unwrap();
        let artist_dir = dir.path().join("aliceinchains");
        std::fs::create_dir_all(&artist_dir).unwrap();
        std::fs::write(artist_dir.join("notes.txt"), b"noise").unwrap();

        let store = open_store(&dir).await;
        assert!(store.artists().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invoice_storage() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let invoice = Invoice {
            artist_id: "aliceinchains".into(),
            bolt11_payment_request: "lnbc1".into(),
            payment_hash: PaymentHash([9u8; 32]),
            tracks: vec![sample_track("dirt/would")],
            amount: 10,
            amount_multiplier: austk_art::Bolt11AmountMultiplier::BitcoinBit,
        };

        store.store_invoice(&invoice).await.unwrap();
        let found = store.invoice(&PaymentHash([9u8; 32])).await.unwrap();
        assert_eq!(found, invoice);
        assert!(store.invoice(&PaymentHash([1u8; 32])).await.is_err());
    }
}

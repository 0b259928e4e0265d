use tracing::info;

use austk_art::{name_to_id, title_to_hierarchy, Album, ArtError, Artist, Pubkey, Track};
use austk_lightning::{publish, Publisher};
use austk_store::CatalogStore;

/// Import one recording into the catalog and republish.
///
/// Metadata comes from the caller (tag parsing and playback live outside the
/// node). Names are normalized into identifiers; a track with an album nests
/// its id under the album hierarchy, and a leading `NN.` prefix on the
/// normalized title becomes the album track number.
pub async fn ingest_track(
    store: &dyn CatalogStore,
    publisher: &dyn Publisher,
    artist_name: &str,
    track_title: &str,
    album_title: Option<&str>,
    payload: &[u8],
) -> Result<Track, ArtError> {
    let artist_id = name_to_id(artist_name);
    if artist_id.is_empty() {
        return Err(ArtError::ConfigMismatch(format!(
            "artist name {artist_name:?} normalizes to an empty id"
        )));
    }

    if store.artist(&artist_id).await.is_err() {
        // an ingest for an unknown artist starts as an unpublished draft;
        // the pubkey is adopted when that artist's node first publishes
        store
            .store_artist(&Artist {
                artist_id: artist_id.clone(),
                name: artist_name.to_string(),
                pubkey: Pubkey::empty(),
            })
            .await?;
    }

    let title_id = name_to_id(track_title);
    let (artist_album_id, artist_track_id) = match album_title {
        Some(album_title) => {
            let album_id = title_to_hierarchy(album_title);
            store
                .store_album(&Album {
                    artist_id: artist_id.clone(),
                    artist_album_id: album_id.clone(),
                    title: album_title.to_string(),
                })
                .await?;
            let track_id = format!("{album_id}/{title_id}");
            (album_id, track_id)
        }
        None => (String::new(), title_id.clone()),
    };

    let album_track_number = if artist_album_id.is_empty() {
        0
    } else {
        leading_track_number(&title_id)
    };

    let track = Track {
        artist_id: artist_id.clone(),
        artist_album_id,
        artist_track_id,
        album_track_number,
        title: track_title.to_string(),
    };
    store.store_track(&track).await?;
    store.store_track_payload(&track, payload).await?;

    publish(store, publisher).await?;
    info!(
        track = %track.full_id(),
        bytes = payload.len(),
        "Ingested track"
    );
    Ok(track)
}

/// `"01.wedieyoung"` orders as track 1; a title with no numeric prefix
/// stays unordered.
fn leading_track_number(title_id: &str) -> u32 {
    title_id
        .split_once('.')
        .and_then(|(prefix, _)| prefix.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use austk_lightning::{LightningPublisher, MockLightningNode};
    use austk_store::FileStore;
    use tempfile::TempDir;

    async fn node_fixture() -> (FileStore, LightningPublisher<Arc<MockLightningNode>>, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        let node = Arc::new(MockLightningNode::new());
        let artist = Artist {
            artist_id: "aliceinchains".into(),
            name: "Alice In Chains".into(),
            pubkey: node.pubkey(),
        };
        store.store_artist(&artist).await.unwrap();
        let publisher = LightningPublisher::new(node, artist);
        (store, publisher, dir)
    }

    #[tokio::test]
    async fn test_ingest_album_track() {
        let (store, publisher, dir) = node_fixture().await;

        let track = ingest_track(
            &store,
            &publisher,
            "Alice In Chains",
            "01. We Die Young",
            Some("Facelift"),
            b"mp3-bytes",
        )
        .await
        .unwrap();

        assert_eq!(track.artist_track_id, "facelift/01.wedieyoung");
        assert_eq!(track.album_track_number, 1);
        assert!(dir
            .path()
            .join("aliceinchains/facelift/01.wedieyoung.mp3")
            .exists());

        // ingest republishes the catalog
        assert_eq!(store.publications().await.unwrap().len(), 1);
        let albums = store.albums("aliceinchains").await.unwrap();
        assert_eq!(albums["facelift"].title, "Facelift");
    }

    #[tokio::test]
    async fn test_ingest_standalone_track() {
        let (store, publisher, _dir) = node_fixture().await;

        let track = ingest_track(
            &store,
            &publisher,
            "Alice In Chains",
            "Would?",
            None,
            b"mp3-bytes",
        )
        .await
        .unwrap();

        assert_eq!(track.artist_track_id, "would");
        assert_eq!(track.album_track_number, 0);
        assert!(track.artist_album_id.is_empty());
        assert!(store.track("aliceinchains", "would").await.is_ok());
    }

    #[tokio::test]
    async fn test_ingest_unknown_artist_creates_draft() {
        let (store, publisher, _dir) = node_fixture().await;

        // a guest artist's recording lands as a draft without a pubkey, but
        // publishing still signs as the node's own artist
        ingest_track(&store, &publisher, "Sound Garden", "Spoonman", None, b"mp3")
            .await
            .unwrap();

        let guest = store.artist("soundgarden").await.unwrap();
        assert!(guest.pubkey.is_empty());
    }
}

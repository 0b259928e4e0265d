// Publication protocol: package catalog snapshots into signed publications
// and validate foreign ones before they reach the store.

use tracing::info;

use austk_art::{ArtError, ArtResources, ArtistPublication};
use austk_store::CatalogStore;

use crate::gateway::Publisher;

/// Snapshot everything the store currently holds, sorted so the serialized
/// bytes are stable across collections of the same catalog.
pub async fn collect_resources(store: &dyn CatalogStore) -> Result<ArtResources, ArtError> {
    let mut resources = ArtResources::default();

    for (artist_id, artist) in store.artists().await? {
        resources.artists.push(artist);
        resources.albums.extend(store.albums(&artist_id).await?.into_values());
        resources.tracks.extend(store.tracks(&artist_id).await?.into_values());
    }
    resources.peers.extend(store.peers().await?.into_values());

    resources.sort();
    Ok(resources)
}

/// Collect, sign, and persist the local catalog. The node's own publication
/// is stored exactly like a peer's.
pub async fn publish(
    store: &dyn CatalogStore,
    publisher: &dyn Publisher,
) -> Result<ArtistPublication, ArtError> {
    let resources = collect_resources(store).await?;
    let publication = publisher.sign(&resources).await?;
    store.store_publication(&publication).await?;
    info!(
        artist = %publication.artist.artist_id,
        artists = resources.artists.len(),
        tracks = resources.tracks.len(),
        peers = resources.peers.len(),
        "Published catalog"
    );
    Ok(publication)
}

/// Pure deserialization of a publication's embedded resources.
pub fn read(publication: &ArtistPublication) -> Result<ArtResources, ArtError> {
    publication.resources()
}

/// Full verification path for a publication received over the wire. A
/// signature or signer mismatch is fatal for the publication and must not
/// reach the store.
pub async fn validate_foreign(
    publication: &ArtistPublication,
    publisher: &dyn Publisher,
) -> Result<ArtResources, ArtError> {
    publisher.verify(publication).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::LightningPublisher;
    use crate::mock::MockLightningNode;
    use austk_art::{Artist, Track};
    use austk_store::FileStore;
    use tempfile::TempDir;

    async fn seeded_store(publisher: &LightningPublisher<MockLightningNode>) -> (FileStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        store
            .store_artist(publisher.publishing_artist())
            .await
            .unwrap();
        store
            .store_track(&Track {
                artist_id: "aliceinchains".into(),
                artist_album_id: String::new(),
                artist_track_id: "dirt/would".into(),
                album_track_number: 0,
                title: "Would?".into(),
            })
            .await
            .unwrap();
        (store, dir)
    }

    fn publisher() -> LightningPublisher<MockLightningNode> {
        let node = MockLightningNode::new();
        let artist = Artist {
            artist_id: "aliceinchains".into(),
            name: "Alice In Chains".into(),
            pubkey: node.pubkey(),
        };
        LightningPublisher::new(node, artist)
    }

    #[tokio::test]
    async fn test_publish_roundtrip() {
        let publisher = publisher();
        let (store, _dir) = seeded_store(&publisher).await;

        let publication = publish(&store, &publisher).await.unwrap();
        assert_eq!(read(&publication).unwrap(), collect_resources(&store).await.unwrap());

        let validated = validate_foreign(&publication, &publisher).await.unwrap();
        assert_eq!(validated, read(&publication).unwrap());
        assert_eq!(store.publications().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_collect_is_deterministic() {
        let publisher = publisher();
        let (store, _dir) = seeded_store(&publisher).await;

        let first = collect_resources(&store).await.unwrap().to_bytes().unwrap();
        let second = collect_resources(&store).await.unwrap().to_bytes().unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_foreign_publication_with_swapped_artist_rejected() {
        let alice = publisher();
        let (store, _dir) = seeded_store(&alice).await;
        let mut publication = publish(&store, &alice).await.unwrap();

        // a peer relays the publication but claims a different signer
        publication.artist.pubkey = MockLightningNode::new().pubkey();
        let err = validate_foreign(&publication, &alice).await.unwrap_err();
        assert!(matches!(err, ArtError::InvalidSignature(_)));
    }
}

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use austk_art::constants::MAX_MEMO_BYTES;
use austk_art::{
    ArtError, ArtResources, Artist, ArtistPublication, Bolt11AmountMultiplier, Invoice, Pubkey,
    Track,
};

use crate::client::LightningClient;

/// Capability interface over the signing side of a node: identity, catalog
/// signing and verification, invoice minting.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn pubkey(&self) -> Result<Pubkey, ArtError>;

    /// Serialize `resources` and have the node sign those exact bytes.
    async fn sign(&self, resources: &ArtResources) -> Result<ArtistPublication, ArtError>;

    /// Full verification path for a publication: signature validity, signer
    /// identity against the embedded artist, then deserialization.
    async fn verify(&self, publication: &ArtistPublication) -> Result<ArtResources, ArtError>;

    async fn new_invoice(
        &self,
        tracks: &[Track],
        amount: u32,
        multiplier: Bolt11AmountMultiplier,
    ) -> Result<Invoice, ArtError>;
}

/// Gateway wrapping a [`LightningClient`] with the locally configured
/// publishing artist.
pub struct LightningPublisher<L> {
    client: L,
    publishing_artist: Artist,
}

impl<L: LightningClient> LightningPublisher<L> {
    /// Bind the gateway to its publishing artist. The artist's pubkey must
    /// already be the node's identity; [`sign`](Publisher::sign) re-checks on
    /// every use in case the node behind the channel changed.
    pub fn new(client: L, publishing_artist: Artist) -> Self {
        Self {
            client,
            publishing_artist,
        }
    }

    pub fn publishing_artist(&self) -> &Artist {
        &self.publishing_artist
    }

    pub fn client(&self) -> &L {
        &self.client
    }
}

#[async_trait]
impl<L: LightningClient> Publisher for LightningPublisher<L> {
    async fn pubkey(&self) -> Result<Pubkey, ArtError> {
        Ok(self.client.get_info().await?.identity_pubkey)
    }

    async fn sign(&self, resources: &ArtResources) -> Result<ArtistPublication, ArtError> {
        let node_pubkey = self.pubkey().await?;
        if self.publishing_artist.pubkey != node_pubkey {
            return Err(ArtError::ConfigMismatch(format!(
                "publishing artist {} is configured with pubkey {} but the node identity is {}",
                self.publishing_artist.artist_id,
                self.publishing_artist.pubkey.short(),
                node_pubkey.short()
            )));
        }

        let serialized = resources.to_bytes()?;
        let signature = self.client.sign_message(&serialized).await?;
        debug!(
            artist = %self.publishing_artist.artist_id,
            bytes = serialized.len(),
            "Signed catalog snapshot"
        );
        Ok(ArtistPublication {
            artist: self.publishing_artist.clone(),
            signature,
            serialized_art_resources: serialized,
        })
    }

    async fn verify(&self, publication: &ArtistPublication) -> Result<ArtResources, ArtError> {
        let verdict = self
            .client
            .verify_message(
                &publication.serialized_art_resources,
                &publication.signature,
            )
            .await?;
        if !verdict.valid {
            return Err(ArtError::InvalidSignature(format!(
                "signature did not verify for artist {}",
                publication.artist.artist_id
            )));
        }
        if verdict.pubkey != publication.artist.pubkey {
            warn!(
                artist = %publication.artist.artist_id,
                claimed = %publication.artist.pubkey.short(),
                recovered = %verdict.pubkey.short(),
                "Publication signer does not match its embedded artist"
            );
            return Err(ArtError::InvalidSignature(format!(
                "recovered pubkey {} does not match artist {}",
                verdict.pubkey.short(),
                publication.artist.artist_id
            )));
        }
        publication.resources()
    }

    async fn new_invoice(
        &self,
        tracks: &[Track],
        amount: u32,
        multiplier: Bolt11AmountMultiplier,
    ) -> Result<Invoice, ArtError> {
        let memo = invoice_memo(tracks)?;
        let value = value_satoshis(amount, multiplier)?;
        let issued = self.client.add_invoice(&memo, value).await?;
        Ok(Invoice {
            artist_id: self.publishing_artist.artist_id.clone(),
            bolt11_payment_request: issued.payment_request,
            payment_hash: issued.payment_hash,
            tracks: tracks.to_vec(),
            amount,
            amount_multiplier: multiplier,
        })
    }
}

/// Invoice memo: the space-separated full ids of the covered tracks. A memo
/// that would overflow BOLT-11's limit collapses to a digest of the id list;
/// the stored invoice keeps the authoritative track set either way.
pub fn invoice_memo(tracks: &[Track]) -> Result<String, ArtError> {
    if tracks.is_empty() {
        return Err(ArtError::PaymentInvalid("no tracks for invoice".into()));
    }
    let ids: Vec<String> = tracks.iter().map(Track::full_id).collect();
    let memo = ids.join(" ");
    if memo.len() > MAX_MEMO_BYTES {
        let digest: [u8; 32] = Sha256::digest(memo.as_bytes()).into();
        return Ok(format!("tracks:{}", hex::encode(digest)));
    }
    Ok(memo)
}

/// Convert a BOLT-11 `(amount, multiplier)` pair to whole satoshis.
/// Sub-satoshi multipliers are refused rather than rounded.
pub fn value_satoshis(
    amount: u32,
    multiplier: Bolt11AmountMultiplier,
) -> Result<i64, ArtError> {
    let amount = i64::from(amount);
    match multiplier {
        Bolt11AmountMultiplier::BitcoinBit => Ok(amount * 100),
        Bolt11AmountMultiplier::MicroBitcoin => Ok(amount * 100),
        Bolt11AmountMultiplier::MilliBitcoin => Ok(amount * 100_000),
        Bolt11AmountMultiplier::NanoBitcoin | Bolt11AmountMultiplier::PicoBitcoin => {
            Err(ArtError::PaymentInvalid(format!(
                "sub-satoshi multiplier {multiplier} is not supported"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockLightningNode;

    fn track(artist: &str, id: &str) -> Track {
        Track {
            artist_id: artist.into(),
            artist_album_id: String::new(),
            artist_track_id: id.into(),
            album_track_number: 0,
            title: id.into(),
        }
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

    fn sample_resources(publisher: &LightningPublisher<MockLightningNode>) -> ArtResources {
        ArtResources {
            artists: vec![publisher.publishing_artist().clone()],
            tracks: vec![track("aliceinchains", "dirt/would")],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_sign_then_verify_roundtrip() {
        let publisher = publisher();
        let resources = sample_resources(&publisher);

        let publication = publisher.sign(&resources).await.unwrap();
        let verified = publisher.verify(&publication).await.unwrap();
        assert_eq!(verified, resources);
    }

    #[tokio::test]
    async fn test_sign_refuses_foreign_artist_pubkey() {
        let node = MockLightningNode::new();
        let other = MockLightningNode::new();
        let artist = Artist {
            artist_id: "aliceinchains".into(),
            name: "Alice In Chains".into(),
            pubkey: other.pubkey(),
        };
        let publisher = LightningPublisher::new(node, artist);

        let err = publisher.sign(&ArtResources::default()).await.unwrap_err();
        assert!(matches!(err, ArtError::ConfigMismatch(_)));
    }

    #[tokio::test]
    async fn test_verify_rejects_tampered_resources() {
        let publisher = publisher();
        let mut publication = publisher.sign(&sample_resources(&publisher)).await.unwrap();

        let mut tampered = publication.resources().unwrap();
        tampered.tracks.push(track("aliceinchains", "facelift/wedieyoung"));
        publication.serialized_art_resources = tampered.to_bytes().unwrap();

        let err = publisher.verify(&publication).await.unwrap_err();
        assert!(matches!(err, ArtError::InvalidSignature(_)));
    }

    #[tokio::test]
    async fn test_verify_rejects_mismatched_embedded_pubkey() {
        let publisher = publisher();
        let mut publication = publisher.sign(&sample_resources(&publisher)).await.unwrap();
        publication.artist.pubkey = MockLightningNode::new().pubkey();

        let err = publisher.verify(&publication).await.unwrap_err();
        assert!(matches!(err, ArtError::InvalidSignature(_)));
    }

    #[tokio::test]
    async fn test_new_invoice_binds_tracks_and_hash() {
        let publisher = publisher();
        let tracks = vec![track("aliceinchains", "dirt/would")];

        let invoice = publisher
            .new_invoice(&tracks, 10, Bolt11AmountMultiplier::BitcoinBit)
            .await
            .unwrap();
        assert_eq!(invoice.tracks, tracks);
        assert_eq!(invoice.artist_id, "aliceinchains");
        assert!(invoice.covers("aliceinchains", "dirt/would"));

        // settling the preimage reproduces the payment hash
        let preimage = publisher
            .client()
            .preimage_for(&invoice.payment_hash)
            .await
            .unwrap();
        let hash: [u8; 32] = Sha256::digest(preimage).into();
        assert_eq!(hash, invoice.payment_hash.0);
    }

    #[test]
    fn test_memo_lists_full_ids() {
        let tracks = vec![
            track("aliceinchains", "dirt/would"),
            track("aliceinchains", "facelift/wedieyoung"),
        ];
        assert_eq!(
            invoice_memo(&tracks).unwrap(),
            "aliceinchains/dirt/would aliceinchains/facelift/wedieyoung"
        );
    }

    #[test]
    fn test_memo_overflow_switches_to_digest() {
        let tracks: Vec<Track> = (0..40)
            .map(|i| track("aliceinchains", &format!("album/verylongtracktitle{i:032}")))
            .collect();
        let memo = invoice_memo(&tracks).unwrap();
        assert!(memo.starts_with("tracks:"));
        assert_eq!(memo.len(), "tracks:".len() + 64);
        assert!(memo.len() <= MAX_MEMO_BYTES);
    }

    #[test]
    fn test_memo_requires_tracks() {
        assert!(matches!(
            invoice_memo(&[]),
            Err(ArtError::PaymentInvalid(_))
        ));
    }

    #[test]
    fn test_value_satoshis_table() {
        assert_eq!(value_satoshis(2, Bolt11AmountMultiplier::BitcoinBit).unwrap(), 200);
        assert_eq!(value_satoshis(2, Bolt11AmountMultiplier::MicroBitcoin).unwrap(), 200);
        assert_eq!(
            value_satoshis(1, Bolt11AmountMultiplier::MilliBitcoin).unwrap(),
            100_000
        );
        assert!(value_satoshis(1, Bolt11AmountMultiplier::NanoBitcoin).is_err());
        assert!(value_satoshis(1, Bolt11AmountMultiplier::PicoBitcoin).is_err());
    }
}

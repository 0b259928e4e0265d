use serde::{Deserialize, Serialize};

use crate::error::ArtError;
use crate::types::{ArtResources, Artist};

/// A signed snapshot of one artist's catalog.
///
/// `artist` names the signer; `signature` is the opaque string the artist's
/// Lightning node produced over exactly `serialized_art_resources`. Clients
/// must verify the signature and check the recovered key against
/// `artist.pubkey` before trusting the contents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtistPublication {
    pub artist: Artist,
    pub signature: String,
    pub serialized_art_resources: Vec<u8>,
}

impl ArtistPublication {
    /// Deserialize the embedded resources without verifying the signature.
    /// Use the publisher's verify path for anything received over the wire.
    pub fn resources(&self) -> Result<ArtResources, ArtError> {
        ArtResources::from_bytes(&self.serialized_art_resources)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtError> {
        bincode::serialize(self)
            .map_err(|e| ArtError::StorageCorruption(format!("serialize publication: {e}")))
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, ArtError> {
        bincode::deserialize(data)
            .map_err(|e| ArtError::StorageCorruption(format!("deserialize publication: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Pubkey;

    fn sample() -> ArtistPublication {
        let resources = ArtResources {
            artists: vec![Artist {
                artist_id: "aliceinchains".into(),
                name: "Alice In Chains".into(),
                pubkey: Pubkey::empty(),
            }],
            ..Default::default()
        };
        ArtistPublication {
            artist: resources.artists[0].clone(),
            signature: "d34db33f".into(),
            serialized_art_resources: resources.to_bytes().unwrap(),
        }
    }

    #[test]
    fn test_envelope_roundtrip() {
        let publication = sample();
        let bytes = publication.to_bytes().unwrap();
        let restored = ArtistPublication::from_bytes(&bytes).unwrap();
        assert_eq!(restored, publication);
    }

    #[test]
    fn test_resources_decode() {
        let publication = sample();
        let resources = publication.resources().unwrap();
        assert_eq!(resources.artists[0].artist_id, "aliceinchains");
    }

    #[test]
    fn test_corrupt_envelope_rejected() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes.truncate(bytes.len() / 2);
        assert!(matches!(
            ArtistPublication::from_bytes(&bytes),
            Err(ArtError::StorageCorruption(_))
        ));
    }
}

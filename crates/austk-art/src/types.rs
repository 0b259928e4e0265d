use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{PAYMENT_HASH_SIZE, PUBKEY_SIZE};
use crate::error::ArtError;

// Artist identity = compressed secp256k1 public key of the artist's Lightning
// node, kept in its 66-char lowercase hex form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Pubkey(String);

impl Pubkey {
    /// Parse and validate a 66-char lowercase hex pubkey.
    pub fn from_hex(s: &str) -> Result<Self, ArtError> {
        if s.len() != PUBKEY_SIZE * 2 {
            return Err(ArtError::ConfigMismatch(format!(
                "pubkey must be {} hex chars, got {}",
                PUBKEY_SIZE * 2,
                s.len()
            )));
        }
        if !s.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')) {
            return Err(ArtError::ConfigMismatch(format!(
                "pubkey is not lowercase hex: {s}"
            )));
        }
        Ok(Self(s.to_string()))
    }

    /// An unpublished local draft carries an empty pubkey until first publish.
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(8)]
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// SHA-256 of a payment preimage; the invoice's identity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PaymentHash(pub [u8; PAYMENT_HASH_SIZE]);

impl PaymentHash {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, ArtError> {
        let bytes = hex::decode(s)
            .map_err(|e| ArtError::PaymentInvalid(format!("payment hash is not hex: {e}")))?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtError> {
        let arr: [u8; PAYMENT_HASH_SIZE] = bytes.try_into().map_err(|_| {
            ArtError::PaymentInvalid(format!(
                "payment hash must be {PAYMENT_HASH_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Display for PaymentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Artist {
    pub artist_id: String,
    pub name: String,
    pub pubkey: Pubkey,
}

impl Artist {
    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtError> {
        bincode::serialize(self)
            .map_err(|e| ArtError::StorageCorruption(format!("serialize artist: {e}")))
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, ArtError> {
        bincode::deserialize(data)
            .map_err(|e| ArtError::StorageCorruption(format!("deserialize artist: {e}")))
    }
}

/// Keyed uniquely by `(artist_id, artist_album_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Album {
    pub artist_id: String,
    pub artist_album_id: String,
    pub title: String,
}

/// Keyed uniquely by `(artist_id, artist_track_id)`. The track id may contain
/// slashes to nest under an album hierarchy; an empty `artist_album_id` means
/// a standalone track.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Track {
    pub artist_id: String,
    pub artist_album_id: String,
    pub artist_track_id: String,
    pub album_track_number: u32,
    pub title: String,
}

impl Track {
    /// The network-wide id used in invoice memos and URLs.
    pub fn full_id(&self) -> String {
        format!("{}/{}", self.artist_id, self.artist_track_id)
    }

    pub fn in_album(&self) -> bool {
        !self.artist_album_id.is_empty() || self.album_track_number > 0
    }
}

/// Another node hosting a catalog, reachable at `host:port` through the onion
/// proxy. The self-peer is the peer whose pubkey matches the local node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Peer {
    pub pubkey: Pubkey,
    pub host: String,
    pub port: u16,
}

impl Peer {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Literal peer address form `<pubkey>@<host>:<port>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerAddress {
    pub pubkey: Pubkey,
    pub host: String,
    pub port: u16,
}

impl PeerAddress {
    pub fn to_peer(&self) -> Peer {
        Peer {
            pubkey: self.pubkey.clone(),
            host: self.host.clone(),
            port: self.port,
        }
    }
}

impl FromStr for PeerAddress {
    type Err = ArtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = |why: &str| ArtError::ConfigMismatch(format!("peer address {s:?}: {why}"));

        let (pubkey_part, rest) = s.split_once('@').ok_or_else(|| bad("missing '@'"))?;
        let (host, port_part) = rest.rsplit_once(':').ok_or_else(|| bad("missing ':port'"))?;

        let pubkey = Pubkey::from_hex(pubkey_part)?;
        if host.is_empty() || !host.chars().all(|c| matches!(c, 'a'..='z' | '0'..='9' | '.')) {
            return Err(bad("host must match [a-z0-9.]+"));
        }
        let port: u16 = port_part.parse().map_err(|_| bad("port is not decimal"))?;

        Ok(Self {
            pubkey,
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.pubkey, self.host, self.port)
    }
}

/// Snapshot of everything one node advertises; the serialized unit of
/// publication. Collection sorts each vector so serialization is
/// deterministic and re-signing unchanged content yields identical bytes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtResources {
    pub artists: Vec<Artist>,
    pub albums: Vec<Album>,
    pub tracks: Vec<Track>,
    pub peers: Vec<Peer>,
}

impl ArtResources {
    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtError> {
        bincode::serialize(self)
            .map_err(|e| ArtError::StorageCorruption(format!("serialize resources: {e}")))
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, ArtError> {
        bincode::deserialize(data)
            .map_err(|e| ArtError::StorageCorruption(format!("deserialize resources: {e}")))
    }

    pub fn sort(&mut self) {
        self.artists.sort_by(|a, b| a.artist_id.cmp(&b.artist_id));
        self.albums.sort_by(|a, b| {
            (&a.artist_id, &a.artist_album_id).cmp(&(&b.artist_id, &b.artist_album_id))
        });
        self.tracks.sort_by(|a, b| {
            (&a.artist_id, &a.artist_track_id).cmp(&(&b.artist_id, &b.artist_track_id))
        });
        self.peers.sort_by(|a, b| a.pubkey.as_str().cmp(b.pubkey.as_str()));
    }
}

/// BOLT-11 amount multiplier. Only whole-satoshi multipliers convert; the
/// sub-satoshi ones error instead of silently rounding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Bolt11AmountMultiplier {
    MilliBitcoin,
    MicroBitcoin,
    NanoBitcoin,
    PicoBitcoin,
    /// One bit = 1 µBTC = 100 satoshis.
    BitcoinBit,
}

impl fmt::Display for Bolt11AmountMultiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Bolt11AmountMultiplier::MilliBitcoin => "mBTC",
            Bolt11AmountMultiplier::MicroBitcoin => "uBTC",
            Bolt11AmountMultiplier::NanoBitcoin => "nBTC",
            Bolt11AmountMultiplier::PicoBitcoin => "pBTC",
            Bolt11AmountMultiplier::BitcoinBit => "bits",
        };
        write!(f, "{name}")
    }
}

/// A minted Lightning invoice bound to a set of tracks, keyed by its payment
/// hash. Possession of the matching preimage authorizes downloading any track
/// in `tracks`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Invoice {
    pub artist_id: String,
    pub bolt11_payment_request: String,
    pub payment_hash: PaymentHash,
    pub tracks: Vec<Track>,
    pub amount: u32,
    pub amount_multiplier: Bolt11AmountMultiplier,
}

impl Invoice {
    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtError> {
        bincode::serialize(self)
            .map_err(|e| ArtError::StorageCorruption(format!("serialize invoice: {e}")))
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, ArtError> {
        bincode::deserialize(data)
            .map_err(|e| ArtError::StorageCorruption(format!("deserialize invoice: {e}")))
    }

    /// Whether this invoice covers the given track.
    pub fn covers(&self, artist_id: &str, artist_track_id: &str) -> bool {
        self.tracks
            .iter()
            .any(|t| t.artist_id == artist_id && t.artist_track_id == artist_track_id)
    }
}

/// Request header carrying the hex-encoded payment preimage on `/art` fetches.
pub const PAYMENT_PREIMAGE_HEADER: &str = "Payment-Preimage";

/// Response header echoing the hex SHA-256 of a supplied preimage.
pub const PAYMENT_HASH_HEADER: &str = "Payment-Hash";

/// Exact body served with `402 Payment Required`.
pub const PAYMENT_REQUIRED_BODY: &str = "payment req'd";

/// Compressed secp256k1 public key size in bytes (66 hex chars).
pub const PUBKEY_SIZE: usize = 33;

/// Lightning payment hash / preimage size in bytes.
pub const PAYMENT_HASH_SIZE: usize = 32;

/// Longest invoice memo BOLT-11 allows before switching to a digest memo.
pub const MAX_MEMO_BYTES: usize = 1023;

/// Default port where an austk node exposes its catalog.
pub const DEFAULT_REST_PORT: u16 = 53545;

/// Default SOCKS5 proxy for reaching onion peers.
pub const DEFAULT_TOR_PROXY: &str = "socks5://127.0.0.1:9050";

/// Default deadline for building an onion circuit to a peer.
pub const ONION_CONNECT_TIMEOUT_SECS: u64 = 180;

/// File extension of audio payloads under the art directory.
pub const TRACK_FILE_EXT: &str = "mp3";

/// Per-artist file holding the raw serialized resources.
pub const ART_FILE_NAME: &str = ".art";

/// Extension of the signed publication envelope, named `<pubkey>.pub`.
pub const PUB_FILE_EXT: &str = "pub";

use std::path::PathBuf;

use austk_art::constants::{DEFAULT_REST_PORT, DEFAULT_TOR_PROXY};
use austk_art::{PeerAddress, Pubkey};

/// Node configuration, read from `AUSTK_*` environment variables.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Identifier the node publishes under; required.
    pub artist_id: String,
    /// Display name; defaults to the artist id.
    pub artist_name: String,
    /// Root of the art directory tree.
    pub art_dir: PathBuf,
    /// SOCKS5 proxy for reaching onion peers.
    pub tor_proxy: String,
    /// lnd REST endpoint and credentials.
    pub lnd_host: String,
    pub lnd_rest_port: u16,
    pub tls_cert_path: PathBuf,
    pub macaroon_path: PathBuf,
    /// Address peers use to reach this node, advertised in the self-peer.
    pub rest_host: String,
    pub rest_port: u16,
    /// Pinned node identity; startup fails if lnd reports a different key.
    pub pubkey: Option<Pubkey>,
    /// Static peer to store before the first sync pass.
    pub peer: Option<PeerAddress>,
    /// Price of one track, in bits.
    pub price_bits: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            artist_id: String::new(),
            artist_name: String::new(),
            art_dir: PathBuf::from("./art"),
            tor_proxy: DEFAULT_TOR_PROXY.to_string(),
            lnd_host: "127.0.0.1".to_string(),
            lnd_rest_port: 8080,
            tls_cert_path: PathBuf::from("./tls.cert"),
            macaroon_path: PathBuf::from("./admin.macaroon"),
            rest_host: "localhost".to_string(),
            rest_port: DEFAULT_REST_PORT,
            pubkey: None,
            peer: None,
            price_bits: 10,
        }
    }
}

impl NodeConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(id) = std::env::var("AUSTK_ARTIST_ID") {
            config.artist_id = austk_art::name_to_id(&id);
        }
        if let Ok(name) = std::env::var("AUSTK_ARTIST_NAME") {
            config.artist_name = name;
        }
        if config.artist_name.is_empty() {
            config.artist_name = config.artist_id.clone();
        }

        if let Ok(dir) = std::env::var("AUSTK_ART_DIR") {
            config.art_dir = PathBuf::from(dir);
        }
        if let Ok(proxy) = std::env::var("AUSTK_TOR_PROXY") {
            config.tor_proxy = proxy;
        }
        if let Ok(host) = std::env::var("AUSTK_LND_HOST") {
            config.lnd_host = host;
        }
        if let Ok(port) = std::env::var("AUSTK_LND_REST_PORT") {
            match port.parse() {
                Ok(port) => config.lnd_rest_port = port,
                Err(_) => tracing::warn!(value = %port, "Invalid AUSTK_LND_REST_PORT, using default"),
            }
        }
        if let Ok(path) = std::env::var("AUSTK_TLS_CERT_PATH") {
            config.tls_cert_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("AUSTK_MACAROON_PATH") {
            config.macaroon_path = PathBuf::from(path);
        }
        if let Ok(host) = std::env::var("AUSTK_REST_HOST") {
            config.rest_host = host;
        }
        if let Ok(port) = std::env::var("AUSTK_REST_PORT") {
            match port.parse() {
                Ok(port) => config.rest_port = port,
                Err(_) => tracing::warn!(value = %port, "Invalid AUSTK_REST_PORT, using default"),
            }
        }
        if let Ok(pubkey) = std::env::var("AUSTK_PUBKEY") {
            match Pubkey::from_hex(&pubkey) {
                Ok(pubkey) => config.pubkey = Some(pubkey),
                Err(e) => tracing::warn!(error = %e, "Invalid AUSTK_PUBKEY, ignoring"),
            }
        }
        if let Ok(peer) = std::env::var("AUSTK_PEER") {
            match peer.parse() {
                Ok(peer) => config.peer = Some(peer),
                Err(e) => tracing::warn!(error = %e, "Invalid AUSTK_PEER, ignoring"),
            }
        }
        if let Ok(price) = std::env::var("AUSTK_PRICE_BITS") {
            match price.parse() {
                Ok(price) => config.price_bits = price,
                Err(_) => tracing::warn!(value = %price, "Invalid AUSTK_PRICE_BITS, using default"),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NodeConfig::default();
        assert_eq!(config.rest_port, 53545);
        assert_eq!(config.tor_proxy, "socks5://127.0.0.1:9050");
        assert_eq!(config.price_bits, 10);
        assert!(config.pubkey.is_none());
    }
}

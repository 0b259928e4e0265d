use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use austk_art::constants::{ONION_CONNECT_TIMEOUT_SECS, PAYMENT_PREIMAGE_HEADER};
use austk_art::{ArtError, ArtistPublication, Invoice};

/// HTTP client for fetching catalogs and payloads from peer nodes.
/// `peer_address` is the `host:port` part of a peer's literal address.
#[async_trait]
pub trait OnionClient: Send + Sync {
    async fn fetch_catalog(&self, peer_address: &str) -> Result<ArtistPublication, ArtError>;

    async fn fetch_invoice(
        &self,
        peer_address: &str,
        artist_id: &str,
        artist_track_id: &str,
    ) -> Result<Invoice, ArtError>;

    async fn fetch_track(
        &self,
        peer_address: &str,
        artist_id: &str,
        artist_track_id: &str,
        preimage: &[u8],
    ) -> Result<Vec<u8>, ArtError>;
}

/// [`OnionClient`] backed by reqwest with every request routed through a
/// SOCKS5 proxy (the Tor entry point). Peers speak plain HTTP inside the
/// circuit; the onion layer provides the transport security.
pub struct TorHttpClient {
    http: reqwest::Client,
}

impl TorHttpClient {
    /// Client bound to the given SOCKS5 proxy URL, e.g.
    /// `socks5://127.0.0.1:9050`. The generous default timeout covers
    /// building a fresh onion circuit.
    pub fn with_proxy(proxy_url: &str) -> Result<Self, ArtError> {
        let proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|e| ArtError::ConfigMismatch(format!("proxy url {proxy_url:?}: {e}")))?;
        let http = reqwest::Client::builder()
            .proxy(proxy)
            .timeout(Duration::from_secs(ONION_CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ArtError::ConfigMismatch(format!("build onion client: {e}")))?;
        Ok(Self { http })
    }

    /// Proxyless client for same-host use and tests.
    pub fn direct() -> Result<Self, ArtError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(ONION_CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ArtError::ConfigMismatch(format!("build http client: {e}")))?;
        Ok(Self { http })
    }

    async fn get_bytes(&self, url: &str, preimage: Option<&[u8]>) -> Result<Vec<u8>, ArtError> {
        let mut request = self.http.get(url);
        if let Some(preimage) = preimage {
            request = request.header(PAYMENT_PREIMAGE_HEADER, hex::encode(preimage));
        }
        let response = request
            .send()
            .await
            .map_err(|e| ArtError::TransientIo(format!("GET {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                402 => ArtError::PaymentRequired,
                400 | 403 => ArtError::PaymentInvalid(format!("{url} returned {status}")),
                404 => ArtError::not_found(url.to_string()),
                _ => ArtError::TransientIo(format!("{url} returned {status}")),
            });
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| ArtError::TransientIo(format!("read body of {url}: {e}")))?;
        debug!(url, bytes = body.len(), "Fetched");
        Ok(body.to_vec())
    }
}

#[async_trait]
impl OnionClient for TorHttpClient {
    async fn fetch_catalog(&self, peer_address: &str) -> Result<ArtistPublication, ArtError> {
        let body = self
            .get_bytes(&format!("http://{peer_address}/"), None)
            .await?;
        ArtistPublication::from_bytes(&body).map_err(|e| {
            ArtError::InvalidSignature(format!("peer {peer_address} sent a bad catalog: {e}"))
        })
    }

    async fn fetch_invoice(
        &self,
        peer_address: &str,
        artist_id: &str,
        artist_track_id: &str,
    ) -> Result<Invoice, ArtError> {
        let body = self
            .get_bytes(
                &format!("http://{peer_address}/invoice/{artist_id}/{artist_track_id}"),
                None,
            )
            .await?;
        Invoice::from_bytes(&body).map_err(|e| {
            ArtError::PaymentInvalid(format!("peer {peer_address} sent a bad invoice: {e}"))
        })
    }

    async fn fetch_track(
        &self,
        peer_address: &str,
        artist_id: &str,
        artist_track_id: &str,
        preimage: &[u8],
    ) -> Result<Vec<u8>, ArtError> {
        self.get_bytes(
            &format!("http://{peer_address}/art/{artist_id}/{artist_track_id}"),
            Some(preimage),
        )
        .await
    }
}

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::{debug, info};

use austk_art::{ArtError, PaymentHash, Pubkey};

use crate::client::{IssuedInvoice, LightningClient, MessageVerdict, NodeInfo};

// lnd authenticates REST calls with a macaroon header; byte fields travel
// base64-encoded per its REST conventions.
const MACAROON_HEADER: &str = "Grpc-Metadata-macaroon";
const RPC_TIMEOUT_SECS: u64 = 30;

#[derive(Deserialize)]
struct GetInfoResponse {
    identity_pubkey: String,
}

#[derive(Deserialize)]
struct SignMessageResponse {
    signature: String,
}

#[derive(Deserialize)]
struct VerifyMessageResponse {
    valid: bool,
    #[serde(default)]
    pubkey: String,
}

#[derive(Deserialize)]
struct AddInvoiceResponse {
    r_hash: String,
    payment_request: String,
}

/// Client for lnd's REST API, authenticated with the admin macaroon over the
/// node's self-signed TLS cert.
pub struct LndRestClient {
    http: reqwest::Client,
    base_url: String,
}

impl LndRestClient {
    /// Connect to `https://<host>:<port>`, pinning the TLS cert and loading
    /// the macaroon from the configured paths. Fails fast if either file is
    /// unreadable so a misconfigured node never starts serving.
    pub async fn connect(
        host: &str,
        port: u16,
        tls_cert_path: &Path,
        macaroon_path: &Path,
    ) -> Result<Self, ArtError> {
        let cert_pem = tokio::fs::read(tls_cert_path).await.map_err(|e| {
            ArtError::ConfigMismatch(format!(
                "read lnd tls cert {}: {e}",
                tls_cert_path.display()
            ))
        })?;
        let cert = reqwest::Certificate::from_pem(&cert_pem)
            .map_err(|e| ArtError::ConfigMismatch(format!("parse lnd tls cert: {e}")))?;

        let macaroon = tokio::fs::read(macaroon_path).await.map_err(|e| {
            ArtError::ConfigMismatch(format!(
                "read lnd macaroon {}: {e}",
                macaroon_path.display()
            ))
        })?;
        let mut headers = HeaderMap::new();
        let mut macaroon_value = HeaderValue::from_str(&hex::encode(macaroon))
            .map_err(|e| ArtError::ConfigMismatch(format!("macaroon header: {e}")))?;
        macaroon_value.set_sensitive(true);
        headers.insert(MACAROON_HEADER, macaroon_value);

        let http = reqwest::Client::builder()
            .add_root_certificate(cert)
            .default_headers(headers)
            .timeout(Duration::from_secs(RPC_TIMEOUT_SECS))
            .build()
            .map_err(|e| ArtError::ConfigMismatch(format!("build lnd client: {e}")))?;

        let client = Self {
            http,
            base_url: format!("https://{host}:{port}"),
        };

        // Probe the channel so startup surfaces an unreachable or
        // unauthorized node immediately.
        let info = client.get_info().await?;
        info!(
            endpoint = %client.base_url,
            pubkey = %info.identity_pubkey.short(),
            "Connected to lnd"
        );
        Ok(client)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, ArtError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ArtError::TransientIo(format!("lnd GET {path}: {e}")))?;
        Self::decode(path, response).await
    }

    async fn post_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, ArtError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ArtError::TransientIo(format!("lnd POST {path}: {e}")))?;
        Self::decode(path, response).await
    }

    async fn decode<T: for<'de> Deserialize<'de>>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ArtError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ArtError::TransientIo(format!(
                "lnd {path} returned {status}: {body}"
            )));
        }
        response
            .json()
            .await
            .map_err(|e| ArtError::TransientIo(format!("lnd {path} body: {e}")))
    }
}

#[async_trait]
impl LightningClient for LndRestClient {
    async fn get_info(&self) -> Result<NodeInfo, ArtError> {
        let info: GetInfoResponse = self.get_json("/v1/getinfo").await?;
        Ok(NodeInfo {
            identity_pubkey: Pubkey::from_hex(&info.identity_pubkey)?,
        })
    }

    async fn sign_message(&self, message: &[u8]) -> Result<String, ArtError> {
        let response: SignMessageResponse = self
            .post_json(
                "/v1/signmessage",
                serde_json::json!({ "msg": BASE64.encode(message) }),
            )
            .await?;
        debug!(bytes = message.len(), "Signed message via lnd");
        Ok(response.signature)
    }

    async fn verify_message(
        &self,
        message: &[u8],
        signature: &str,
    ) -> Result<MessageVerdict, ArtError> {
        let response: VerifyMessageResponse = self
            .post_json(
                "/v1/verifymessage",
                serde_json::json!({
                    "msg": BASE64.encode(message),
                    "signature": signature,
                }),
            )
            .await?;
        let pubkey = if response.pubkey.is_empty() {
            Pubkey::empty()
        } else {
            Pubkey::from_hex(&response.pubkey)?
        };
        Ok(MessageVerdict {
            valid: response.valid,
            pubkey,
        })
    }

    async fn add_invoice(
        &self,
        memo: &str,
        value_satoshis: i64,
    ) -> Result<IssuedInvoice, ArtError> {
        let response: AddInvoiceResponse = self
            .post_json(
                "/v1/invoices",
                serde_json::json!({
                    "memo": memo,
                    "value": value_satoshis.to_string(),
                }),
            )
            .await?;
        let hash_bytes = BASE64
            .decode(&response.r_hash)
            .map_err(|e| ArtError::TransientIo(format!("lnd r_hash: {e}")))?;
        Ok(IssuedInvoice {
            payment_request: response.payment_request,
            payment_hash: PaymentHash::from_bytes(&hash_bytes)?,
        })
    }
}

use async_trait::async_trait;

use austk_art::{ArtError, PaymentHash, Pubkey};

/// Identity of the connected Lightning node.
#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub identity_pubkey: Pubkey,
}

/// Outcome of the node's message verification primitive: whether the
/// signature checks out, and the signer it recovered.
#[derive(Debug, Clone)]
pub struct MessageVerdict {
    pub valid: bool,
    pub pubkey: Pubkey,
}

/// A freshly issued invoice as the node reports it.
#[derive(Debug, Clone)]
pub struct IssuedInvoice {
    pub payment_request: String,
    pub payment_hash: PaymentHash,
}

/// The authenticated channel to a Lightning node: signer, verifier, and
/// invoice issuer. The node itself is a black box behind this trait; the
/// REST-backed [`LndRestClient`](crate::LndRestClient) talks to a real lnd
/// and [`MockLightningNode`](crate::MockLightningNode) signs in-process.
#[async_trait]
pub trait LightningClient: Send + Sync {
    async fn get_info(&self) -> Result<NodeInfo, ArtError>;

    /// Sign exactly these bytes under the node's identity key. The returned
    /// signature string is opaque; only `verify_message` interprets it.
    async fn sign_message(&self, message: &[u8]) -> Result<String, ArtError>;

    async fn verify_message(
        &self,
        message: &[u8],
        signature: &str,
    ) -> Result<MessageVerdict, ArtError>;

    async fn add_invoice(
        &self,
        memo: &str,
        value_satoshis: i64,
    ) -> Result<IssuedInvoice, ArtError>;
}

#[async_trait]
impl<L: LightningClient + ?Sized> LightningClient for std::sync::Arc<L> {
    async fn get_info(&self) -> Result<NodeInfo, ArtError> {
        (**self).get_info().await
    }

    async fn sign_message(&self, message: &[u8]) -> Result<String, ArtError> {
        (**self).sign_message(message).await
    }

    async fn verify_message(
        &self,
        message: &[u8],
        signature: &str,
    ) -> Result<MessageVerdict, ArtError> {
        (**self).verify_message(message, signature).await
    }

    async fn add_invoice(
        &self,
        memo: &str,
        value_satoshis: i64,
    ) -> Result<IssuedInvoice, ArtError> {
        (**self).add_invoice(memo, value_satoshis).await
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use rand::RngCore;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use austk_art::{ArtError, PaymentHash, Pubkey};

use crate::client::{IssuedInvoice, LightningClient, MessageVerdict, NodeInfo};

/// In-process stand-in for a Lightning node.
///
/// Signs with a secp256k1 key it holds itself; signatures are the hex of a
/// 65-byte recoverable compact signature (recovery id first) over the
/// SHA-256 of the message, so verification recovers the signer without any
/// RPC. Issued invoices remember their preimage so tests can settle them.
pub struct MockLightningNode {
    key: SigningKey,
    preimages: Mutex<HashMap<PaymentHash, [u8; 32]>>,
    invoice_counter: Mutex<u64>,
}

impl MockLightningNode {
    pub fn new() -> Self {
        Self::from_secret(SigningKey::random(&mut rand::rngs::OsRng))
    }

    pub fn from_secret_bytes(secret: &[u8; 32]) -> Result<Self, ArtError> {
        let key = SigningKey::from_bytes(secret.into())
            .map_err(|e| ArtError::ConfigMismatch(format!("bad secret key: {e}")))?;
        Ok(Self::from_secret(key))
    }

    fn from_secret(key: SigningKey) -> Self {
        Self {
            key,
            preimages: Mutex::new(HashMap::new()),
            invoice_counter: Mutex::new(0),
        }
    }

    pub fn pubkey(&self) -> Pubkey {
        encode_pubkey(self.key.verifying_key())
    }

    /// The settlement secret for an invoice this node issued. Models the
    /// preimage a payer learns when the payment completes.
    pub async fn preimage_for(&self, payment_hash: &PaymentHash) -> Option<[u8; 32]> {
        self.preimages.lock().await.get(payment_hash).copied()
    }
}

impl Default for MockLightningNode {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_pubkey(key: &VerifyingKey) -> Pubkey {
    Pubkey::from_hex(&hex::encode(key.to_sec1_bytes()))
        .expect("compressed sec1 point is valid hex")
}

#[async_trait]
impl LightningClient for MockLightningNode {
    async fn get_info(&self) -> Result<NodeInfo, ArtError> {
        Ok(NodeInfo {
            identity_pubkey: self.pubkey(),
        })
    }

    async fn sign_message(&self, message: &[u8]) -> Result<String, ArtError> {
        let (signature, recovery_id) = self
            .key
            .sign_recoverable(message)
            .map_err(|e| ArtError::InvalidSignature(format!("sign: {e}")))?;
        let mut bytes = Vec::with_capacity(65);
        bytes.push(recovery_id.to_byte());
        bytes.extend_from_slice(&signature.to_bytes());
        Ok(hex::encode(bytes))
    }

    async fn verify_message(
        &self,
        message: &[u8],
        signature: &str,
    ) -> Result<MessageVerdict, ArtError> {
        let invalid = || MessageVerdict {
            valid: false,
            pubkey: Pubkey::empty(),
        };
        let Ok(bytes) = hex::decode(signature) else {
            return Ok(invalid());
        };
        if bytes.len() != 65 {
            return Ok(invalid());
        }
        let Some(recovery_id) = RecoveryId::from_byte(bytes[0]) else {
            return Ok(invalid());
        };
        let Ok(signature) = Signature::from_slice(&bytes[1..]) else {
            return Ok(invalid());
        };
        match VerifyingKey::recover_from_msg(message, &signature, recovery_id) {
            Ok(recovered) => Ok(MessageVerdict {
                valid: true,
                pubkey: encode_pubkey(&recovered),
            }),
            Err(_) => Ok(MessageVerdict {
                valid: false,
                pubkey: Pubkey::empty(),
            }),
        }
    }

    async fn add_invoice(
        &self,
        memo: &str,
        value_satoshis: i64,
    ) -> Result<IssuedInvoice, ArtError> {
        let mut preimage = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut preimage);
        let hash: [u8; 32] = Sha256::digest(preimage).into();
        let payment_hash = PaymentHash(hash);
        self.preimages.lock().await.insert(payment_hash, preimage);

        let mut counter = self.invoice_counter.lock().await;
        *counter += 1;
        let payment_request = format!(
            "lnbcrt{}n1mock{:08}{}",
            value_satoshis * 10,
            *counter,
            &payment_hash.to_hex()[..16]
        );
        tracing::debug!(memo, value_satoshis, hash = %payment_hash, "Issued mock invoice");
        Ok(IssuedInvoice {
            payment_request,
            payment_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_verify_recovers_identity() {
        let node = MockLightningNode::new();
        let signature = node.sign_message(b"catalog bytes").await.unwrap();

        let verdict = node.verify_message(b"catalog bytes", &signature).await.unwrap();
        assert!(verdict.valid);
        assert_eq!(verdict.pubkey, node.pubkey());
    }

    #[tokio::test]
    async fn test_tampered_message_recovers_other_key() {
        let node = MockLightningNode::new();
        let signature = node.sign_message(b"catalog bytes").await.unwrap();

        let verdict = node.verify_message(b"tampered bytes", &signature).await.unwrap();
        // recovery either fails outright or yields a different key
        assert!(!verdict.valid || verdict.pubkey != node.pubkey());
    }

    #[tokio::test]
    async fn test_garbage_signature_is_invalid() {
        let node = MockLightningNode::new();
        let verdict = node.verify_message(b"bytes", "zz-not-hex").await.unwrap();
        assert!(!verdict.valid);
        let verdict = node.verify_message(b"bytes", "deadbeef").await.unwrap();
        assert!(!verdict.valid);
    }

    #[tokio::test]
    async fn test_invoice_preimage_settles_hash() {
        let node = MockLightningNode::new();
        let issued = node.add_invoice("aliceinchains/dirt/would", 1000).await.unwrap();

        let preimage = node.preimage_for(&issued.payment_hash).await.unwrap();
        let hash: [u8; 32] = Sha256::digest(preimage).into();
        assert_eq!(PaymentHash(hash), issued.payment_hash);
        assert!(issued.payment_request.starts_with("lnbcrt"));
    }

    #[tokio::test]
    async fn test_deterministic_identity_from_secret() {
        let a = MockLightningNode::from_secret_bytes(&[7u8; 32]).unwrap();
        let b = MockLightningNode::from_secret_bytes(&[7u8; 32]).unwrap();
        assert_eq!(a.pubkey(), b.pubkey());
    }
}

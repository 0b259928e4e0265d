// Lightning integration: the channel to the node, the publisher gateway that
// signs and verifies catalog publications, and invoice minting.

pub mod client;
pub mod gateway;
pub mod lnd_rest;
pub mod mock;
pub mod protocol;

pub use client::{IssuedInvoice, LightningClient, MessageVerdict, NodeInfo};
pub use gateway::{invoice_memo, value_satoshis, LightningPublisher, Publisher};
pub use lnd_rest::LndRestClient;
pub use mock::MockLightningNode;
pub use protocol::{collect_resources, publish, read, validate_foreign};

// Networking: HTTP over the onion proxy and the peer synchronization loop.

pub mod onion;
pub mod sync;

pub use onion::{OnionClient, TorHttpClient};
pub use sync::{sync_from_peers, PaymentAgent, SyncOutcome, SyncReport};

// Shared catalog model for the Audiostrike network: identifiers, catalog
// entities, the signed publication envelope, and the error taxonomy.

pub mod constants;
pub mod error;
pub mod ids;
pub mod publication;
pub mod types;

pub use error::ArtError;
pub use ids::{name_to_id, title_to_hierarchy};
pub use publication::ArtistPublication;
pub use types::{
    Album, ArtResources, Artist, Bolt11AmountMultiplier, Invoice, PaymentHash, Peer, PeerAddress,
    Pubkey, Track,
};

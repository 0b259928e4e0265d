// The austk node: HTTP serve layer, configuration, ingest, and the
// orchestrator composing the store, gateway, and sync loop.

pub mod api;
pub mod config;
pub mod error;
pub mod ingest;
pub mod node;

pub use api::{build_router, AppState};
pub use config::NodeConfig;
pub use ingest::ingest_track;
pub use node::{resolve_publishing_artist, reverify_catalog, Node};

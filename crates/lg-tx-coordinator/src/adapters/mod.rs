//! Adapters: concrete implementations of the outbound ports.

pub mod event_hub;
pub mod http_orderer;
pub mod http_peer;
pub mod identity;
pub mod kv_store;

pub use http_orderer::HttpOrderer;
pub use http_peer::HttpEndorsingPeer;
pub use identity::KeyStoreIdentityProvider;
pub use kv_store::{FileKeyValueStore, InMemoryKeyValueStore};

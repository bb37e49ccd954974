//! # Shared Types Crate
//!
//! Domain entities shared by the coordinator, the event bus and the gateway
//! binary.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses a crate boundary or
//!   goes over the wire is defined here.
//! - **Opaque identifiers**: `TxId`, `PeerId`, `ChannelId` and `ChaincodeId`
//!   are newtypes so they cannot be mixed up at call sites.

pub mod entities;

pub use entities::*;

//! # attest-store — Key-Value Store Abstraction
//!
//! The components of the Attest Ledger keep their state in prefixed regions
//! of an ordered key-value store. This crate provides:
//!
//! - **Kv** (`kv.rs`): `MemoryKvStore`, an ordered in-memory store with
//!   point reads, writes, deletes, and prefix scans.
//!
//! - **Keys** (`keys.rs`): `KeyPrefix`, the typed key builder for primary
//!   records and composite secondary-index entries. All key construction
//!   flows through it — there are no hand-assembled byte keys anywhere else
//!   in the workspace.
//!
//! - **Codec** (`codec.rs`): JSON encode/decode helpers and the monotonic
//!   sequence counter used for deterministic identifier minting.
//!
//! ## Ownership
//!
//! Each component receives its own store instance through its constructor.
//! There is no shared global handle; execution is serialized by the host, so
//! the store needs no interior locking.

pub mod codec;
pub mod keys;
pub mod kv;

pub use codec::{get_json, next_sequence, put_json};
pub use keys::KeyPrefix;
pub use kv::MemoryKvStore;

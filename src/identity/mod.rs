//! Identity layer modules.
//!
//! This module groups key types and the key-to-id index.

pub mod index;
pub mod key;

pub use index::IdentityIndex;
pub use key::KeyType;

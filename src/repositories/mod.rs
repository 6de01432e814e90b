//! Storage abstractions for credentials and local contacts.
//!
//! The traits are the seams the rest of the crate depends on; the in-memory
//! implementations back the binary and the tests.

mod contact_store;
mod credential_store;
mod traits;

pub use contact_store::InMemoryContactStore;
pub use credential_store::InMemoryCredentialStore;
pub use traits::{CredentialStore, LocalContactStore};

//! Credential persistence.
//!
//! The [`CredentialStore`] trait is the contract between the authentication
//! middleware and whatever durable storage an application uses. It is the
//! single source of truth for revocation: session tokens are only honored
//! while the credential they embed is still the one on file.
//!
//! [`MemoryCredentialStore`] is an in-process implementation suitable for
//! development and tests.
//!
//! # Example
//!
//! ```rust
//! use shopify_app_auth::store::{CredentialStore, MemoryCredentialStore};
//! use shopify_app_auth::{Credential, ShopDomain};
//!
//! # tokio_test_block(async {
//! let store = MemoryCredentialStore::new();
//! let shop = ShopDomain::new("my-store").unwrap();
//!
//! assert!(store.get(&shop).await.unwrap().is_none());
//! store
//!     .update(&shop, Credential::new("token", "read_products".parse().unwrap()))
//!     .await
//!     .unwrap();
//! assert!(store.get(&shop).await.unwrap().is_some());
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

mod memory;

pub use memory::MemoryCredentialStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::Credential;
use crate::config::ShopDomain;

/// A failure of the storage backend itself.
///
/// A missing credential is never an error; `get` returns `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or rejected the operation.
    #[error("Credential store unavailable: {reason}")]
    Unavailable {
        /// Description of the failure.
        reason: String,
    },

    /// A stored record could not be decoded.
    #[error("Corrupt credential record for '{shop}': {reason}")]
    Corrupt {
        /// The shop whose record is unreadable.
        shop: String,
        /// Description of the decoding failure.
        reason: String,
    },

    /// Any other backend error.
    #[error(transparent)]
    Backend(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Per-shop credential persistence.
///
/// Implementations must be safe for concurrent use and must serialize
/// operations on the same shop so two concurrent installs cannot interleave
/// into a corrupted record.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the credential on file for `shop`, or `None` if there is none.
    async fn get(&self, shop: &ShopDomain) -> Result<Option<Credential>, StoreError>;

    /// Stores `credential` for `shop`, replacing any existing one.
    async fn update(&self, shop: &ShopDomain, credential: Credential) -> Result<(), StoreError>;

    /// Removes the credential for `shop`. Removing a missing credential
    /// succeeds.
    async fn delete(&self, shop: &ShopDomain) -> Result<(), StoreError>;
}

//! In-process credential store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CredentialStore, StoreError};
use crate::auth::Credential;
use crate::config::ShopDomain;

/// An in-memory [`CredentialStore`].
///
/// All operations go through a single `RwLock`, so writes for any shop are
/// serialized. Cloning the store shares the underlying map. Contents are lost
/// when the process exits.
#[derive(Clone, Debug, Default)]
pub struct MemoryCredentialStore {
    credentials: Arc<RwLock<HashMap<ShopDomain, Credential>>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of shops with a stored credential.
    pub async fn len(&self) -> usize {
        self.credentials.read().await.len()
    }

    /// Returns `true` if no credential is stored.
    pub async fn is_empty(&self) -> bool {
        self.credentials.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, shop: &ShopDomain) -> Result<Option<Credential>, StoreError> {
        Ok(self.credentials.read().await.get(shop).cloned())
    }

    async fn update(&self, shop: &ShopDomain, credential: Credential) -> Result<(), StoreError> {
        self.credentials
            .write()
            .await
            .insert(shop.clone(), credential);
        Ok(())
    }

    async fn delete(&self, shop: &ShopDomain) -> Result<(), StoreError> {
        self.credentials.write().await.remove(shop);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthScopes;

    fn shop(name: &str) -> ShopDomain {
        ShopDomain::new(name).unwrap()
    }

    #[tokio::test]
    async fn test_get_missing_shop_is_none() {
        let store = MemoryCredentialStore::new();
        assert!(store.get(&shop("absent")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_overwrites_existing_credential() {
        let store = MemoryCredentialStore::new();
        let shop = shop("my-store");

        store
            .update(&shop, Credential::new("first", AuthScopes::new()))
            .await
            .unwrap();
        store
            .update(&shop, Credential::new("second", AuthScopes::new()))
            .await
            .unwrap();

        let stored = store.get(&shop).await.unwrap().unwrap();
        assert_eq!(stored.access_token, "second");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryCredentialStore::new();
        let shop = shop("my-store");

        store
            .update(&shop, Credential::new("token", AuthScopes::new()))
            .await
            .unwrap();
        store.delete(&shop).await.unwrap();
        store.delete(&shop).await.unwrap();

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_updates_leave_one_whole_record() {
        let store = MemoryCredentialStore::new();
        let shop = shop("busy-store");

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..32 {
            let store = store.clone();
            let shop = shop.clone();
            tasks.spawn(async move {
                store
                    .update(&shop, Credential::new(format!("token-{i}"), AuthScopes::new()))
                    .await
            });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap().unwrap();
        }

        let stored = store.get(&shop).await.unwrap().unwrap();
        assert!(stored.access_token.starts_with("token-"));
        assert_eq!(store.len().await, 1);
    }
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use shared::{
    domain::{CartItem, InventoryItem, ItemId, NewCartEntry},
    error::ApiError,
    protocol::{cart_entry_path, cart_route, inventory_route},
};
use tracing::debug;
use url::Url;

use crate::error::StoreError;

/// Remote CRUD over the inventory and cart resources.
///
/// Implementations carry no reconciliation logic; every failure is reported
/// as a [`StoreError`] and the caller decides what to do with local state.
#[async_trait]
pub trait StoreClient: Send + Sync {
    async fn fetch_inventory(&self) -> Result<Vec<InventoryItem>, StoreError>;
    async fn fetch_cart(&self) -> Result<Vec<CartItem>, StoreError>;
    /// Fails with [`StoreError::Conflict`] if the store already has this id.
    async fn create_cart_entry(&self, entry: NewCartEntry) -> Result<CartItem, StoreError>;
    /// Fails with [`StoreError::NotFound`] if the store has no entry for `id`.
    async fn update_cart_entry(&self, id: ItemId, item: CartItem)
        -> Result<CartItem, StoreError>;
    /// Not idempotent: deleting an absent id fails with [`StoreError::NotFound`].
    async fn delete_cart_entry(&self, id: ItemId) -> Result<(), StoreError>;
}

pub struct HttpStoreClient {
    http: Client,
    base_url: Url,
}

impl HttpStoreClient {
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(StoreError::transport)?;
        Self::with_client(base_url, http)
    }

    fn with_client(base_url: &str, http: Client) -> Result<Self, StoreError> {
        let mut base_url = Url::parse(base_url.trim())
            .map_err(|e| StoreError::Transport(format!("invalid store url '{base_url}': {e}")))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(StoreError::transport)
    }
}

async fn check_status(response: Response, id: Option<ItemId>) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => Err(StoreError::NotFound(id)),
        (StatusCode::CONFLICT, Some(id)) => Err(StoreError::Conflict(id)),
        _ => {
            let detail = match response.json::<ApiError>().await {
                Ok(body) => body.message,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            };
            Err(StoreError::Transport(format!("{status}: {detail}")))
        }
    }
}

#[async_trait]
impl StoreClient for HttpStoreClient {
    async fn fetch_inventory(&self) -> Result<Vec<InventoryItem>, StoreError> {
        debug!("fetching inventory");
        let response = self
            .http
            .get(self.endpoint(inventory_route())?)
            .send()
            .await
            .map_err(StoreError::transport)?;
        check_status(response, None)
            .await?
            .json()
            .await
            .map_err(StoreError::transport)
    }

    async fn fetch_cart(&self) -> Result<Vec<CartItem>, StoreError> {
        debug!("fetching cart");
        let response = self
            .http
            .get(self.endpoint(cart_route())?)
            .send()
            .await
            .map_err(StoreError::transport)?;
        check_status(response, None)
            .await?
            .json()
            .await
            .map_err(StoreError::transport)
    }

    async fn create_cart_entry(&self, entry: NewCartEntry) -> Result<CartItem, StoreError> {
        let id = entry.id;
        debug!(item_id = %id, quantity = entry.quantity, "creating cart entry");
        let response = self
            .http
            .post(self.endpoint(cart_route())?)
            .json(&entry)
            .send()
            .await
            .map_err(StoreError::transport)?;
        check_status(response, Some(id))
            .await?
            .json()
            .await
            .map_err(StoreError::transport)
    }

    async fn update_cart_entry(
        &self,
        id: ItemId,
        item: CartItem,
    ) -> Result<CartItem, StoreError> {
        debug!(item_id = %id, quantity = item.quantity, "updating cart entry");
        let response = self
            .http
            .put(self.endpoint(&cart_entry_path(id))?)
            .json(&item)
            .send()
            .await
            .map_err(StoreError::transport)?;
        check_status(response, Some(id))
            .await?
            .json()
            .await
            .map_err(StoreError::transport)
    }

    async fn delete_cart_entry(&self, id: ItemId) -> Result<(), StoreError> {
        debug!(item_id = %id, "deleting cart entry");
        let response = self
            .http
            .delete(self.endpoint(&cart_entry_path(id))?)
            .send()
            .await
            .map_err(StoreError::transport)?;
        check_status(response, Some(id)).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;

use std::sync::Arc;

use futures::future::{join, join_all};
use shared::domain::{CartItem, ItemId};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::{
    error::{CheckoutError, ShopError},
    events::{Operation, ShopEvent},
    state::{CartState, SubscriptionId},
    store::StoreClient,
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Turns user commands into store calls and applies the confirmed results to
/// [`CartState`].
///
/// Commands take `&mut self`, so the state is only ever mutated between
/// awaits by the command that owns the borrow. A failed store call never
/// touches the state; it is logged, published as
/// [`ShopEvent::OperationFailed`] and returned to the caller.
pub struct CartController {
    state: CartState,
    store: Arc<dyn StoreClient>,
    events: broadcast::Sender<ShopEvent>,
}

impl CartController {
    pub fn new(state: CartState, store: Arc<dyn StoreClient>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state,
            store,
            events,
        }
    }

    pub fn state(&self) -> &CartState {
        &self.state
    }

    /// See [`CartState::subscribe`].
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.state.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.state.unsubscribe(id)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ShopEvent> {
        self.events.subscribe()
    }

    /// Fetches inventory and cart together. Whichever snapshot arrives is
    /// applied even if the other fetch fails.
    pub async fn load(&mut self) -> Result<(), ShopError> {
        let (inventory, cart) =
            join(self.store.fetch_inventory(), self.store.fetch_cart()).await;

        let mut first_error = None;
        match inventory {
            Ok(items) => self.state.set_inventory(items),
            Err(err) => first_error = Some(err),
        }
        match cart {
            Ok(items) => self.state.set_cart(items),
            Err(err) => first_error = first_error.or(Some(err)),
        }

        match first_error {
            Some(err) => Err(self.surface(Operation::Load, err.into())),
            None => {
                info!(
                    inventory = self.state.inventory().len(),
                    cart = self.state.cart().len(),
                    "loaded store snapshot"
                );
                Ok(())
            }
        }
    }

    pub async fn refresh_cart(&mut self) -> Result<(), ShopError> {
        match self.store.fetch_cart().await {
            Ok(items) => {
                self.state.set_cart(items);
                Ok(())
            }
            Err(err) => Err(self.surface(Operation::RefreshCart, err.into())),
        }
    }

    /// Local only: adjusts the staged quantity, floored at zero, and returns it.
    pub fn stage_quantity_delta(&mut self, id: ItemId, delta: i64) -> u32 {
        let quantity = self.state.stage_delta(id, delta);
        self.publish_staged(id, quantity);
        quantity
    }

    /// Commits the staged quantity for `id`, merging into an existing cart
    /// entry when there is one. Returns `Ok(None)` when nothing is staged.
    pub async fn commit_to_cart(&mut self, id: ItemId) -> Result<Option<CartItem>, ShopError> {
        let staged = self.state.staged_quantity(id);
        if staged == 0 {
            return Ok(None);
        }

        let result = match self.state.cart_item(id).cloned() {
            Some(existing) => {
                let merged = CartItem {
                    quantity: existing.quantity.saturating_add(staged),
                    ..existing
                };
                self.store.update_cart_entry(id, merged).await
            }
            None => {
                let Some(entry) = self
                    .state
                    .inventory_item(id)
                    .map(|item| item.with_quantity(staged))
                else {
                    return Err(self.surface(Operation::CommitToCart, ShopError::UnknownItem(id)));
                };
                self.store.create_cart_entry(entry).await
            }
        };

        match result {
            Ok(item) => {
                info!(item_id = %id, staged, quantity = item.quantity, "committed to cart");
                self.state.reset_staged(id);
                self.publish_staged(id, 0);
                self.state.patch_cart(item.clone());
                Ok(Some(item))
            }
            Err(err) => Err(self.surface(Operation::CommitToCart, err.into())),
        }
    }

    pub async fn remove_from_cart(&mut self, id: ItemId) -> Result<(), ShopError> {
        match self.store.delete_cart_entry(id).await {
            Ok(()) => {
                info!(item_id = %id, "removed from cart");
                self.state.remove_from_cart(id);
                Ok(())
            }
            Err(err) => Err(self.surface(Operation::RemoveFromCart, err.into())),
        }
    }

    pub fn change_page(&mut self, page: usize) -> usize {
        self.state.set_page(page)
    }

    /// Deletes every entry of the cart as it was when checkout started.
    ///
    /// Deletions run concurrently and all of them settle before the state is
    /// considered. The local cart is emptied only if every deletion
    /// succeeded; otherwise it is left as it was and the returned
    /// [`CheckoutError`] lists which ids the store did remove, so the caller
    /// can follow up with [`Self::refresh_cart`].
    pub async fn checkout(&mut self) -> Result<Vec<ItemId>, ShopError> {
        let ids: Vec<ItemId> = self.state.cart().iter().map(|item| item.id).collect();

        let store = &self.store;
        let results = join_all(
            ids.iter()
                .map(|&id| async move { (id, store.delete_cart_entry(id).await) }),
        )
        .await;

        let mut deleted = Vec::with_capacity(ids.len());
        let mut failed = Vec::new();
        for (id, result) in results {
            match result {
                Ok(()) => deleted.push(id),
                Err(err) => failed.push((id, err)),
            }
        }

        if !failed.is_empty() {
            let err = CheckoutError { deleted, failed };
            return Err(self.surface(Operation::Checkout, err.into()));
        }

        info!(removed = deleted.len(), "checked out");
        self.state.set_cart(Vec::new());
        let _ = self.events.send(ShopEvent::CheckedOut {
            removed: deleted.clone(),
        });
        Ok(deleted)
    }

    fn publish_staged(&self, id: ItemId, quantity: u32) {
        let _ = self
            .events
            .send(ShopEvent::StagedQuantityChanged { id, quantity });
    }

    fn surface(&self, operation: Operation, err: ShopError) -> ShopError {
        warn!(%operation, error = %err, "store operation failed");
        let _ = self.events.send(ShopEvent::OperationFailed {
            operation,
            message: err.to_string(),
        });
        err
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;

use shared::domain::ItemId;
use thiserror::Error;

/// Failures reported by a [`crate::StoreClient`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store transport failure: {0}")]
    Transport(String),
    #[error("cart entry {0} already exists")]
    Conflict(ItemId),
    #[error("cart entry {0} not found")]
    NotFound(ItemId),
}

impl StoreError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Outcome of a checkout where at least one deletion failed. `deleted` lists
/// the ids the store confirmed removed before the failure was observed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("checkout failed for {} of {} cart entries", .failed.len(), .failed.len() + .deleted.len())]
pub struct CheckoutError {
    pub deleted: Vec<ItemId>,
    pub failed: Vec<(ItemId, StoreError)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShopError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("item {0} is not in the inventory")]
    UnknownItem(ItemId),
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

//! Notifications published by the controller for things observers of
//! [`crate::CartState`] never see: staged quantity changes and failures.

use std::fmt;

use shared::domain::ItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    RefreshCart,
    CommitToCart,
    RemoveFromCart,
    Checkout,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Load => "load",
            Self::RefreshCart => "refresh_cart",
            Self::CommitToCart => "commit_to_cart",
            Self::RemoveFromCart => "remove_from_cart",
            Self::Checkout => "checkout",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShopEvent {
    StagedQuantityChanged { id: ItemId, quantity: u32 },
    CheckedOut { removed: Vec<ItemId> },
    OperationFailed { operation: Operation, message: String },
}

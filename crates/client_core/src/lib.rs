//! Client-side reconciliation between a remote cart/inventory store and the
//! locally rendered view.

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod state;
pub mod store;

pub use config::{load_settings, ShopSettings};
pub use controller::CartController;
pub use error::{CheckoutError, ShopError, StoreError};
pub use events::{Operation, ShopEvent};
pub use state::{CartState, SubscriptionId};
pub use store::{HttpStoreClient, StoreClient};

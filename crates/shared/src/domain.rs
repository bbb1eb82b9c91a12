use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_newtype!(ItemId);

/// A purchasable catalog entry. Only the store assigns or changes these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: ItemId,
    pub content: String,
    #[serde(default)]
    pub price: f64,
}

impl InventoryItem {
    pub fn with_quantity(&self, quantity: u32) -> NewCartEntry {
        NewCartEntry {
            id: self.id,
            content: self.content.clone(),
            price: self.price,
            quantity,
        }
    }
}

/// One line of the cart. The store holds at most one entry per `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ItemId,
    pub content: String,
    pub quantity: u32,
}

/// Body of a cart create: the inventory item plus the committed quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCartEntry {
    pub id: ItemId,
    pub content: String,
    #[serde(default)]
    pub price: f64,
    pub quantity: u32,
}

impl From<NewCartEntry> for CartItem {
    fn from(value: NewCartEntry) -> Self {
        Self {
            id: value.id,
            content: value.content,
            quantity: value.quantity,
        }
    }
}

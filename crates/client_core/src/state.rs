//! Local snapshot of the store plus everything the renderer reads.

use std::{collections::HashMap, fmt};

use shared::domain::{CartItem, InventoryItem, ItemId};

pub const DEFAULT_ITEMS_PER_PAGE: usize = 5;

type Observer = Box<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Inventory and cart snapshots, the pagination cursor and staged quantities.
///
/// Every setter that changes inventory, cart or page notifies observers
/// synchronously before returning. Staged quantities are deliberately outside
/// that path: staging a click does not re-render the whole view.
pub struct CartState {
    inventory: Vec<InventoryItem>,
    cart: Vec<CartItem>,
    staged: HashMap<ItemId, u32>,
    current_page: usize,
    items_per_page: usize,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl Default for CartState {
    fn default() -> Self {
        Self::new(DEFAULT_ITEMS_PER_PAGE)
    }
}

impl fmt::Debug for CartState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartState")
            .field("inventory", &self.inventory.len())
            .field("cart", &self.cart)
            .field("staged", &self.staged)
            .field("current_page", &self.current_page)
            .field("items_per_page", &self.items_per_page)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl CartState {
    /// A page size of zero is treated as one.
    pub fn new(items_per_page: usize) -> Self {
        Self {
            inventory: Vec::new(),
            cart: Vec::new(),
            staged: HashMap::new(),
            current_page: 1,
            items_per_page: items_per_page.max(1),
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn inventory(&self) -> &[InventoryItem] {
        &self.inventory
    }

    pub fn inventory_item(&self, id: ItemId) -> Option<&InventoryItem> {
        self.inventory.iter().find(|item| item.id == id)
    }

    pub fn cart(&self) -> &[CartItem] {
        &self.cart
    }

    pub fn cart_item(&self, id: ItemId) -> Option<&CartItem> {
        self.cart.iter().find(|item| item.id == id)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn total_pages(&self) -> usize {
        self.inventory.len().div_ceil(self.items_per_page).max(1)
    }

    pub fn current_page_items(&self) -> &[InventoryItem] {
        let start = (self.current_page - 1)
            .saturating_mul(self.items_per_page)
            .min(self.inventory.len());
        let end = start
            .saturating_add(self.items_per_page)
            .min(self.inventory.len());
        &self.inventory[start..end]
    }

    pub fn set_inventory(&mut self, items: Vec<InventoryItem>) {
        self.inventory = items;
        // a shorter inventory can leave the cursor past the last page
        self.current_page = self.current_page.clamp(1, self.total_pages());
        self.notify();
    }

    /// Replaces the cart. Duplicate ids collapse into one entry, last wins.
    pub fn set_cart(&mut self, items: Vec<CartItem>) {
        self.cart = Vec::with_capacity(items.len());
        for item in items {
            self.upsert(item);
        }
        self.notify();
    }

    /// Updates the entry with the same id in place, or appends it.
    pub fn patch_cart(&mut self, item: CartItem) {
        self.upsert(item);
        self.notify();
    }

    pub fn remove_from_cart(&mut self, id: ItemId) {
        self.cart.retain(|item| item.id != id);
        self.notify();
    }

    /// Stores `page` clamped to `[1, total_pages()]` and returns the stored value.
    pub fn set_page(&mut self, page: usize) -> usize {
        self.current_page = page.clamp(1, self.total_pages());
        self.notify();
        self.current_page
    }

    pub fn staged_quantity(&self, id: ItemId) -> u32 {
        self.staged.get(&id).copied().unwrap_or(0)
    }

    /// Applies `delta` to the staged quantity for `id`, flooring at zero.
    pub fn stage_delta(&mut self, id: ItemId, delta: i64) -> u32 {
        let staged = self.staged.entry(id).or_insert(0);
        let next = i64::from(*staged)
            .saturating_add(delta)
            .clamp(0, i64::from(u32::MAX));
        *staged = u32::try_from(next).unwrap_or(u32::MAX);
        *staged
    }

    pub fn reset_staged(&mut self, id: ItemId) {
        self.staged.insert(id, 0);
    }

    /// Registers `callback` to run after every notifying setter.
    ///
    /// Callbacks take no arguments and get no handle to the state: while they
    /// run the state is exclusively borrowed by the setter that fired them, so
    /// an observer cannot mutate it and re-enter notification. Observers that
    /// need to react should read the projections after the setter returns.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    fn upsert(&mut self, item: CartItem) {
        match self.cart.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item,
            None => self.cart.push(item),
        }
    }

    fn notify(&self) {
        for (_, observer) in &self.observers {
            observer();
        }
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;

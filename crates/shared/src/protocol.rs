//! Store resource paths shared by the HTTP client and the store server.

use crate::domain::ItemId;

pub fn healthz_route() -> &'static str {
    "/healthz"
}

pub fn inventory_route() -> &'static str {
    "/inventory"
}

pub fn cart_route() -> &'static str {
    "/cart"
}

pub fn cart_entry_path(id: ItemId) -> String {
    format!("{}/{}", cart_route(), id.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CartItem, InventoryItem};

    #[test]
    fn cart_entry_path_appends_numeric_id() {
        assert_eq!(cart_entry_path(ItemId(42)), "/cart/42");
    }

    #[test]
    fn item_ids_serialize_as_bare_integers() {
        let item = CartItem {
            id: ItemId(7),
            content: "apple".into(),
            quantity: 2,
        };
        let json = serde_json::to_value(&item).expect("json");
        assert_eq!(
            json,
            serde_json::json!({ "id": 7, "content": "apple", "quantity": 2 })
        );
    }

    #[test]
    fn inventory_item_without_price_defaults_to_zero() {
        let item: InventoryItem =
            serde_json::from_str(r#"{ "id": 3, "content": "pear" }"#).expect("json");
        assert_eq!(item.price, 0.0);
    }

    #[test]
    fn cart_item_ignores_extra_store_fields() {
        let item: CartItem = serde_json::from_str(
            r#"{ "id": 3, "content": "pear", "price": 1.5, "quantity": 4 }"#,
        )
        .expect("json");
        assert_eq!(item.quantity, 4);
    }
}

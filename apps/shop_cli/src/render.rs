//! Plain-text projections of [`CartState`] for the terminal.

use std::fmt::Write as _;

use client_core::CartState;

pub fn render_inventory(state: &CartState) -> String {
    let mut out = format!(
        "Inventory (page {}/{})\n",
        state.current_page(),
        state.total_pages()
    );
    if state.current_page_items().is_empty() {
        out.push_str("  (empty)\n");
    }
    for item in state.current_page_items() {
        let _ = writeln!(
            out,
            "  [{:>3}] {:<20} {:>8.2}  staged: {}",
            item.id,
            item.content,
            item.price,
            state.staged_quantity(item.id)
        );
    }
    out
}

pub fn render_cart(state: &CartState) -> String {
    let mut out = String::from("Cart\n");
    if state.cart().is_empty() {
        out.push_str("  (empty)\n");
    }
    for item in state.cart() {
        let _ = writeln!(out, "  [{:>3}] {} x {}", item.id, item.content, item.quantity);
    }
    out
}

//! Human-readable activity messages.
//!
//! Every message names the product code so the log can be searched by code.

use crate::types::Item;

pub fn item_added(item: &Item) -> String {
    format!(
        "Added {} (code {}) with quantity {}",
        item.name, item.code, item.quantity
    )
}

/// Full edit; `previous_code` differs from `item.code` when the code changed.
pub fn item_updated(previous_code: &str, item: &Item) -> String {
    if previous_code == item.code {
        format!(
            "Updated {} (code {}): quantity {}",
            item.name, item.code, item.quantity
        )
    } else {
        format!(
            "Updated {} (code {} -> {}): quantity {}",
            item.name, previous_code, item.code, item.quantity
        )
    }
}

pub fn quantity_set(item: &Item) -> String {
    format!(
        "Set quantity of {} (code {}) to {}",
        item.name, item.code, item.quantity
    )
}

pub fn item_scanned(item: &Item, delta: u32) -> String {
    format!(
        "Scanned {} x {} (code {}), quantity now {}",
        delta, item.name, item.code, item.quantity
    )
}

pub fn item_removed(item: &Item) -> String {
    format!("Removed {} (code {})", item.name, item.code)
}

//! Cart inspection and editing commands.
//!
//! # Environment Variables
//!
//! - `CART_STORAGE_BACKEND` - Where the cart lives (`file` by default)
//! - `CART_STORAGE_DIR` - Directory for the `file` backend
//! - `CART_STORAGE_KEY` - Key the cart is stored under

use go_marketplace_cart::{CartError, use_cart};
use go_marketplace_core::{CartEntry, CartSummary, NewCartItem, ProductId};
use tracing::info;

/// Log every cart line followed by the totals.
fn report(lines: &[CartEntry], summary: CartSummary) {
    if lines.is_empty() {
        info!("Cart is empty");
        return;
    }

    for line in lines {
        info!(
            id = %line.id,
            quantity = line.quantity.get(),
            price = %line.price,
            line_price = %line.line_price(),
            "{}",
            line.title
        );
    }
    info!(
        items = summary.item_count,
        subtotal = %summary.subtotal,
        "Cart total"
    );
}

/// Show the cart.
///
/// # Errors
///
/// Returns an error if the cart has not been initialized.
pub fn show() -> Result<(), CartError> {
    let cart = use_cart()?;
    report(&cart.products(), cart.summary());
    Ok(())
}

/// Add one unit of `item` to the cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be persisted.
pub async fn add(item: NewCartItem) -> Result<(), CartError> {
    let cart = use_cart()?;
    let lines = cart.add_to_cart(item).await?;
    report(&lines, CartSummary::from_entries(&lines));
    Ok(())
}

/// Increase the quantity of `id` by one.
///
/// # Errors
///
/// Returns an error if the cart cannot be persisted.
pub async fn increment(id: &ProductId) -> Result<(), CartError> {
    let cart = use_cart()?;
    let lines = cart.increment(id).await?;
    report(&lines, CartSummary::from_entries(&lines));
    Ok(())
}

/// Decrease the quantity of `id` by one, stopping at 1.
///
/// # Errors
///
/// Returns an error if the cart cannot be persisted.
pub async fn decrement(id: &ProductId) -> Result<(), CartError> {
    let cart = use_cart()?;
    let lines = cart.decrement(id).await?;
    report(&lines, CartSummary::from_entries(&lines));
    Ok(())
}

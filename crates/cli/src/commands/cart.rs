//! Cart inspection and editing commands.
//!
//! # Usage
//!
//! ```bash
//! # Show the stored cart
//! gm-cli show
//!
//! # Add one unit of a product
//! gm-cli add --id p1 --title "Shirt" --image-url https://img/p1 --price 10
//!
//! # Change quantities
//! gm-cli increment p1
//! gm-cli decrement p1
//! ```

use std::fmt::Write as _;
use std::path::Path;

use go_marketplace_cart::{CartConfig, CartError, CartStore, FileStore};
use go_marketplace_core::{CartEntry, CartProduct, Decrement, ProductId};
use tracing::{info, warn};

/// Open the file-backed cart under `data_dir` and wait for it to load.
///
/// # Errors
///
/// Returns an error if the store cannot be activated.
pub async fn open(data_dir: &Path, config: &CartConfig) -> Result<CartStore, CartError> {
    let store = CartStore::new(FileStore::new(data_dir), config);
    store.activate();
    store.ready().await?;

    info!(
        data_dir = %data_dir.display(),
        key = store.storage_key(),
        "Opened cart"
    );
    Ok(store)
}

/// Print the cart.
///
/// # Errors
///
/// Returns an error if the store is not active.
#[allow(clippy::print_stdout)]
pub fn show(store: &CartStore) -> Result<(), CartError> {
    let products = store.products()?;
    print!("{}", render(&products));
    Ok(())
}

/// Add one unit of a product and persist the cart.
///
/// # Errors
///
/// Returns an error if the store is not active or the writer stopped.
pub async fn add(store: &CartStore, product: CartProduct) -> Result<(), CartError> {
    let id = product.id.clone();
    let quantity = store.add_to_cart(product).await?;
    store.flush().await?;

    info!(product_id = %id, quantity = quantity.get(), "Added to cart");
    Ok(())
}

/// Add one unit to an existing line and persist the cart.
///
/// # Errors
///
/// Returns an error if the store is not active or the writer stopped.
pub async fn increment(store: &CartStore, id: &ProductId) -> Result<(), CartError> {
    match store.increment(id).await? {
        Some(quantity) => info!(product_id = %id, quantity = quantity.get(), "Incremented"),
        None => warn!(product_id = %id, "Product is not in the cart"),
    }
    store.flush().await
}

/// Remove one unit from a line and persist the cart.
///
/// # Errors
///
/// Returns an error if the store is not active or the writer stopped.
pub async fn decrement(store: &CartStore, id: &ProductId) -> Result<(), CartError> {
    match store.decrement(id).await? {
        Decrement::Reduced(quantity) => {
            info!(product_id = %id, quantity = quantity.get(), "Decremented");
        }
        Decrement::Removed => info!(product_id = %id, "Removed from cart"),
        Decrement::NotFound => warn!(product_id = %id, "Product is not in the cart"),
    }
    store.flush().await
}

/// Format cart lines as a plain-text table.
fn render(entries: &[CartEntry]) -> String {
    if entries.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let mut out = String::new();
    let mut items = 0_u64;
    for entry in entries {
        items += u64::from(entry.quantity.get());
        let _ = writeln!(
            out,
            "{}\t{}\t{} x {}\t{}",
            entry.id, entry.title, entry.quantity, entry.price, entry.image_url
        );
    }
    let _ = writeln!(out, "{} line(s), {items} item(s)", entries.len());
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn entry(id: &str, quantity: u32) -> CartEntry {
        let mut entry = CartEntry::from_product(CartProduct::new(
            id,
            "Shirt",
            "u1",
            Decimal::new(1050, 2),
        ));
        entry.quantity = std::num::NonZeroU32::new(quantity).unwrap();
        entry
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[]), "Cart is empty\n");
    }

    #[test]
    fn test_render_lines_and_totals() {
        let output = render(&[entry("p1", 2), entry("p2", 1)]);

        assert!(output.contains("p1\tShirt\t2 x 10.50\tu1"));
        assert!(output.ends_with("2 line(s), 3 item(s)\n"));
    }

    #[tokio::test]
    async fn test_commands_persist_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let config = CartConfig::default();

        {
            let store = open(dir.path(), &config).await.unwrap();
            add(&store, CartProduct::new("p1", "Shirt", "u1", Decimal::from(10)))
                .await
                .unwrap();
            increment(&store, &ProductId::new("p1")).await.unwrap();
        }

        let store = open(dir.path(), &config).await.unwrap();
        assert_eq!(store.products().unwrap()[0].quantity.get(), 2);

        decrement(&store, &ProductId::new("p1")).await.unwrap();
        decrement(&store, &ProductId::new("p1")).await.unwrap();

        let store = open(dir.path(), &config).await.unwrap();
        assert!(store.products().unwrap().is_empty());
    }
}

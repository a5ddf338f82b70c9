//! Cart commands.
//!
//! Every mutation redraws the full cart panel through the cart's render hook.

use std::sync::Arc;

use shoe_pos::PosError;
use shoe_pos::error::add_breadcrumb;
use shoe_pos_core::VariantId;
use tracing::info;

use super::{Session, line_index};

/// Draw the cart panel.
pub async fn show(session: &Session) -> Result<(), PosError> {
    let catalog = session.catalog_or_empty().await;
    let mut cart = session.open_rendered_cart(catalog)?;
    cart.reload();
    Ok(())
}

/// Add `quantity` units of a variant.
pub async fn add(session: &Session, variant_id: i32, quantity: u32) -> Result<(), PosError> {
    let variant_id = VariantId::new(variant_id);
    let id_text = variant_id.to_string();
    let quantity_text = quantity.to_string();
    add_breadcrumb(
        "cart",
        "Add to cart",
        Some(&[("variant_id", id_text.as_str()), ("quantity", quantity_text.as_str())]),
    );

    let catalog = session.load_catalog().await?;
    let mut cart = session.open_rendered_cart(Arc::clone(&catalog))?;
    let line = cart.add(variant_id, quantity, catalog.as_ref())?;

    info!(%variant_id, quantity = line.quantity, "Cart line updated");
    Ok(())
}

/// Remove the line numbered `line`.
pub async fn remove(session: &Session, line: usize) -> Result<(), PosError> {
    let index = line_index(line)?;
    add_breadcrumb("cart", "Remove from cart", None);

    let catalog = session.catalog_or_empty().await;
    let mut cart = session.open_rendered_cart(catalog)?;
    cart.remove(index)?;
    Ok(())
}

/// Set the quantity of the line numbered `line`.
pub async fn update(session: &Session, line: usize, quantity: i64) -> Result<(), PosError> {
    let index = line_index(line)?;
    add_breadcrumb("cart", "Update quantity", None);

    let catalog = session.catalog_or_empty().await;
    let mut cart = session.open_rendered_cart(Arc::clone(&catalog))?;
    cart.update_quantity(index, quantity, catalog.as_ref())?;
    Ok(())
}

/// Drop lines whose variant is missing from the catalog.
pub async fn purge(session: &Session) -> Result<(), PosError> {
    let catalog = session.load_catalog().await?;
    let mut cart = session.open_rendered_cart(Arc::clone(&catalog))?;

    let removed = cart.purge_orphans(&catalog)?;
    if removed.is_empty() {
        cart.reload();
    }
    info!(removed = removed.len(), "Purged orphaned cart lines");
    Ok(())
}

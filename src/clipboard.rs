//! Single-slot product clipboard.
//!
//! Pasting always yields a standalone product: parent links are not carried
//! over, and the store assigns a fresh id when the paste is added.

#[cfg(test)]
#[path = "clipboard_test.rs"]
mod clipboard_test;

use crate::scene::{EntityId, NewProduct, Product, SceneStore};

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    item: Option<Product>,
}

impl Clipboard {
    /// Keep a copy of `product`, replacing whatever was held.
    pub fn copy(&mut self, product: &Product) {
        self.item = Some(product.clone());
    }

    /// Copy the product, then remove it from `store`. Returns `false` (and
    /// leaves the clipboard alone) for an unknown id.
    pub fn cut(&mut self, store: &mut SceneStore, id: EntityId) -> bool {
        let Some(product) = store.product(&id) else {
            return false;
        };
        self.item = Some(product.clone());
        store.delete_product(id)
    }

    /// A creation request for the held product shifted by `offset` on both
    /// axes, or `None` when empty.
    #[must_use]
    pub fn paste(&self, offset: f64) -> Option<NewProduct> {
        let item = self.item.as_ref()?;
        Some(NewProduct {
            x: item.x + offset,
            y: item.y + offset,
            width: item.width,
            height: item.height,
            shelf_id: None,
            relative_x: None,
            relative_y: None,
            kind: Some(item.kind.clone()),
            code: Some(item.code.clone()),
            color: Some(item.color.clone()),
            image: item.image.clone(),
        })
    }
}

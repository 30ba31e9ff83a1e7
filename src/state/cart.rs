//! Shopping cart: an ordered list of (product, quantity) lines.
//!
//! DESIGN
//! ======
//! At most one line per product id, in insertion order. Quantities are never
//! clamped against the product's stock; the backend decides at checkout.
//! The total is recomputed on every read.

#[cfg(test)]
#[path = "cart_test.rs"]
mod cart_test;

use crate::net::types::Product;

#[derive(Clone, Debug, PartialEq)]
pub struct CartLine {
    pub product: Product,
    /// Always at least 1.
    pub quantity: u32,
}

impl CartLine {
    #[must_use]
    pub fn subtotal(&self) -> f64 {
        self.product.price * f64::from(self.quantity)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Add one unit of `product`. Out-of-stock products are ignored.
    ///
    /// Returns whether the cart changed.
    pub fn add(&mut self, product: &Product) -> bool {
        if !product.in_stock() {
            tracing::debug!(id = %product.id, "ignoring out-of-stock product");
            return false;
        }
        match self.lines.iter_mut().find(|line| line.product.id == product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.lines.push(CartLine { product: product.clone(), quantity: 1 }),
        }
        true
    }

    /// Set a line's quantity exactly. Zero or negative removes the line;
    /// unknown ids are ignored.
    pub fn set_quantity(&mut self, id: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove(id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(line) = self.lines.iter_mut().find(|line| line.product.id == id) {
            line.quantity = quantity;
        }
    }

    pub fn remove(&mut self, id: &str) {
        self.lines.retain(|line| line.product.id != id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.lines.iter().map(CartLine::subtotal).sum()
    }
}

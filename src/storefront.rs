//! Callbacks into the surrounding storefront.

use crate::catalog::Product;

/// Events the catalog screen reports to its host.
pub trait StorefrontHooks: Send {
    fn on_add_to_cart(&mut self, product: &Product);
    fn on_product_click(&mut self, product: &Product);
    /// The user left the catalog screen.
    fn on_back(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
}

/// Host implementation that keeps a cart and logs every event.
#[derive(Debug, Default)]
pub struct CartRecorder {
    lines: Vec<CartLine>,
    clicks: u32,
}

impl CartRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn total(&self) -> f64 {
        self.lines
            .iter()
            .map(|l| l.unit_price * l.quantity as f64)
            .sum()
    }

    pub fn clicks(&self) -> u32 {
        self.clicks
    }
}

impl StorefrontHooks for CartRecorder {
    fn on_add_to_cart(&mut self, product: &Product) {
        match self.lines.iter_mut().find(|l| l.product_id == product.id) {
            Some(line) => line.quantity += 1,
            None => self.lines.push(CartLine {
                product_id: product.id.clone(),
                name: product.name.clone(),
                unit_price: product.price,
                quantity: 1,
            }),
        }
        tracing::info!(
            id = %product.id,
            name = %product.name,
            price = product.price,
            items = self.item_count(),
            "added to cart"
        );
    }

    fn on_product_click(&mut self, product: &Product) {
        self.clicks += 1;
        tracing::info!(id = %product.id, name = %product.name, "product opened");
    }

    fn on_back(&mut self) {
        tracing::info!(
            items = self.item_count(),
            total = format!("{:.2}", self.total()),
            "leaving catalog"
        );
    }
}

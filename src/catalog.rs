//! Product catalog: records, the built-in storefront list, and synthetic variants.

use anyhow::{bail, Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Dollars.
    pub price: f64,
    /// 0.0 - 5.0
    pub rating: f64,
    pub reviews: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
}

impl Catalog {
    /// The built-in storefront catalog plus `variant_copies` synthetic copies
    /// of every base product.
    pub fn builtin<R: Rng>(variant_copies: usize, rng: &mut R) -> Self {
        let mut catalog = Self {
            categories: builtin_categories(),
            products: builtin_products(),
        };
        catalog.extend_with_variants(variant_copies, rng);
        catalog
    }

    /// Load a catalog from a JSON file of the form
    /// `{ "categories": [...], "products": [...] }`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
        let catalog: Catalog = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse catalog JSON: {}", path.display()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<()> {
        let category_ids: HashSet<&str> = self.categories.iter().map(|c| c.id.as_str()).collect();
        let mut seen: HashSet<&str> = HashSet::new();
        for p in &self.products {
            if !seen.insert(p.id.as_str()) {
                bail!("duplicate product id: {}", p.id);
            }
            if !category_ids.contains(p.category.as_str()) {
                bail!("product {} has unknown category: {}", p.id, p.category);
            }
            if !p.price.is_finite() || p.price < 0.0 {
                bail!("product {} has invalid price: {}", p.id, p.price);
            }
            if !(0.0..=5.0).contains(&p.rating) {
                bail!("product {} has rating out of range: {}", p.id, p.rating);
            }
        }
        Ok(())
    }

    /// Append `copies` variants of every product currently in the catalog.
    pub fn extend_with_variants<R: Rng>(&mut self, copies: usize, rng: &mut R) {
        let variants = generate_variants(&self.products, copies, rng);
        self.products.extend(variants);
    }
}

/// Clone each base product `copies` times with a derived id, a price
/// perturbed by up to ±20%, and a random rating and review count.
///
/// Output order is copy-major: all of copy 1, then all of copy 2, ...
pub fn generate_variants<R: Rng>(base: &[Product], copies: usize, rng: &mut R) -> Vec<Product> {
    let mut out = Vec::with_capacity(base.len() * copies);
    for n in 1..=copies {
        for p in base {
            let factor: f64 = rng.gen_range(0.8..1.2);
            let price = ((p.price * factor * 100.0).round() / 100.0).max(0.01);
            let rating = (rng.gen_range(3.0..=5.0_f64) * 10.0).round() / 10.0;
            let reviews = rng.gen_range(5..=500);
            out.push(Product {
                id: format!("{}-v{}", p.id, n),
                price,
                rating,
                reviews,
                ..p.clone()
            });
        }
    }
    out
}

fn builtin_categories() -> Vec<Category> {
    [
        ("electronics", "Electronics"),
        ("clothing", "Clothing"),
        ("home", "Home & Kitchen"),
        ("sports", "Sports & Outdoors"),
        ("books", "Books"),
        ("beauty", "Beauty"),
    ]
    .into_iter()
    .map(|(id, name)| Category {
        id: id.to_string(),
        name: name.to_string(),
    })
    .collect()
}

fn builtin_products() -> Vec<Product> {
    let rows: [(&str, &str, &str, &str, f64, f64, u32); 12] = [
        ("1", "Wireless Headphones", "Noise-cancelling over-ear headphones with 30h battery", "electronics", 199.99, 4.5, 328),
        ("2", "Smart Watch", "Fitness tracking, heart-rate monitor and notifications", "electronics", 249.99, 4.3, 512),
        ("3", "Bluetooth Speaker", "Portable waterproof speaker with deep bass", "electronics", 79.99, 4.6, 201),
        ("4", "Denim Jacket", "Classic fit jacket in washed blue denim", "clothing", 89.99, 4.2, 97),
        ("5", "Running Sneakers", "Lightweight cushioned shoes for daily runs", "clothing", 119.99, 4.7, 640),
        ("6", "Ceramic Cookware Set", "Ten-piece non-stick pots and pans", "home", 159.99, 4.4, 188),
        ("7", "Espresso Machine", "15-bar pump espresso maker with milk frother", "home", 349.99, 4.1, 75),
        ("8", "Yoga Mat", "Extra thick non-slip mat with carry strap", "sports", 34.99, 4.8, 902),
        ("9", "Camping Tent", "Four-person waterproof dome tent", "sports", 189.99, 4.0, 143),
        ("10", "Mystery Novel", "Bestselling whodunit set in a coastal town", "books", 14.99, 4.6, 1210),
        ("11", "Cookbook Classics", "200 recipes for the home kitchen", "books", 29.99, 4.5, 356),
        ("12", "Skincare Gift Set", "Cleanser, toner and moisturizer trio", "beauty", 59.99, 4.3, 264),
    ];
    rows.into_iter()
        .map(|(id, name, description, category, price, rating, reviews)| Product {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            price,
            rating,
            reviews,
        })
        .collect()
}

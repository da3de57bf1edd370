//! Read-only product catalog.
//!
//! The catalog is a fixed, immutable product set loaded once at process
//! start, either from a JSON fixture file or from the built-in demo data.
//! Nothing in the engine mutates it; carts carry value snapshots of its
//! products.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tidepool_core::{CategoryId, Price, ProductId};

use crate::models::{Category, Product};

/// Maximum number of related products returned for a product page.
const RELATED_LIMIT: usize = 4;

/// Category slug that selects the whole catalog.
const ALL_SLUG: &str = "all";

/// Errors that can occur while loading a catalog fixture.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Fixture file could not be read.
    #[error("failed to read catalog fixture: {0}")]
    Io(#[from] std::io::Error),

    /// Fixture file is not valid catalog JSON.
    #[error("failed to parse catalog fixture: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two products share an id.
    #[error("duplicate product id in catalog: {0}")]
    DuplicateProduct(ProductId),
}

/// On-disk fixture shape: categories plus products.
#[derive(Debug, Serialize, Deserialize)]
struct CatalogData {
    categories: Vec<Category>,
    products: Vec<Product>,
}

/// Immutable product/category set with id and slug lookups.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
    categories: Vec<Category>,
}

impl Catalog {
    /// Build a catalog from categories and products.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateProduct` if two products share an id.
    pub fn new(categories: Vec<Category>, products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(products.len());
        for (i, product) in products.iter().enumerate() {
            if index.insert(product.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateProduct(product.id.clone()));
            }
            if let Some(discounted) = product.discounted_price.filter(|d| *d > product.price) {
                // Display-only convention, not an invariant: surface bad
                // fixture data without rejecting it.
                tracing::warn!(
                    product_id = %product.id,
                    price = %product.price,
                    discounted_price = %discounted,
                    "product discounted price exceeds base price"
                );
            }
            if !categories.iter().any(|c| c.id == product.category) {
                tracing::warn!(
                    product_id = %product.id,
                    category = %product.category,
                    "product references unknown category"
                );
            }
        }

        Ok(Self {
            products,
            index,
            categories,
        })
    }

    /// Load a catalog from a JSON fixture file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the file cannot be read, parsed, or contains
    /// duplicate product ids.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let data: CatalogData = serde_json::from_str(&raw)?;
        tracing::info!(
            path = %path.display(),
            products = data.products.len(),
            categories = data.categories.len(),
            "loaded catalog fixture"
        );
        Self::new(data.categories, data.products)
    }

    /// Look up a product by id.
    #[must_use]
    pub fn by_id(&self, id: &ProductId) -> Option<&Product> {
        self.index.get(id).and_then(|&i| self.products.get(i))
    }

    /// All products in a category, in catalog order.
    ///
    /// The `"all"` slug selects every product. An unknown slug yields an
    /// empty list.
    #[must_use]
    pub fn by_category_slug(&self, slug: &str) -> Vec<&Product> {
        if slug == ALL_SLUG {
            return self.products.iter().collect();
        }
        let Some(category) = self.categories.iter().find(|c| c.slug == slug) else {
            return Vec::new();
        };
        self.products
            .iter()
            .filter(|p| p.category == category.id)
            .collect()
    }

    /// Products flagged as featured, in catalog order.
    #[must_use]
    pub fn featured(&self) -> Vec<&Product> {
        self.products.iter().filter(|p| p.featured).collect()
    }

    /// Products in the same category as `id`, excluding the product itself,
    /// capped at a display limit.
    #[must_use]
    pub fn related(&self, id: &ProductId) -> Vec<&Product> {
        let Some(product) = self.by_id(id) else {
            return Vec::new();
        };
        self.products
            .iter()
            .filter(|p| p.category == product.category && p.id != *id)
            .take(RELATED_LIMIT)
            .collect()
    }

    /// All products, in fixture order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// All categories, in fixture order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// The built-in demo catalog.
    ///
    /// # Panics
    ///
    /// Panics if the built-in fixture is inconsistent, which would be a bug
    /// in this crate.
    #[must_use]
    pub fn demo() -> Self {
        Self::new(demo_categories(), demo_products())
            .unwrap_or_else(|e| panic!("built-in demo catalog is invalid: {e}"))
    }
}

fn demo_categories() -> Vec<Category> {
    vec![
        Category {
            id: CategoryId::new("cat-1"),
            name: "Electronics".to_string(),
            slug: "electronics".to_string(),
        },
        Category {
            id: CategoryId::new("cat-2"),
            name: "Home & Kitchen".to_string(),
            slug: "home".to_string(),
        },
        Category {
            id: CategoryId::new("cat-3"),
            name: "Accessories".to_string(),
            slug: "accessories".to_string(),
        },
    ]
}

#[allow(clippy::too_many_lines)]
fn demo_products() -> Vec<Product> {
    vec![
        Product {
            id: ProductId::new("p1"),
            name: "Premium Wireless Headphones".to_string(),
            description: "Over-ear wireless headphones with active noise cancellation and 30-hour battery life.".to_string(),
            price: Price::from_cents(24999),
            discounted_price: None,
            category: CategoryId::new("cat-1"),
            tags: vec!["audio".to_string(), "wireless".to_string()],
            image: "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?auto=format&fit=crop&w=1000&q=80".to_string(),
            rating: 4.7,
            review_count: 382,
            in_stock: true,
            featured: true,
        },
        Product {
            id: ProductId::new("p2"),
            name: "Ultra-Slim Laptop".to_string(),
            description: "13-inch ultraportable with all-day battery and a machined aluminum chassis.".to_string(),
            price: Price::from_cents(129_999),
            discounted_price: Some(Price::from_cents(109_999)),
            category: CategoryId::new("cat-1"),
            tags: vec!["computers".to_string()],
            image: "https://images.unsplash.com/photo-1496181133206-80ce9b88a853?auto=format&fit=crop&w=1000&q=80".to_string(),
            rating: 4.5,
            review_count: 217,
            in_stock: true,
            featured: true,
        },
        Product {
            id: ProductId::new("p3"),
            name: "Smart Fitness Watch".to_string(),
            description: "Heart-rate, sleep, and workout tracking with a week of battery.".to_string(),
            price: Price::from_cents(16999),
            discounted_price: None,
            category: CategoryId::new("cat-1"),
            tags: vec!["wearable".to_string(), "fitness".to_string()],
            image: "https://images.unsplash.com/photo-1575311373937-040b8e3fd243?auto=format&fit=crop&w=1000&q=80".to_string(),
            rating: 4.3,
            review_count: 529,
            in_stock: true,
            featured: false,
        },
        Product {
            id: ProductId::new("p4"),
            name: "Portable Bluetooth Speaker".to_string(),
            description: "Pocket-size speaker with surprising bass and 12 hours of playtime.".to_string(),
            price: Price::from_cents(8999),
            discounted_price: Some(Price::from_cents(6999)),
            category: CategoryId::new("cat-1"),
            tags: vec!["audio".to_string()],
            image: "https://images.unsplash.com/photo-1608043152269-423dbba4e7e1?auto=format&fit=crop&w=1000&q=80".to_string(),
            rating: 4.1,
            review_count: 203,
            in_stock: true,
            featured: false,
        },
        Product {
            id: ProductId::new("p5"),
            name: "Handcrafted Ceramic Dinnerware Set".to_string(),
            description: "16-piece stoneware set, glazed by hand; dishwasher and microwave safe.".to_string(),
            price: Price::from_cents(18999),
            discounted_price: None,
            category: CategoryId::new("cat-2"),
            tags: vec!["kitchen".to_string(), "handmade".to_string()],
            image: "https://images.unsplash.com/photo-1610701596061-2ecf227e85b2?auto=format&fit=crop&w=1000&q=80".to_string(),
            rating: 4.8,
            review_count: 76,
            in_stock: true,
            featured: true,
        },
        Product {
            id: ProductId::new("p6"),
            name: "Cast Iron Dutch Oven".to_string(),
            description: "5.5-quart enameled cast iron, oven safe to 500F.".to_string(),
            price: Price::from_cents(11999),
            discounted_price: Some(Price::from_cents(9999)),
            category: CategoryId::new("cat-2"),
            tags: vec!["kitchen".to_string(), "cookware".to_string()],
            image: "https://images.unsplash.com/photo-1585442245979-c3abd3526c62?auto=format&fit=crop&w=1000&q=80".to_string(),
            rating: 4.6,
            review_count: 148,
            in_stock: true,
            featured: false,
        },
        Product {
            id: ProductId::new("p7"),
            name: "Leather Messenger Bag".to_string(),
            description: "Full-grain leather bag with a padded 15-inch laptop sleeve.".to_string(),
            price: Price::from_cents(15999),
            discounted_price: None,
            category: CategoryId::new("cat-3"),
            tags: vec!["bags".to_string(), "leather".to_string()],
            image: "https://images.unsplash.com/photo-1547949003-9792a18a2601?auto=format&fit=crop&w=1000&q=80".to_string(),
            rating: 4.4,
            review_count: 91,
            in_stock: true,
            featured: false,
        },
        Product {
            id: ProductId::new("p8"),
            name: "Polarized Aviator Sunglasses".to_string(),
            description: "Classic aviators with polarized lenses and a spring hinge.".to_string(),
            price: Price::from_cents(7999),
            discounted_price: None,
            category: CategoryId::new("cat-3"),
            tags: vec!["eyewear".to_string()],
            image: "https://images.unsplash.com/photo-1572635196237-14b3f281503f?auto=format&fit=crop&w=1000&q=80".to_string(),
            rating: 4.0,
            review_count: 312,
            in_stock: false,
            featured: false,
        },
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_by_id() {
        let catalog = Catalog::demo();
        assert_eq!(
            catalog.by_id(&ProductId::new("p1")).unwrap().name,
            "Premium Wireless Headphones"
        );
        assert!(catalog.by_id(&ProductId::new("nope")).is_none());
    }

    #[test]
    fn test_by_category_slug_preserves_order() {
        let catalog = Catalog::demo();
        let electronics = catalog.by_category_slug("electronics");
        let ids: Vec<&str> = electronics.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["p1", "p2", "p3", "p4"]);
    }

    #[test]
    fn test_all_slug_returns_everything() {
        let catalog = Catalog::demo();
        assert_eq!(
            catalog.by_category_slug("all").len(),
            catalog.products().len()
        );
    }

    #[test]
    fn test_unknown_slug_is_empty() {
        assert!(Catalog::demo().by_category_slug("toys").is_empty());
    }

    #[test]
    fn test_featured() {
        let catalog = Catalog::demo();
        assert!(catalog.featured().iter().all(|p| p.featured));
        assert!(!catalog.featured().is_empty());
    }

    #[test]
    fn test_related_excludes_self_and_caps() {
        let catalog = Catalog::demo();
        let related = catalog.related(&ProductId::new("p1"));
        assert!(related.len() <= RELATED_LIMIT);
        assert!(related.iter().all(|p| p.id.as_str() != "p1"));
        assert!(
            related
                .iter()
                .all(|p| p.category == CategoryId::new("cat-1"))
        );
    }

    #[test]
    fn test_related_unknown_product_is_empty() {
        assert!(Catalog::demo().related(&ProductId::new("nope")).is_empty());
    }

    #[test]
    fn test_duplicate_product_id_rejected() {
        let mut products = demo_products();
        let mut dup = products[0].clone();
        dup.name = "Copy".to_string();
        products.push(dup);

        assert!(matches!(
            Catalog::new(demo_categories(), products),
            Err(CatalogError::DuplicateProduct(_))
        ));
    }

    #[test]
    fn test_fixture_file_round_trip() {
        let dir = std::env::temp_dir().join(format!("tidepool-catalog-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("catalog.json");

        let data = CatalogData {
            categories: demo_categories(),
            products: demo_products(),
        };
        std::fs::write(&path, serde_json::to_string_pretty(&data).unwrap()).unwrap();

        let catalog = Catalog::from_json_file(&path).unwrap();
        assert_eq!(catalog.products().len(), demo_products().len());
    }

    #[test]
    fn test_malformed_fixture_file_errors() {
        let dir = std::env::temp_dir().join(format!("tidepool-catalog-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("catalog.json");
        std::fs::write(&path, "{oops").unwrap();

        assert!(matches!(
            Catalog::from_json_file(&path),
            Err(CatalogError::Parse(_))
        ));
    }
}

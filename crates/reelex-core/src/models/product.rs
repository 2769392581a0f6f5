//! Product showcase video extraction records.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::envelope::Envelope;
use super::validation::FieldIssue;
use super::{Category, RecordSchema};

/// A single product found in a product video.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Product {
    pub name: String,
    pub brand: Option<String>,
    /// Price as displayed, e.g. "$99.99".
    pub price: Option<String>,
    /// Currency code, e.g. "USD".
    pub currency: Option<String>,
    #[serde(default)]
    pub purchase_links: Vec<String>,
    pub product_category: Option<String>,
}

/// Product catalog extracted from a showcase video reel.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProductCatalog {
    pub category: Category,
    #[serde(flatten)]
    pub envelope: Envelope,
    pub products: Option<Vec<Product>>,
}

impl RecordSchema for ProductCatalog {
    const SCHEMA_NAME: &'static str = "ProductCatalog";
    const CATEGORY: Category = Category::Product;
    const FIELDS: &'static [&'static str] = &["products"];
    const REQUIRED: &'static [&'static str] = &[];

    fn validate(&self, issues: &mut Vec<FieldIssue>) {
        self.envelope.validate(issues);
        if self.category != Self::CATEGORY {
            issues.push(FieldIssue::new("category", "must be \"product\""));
        }
        if let Some(products) = &self.products {
            for (i, product) in products.iter().enumerate() {
                if product.name.trim().is_empty() {
                    issues.push(FieldIssue::new(
                        format!("products[{i}].name"),
                        "must not be empty",
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_catalog_constructs() {
        let catalog = super::super::construct::<ProductCatalog>(json!({
            "category": "product",
            "title": "Best Running Shoes",
            "products": [
                {
                    "name": "Air Zoom Pegasus",
                    "brand": "Nike",
                    "price": "$120",
                    "currency": "USD",
                    "purchase_links": ["https://example.com/shoes"],
                    "product_category": "Running Shoes",
                },
            ],
        }))
        .unwrap();
        assert_eq!(catalog.products.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_product_name_is_rejected() {
        let err = super::super::construct::<ProductCatalog>(json!({
            "category": "product",
            "products": [{"name": "  "}],
        }))
        .unwrap_err();
        assert!(err.issues.iter().any(|i| i.field == "products[0].name"));
    }
}

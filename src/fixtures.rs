//! Seed products.
//!
//! The three records a brand-new marketplace starts with: two single-farm
//! produce listings and one pre-discounted bundle. Seeding happens through
//! [`Catalog::seed`](crate::catalog::Catalog::seed), so a store that has ever
//! been written, even to empty, is left alone.

use crate::{prices::Price, products::NewProduct};

/// The starter catalog for a fresh store.
#[must_use]
pub fn sample_products() -> Vec<NewProduct> {
    vec![
        NewProduct {
            name: "Organic Tomatoes".to_owned(),
            farmer: "John Smith Farm".to_owned(),
            price: Price::from_minor(2_000),
            quantity: 100,
            unit: "kg".to_owned(),
            description: "Fresh organic tomatoes grown without pesticides".to_owned(),
            category: "vegetables".to_owned(),
            quality: "A+".to_owned(),
            organic: true,
            is_package: false,
            original_price: None,
            discount: None,
            package_items: None,
        },
        NewProduct {
            name: "Fresh Strawberries".to_owned(),
            farmer: "Berry Paradise".to_owned(),
            price: Price::from_minor(3_500),
            quantity: 50,
            unit: "kg".to_owned(),
            description: "Sweet and juicy strawberries picked fresh daily".to_owned(),
            category: "fruits".to_owned(),
            quality: "A+".to_owned(),
            organic: false,
            is_package: false,
            original_price: None,
            discount: None,
            package_items: None,
        },
        NewProduct {
            name: "Green Vegetables Bundle".to_owned(),
            farmer: "Green Valley Farm".to_owned(),
            price: Price::from_minor(10_000),
            quantity: 20,
            unit: "bundle".to_owned(),
            description: "Mixed bundle of fresh green vegetables: spinach, lettuce, \
                          broccoli, and green beans"
                .to_owned(),
            category: "vegetables".to_owned(),
            quality: "A+".to_owned(),
            organic: false,
            is_package: true,
            original_price: Some(Price::from_minor(15_000)),
            discount: Some(30),
            package_items: Some(vec![
                "Spinach (2kg)".to_owned(),
                "Lettuce (1kg)".to_owned(),
                "Broccoli (1.5kg)".to_owned(),
                "Green Beans (1kg)".to_owned(),
            ]),
        },
    ]
}

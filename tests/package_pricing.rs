//! Integration test for package assembly and tiered pricing.
//!
//! Exercises both package flows end to end:
//!
//! 1. A buyer assembles an ad-hoc bundle, watches the tier move as the
//!    selection grows, commits it, and checks out with the synthetic product
//!    embedded in the cart line.
//! 2. A farmer authors a package with an explicit discount and publishes it
//!    into the catalog like any other listing.
//!
//! Tier rule under test: 5+ distinct items take 25%, 3+ take 15%, a subtotal
//! of at least 20,000 minor units takes 10%, anything smaller pays full
//! price. Only the first matching tier applies.

use decimal_percentage::Percentage;
use jiff::Timestamp;
use testresult::TestResult;

use ecomarket::package::{MULTIPLE_FARMERS, PackageBuilder, PackageDraft};
use ecomarket::prelude::*;
use ecomarket::prices::Price;
use ecomarket::products::NewProduct;

fn listing(name: &str, farmer: &str, price: u64, stock: u32) -> NewProduct {
    NewProduct {
        name: name.to_owned(),
        farmer: farmer.to_owned(),
        price: Price::from_minor(price),
        quantity: stock,
        unit: "kg".to_owned(),
        description: format!("Fresh {name}"),
        category: "vegetables".to_owned(),
        quality: "A".to_owned(),
        organic: false,
        is_package: false,
        original_price: None,
        discount: None,
        package_items: None,
    }
}

#[test]
fn buyer_package_moves_through_the_tiers_and_checks_out() -> TestResult {
    let market = Marketplace::new(MemoryStorage::new());
    let catalog = market.catalog();

    let tomatoes = catalog.insert(listing("Tomatoes", "John Smith Farm", 2_000, 100))?;
    let carrots = catalog.insert(listing("Carrots", "Green Valley Farm", 1_500, 40))?;
    let spinach = catalog.insert(listing("Spinach", "Green Valley Farm", 3_000, 30))?;
    let potatoes = catalog.insert(listing("Potatoes", "John Smith Farm", 1_000, 200))?;
    let onions = catalog.insert(listing("Onions", "Green Valley Farm", 900, 150))?;

    let mut builder = PackageBuilder::new();

    // Two cheap items: no tier matches.
    builder.add_item(&tomatoes, 1);
    builder.add_item(&carrots, 1);

    let totals = builder.totals(&DiscountPolicy::Tiered)?;
    assert_eq!(totals.rate, Percentage::from(0.0), "below every tier");
    assert_eq!(totals.final_price, totals.subtotal, "full price");

    // A third distinct item unlocks 15%.
    builder.add_item(&spinach, 1);
    assert_eq!(
        builder.totals(&DiscountPolicy::Tiered)?.rate,
        Percentage::from(0.15),
        "three distinct items"
    );

    // Five distinct items unlock 25%.
    builder.add_item(&potatoes, 2);
    builder.add_item(&onions, 3);

    let totals = builder.totals(&DiscountPolicy::Tiered)?;
    assert_eq!(totals.rate, Percentage::from(0.25));

    // 2000 + 1500 + 3000 + 2*1000 + 3*900 = 11200; 25% off is 2800.
    assert_eq!(totals.subtotal, Price::from_minor(11_200));
    assert_eq!(totals.discount_amount, Price::from_minor(2_800));
    assert_eq!(totals.final_price, Price::from_minor(8_400));

    // Commit and push the synthetic product through the cart.
    let package = builder.commit_custom()?.into_product(Timestamp::now());

    assert_eq!(package.name, "Custom Package (5 items)");
    assert_eq!(package.farmer, MULTIPLE_FARMERS);
    assert_eq!(package.price, Price::from_minor(8_400));
    assert_eq!(package.discount, Some(25));

    market.cart().add(package.id, 1, Some(package.clone()))?;

    let order = market.orders().checkout("Maria Garcia")?;

    assert_eq!(order.total, Price::from_minor(8_400));
    assert_eq!(
        order.items.first().map(|line| line.product_name.as_str()),
        Some("Custom Package (5 items)"),
        "order resolves the line through its embedded product"
    );

    Ok(())
}

#[test]
fn expensive_pair_takes_the_subtotal_tier() -> TestResult {
    let saffron = listing("Saffron", "Spice Farm", 18_000, 10).into_product(Timestamp::now());
    let truffles = listing("Truffles", "Forest Farm", 4_000, 5).into_product(Timestamp::now());

    let mut builder = PackageBuilder::new();

    builder.add_item(&saffron, 1);
    builder.add_item(&truffles, 1);

    // Two items, but the 22,000 subtotal clears the 20,000 threshold.
    let totals = builder.totals(&DiscountPolicy::Tiered)?;

    assert_eq!(totals.rate, Percentage::from(0.10), "subtotal tier");
    assert_eq!(totals.discount_amount, Price::from_minor(2_200));
    assert_eq!(totals.final_price, Price::from_minor(19_800));

    Ok(())
}

#[test]
fn farmer_package_publishes_into_the_catalog() -> TestResult {
    let market = Marketplace::new(MemoryStorage::new());
    let catalog = market.catalog();

    let spinach = catalog.insert(listing("Spinach", "Green Valley Farm", 3_000, 30))?;
    let lettuce = catalog.insert(listing("Lettuce", "Green Valley Farm", 2_500, 20))?;

    let mut builder = PackageBuilder::new();
    builder.add_item(&spinach, 2);
    builder.add_item(&lettuce, 1);

    let draft = PackageDraft {
        name: "Leafy Greens Box".to_owned(),
        farmer: "Green Valley Farm".to_owned(),
        description: "Everything you need for a week of salads".to_owned(),
        stock: 10,
    };

    let new_package = builder.commit(draft, &DiscountPolicy::Explicit(Percentage::from(0.20)))?;
    let published = catalog.insert(new_package)?;

    // 2*3000 + 2500 = 8500; 20% off is 1700.
    assert_eq!(published.original_price, Some(Price::from_minor(8_500)));
    assert_eq!(published.price, Price::from_minor(6_800));
    assert_eq!(published.discount, Some(20));
    assert_eq!(published.category, "packages");

    // Published packages are shoppable like anything else.
    let found = catalog.search("", Some("packages"))?;

    assert_eq!(found.first().map(|p| p.id), Some(published.id));

    market.cart().add(published.id, 1, None)?;

    assert_eq!(market.cart().total_units()?, 1);

    Ok(())
}

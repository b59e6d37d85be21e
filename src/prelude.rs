//! Common imports.
//!
//! Use this when driving a full marketplace session.

pub use crate::{
    cart::{Cart, CartError, CartLine},
    catalog::{Catalog, CatalogError},
    discounts::DiscountPolicy,
    ids::{OrderId, ProductId},
    marketplace::Marketplace,
    orders::{Order, OrderError, OrderStatus, Orders},
    package::{PackageBuilder, PackageDraft, PackageError},
    prices::Price,
    products::{NewProduct, Product, ProductUpdate},
    storage::{JsonFileStorage, MemoryStorage, Storage},
    wishlist::{FavoriteFarmer, Wishlist, WishlistEntry},
};

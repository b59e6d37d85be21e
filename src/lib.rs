//! EcoMarket
//!
//! EcoMarket is a farm-to-table marketplace engine: a persistent product
//! catalog, a stock-checked cart, tiered package discounts and an order
//! history, all behind a pluggable storage backend.

pub mod cart;
pub mod catalog;
pub mod discounts;
pub mod fixtures;
pub mod ids;
pub mod marketplace;
pub mod orders;
pub mod package;
pub mod prelude;
pub mod prices;
pub mod products;
pub mod storage;
pub mod wishlist;

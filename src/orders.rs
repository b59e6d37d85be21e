//! Orders.
//!
//! Checkout turns the cart into an immutable [`Order`] snapshot: line prices
//! and names are copied out of the catalog at purchase time, so later catalog
//! edits never rewrite history. The order is persisted before the cart is
//! cleared, so a write failure leaves the cart intact for a retry rather than
//! silently dropping the purchase.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cart::CartLine,
    catalog::{Catalog, CatalogError},
    ids::{OrderId, ProductId},
    prices::Price,
    storage::{self, CART_KEY, ORDERS_KEY, Storage, StorageError},
};

/// Order operation errors.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Checkout with nothing in the cart.
    #[error("cannot checkout an empty cart")]
    EmptyCart,

    /// A cart line references a product that no longer resolves anywhere.
    #[error("product not found")]
    ProductNotFound,

    /// No order with the given identifier.
    #[error("order not found")]
    OrderNotFound,

    /// Order totals left the representable price range.
    #[error("order total overflowed")]
    Overflow,

    /// Underlying persistence failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<CatalogError> for OrderError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::NotFound => Self::ProductNotFound,
            CatalogError::Storage(storage) => Self::Storage(storage),
        }
    }
}

/// Fulfilment stage of an order. Stages only move forward in the normal
/// flow, but `update_status` accepts any transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    /// Placed, not yet confirmed by the farmers.
    Pending,

    /// Confirmed and being prepared.
    Confirmed,

    /// Undergoing quality inspection before dispatch.
    QualityCheck,

    /// Handed to the courier.
    Shipped,

    /// Received by the buyer.
    Delivered,
}

/// One purchased line, frozen at checkout time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Product that was purchased.
    pub product_id: ProductId,

    /// Product name at purchase time.
    pub product_name: String,

    /// Farmer name at purchase time.
    pub farmer: String,

    /// Units purchased.
    pub quantity: u32,

    /// Unit price at purchase time.
    pub price: Price,

    /// Line total, `price * quantity`.
    pub total: Price,
}

/// A completed purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique, stable identifier.
    pub id: OrderId,

    /// The purchased lines.
    pub items: Vec<OrderLine>,

    /// Sum of all line totals.
    pub total: Price,

    /// Current fulfilment stage.
    pub status: OrderStatus,

    /// Name of the buyer.
    pub customer: String,

    /// When the order was placed.
    #[serde(rename = "date")]
    pub created_at: Timestamp,

    /// When the status last changed, if ever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

/// View over the persisted order history.
#[derive(Debug, Clone, Copy)]
pub struct Orders<'a, S> {
    storage: &'a S,
}

impl<'a, S: Storage> Orders<'a, S> {
    /// Create an orders view over `storage`.
    #[must_use]
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    fn read(&self) -> Result<Vec<Order>, OrderError> {
        Ok(storage::load_collection(self.storage, ORDERS_KEY)?)
    }

    fn write(&self, orders: &[Order]) -> Result<(), OrderError> {
        Ok(storage::save_collection(self.storage, ORDERS_KEY, orders)?)
    }

    /// Turn the current cart into a pending order for `customer`, then clear
    /// the cart. Each line resolves through the catalog, falling back to its
    /// embedded product only when the identifier is not in the catalog; the
    /// catalog stays authoritative for anything it lists.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::EmptyCart`] when there is nothing to buy,
    /// [`OrderError::ProductNotFound`] when a line resolves nowhere,
    /// [`OrderError::Overflow`] when totals exceed the price range, or
    /// [`OrderError::Storage`] on persistence failure.
    pub fn checkout(&self, customer: &str) -> Result<Order, OrderError> {
        let lines: Vec<CartLine> = storage::load_collection(self.storage, CART_KEY)?;

        if lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let catalog = Catalog::new(self.storage);
        let mut items = Vec::with_capacity(lines.len());
        let mut total = Price::ZERO;

        for line in &lines {
            let product = match catalog.find(line.product_id)? {
                Some(product) => product,
                None => line
                    .custom_product
                    .clone()
                    .ok_or(OrderError::ProductNotFound)?,
            };

            let line_total = product
                .price
                .checked_mul_quantity(line.quantity)
                .ok_or(OrderError::Overflow)?;

            total = total.checked_add(line_total).ok_or(OrderError::Overflow)?;
            items.push(OrderLine {
                product_id: line.product_id,
                product_name: product.name,
                farmer: product.farmer,
                quantity: line.quantity,
                price: product.price,
                total: line_total,
            });
        }

        let order = Order {
            id: OrderId::new(),
            items,
            total,
            status: OrderStatus::Pending,
            customer: customer.to_owned(),
            created_at: Timestamp::now(),
            updated_at: None,
        };

        let mut orders = self.read()?;
        orders.insert(0, order.clone());

        tracing::info!(
            id = %order.id,
            lines = order.items.len(),
            total = order.total.minor(),
            "order placed"
        );

        // Persist the order before touching the cart.
        self.write(&orders)?;
        storage::save_collection::<CartLine, _>(self.storage, CART_KEY, &[])?;

        Ok(order)
    }

    /// Move an order to a new fulfilment stage, stamping the change.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::OrderNotFound`] when absent, or
    /// [`OrderError::Storage`] on persistence failure.
    pub fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order, OrderError> {
        let mut orders = self.read()?;

        let order = orders
            .iter_mut()
            .find(|order| order.id == id)
            .ok_or(OrderError::OrderNotFound)?;

        order.status = status;
        order.updated_at = Some(Timestamp::now());

        let updated = order.clone();

        tracing::debug!(%id, ?status, "order status updated");
        self.write(&orders)?;

        Ok(updated)
    }

    /// All orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Storage`] on persistence failure.
    pub fn history(&self) -> Result<Vec<Order>, OrderError> {
        self.read()
    }

    /// Look up an order that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::OrderNotFound`] when absent, or
    /// [`OrderError::Storage`] on persistence failure.
    pub fn get(&self, id: OrderId) -> Result<Order, OrderError> {
        self.read()?
            .into_iter()
            .find(|order| order.id == id)
            .ok_or(OrderError::OrderNotFound)
    }
}

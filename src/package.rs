//! Package builder.
//!
//! Accumulates a transient multi-item selection, prices it live under a
//! [`DiscountPolicy`], and materializes it into a single synthetic package
//! product on commit. A builder is an ordinary owned value: it belongs to
//! whichever session created it and is never shared process-wide. Nothing
//! here touches storage until the committed product is handed to the catalog
//! or cart.

use decimal_percentage::Percentage;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    discounts::{DiscountError, DiscountPolicy, percent_points},
    ids::ProductId,
    prices::Price,
    products::{NewProduct, Product},
};

/// Category assigned to every committed package.
pub const PACKAGE_CATEGORY: &str = "packages";

/// Unit label assigned to every committed package.
pub const PACKAGE_UNIT: &str = "package";

/// Farmer attribution for buyer-assembled packages spanning several farms.
pub const MULTIPLE_FARMERS: &str = "Multiple Farmers";

/// Package builder errors.
#[derive(Debug, Error)]
pub enum PackageError {
    /// Commit was attempted with nothing selected.
    #[error("no items selected")]
    EmptySelection,

    /// A required descriptive field was blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Discount or price arithmetic failed.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// One selected catalog item inside the builder.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Identifier of the selected product.
    pub product_id: ProductId,

    /// Product name at selection time.
    pub name: String,

    /// Owning farmer at selection time.
    pub farmer: String,

    /// Unit price at selection time.
    pub price: Price,

    /// Unit label at selection time.
    pub unit: String,

    /// Chosen quantity, always within `[1, max_quantity]`.
    pub quantity: u32,

    /// The product's available stock when it was selected.
    pub max_quantity: u32,
}

impl Selection {
    fn line_total(&self) -> Result<Price, DiscountError> {
        self.price
            .checked_mul_quantity(self.quantity)
            .ok_or(DiscountError::Overflow)
    }
}

/// Live pricing of the current selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackageTotals {
    /// Sum of line totals before any discount.
    pub subtotal: Price,

    /// Resolved discount rate.
    pub rate: Percentage,

    /// Amount taken off the subtotal.
    pub discount_amount: Price,

    /// What the package will cost.
    pub final_price: Price,
}

/// Descriptive fields for a farmer-authored package commit.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageDraft {
    /// Package display name.
    pub name: String,

    /// Authoring farmer.
    pub farmer: String,

    /// Package description.
    pub description: String,

    /// How many packages are offered for sale.
    pub stock: u32,
}

/// Transient multi-item bundle under construction.
#[derive(Debug, Default)]
pub struct PackageBuilder {
    items: SmallVec<[Selection; 8]>,
}

impl PackageBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current selection, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[Selection] {
        &self.items
    }

    /// Number of distinct selected products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Select `requested` units of a product, merging into an existing
    /// selection if present. Quantities are clamped so they never exceed the
    /// product's available stock; out-of-stock products are ignored.
    pub fn add_item(&mut self, product: &Product, requested: u32) {
        if product.quantity == 0 {
            return;
        }

        let requested = requested.max(1);

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|selection| selection.product_id == product.id)
        {
            existing.quantity = existing
                .quantity
                .saturating_add(requested)
                .min(existing.max_quantity);

            return;
        }

        self.items.push(Selection {
            product_id: product.id,
            name: product.name.clone(),
            farmer: product.farmer.clone(),
            price: product.price,
            unit: product.unit.clone(),
            quantity: requested.min(product.quantity),
            max_quantity: product.quantity,
        });
    }

    /// Set a selection's quantity, clamped into `[1, max_quantity]`. The
    /// builder never auto-removes at zero; removal is always explicit via
    /// [`remove_item`](Self::remove_item). No-op when the product is not
    /// selected.
    pub fn set_quantity(&mut self, id: ProductId, quantity: u32) {
        if let Some(selection) = self
            .items
            .iter_mut()
            .find(|selection| selection.product_id == id)
        {
            selection.quantity = quantity.clamp(1, selection.max_quantity);
        }
    }

    /// Drop a product from the selection. No-op when absent.
    pub fn remove_item(&mut self, id: ProductId) {
        self.items.retain(|selection| selection.product_id != id);
    }

    /// Price the current selection under `policy`. Pure: no side effects,
    /// stable for the same selection and policy.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if price or percentage arithmetic leaves
    /// the representable range.
    pub fn totals(&self, policy: &DiscountPolicy) -> Result<PackageTotals, DiscountError> {
        let subtotal = self
            .items
            .iter()
            .try_fold(Price::ZERO, |acc, selection| {
                acc.checked_add(selection.line_total()?)
                    .ok_or(DiscountError::Overflow)
            })?;

        let rate = policy.rate(self.items.len(), subtotal);

        let discount_amount = Price::from_minor(crate::discounts::percent_of_minor(
            &rate,
            subtotal.minor(),
        )?);

        let final_price = subtotal
            .checked_sub(discount_amount)
            .ok_or(DiscountError::Overflow)?;

        Ok(PackageTotals {
            subtotal,
            rate,
            discount_amount,
            final_price,
        })
    }

    /// Materialize a farmer-authored package: the author names it, sets the
    /// offered stock and supplies the discount through `policy`. Content
    /// summaries list each item as `Name (quantity unit)`. Resets the
    /// builder on success.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::EmptySelection`] when nothing is selected,
    /// [`PackageError::MissingField`] when the name or description is blank,
    /// or a wrapped [`DiscountError`] from pricing.
    pub fn commit(
        &mut self,
        draft: PackageDraft,
        policy: &DiscountPolicy,
    ) -> Result<NewProduct, PackageError> {
        if self.items.is_empty() {
            return Err(PackageError::EmptySelection);
        }

        if draft.name.trim().is_empty() {
            return Err(PackageError::MissingField("name"));
        }

        if draft.description.trim().is_empty() {
            return Err(PackageError::MissingField("description"));
        }

        self.materialize(draft, policy, false)
    }

    /// Materialize a buyer-assembled package: named `Custom Package (N
    /// items)`, attributed to [`MULTIPLE_FARMERS`], priced under the tiered
    /// rule, one package offered. Content summaries include each item's
    /// owning farmer. Resets the builder on success.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::EmptySelection`] when nothing is selected, or
    /// a wrapped [`DiscountError`] from pricing.
    pub fn commit_custom(&mut self) -> Result<NewProduct, PackageError> {
        if self.items.is_empty() {
            return Err(PackageError::EmptySelection);
        }

        let contents: Vec<String> = self
            .items
            .iter()
            .map(|selection| {
                format!(
                    "{} ({}{})",
                    selection.name, selection.quantity, selection.unit
                )
            })
            .collect();

        let draft = PackageDraft {
            name: format!("Custom Package ({} items)", self.items.len()),
            farmer: MULTIPLE_FARMERS.to_owned(),
            description: format!("Custom package containing: {}", contents.join(", ")),
            stock: 1,
        };

        self.materialize(draft, &DiscountPolicy::Tiered, true)
    }

    fn materialize(
        &mut self,
        draft: PackageDraft,
        policy: &DiscountPolicy,
        farmer_in_summaries: bool,
    ) -> Result<NewProduct, PackageError> {
        let totals = self.totals(policy)?;
        let discount = percent_points(&totals.rate)?;

        let package_items = self
            .items
            .iter()
            .map(|selection| {
                if farmer_in_summaries {
                    format!(
                        "{} ({} {}) - {}",
                        selection.name, selection.quantity, selection.unit, selection.farmer
                    )
                } else {
                    format!(
                        "{} ({} {})",
                        selection.name, selection.quantity, selection.unit
                    )
                }
            })
            .collect();

        let product = NewProduct {
            name: draft.name,
            farmer: draft.farmer,
            price: totals.final_price,
            quantity: draft.stock,
            unit: PACKAGE_UNIT.to_owned(),
            description: draft.description,
            category: PACKAGE_CATEGORY.to_owned(),
            quality: "A+".to_owned(),
            organic: false,
            is_package: true,
            original_price: Some(totals.subtotal),
            discount: Some(discount),
            package_items: Some(package_items),
        };

        self.items.clear();

        Ok(product)
    }
}

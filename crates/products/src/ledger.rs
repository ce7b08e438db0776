//! Inventory ledger: how stock, sales and revenue evolve across partial updates.
//!
//! The rule, per field of a [`ProductUpdate`]:
//!
//! - `name`, `unit_price`, `quantity_in_stock` replace the current value.
//! - `quantity_sold` is added to the running total.
//! - revenue grows by `quantity * unit_price + revenue`, all taken from the
//!   update. `quantity` without `unit_price` is rejected as ambiguous.
//!
//! Both functions are pure: the caller persists the returned product.

use rust_decimal::Decimal;

use shopfloor_core::{DomainError, DomainResult, ProductId, SupplierId};

use crate::product::{NewProduct, Product, ProductUpdate};

pub const MAX_NAME_LEN: usize = 30;

/// Unit prices carry 2 decimal places and at most 8 digits.
pub const UNIT_PRICE_SCALE: u32 = 2;
const UNIT_PRICE_INTEGER_DIGITS: u32 = 6;

/// Revenue carries 3 decimal places and at most 20 digits.
pub const REVENUE_SCALE: u32 = 3;
const REVENUE_INTEGER_DIGITS: u32 = 17;

/// Build a new product from its create payload.
///
/// The payload is run through [`apply_update`] against a zeroed product, so the
/// opening revenue is `revenue + quantity_sold * unit_price`.
pub fn open(id: ProductId, supplied_by: SupplierId, new: &NewProduct) -> DomainResult<Product> {
    let update = ProductUpdate {
        name: Some(new.name.clone()),
        quantity_in_stock: Some(new.quantity_in_stock),
        quantity_sold: Some(new.quantity_sold),
        unit_price: Some(new.unit_price),
        revenue: Some(new.revenue),
        quantity: Some(new.quantity_sold),
    };
    apply_update(&Product::zeroed(id, supplied_by), &update)
}

/// Apply a partial update and return the resulting product.
///
/// The result always carries `unit_price` at [`UNIT_PRICE_SCALE`] and
/// `revenue` at [`REVENUE_SCALE`] decimal places, whatever scale the caller sent.
pub fn apply_update(product: &Product, update: &ProductUpdate) -> DomainResult<Product> {
    let name = match &update.name {
        Some(name) => checked_name(name)?,
        None => product.name.clone(),
    };

    let quantity_in_stock = match update.quantity_in_stock {
        Some(stock) if stock < 0 => {
            return Err(DomainError::validation("quantity_in_stock cannot be negative"));
        }
        Some(stock) => stock,
        None => product.quantity_in_stock,
    };

    let unit_price = match update.unit_price {
        Some(price) => checked_unit_price(price)?,
        None => product.unit_price,
    };

    let quantity_sold = match update.quantity_sold {
        Some(delta) if delta < 0 => {
            return Err(DomainError::validation("quantity_sold increment cannot be negative"));
        }
        Some(delta) => product
            .quantity_sold
            .checked_add(delta)
            .ok_or_else(|| DomainError::validation("quantity_sold overflow"))?,
        None => product.quantity_sold,
    };

    let sale_value = match (update.quantity, update.unit_price) {
        (Some(quantity), _) if quantity < 0 => {
            return Err(DomainError::validation("quantity cannot be negative"));
        }
        (Some(_), None) => {
            return Err(DomainError::validation(
                "quantity requires unit_price in the same update",
            ));
        }
        (Some(quantity), Some(price)) => Decimal::from(quantity)
            .checked_mul(price)
            .ok_or_else(|| DomainError::validation("revenue overflow"))?,
        (None, _) => Decimal::ZERO,
    };

    let revenue_delta = match update.revenue {
        Some(delta) if delta.is_sign_negative() && !delta.is_zero() => {
            return Err(DomainError::validation("revenue increment cannot be negative"));
        }
        Some(delta) => checked_scale("revenue", delta, REVENUE_SCALE)?,
        None => Decimal::ZERO,
    };

    let mut revenue = product
        .revenue
        .checked_add(sale_value)
        .and_then(|r| r.checked_add(revenue_delta))
        .ok_or_else(|| DomainError::validation("revenue overflow"))?;
    if revenue >= ten_pow(REVENUE_INTEGER_DIGITS) {
        return Err(DomainError::validation(format!(
            "revenue must stay below 10^{REVENUE_INTEGER_DIGITS}"
        )));
    }
    revenue.rescale(REVENUE_SCALE);

    Ok(Product {
        id: product.id,
        name,
        quantity_in_stock,
        quantity_sold,
        unit_price,
        revenue,
        supplied_by: product.supplied_by,
    })
}

fn checked_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

fn checked_unit_price(price: Decimal) -> DomainResult<Decimal> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(DomainError::validation("unit_price cannot be negative"));
    }
    let price = checked_scale("unit_price", price, UNIT_PRICE_SCALE)?;
    if price >= ten_pow(UNIT_PRICE_INTEGER_DIGITS) {
        return Err(DomainError::validation(format!(
            "unit_price must stay below 10^{UNIT_PRICE_INTEGER_DIGITS}"
        )));
    }
    let mut price = price.round_dp(UNIT_PRICE_SCALE);
    price.rescale(UNIT_PRICE_SCALE);
    Ok(price)
}

fn checked_scale(field: &str, value: Decimal, scale: u32) -> DomainResult<Decimal> {
    if value.normalize().scale() > scale {
        return Err(DomainError::validation(format!(
            "{field} supports at most {scale} decimal places"
        )));
    }
    Ok(value)
}

fn ten_pow(exp: u32) -> Decimal {
    Decimal::from(10i64.pow(exp))
}

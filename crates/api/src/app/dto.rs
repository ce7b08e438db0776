use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopfloor_feed::Post;
use shopfloor_parties::{Supplier, SupplierDetails};
use shopfloor_products::{NewProduct, Product, ProductUpdate};

use crate::app::errors::ApiError;

// -------------------------
// Request DTOs
// -------------------------

/// Body for `POST /supplier` and `PUT /supplier/{id}`; all four fields are required.
#[derive(Debug, Deserialize)]
pub struct SupplierRequest {
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
}

impl From<SupplierRequest> for SupplierDetails {
    fn from(value: SupplierRequest) -> Self {
        Self {
            name: value.name,
            company: value.company,
            email: value.email,
            phone: value.phone,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub quantity_in_stock: Option<i64>,
    pub quantity_sold: Option<i64>,
    pub unit_price: Option<Decimal>,
    pub revenue: Option<Decimal>,
    /// Optional echo of the path's supplier id; must match when given.
    pub supplied_by: Option<i64>,
}

impl CreateProductRequest {
    pub fn into_new_product(self, supplier_id: i64) -> Result<NewProduct, ApiError> {
        if let Some(body_supplier) = self.supplied_by {
            if body_supplier != supplier_id {
                return Err(ApiError::validation(format!(
                    "supplied_by ({body_supplier}) does not match the supplier in the path ({supplier_id})"
                )));
            }
        }
        Ok(NewProduct {
            name: self.name,
            quantity_in_stock: self.quantity_in_stock.unwrap_or_default(),
            quantity_sold: self.quantity_sold.unwrap_or_default(),
            unit_price: self.unit_price.unwrap_or_default(),
            revenue: self.revenue.unwrap_or_default(),
        })
    }
}

/// Body for `PUT /product/{id}`. Unknown fields are rejected so a misspelt
/// ledger field cannot be silently ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub quantity_in_stock: Option<i64>,
    pub quantity_sold: Option<i64>,
    pub unit_price: Option<Decimal>,
    pub revenue: Option<Decimal>,
    pub quantity: Option<i64>,
}

impl From<UpdateProductRequest> for ProductUpdate {
    fn from(value: UpdateProductRequest) -> Self {
        Self {
            name: value.name,
            quantity_in_stock: value.quantity_in_stock,
            quantity_sold: value.quantity_sold,
            unit_price: value.unit_price,
            revenue: value.revenue,
            quantity: value.quantity,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub subject: String,
    pub message: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct SupplierView {
    pub id: i64,
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
}

impl From<Supplier> for SupplierView {
    fn from(s: Supplier) -> Self {
        Self {
            id: s.id.get(),
            name: s.name,
            company: s.company,
            email: s.email,
            phone: s.phone,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub quantity_in_stock: i64,
    pub quantity_sold: i64,
    pub unit_price: Decimal,
    pub revenue: Decimal,
    pub supplied_by: i64,
}

impl From<Product> for ProductView {
    fn from(p: Product) -> Self {
        Self {
            id: p.id.get(),
            name: p.name,
            quantity_in_stock: p.quantity_in_stock,
            quantity_sold: p.quantity_sold,
            unit_price: p.unit_price,
            revenue: p.revenue,
            supplied_by: p.supplied_by.get(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostView {
    pub id: String,
    pub caption: Option<String>,
    pub url: String,
    pub file_type: String,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Post> for PostView {
    fn from(p: Post) -> Self {
        Self {
            id: p.id.to_string(),
            caption: p.caption,
            url: p.url,
            file_type: p.file_type,
            file_name: p.file_name,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeedView {
    pub posts: Vec<PostView>,
}

#[derive(Debug, Serialize)]
pub struct EmailSentView {
    pub product_id: i64,
    pub recipient: String,
    pub subject: String,
}

/// Success envelope: `{"status": "ok", "data": ...}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: &'static str,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope { status: "ok", data })
}

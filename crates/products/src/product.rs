use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopfloor_core::{Entity, ProductId, SupplierId};

/// Product entity: stock snapshot plus cumulative sales and revenue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub quantity_in_stock: i64,
    pub quantity_sold: i64,
    pub unit_price: Decimal,
    pub revenue: Decimal,
    pub supplied_by: SupplierId,
}

impl Product {
    /// A product with nothing sold, nothing stocked and no price.
    pub fn zeroed(id: ProductId, supplied_by: SupplierId) -> Self {
        Self {
            id,
            name: String::new(),
            quantity_in_stock: 0,
            quantity_sold: 0,
            unit_price: Decimal::ZERO,
            revenue: Decimal::ZERO,
            supplied_by,
        }
    }
}

impl Entity for Product {
    type Id = ProductId;
    const KIND: &'static str = "product";

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Fields accepted when creating a product. Omitted numbers default to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub quantity_in_stock: i64,
    #[serde(default)]
    pub quantity_sold: i64,
    #[serde(default)]
    pub unit_price: Decimal,
    #[serde(default)]
    pub revenue: Decimal,
}

/// Partial update payload for the ledger.
///
/// `name`, `quantity_in_stock` and `unit_price` replace; `quantity_sold` and
/// `revenue` are increments; `quantity` is the number of units whose sale value
/// (`quantity * unit_price`) is added to revenue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub quantity_in_stock: Option<i64>,
    pub quantity_sold: Option<i64>,
    pub unit_price: Option<Decimal>,
    pub revenue: Option<Decimal>,
    pub quantity: Option<i64>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    response::{IntoResponse, Response},
    Json,
};

use shopfloor_core::{ProductId, SupplierId};
use shopfloor_infra::ProductRepository;
use shopfloor_products::ProductUpdate;

use crate::app::dto::{self, ProductView};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

/// `POST /product/{id}` where `id` is the supplying supplier.
pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(supplier_id): Path<String>,
    body: Result<Json<dto::CreateProductRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let supplier_id: SupplierId = supplier_id.parse()?;
    let Json(body) = body?;
    let new = body.into_new_product(supplier_id.get())?;
    let product = services.repo.create_product(supplier_id, new).await?;
    tracing::info!(product_id = %product.id, supplier_id = %supplier_id, "product created");
    Ok(dto::ok(ProductView::from(product)).into_response())
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Response, ApiError> {
    let products = services
        .repo
        .list_products()
        .await?
        .into_iter()
        .map(ProductView::from)
        .collect::<Vec<_>>();
    Ok(dto::ok(products).into_response())
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id: ProductId = id.parse()?;
    let product = services.repo.get_product(id).await?;
    Ok(dto::ok(ProductView::from(product)).into_response())
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateProductRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id: ProductId = id.parse()?;
    let Json(body) = body?;
    let update = ProductUpdate::from(body);
    if update.is_empty() {
        let product = services.repo.get_product(id).await?;
        return Ok(dto::ok(ProductView::from(product)).into_response());
    }
    let product = services.repo.update_product(id, update).await?;
    tracing::info!(
        product_id = %id,
        quantity_sold = product.quantity_sold,
        revenue = %product.revenue,
        "product updated"
    );
    Ok(dto::ok(ProductView::from(product)).into_response())
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id: ProductId = id.parse()?;
    services.repo.delete_product(id).await?;
    tracing::info!(product_id = %id, "product deleted");
    Ok(dto::ok(format!("Product with id {id} has been deleted.")).into_response())
}

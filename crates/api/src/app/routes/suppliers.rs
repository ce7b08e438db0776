use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    response::{IntoResponse, Response},
    Json,
};

use shopfloor_core::SupplierId;
use shopfloor_infra::SupplierRepository;
use shopfloor_parties::SupplierDetails;

use crate::app::dto::{self, SupplierView};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub async fn create_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::SupplierRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let details = SupplierDetails::from(body).validated()?;
    let supplier = services.repo.create_supplier(details).await?;
    tracing::info!(supplier_id = %supplier.id, "supplier created");
    Ok(dto::ok(SupplierView::from(supplier)).into_response())
}

pub async fn list_suppliers(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Response, ApiError> {
    let suppliers = services
        .repo
        .list_suppliers()
        .await?
        .into_iter()
        .map(SupplierView::from)
        .collect::<Vec<_>>();
    Ok(dto::ok(suppliers).into_response())
}

pub async fn get_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id: SupplierId = id.parse()?;
    let supplier = services.repo.get_supplier(id).await?;
    Ok(dto::ok(SupplierView::from(supplier)).into_response())
}

pub async fn update_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::SupplierRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id: SupplierId = id.parse()?;
    let Json(body) = body?;
    let details = SupplierDetails::from(body).validated()?;
    let supplier = services.repo.update_supplier(id, details).await?;
    tracing::info!(supplier_id = %id, "supplier updated");
    Ok(dto::ok(SupplierView::from(supplier)).into_response())
}

pub async fn delete_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id: SupplierId = id.parse()?;
    services.repo.delete_supplier(id).await?;
    tracing::info!(supplier_id = %id, "supplier deleted");
    Ok(dto::ok(format!("Supplier with id {id} has been deleted.")).into_response())
}

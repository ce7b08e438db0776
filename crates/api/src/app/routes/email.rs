use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    response::{IntoResponse, Response},
    Json,
};

use shopfloor_core::ProductId;
use shopfloor_infra::external::OutgoingMail;
use shopfloor_infra::{ProductRepository, SupplierRepository};
use shopfloor_parties::is_valid_email;

use crate::app::dto::{self, EmailSentView};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

/// `POST /email/{product_id}`: mail the supplier of a product.
pub async fn email_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Path(product_id): Path<String>,
    body: Result<Json<dto::EmailRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let product_id: ProductId = product_id.parse()?;
    let Json(body) = body?;
    let subject = body.subject.trim().to_string();
    if subject.is_empty() {
        return Err(ApiError::validation("subject must not be empty"));
    }
    if body.message.trim().is_empty() {
        return Err(ApiError::validation("message must not be empty"));
    }

    let product = services.repo.get_product(product_id).await?;
    let supplier = services.repo.get_supplier(product.supplied_by).await?;
    if !is_valid_email(&supplier.email) {
        return Err(ApiError::validation(format!(
            "supplier {} has no deliverable email address",
            supplier.id
        )));
    }

    services
        .mailer
        .send(OutgoingMail {
            to: vec![supplier.email.clone()],
            subject: subject.clone(),
            body: body.message,
        })
        .await
        .inspect_err(|e| {
            tracing::warn!(
                service = e.service(),
                product_id = %product_id,
                supplier_id = %supplier.id,
                error = %e,
                "supplier email failed"
            );
        })?;

    tracing::info!(product_id = %product_id, supplier_id = %supplier.id, "supplier emailed");
    Ok(dto::ok(EmailSentView {
        product_id: product_id.get(),
        recipient: supplier.email,
        subject,
    })
    .into_response())
}

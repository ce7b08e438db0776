use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

pub mod email;
pub mod feed;
pub mod products;
pub mod suppliers;
pub mod system;

/// Router for every resource endpoint. `max_upload_bytes` caps the multipart body on `/upload`.
pub fn router(max_upload_bytes: usize) -> Router {
    Router::new()
        .route(
            "/supplier",
            post(suppliers::create_supplier).get(suppliers::list_suppliers),
        )
        .route(
            "/supplier/:id",
            get(suppliers::get_supplier)
                .put(suppliers::update_supplier)
                .delete(suppliers::delete_supplier),
        )
        .route("/products", get(products::list_products))
        .route(
            "/product/:id",
            post(products::create_product)
                .get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route(
            "/upload",
            post(feed::upload).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/feed", get(feed::list_feed))
        .route("/email/:product_id", post(email::email_supplier))
}

//! Postgres-backed repository implementation.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | RepositoryError |
//! |------------|----------------------|-----------------|
//! | Database (unique violation) | `23505` | `Integrity` |
//! | Database (foreign key violation) | `23503` | `Integrity` |
//! | Database (check constraint violation) | `23514` | `Validation` |
//! | Database (other) | Any other | `Storage` |
//! | PoolClosed / Io / other | N/A | `Storage` |
//!
//! ## Product updates
//!
//! `update_product` locks the row with `SELECT ... FOR UPDATE`, applies the
//! ledger in memory and writes the result inside the same transaction, so two
//! concurrent sales of one product serialize instead of losing an increment.
//!
//! ## Suppliers and products
//!
//! `products.supplied_by` carries no foreign key: supplier existence is checked
//! at product creation (under `FOR SHARE`), and deleting a supplier leaves its
//! products pointing at the old id.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use shopfloor_core::{not_found, PostId, ProductId, SupplierId};
use shopfloor_feed::{NewPost, Post};
use shopfloor_parties::{Supplier, SupplierDetails};
use shopfloor_products::{ledger, NewProduct, Product, ProductUpdate};

use super::{
    PostRepository, ProductRepository, RepositoryError, RepositoryResult, SupplierRepository,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS suppliers (
    id      BIGSERIAL PRIMARY KEY,
    name    VARCHAR(20)  NOT NULL,
    company VARCHAR(20)  NOT NULL,
    email   VARCHAR(100) NOT NULL,
    phone   VARCHAR(15)  NOT NULL
);

CREATE TABLE IF NOT EXISTS products (
    id                BIGSERIAL PRIMARY KEY,
    name              VARCHAR(30)    NOT NULL,
    quantity_in_stock BIGINT         NOT NULL DEFAULT 0 CHECK (quantity_in_stock >= 0),
    quantity_sold     BIGINT         NOT NULL DEFAULT 0 CHECK (quantity_sold >= 0),
    unit_price        NUMERIC(8, 2)  NOT NULL DEFAULT 0 CHECK (unit_price >= 0),
    revenue           NUMERIC(20, 3) NOT NULL DEFAULT 0 CHECK (revenue >= 0),
    supplied_by       BIGINT         NOT NULL
);

CREATE TABLE IF NOT EXISTS posts (
    id         UUID        PRIMARY KEY,
    caption    TEXT        NULL,
    url        TEXT        NOT NULL,
    file_type  TEXT        NOT NULL,
    file_name  TEXT        NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS posts_created_at_idx ON posts (created_at DESC);
"#;

/// Postgres-backed repository for suppliers, products and posts.
///
/// Uses the SQLx connection pool, which is `Send + Sync` and cheap to clone.
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: Arc<PgPool>,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect and make sure the tables exist.
    pub async fn connect(database_url: &str) -> RepositoryResult<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let repo = Self::new(pool);
        repo.migrate().await?;
        Ok(repo)
    }

    /// Create tables and indexes if they are missing.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> RepositoryResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

#[async_trait]
impl SupplierRepository for PostgresRepository {
    #[instrument(skip(self, details), err)]
    async fn create_supplier(&self, details: SupplierDetails) -> RepositoryResult<Supplier> {
        let details = details.validated()?;
        let row = sqlx::query(
            r#"
            INSERT INTO suppliers (name, company, email, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, company, email, phone
            "#,
        )
        .bind(&details.name)
        .bind(&details.company)
        .bind(&details.email)
        .bind(&details.phone)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_supplier", e))?;
        supplier_from_row(&row)
    }

    #[instrument(skip(self), err)]
    async fn get_supplier(&self, id: SupplierId) -> RepositoryResult<Supplier> {
        let row = sqlx::query("SELECT id, name, company, email, phone FROM suppliers WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_supplier", e))?;
        match row {
            Some(row) => supplier_from_row(&row),
            None => Err(not_found::<Supplier>(id).into()),
        }
    }

    #[instrument(skip(self), err)]
    async fn list_suppliers(&self) -> RepositoryResult<Vec<Supplier>> {
        let rows = sqlx::query("SELECT id, name, company, email, phone FROM suppliers ORDER BY id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_suppliers", e))?;
        rows.iter().map(supplier_from_row).collect()
    }

    #[instrument(skip(self, details), err)]
    async fn update_supplier(
        &self,
        id: SupplierId,
        details: SupplierDetails,
    ) -> RepositoryResult<Supplier> {
        let details = details.validated()?;
        let row = sqlx::query(
            r#"
            UPDATE suppliers
            SET name = $2, company = $3, email = $4, phone = $5
            WHERE id = $1
            RETURNING id, name, company, email, phone
            "#,
        )
        .bind(id.get())
        .bind(&details.name)
        .bind(&details.company)
        .bind(&details.email)
        .bind(&details.phone)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_supplier", e))?;
        match row {
            Some(row) => supplier_from_row(&row),
            None => Err(not_found::<Supplier>(id).into()),
        }
    }

    #[instrument(skip(self), err)]
    async fn delete_supplier(&self, id: SupplierId) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_supplier", e))?;
        if result.rows_affected() == 0 {
            return Err(not_found::<Supplier>(id).into());
        }
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for PostgresRepository {
    #[instrument(skip(self, new), err)]
    async fn create_product(
        &self,
        supplied_by: SupplierId,
        new: NewProduct,
    ) -> RepositoryResult<Product> {
        // Validate before touching the sequence so a rejected payload burns no id.
        // The real id comes from the insert below.
        let opening = ledger::open(ProductId::new(0), supplied_by, &new)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let supplier = sqlx::query("SELECT id FROM suppliers WHERE id = $1 FOR SHARE")
            .bind(supplied_by.get())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("create_product", e))?;
        if supplier.is_none() {
            return Err(RepositoryError::Validation(format!(
                "supplier {supplied_by} does not exist"
            )));
        }

        let row = sqlx::query(
            r#"
            INSERT INTO products
                (name, quantity_in_stock, quantity_sold, unit_price, revenue, supplied_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, quantity_in_stock, quantity_sold, unit_price, revenue, supplied_by
            "#,
        )
        .bind(&opening.name)
        .bind(opening.quantity_in_stock)
        .bind(opening.quantity_sold)
        .bind(opening.unit_price)
        .bind(opening.revenue)
        .bind(opening.supplied_by.get())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("create_product", e))?;
        let product = product_from_row(&row)?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;
        Ok(product)
    }

    #[instrument(skip(self), err)]
    async fn get_product(&self, id: ProductId) -> RepositoryResult<Product> {
        let row = sqlx::query(
            r#"
            SELECT id, name, quantity_in_stock, quantity_sold, unit_price, revenue, supplied_by
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_product", e))?;
        match row {
            Some(row) => product_from_row(&row),
            None => Err(not_found::<Product>(id).into()),
        }
    }

    #[instrument(skip(self), err)]
    async fn list_products(&self) -> RepositoryResult<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, quantity_in_stock, quantity_sold, unit_price, revenue, supplied_by
            FROM products
            ORDER BY id
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;
        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self, update), err)]
    async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> RepositoryResult<Product> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let row = sqlx::query(
            r#"
            SELECT id, name, quantity_in_stock, quantity_sold, unit_price, revenue, supplied_by
            FROM products
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id.get())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_product", e))?;
        let current = match row {
            Some(row) => product_from_row(&row)?,
            None => return Err(not_found::<Product>(id).into()),
        };

        // Dropping `tx` on the error path rolls the lock back.
        let updated = ledger::apply_update(&current, &update)?;

        sqlx::query(
            r#"
            UPDATE products
            SET name = $2,
                quantity_in_stock = $3,
                quantity_sold = $4,
                unit_price = $5,
                revenue = $6
            WHERE id = $1
            "#,
        )
        .bind(updated.id.get())
        .bind(&updated.name)
        .bind(updated.quantity_in_stock)
        .bind(updated.quantity_sold)
        .bind(updated.unit_price)
        .bind(updated.revenue)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_product", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;
        Ok(updated)
    }

    #[instrument(skip(self), err)]
    async fn delete_product(&self, id: ProductId) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;
        if result.rows_affected() == 0 {
            return Err(not_found::<Product>(id).into());
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresRepository {
    #[instrument(skip(self, new), err)]
    async fn create_post(&self, new: NewPost) -> RepositoryResult<Post> {
        let post = new.validated()?.into_post(PostId::new(), Utc::now());
        sqlx::query(
            r#"
            INSERT INTO posts (id, caption, url, file_type, file_name, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(post.id.as_uuid())
        .bind(post.caption.as_deref())
        .bind(&post.url)
        .bind(&post.file_type)
        .bind(&post.file_name)
        .bind(post.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_post", e))?;
        Ok(post)
    }

    #[instrument(skip(self), err)]
    async fn get_post(&self, id: PostId) -> RepositoryResult<Post> {
        let row = sqlx::query(
            "SELECT id, caption, url, file_type, file_name, created_at FROM posts WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_post", e))?;
        match row {
            Some(row) => post_from_row(&row),
            None => Err(not_found::<Post>(id).into()),
        }
    }

    #[instrument(skip(self), err)]
    async fn list_posts(&self) -> RepositoryResult<Vec<Post>> {
        let rows = sqlx::query(
            r#"
            SELECT id, caption, url, file_type, file_name, created_at
            FROM posts
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_posts", e))?;
        rows.iter().map(post_from_row).collect()
    }
}

fn supplier_from_row(row: &PgRow) -> RepositoryResult<Supplier> {
    Ok(Supplier {
        id: SupplierId::new(row.try_get::<i64, _>("id").map_err(decode_error)?),
        name: row.try_get("name").map_err(decode_error)?,
        company: row.try_get("company").map_err(decode_error)?,
        email: row.try_get("email").map_err(decode_error)?,
        phone: row.try_get("phone").map_err(decode_error)?,
    })
}

fn product_from_row(row: &PgRow) -> RepositoryResult<Product> {
    Ok(Product {
        id: ProductId::new(row.try_get::<i64, _>("id").map_err(decode_error)?),
        name: row.try_get("name").map_err(decode_error)?,
        quantity_in_stock: row.try_get("quantity_in_stock").map_err(decode_error)?,
        quantity_sold: row.try_get("quantity_sold").map_err(decode_error)?,
        unit_price: row.try_get::<Decimal, _>("unit_price").map_err(decode_error)?,
        revenue: row.try_get::<Decimal, _>("revenue").map_err(decode_error)?,
        supplied_by: SupplierId::new(row.try_get::<i64, _>("supplied_by").map_err(decode_error)?),
    })
}

fn post_from_row(row: &PgRow) -> RepositoryResult<Post> {
    Ok(Post {
        id: PostId::from_uuid(row.try_get::<Uuid, _>("id").map_err(decode_error)?),
        caption: row.try_get("caption").map_err(decode_error)?,
        url: row.try_get("url").map_err(decode_error)?,
        file_type: row.try_get("file_type").map_err(decode_error)?,
        file_name: row.try_get("file_name").map_err(decode_error)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(decode_error)?,
    })
}

fn decode_error(err: sqlx::Error) -> RepositoryError {
    RepositoryError::Storage(format!("failed to decode row: {err}"))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") | Some("23503") => RepositoryError::Integrity(msg),
                Some("23514") => RepositoryError::Validation(msg),
                _ => RepositoryError::Storage(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            RepositoryError::Storage(format!("connection pool closed in {}", operation))
        }
        other => RepositoryError::Storage(format!("{} failed: {}", operation, other)),
    }
}

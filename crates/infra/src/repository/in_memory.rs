use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use shopfloor_core::{not_found, PostId, ProductId, SupplierId};
use shopfloor_feed::{NewPost, Post};
use shopfloor_parties::{Supplier, SupplierDetails};
use shopfloor_products::{ledger, NewProduct, Product, ProductUpdate};

use super::{
    PostRepository, ProductRepository, RepositoryError, RepositoryResult, SupplierRepository,
};

#[derive(Debug, Default)]
struct Tables {
    suppliers: BTreeMap<SupplierId, Supplier>,
    products: BTreeMap<ProductId, Product>,
    posts: BTreeMap<PostId, Post>,
    last_supplier_id: i64,
    last_product_id: i64,
}

/// In-memory repository for tests/dev.
///
/// A single lock guards all tables, so every write (including the product
/// read-modify-write) is atomic.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    inner: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, Tables>> {
        self.inner
            .read()
            .map_err(|_| RepositoryError::Storage("in-memory lock poisoned".to_string()))
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, Tables>> {
        self.inner
            .write()
            .map_err(|_| RepositoryError::Storage("in-memory lock poisoned".to_string()))
    }
}

#[async_trait]
impl SupplierRepository for InMemoryRepository {
    async fn create_supplier(&self, details: SupplierDetails) -> RepositoryResult<Supplier> {
        let details = details.validated()?;
        let mut tables = self.write()?;
        tables.last_supplier_id += 1;
        let supplier = Supplier::new(SupplierId::new(tables.last_supplier_id), details);
        tables.suppliers.insert(supplier.id, supplier.clone());
        Ok(supplier)
    }

    async fn get_supplier(&self, id: SupplierId) -> RepositoryResult<Supplier> {
        self.read()?
            .suppliers
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found::<Supplier>(id).into())
    }

    async fn list_suppliers(&self) -> RepositoryResult<Vec<Supplier>> {
        Ok(self.read()?.suppliers.values().cloned().collect())
    }

    async fn update_supplier(
        &self,
        id: SupplierId,
        details: SupplierDetails,
    ) -> RepositoryResult<Supplier> {
        let details = details.validated()?;
        let mut tables = self.write()?;
        let slot = tables
            .suppliers
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::from(not_found::<Supplier>(id)))?;
        *slot = slot.replace_details(details);
        Ok(slot.clone())
    }

    async fn delete_supplier(&self, id: SupplierId) -> RepositoryResult<()> {
        self.write()?
            .suppliers
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found::<Supplier>(id).into())
    }
}

#[async_trait]
impl ProductRepository for InMemoryRepository {
    async fn create_product(
        &self,
        supplied_by: SupplierId,
        new: NewProduct,
    ) -> RepositoryResult<Product> {
        let mut tables = self.write()?;
        if !tables.suppliers.contains_key(&supplied_by) {
            return Err(RepositoryError::Validation(format!(
                "supplier {supplied_by} does not exist"
            )));
        }
        let id = ProductId::new(tables.last_product_id + 1);
        let product = ledger::open(id, supplied_by, &new)?;
        tables.last_product_id = id.get();
        tables.products.insert(id, product.clone());
        Ok(product)
    }

    async fn get_product(&self, id: ProductId) -> RepositoryResult<Product> {
        self.read()?
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found::<Product>(id).into())
    }

    async fn list_products(&self) -> RepositoryResult<Vec<Product>> {
        Ok(self.read()?.products.values().cloned().collect())
    }

    async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> RepositoryResult<Product> {
        let mut tables = self.write()?;
        let slot = tables
            .products
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::from(not_found::<Product>(id)))?;
        let updated = ledger::apply_update(slot, &update)?;
        *slot = updated.clone();
        Ok(updated)
    }

    async fn delete_product(&self, id: ProductId) -> RepositoryResult<()> {
        self.write()?
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found::<Product>(id).into())
    }
}

#[async_trait]
impl PostRepository for InMemoryRepository {
    async fn create_post(&self, new: NewPost) -> RepositoryResult<Post> {
        let post = new.validated()?.into_post(PostId::new(), Utc::now());
        self.write()?.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: PostId) -> RepositoryResult<Post> {
        self.read()?
            .posts
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found::<Post>(id).into())
    }

    async fn list_posts(&self) -> RepositoryResult<Vec<Post>> {
        let mut posts: Vec<Post> = self.read()?.posts.values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(posts)
    }
}

//! Catalog service.

use tracing::{debug, info, instrument, warn};

use shopcart_core::{Product, ProductId, ProductInput};

use super::ServiceError;
use crate::db::{CatalogStore, RepositoryError};

/// Product listing and administration.
pub struct CatalogService<'a> {
    store: &'a dyn CatalogStore,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn CatalogStore) -> Self {
        Self { store }
    }

    /// All products, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Fault` if the catalog cannot be read.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>, ServiceError> {
        let products = self
            .store
            .find_all()
            .await
            .map_err(|e| ServiceError::fault("list products", e))?;
        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Look up one product. A missing product is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Fault` if the catalog cannot be read.
    #[instrument(skip(self))]
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, ServiceError> {
        let product = self
            .store
            .find_by_id(id)
            .await
            .map_err(|e| ServiceError::fault("get product", e))?;
        if product.is_none() {
            warn!(product_id = %id, "Product not found");
        }
        Ok(product)
    }

    /// Validate and insert a new product.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Invalid` for rejected input and
    /// `ServiceError::Fault` if the product cannot be stored.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: ProductInput) -> Result<Product, ServiceError> {
        let input = input.validated().map_err(ServiceError::invalid)?;
        let product = self
            .store
            .save(None, input)
            .await
            .map_err(|e| ServiceError::fault("create product", e))?;
        info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Validate and overwrite an existing product.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::ProductNotFound` if `id` does not exist,
    /// `ServiceError::Invalid` for rejected input and `ServiceError::Fault`
    /// if the product cannot be stored.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn update(&self, id: ProductId, input: ProductInput) -> Result<Product, ServiceError> {
        let input = input.validated().map_err(ServiceError::invalid)?;
        let product = self.store.save(Some(id), input).await.map_err(|e| match e {
            RepositoryError::NotFound => ServiceError::ProductNotFound(id),
            other => ServiceError::fault("update product", other),
        })?;
        info!(product_id = %product.id, "Product updated");
        Ok(product)
    }

    /// Delete a product. Returns whether it existed.
    ///
    /// Placed orders keep their snapshotted item name and price.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Fault` if the product cannot be deleted.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<bool, ServiceError> {
        let deleted = self
            .store
            .delete_by_id(id)
            .await
            .map_err(|e| ServiceError::fault("delete product", e))?;
        if deleted {
            info!(product_id = %id, "Product deleted");
        } else {
            warn!(product_id = %id, "Delete requested for missing product");
        }
        Ok(deleted)
    }

    /// Number of products in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Fault` if the catalog cannot be read.
    pub async fn count(&self) -> Result<i64, ServiceError> {
        self.store
            .count()
            .await
            .map_err(|e| ServiceError::fault("count products", e))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::memory::MemoryCatalogStore;

    fn input(name: &str, price: Decimal) -> ProductInput {
        ProductInput {
            name: name.to_owned(),
            description: "desc".to_owned(),
            price,
            image_url: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let store = MemoryCatalogStore::new();
        let catalog = CatalogService::new(&store);

        let result = catalog.create(input("  ", Decimal::ONE)).await;

        assert!(matches!(result, Err(ServiceError::Invalid(_))));
        assert_eq!(catalog.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_missing_product_is_reported() {
        let store = MemoryCatalogStore::new();
        let catalog = CatalogService::new(&store);

        let result = catalog
            .update(ProductId::new(42), input("Mouse", Decimal::ONE))
            .await;

        assert!(matches!(result, Err(ServiceError::ProductNotFound(id)) if id == ProductId::new(42)));
    }

    #[tokio::test]
    async fn test_get_missing_product_is_absent() {
        let store = MemoryCatalogStore::new();
        let catalog = CatalogService::new(&store);

        assert!(catalog.get(ProductId::new(1)).await.unwrap().is_none());
        assert!(!catalog.delete(ProductId::new(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let store = MemoryCatalogStore::new();
        let catalog = CatalogService::new(&store);

        let product = catalog
            .create(input(" Mouse ", Decimal::new(9999, 2)))
            .await
            .unwrap();
        let all = catalog.list().await.unwrap();

        assert_eq!(product.name, "Mouse");
        assert_eq!(all, vec![product]);
    }
}

//! Top-level façade.
//!
//! Owns the catalog and the adapter and hands out the per-operation
//! components. This is the one object an application keeps around.

use crate::adapter::{Adapter, AdapterConfig, Connection};
use crate::catalog::Catalog;
use crate::entity::Entity;
use crate::error::OrmResult;
use crate::query::QueryBuilder;
use crate::schema::{MigrationReport, SchemaManager};
use crate::writer::EntityWriter;

#[derive(Debug)]
pub struct Orm {
    catalog: Catalog,
    adapter: Adapter,
}

impl Orm {
    /// Assemble a façade from an already-built catalog and adapter.
    pub fn new(catalog: Catalog, adapter: Adapter) -> Self {
        Self { catalog, adapter }
    }

    /// Connect to the database named by `config` and assemble the façade.
    pub async fn connect(catalog: Catalog, config: &AdapterConfig) -> OrmResult<Self> {
        let adapter = Adapter::connect(config).await?;
        Ok(Self::new(catalog, adapter))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }

    /// Start a query for entity type `T`.
    pub fn find<T: Entity>(&self) -> QueryBuilder<'_, T> {
        QueryBuilder::new(&self.catalog, &self.adapter)
    }

    /// Insert or update `entity`; see [`EntityWriter::save`].
    pub async fn save<T: Entity>(
        &self,
        entity: &mut T,
        tx: Option<&mut Connection>,
    ) -> OrmResult<()> {
        EntityWriter::new(&self.catalog, &self.adapter)
            .save(entity, tx)
            .await
    }

    /// Delete `entity` by identifier; see [`EntityWriter::delete`].
    pub async fn delete<T: Entity>(
        &self,
        entity: &T,
        tx: Option<&mut Connection>,
    ) -> OrmResult<()> {
        EntityWriter::new(&self.catalog, &self.adapter)
            .delete(entity, tx)
            .await
    }

    /// Check out a dedicated connection, for callers that run several
    /// statements against one session.
    pub async fn acquire(&self) -> OrmResult<Connection> {
        self.adapter.acquire().await
    }

    /// Reconcile the tables behind `entity_keys`; see
    /// [`SchemaManager::migrate`].
    pub async fn migrate(&self, entity_keys: &[&str]) -> OrmResult<MigrationReport> {
        SchemaManager::new(&self.catalog, &self.adapter)
            .migrate(entity_keys)
            .await
    }

    /// Close the underlying connection pool.
    pub async fn close(&self) {
        self.adapter.close().await;
    }
}

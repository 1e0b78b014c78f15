//! Table catalog abstraction

use anyhow::Result;
use async_trait::async_trait;

/// Catalog operations needed to replace a table definition
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Drop `database.table` if present. Returns whether a table was dropped.
    async fn delete_table_if_exists(&self, database: &str, table: &str) -> Result<bool>;

    /// Run a DDL statement in `database` and wait for it to finish.
    async fn execute_ddl(&self, database: &str, sql: &str) -> Result<()>;
}

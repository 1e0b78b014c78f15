//! Drop-and-recreate of the snapshot table

use crate::catalog::CatalogClient;
use crate::discovery::Discovery;
use crate::error::ProvisionError;
use crate::schema::CREATE_TABLE_TEMPLATE;
use crate::template::{render, Params};
use tracing::{info, instrument};

/// Where the table lives and which bucket it reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableTarget {
    pub database: String,
    pub table: String,
    pub bucket: String,
}

/// What a provisioning run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionOutcome {
    /// Whether a previous table definition was dropped
    pub replaced_existing: bool,
    /// The CREATE TABLE statement that was executed
    pub statement: String,
}

/// Render the CREATE TABLE statement for `target` and `discovery`.
pub fn render_create_table(
    target: &TableTarget,
    discovery: &Discovery,
) -> Result<String, ProvisionError> {
    let params = Params::new()
        .with("database_name", target.database.as_str())
        .with("table_name", target.table.as_str())
        .with("bucket_name", target.bucket.as_str())
        .with("orgs", discovery.orgs_csv())
        .with("accounts", discovery.accounts_csv())
        .with("regions", discovery.regions_csv())
        .with("begindate", discovery.begin_date_param());

    Ok(render(CREATE_TABLE_TEMPLATE, &params)?)
}

/// Replaces a table definition unconditionally.
///
/// The statement is rendered before anything is dropped. After the drop there
/// is no rollback: if the CREATE fails the table stays absent.
pub struct TableProvisioner<C: CatalogClient> {
    catalog: C,
    target: TableTarget,
}

impl<C: CatalogClient> TableProvisioner<C> {
    pub fn new(catalog: C, target: TableTarget) -> Self {
        Self { catalog, target }
    }

    #[instrument(skip(self, discovery), fields(database = %self.target.database, table = %self.target.table))]
    pub async fn provision(&self, discovery: &Discovery) -> Result<ProvisionOutcome, ProvisionError> {
        let TableTarget {
            database, table, ..
        } = &self.target;

        let statement = render_create_table(&self.target, discovery)?;

        let replaced_existing = self
            .catalog
            .delete_table_if_exists(database, table)
            .await
            .map_err(|source| ProvisionError::DeleteTable {
                database: database.clone(),
                table: table.clone(),
                source,
            })?;

        if replaced_existing {
            info!("Dropped existing table {}.{}", database, table);
        }

        info!("Creating table {}.{}", database, table);

        self.catalog
            .execute_ddl(database, &statement)
            .await
            .map_err(|source| ProvisionError::ExecuteDdl {
                database: database.clone(),
                table: table.clone(),
                source,
            })?;

        Ok(ProvisionOutcome {
            replaced_existing,
            statement,
        })
    }
}

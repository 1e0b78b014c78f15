//! Glue Data Catalog + Athena implementation of [`CatalogClient`]
//!
//! Tables are dropped through Glue and created by running the DDL as a plain
//! Athena query (no CTAS wrapping), polling until it reaches a terminal state.
//!
//! Every query carries an explicit result location. Without a configured
//! one the workgroup's location is used, and failing that the account's
//! `aws-athena-query-results-<account>-<region>` bucket, created on demand.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use aws_sdk_athena::types::{QueryExecutionContext, QueryExecutionState, ResultConfiguration};
use aws_sdk_athena::Client as AthenaClient;
use aws_sdk_glue::Client as GlueClient;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client as S3Client;
use aws_sdk_sts::Client as StsClient;
use ct_snapshot_core::CatalogClient;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Athena query settings
#[derive(Debug, Clone)]
pub struct AthenaSettings {
    pub workgroup: String,
    /// Query result location; `None` falls back to the workgroup's location,
    /// then to the account's default results bucket
    pub output_location: Option<String>,
    pub poll_interval: Duration,
}

impl Default for AthenaSettings {
    fn default() -> Self {
        Self {
            workgroup: "primary".to_string(),
            output_location: None,
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// Where an Athena query execution stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryProgress {
    Pending,
    Succeeded,
    Failed(String),
}

impl QueryProgress {
    fn from_state(state: Option<&QueryExecutionState>, reason: Option<&str>) -> Self {
        let describe = || reason.unwrap_or("no reason given").to_string();
        match state {
            None => Self::Failed("no status returned".to_string()),
            Some(QueryExecutionState::Succeeded) => Self::Succeeded,
            Some(QueryExecutionState::Failed) => Self::Failed(describe()),
            Some(QueryExecutionState::Cancelled) => {
                Self::Failed(format!("cancelled: {}", describe()))
            }
            // QUEUED, RUNNING, or a state this SDK version does not know yet
            Some(_) => Self::Pending,
        }
    }
}

/// Bucket Athena uses for query results when nothing else is configured
pub fn default_results_bucket(account: &str, region: &str) -> String {
    format!("aws-athena-query-results-{}-{}", account, region)
}

pub struct GlueAthenaCatalog {
    glue: GlueClient,
    athena: AthenaClient,
    s3: S3Client,
    sts: StsClient,
    region: Option<String>,
    settings: AthenaSettings,
}

impl GlueAthenaCatalog {
    pub fn new(
        glue: GlueClient,
        athena: AthenaClient,
        s3: S3Client,
        sts: StsClient,
        region: Option<String>,
        settings: AthenaSettings,
    ) -> Self {
        Self {
            glue,
            athena,
            s3,
            sts,
            region,
            settings,
        }
    }

    async fn output_location(&self) -> Result<String> {
        if let Some(location) = &self.settings.output_location {
            return Ok(location.clone());
        }

        if let Some(location) = self.workgroup_output_location().await? {
            debug!(output_location = %location, "Using workgroup output location");
            return Ok(location);
        }

        self.ensure_default_results_bucket().await
    }

    async fn workgroup_output_location(&self) -> Result<Option<String>> {
        let resp = self
            .athena
            .get_work_group()
            .work_group(&self.settings.workgroup)
            .send()
            .await
            .with_context(|| {
                format!("Failed to describe Athena workgroup {}", self.settings.workgroup)
            })?;

        Ok(resp
            .work_group()
            .and_then(|wg| wg.configuration())
            .and_then(|c| c.result_configuration())
            .and_then(|r| r.output_location())
            .map(String::from))
    }

    async fn ensure_default_results_bucket(&self) -> Result<String> {
        let region = self
            .region
            .as_deref()
            .context("An AWS region is required to derive the Athena results bucket")?;

        let identity = self
            .sts
            .get_caller_identity()
            .send()
            .await
            .context("STS GetCallerIdentity failed")?;
        let account = identity
            .account()
            .context("STS returned no account id")?;

        let bucket = default_results_bucket(account, region);

        let mut req = self.s3.create_bucket().bucket(&bucket);
        // us-east-1 is the default and rejects an explicit constraint
        if region != "us-east-1" {
            req = req.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }

        match req.send().await {
            Ok(_) => info!(bucket = %bucket, "Created Athena query results bucket"),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_bucket_already_owned_by_you()) =>
            {
                debug!(bucket = %bucket, "Athena query results bucket already exists");
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to create bucket {}", bucket))
            }
        }

        Ok(format!("s3://{}/", bucket))
    }

    async fn start_query(&self, database: &str, sql: &str) -> Result<String> {
        let context = QueryExecutionContext::builder().database(database).build();
        let output_location = self.output_location().await?;

        let resp = self
            .athena
            .start_query_execution()
            .query_string(sql)
            .query_execution_context(context)
            .work_group(&self.settings.workgroup)
            .result_configuration(
                ResultConfiguration::builder()
                    .output_location(output_location)
                    .build(),
            )
            .send()
            .await
            .context("Failed to start Athena query")?;

        resp.query_execution_id()
            .map(String::from)
            .ok_or_else(|| anyhow!("Athena returned no query execution id"))
    }

    async fn poll(&self, query_execution_id: &str) -> Result<QueryProgress> {
        let resp = self
            .athena
            .get_query_execution()
            .query_execution_id(query_execution_id)
            .send()
            .await
            .with_context(|| format!("Failed to get status of query {}", query_execution_id))?;

        let status = resp.query_execution().and_then(|q| q.status());
        Ok(QueryProgress::from_state(
            status.and_then(|s| s.state()),
            status.and_then(|s| s.state_change_reason()),
        ))
    }
}

#[async_trait]
impl CatalogClient for GlueAthenaCatalog {
    #[instrument(skip(self))]
    async fn delete_table_if_exists(&self, database: &str, table: &str) -> Result<bool> {
        match self
            .glue
            .delete_table()
            .database_name(database)
            .name(table)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_entity_not_found_exception()) =>
            {
                debug!("Table does not exist, nothing to delete");
                Ok(false)
            }
            Err(err) => Err(err).context("Glue DeleteTable failed"),
        }
    }

    #[instrument(skip(self, sql), fields(workgroup = %self.settings.workgroup))]
    async fn execute_ddl(&self, database: &str, sql: &str) -> Result<()> {
        debug!(sql = sql, "Executing DDL");

        let query_execution_id = self.start_query(database, sql).await?;
        info!(query_execution_id = %query_execution_id, "Athena query started");

        loop {
            match self.poll(&query_execution_id).await? {
                QueryProgress::Succeeded => {
                    info!(query_execution_id = %query_execution_id, "Athena query succeeded");
                    return Ok(());
                }
                QueryProgress::Failed(reason) => {
                    bail!("Athena query {} failed: {}", query_execution_id, reason)
                }
                QueryProgress::Pending => tokio::time::sleep(self.settings.poll_interval).await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_athena::operation::get_query_execution::GetQueryExecutionOutput;
    use aws_sdk_athena::operation::get_work_group::GetWorkGroupOutput;
    use aws_sdk_athena::operation::start_query_execution::StartQueryExecutionOutput;
    use aws_sdk_athena::types::{
        QueryExecution, QueryExecutionStatus, WorkGroup, WorkGroupConfiguration,
    };
    use aws_sdk_glue::operation::delete_table::{DeleteTableError, DeleteTableOutput};
    use aws_sdk_glue::types::error::{EntityNotFoundException, InvalidInputException};
    use aws_sdk_s3::operation::create_bucket::{CreateBucketError, CreateBucketOutput};
    use aws_sdk_s3::types::error::BucketAlreadyOwnedByYou;
    use aws_sdk_sts::operation::get_caller_identity::GetCallerIdentityOutput;
    use aws_smithy_mocks::{mock, mock_client};

    const RESULTS: &str = "s3://athena-results/";

    fn settings(output_location: Option<&str>) -> AthenaSettings {
        AthenaSettings {
            output_location: output_location.map(String::from),
            poll_interval: Duration::from_millis(1),
            ..Default::default()
        }
    }

    // Clients that are never called in a given test
    fn idle_glue() -> GlueClient {
        GlueClient::from_conf(
            aws_sdk_glue::Config::builder()
                .behavior_version(aws_sdk_glue::config::BehaviorVersion::latest())
                .region(aws_sdk_glue::config::Region::new("us-east-1"))
                .build(),
        )
    }

    fn idle_athena() -> AthenaClient {
        AthenaClient::from_conf(
            aws_sdk_athena::Config::builder()
                .behavior_version(aws_sdk_athena::config::BehaviorVersion::latest())
                .region(aws_sdk_athena::config::Region::new("us-east-1"))
                .build(),
        )
    }

    fn idle_s3() -> S3Client {
        S3Client::from_conf(
            aws_sdk_s3::Config::builder()
                .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
                .region(aws_sdk_s3::config::Region::new("us-east-1"))
                .build(),
        )
    }

    fn idle_sts() -> StsClient {
        StsClient::from_conf(
            aws_sdk_sts::Config::builder()
                .behavior_version(aws_sdk_sts::config::BehaviorVersion::latest())
                .region(aws_sdk_sts::config::Region::new("us-east-1"))
                .build(),
        )
    }

    fn status(state: QueryExecutionState, reason: Option<&str>) -> GetQueryExecutionOutput {
        GetQueryExecutionOutput::builder()
            .query_execution(
                QueryExecution::builder()
                    .query_execution_id("q-1")
                    .status(
                        QueryExecutionStatus::builder()
                            .state(state)
                            .set_state_change_reason(reason.map(String::from))
                            .build(),
                    )
                    .build(),
            )
            .build()
    }

    fn athena_only(athena: AthenaClient, output_location: Option<&str>) -> GlueAthenaCatalog {
        GlueAthenaCatalog::new(
            idle_glue(),
            athena,
            idle_s3(),
            idle_sts(),
            Some("us-east-1".to_string()),
            settings(output_location),
        )
    }

    #[test]
    fn test_query_progress_from_state() {
        assert_eq!(
            QueryProgress::from_state(Some(&QueryExecutionState::Queued), None),
            QueryProgress::Pending
        );
        assert_eq!(
            QueryProgress::from_state(Some(&QueryExecutionState::Running), None),
            QueryProgress::Pending
        );
        assert_eq!(
            QueryProgress::from_state(Some(&QueryExecutionState::Succeeded), None),
            QueryProgress::Succeeded
        );
        assert_eq!(
            QueryProgress::from_state(
                Some(&QueryExecutionState::Failed),
                Some("FAILED: ParseException line 1:8")
            ),
            QueryProgress::Failed("FAILED: ParseException line 1:8".to_string())
        );
        assert_eq!(
            QueryProgress::from_state(Some(&QueryExecutionState::Cancelled), None),
            QueryProgress::Failed("cancelled: no reason given".to_string())
        );
    }

    #[test]
    fn test_missing_status_is_terminal() {
        assert_eq!(
            QueryProgress::from_state(None, None),
            QueryProgress::Failed("no status returned".to_string())
        );
    }

    #[test]
    fn test_default_settings() {
        let settings = AthenaSettings::default();
        assert_eq!(settings.workgroup, "primary");
        assert!(settings.output_location.is_none());
        assert_eq!(settings.poll_interval, Duration::from_millis(500));
    }

    #[test]
    fn test_default_results_bucket() {
        assert_eq!(
            default_results_bucket("123456789012", "eu-west-1"),
            "aws-athena-query-results-123456789012-eu-west-1"
        );
    }

    #[tokio::test]
    async fn test_delete_missing_table_is_not_an_error() {
        let delete = mock!(aws_sdk_glue::Client::delete_table)
            .match_requests(|req| req.database_name() == Some("db1") && req.name() == Some("t1"))
            .then_error(|| {
                DeleteTableError::EntityNotFoundException(
                    EntityNotFoundException::builder()
                        .message("Table t1 not found")
                        .build(),
                )
            });
        let glue = mock_client!(aws_sdk_glue, [&delete]);
        let catalog = GlueAthenaCatalog::new(
            glue,
            idle_athena(),
            idle_s3(),
            idle_sts(),
            None,
            settings(None),
        );

        assert!(!catalog.delete_table_if_exists("db1", "t1").await.unwrap());
        assert_eq!(delete.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_delete_existing_table() {
        let delete = mock!(aws_sdk_glue::Client::delete_table)
            .then_output(|| DeleteTableOutput::builder().build());
        let glue = mock_client!(aws_sdk_glue, [&delete]);
        let catalog = GlueAthenaCatalog::new(
            glue,
            idle_athena(),
            idle_s3(),
            idle_sts(),
            None,
            settings(None),
        );

        assert!(catalog.delete_table_if_exists("db1", "t1").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_other_glue_errors_propagate() {
        let delete = mock!(aws_sdk_glue::Client::delete_table).then_error(|| {
            DeleteTableError::InvalidInputException(
                InvalidInputException::builder()
                    .message("bad database name")
                    .build(),
            )
        });
        let glue = mock_client!(aws_sdk_glue, [&delete]);
        let catalog = GlueAthenaCatalog::new(
            glue,
            idle_athena(),
            idle_s3(),
            idle_sts(),
            None,
            settings(None),
        );

        let err = catalog.delete_table_if_exists("db1", "t1").await.unwrap_err();
        assert!(format!("{:#}", err).contains("Glue DeleteTable failed"));
    }

    #[tokio::test]
    async fn test_execute_ddl_polls_until_succeeded() {
        let start = mock!(aws_sdk_athena::Client::start_query_execution)
            .match_requests(|req| {
                req.query_string() == Some("CREATE EXTERNAL TABLE t1")
                    && req.work_group() == Some("primary")
                    && req.query_execution_context().and_then(|c| c.database()) == Some("db1")
                    && req.result_configuration().and_then(|r| r.output_location())
                        == Some(RESULTS)
            })
            .then_output(|| {
                StartQueryExecutionOutput::builder()
                    .query_execution_id("q-1")
                    .build()
            });
        let get = mock!(aws_sdk_athena::Client::get_query_execution)
            .match_requests(|req| req.query_execution_id() == Some("q-1"))
            .sequence()
            .output(|| status(QueryExecutionState::Running, None))
            .output(|| status(QueryExecutionState::Succeeded, None))
            .build();
        let athena = mock_client!(aws_sdk_athena, [&start, &get]);
        let catalog = athena_only(athena, Some(RESULTS));

        catalog
            .execute_ddl("db1", "CREATE EXTERNAL TABLE t1")
            .await
            .unwrap();
        assert_eq!(start.num_calls(), 1);
        assert_eq!(get.num_calls(), 2);
    }

    #[tokio::test]
    async fn test_execute_ddl_reports_failure_reason() {
        let start = mock!(aws_sdk_athena::Client::start_query_execution).then_output(|| {
            StartQueryExecutionOutput::builder()
                .query_execution_id("q-1")
                .build()
        });
        let get = mock!(aws_sdk_athena::Client::get_query_execution)
            .sequence()
            .output(|| status(QueryExecutionState::Running, None))
            .output(|| {
                status(
                    QueryExecutionState::Failed,
                    Some("FAILED: SemanticException table already exists"),
                )
            })
            .build();
        let athena = mock_client!(aws_sdk_athena, [&start, &get]);
        let catalog = athena_only(athena, Some(RESULTS));

        let err = catalog
            .execute_ddl("db1", "CREATE EXTERNAL TABLE t1")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("SemanticException"));
        assert_eq!(get.num_calls(), 2);
    }

    #[tokio::test]
    async fn test_execute_ddl_cancelled_query_fails() {
        let start = mock!(aws_sdk_athena::Client::start_query_execution).then_output(|| {
            StartQueryExecutionOutput::builder()
                .query_execution_id("q-1")
                .build()
        });
        let get = mock!(aws_sdk_athena::Client::get_query_execution)
            .then_output(|| status(QueryExecutionState::Cancelled, Some("user cancelled")));
        let athena = mock_client!(aws_sdk_athena, [&start, &get]);
        let catalog = athena_only(athena, Some(RESULTS));

        let err = catalog.execute_ddl("db1", "DDL").await.unwrap_err();
        assert!(err.to_string().contains("cancelled: user cancelled"));
    }

    #[tokio::test]
    async fn test_execute_ddl_stops_when_status_missing() {
        let start = mock!(aws_sdk_athena::Client::start_query_execution).then_output(|| {
            StartQueryExecutionOutput::builder()
                .query_execution_id("q-1")
                .build()
        });
        let get = mock!(aws_sdk_athena::Client::get_query_execution)
            .then_output(|| GetQueryExecutionOutput::builder().build());
        let athena = mock_client!(aws_sdk_athena, [&start, &get]);
        let catalog = athena_only(athena, Some(RESULTS));

        let err = catalog.execute_ddl("db1", "DDL").await.unwrap_err();
        assert!(err.to_string().contains("no status returned"));
        assert_eq!(get.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_workgroup_output_location_used_when_unset() {
        let workgroup = mock!(aws_sdk_athena::Client::get_work_group)
            .match_requests(|req| req.work_group() == Some("primary"))
            .then_output(|| {
                GetWorkGroupOutput::builder()
                    .work_group(
                        WorkGroup::builder()
                            .name("primary")
                            .configuration(
                                WorkGroupConfiguration::builder()
                                    .result_configuration(
                                        ResultConfiguration::builder()
                                            .output_location("s3://workgroup-results/")
                                            .build(),
                                    )
                                    .build(),
                            )
                            .build()
                            .expect("workgroup has a name"),
                    )
                    .build()
            });
        let start = mock!(aws_sdk_athena::Client::start_query_execution)
            .match_requests(|req| {
                req.result_configuration().and_then(|r| r.output_location())
                    == Some("s3://workgroup-results/")
            })
            .then_output(|| {
                StartQueryExecutionOutput::builder()
                    .query_execution_id("q-1")
                    .build()
            });
        let get = mock!(aws_sdk_athena::Client::get_query_execution)
            .then_output(|| status(QueryExecutionState::Succeeded, None));
        let athena = mock_client!(aws_sdk_athena, [&workgroup, &start, &get]);
        let catalog = athena_only(athena, None);

        catalog.execute_ddl("db1", "DDL").await.unwrap();
        assert_eq!(workgroup.num_calls(), 1);
        assert_eq!(start.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_default_results_bucket_created_when_workgroup_has_none() {
        let workgroup = mock!(aws_sdk_athena::Client::get_work_group)
            .then_output(|| GetWorkGroupOutput::builder().build());
        let start = mock!(aws_sdk_athena::Client::start_query_execution)
            .match_requests(|req| {
                req.result_configuration().and_then(|r| r.output_location())
                    == Some("s3://aws-athena-query-results-123456789012-eu-west-1/")
            })
            .then_output(|| {
                StartQueryExecutionOutput::builder()
                    .query_execution_id("q-1")
                    .build()
            });
        let get = mock!(aws_sdk_athena::Client::get_query_execution)
            .then_output(|| status(QueryExecutionState::Succeeded, None));
        let identity = mock!(aws_sdk_sts::Client::get_caller_identity).then_output(|| {
            GetCallerIdentityOutput::builder()
                .account("123456789012")
                .build()
        });
        let create = mock!(aws_sdk_s3::Client::create_bucket)
            .match_requests(|req| {
                req.bucket() == Some("aws-athena-query-results-123456789012-eu-west-1")
                    && req
                        .create_bucket_configuration()
                        .and_then(|c| c.location_constraint())
                        .map(|c| c.as_str())
                        == Some("eu-west-1")
            })
            .then_output(|| CreateBucketOutput::builder().build());

        let catalog = GlueAthenaCatalog::new(
            idle_glue(),
            mock_client!(aws_sdk_athena, [&workgroup, &start, &get]),
            mock_client!(aws_sdk_s3, [&create]),
            mock_client!(aws_sdk_sts, [&identity]),
            Some("eu-west-1".to_string()),
            settings(None),
        );

        catalog.execute_ddl("db1", "DDL").await.unwrap();
        assert_eq!(identity.num_calls(), 1);
        assert_eq!(create.num_calls(), 1);
        assert_eq!(start.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_existing_default_results_bucket_is_reused() {
        let workgroup = mock!(aws_sdk_athena::Client::get_work_group)
            .then_output(|| GetWorkGroupOutput::builder().build());
        let start = mock!(aws_sdk_athena::Client::start_query_execution)
            .match_requests(|req| {
                req.result_configuration().and_then(|r| r.output_location())
                    == Some("s3://aws-athena-query-results-123456789012-us-east-1/")
            })
            .then_output(|| {
                StartQueryExecutionOutput::builder()
                    .query_execution_id("q-1")
                    .build()
            });
        let get = mock!(aws_sdk_athena::Client::get_query_execution)
            .then_output(|| status(QueryExecutionState::Succeeded, None));
        let identity = mock!(aws_sdk_sts::Client::get_caller_identity).then_output(|| {
            GetCallerIdentityOutput::builder()
                .account("123456789012")
                .build()
        });
        let create = mock!(aws_sdk_s3::Client::create_bucket)
            .match_requests(|req| req.create_bucket_configuration().is_none())
            .then_error(|| {
                CreateBucketError::BucketAlreadyOwnedByYou(
                    BucketAlreadyOwnedByYou::builder().build(),
                )
            });

        let catalog = GlueAthenaCatalog::new(
            idle_glue(),
            mock_client!(aws_sdk_athena, [&workgroup, &start, &get]),
            mock_client!(aws_sdk_s3, [&create]),
            mock_client!(aws_sdk_sts, [&identity]),
            Some("us-east-1".to_string()),
            settings(None),
        );

        catalog.execute_ddl("db1", "DDL").await.unwrap();
        assert_eq!(create.num_calls(), 1);
    }
}

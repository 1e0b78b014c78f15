//! CREATE TABLE template for AWS Config snapshot files
//!
//! One row per `ConfigSnapshot` JSON document. Partition keys are not stored in
//! the data; Athena derives them through partition projection from the
//! Control Tower prefix layout.

/// Placeholders: `database_name`, `table_name`, `bucket_name`, `orgs`,
/// `accounts`, `regions`, `begindate`.
pub const CREATE_TABLE_TEMPLATE: &str = r#"CREATE EXTERNAL TABLE `:database_name;`.`:table_name;`
(
  fileversion STRING,
  configSnapshotId STRING,
  configurationitems ARRAY < STRUCT <
      configurationItemVersion : STRING,
      configurationItemCaptureTime : STRING,
      configurationStateId : BIGINT,
      awsAccountId : STRING,
      configurationItemStatus : STRING,
      resourceType : STRING,
      resourceId : STRING,
      resourceName : STRING,
      relationships : ARRAY < STRING >,
      ARN : STRING,
      awsRegion : STRING,
      availabilityZone : STRING,
      configurationStateMd5Hash : STRING,
      configuration : STRING,
      supplementaryConfiguration : MAP < STRING, STRING >,
      tags : MAP < STRING, STRING >,
      resourceCreationTime : STRING
  > >
)
PARTITIONED BY (
  `org` string,
  `account` string,
  `region` string,
  `date` string
)
ROW FORMAT SERDE 'org.openx.data.jsonserde.JsonSerDe'
LOCATION 's3://:bucket_name;/'
TBLPROPERTIES
(
  "projection.enabled" = "true",
  "projection.account.type" = "enum",
  "projection.account.values" = ":accounts;",
  "projection.region.type" = "enum",
  "projection.region.values" = ":regions;",
  "projection.org.type" = "enum",
  "projection.org.values" = ":orgs;",
  "projection.date.format" = "yyyy/M/d",
  "projection.date.interval" = "1",
  "projection.date.interval.unit" = "DAYS",
  "projection.date.range" = ":begindate;,NOW",
  "projection.date.type" = "date",
  "storage.location.template" = "s3://:bucket_name;/${org}/AWSLogs/${account}/Config/${region}/${date}/ConfigSnapshot"
)"#;

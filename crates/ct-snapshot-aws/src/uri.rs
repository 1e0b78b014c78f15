//! `s3://bucket/key` parsing

use anyhow::{bail, Result};
use std::fmt;

const SCHEME: &str = "s3://";

/// A bucket plus a key (or key prefix)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Uri {
    pub bucket: String,
    pub key: String,
}

impl S3Uri {
    pub fn parse(uri: &str) -> Result<Self> {
        let Some(rest) = uri.strip_prefix(SCHEME) else {
            bail!("'{}' is not an s3:// URI", uri);
        };

        let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            bail!("'{}' has no bucket name", uri);
        }

        Ok(Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    /// Root of a bucket, `s3://bucket/`
    pub fn bucket_root(bucket: &str) -> String {
        format!("{SCHEME}{bucket}/")
    }

    /// Full URI for another key in the same bucket
    pub fn with_key(&self, key: &str) -> String {
        format!("{SCHEME}{}/{}", self.bucket, key)
    }
}

impl fmt::Display for S3Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}{}/{}", self.bucket, self.key)
    }
}

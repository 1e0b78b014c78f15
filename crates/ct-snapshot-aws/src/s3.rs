//! S3 prefix listing
//!
//! Uses ListObjectsV2 with `delimiter="/"` so each call returns only the
//! immediate common prefixes, following continuation tokens to the end.

use crate::uri::S3Uri;
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use ct_snapshot_core::PrefixLister;
use tracing::debug;

pub struct S3PrefixLister {
    client: Client,
}

impl S3PrefixLister {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PrefixLister for S3PrefixLister {
    async fn list_directories(&self, path: &str) -> Result<Vec<String>> {
        let uri = S3Uri::parse(path)?;
        let mut prefixes = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut req = self
                .client
                .list_objects_v2()
                .bucket(&uri.bucket)
                .delimiter("/")
                .set_continuation_token(continuation_token.take());

            if !uri.key.is_empty() {
                req = req.prefix(&uri.key);
            }

            let resp = req
                .send()
                .await
                .with_context(|| format!("S3 list with delimiter failed for {}", path))?;

            prefixes.extend(
                resp.common_prefixes()
                    .iter()
                    .filter_map(|cp| cp.prefix())
                    .map(|p| uri.with_key(p)),
            );

            if resp.is_truncated() == Some(true) {
                continuation_token = resp.next_continuation_token().map(String::from);
                if continuation_token.is_none() {
                    break;
                }
            } else {
                break;
            }
        }

        debug!(
            prefix = path,
            discovered_count = prefixes.len(),
            "Discovered sub-prefixes"
        );

        Ok(prefixes)
    }
}

//! Partition-space discovery over the Control Tower log-archive layout
//!
//! Walks `<root>/<org>/AWSLogs/<account>/Config/<region>/<year>/<month>/<day>/`
//! one level at a time and collects the identifiers seen at each level, plus the
//! earliest date with data.
//!
//! The earliest date of a region is the minimum day of the minimum month of the
//! minimum year, each minimum taken independently and each level re-listed by
//! its unpadded numeric value. Only that one branch is descended per region.

use crate::error::DiscoveryError;
use crate::storage::PrefixLister;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

const AWS_LOGS_DIR: &str = "AWSLogs/";
const CONFIG_DIR: &str = "Config/";

/// Result of walking the prefix hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub orgs: BTreeSet<String>,
    pub accounts: BTreeSet<String>,
    pub regions: BTreeSet<String>,
    /// Earliest date found, or the run date if nothing was found
    pub begin_date: NaiveDate,
}

impl Discovery {
    /// An empty result whose begin date is the sentinel `today`
    pub fn empty(today: NaiveDate) -> Self {
        Self {
            orgs: BTreeSet::new(),
            accounts: BTreeSet::new(),
            regions: BTreeSet::new(),
            begin_date: today,
        }
    }

    pub fn orgs_csv(&self) -> String {
        join(&self.orgs)
    }

    pub fn accounts_csv(&self) -> String {
        join(&self.accounts)
    }

    pub fn regions_csv(&self) -> String {
        join(&self.regions)
    }

    /// Begin date as `YYYY/M/D`, no zero padding (matches projection format `yyyy/M/d`)
    pub fn begin_date_param(&self) -> String {
        format!(
            "{}/{}/{}",
            self.begin_date.year(),
            self.begin_date.month(),
            self.begin_date.day()
        )
    }

    fn observe_date(&mut self, candidate: NaiveDate) {
        if candidate < self.begin_date {
            self.begin_date = candidate;
        }
    }
}

fn join(ids: &BTreeSet<String>) -> String {
    ids.iter().map(String::as_str).collect::<Vec<_>>().join(",")
}

/// Second-to-last `/`-separated segment of a listed prefix.
///
/// `s3://bucket/org-1/` yields `org-1`.
pub fn segment(path: &str) -> Result<&str, DiscoveryError> {
    let malformed = || DiscoveryError::MalformedPrefix {
        path: path.to_string(),
    };

    if !path.ends_with('/') {
        return Err(malformed());
    }

    match path.rsplit('/').nth(1) {
        Some(seg) if !seg.is_empty() => Ok(seg),
        _ => Err(malformed()),
    }
}

/// Discover orgs, accounts, regions and the earliest date under `root`.
///
/// `today` is the upper-bound sentinel for the earliest date.
#[instrument(skip(lister))]
pub async fn discover<L>(
    lister: &L,
    root: &str,
    today: NaiveDate,
) -> Result<Discovery, DiscoveryError>
where
    L: PrefixLister + ?Sized,
{
    let root = normalize_root(root);
    let mut found = Discovery::empty(today);

    info!("Enumerating orgs, accounts, and regions from bucket prefixes");

    for org in list(lister, &root).await? {
        found.orgs.insert(segment(&org)?.to_string());

        for account in list(lister, &format!("{org}{AWS_LOGS_DIR}")).await? {
            found.accounts.insert(segment(&account)?.to_string());

            for region in list(lister, &format!("{account}{CONFIG_DIR}")).await? {
                found.regions.insert(segment(&region)?.to_string());

                let first = earliest_region_date(lister, &region).await?;
                debug!(region = %region, first_date = %first, "Earliest date for region");
                found.observe_date(first);
            }
        }
    }

    info!(
        orgs = found.orgs.len(),
        accounts = found.accounts.len(),
        regions = found.regions.len(),
        begin_date = %found.begin_date,
        "Discovery complete"
    );

    Ok(found)
}

/// Earliest date under one region prefix: min day of min month of min year.
pub async fn earliest_region_date<L>(
    lister: &L,
    region_prefix: &str,
) -> Result<NaiveDate, DiscoveryError>
where
    L: PrefixLister + ?Sized,
{
    let year = min_numeric(lister, region_prefix, "year").await?;
    let year_prefix = format!("{region_prefix}{year}/");

    let month = min_numeric(lister, &year_prefix, "month").await?;
    let month_prefix = format!("{year_prefix}{month}/");

    let day = min_numeric(lister, &month_prefix, "day").await?;

    i32::try_from(year)
        .ok()
        .and_then(|y| NaiveDate::from_ymd_opt(y, month, day))
        .ok_or_else(|| DiscoveryError::InvalidDate {
            prefix: region_prefix.to_string(),
            year,
            month,
            day,
        })
}

async fn min_numeric<L>(
    lister: &L,
    prefix: &str,
    level: &'static str,
) -> Result<u32, DiscoveryError>
where
    L: PrefixLister + ?Sized,
{
    let mut min: Option<u32> = None;

    for child in list(lister, prefix).await? {
        let seg = segment(&child)?;
        let value = seg
            .parse::<u32>()
            .map_err(|_| DiscoveryError::InvalidSegment {
                prefix: prefix.to_string(),
                level,
                segment: seg.to_string(),
            })?;
        min = Some(min.map_or(value, |m| m.min(value)));
    }

    min.ok_or_else(|| DiscoveryError::EmptyListing {
        prefix: prefix.to_string(),
        level,
    })
}

async fn list<L>(lister: &L, prefix: &str) -> Result<Vec<String>, DiscoveryError>
where
    L: PrefixLister + ?Sized,
{
    lister
        .list_directories(prefix)
        .await
        .map_err(|source| DiscoveryError::Listing {
            prefix: prefix.to_string(),
            source,
        })
}

fn normalize_root(root: &str) -> String {
    if root.ends_with('/') {
        root.to_string()
    } else {
        format!("{root}/")
    }
}

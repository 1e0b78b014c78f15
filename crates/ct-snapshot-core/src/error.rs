//! Error types for discovery, templating and provisioning.

use thiserror::Error;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E101: Listing a prefix failed
    E101ListingFailed,
    /// E102: A prefix had no children where a minimum was required
    E102EmptyListing,
    /// E103: A year/month/day segment was not numeric
    E103InvalidSegment,
    /// E104: Year/month/day did not form a calendar date
    E104InvalidDate,
    /// E105: A listed prefix had no directory segment
    E105MalformedPrefix,
    /// E201: Template placeholder without a value
    E201UnresolvedPlaceholder,
    /// E202: Parameter not referenced by the template
    E202UnusedParameter,
    /// E203: Parameter value would break out of its template position
    E203UnsafeValue,
    /// E301: Dropping the existing table failed
    E301DeleteTable,
    /// E302: Rendering the CREATE TABLE statement failed
    E302Template,
    /// E303: Executing the CREATE TABLE statement failed
    E303ExecuteDdl,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E101ListingFailed => "E101",
            Self::E102EmptyListing => "E102",
            Self::E103InvalidSegment => "E103",
            Self::E104InvalidDate => "E104",
            Self::E105MalformedPrefix => "E105",
            Self::E201UnresolvedPlaceholder => "E201",
            Self::E202UnusedParameter => "E202",
            Self::E203UnsafeValue => "E203",
            Self::E301DeleteTable => "E301",
            Self::E302Template => "E302",
            Self::E303ExecuteDdl => "E303",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while walking the log-archive prefix hierarchy
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("[E101] Failed to list prefix {prefix}")]
    Listing {
        prefix: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("[E102] Prefix {prefix} has no child prefixes; cannot determine earliest {level}")]
    EmptyListing { prefix: String, level: &'static str },

    #[error("[E103] Expected a numeric {level} segment under {prefix}, found '{segment}'")]
    InvalidSegment {
        prefix: String,
        level: &'static str,
        segment: String,
    },

    #[error("[E104] {year}/{month}/{day} under {prefix} is not a calendar date")]
    InvalidDate {
        prefix: String,
        year: u32,
        month: u32,
        day: u32,
    },

    #[error("[E105] Listed prefix '{path}' has no directory segment")]
    MalformedPrefix { path: String },
}

impl DiscoveryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Listing { .. } => ErrorCode::E101ListingFailed,
            Self::EmptyListing { .. } => ErrorCode::E102EmptyListing,
            Self::InvalidSegment { .. } => ErrorCode::E103InvalidSegment,
            Self::InvalidDate { .. } => ErrorCode::E104InvalidDate,
            Self::MalformedPrefix { .. } => ErrorCode::E105MalformedPrefix,
        }
    }
}

/// Errors raised while rendering a named-parameter template
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("[E201] Template placeholder ':{name};' has no value")]
    UnresolvedPlaceholder { name: String },

    #[error("[E202] Parameter '{name}' is not referenced by the template")]
    UnusedParameter { name: String },

    #[error("[E203] Value for parameter '{name}' contains forbidden character {found:?}")]
    UnsafeValue { name: String, found: char },
}

impl TemplateError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnresolvedPlaceholder { .. } => ErrorCode::E201UnresolvedPlaceholder,
            Self::UnusedParameter { .. } => ErrorCode::E202UnusedParameter,
            Self::UnsafeValue { .. } => ErrorCode::E203UnsafeValue,
        }
    }
}

/// Errors raised while replacing the catalog table
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("[E301] Failed to delete table {database}.{table}")]
    DeleteTable {
        database: String,
        table: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("[E302] Failed to render CREATE TABLE statement")]
    Template(#[from] TemplateError),

    #[error("[E303] Failed to create table {database}.{table}")]
    ExecuteDdl {
        database: String,
        table: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ProvisionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::DeleteTable { .. } => ErrorCode::E301DeleteTable,
            Self::Template(_) => ErrorCode::E302Template,
            Self::ExecuteDdl { .. } => ErrorCode::E303ExecuteDdl,
        }
    }
}

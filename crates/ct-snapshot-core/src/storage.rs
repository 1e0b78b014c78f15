//! Object-store listing abstraction

use anyhow::Result;
use async_trait::async_trait;

/// Lists the immediate child "directories" of a prefix.
///
/// Implementations return full prefix strings ending in `/`, one level deeper
/// than `path`, with no recursion. A complete listing is returned (paginated
/// backends must follow every page).
#[async_trait]
pub trait PrefixLister: Send + Sync {
    async fn list_directories(&self, path: &str) -> Result<Vec<String>>;
}

//! Client side of the Notion database query API.

pub mod client;
pub mod query;
pub mod types;

use crate::errors::FeedError;
use async_trait::async_trait;
use types::Page;

pub use client::NotionClient;

/// Column names read from the source database.
pub mod property_names {
    pub const PUBLICATION_DATE: &str = "Date de publication";
    pub const COMPTES: &str = "Comptes";
    pub const VISUELS: &str = "Visuels";
    pub const FORMAT: &str = "Format";
    /// Checked in order, the first present column wins.
    pub const CAPTION: &[&str] = &["Caption", "Légende"];
    pub const LINK: &[&str] = &["Lien", "URL"];
}

/// Source of raw database rows for the feed.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Returns the rows of `database_id` matching any of `comptes`, newest first.
    /// An empty `comptes` applies no filter.
    async fn query(&self, database_id: &str, comptes: &[String]) -> Result<Vec<Page>, FeedError>;
}

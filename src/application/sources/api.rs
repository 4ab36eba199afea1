//! Boundary trait for the external catalogue API.
//!
//! HTTP 404 is a first-class "no data" outcome and surfaces as `Ok(None)`
//! (or an empty vector for searches), never as an error.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::catalogue::{
    AlmanaxDay, AlmanaxEffect, BasicItem, Equipment, EquipmentSet, ListEntry, Mount, SearchHit,
};
use crate::domain::types::Language;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("transport failure: {message}")]
    Transport { message: String },
    #[error("source answered status {status} on `{endpoint}`")]
    Status { status: u16, endpoint: String },
    #[error("source payload could not be decoded: {message}")]
    Decode { message: String },
}

impl SourceError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Raw, uncached view of the catalogue source.
///
/// The aggregator owns caching, timeouts and identifier conversion; an
/// implementation only speaks the wire protocol.
#[async_trait]
pub trait CatalogueApi: Send + Sync {
    /// Cross-index search over every supported entity type.
    async fn search_any_items(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<SearchHit>, SourceError>;

    async fn search_consumables(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<ListEntry>, SourceError>;

    async fn search_equipment(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<ListEntry>, SourceError>;

    async fn search_cosmetics(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<ListEntry>, SourceError>;

    async fn search_mounts(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<ListEntry>, SourceError>;

    async fn search_sets(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<ListEntry>, SourceError>;

    async fn search_resources(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<ListEntry>, SourceError>;

    async fn search_quest_items(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<ListEntry>, SourceError>;

    async fn search_almanax_effects(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<AlmanaxEffect>, SourceError>;

    async fn consumable_by_id(
        &self,
        id: i32,
        language: Language,
    ) -> Result<Option<BasicItem>, SourceError>;

    async fn resource_by_id(
        &self,
        id: i32,
        language: Language,
    ) -> Result<Option<BasicItem>, SourceError>;

    async fn quest_item_by_id(
        &self,
        id: i32,
        language: Language,
    ) -> Result<Option<BasicItem>, SourceError>;

    async fn equipment_by_id(
        &self,
        id: i32,
        language: Language,
    ) -> Result<Option<Equipment>, SourceError>;

    async fn cosmetic_by_id(
        &self,
        id: i32,
        language: Language,
    ) -> Result<Option<Equipment>, SourceError>;

    async fn mount_by_id(&self, id: i32, language: Language)
    -> Result<Option<Mount>, SourceError>;

    async fn set_by_id(
        &self,
        id: i32,
        language: Language,
    ) -> Result<Option<EquipmentSet>, SourceError>;

    /// Almanax entry for one exact calendar date, `YYYY-MM-DD`.
    async fn almanax_by_date(
        &self,
        date: &str,
        language: Language,
    ) -> Result<Option<AlmanaxDay>, SourceError>;

    /// Almanax entries for the next `size` days starting today.
    async fn almanax_range(
        &self,
        size: i32,
        language: Language,
    ) -> Result<Vec<AlmanaxDay>, SourceError>;
}

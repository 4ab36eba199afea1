//! Source aggregator: cache-aside client over the catalogue API.
//!
//! Every call computes a deterministic cache key, serves hits without
//! touching the network, and writes raw responses back on miss, including
//! "no data" responses, so repeated misses stay cheap. External calls run
//! under a fixed per-call budget and are never retried here.

pub mod api;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use serde::Serialize;
use serde::de::DeserializeOwned;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use tracing::{error, warn};

use crate::application::error::{AppError, to_source_id};
use crate::application::sources::api::CatalogueApi;
use crate::cache::{CachePort, KeyScope, keys};
use crate::domain::catalogue::{
    AlmanaxDay, AlmanaxEffect, BasicItem, Equipment, EquipmentSet, ListEntry, Mount, SearchHit,
};
use crate::domain::protocol::SourceAttribution;
use crate::domain::types::{ItemKind, Language};

const ALMANAX_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Catalogue subtype labels mapped to internal item kinds.
static SUBTYPE_KINDS: Lazy<HashMap<&'static str, ItemKind>> = Lazy::new(|| {
    HashMap::from([
        ("consumables", ItemKind::Consumable),
        ("equipment", ItemKind::Equipment),
        ("cosmetics", ItemKind::Cosmetic),
        ("mounts", ItemKind::Mount),
        ("sets", ItemKind::Set),
        ("quest_items", ItemKind::QuestItem),
        ("resources", ItemKind::Resource),
    ])
});

/// Resolve a source-side subtype label to an item kind.
///
/// Unknown labels degrade to `AnyItem` with a warning; the caller stays
/// functional with an untyped entry.
pub fn item_kind_for_subtype(subtype: &str) -> ItemKind {
    match SUBTYPE_KINDS.get(subtype) {
        Some(kind) => *kind,
        None => {
            warn!(subtype, "no item kind matches the source subtype, using ANY_ITEM");
            ItemKind::AnyItem
        }
    }
}

pub(crate) fn format_almanax_date(date: Date) -> Result<String, AppError> {
    date.format(ALMANAX_DATE_FORMAT)
        .map_err(|err| AppError::unexpected(format!("unformattable almanax date: {err}")))
}

pub(crate) fn parse_almanax_date(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw, ALMANAX_DATE_FORMAT)
        .map_err(|err| AppError::validation(format!("invalid almanax date `{raw}`: {err}")))
}

/// Cache-aside aggregation layer over the external catalogue.
pub struct SourceService {
    api: Arc<dyn CatalogueApi>,
    cache: Arc<dyn CachePort>,
    source: String,
    call_budget: Duration,
}

impl SourceService {
    pub fn new(api: Arc<dyn CatalogueApi>, cache: Arc<dyn CachePort>, call_budget: Duration) -> Self {
        Self {
            api,
            cache,
            source: SourceAttribution::dofusdude().name,
            call_budget,
        }
    }

    /// Cache-aside wrapper shared by every operation.
    ///
    /// A hit that fails to decode is treated as a miss and refetched; the
    /// fresh response overwrites the unreadable entry.
    async fn cached<T, Fut>(
        &self,
        key: &str,
        entity: &'static str,
        fetch: impl FnOnce() -> Fut,
    ) -> Result<T, AppError>
    where
        T: Serialize + DeserializeOwned,
        Fut: Future<Output = Result<T, api::SourceError>>,
    {
        if let Some(raw) = self.cache.get(key) {
            match serde_json::from_slice::<T>(&raw) {
                Ok(value) => return Ok(value),
                Err(err) => warn!(key, error = %err, "unreadable cache entry, refetching"),
            }
        }

        let started = Instant::now();
        let value = tokio::time::timeout(self.call_budget, fetch())
            .await
            .map_err(|_| AppError::Timeout {
                budget_ms: self.call_budget.as_millis() as u64,
            })??;
        metrics::counter!("lorekeeper_source_call_total", "entity" => entity).increment(1);
        metrics::histogram!("lorekeeper_source_call_ms")
            .record(started.elapsed().as_secs_f64() * 1000.0);

        match serde_json::to_vec(&value) {
            Ok(raw) => self.cache.put(key, Bytes::from(raw)),
            Err(err) => warn!(key, error = %err, "source payload not cacheable"),
        }

        Ok(value)
    }

    // ------------------------------------------------------------------
    // Searches
    // ------------------------------------------------------------------

    pub async fn search_any_items(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<SearchHit>, AppError> {
        let key = keys::list_key("item", query, language, &self.source);
        self.cached(&key, "item", || self.api.search_any_items(query, language))
            .await
    }

    pub async fn search_consumables(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<ListEntry>, AppError> {
        let key = keys::list_key("consumable", query, language, &self.source);
        self.cached(&key, "consumable", || {
            self.api.search_consumables(query, language)
        })
        .await
    }

    pub async fn search_equipment(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<ListEntry>, AppError> {
        let key = keys::list_key("equipment", query, language, &self.source);
        self.cached(&key, "equipment", || self.api.search_equipment(query, language))
            .await
    }

    pub async fn search_cosmetics(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<ListEntry>, AppError> {
        let key = keys::list_key("cosmetic", query, language, &self.source);
        self.cached(&key, "cosmetic", || self.api.search_cosmetics(query, language))
            .await
    }

    pub async fn search_mounts(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<ListEntry>, AppError> {
        let key = keys::list_key("mount", query, language, &self.source);
        self.cached(&key, "mount", || self.api.search_mounts(query, language))
            .await
    }

    pub async fn search_sets(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<ListEntry>, AppError> {
        let key = keys::list_key("set", query, language, &self.source);
        self.cached(&key, "set", || self.api.search_sets(query, language))
            .await
    }

    pub async fn search_resources(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<ListEntry>, AppError> {
        let key = keys::list_key("resource", query, language, &self.source);
        self.cached(&key, "resource", || self.api.search_resources(query, language))
            .await
    }

    pub async fn search_quest_items(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<ListEntry>, AppError> {
        let key = keys::list_key("quest-item", query, language, &self.source);
        self.cached(&key, "quest-item", || {
            self.api.search_quest_items(query, language)
        })
        .await
    }

    pub async fn search_almanax_effects(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<AlmanaxEffect>, AppError> {
        let key = keys::list_key("almanax-effect", query, language, &self.source);
        self.cached(&key, "almanax-effect", || {
            self.api.search_almanax_effects(query, language)
        })
        .await
    }

    // ------------------------------------------------------------------
    // Detail lookups by identifier
    // ------------------------------------------------------------------

    pub async fn consumable_by_id(
        &self,
        id: i64,
        language: Language,
    ) -> Result<Option<BasicItem>, AppError> {
        let source_id = to_source_id(id)?;
        let key = keys::item_key(KeyScope::Item, "consumable", &id.to_string(), language, &self.source);
        self.cached(&key, "consumable", || {
            self.api.consumable_by_id(source_id, language)
        })
        .await
    }

    pub async fn resource_by_id(
        &self,
        id: i64,
        language: Language,
    ) -> Result<Option<BasicItem>, AppError> {
        let source_id = to_source_id(id)?;
        let key = keys::item_key(KeyScope::Item, "resource", &id.to_string(), language, &self.source);
        self.cached(&key, "resource", || self.api.resource_by_id(source_id, language))
            .await
    }

    pub async fn quest_item_by_id(
        &self,
        id: i64,
        language: Language,
    ) -> Result<Option<BasicItem>, AppError> {
        let source_id = to_source_id(id)?;
        let key = keys::item_key(KeyScope::Item, "quest-item", &id.to_string(), language, &self.source);
        self.cached(&key, "quest-item", || {
            self.api.quest_item_by_id(source_id, language)
        })
        .await
    }

    pub async fn equipment_by_id(
        &self,
        id: i64,
        language: Language,
    ) -> Result<Option<Equipment>, AppError> {
        let source_id = to_source_id(id)?;
        let key = keys::item_key(KeyScope::Item, "equipment", &id.to_string(), language, &self.source);
        self.cached(&key, "equipment", || {
            self.api.equipment_by_id(source_id, language)
        })
        .await
    }

    /// Cosmetics share the equipment shape; the weapon block never applies
    /// and is cleared before the record is cached.
    pub async fn cosmetic_by_id(
        &self,
        id: i64,
        language: Language,
    ) -> Result<Option<Equipment>, AppError> {
        let source_id = to_source_id(id)?;
        let key = keys::item_key(KeyScope::Item, "cosmetic", &id.to_string(), language, &self.source);
        self.cached(&key, "cosmetic", || async {
            let cosmetic = self.api.cosmetic_by_id(source_id, language).await?;
            Ok(cosmetic.map(|mut item| {
                item.is_weapon = false;
                item.critical_hit_probability = None;
                item.critical_hit_bonus = None;
                item.max_cast_per_turn = None;
                item.ap_cost = None;
                item.range = None;
                item
            }))
        })
        .await
    }

    pub async fn mount_by_id(&self, id: i64, language: Language) -> Result<Option<Mount>, AppError> {
        let source_id = to_source_id(id)?;
        let key = keys::item_key(KeyScope::Item, "mount", &id.to_string(), language, &self.source);
        self.cached(&key, "mount", || self.api.mount_by_id(source_id, language))
            .await
    }

    pub async fn set_by_id(
        &self,
        id: i64,
        language: Language,
    ) -> Result<Option<EquipmentSet>, AppError> {
        let source_id = to_source_id(id)?;
        let key = keys::item_key(KeyScope::Set, "set", &id.to_string(), language, &self.source);
        self.cached(&key, "set", || self.api.set_by_id(source_id, language))
            .await
    }

    // ------------------------------------------------------------------
    // Detail lookups by free-text query
    //
    // Policy: the source owns search ranking, so the top hit is trusted
    // without re-verification and forwarded to the by-id lookup.
    // ------------------------------------------------------------------

    pub async fn consumable_by_query(
        &self,
        query: &str,
        language: Language,
    ) -> Result<BasicItem, AppError> {
        let hits = self.search_consumables(query, language).await?;
        let first = hits.first().ok_or(AppError::not_found("consumable"))?;
        self.consumable_by_id(i64::from(first.ankama_id), language)
            .await?
            .ok_or(AppError::not_found("consumable"))
    }

    pub async fn equipment_by_query(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Equipment, AppError> {
        let hits = self.search_equipment(query, language).await?;
        let first = hits.first().ok_or(AppError::not_found("equipment"))?;
        self.equipment_by_id(i64::from(first.ankama_id), language)
            .await?
            .ok_or(AppError::not_found("equipment"))
    }

    pub async fn cosmetic_by_query(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Equipment, AppError> {
        let hits = self.search_cosmetics(query, language).await?;
        let first = hits.first().ok_or(AppError::not_found("cosmetic"))?;
        self.cosmetic_by_id(i64::from(first.ankama_id), language)
            .await?
            .ok_or(AppError::not_found("cosmetic"))
    }

    pub async fn mount_by_query(&self, query: &str, language: Language) -> Result<Mount, AppError> {
        let hits = self.search_mounts(query, language).await?;
        let first = hits.first().ok_or(AppError::not_found("mount"))?;
        self.mount_by_id(i64::from(first.ankama_id), language)
            .await?
            .ok_or(AppError::not_found("mount"))
    }

    pub async fn set_by_query(
        &self,
        query: &str,
        language: Language,
    ) -> Result<EquipmentSet, AppError> {
        let hits = self.search_sets(query, language).await?;
        let first = hits.first().ok_or(AppError::not_found("set"))?;
        self.set_by_id(i64::from(first.ankama_id), language)
            .await?
            .ok_or(AppError::not_found("set"))
    }

    pub async fn resource_by_query(
        &self,
        query: &str,
        language: Language,
    ) -> Result<BasicItem, AppError> {
        let hits = self.search_resources(query, language).await?;
        let first = hits.first().ok_or(AppError::not_found("resource"))?;
        self.resource_by_id(i64::from(first.ankama_id), language)
            .await?
            .ok_or(AppError::not_found("resource"))
    }

    pub async fn quest_item_by_query(
        &self,
        query: &str,
        language: Language,
    ) -> Result<BasicItem, AppError> {
        let hits = self.search_quest_items(query, language).await?;
        let first = hits.first().ok_or(AppError::not_found("quest item"))?;
        self.quest_item_by_id(i64::from(first.ankama_id), language)
            .await?
            .ok_or(AppError::not_found("quest item"))
    }

    // ------------------------------------------------------------------
    // Almanax
    // ------------------------------------------------------------------

    /// Resolve the almanax entry for a calendar date.
    ///
    /// The source only guarantees coverage for the current year. A miss on
    /// another year retries the same month/day in the current year and, on
    /// success, returns that entry restamped with the requested date: an
    /// annual-repetition approximation, not historical data. A miss within
    /// the current year is a genuine gap and yields soft absence.
    pub async fn almanax_by_date(
        &self,
        date: Date,
        language: Language,
    ) -> Result<Option<AlmanaxDay>, AppError> {
        self.almanax_by_date_inner(date, language, true).await
    }

    fn almanax_by_date_inner(
        &self,
        date: Date,
        language: Language,
        allow_fallback: bool,
    ) -> BoxFuture<'_, Result<Option<AlmanaxDay>, AppError>> {
        Box::pin(async move {
            let formatted = format_almanax_date(date)?;
            let key =
                keys::item_key(KeyScope::Almanax, "day", &formatted, language, &self.source);
            let day: Option<AlmanaxDay> = self
                .cached(&key, "almanax", || self.api.almanax_by_date(&formatted, language))
                .await?;
            if day.is_some() {
                return Ok(day);
            }

            let current_year = OffsetDateTime::now_utc().year();
            if date.year() == current_year || !allow_fallback {
                error!(date = %formatted, "source has no almanax entry for a close date, answering without one");
                return Ok(None);
            }

            warn!(date = %formatted, "source has no almanax entry for the exact date, retrying in the current year");
            let Ok(fallback_date) = Date::from_calendar_date(current_year, date.month(), date.day())
            else {
                // Feb 29 mapped into a non-leap year: no equivalent day exists.
                warn!(date = %formatted, "requested day does not exist in the current year");
                return Ok(None);
            };

            match self
                .almanax_by_date_inner(fallback_date, language, false)
                .await?
            {
                Some(mut fallback) => {
                    fallback.date = formatted;
                    if let Ok(raw) = serde_json::to_vec(&Some(fallback.clone())) {
                        self.cache.put(&key, Bytes::from(raw));
                    }
                    Ok(Some(fallback))
                }
                None => Ok(None),
            }
        })
    }

    /// Almanax entries over the next `duration` days, keyed on today's date.
    pub async fn almanax_by_range(
        &self,
        duration: i64,
        language: Language,
    ) -> Result<Vec<AlmanaxDay>, AppError> {
        let size = to_source_id(duration)?;
        let today = format_almanax_date(OffsetDateTime::now_utc().date())?;
        let key = keys::item_key(
            KeyScope::AlmanaxRange,
            "day",
            &format!("{today}_{duration}"),
            language,
            &self.source,
        );
        self.cached(&key, "almanax-range", || self.api.almanax_range(size, language))
            .await
    }
}

#[cfg(test)]
pub(crate) mod tests;

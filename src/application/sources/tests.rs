use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use time::{Date, Month, OffsetDateTime};

use super::api::{CatalogueApi, SourceError};
use super::{SourceService, item_kind_for_subtype, parse_almanax_date};
use crate::application::error::AppError;
use crate::cache::InMemoryCache;
use crate::domain::catalogue::{
    AlmanaxBonus, AlmanaxDay, AlmanaxEffect, BasicItem, Equipment, EquipmentSet, ImageUrls,
    ListEntry, Mount, SearchHit, Tribute, TributeItem, TypedId,
};
use crate::domain::types::{ItemKind, Language};

/// Scripted catalogue source recording every raw call it receives.
#[derive(Default)]
pub(crate) struct StubApi {
    pub calls: Mutex<Vec<String>>,
    pub delay: Mutex<Duration>,
    pub search_hits: Vec<ListEntry>,
    pub equipment: HashMap<i32, Equipment>,
    pub cosmetics: HashMap<i32, Equipment>,
    pub items: HashMap<i32, BasicItem>,
    pub mounts: HashMap<i32, Mount>,
    pub sets: HashMap<i32, EquipmentSet>,
    pub almanax: HashMap<String, AlmanaxDay>,
    pub almanax_effects: Vec<AlmanaxEffect>,
}

impl StubApi {
    async fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogueApi for StubApi {
    async fn search_any_items(
        &self,
        query: &str,
        _language: Language,
    ) -> Result<Vec<SearchHit>, SourceError> {
        self.record(format!("search_any_items:{query}")).await;
        Ok(self
            .search_hits
            .iter()
            .map(|entry| SearchHit {
                ankama_id: entry.ankama_id,
                name: entry.name.clone(),
            })
            .collect())
    }

    async fn search_consumables(
        &self,
        query: &str,
        _language: Language,
    ) -> Result<Vec<ListEntry>, SourceError> {
        self.record(format!("search_consumables:{query}")).await;
        Ok(self.search_hits.clone())
    }

    async fn search_equipment(
        &self,
        query: &str,
        _language: Language,
    ) -> Result<Vec<ListEntry>, SourceError> {
        self.record(format!("search_equipment:{query}")).await;
        Ok(self.search_hits.clone())
    }

    async fn search_cosmetics(
        &self,
        query: &str,
        _language: Language,
    ) -> Result<Vec<ListEntry>, SourceError> {
        self.record(format!("search_cosmetics:{query}")).await;
        Ok(self.search_hits.clone())
    }

    async fn search_mounts(
        &self,
        query: &str,
        _language: Language,
    ) -> Result<Vec<ListEntry>, SourceError> {
        self.record(format!("search_mounts:{query}")).await;
        Ok(self.search_hits.clone())
    }

    async fn search_sets(
        &self,
        query: &str,
        _language: Language,
    ) -> Result<Vec<ListEntry>, SourceError> {
        self.record(format!("search_sets:{query}")).await;
        Ok(self.search_hits.clone())
    }

    async fn search_resources(
        &self,
        query: &str,
        _language: Language,
    ) -> Result<Vec<ListEntry>, SourceError> {
        self.record(format!("search_resources:{query}")).await;
        Ok(self.search_hits.clone())
    }

    async fn search_quest_items(
        &self,
        query: &str,
        _language: Language,
    ) -> Result<Vec<ListEntry>, SourceError> {
        self.record(format!("search_quest_items:{query}")).await;
        Ok(self.search_hits.clone())
    }

    async fn search_almanax_effects(
        &self,
        query: &str,
        _language: Language,
    ) -> Result<Vec<AlmanaxEffect>, SourceError> {
        self.record(format!("search_almanax_effects:{query}")).await;
        Ok(self.almanax_effects.clone())
    }

    async fn consumable_by_id(
        &self,
        id: i32,
        _language: Language,
    ) -> Result<Option<BasicItem>, SourceError> {
        self.record(format!("consumable_by_id:{id}")).await;
        Ok(self.items.get(&id).cloned())
    }

    async fn resource_by_id(
        &self,
        id: i32,
        _language: Language,
    ) -> Result<Option<BasicItem>, SourceError> {
        self.record(format!("resource_by_id:{id}")).await;
        Ok(self.items.get(&id).cloned())
    }

    async fn quest_item_by_id(
        &self,
        id: i32,
        _language: Language,
    ) -> Result<Option<BasicItem>, SourceError> {
        self.record(format!("quest_item_by_id:{id}")).await;
        Ok(self.items.get(&id).cloned())
    }

    async fn equipment_by_id(
        &self,
        id: i32,
        _language: Language,
    ) -> Result<Option<Equipment>, SourceError> {
        self.record(format!("equipment_by_id:{id}")).await;
        Ok(self.equipment.get(&id).cloned())
    }

    async fn cosmetic_by_id(
        &self,
        id: i32,
        _language: Language,
    ) -> Result<Option<Equipment>, SourceError> {
        self.record(format!("cosmetic_by_id:{id}")).await;
        Ok(self.cosmetics.get(&id).cloned())
    }

    async fn mount_by_id(
        &self,
        id: i32,
        _language: Language,
    ) -> Result<Option<Mount>, SourceError> {
        self.record(format!("mount_by_id:{id}")).await;
        Ok(self.mounts.get(&id).cloned())
    }

    async fn set_by_id(
        &self,
        id: i32,
        _language: Language,
    ) -> Result<Option<EquipmentSet>, SourceError> {
        self.record(format!("set_by_id:{id}")).await;
        Ok(self.sets.get(&id).cloned())
    }

    async fn almanax_by_date(
        &self,
        date: &str,
        _language: Language,
    ) -> Result<Option<AlmanaxDay>, SourceError> {
        self.record(format!("almanax_by_date:{date}")).await;
        Ok(self.almanax.get(date).cloned())
    }

    async fn almanax_range(
        &self,
        size: i32,
        _language: Language,
    ) -> Result<Vec<AlmanaxDay>, SourceError> {
        self.record(format!("almanax_range:{size}")).await;
        let mut days: Vec<AlmanaxDay> = self.almanax.values().cloned().collect();
        days.sort_by(|a, b| a.date.cmp(&b.date));
        days.truncate(size as usize);
        Ok(days)
    }
}

pub(crate) fn entry(id: i32, name: &str) -> ListEntry {
    ListEntry {
        ankama_id: id,
        name: name.to_owned(),
        level: None,
    }
}

pub(crate) fn equipment(id: i32, name: &str) -> Equipment {
    Equipment {
        ankama_id: id,
        name: name.to_owned(),
        description: String::new(),
        kind: TypedId {
            id: 9,
            name: Some("Ring".to_owned()),
        },
        is_weapon: false,
        level: 60,
        pods: 10,
        image_urls: ImageUrls::default(),
        effects: Vec::new(),
        conditions: None,
        recipe: None,
        parent_set: None,
        critical_hit_probability: None,
        critical_hit_bonus: None,
        max_cast_per_turn: None,
        ap_cost: None,
        range: None,
    }
}

pub(crate) fn basic_item(id: i32, name: &str) -> BasicItem {
    BasicItem {
        ankama_id: id,
        name: name.to_owned(),
        description: String::new(),
        kind: TypedId {
            id: 48,
            name: Some("Resource".to_owned()),
        },
        level: 1,
        pods: 1,
        image_urls: ImageUrls::default(),
        effects: Vec::new(),
        recipe: None,
    }
}

pub(crate) fn almanax_day(date: &str, bonus: &str) -> AlmanaxDay {
    AlmanaxDay {
        date: date.to_owned(),
        bonus: AlmanaxBonus {
            description: bonus.to_owned(),
            kind: None,
        },
        tribute: Tribute {
            item: TributeItem {
                ankama_id: 1,
                name: "Clay".to_owned(),
                subtype: "resources".to_owned(),
                image_urls: ImageUrls::default(),
            },
            quantity: 3,
        },
        reward_kamas: 10_000,
    }
}

fn service(api: Arc<StubApi>) -> SourceService {
    service_with_cache(api, Arc::new(InMemoryCache::new()))
}

fn service_with_cache(api: Arc<StubApi>, cache: Arc<InMemoryCache>) -> SourceService {
    SourceService::new(api, cache, Duration::from_secs(5))
}

fn current_year_date(month: Month, day: u8) -> Date {
    Date::from_calendar_date(OffsetDateTime::now_utc().year(), month, day).unwrap()
}

#[tokio::test]
async fn a_cache_hit_never_reaches_the_source() {
    let api = Arc::new(StubApi {
        search_hits: vec![entry(10, "Gelano")],
        ..StubApi::default()
    });
    let service = service(api.clone());

    let first = service.search_equipment("gelano", Language::Fr).await.unwrap();
    let second = service.search_equipment("gelano", Language::Fr).await.unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(api.calls().len(), 1);
}

#[tokio::test]
async fn absent_responses_are_cached_too() {
    let api = Arc::new(StubApi::default());
    let service = service(api.clone());

    assert!(service.equipment_by_id(404, Language::En).await.unwrap().is_none());
    assert!(service.equipment_by_id(404, Language::En).await.unwrap().is_none());
    assert_eq!(api.calls().len(), 1);
}

#[tokio::test]
async fn by_query_with_zero_hits_is_not_found_and_skips_the_detail_call() {
    let api = Arc::new(StubApi::default());
    let service = service(api.clone());

    let err = service.equipment_by_query("nothing", Language::En).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(api.calls(), vec!["search_equipment:nothing".to_owned()]);
}

#[tokio::test]
async fn by_query_trusts_the_first_hit() {
    let api = Arc::new(StubApi {
        search_hits: vec![entry(10, "Gelano"), entry(20, "Gelano II")],
        equipment: HashMap::from([(10, equipment(10, "Gelano"))]),
        ..StubApi::default()
    });
    let service = service(api.clone());

    let resolved = service.equipment_by_query("gelano", Language::En).await.unwrap();
    assert_eq!(resolved.ankama_id, 10);

    let detail_calls: Vec<String> = api
        .calls()
        .into_iter()
        .filter(|call| call.starts_with("equipment_by_id"))
        .collect();
    assert_eq!(detail_calls, vec!["equipment_by_id:10".to_owned()]);
}

#[tokio::test]
async fn out_of_range_identifier_fails_before_any_network_call() {
    let api = Arc::new(StubApi::default());
    let service = service(api.clone());

    let err = service
        .equipment_by_id(i64::from(i32::MAX) + 7, Language::En)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conversion { .. }));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn a_slow_source_call_surfaces_timeout_and_caches_nothing() {
    let api = Arc::new(StubApi {
        equipment: HashMap::from([(10, equipment(10, "Gelano"))]),
        ..StubApi::default()
    });
    *api.delay.lock().unwrap() = Duration::from_secs(5);
    let service = SourceService::new(
        api.clone(),
        Arc::new(InMemoryCache::new()),
        Duration::from_millis(5),
    );

    let err = service.equipment_by_id(10, Language::En).await.unwrap_err();
    assert!(matches!(err, AppError::Timeout { .. }));

    // A second call reaches the source again, so the stalled call left no entry.
    *api.delay.lock().unwrap() = Duration::ZERO;
    let detail = service.equipment_by_id(10, Language::En).await.unwrap();
    assert_eq!(detail.expect("equipment").ankama_id, 10);
    assert_eq!(api.calls().len(), 2);
}

#[tokio::test]
async fn past_year_almanax_falls_back_to_the_current_year_and_keeps_the_date() {
    let fallback = format!("{}-03-05", OffsetDateTime::now_utc().year());
    let api = Arc::new(StubApi {
        almanax: HashMap::from([(fallback.clone(), almanax_day(&fallback, "Double XP"))]),
        ..StubApi::default()
    });
    let service = service(api.clone());

    let requested = Date::from_calendar_date(2019, Month::March, 5).unwrap();
    let day = service
        .almanax_by_date(requested, Language::En)
        .await
        .unwrap()
        .expect("fallback entry");

    assert_eq!(day.date, "2019-03-05");
    assert_eq!(day.bonus.description, "Double XP");
    assert_eq!(
        api.calls(),
        vec![
            "almanax_by_date:2019-03-05".to_owned(),
            format!("almanax_by_date:{fallback}"),
        ]
    );
}

#[tokio::test]
async fn restamped_fallback_is_cached_under_the_requested_date() {
    let fallback = format!("{}-03-05", OffsetDateTime::now_utc().year());
    let api = Arc::new(StubApi {
        almanax: HashMap::from([(fallback.clone(), almanax_day(&fallback, "Double XP"))]),
        ..StubApi::default()
    });
    let service = service(api.clone());

    let requested = Date::from_calendar_date(2019, Month::March, 5).unwrap();
    service.almanax_by_date(requested, Language::En).await.unwrap();
    let calls_after_first = api.calls().len();

    let again = service
        .almanax_by_date(requested, Language::En)
        .await
        .unwrap()
        .expect("cached entry");
    assert_eq!(again.date, "2019-03-05");
    assert_eq!(api.calls().len(), calls_after_first);
}

#[tokio::test]
async fn current_year_gap_is_soft_absence() {
    let api = Arc::new(StubApi::default());
    let service = service(api.clone());

    let missing = current_year_date(Month::June, 1);
    let day = service.almanax_by_date(missing, Language::En).await.unwrap();
    assert!(day.is_none());
    assert_eq!(api.calls().len(), 1);
}

#[tokio::test]
async fn cosmetic_detail_clears_the_weapon_block() {
    let mut dressed_up = equipment(77, "Ceremonial Cape");
    dressed_up.is_weapon = true;
    dressed_up.ap_cost = Some(4);
    dressed_up.critical_hit_bonus = Some(5);

    let api = Arc::new(StubApi {
        cosmetics: HashMap::from([(77, dressed_up)]),
        ..StubApi::default()
    });
    let service = service(api);

    let cosmetic = service
        .cosmetic_by_id(77, Language::En)
        .await
        .unwrap()
        .expect("cosmetic");
    assert!(!cosmetic.is_weapon);
    assert!(cosmetic.ap_cost.is_none());
    assert!(cosmetic.critical_hit_bonus.is_none());
}

#[test]
fn subtype_labels_map_to_item_kinds() {
    assert_eq!(item_kind_for_subtype("resources"), ItemKind::Resource);
    assert_eq!(item_kind_for_subtype("quest_items"), ItemKind::QuestItem);
    assert_eq!(item_kind_for_subtype("martian"), ItemKind::AnyItem);
}

#[test]
fn almanax_dates_parse_and_format_symmetrically() {
    let date = parse_almanax_date("2024-02-29").unwrap();
    assert_eq!(super::format_almanax_date(date).unwrap(), "2024-02-29");
    assert!(parse_almanax_date("2024-13-01").is_err());
}

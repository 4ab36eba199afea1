//! HTTP adapter for the catalogue source.
//!
//! Speaks the dofusdude REST surface: every endpoint lives under
//! `{base}/{game}/v1/{language}/...`. A 404 is a first-class "no data"
//! outcome here, never an error.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::application::sources::api::{CatalogueApi, SourceError};
use crate::config::SourceSettings;
use crate::domain::catalogue::{
    AlmanaxDay, AlmanaxEffect, BasicItem, Equipment, EquipmentSet, ListEntry, Mount, SearchHit,
};
use crate::domain::types::Language;

use super::error::InfraError;

/// Entity types the cross-index search is restricted to.
const SUPPORTED_SEARCH_TYPES: &[&str] = &[
    "shield",
    "hat",
    "cloak",
    "amulet",
    "ring",
    "belt",
    "boots",
    "axe",
    "bow",
    "dagger",
    "hammer",
    "lance",
    "pickaxe",
    "scythe",
    "shovel",
    "staff",
    "sword",
    "wand",
    "dofus",
    "prysmaradite",
    "trophy",
    "pet",
    "petsmount",
    "mount",
];

pub struct HttpCatalogueClient {
    http: Client,
    base_url: Url,
    game: String,
    search_limit: u32,
}

impl HttpCatalogueClient {
    pub fn new(settings: &SourceSettings) -> Result<Self, InfraError> {
        let http = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout)
            .build()
            .map_err(|err| {
                InfraError::configuration(format!("failed to build HTTP client: {err}"))
            })?;

        Ok(Self {
            http,
            base_url: settings.base_url.clone(),
            game: settings.game.clone(),
            search_limit: settings.search_limit.get(),
        })
    }

    fn endpoint(&self, language: Language, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .expect("base URL validated at configuration load");
            path.push(&self.game).push("v1").push(language.source_code());
            for segment in segments {
                path.push(segment);
            }
        }
        url
    }

    fn search_endpoint(&self, language: Language, segments: &[&str], query: &str) -> Url {
        let mut url = self.endpoint(language, segments);
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("limit", &self.search_limit.to_string());
        url
    }

    async fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, SourceError> {
        let endpoint = url.to_string();
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| SourceError::transport(err.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(SourceError::Status {
                status: response.status().as_u16(),
                endpoint,
            });
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|err| SourceError::decode(err.to_string()))
    }

    async fn fetch_list<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, SourceError> {
        Ok(self.fetch(url).await?.unwrap_or_default())
    }
}

#[async_trait]
impl CatalogueApi for HttpCatalogueClient {
    async fn search_any_items(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<SearchHit>, SourceError> {
        let mut url = self.search_endpoint(language, &["search"], query);
        url.query_pairs_mut().append_pair(
            "filter[type.name_id[$in]]",
            &SUPPORTED_SEARCH_TYPES.join(","),
        );
        self.fetch_list(url).await
    }

    async fn search_consumables(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<ListEntry>, SourceError> {
        let url = self.search_endpoint(language, &["items", "consumables", "search"], query);
        self.fetch_list(url).await
    }

    async fn search_equipment(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<ListEntry>, SourceError> {
        let url = self.search_endpoint(language, &["items", "equipment", "search"], query);
        self.fetch_list(url).await
    }

    async fn search_cosmetics(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<ListEntry>, SourceError> {
        let url = self.search_endpoint(language, &["items", "cosmetics", "search"], query);
        self.fetch_list(url).await
    }

    async fn search_mounts(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<ListEntry>, SourceError> {
        let url = self.search_endpoint(language, &["mounts", "search"], query);
        self.fetch_list(url).await
    }

    async fn search_sets(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<ListEntry>, SourceError> {
        let url = self.search_endpoint(language, &["sets", "search"], query);
        self.fetch_list(url).await
    }

    async fn search_resources(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<ListEntry>, SourceError> {
        let url = self.search_endpoint(language, &["items", "resources", "search"], query);
        self.fetch_list(url).await
    }

    async fn search_quest_items(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<ListEntry>, SourceError> {
        let url = self.search_endpoint(language, &["items", "quest", "search"], query);
        self.fetch_list(url).await
    }

    async fn search_almanax_effects(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<AlmanaxEffect>, SourceError> {
        let url = self.search_endpoint(
            language,
            &["meta", "almanax", "bonuses", "search"],
            query,
        );
        self.fetch_list(url).await
    }

    async fn consumable_by_id(
        &self,
        id: i32,
        language: Language,
    ) -> Result<Option<BasicItem>, SourceError> {
        let url = self.endpoint(language, &["items", "consumables", &id.to_string()]);
        self.fetch(url).await
    }

    async fn resource_by_id(
        &self,
        id: i32,
        language: Language,
    ) -> Result<Option<BasicItem>, SourceError> {
        let url = self.endpoint(language, &["items", "resources", &id.to_string()]);
        self.fetch(url).await
    }

    async fn quest_item_by_id(
        &self,
        id: i32,
        language: Language,
    ) -> Result<Option<BasicItem>, SourceError> {
        let url = self.endpoint(language, &["items", "quest", &id.to_string()]);
        self.fetch(url).await
    }

    async fn equipment_by_id(
        &self,
        id: i32,
        language: Language,
    ) -> Result<Option<Equipment>, SourceError> {
        let url = self.endpoint(language, &["items", "equipment", &id.to_string()]);
        self.fetch(url).await
    }

    async fn cosmetic_by_id(
        &self,
        id: i32,
        language: Language,
    ) -> Result<Option<Equipment>, SourceError> {
        let url = self.endpoint(language, &["items", "cosmetics", &id.to_string()]);
        self.fetch(url).await
    }

    async fn mount_by_id(
        &self,
        id: i32,
        language: Language,
    ) -> Result<Option<Mount>, SourceError> {
        let url = self.endpoint(language, &["mounts", &id.to_string()]);
        self.fetch(url).await
    }

    async fn set_by_id(
        &self,
        id: i32,
        language: Language,
    ) -> Result<Option<EquipmentSet>, SourceError> {
        let url = self.endpoint(language, &["sets", &id.to_string()]);
        self.fetch(url).await
    }

    async fn almanax_by_date(
        &self,
        date: &str,
        language: Language,
    ) -> Result<Option<AlmanaxDay>, SourceError> {
        let url = self.endpoint(language, &["almanax", date]);
        self.fetch(url).await
    }

    async fn almanax_range(
        &self,
        size: i32,
        language: Language,
    ) -> Result<Vec<AlmanaxDay>, SourceError> {
        let mut url = self.endpoint(language, &["almanax"]);
        url.query_pairs_mut()
            .append_pair("range[size]", &size.to_string());
        self.fetch_list(url).await
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;
    use std::time::Duration;

    use super::*;

    fn client() -> HttpCatalogueClient {
        HttpCatalogueClient::new(&SourceSettings {
            base_url: Url::parse("https://api.dofusdu.de").unwrap(),
            game: "dofus3".to_owned(),
            timeout: Duration::from_secs(5),
            search_limit: NonZeroU32::new(25).unwrap(),
            user_agent: "lorekeeper-test".to_owned(),
        })
        .expect("client")
    }

    #[test]
    fn detail_endpoints_nest_under_game_and_language() {
        let url = client().endpoint(Language::Fr, &["items", "equipment", "10"]);
        assert_eq!(
            url.as_str(),
            "https://api.dofusdu.de/dofus3/v1/fr/items/equipment/10"
        );
    }

    #[test]
    fn search_endpoints_carry_query_and_limit() {
        let url = client().search_endpoint(Language::Any, &["mounts", "search"], "drago turkey");
        assert_eq!(
            url.as_str(),
            "https://api.dofusdu.de/dofus3/v1/en/mounts/search?query=drago+turkey&limit=25"
        );
    }
}

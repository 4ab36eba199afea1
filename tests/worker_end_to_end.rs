//! End-to-end tests over the public surface: JSON requests go onto the
//! requests queue, one JSON answer per request comes back off the answers
//! queue, with a scripted catalogue source behind the aggregator.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc::Receiver;
use tokio::task::JoinHandle;

use lorekeeper::application::consumer::Consumer;
use lorekeeper::application::dispatcher::Dispatcher;
use lorekeeper::application::equipments::EquipmentTypeService;
use lorekeeper::application::sources::SourceService;
use lorekeeper::application::sources::api::{CatalogueApi, SourceError};
use lorekeeper::cache::InMemoryCache;
use lorekeeper::config::BrokerSettings;
use lorekeeper::domain::catalogue::{
    AlmanaxDay, AlmanaxEffect, BasicItem, Equipment, EquipmentSet, ImageUrls, ListEntry, Mount,
    SearchHit, TypedId,
};
use lorekeeper::domain::entities::EquipmentTypeRecord;
use lorekeeper::domain::protocol::{AnswerBody, AnswerEnvelope};
use lorekeeper::domain::types::{
    AnswerStatus, EquipmentKind, ItemKind, Language,
};
use lorekeeper::infra::broker::{ChannelBroker, Delivery, MessageBroker};

#[derive(Default)]
struct ScriptedCatalogue {
    search_hits: Vec<ListEntry>,
    equipment: HashMap<i32, Equipment>,
    cosmetics: HashMap<i32, Equipment>,
    items: HashMap<i32, BasicItem>,
    sets: HashMap<i32, EquipmentSet>,
    almanax: HashMap<String, AlmanaxDay>,
}

#[async_trait]
impl CatalogueApi for ScriptedCatalogue {
    async fn search_any_items(
        &self,
        _query: &str,
        _language: Language,
    ) -> Result<Vec<SearchHit>, SourceError> {
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
        _query: &str,
        _language: Language,
    ) -> Result<Vec<ListEntry>, SourceError> {
        Ok(self.search_hits.clone())
    }

    async fn search_equipment(
        &self,
        _query: &str,
        _language: Language,
    ) -> Result<Vec<ListEntry>, SourceError> {
        Ok(self.search_hits.clone())
    }

    async fn search_cosmetics(
        &self,
        _query: &str,
        _language: Language,
    ) -> Result<Vec<ListEntry>, SourceError> {
        Ok(self.search_hits.clone())
    }

    async fn search_mounts(
        &self,
        _query: &str,
        _language: Language,
    ) -> Result<Vec<ListEntry>, SourceError> {
        Ok(self.search_hits.clone())
    }

    async fn search_sets(
        &self,
        _query: &str,
        _language: Language,
    ) -> Result<Vec<ListEntry>, SourceError> {
        Ok(self.search_hits.clone())
    }

    async fn search_resources(
        &self,
        _query: &str,
        _language: Language,
    ) -> Result<Vec<ListEntry>, SourceError> {
        Ok(self.search_hits.clone())
    }

    async fn search_quest_items(
        &self,
        _query: &str,
        _language: Language,
    ) -> Result<Vec<ListEntry>, SourceError> {
        Ok(self.search_hits.clone())
    }

    async fn search_almanax_effects(
        &self,
        _query: &str,
        _language: Language,
    ) -> Result<Vec<AlmanaxEffect>, SourceError> {
        Ok(Vec::new())
    }

    async fn consumable_by_id(
        &self,
        id: i32,
        _language: Language,
    ) -> Result<Option<BasicItem>, SourceError> {
        Ok(self.items.get(&id).cloned())
    }

    async fn resource_by_id(
        &self,
        id: i32,
        _language: Language,
    ) -> Result<Option<BasicItem>, SourceError> {
        Ok(self.items.get(&id).cloned())
    }

    async fn quest_item_by_id(
        &self,
        id: i32,
        _language: Language,
    ) -> Result<Option<BasicItem>, SourceError> {
        Ok(self.items.get(&id).cloned())
    }

    async fn equipment_by_id(
        &self,
        id: i32,
        _language: Language,
    ) -> Result<Option<Equipment>, SourceError> {
        Ok(self.equipment.get(&id).cloned())
    }

    async fn cosmetic_by_id(
        &self,
        id: i32,
        _language: Language,
    ) -> Result<Option<Equipment>, SourceError> {
        Ok(self.cosmetics.get(&id).cloned())
    }

    async fn mount_by_id(
        &self,
        _id: i32,
        _language: Language,
    ) -> Result<Option<Mount>, SourceError> {
        Ok(None)
    }

    async fn set_by_id(
        &self,
        id: i32,
        _language: Language,
    ) -> Result<Option<EquipmentSet>, SourceError> {
        Ok(self.sets.get(&id).cloned())
    }

    async fn almanax_by_date(
        &self,
        date: &str,
        _language: Language,
    ) -> Result<Option<AlmanaxDay>, SourceError> {
        Ok(self.almanax.get(date).cloned())
    }

    async fn almanax_range(
        &self,
        size: i32,
        _language: Language,
    ) -> Result<Vec<AlmanaxDay>, SourceError> {
        let mut days: Vec<AlmanaxDay> = self.almanax.values().cloned().collect();
        days.sort_by(|a, b| a.date.cmp(&b.date));
        days.truncate(size as usize);
        Ok(days)
    }
}

fn equipment(id: i32, name: &str) -> Equipment {
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

struct Harness {
    broker: Arc<ChannelBroker>,
    answers: Receiver<Delivery>,
    worker: JoinHandle<Result<(), lorekeeper::application::error::AppError>>,
}

impl Harness {
    fn start(catalogue: ScriptedCatalogue, types: Vec<EquipmentTypeRecord>) -> Self {
        let broker = Arc::new(ChannelBroker::new(8));
        let answers = broker.consume("answers").expect("answers binding");

        let sources = Arc::new(SourceService::new(
            Arc::new(catalogue),
            Arc::new(InMemoryCache::new()),
            Duration::from_secs(5),
        ));
        let dispatcher = Arc::new(Dispatcher::new(
            sources,
            Arc::new(EquipmentTypeService::new(types, Vec::new())),
        ));
        let consumer = Arc::new(Consumer::new(
            broker.clone(),
            dispatcher,
            &BrokerSettings {
                requests_queue: "requests".to_owned(),
                answers_queue: "answers".to_owned(),
                capacity: std::num::NonZeroU32::new(8).unwrap(),
            },
        ));
        let worker = tokio::spawn(consumer.run());

        Self {
            broker,
            answers,
            worker,
        }
    }

    async fn request(&mut self, payload: &'static str) -> AnswerEnvelope {
        // The worker binds the requests queue after it is spawned.
        loop {
            match self
                .broker
                .publish("requests", Bytes::from_static(payload.as_bytes()))
                .await
            {
                Ok(()) => break,
                Err(_) => tokio::task::yield_now().await,
            }
        }
        let delivery = self.answers.recv().await.expect("answer delivery");
        serde_json::from_slice(&delivery.payload).expect("answer decodes")
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

#[tokio::test]
async fn an_equipment_query_answers_with_the_mapped_detail() {
    let mut harness = Harness::start(
        ScriptedCatalogue {
            search_hits: vec![ListEntry {
                ankama_id: 10,
                name: "Gelano".to_owned(),
                level: Some(60),
            }],
            equipment: HashMap::from([(10, equipment(10, "Gelano"))]),
            ..ScriptedCatalogue::default()
        },
        vec![EquipmentTypeRecord {
            source_type_id: 9,
            equipment_kind: EquipmentKind::Ring,
            item_kind: ItemKind::Equipment,
            area_effect_ids: Vec::new(),
        }],
    );

    let answer = harness
        .request(
            r#"{"type":"ITEM_BY_QUERY","kind":"EQUIPMENT","query":"gelano","language":"FR","correlation_id":"req-1"}"#,
        )
        .await;

    assert_eq!(answer.status, AnswerStatus::Success);
    assert_eq!(answer.language, Language::Fr);
    assert_eq!(answer.correlation_id, "req-1");
    assert_eq!(answer.source.name, "dofusdude");

    let AnswerBody::Item(item) = answer.body.expect("item body") else {
        panic!("expected an item answer");
    };
    let equipment = item.equipment.expect("equipment payload");
    assert_eq!(equipment.name, "Gelano");
    assert_eq!(equipment.kind.equipment_kind, EquipmentKind::Ring);
}

#[tokio::test]
async fn a_miss_is_a_successful_answer_with_an_empty_payload() {
    let mut harness = Harness::start(ScriptedCatalogue::default(), Vec::new());

    let answer = harness
        .request(
            r#"{"type":"ITEM_BY_QUERY","kind":"MOUNT","query":"nothing","correlation_id":"req-2"}"#,
        )
        .await;

    assert_eq!(answer.status, AnswerStatus::Success);
    let AnswerBody::Item(item) = answer.body.expect("item body") else {
        panic!("expected an item answer");
    };
    assert_eq!(item.query, "nothing");
    assert!(item.mount.is_none());
}

#[tokio::test]
async fn an_unroutable_kind_answers_with_an_error_status() {
    let mut harness = Harness::start(ScriptedCatalogue::default(), Vec::new());

    let answer = harness
        .request(r#"{"type":"ITEM_BY_ID","kind":"ANY_ITEM","id":7,"correlation_id":"req-3"}"#)
        .await;

    assert_eq!(answer.status, AnswerStatus::Error);
    assert_eq!(answer.correlation_id, "req-3");
    assert!(answer.body.is_none());
}

#[tokio::test]
async fn a_set_answer_omits_members_the_source_cannot_resolve() {
    let set = EquipmentSet {
        ankama_id: 1,
        name: "Adventurer Set".to_owned(),
        level: 30,
        equipment_ids: vec![10, 11, 12],
        effects: Vec::new(),
        contains_cosmetics_only: false,
    };
    let mut harness = Harness::start(
        ScriptedCatalogue {
            sets: HashMap::from([(1, set)]),
            equipment: HashMap::from([
                (10, equipment(10, "Adventurer Belt")),
                (12, equipment(12, "Adventurer Boots")),
            ]),
            ..ScriptedCatalogue::default()
        },
        Vec::new(),
    );

    let answer = harness
        .request(r#"{"type":"ITEM_BY_ID","kind":"SET","id":1,"correlation_id":"req-4"}"#)
        .await;

    assert_eq!(answer.status, AnswerStatus::Success);
    let AnswerBody::Item(item) = answer.body.expect("item body") else {
        panic!("expected an item answer");
    };
    let set = item.set.expect("set payload");
    let names: Vec<&str> = set.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["Adventurer Belt", "Adventurer Boots"]);
}

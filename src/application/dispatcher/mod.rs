//! Type-directed request dispatcher.
//!
//! Three routing tables (list kinds, item kinds by-id and by-query, and
//! ingredient kinds) are built once at construction and never mutated.
//! A kind without a table entry is an `UnknownQueryKind` protocol violation;
//! the source aggregator is never invoked for it.

mod almanax;
mod cosmetics;
mod equipments;
mod ingredients;
mod items;
mod mounts;
mod sets;

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::application::equipments::EquipmentTypeService;
use crate::application::error::AppError;
use crate::application::mappers::Ingredient;
use crate::application::sources::SourceService;
use crate::domain::protocol::{AnswerBody, ItemAnswer, ListAnswer, RequestBody, RequestEnvelope};
use crate::domain::types::{ItemKind, Language, ListKind};

type ListFn = for<'a> fn(
    &'a Dispatcher,
    &'a str,
    &'a str,
    Language,
) -> BoxFuture<'a, Result<ListAnswer, AppError>>;

type ItemByIdFn =
    for<'a> fn(&'a Dispatcher, i64, &'a str, Language) -> BoxFuture<'a, Result<ItemAnswer, AppError>>;

type ItemByQueryFn = for<'a> fn(
    &'a Dispatcher,
    &'a str,
    &'a str,
    Language,
) -> BoxFuture<'a, Result<ItemAnswer, AppError>>;

type IngredientFn =
    for<'a> fn(&'a Dispatcher, i64, Language) -> BoxFuture<'a, Result<Option<Ingredient>, AppError>>;

struct ItemFns {
    by_id: ItemByIdFn,
    by_query: ItemByQueryFn,
}

pub struct Dispatcher {
    sources: Arc<SourceService>,
    types: Arc<EquipmentTypeService>,
    list_handlers: HashMap<ListKind, ListFn>,
    item_handlers: HashMap<ItemKind, ItemFns>,
    ingredient_handlers: HashMap<ItemKind, IngredientFn>,
}

impl Dispatcher {
    pub fn new(sources: Arc<SourceService>, types: Arc<EquipmentTypeService>) -> Self {
        let list_handlers: HashMap<ListKind, ListFn> = HashMap::from([
            (ListKind::Item, items::list_any_items as ListFn),
            (ListKind::Equipment, equipments::list_equipment as ListFn),
            (ListKind::Cosmetic, cosmetics::list_cosmetics as ListFn),
            (ListKind::Mount, mounts::list_mounts as ListFn),
            (ListKind::Set, sets::list_sets as ListFn),
            (ListKind::AlmanaxEffect, almanax::list_effects as ListFn),
        ]);

        let item_handlers: HashMap<ItemKind, ItemFns> = HashMap::from([
            (
                ItemKind::Consumable,
                ItemFns {
                    by_id: items::consumable_by_id,
                    by_query: items::consumable_by_query,
                },
            ),
            (
                ItemKind::Equipment,
                ItemFns {
                    by_id: equipments::equipment_by_id,
                    by_query: equipments::equipment_by_query,
                },
            ),
            (
                ItemKind::Cosmetic,
                ItemFns {
                    by_id: cosmetics::cosmetic_by_id,
                    by_query: cosmetics::cosmetic_by_query,
                },
            ),
            (
                ItemKind::Mount,
                ItemFns {
                    by_id: mounts::mount_by_id,
                    by_query: mounts::mount_by_query,
                },
            ),
            (
                ItemKind::Set,
                ItemFns {
                    by_id: sets::set_by_id,
                    by_query: sets::set_by_query,
                },
            ),
            (
                ItemKind::QuestItem,
                ItemFns {
                    by_id: items::quest_item_by_id,
                    by_query: items::quest_item_by_query,
                },
            ),
            (
                ItemKind::Resource,
                ItemFns {
                    by_id: items::resource_by_id,
                    by_query: items::resource_by_query,
                },
            ),
        ]);

        let ingredient_handlers: HashMap<ItemKind, IngredientFn> = HashMap::from([
            (ItemKind::Consumable, items::consumable_ingredient as IngredientFn),
            (ItemKind::Equipment, equipments::equipment_ingredient as IngredientFn),
            (ItemKind::QuestItem, items::quest_item_ingredient as IngredientFn),
            (ItemKind::Resource, items::resource_ingredient as IngredientFn),
        ]);

        Self {
            sources,
            types,
            list_handlers,
            item_handlers,
            ingredient_handlers,
        }
    }

    /// Resolve one inbound request to its answer payload.
    ///
    /// Errors abort only this request; the consumer turns them into a
    /// failure answer.
    pub async fn resolve(&self, envelope: &RequestEnvelope) -> Result<AnswerBody, AppError> {
        let language = envelope.language;
        let correlation_id = envelope.correlation_id.as_str();

        match &envelope.body {
            RequestBody::List { kind, query } => {
                require_query(query)?;
                let handler = self
                    .list_handlers
                    .get(kind)
                    .ok_or(AppError::unknown_kind(kind.as_str()))?;
                let answer = handler(self, query, correlation_id, language).await?;
                Ok(AnswerBody::List(answer))
            }
            RequestBody::ItemById { kind, id } => {
                let handler = self
                    .item_handlers
                    .get(kind)
                    .ok_or(AppError::unknown_kind(kind.as_str()))?;
                let answer = (handler.by_id)(self, *id, correlation_id, language).await?;
                Ok(AnswerBody::Item(answer))
            }
            RequestBody::ItemByQuery { kind, query } => {
                require_query(query)?;
                let handler = self
                    .item_handlers
                    .get(kind)
                    .ok_or(AppError::unknown_kind(kind.as_str()))?;
                let answer = (handler.by_query)(self, query, correlation_id, language).await?;
                Ok(AnswerBody::Item(answer))
            }
            RequestBody::AlmanaxDate { date } => self.almanax_date(date, language).await,
            RequestBody::AlmanaxResource { duration } => {
                self.almanax_resource(*duration, language).await
            }
            RequestBody::AlmanaxEffect { query, offset, size } => {
                require_query(query)?;
                self.almanax_effect(query, *offset, *size, language).await
            }
        }
    }
}

fn require_query(query: &str) -> Result<(), AppError> {
    if query.trim().is_empty() {
        return Err(AppError::validation("query must not be empty"));
    }
    Ok(())
}

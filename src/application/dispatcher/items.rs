//! Handlers for plain items: consumables, resources and quest items, plus
//! the cross-category omnisearch list.

use std::collections::HashMap;

use futures::future::BoxFuture;
use tracing::debug;

use crate::application::error::AppError;
use crate::application::mappers::{self, Ingredient};
use crate::domain::catalogue::BasicItem;
use crate::domain::protocol::{ItemAnswer, ListAnswer};
use crate::domain::types::{ItemKind, Language};

use super::Dispatcher;
use super::ingredients::resolve_ingredients;

pub(super) fn list_any_items<'a>(
    dispatcher: &'a Dispatcher,
    query: &'a str,
    correlation_id: &'a str,
    language: Language,
) -> BoxFuture<'a, Result<ListAnswer, AppError>> {
    Box::pin(async move {
        let hits = dispatcher.sources.search_any_items(query, language).await?;
        debug!(correlation_id, hits = hits.len(), "item omnisearch resolved");
        Ok(mappers::map_search_hits(&hits))
    })
}

pub(super) fn consumable_by_id<'a>(
    dispatcher: &'a Dispatcher,
    id: i64,
    correlation_id: &'a str,
    language: Language,
) -> BoxFuture<'a, Result<ItemAnswer, AppError>> {
    Box::pin(async move {
        let item = dispatcher.sources.consumable_by_id(id, language).await?;
        let ingredients =
            recipe_ingredients(dispatcher, item.as_ref(), correlation_id, language).await;
        Ok(mappers::map_basic_item(
            ItemKind::Consumable,
            &id.to_string(),
            item.as_ref(),
            &ingredients,
        ))
    })
}

pub(super) fn consumable_by_query<'a>(
    dispatcher: &'a Dispatcher,
    query: &'a str,
    correlation_id: &'a str,
    language: Language,
) -> BoxFuture<'a, Result<ItemAnswer, AppError>> {
    Box::pin(async move {
        let item = match dispatcher.sources.consumable_by_query(query, language).await {
            Ok(item) => item,
            Err(err) if err.is_not_found() => {
                return Ok(ItemAnswer::not_found(ItemKind::Consumable, query));
            }
            Err(err) => return Err(err),
        };
        let ingredients =
            recipe_ingredients(dispatcher, Some(&item), correlation_id, language).await;
        Ok(mappers::map_basic_item(
            ItemKind::Consumable,
            query,
            Some(&item),
            &ingredients,
        ))
    })
}

pub(super) fn resource_by_id<'a>(
    dispatcher: &'a Dispatcher,
    id: i64,
    correlation_id: &'a str,
    language: Language,
) -> BoxFuture<'a, Result<ItemAnswer, AppError>> {
    Box::pin(async move {
        let item = dispatcher.sources.resource_by_id(id, language).await?;
        let ingredients =
            recipe_ingredients(dispatcher, item.as_ref(), correlation_id, language).await;
        Ok(mappers::map_basic_item(
            ItemKind::Resource,
            &id.to_string(),
            item.as_ref(),
            &ingredients,
        ))
    })
}

pub(super) fn resource_by_query<'a>(
    dispatcher: &'a Dispatcher,
    query: &'a str,
    correlation_id: &'a str,
    language: Language,
) -> BoxFuture<'a, Result<ItemAnswer, AppError>> {
    Box::pin(async move {
        let item = match dispatcher.sources.resource_by_query(query, language).await {
            Ok(item) => item,
            Err(err) if err.is_not_found() => {
                return Ok(ItemAnswer::not_found(ItemKind::Resource, query));
            }
            Err(err) => return Err(err),
        };
        let ingredients =
            recipe_ingredients(dispatcher, Some(&item), correlation_id, language).await;
        Ok(mappers::map_basic_item(
            ItemKind::Resource,
            query,
            Some(&item),
            &ingredients,
        ))
    })
}

pub(super) fn quest_item_by_id<'a>(
    dispatcher: &'a Dispatcher,
    id: i64,
    correlation_id: &'a str,
    language: Language,
) -> BoxFuture<'a, Result<ItemAnswer, AppError>> {
    Box::pin(async move {
        let item = dispatcher.sources.quest_item_by_id(id, language).await?;
        let ingredients =
            recipe_ingredients(dispatcher, item.as_ref(), correlation_id, language).await;
        Ok(mappers::map_basic_item(
            ItemKind::QuestItem,
            &id.to_string(),
            item.as_ref(),
            &ingredients,
        ))
    })
}

pub(super) fn quest_item_by_query<'a>(
    dispatcher: &'a Dispatcher,
    query: &'a str,
    correlation_id: &'a str,
    language: Language,
) -> BoxFuture<'a, Result<ItemAnswer, AppError>> {
    Box::pin(async move {
        let item = match dispatcher.sources.quest_item_by_query(query, language).await {
            Ok(item) => item,
            Err(err) if err.is_not_found() => {
                return Ok(ItemAnswer::not_found(ItemKind::QuestItem, query));
            }
            Err(err) => return Err(err),
        };
        let ingredients =
            recipe_ingredients(dispatcher, Some(&item), correlation_id, language).await;
        Ok(mappers::map_basic_item(
            ItemKind::QuestItem,
            query,
            Some(&item),
            &ingredients,
        ))
    })
}

pub(super) fn consumable_ingredient<'a>(
    dispatcher: &'a Dispatcher,
    id: i64,
    language: Language,
) -> BoxFuture<'a, Result<Option<Ingredient>, AppError>> {
    Box::pin(async move {
        Ok(dispatcher
            .sources
            .consumable_by_id(id, language)
            .await?
            .map(|item| Ingredient {
                id,
                name: item.name,
                kind: ItemKind::Consumable,
            }))
    })
}

pub(super) fn resource_ingredient<'a>(
    dispatcher: &'a Dispatcher,
    id: i64,
    language: Language,
) -> BoxFuture<'a, Result<Option<Ingredient>, AppError>> {
    Box::pin(async move {
        Ok(dispatcher
            .sources
            .resource_by_id(id, language)
            .await?
            .map(|item| Ingredient {
                id,
                name: item.name,
                kind: ItemKind::Resource,
            }))
    })
}

pub(super) fn quest_item_ingredient<'a>(
    dispatcher: &'a Dispatcher,
    id: i64,
    language: Language,
) -> BoxFuture<'a, Result<Option<Ingredient>, AppError>> {
    Box::pin(async move {
        Ok(dispatcher
            .sources
            .quest_item_by_id(id, language)
            .await?
            .map(|item| Ingredient {
                id,
                name: item.name,
                kind: ItemKind::QuestItem,
            }))
    })
}

async fn recipe_ingredients(
    dispatcher: &Dispatcher,
    item: Option<&BasicItem>,
    correlation_id: &str,
    language: Language,
) -> HashMap<i64, Ingredient> {
    let recipe = item
        .and_then(|item| item.recipe.as_deref())
        .unwrap_or_default();
    resolve_ingredients(dispatcher, recipe, correlation_id, language).await
}

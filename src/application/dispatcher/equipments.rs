//! Equipment handlers, including the weapon characteristics block driven by
//! the equipment-type lookup tables.

use futures::future::BoxFuture;
use tracing::debug;

use crate::application::error::AppError;
use crate::application::mappers::{self, Ingredient};
use crate::domain::catalogue::Equipment;
use crate::domain::protocol::{ItemAnswer, ListAnswer};
use crate::domain::types::{ItemKind, Language};

use super::Dispatcher;
use super::ingredients::resolve_ingredients;

pub(super) fn list_equipment<'a>(
    dispatcher: &'a Dispatcher,
    query: &'a str,
    correlation_id: &'a str,
    language: Language,
) -> BoxFuture<'a, Result<ListAnswer, AppError>> {
    Box::pin(async move {
        let entries = dispatcher.sources.search_equipment(query, language).await?;
        debug!(correlation_id, hits = entries.len(), "equipment search resolved");
        Ok(mappers::map_entries(&entries))
    })
}

pub(super) fn equipment_by_id<'a>(
    dispatcher: &'a Dispatcher,
    id: i64,
    correlation_id: &'a str,
    language: Language,
) -> BoxFuture<'a, Result<ItemAnswer, AppError>> {
    Box::pin(async move {
        let item = dispatcher.sources.equipment_by_id(id, language).await?;
        map_with_recipe(dispatcher, &id.to_string(), item.as_ref(), correlation_id, language).await
    })
}

pub(super) fn equipment_by_query<'a>(
    dispatcher: &'a Dispatcher,
    query: &'a str,
    correlation_id: &'a str,
    language: Language,
) -> BoxFuture<'a, Result<ItemAnswer, AppError>> {
    Box::pin(async move {
        let item = match dispatcher.sources.equipment_by_query(query, language).await {
            Ok(item) => item,
            Err(err) if err.is_not_found() => {
                return Ok(ItemAnswer::not_found(ItemKind::Equipment, query));
            }
            Err(err) => return Err(err),
        };
        map_with_recipe(dispatcher, query, Some(&item), correlation_id, language).await
    })
}

pub(super) fn equipment_ingredient<'a>(
    dispatcher: &'a Dispatcher,
    id: i64,
    language: Language,
) -> BoxFuture<'a, Result<Option<Ingredient>, AppError>> {
    Box::pin(async move {
        Ok(dispatcher
            .sources
            .equipment_by_id(id, language)
            .await?
            .map(|item| Ingredient {
                id,
                name: item.name,
                kind: ItemKind::Equipment,
            }))
    })
}

/// Resolve the recipe fan-out, then map the full answer.
pub(super) async fn map_with_recipe(
    dispatcher: &Dispatcher,
    query: &str,
    item: Option<&Equipment>,
    correlation_id: &str,
    language: Language,
) -> Result<ItemAnswer, AppError> {
    let recipe = item
        .and_then(|item| item.recipe.as_deref())
        .unwrap_or_default();
    let ingredients = resolve_ingredients(dispatcher, recipe, correlation_id, language).await;
    Ok(mappers::map_equipment(
        query,
        item,
        &ingredients,
        &dispatcher.types,
    ))
}

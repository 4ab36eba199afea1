//! Cosmetic handlers.
//!
//! Cosmetics share the equipment record shape, so they reuse the equipment
//! mapping and only re-tag the answer kind.

use futures::future::BoxFuture;
use tracing::debug;

use crate::application::error::AppError;
use crate::application::mappers;
use crate::domain::protocol::{ItemAnswer, ListAnswer};
use crate::domain::types::{ItemKind, Language};

use super::Dispatcher;
use super::equipments::map_with_recipe;

pub(super) fn list_cosmetics<'a>(
    dispatcher: &'a Dispatcher,
    query: &'a str,
    correlation_id: &'a str,
    language: Language,
) -> BoxFuture<'a, Result<ListAnswer, AppError>> {
    Box::pin(async move {
        let entries = dispatcher.sources.search_cosmetics(query, language).await?;
        debug!(correlation_id, hits = entries.len(), "cosmetic search resolved");
        Ok(mappers::map_entries(&entries))
    })
}

pub(super) fn cosmetic_by_id<'a>(
    dispatcher: &'a Dispatcher,
    id: i64,
    correlation_id: &'a str,
    language: Language,
) -> BoxFuture<'a, Result<ItemAnswer, AppError>> {
    Box::pin(async move {
        let item = dispatcher.sources.cosmetic_by_id(id, language).await?;
        let mut answer =
            map_with_recipe(dispatcher, &id.to_string(), item.as_ref(), correlation_id, language)
                .await?;
        answer.kind = ItemKind::Cosmetic;
        Ok(answer)
    })
}

pub(super) fn cosmetic_by_query<'a>(
    dispatcher: &'a Dispatcher,
    query: &'a str,
    correlation_id: &'a str,
    language: Language,
) -> BoxFuture<'a, Result<ItemAnswer, AppError>> {
    Box::pin(async move {
        let item = match dispatcher.sources.cosmetic_by_query(query, language).await {
            Ok(item) => item,
            Err(err) if err.is_not_found() => {
                return Ok(ItemAnswer::not_found(ItemKind::Cosmetic, query));
            }
            Err(err) => return Err(err),
        };
        let mut answer =
            map_with_recipe(dispatcher, query, Some(&item), correlation_id, language).await?;
        answer.kind = ItemKind::Cosmetic;
        Ok(answer)
    })
}

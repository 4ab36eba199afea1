//! Mount handlers. Mounts carry no recipe, so there is no fan-out here.

use futures::future::BoxFuture;
use tracing::debug;

use crate::application::error::AppError;
use crate::application::mappers;
use crate::domain::protocol::{ItemAnswer, ListAnswer};
use crate::domain::types::{ItemKind, Language};

use super::Dispatcher;

pub(super) fn list_mounts<'a>(
    dispatcher: &'a Dispatcher,
    query: &'a str,
    correlation_id: &'a str,
    language: Language,
) -> BoxFuture<'a, Result<ListAnswer, AppError>> {
    Box::pin(async move {
        let entries = dispatcher.sources.search_mounts(query, language).await?;
        debug!(correlation_id, hits = entries.len(), "mount search resolved");
        Ok(mappers::map_entries(&entries))
    })
}

pub(super) fn mount_by_id<'a>(
    dispatcher: &'a Dispatcher,
    id: i64,
    _correlation_id: &'a str,
    language: Language,
) -> BoxFuture<'a, Result<ItemAnswer, AppError>> {
    Box::pin(async move {
        let mount = dispatcher.sources.mount_by_id(id, language).await?;
        Ok(mappers::map_mount(&id.to_string(), mount.as_ref()))
    })
}

pub(super) fn mount_by_query<'a>(
    dispatcher: &'a Dispatcher,
    query: &'a str,
    _correlation_id: &'a str,
    language: Language,
) -> BoxFuture<'a, Result<ItemAnswer, AppError>> {
    Box::pin(async move {
        match dispatcher.sources.mount_by_query(query, language).await {
            Ok(mount) => Ok(mappers::map_mount(query, Some(&mount))),
            Err(err) if err.is_not_found() => Ok(ItemAnswer::not_found(ItemKind::Mount, query)),
            Err(err) => Err(err),
        }
    })
}

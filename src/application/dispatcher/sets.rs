//! Set handlers and the set-member fan-out.
//!
//! A set record names its members only by identifier. Members are fetched
//! through the cosmetic or equipment path depending on the set flavour; a
//! member that fails to resolve is logged and omitted, the rest of the set
//! still answers.

use std::collections::HashMap;

use futures::future::{BoxFuture, join_all};
use tracing::{debug, warn};

use crate::application::error::AppError;
use crate::application::mappers;
use crate::domain::catalogue::{Equipment, EquipmentSet};
use crate::domain::protocol::{ItemAnswer, ListAnswer};
use crate::domain::types::{ItemKind, Language};

use super::Dispatcher;

pub(super) fn list_sets<'a>(
    dispatcher: &'a Dispatcher,
    query: &'a str,
    correlation_id: &'a str,
    language: Language,
) -> BoxFuture<'a, Result<ListAnswer, AppError>> {
    Box::pin(async move {
        let entries = dispatcher.sources.search_sets(query, language).await?;
        debug!(correlation_id, hits = entries.len(), "set search resolved");
        Ok(mappers::map_entries(&entries))
    })
}

pub(super) fn set_by_id<'a>(
    dispatcher: &'a Dispatcher,
    id: i64,
    correlation_id: &'a str,
    language: Language,
) -> BoxFuture<'a, Result<ItemAnswer, AppError>> {
    Box::pin(async move {
        let set = dispatcher.sources.set_by_id(id, language).await?;
        let members = match set.as_ref() {
            Some(set) => resolve_set_members(dispatcher, set, correlation_id, language).await,
            None => HashMap::new(),
        };
        Ok(mappers::map_set(&id.to_string(), set.as_ref(), &members))
    })
}

pub(super) fn set_by_query<'a>(
    dispatcher: &'a Dispatcher,
    query: &'a str,
    correlation_id: &'a str,
    language: Language,
) -> BoxFuture<'a, Result<ItemAnswer, AppError>> {
    Box::pin(async move {
        let set = match dispatcher.sources.set_by_query(query, language).await {
            Ok(set) => set,
            Err(err) if err.is_not_found() => {
                return Ok(ItemAnswer::not_found(ItemKind::Set, query));
            }
            Err(err) => return Err(err),
        };
        let members = resolve_set_members(dispatcher, &set, correlation_id, language).await;
        Ok(mappers::map_set(query, Some(&set), &members))
    })
}

async fn resolve_set_members(
    dispatcher: &Dispatcher,
    set: &EquipmentSet,
    correlation_id: &str,
    language: Language,
) -> HashMap<i32, Equipment> {
    let lookups = set.equipment_ids.iter().map(|&member_id| async move {
        let id = i64::from(member_id);
        let outcome = if set.contains_cosmetics_only {
            dispatcher.sources.cosmetic_by_id(id, language).await
        } else {
            dispatcher.sources.equipment_by_id(id, language).await
        };
        (member_id, outcome)
    });

    let mut members = HashMap::with_capacity(set.equipment_ids.len());
    for (member_id, outcome) in join_all(lookups).await {
        match outcome {
            Ok(Some(member)) => {
                members.insert(member_id, member);
            }
            Ok(None) => {
                warn!(
                    correlation_id,
                    set_id = set.ankama_id,
                    member_id,
                    "set member not found at the source, omitting it"
                );
            }
            Err(err) => {
                warn!(
                    correlation_id,
                    set_id = set.ankama_id,
                    member_id,
                    error = %err,
                    "set member lookup failed, omitting it"
                );
            }
        }
    }
    members
}

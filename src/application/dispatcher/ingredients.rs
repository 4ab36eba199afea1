//! Recipe-ingredient fan-out.
//!
//! A recipe names ingredients only by identifier and subtype; each distinct
//! identifier is resolved through the ingredient routing table. Failures and
//! misses degrade to placeholder lines, never to a failed answer.

use std::collections::HashMap;

use futures::future::join_all;
use tracing::warn;

use crate::application::mappers::Ingredient;
use crate::application::sources::item_kind_for_subtype;
use crate::domain::catalogue::RecipeEntry;
use crate::domain::types::Language;

use super::Dispatcher;

pub(super) async fn resolve_ingredients(
    dispatcher: &Dispatcher,
    recipe: &[RecipeEntry],
    correlation_id: &str,
    language: Language,
) -> HashMap<i64, Ingredient> {
    let mut pending = Vec::new();
    for entry in recipe {
        let id = i64::from(entry.item_ankama_id);
        if pending.iter().any(|(seen, _, _)| *seen == id) {
            continue;
        }
        let kind = item_kind_for_subtype(&entry.item_subtype);
        let Some(handler) = dispatcher.ingredient_handlers.get(&kind) else {
            warn!(
                correlation_id,
                ingredient_id = id,
                kind = kind.as_str(),
                "no ingredient handler for this kind, leaving a placeholder"
            );
            continue;
        };
        pending.push((id, kind, handler(dispatcher, id, language)));
    }

    let mut resolved = HashMap::with_capacity(pending.len());
    let (meta, futures): (Vec<_>, Vec<_>) = pending
        .into_iter()
        .map(|(id, kind, fut)| ((id, kind), fut))
        .unzip();
    for ((id, kind), outcome) in meta.into_iter().zip(join_all(futures).await) {
        match outcome {
            Ok(Some(ingredient)) => {
                resolved.insert(id, ingredient);
            }
            Ok(None) => {
                warn!(
                    correlation_id,
                    ingredient_id = id,
                    kind = kind.as_str(),
                    "ingredient not found at the source, leaving a placeholder"
                );
            }
            Err(err) => {
                warn!(
                    correlation_id,
                    ingredient_id = id,
                    kind = kind.as_str(),
                    error = %err,
                    "ingredient lookup failed, leaving a placeholder"
                );
            }
        }
    }
    resolved
}

//! Almanax handlers: single-day lookup, tribute aggregation over a range and
//! the paginated bonus-effect search.

use futures::future::BoxFuture;
use tracing::debug;

use crate::application::error::AppError;
use crate::application::mappers;
use crate::application::sources::parse_almanax_date;
use crate::domain::catalogue::AlmanaxDay;
use crate::domain::protocol::{AnswerBody, ListAnswer};
use crate::domain::types::Language;

use super::Dispatcher;

/// Longest range the source serves in one call, in days.
pub(super) const ALMANAX_RANGE_LIMIT: i64 = 35;

pub(super) fn list_effects<'a>(
    dispatcher: &'a Dispatcher,
    query: &'a str,
    correlation_id: &'a str,
    language: Language,
) -> BoxFuture<'a, Result<ListAnswer, AppError>> {
    Box::pin(async move {
        let effects = dispatcher
            .sources
            .search_almanax_effects(query, language)
            .await?;
        debug!(correlation_id, hits = effects.len(), "almanax effect search resolved");
        Ok(mappers::map_almanax_effect_list(&effects))
    })
}

impl Dispatcher {
    pub(super) async fn almanax_date(
        &self,
        date: &str,
        language: Language,
    ) -> Result<AnswerBody, AppError> {
        let date = parse_almanax_date(date)?;
        let day = self.sources.almanax_by_date(date, language).await?;
        Ok(AnswerBody::Almanax {
            day: day.as_ref().map(mappers::map_almanax),
        })
    }

    pub(super) async fn almanax_resource(
        &self,
        duration: i64,
        language: Language,
    ) -> Result<AnswerBody, AppError> {
        if !(1..=ALMANAX_RANGE_LIMIT).contains(&duration) {
            return Err(AppError::validation(format!(
                "duration must be between 1 and {ALMANAX_RANGE_LIMIT} days"
            )));
        }
        let days = self.sources.almanax_by_range(duration, language).await?;
        Ok(AnswerBody::AlmanaxResource(mappers::map_almanax_resources(
            &days, duration,
        )))
    }

    pub(super) async fn almanax_effect(
        &self,
        query: &str,
        offset: i64,
        size: i64,
        language: Language,
    ) -> Result<AnswerBody, AppError> {
        if offset < 0 {
            return Err(AppError::validation("offset must not be negative"));
        }
        if size < 1 {
            return Err(AppError::validation("size must be at least 1"));
        }

        let effects = self.sources.search_almanax_effects(query, language).await?;
        let Some(effect) = effects.first() else {
            return Ok(AnswerBody::AlmanaxEffect(mappers::map_almanax_effect_answer(
                query, None, &[], 0, offset, size,
            )));
        };

        let days = self
            .sources
            .almanax_by_range(ALMANAX_RANGE_LIMIT, language)
            .await?;
        let matching: Vec<AlmanaxDay> = days
            .into_iter()
            .filter(|day| {
                day.bonus
                    .kind
                    .as_ref()
                    .is_some_and(|kind| kind.id == effect.id)
            })
            .collect();
        let total = matching.len() as i64;
        let start = (offset.min(total)) as usize;
        let end = (offset.saturating_add(size).min(total)) as usize;

        Ok(AnswerBody::AlmanaxEffect(mappers::map_almanax_effect_answer(
            query,
            Some(effect.name.clone()),
            &matching[start..end],
            total,
            offset,
            size,
        )))
    }
}

//! Bus consumer: pulls request envelopes off the requests queue, dispatches
//! them and publishes one answer per request.
//!
//! Every delivery is handled in its own task; a failed request produces a
//! failure answer scoped to that request and never stops the loop.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use tracing::{error, info, warn};

use crate::application::dispatcher::Dispatcher;
use crate::application::error::AppError;
use crate::config::BrokerSettings;
use crate::domain::protocol::{AnswerEnvelope, RequestEnvelope};
use crate::infra::broker::{Delivery, MessageBroker};

pub struct Consumer {
    broker: Arc<dyn MessageBroker>,
    dispatcher: Arc<Dispatcher>,
    requests_queue: String,
    answers_queue: String,
}

impl Consumer {
    pub fn new(
        broker: Arc<dyn MessageBroker>,
        dispatcher: Arc<Dispatcher>,
        settings: &BrokerSettings,
    ) -> Self {
        Self {
            broker,
            dispatcher,
            requests_queue: settings.requests_queue.clone(),
            answers_queue: settings.answers_queue.clone(),
        }
    }

    /// Consume until the requests queue closes.
    pub async fn run(self: Arc<Self>) -> Result<(), AppError> {
        let mut deliveries = self.broker.consume(&self.requests_queue).map_err(|err| {
            AppError::unexpected(format!("failed to bind the requests queue: {err}"))
        })?;

        info!(queue = %self.requests_queue, "consuming bus requests");
        while let Some(delivery) = deliveries.recv().await {
            let consumer = Arc::clone(&self);
            tokio::spawn(async move {
                consumer.handle(delivery).await;
            });
        }

        info!(queue = %self.requests_queue, "requests queue closed, stopping");
        Ok(())
    }

    async fn handle(&self, delivery: Delivery) {
        let started = Instant::now();

        let envelope: RequestEnvelope = match serde_json::from_slice(&delivery.payload) {
            Ok(envelope) => envelope,
            Err(err) => {
                metrics::counter!("lorekeeper_request_total", "outcome" => "invalid").increment(1);
                error!(tag = %delivery.tag, error = %err, "discarding undecodable request");
                return;
            }
        };

        let answer = match self.dispatcher.resolve(&envelope).await {
            Ok(body) => {
                metrics::counter!("lorekeeper_request_total", "outcome" => "success").increment(1);
                AnswerEnvelope::success(envelope.language, envelope.correlation_id.as_str(), body)
            }
            Err(err) => {
                metrics::counter!("lorekeeper_request_total", "outcome" => "error").increment(1);
                error!(
                    tag = %delivery.tag,
                    correlation_id = %envelope.correlation_id,
                    error = %err,
                    "request failed, answering with an error status"
                );
                AnswerEnvelope::failure(envelope.language, envelope.correlation_id.as_str())
            }
        };
        metrics::histogram!("lorekeeper_request_ms")
            .record(started.elapsed().as_millis() as f64);

        let payload = match serde_json::to_vec(&answer) {
            Ok(payload) => payload,
            Err(err) => {
                error!(
                    correlation_id = %answer.correlation_id,
                    error = %err,
                    "failed to encode the answer, dropping it"
                );
                return;
            }
        };

        if let Err(err) = self
            .broker
            .publish(&self.answers_queue, Bytes::from(payload))
            .await
        {
            warn!(
                queue = %self.answers_queue,
                correlation_id = %answer.correlation_id,
                error = %err,
                "failed to publish the answer"
            );
        }
    }
}

//! Message-bus boundary.
//!
//! The worker only ever consumes one queue and publishes to another, so the
//! port is kept that narrow. `ChannelBroker` is the in-process adapter used
//! by the binary and the tests; it applies backpressure through bounded
//! channels instead of dropping deliveries.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("queue `{queue}` has no consumer")]
    NotBound { queue: String },
    #[error("queue `{queue}` is closed")]
    Closed { queue: String },
    #[error("queue `{queue}` is already consumed")]
    AlreadyConsumed { queue: String },
}

/// One message taken off a queue.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Broker-assigned tag, used for tracing only.
    pub tag: String,
    pub payload: Bytes,
}

#[async_trait]
pub trait MessageBroker: Send + Sync {
    /// Publish a payload to a queue, waiting when the queue is full.
    async fn publish(&self, queue: &str, payload: Bytes) -> Result<(), BrokerError>;

    /// Bind a queue to a single consumer and return its delivery stream.
    fn consume(&self, queue: &str) -> Result<mpsc::Receiver<Delivery>, BrokerError>;
}

/// In-process broker over bounded channels, one binding per queue.
pub struct ChannelBroker {
    capacity: usize,
    queues: DashMap<String, mpsc::Sender<Delivery>>,
}

impl ChannelBroker {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            queues: DashMap::new(),
        }
    }
}

#[async_trait]
impl MessageBroker for ChannelBroker {
    async fn publish(&self, queue: &str, payload: Bytes) -> Result<(), BrokerError> {
        let sender = self
            .queues
            .get(queue)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BrokerError::NotBound {
                queue: queue.to_owned(),
            })?;

        let delivery = Delivery {
            tag: Uuid::new_v4().to_string(),
            payload,
        };
        sender.send(delivery).await.map_err(|_| BrokerError::Closed {
            queue: queue.to_owned(),
        })
    }

    fn consume(&self, queue: &str) -> Result<mpsc::Receiver<Delivery>, BrokerError> {
        if let Some(existing) = self.queues.get(queue) {
            if !existing.value().is_closed() {
                return Err(BrokerError::AlreadyConsumed {
                    queue: queue.to_owned(),
                });
            }
        }

        let (sender, receiver) = mpsc::channel(self.capacity);
        self.queues.insert(queue.to_owned(), sender);
        Ok(receiver)
    }
}

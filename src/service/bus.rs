// src/service/bus.rs

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const TOPIC_CAPACITY: usize = 64;

/// A message as delivered to subscribers: payload bytes travel base64-encoded
/// in `data`, the way push subscriptions deliver them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    pub data: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    #[serde(default)]
    pub message_id: String,
    #[serde(default = "Utc::now")]
    pub publish_time: DateTime<Utc>,
}

impl PushMessage {
    pub fn from_bytes(payload: &[u8]) -> Self {
        Self {
            data: STANDARD.encode(payload),
            attributes: HashMap::new(),
            message_id: String::new(),
            publish_time: Utc::now(),
        }
    }

    pub fn decode_data(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.data.trim())
    }
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("unknown topic: {0}")]
    UnknownTopic(String),
    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Publishes payloads to a named topic and returns the assigned message id.
#[async_trait]
pub trait ReportPublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<String, PublishError>;
}

/// Serializes `value` as JSON and publishes it.
pub async fn publish_json<T: Serialize + Sync>(
    publisher: &dyn ReportPublisher,
    topic: &str,
    value: &T,
) -> Result<String, PublishError> {
    let payload = serde_json::to_vec(value)?;
    publisher.publish(topic, payload).await
}

/// In-process topic bus. Topics are fixed at construction; every subscriber
/// receives every message published after it subscribed.
#[derive(Debug)]
pub struct MessageBus {
    topics: HashMap<String, broadcast::Sender<PushMessage>>,
    next_id: AtomicU64,
}

impl MessageBus {
    pub fn new<S: AsRef<str>>(topics: &[S]) -> Self {
        let topics = topics
            .iter()
            .map(|name| (name.as_ref().to_string(), broadcast::channel(TOPIC_CAPACITY).0))
            .collect();
        Self { topics, next_id: AtomicU64::new(1) }
    }

    pub fn subscribe(&self, topic: &str) -> Result<broadcast::Receiver<PushMessage>, PublishError> {
        self.topics
            .get(topic)
            .map(broadcast::Sender::subscribe)
            .ok_or_else(|| PublishError::UnknownTopic(topic.to_string()))
    }
}

/// Drains `rx` and logs one line per message until the topic closes.
pub fn spawn_topic_logger(topic: String, mut rx: broadcast::Receiver<PushMessage>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(message) => info!(
                    topic = %topic,
                    message_id = %message.message_id,
                    bytes = message.data.len(),
                    "Message received."
                ),
                Err(RecvError::Lagged(skipped)) => warn!(topic = %topic, skipped, "Topic logger fell behind."),
                Err(RecvError::Closed) => break,
            }
        }
        debug!(topic = %topic, "Topic logger stopped.");
    })
}

#[async_trait]
impl ReportPublisher for MessageBus {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<String, PublishError> {
        let sender = self
            .topics
            .get(topic)
            .ok_or_else(|| PublishError::UnknownTopic(topic.to_string()))?;

        let message_id = self.next_id.fetch_add(1, Ordering::Relaxed).to_string();
        let mut message = PushMessage::from_bytes(&payload);
        message.message_id = message_id.clone();

        // A topic without subscribers accepts and drops the message.
        match sender.send(message) {
            Ok(receivers) => debug!(topic, message_id = %message_id, receivers, "Message published."),
            Err(_) => debug!(topic, message_id = %message_id, "Message published with no subscribers."),
        }
        info!(topic, message_id = %message_id, bytes = payload.len(), "Published message.");
        Ok(message_id)
    }
}

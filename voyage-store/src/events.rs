use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, error};
use voyage_shared::models::events::{ReservationCancelledEvent, ReservationCreatedEvent};

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Kafka delivery failed: {0}")]
    Kafka(#[from] KafkaError),
}

#[derive(Clone)]
pub struct EventProducer {
    producer: FutureProducer,
}

impl EventProducer {
    pub fn new(brokers: &str) -> Result<Self, KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(Self { producer })
    }

    pub async fn publish(&self, topic: &str, key: &str, payload: &str) -> Result<(), KafkaError> {
        let record = FutureRecord::to(topic)
            .key(key)
            .payload(payload);

        match self.producer.send(record, Timeout::After(Duration::from_secs(0))).await {
            Ok(delivery) => {
                info!("Sent message to {}/{}: partition {} offset {}", topic, key, delivery.partition, delivery.offset);
                Ok(())
            }
            Err((e, _msg)) => {
                error!("Failed to send message to {}: {}", topic, e);
                Err(e)
            }
        }
    }

    /// Events are keyed by trip id so one trip's seat changes stay ordered
    /// within a partition.
    async fn publish_json<T: Serialize>(&self, topic: &str, key: &str, event: &T) -> Result<(), PublishError> {
        let payload = serde_json::to_string(event)?;
        self.publish(topic, key, &payload).await?;
        Ok(())
    }

    pub async fn reservation_created(&self, event: &ReservationCreatedEvent) -> Result<(), PublishError> {
        self.publish_json(ReservationCreatedEvent::TOPIC, &event.trip_id.to_string(), event).await
    }

    pub async fn reservation_cancelled(&self, event: &ReservationCancelledEvent) -> Result<(), PublishError> {
        self.publish_json(ReservationCancelledEvent::TOPIC, &event.trip_id.to_string(), event).await
    }
}

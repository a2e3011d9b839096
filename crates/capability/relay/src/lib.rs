//! 订阅回调到 publish 的编排：不含任何转换规则，只负责接线。

use async_trait::async_trait;
use domain::{Envelope, device_topic};
use fwd_telemetry::{
    record_message_forwarded, record_message_received, record_message_skipped,
    record_publish_failure,
};
use fwd_transform::{Outcome, SkipReason, decide};
use rumqttc::{AsyncClient, QoS};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info, warn};

/// 转发链路错误。
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("publish error: {0}")]
    Publish(String),
    #[error("serialize error: {0}")]
    Serialize(String),
}

/// Envelope 发布抽象。
#[async_trait]
pub trait EnvelopePublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: String) -> Result<(), RelayError>;
}

/// 空发布器（用于接线与测试）。
#[derive(Debug, Default)]
pub struct NoopPublisher;

#[async_trait]
impl EnvelopePublisher for NoopPublisher {
    async fn publish(&self, _topic: &str, _payload: String) -> Result<(), RelayError> {
        Ok(())
    }
}

/// MQTT 发布器实现（QoS 0，即发即弃）。
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
}

impl MqttPublisher {
    pub fn new(client: AsyncClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EnvelopePublisher for MqttPublisher {
    async fn publish(&self, topic: &str, payload: String) -> Result<(), RelayError> {
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .await
            .map_err(|err| RelayError::Publish(err.to_string()))
    }
}

/// 消息转发编排器。
///
/// 持有显式的连接状态标志（由连接生命周期回调翻转，发布前读取）；
/// 未连接时的消息直接丢弃并记日志，不排队不重试。
pub struct Relay {
    publisher: Arc<dyn EnvelopePublisher>,
    forward_topic: String,
    devices: Vec<String>,
    connected: AtomicBool,
}

impl Relay {
    pub fn new(
        publisher: Arc<dyn EnvelopePublisher>,
        forward_topic: impl Into<String>,
        devices: Vec<String>,
    ) -> Self {
        Self {
            publisher,
            forward_topic: forward_topic.into(),
            devices,
            connected: AtomicBool::new(false),
        }
    }

    /// 每个配置设备一个订阅 topic：`status/AMT<device_id>`。
    pub fn subscription_topics(&self) -> Vec<String> {
        self.devices
            .iter()
            .map(|device_id| device_topic(device_id))
            .collect()
    }

    pub fn on_connected(&self) {
        self.connected.store(true, Ordering::SeqCst);
    }

    pub fn on_disconnected(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// 处理一条入站消息：判定、构造 Envelope、发布。
    ///
    /// 单条消息的任何失败只记日志，不中断后续消息处理。
    pub async fn on_message(&self, topic: &str, payload: &[u8]) {
        record_message_received();
        match decide(topic, payload, now_epoch_ms()) {
            Outcome::Skip(SkipReason::UnmatchedTopic) => {
                record_message_skipped();
                warn!(target: "fwd.relay", topic = %topic, "message outside subscribed pattern");
            }
            Outcome::Skip(reason) => {
                record_message_skipped();
                info!(target: "fwd.relay", topic = %topic, reason = %reason, "message skipped");
            }
            Outcome::Forward(envelope) => self.forward(envelope).await,
        }
    }

    async fn forward(&self, envelope: Envelope) {
        if !self.is_connected() {
            record_publish_failure();
            error!(
                target: "fwd.relay",
                sn = %envelope.sn,
                topic = %self.forward_topic,
                "message dropped: mqtt client not connected"
            );
            return;
        }

        let payload = match encode(&envelope) {
            Ok(payload) => payload,
            Err(err) => {
                record_publish_failure();
                error!(target: "fwd.relay", sn = %envelope.sn, "{}", err);
                return;
            }
        };

        match self.publisher.publish(&self.forward_topic, payload).await {
            Ok(()) => {
                record_message_forwarded();
                info!(
                    target: "fwd.relay",
                    sn = %envelope.sn,
                    topic = %self.forward_topic,
                    "message forwarded"
                );
            }
            Err(err) => {
                record_publish_failure();
                error!(
                    target: "fwd.relay",
                    sn = %envelope.sn,
                    topic = %self.forward_topic,
                    "message forward failed: {}",
                    err
                );
            }
        }
    }
}

fn encode(envelope: &Envelope) -> Result<String, RelayError> {
    serde_json::to_string(envelope).map_err(|err| RelayError::Serialize(err.to_string()))
}

fn now_epoch_ms() -> i64 {
    let now = SystemTime::now();
    let duration = now.duration_since(UNIX_EPOCH).unwrap_or_default();
    duration.as_millis() as i64
}

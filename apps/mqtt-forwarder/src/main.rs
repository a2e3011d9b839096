//! AMT 设备状态消息转发服务入口。
//!
//! 读取工作目录下的 config.json，订阅各设备的 `status/AMT<id>` topic，
//! 将消息按统一 Envelope 结构转发到配置的目标 topic，直到收到退出信号。

use fwd_config::ForwarderConfig;
use fwd_relay::{MqttPublisher, Relay};
use fwd_telemetry::init_tracing_with_file;
use rumqttc::{AsyncClient, ConnectReturnCode, Event, MqttOptions, Packet, QoS};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

const CONFIG_FILE: &str = "config.json";
const LOG_FILE: &str = "mqtt_forwarder.log";

#[tokio::main]
async fn main() {
    // 日志同时写 stdout 与本地日志文件
    init_tracing_with_file(LOG_FILE);
    info!(target: "fwd.app", "starting mqtt forwarder");

    // 配置缺失或格式错误为致命错误，进程以非零码退出
    let config = match ForwarderConfig::load(CONFIG_FILE) {
        Ok(config) => config,
        Err(err) => {
            error!(target: "fwd.app", "failed to load {}: {}", CONFIG_FILE, err);
            std::process::exit(1);
        }
    };
    info!(
        target: "fwd.app",
        devices = config.devices.len(),
        "config {} loaded",
        CONFIG_FILE
    );

    // 设备 ID 仅在此处校验告警，消息路径不拒收
    for device_id in config.invalid_device_ids() {
        warn!(
            target: "fwd.app",
            device_id = %device_id,
            "device id is not a 14-digit numeric code"
        );
    }

    // 监听与转发共用同一个连接到监听 broker 的客户端
    if config.listen_endpoint() == config.forward_endpoint() {
        info!(target: "fwd.app", "listen and forward share one broker, using a single client");
    } else {
        info!(
            target: "fwd.app",
            forward_endpoint = %config.forward_endpoint(),
            "listen and forward brokers differ, single client stays on the listen broker"
        );
    }

    let client_id = format!("mqtt-forwarder-{}", uuid::Uuid::new_v4());
    let mut options = MqttOptions::new(client_id, config.mqtt.broker.clone(), config.mqtt.port);
    options.set_keep_alive(Duration::from_secs(config.mqtt.keepalive));
    options.set_credentials(config.mqtt.username.clone(), config.mqtt.password.clone());

    let (client, mut eventloop) = AsyncClient::new(options, 10);
    let relay = Relay::new(
        Arc::new(MqttPublisher::new(client.clone())),
        config.forward.topic.clone(),
        config.devices.clone(),
    );

    info!(
        target: "fwd.app",
        endpoint = %config.listen_endpoint(),
        "connecting to mqtt broker"
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!(target: "fwd.app", "shutdown signal received, stopping");
                break;
            }
            event = eventloop.poll() => match event {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    if ack.code == ConnectReturnCode::Success {
                        relay.on_connected();
                        info!(target: "fwd.app", "connected to mqtt broker");
                        for topic in relay.subscription_topics() {
                            match client.subscribe(&topic, QoS::AtMostOnce).await {
                                Ok(()) => info!(target: "fwd.app", topic = %topic, "subscribed"),
                                Err(err) => error!(
                                    target: "fwd.app",
                                    topic = %topic,
                                    "subscribe failed: {}",
                                    err
                                ),
                            }
                        }
                    } else {
                        relay.on_disconnected();
                        error!(target: "fwd.app", "broker rejected connection: {:?}", ack.code);
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    relay.on_message(&publish.topic, &publish.payload).await;
                }
                Ok(_) => {}
                Err(err) => {
                    // 连接中断：置为未连接，稍候重试（下一次 poll 自动重连）
                    relay.on_disconnected();
                    warn!(target: "fwd.app", "mqtt eventloop error: {}", err);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    let _ = client.disconnect().await;
    info!(target: "fwd.app", "mqtt forwarder stopped");
}

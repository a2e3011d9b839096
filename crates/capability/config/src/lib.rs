//! 应用运行配置加载（config.json）。

use serde::Deserialize;
use std::path::Path;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    Read(String, String),
    #[error("invalid config {0}: {1}")]
    Parse(String, String),
}

/// 监听侧 MQTT 连接配置。
#[derive(Debug, Clone, Deserialize)]
pub struct MqttConfig {
    pub broker: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub keepalive: u64,
}

/// 转发目标配置。
#[derive(Debug, Clone, Deserialize)]
pub struct ForwardConfig {
    pub broker: String,
    pub port: u16,
    pub topic: String,
}

/// 应用运行配置。
#[derive(Debug, Clone, Deserialize)]
pub struct ForwarderConfig {
    pub devices: Vec<String>,
    pub mqtt: MqttConfig,
    pub forward: ForwardConfig,
}

impl ForwarderConfig {
    /// 从 JSON 配置文件读取配置；文件缺失、格式错误、缺少必需键均为错误。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|err| ConfigError::Read(path.display().to_string(), err.to_string()))?;
        serde_json::from_str(&text)
            .map_err(|err| ConfigError::Parse(path.display().to_string(), err.to_string()))
    }

    /// 不符合 14 位数字约定的设备 ID（仅用于启动时告警，不拒收）。
    pub fn invalid_device_ids(&self) -> Vec<&str> {
        self.devices
            .iter()
            .map(String::as_str)
            .filter(|device_id| !domain::is_well_formed_device_id(device_id))
            .collect()
    }

    /// 监听端 broker 地址（host:port）。
    pub fn listen_endpoint(&self) -> String {
        format!("{}:{}", self.mqtt.broker, self.mqtt.port)
    }

    /// 转发端 broker 地址（host:port）。
    pub fn forward_endpoint(&self) -> String {
        format!("{}:{}", self.forward.broker, self.forward.port)
    }
}

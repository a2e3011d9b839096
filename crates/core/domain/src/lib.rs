pub mod envelope;

pub use envelope::{ENVELOPE_TYPE, Envelope, Record};

/// 设备状态 topic 的固定前缀。
pub const DEVICE_TOPIC_PREFIX: &str = "status/AMT";

/// 设备序列号前缀（Envelope 的 SN 字段使用）。
pub const DEVICE_SN_PREFIX: &str = "AMT";

/// 按设备 ID 构造订阅 topic：`status/AMT<device_id>`。
pub fn device_topic(device_id: &str) -> String {
    format!("{DEVICE_TOPIC_PREFIX}{device_id}")
}

/// 从 topic 中提取设备 ID；前缀不匹配返回 None。
pub fn device_id_from_topic(topic: &str) -> Option<&str> {
    topic.strip_prefix(DEVICE_TOPIC_PREFIX)
}

/// 设备 ID 约定为 14 位数字编码（仅校验告警，不在消息路径拒收）。
pub fn is_well_formed_device_id(device_id: &str) -> bool {
    device_id.len() == 14 && device_id.bytes().all(|b| b.is_ascii_digit())
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope 的 Type 字段固定值。
pub const ENVELOPE_TYPE: &str = "park";

/// 转发 data 数组中的单条记录。
///
/// 源 payload 为扁平 JSON 对象时，每个键值对展开为一条 `Named`；
/// 其余情况（非对象 JSON 值、非 JSON 文本）原样包装为 `Raw`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Record {
    Named { name: String, value: Value },
    Raw(Value),
}

/// 转发消息的统一外层结构。
///
/// 字段顺序即线上 JSON 的字段顺序：
/// `{"data": [...], "SN": "AMT<id>", "Type": "park", "flexem_timestamp": <ms>}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub data: Vec<Record>,
    #[serde(rename = "SN")]
    pub sn: String,
    #[serde(rename = "Type")]
    pub envelope_type: String,
    /// 转换时刻的 Unix 毫秒时间戳（处理时取值，非消息到达时刻）。
    pub flexem_timestamp: i64,
}

impl Envelope {
    /// 按设备 ID 构造 Envelope，SN 为 `AMT<device_id>`，Type 固定为 `park`。
    pub fn new(device_id: &str, data: Vec<Record>, now_ms: i64) -> Self {
        Self {
            data,
            sn: format!("{}{}", super::DEVICE_SN_PREFIX, device_id),
            envelope_type: ENVELOPE_TYPE.to_string(),
            flexem_timestamp: now_ms,
        }
    }
}

//! 消息转换核心：payload 判定与 Envelope 构造（纯函数，无 I/O）。

use domain::{Envelope, Record, device_id_from_topic};
use serde_json::Value;
use std::fmt;

/// 跳过转发的原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 去除空白后 payload 为空。
    EmptyPayload,
    /// payload 解析为空 JSON 对象或 null。
    EmptyJson,
    /// topic 不符合设备状态前缀（调用方前置条件，兜底处理）。
    UnmatchedTopic,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyPayload => write!(f, "empty payload"),
            SkipReason::EmptyJson => write!(f, "empty json payload"),
            SkipReason::UnmatchedTopic => write!(f, "unmatched topic"),
        }
    }
}

/// 单条消息的判定结果。
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Skip(SkipReason),
    Forward(Envelope),
}

/// 判定一条入站消息是否转发，转发时构造 Envelope。
///
/// 规则（按序）：
/// 1. payload 按 UTF-8 宽松解码并去除首尾空白，为空则跳过；
/// 2. 从 topic 提取设备 ID；
/// 3. 按 JSON 解析：`{}` 与 `null` 跳过；对象按键序展开为
///    `{name, value}` 记录；其余 JSON 值包装为单元素数组；
///    非 JSON 文本按原始字符串包装。
///
/// 注意：`0`、`false`、`""`、`[]` 都是合法且非空的 JSON 值，照常转发
/// （空数组会以 `[[]]` 的形式出现在 data 中）。
pub fn decide(topic: &str, payload: &[u8], now_ms: i64) -> Outcome {
    let text = String::from_utf8_lossy(payload);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Outcome::Skip(SkipReason::EmptyPayload);
    }

    let device_id = match device_id_from_topic(topic) {
        Some(device_id) => device_id,
        None => return Outcome::Skip(SkipReason::UnmatchedTopic),
    };

    let data = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Null) => return Outcome::Skip(SkipReason::EmptyJson),
        Ok(Value::Object(map)) => {
            if map.is_empty() {
                return Outcome::Skip(SkipReason::EmptyJson);
            }
            map.into_iter()
                .map(|(name, value)| Record::Named { name, value })
                .collect()
        }
        Ok(other) => vec![Record::Raw(other)],
        Err(_) => vec![Record::Raw(Value::String(trimmed.to_string()))],
    };

    Outcome::Forward(Envelope::new(device_id, data, now_ms))
}

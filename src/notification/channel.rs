//! 通知渠道 trait 定义

use super::policy::Notification;
use anyhow::Result;

/// 发送结果
#[derive(Debug, Clone, PartialEq)]
pub enum SendResult {
    /// 发送成功
    Sent,
    /// 跳过（如 dry-run）
    Skipped(String),
    /// 发送失败
    Failed(String),
}

/// 通知渠道 trait
///
/// 每条消息在 MQTT 事件循环中同步调用一次 `send`，实现应当快速返回。
pub trait NotificationChannel: Send + Sync {
    /// 渠道名称（用于日志）
    fn name(&self) -> &str;

    /// 同步发送通知
    fn send(&self, notification: &Notification) -> Result<SendResult>;
}

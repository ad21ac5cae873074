//! Dry-run 渠道 - 把渲染结果以 JSON 行输出到 stdout，不弹窗

use crate::notification::channel::{NotificationChannel, SendResult};
use crate::notification::policy::Notification;
use anyhow::Result;
use std::io::Write;

pub struct StdoutChannel;

impl StdoutChannel {
    pub fn new() -> Self {
        Self
    }

    fn format_line(notification: &Notification) -> Result<String> {
        Ok(serde_json::to_string(notification)?)
    }
}

impl Default for StdoutChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationChannel for StdoutChannel {
    fn name(&self) -> &str {
        "stdout"
    }

    fn send(&self, notification: &Notification) -> Result<SendResult> {
        let line = Self::format_line(notification)?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", line)?;
        stdout.flush()?;
        Ok(SendResult::Skipped("dry-run".to_string()))
    }
}

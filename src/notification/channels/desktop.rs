//! 桌面通知渠道（notify-rust：Linux D-Bus / macOS / Windows）

use crate::notification::channel::{NotificationChannel, SendResult};
use crate::notification::policy::Notification;
use anyhow::Result;
use tracing::{debug, warn};

pub const APP_NAME: &str = "mqtt-desktop-notify";

/// 通过操作系统通知中心弹出通知
pub struct DesktopChannel {
    app_name: String,
}

impl DesktopChannel {
    pub fn new() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
        }
    }
}

impl Default for DesktopChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationChannel for DesktopChannel {
    fn name(&self) -> &str {
        "desktop"
    }

    fn send(&self, notification: &Notification) -> Result<SendResult> {
        let shown = notify_rust::Notification::new()
            .appname(&self.app_name)
            .summary(&notification.title)
            .body(&notification.body)
            .icon(&notification.icon)
            .show();

        match shown {
            Ok(_) => {
                debug!(channel = "desktop", title = %notification.title, "Popup shown");
                Ok(SendResult::Sent)
            }
            Err(e) => {
                warn!(channel = "desktop", error = %e, "Failed to show notification");
                Ok(SendResult::Failed(e.to_string()))
            }
        }
    }
}

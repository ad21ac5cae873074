//! mqtt-desktop-notify - 订阅 MQTT topic，把每条消息变成桌面通知

pub mod broker;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod notification;

pub use broker::{BrokerError, BrokerSession, MqttSession};
pub use config::{Config, ConfigError, MqttConfig, NotificationConfig, NotificationMode};
pub use dispatch::{run_until, DispatchContext, DispatchOutcome};
pub use notification::{render, DropReason, Notification, NotificationChannel, SendResult};

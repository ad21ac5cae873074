//! 通知层 - 策略引擎与通知渠道
//!
//! # 使用示例
//! ```ignore
//! use mqtt_desktop_notify::notification::{render, DesktopChannel, NotificationChannel};
//!
//! let notification = render(&config.notification, payload)?;
//! DesktopChannel::new().send(&notification)?;
//! ```

pub mod channel;
pub mod channels;
pub mod icon;
pub mod policy;

pub use channel::{NotificationChannel, SendResult};
pub use channels::{DesktopChannel, StdoutChannel};
pub use icon::icon_path;
pub use policy::{render, DropReason, Notification};

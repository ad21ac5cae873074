//! 配置记录 - 解析后的 MQTT 与通知参数及其默认值规则

use std::str::FromStr;
use tracing::warn;

pub const DEFAULT_SERVER: &str = "127.0.0.1";
pub const DEFAULT_PORT: &str = "1883";
pub const DEFAULT_TOPIC: &str = "mqtt-desktop-notify/default";
pub const DEFAULT_TITLE: &str = "mqtt-desktop-notify";
pub const DEFAULT_BODY: &str = "your notification text could be here";

/// 通知模式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationMode {
    /// 固定标题和正文，忽略消息内容
    Static,
    /// 固定标题，正文为消息内容
    Dynamic,
    /// 消息为 JSON 对象，取 `title` 和 `text`
    Json,
    /// 无法识别的模式（保留原始文本用于诊断）
    Unknown(String),
}

impl NotificationMode {
    pub fn as_str(&self) -> &str {
        match self {
            NotificationMode::Static => "static",
            NotificationMode::Dynamic => "dynamic",
            NotificationMode::Json => "json",
            NotificationMode::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, NotificationMode::Unknown(_))
    }
}

impl std::fmt::Display for NotificationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "static" => NotificationMode::Static,
            "dynamic" => NotificationMode::Dynamic,
            "json" => NotificationMode::Json,
            _ => NotificationMode::Unknown(s.trim().to_string()),
        })
    }
}

/// MQTT 连接参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttConfig {
    pub server: String,
    /// 端口保持字符串形式，连接时再解析
    pub port: String,
    pub topic: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl MqttConfig {
    /// 用户名和密码都存在时才返回凭据，只有一半视为没有
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        }
    }
}

/// 通知参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    pub mode: NotificationMode,
    pub title: String,
    /// static 模式下的正文；json 模式下 payload 缺少 `text` 时的后备正文
    pub body: String,
}

/// 完整的配置记录，加载后在进程生命周期内只读
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mqtt: MqttConfig,
    pub notification: NotificationConfig,
}

/// 尚未应用默认值的原始字段（对应 INI 中的各个 key）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    pub server: Option<String>,
    pub port: Option<String>,
    pub topic: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
    pub mode: Option<String>,
}

/// 去掉空白，空字符串视为缺失
fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn or_default(value: &Option<String>, default: &str) -> String {
    non_empty(value).unwrap_or_else(|| default.to_string())
}

/// 对原始字段应用默认值，总是成功
pub fn resolve(raw: &RawConfig) -> Config {
    let mode = match non_empty(&raw.mode) {
        Some(mode) => match mode.parse() {
            Ok(mode) => mode,
            Err(never) => match never {},
        },
        None => {
            warn!("notification type not set, defaulting to static");
            NotificationMode::Static
        }
    };

    let body = match mode {
        NotificationMode::Static => or_default(&raw.text, DEFAULT_BODY),
        _ => non_empty(&raw.text).unwrap_or_default(),
    };

    Config {
        mqtt: MqttConfig {
            server: or_default(&raw.server, DEFAULT_SERVER),
            port: or_default(&raw.port, DEFAULT_PORT),
            topic: or_default(&raw.topic, DEFAULT_TOPIC),
            username: non_empty(&raw.username),
            password: non_empty(&raw.password),
        },
        notification: NotificationConfig {
            title: or_default(&raw.title, DEFAULT_TITLE),
            body,
            mode,
        },
    }
}

impl Default for Config {
    fn default() -> Self {
        resolve(&RawConfig {
            mode: Some("static".to_string()),
            ..Default::default()
        })
    }
}

//! 通知策略 - 根据通知模式把 MQTT 消息转换成桌面通知
//!
//! 同样的配置和 payload 总是得到同样的结果；图标路径由 [`super::icon`] 在进程内解析一次。

use super::icon::icon_path;
use crate::config::{NotificationConfig, NotificationMode};
use serde::Serialize;
use std::collections::HashMap;

/// 渲染后的通知，交给通知渠道后即丢弃
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            icon: icon_path().to_string(),
        }
    }
}

/// 消息被丢弃的原因（只影响当前消息）
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DropReason {
    #[error("malformed JSON payload: {0}")]
    MalformedPayload(String),

    #[error("unknown notification type: {0}")]
    UnknownMode(String),
}

/// 根据通知配置渲染一条消息
pub fn render(config: &NotificationConfig, payload: &[u8]) -> Result<Notification, DropReason> {
    match config.mode {
        NotificationMode::Static => Ok(Notification::new(&config.title, &config.body)),
        NotificationMode::Dynamic => Ok(Notification::new(
            &config.title,
            String::from_utf8_lossy(payload),
        )),
        NotificationMode::Json => render_json(config, payload),
        NotificationMode::Unknown(ref raw) => Err(DropReason::UnknownMode(raw.clone())),
    }
}

/// payload 必须是只含字符串值的扁平对象；缺少的 key 回退到配置值
fn render_json(config: &NotificationConfig, payload: &[u8]) -> Result<Notification, DropReason> {
    let mut fields: HashMap<String, String> = serde_json::from_slice(payload)
        .map_err(|e| DropReason::MalformedPayload(e.to_string()))?;

    let title = fields
        .remove("title")
        .unwrap_or_else(|| config.title.clone());
    let body = fields.remove("text").unwrap_or_else(|| config.body.clone());

    Ok(Notification::new(title, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(mode: NotificationMode) -> NotificationConfig {
        NotificationConfig {
            mode,
            title: "mqtt-desktop-notify".to_string(),
            body: "fallback".to_string(),
        }
    }

    #[test]
    fn test_static_ignores_payload() {
        let cfg = config(NotificationMode::Static);
        let a = render(&cfg, b"first").unwrap();
        let b = render(&cfg, b"{\"title\":\"other\"}").unwrap();

        assert_eq!(a, b);
        assert_eq!(a.title, "mqtt-desktop-notify");
        assert_eq!(a.body, "fallback");
    }

    #[test]
    fn test_dynamic_uses_payload_as_body() {
        let cfg = config(NotificationMode::Dynamic);
        let n = render(&cfg, "Waschmaschine fertig ✓".as_bytes()).unwrap();

        assert_eq!(n.title, "mqtt-desktop-notify");
        assert_eq!(n.body, "Waschmaschine fertig ✓");
    }

    #[test]
    fn test_dynamic_invalid_utf8_is_lossy() {
        let cfg = config(NotificationMode::Dynamic);
        let n = render(&cfg, &[b'o', b'k', 0xff]).unwrap();
        assert_eq!(n.body, "ok\u{fffd}");
    }

    #[test]
    fn test_json_extracts_title_and_text() {
        let cfg = config(NotificationMode::Json);
        let n = render(&cfg, br#"{"title":"A","text":"B"}"#).unwrap();
        assert_eq!(n, Notification::new("A", "B"));
    }

    #[test]
    fn test_json_missing_keys_fall_back() {
        let cfg = config(NotificationMode::Json);
        let n = render(&cfg, br#"{"text":"only text","extra":"x"}"#).unwrap();
        assert_eq!(n.title, "mqtt-desktop-notify");
        assert_eq!(n.body, "only text");
    }

    #[test]
    fn test_json_rejects_non_json() {
        let cfg = config(NotificationMode::Json);
        let err = render(&cfg, b"not json").unwrap_err();
        assert!(matches!(err, DropReason::MalformedPayload(_)));
    }

    #[test]
    fn test_json_rejects_nested_values() {
        let cfg = config(NotificationMode::Json);
        assert!(render(&cfg, br#"{"title":"A","text":{"nested":true}}"#).is_err());
        assert!(render(&cfg, br#"{"title":"A","priority":3}"#).is_err());
        assert!(render(&cfg, br#"["A","B"]"#).is_err());
    }

    #[test]
    fn test_unknown_mode_always_drops() {
        let cfg = config(NotificationMode::Unknown("toast".to_string()));
        assert_eq!(
            render(&cfg, b"anything"),
            Err(DropReason::UnknownMode("toast".to_string()))
        );
        assert!(render(&cfg, br#"{"title":"A","text":"B"}"#).is_err());
    }

    #[test]
    fn test_render_is_idempotent() {
        for mode in [
            NotificationMode::Static,
            NotificationMode::Dynamic,
            NotificationMode::Json,
        ] {
            let cfg = config(mode);
            let payload = br#"{"title":"Door","text":"Opened"}"#;
            assert_eq!(render(&cfg, payload), render(&cfg, payload));
        }
    }

    #[test]
    fn test_every_notification_uses_bundled_icon() {
        let n = Notification::new("t", "b");
        assert_eq!(n.icon, icon_path());
        assert!(!n.icon.contains(env!("CARGO_MANIFEST_DIR")));
    }
}

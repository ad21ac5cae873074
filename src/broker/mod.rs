//! 消息代理层 - MQTT 会话的最小抽象
//!
//! 分发循环只依赖 [`BrokerSession`]：取下一条 payload、断开连接。
//! 连接和订阅在构造具体会话时完成，失败即致命，不做重连。

pub mod mqtt;

pub use mqtt::MqttSession;

use std::future::Future;
use std::time::Duration;

/// 断开连接时等待代理确认的宽限期
pub const DISCONNECT_GRACE: Duration = Duration::from_millis(250);

/// 代理相关错误，均会导致进程退出
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("invalid MQTT port '{0}'")]
    InvalidPort(String),

    #[error("connecting to MQTT broker {addr}: {message}")]
    Connect { addr: String, message: String },

    #[error("connecting to MQTT broker {addr}: no answer within {secs}s")]
    ConnectTimeout { addr: String, secs: u64 },

    #[error("MQTT broker {addr} refused the connection: {code}")]
    Refused { addr: String, code: String },

    #[error("subscribing topic {topic}: {message}")]
    Subscribe { topic: String, message: String },

    #[error("MQTT broker rejected subscription to {topic}")]
    SubscribeRejected { topic: String },

    #[error("MQTT connection lost: {0}")]
    ConnectionLost(String),
}

/// 已连接并订阅的会话
pub trait BrokerSession: Send {
    /// 等待下一条消息的 payload；`Ok(None)` 表示会话已正常结束
    fn next_payload(&mut self) -> impl Future<Output = Result<Option<Vec<u8>>, BrokerError>> + Send;

    /// 断开连接，最多等待 `grace`
    fn disconnect(self, grace: Duration) -> impl Future<Output = ()> + Send;
}

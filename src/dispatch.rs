//! 分发循环 - 把订阅收到的每条消息交给策略引擎，再交给通知渠道
//!
//! 所有状态都在 [`DispatchContext`] 中显式传递，没有全局变量。
//! 单条消息的失败只记录日志，不会终止循环；只有会话错误才会结束循环。

use crate::broker::{BrokerError, BrokerSession, DISCONNECT_GRACE};
use crate::config::Config;
use crate::notification::{render, DropReason, NotificationChannel, SendResult};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

/// 单条消息的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// 已弹出通知
    Sent,
    /// 渠道跳过（dry-run）
    Skipped(String),
    /// 策略引擎丢弃了消息
    Dropped(DropReason),
    /// 通知渠道发送失败
    Failed(String),
}

/// 运行期统计
#[derive(Debug, Default)]
pub struct DispatchStats {
    pub received: AtomicU64,
    pub delivered: AtomicU64,
    pub dropped: AtomicU64,
    pub failed: AtomicU64,
}

impl DispatchStats {
    pub fn snapshot(&self) -> (u64, u64, u64, u64) {
        (
            self.received.load(Ordering::Relaxed),
            self.delivered.load(Ordering::Relaxed),
            self.dropped.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed),
        )
    }
}

/// 分发上下文：启动时构造一次，整个运行期只读
pub struct DispatchContext {
    config: Config,
    channel: Arc<dyn NotificationChannel>,
    stats: DispatchStats,
}

impl DispatchContext {
    pub fn new(config: Config, channel: Arc<dyn NotificationChannel>) -> Self {
        Self {
            config,
            channel,
            stats: DispatchStats::default(),
        }
    }

    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }

    /// 处理一条消息
    pub fn handle_payload(&self, payload: &[u8]) -> DispatchOutcome {
        self.stats.received.fetch_add(1, Ordering::Relaxed);

        let notification = match render(&self.config.notification, payload) {
            Ok(notification) => notification,
            Err(reason) => {
                warn!(
                    mode = %self.config.notification.mode,
                    error = %reason,
                    "Dropping message"
                );
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                return DispatchOutcome::Dropped(reason);
            }
        };

        let channel = self.channel.name();
        match self.channel.send(&notification) {
            Ok(SendResult::Sent) => {
                self.stats.delivered.fetch_add(1, Ordering::Relaxed);
                info!(channel, title = %notification.title, "Send out notification");
                DispatchOutcome::Sent
            }
            Ok(SendResult::Skipped(reason)) => {
                self.stats.delivered.fetch_add(1, Ordering::Relaxed);
                info!(channel, reason = %reason, "Notification skipped");
                DispatchOutcome::Skipped(reason)
            }
            Ok(SendResult::Failed(e)) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                error!(channel, error = %e, "Rendering notification failed");
                DispatchOutcome::Failed(e)
            }
            Err(e) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                error!(channel, error = %e, "Rendering notification failed");
                DispatchOutcome::Failed(e.to_string())
            }
        }
    }
}

/// 处理消息直到 `shutdown` 完成或会话结束，然后在宽限期内断开连接
pub async fn run_until<S, F>(
    mut session: S,
    ctx: &DispatchContext,
    shutdown: F,
) -> Result<(), BrokerError>
where
    S: BrokerSession,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    info!(topic = %ctx.config.mqtt.topic, mode = %ctx.config.notification.mode, "Listening");

    let result = loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break Ok(());
            }
            next = session.next_payload() => {
                match next {
                    Ok(Some(payload)) => {
                        ctx.handle_payload(&payload);
                    }
                    Ok(None) => break Ok(()),
                    Err(e) => break Err(e),
                }
            }
        }
    };

    session.disconnect(DISCONNECT_GRACE).await;

    let (received, delivered, dropped, failed) = ctx.stats.snapshot();
    info!(received, delivered, dropped, failed, "Dispatch loop stopped");
    result
}

// src/cli/run.rs
//! 默认命令 - 加载配置、订阅 topic 并持续弹出通知

use crate::broker::MqttSession;
use crate::config::{ensure_config, DialoguerPrompter};
use crate::dispatch::{run_until, DispatchContext};
use crate::notification::{DesktopChannel, NotificationChannel, StdoutChannel};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// 运行参数
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// 只输出渲染结果，不弹窗
    pub dry_run: bool,
}

/// 处理默认命令：任何无法进入监听状态的错误都直接返回
pub async fn handle_run(config_path: &Path, options: RunOptions) -> Result<()> {
    let mut prompter = DialoguerPrompter;
    let config = ensure_config(config_path, &mut prompter)?;
    config.validate()?;

    info!(
        server = %config.mqtt.server,
        port = %config.mqtt.port,
        topic = %config.mqtt.topic,
        mode = %config.notification.mode,
        "Config loaded"
    );

    let channel: Arc<dyn NotificationChannel> = if options.dry_run {
        Arc::new(StdoutChannel::new())
    } else {
        Arc::new(DesktopChannel::new())
    };

    let mut session = MqttSession::connect(&config.mqtt).await?;
    session.subscribe(&config.mqtt.topic).await?;

    let ctx = DispatchContext::new(config, channel);
    run_until(session, &ctx, shutdown_signal()).await?;
    Ok(())
}

/// Ctrl-C 或 SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

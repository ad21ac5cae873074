//! 配置层 - 记录、INI 存储和首次运行向导

pub mod provision;
pub mod record;
pub mod store;

pub use provision::{
    collect_answers, create_config, ensure_config, provision, DialoguerPrompter, Prompter,
    ScriptedPrompter,
};
pub use record::{resolve, Config, MqttConfig, NotificationConfig, NotificationMode, RawConfig};
pub use store::default_config_path;

use std::path::PathBuf;

/// 配置相关错误，均会导致进程退出
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot access config path {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("no config file found at {} and user chose not to create one", path.display())]
    Declined { path: PathBuf },

    #[error("getting home directory: no home directory for the current user")]
    NoHomeDir,

    #[error("unknown notification type '{0}' (expected static, dynamic or json)")]
    UnknownMode(String),

    #[error("prompt failed: {0}")]
    Prompt(String),
}

impl Config {
    /// 启动前校验：未知通知模式属于静态配置错误，直接拒绝
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let NotificationMode::Unknown(ref raw) = self.notification.mode {
            return Err(ConfigError::UnknownMode(raw.clone()));
        }
        Ok(())
    }
}

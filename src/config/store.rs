//! INI 配置文件读写
//!
//! ```ini
//! [mqtt]
//! server = 127.0.0.1
//! port = 1883
//! topic = mqtt-desktop-notify/default
//!
//! [notification]
//! title = mqtt-desktop-notify
//! text = your notification text could be here
//! type = static
//! ```

use super::record::{resolve, Config, RawConfig};
use super::ConfigError;
use ini::{Ini, ParseOption};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SECTION_MQTT: &str = "mqtt";
const SECTION_NOTIFICATION: &str = "notification";

/// 默认配置文件路径: `~/.config/mqttpushnotify.ini`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    config_path_under(dirs::home_dir())
}

/// 找不到主目录时返回错误，不猜测路径
fn config_path_under(home: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    let home = home.ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(".config").join("mqttpushnotify.ini"))
}

/// 值按原样读取：引号是值的一部分，不做剥离
fn parse_option() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        ..ParseOption::default()
    }
}

/// 读取原始字段（不应用默认值）
pub fn load_raw(path: &Path) -> Result<RawConfig, ConfigError> {
    let ini = Ini::load_from_file_opt(path, parse_option()).map_err(|e| match e {
        ini::Error::Io(source) => ConfigError::Io {
            path: path.to_path_buf(),
            source,
        },
        ini::Error::Parse(source) => ConfigError::Parse {
            path: path.to_path_buf(),
            message: source.to_string(),
        },
    })?;
    Ok(raw_from_ini(&ini))
}

/// 解析 INI 文本
pub fn parse_raw(content: &str) -> Result<RawConfig, ConfigError> {
    let ini = Ini::load_from_str_opt(content, parse_option()).map_err(|e| ConfigError::Parse {
        path: PathBuf::from("<inline>"),
        message: e.to_string(),
    })?;
    Ok(raw_from_ini(&ini))
}

fn raw_from_ini(ini: &Ini) -> RawConfig {
    let get = |section: &str, key: &str| {
        ini.section(Some(section))
            .and_then(|props| props.get(key))
            .map(str::to_string)
    };

    RawConfig {
        server: get(SECTION_MQTT, "server"),
        port: get(SECTION_MQTT, "port"),
        topic: get(SECTION_MQTT, "topic"),
        username: get(SECTION_MQTT, "username"),
        password: get(SECTION_MQTT, "password"),
        title: get(SECTION_NOTIFICATION, "title"),
        text: get(SECTION_NOTIFICATION, "text"),
        mode: get(SECTION_NOTIFICATION, "type"),
    }
}

/// 读取并应用默认值，不会回写文件
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "Loading config");
    let raw = load_raw(path)?;
    Ok(resolve(&raw))
}

fn to_ini(config: &Config) -> Ini {
    let mut ini = Ini::new();
    let mut set = |section: &str, key: &str, value: &str| {
        ini.set_to(Some(section), key.to_string(), value.to_string());
    };

    set(SECTION_MQTT, "server", &config.mqtt.server);
    set(SECTION_MQTT, "port", &config.mqtt.port);
    set(SECTION_MQTT, "topic", &config.mqtt.topic);
    if let Some(ref username) = config.mqtt.username {
        set(SECTION_MQTT, "username", username);
    }
    if let Some(ref password) = config.mqtt.password {
        set(SECTION_MQTT, "password", password);
    }

    set(SECTION_NOTIFICATION, "title", &config.notification.title);
    set(SECTION_NOTIFICATION, "text", &config.notification.body);
    set(SECTION_NOTIFICATION, "type", config.notification.mode.as_str());

    ini
}

/// 写入配置，必要时创建父目录
pub fn save(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    to_ini(config)
        .write_to_file(path)
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    info!(path = %path.display(), "Config written");
    Ok(())
}

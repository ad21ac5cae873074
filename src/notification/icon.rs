//! 通知图标
//!
//! SVG 编进二进制，第一次使用时写到用户缓存目录，之后复用同一路径。
//! 写入失败时退回到图标主题里的 `dialog-information`。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

const ICON_SVG: &[u8] = include_bytes!("../../assets/information.svg");
const ICON_FILE: &str = "information.svg";
const CACHE_SUBDIR: &str = "mqtt-desktop-notify";

/// 图标主题中的通用信息图标
pub const FALLBACK_ICON: &str = "dialog-information";

static ICON: OnceLock<String> = OnceLock::new();

/// 通知使用的图标（文件路径或图标名）
pub fn icon_path() -> &'static str {
    ICON.get_or_init(|| {
        let dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(CACHE_SUBDIR);
        match install_icon(&dir) {
            Ok(path) => path.to_string_lossy().into_owned(),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Cannot write notification icon, using theme icon");
                FALLBACK_ICON.to_string()
            }
        }
    })
}

/// 把内置图标写到 `dir`，内容相同时不重写
pub fn install_icon(dir: &Path) -> io::Result<PathBuf> {
    let path = dir.join(ICON_FILE);
    if fs::read(&path).map(|existing| existing == ICON_SVG).unwrap_or(false) {
        return Ok(path);
    }

    fs::create_dir_all(dir)?;
    fs::write(&path, ICON_SVG)?;
    debug!(path = %path.display(), "Notification icon written");
    Ok(path)
}

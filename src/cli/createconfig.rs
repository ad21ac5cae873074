// src/cli/createconfig.rs
//! createconfig 命令 - 只运行配置向导然后退出

use crate::config::{create_config, DialoguerPrompter, Prompter};
use anyhow::{Context, Result};
use std::path::Path;

/// 处理 createconfig 命令
pub fn handle_createconfig(path: &Path) -> Result<()> {
    let mut prompter = DialoguerPrompter;
    run_createconfig(path, &mut prompter)?;
    Ok(())
}

/// 已有文件时先确认是否覆盖（默认否）；返回是否写入了新配置
pub fn run_createconfig(path: &Path, prompter: &mut dyn Prompter) -> Result<bool> {
    if path.exists() {
        prompter.message(&format!("Config file already exists at {}", path.display()));
        let overwrite = prompter.confirm("Overwrite it?", false)?;
        if !overwrite {
            prompter.message("Aborted.");
            return Ok(false);
        }
    }

    create_config(path, prompter)
        .with_context(|| format!("creating config file {}", path.display()))?;
    Ok(true)
}
